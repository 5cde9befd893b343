// Input tables - one row struct per CSV extract
//
// Column names follow the extracts exactly (Spanish headers), mapped onto
// English field names through serde. Unlisted columns are ignored.

use serde::{Deserialize, Serialize};

/// cliente.csv
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Customer {
    #[serde(rename = "id_cliente")]
    pub id: String,

    #[serde(rename = "nombre")]
    pub name: String,
}

/// factura.csv
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Invoice {
    #[serde(rename = "id_factura")]
    pub id: String,

    #[serde(rename = "id_cliente")]
    pub customer_id: String,

    /// Raw date text; parsed during the join
    #[serde(rename = "fecha")]
    pub date: String,
}

/// detalle_factura.csv - the anchor table of the join
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct InvoiceLine {
    #[serde(rename = "id_factura")]
    pub invoice_id: String,

    #[serde(rename = "id_producto")]
    pub product_id: String,

    #[serde(rename = "cantidad")]
    pub quantity: Option<f64>,

    #[serde(rename = "precio_unitario")]
    pub unit_price: Option<f64>,
}

/// producto.csv
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Product {
    #[serde(rename = "id_producto")]
    pub id: String,

    #[serde(rename = "id_rubro")]
    pub category_id: String,

    #[serde(rename = "descripcion")]
    pub description: String,
}

/// rubro.csv
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Category {
    #[serde(rename = "id_rubro")]
    pub id: String,

    #[serde(rename = "nombre_rubro")]
    pub name: String,
}

/// reseña.csv
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Review {
    #[serde(rename = "id_factura")]
    pub invoice_id: String,

    /// 1-5
    #[serde(rename = "puntaje")]
    pub score: Option<f64>,

    #[serde(rename = "fecha_reseña")]
    pub date: String,
}

/// The six tables of one run, held in memory until the process exits
#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub customers: Vec<Customer>,
    pub invoices: Vec<Invoice>,
    pub lines: Vec<InvoiceLine>,
    pub products: Vec<Product>,
    pub categories: Vec<Category>,
    pub reviews: Vec<Review>,
}

impl Tables {
    /// Row counts in load order, for logging
    pub fn row_counts(&self) -> [(&'static str, usize); 6] {
        [
            ("customers", self.customers.len()),
            ("invoices", self.invoices.len()),
            ("lines", self.lines.len()),
            ("products", self.products.len()),
            ("categories", self.categories.len()),
            ("reviews", self.reviews.len()),
        ]
    }
}
