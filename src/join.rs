// Joiner - line items → products → categories → invoices → customers → reviews
//
// Every join is left-outer and anchored on the line items, so the output
// has exactly one row per input line. Unmatched fields stay None.

use crate::dates::parse_date;
use crate::tables::{Category, Customer, Invoice, Product, Review, Tables};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// One sold line item enriched with product, category, invoice, customer
/// and review attributes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedLine {
    pub invoice_id: String,
    pub product_id: String,
    pub quantity: Option<f64>,
    pub unit_price: Option<f64>,
    /// quantity × unit price, missing operands count as 0
    pub subtotal: f64,

    pub category_id: Option<String>,
    pub description: Option<String>,
    pub category_name: Option<String>,

    pub customer_id: Option<String>,
    pub invoice_date_raw: Option<String>,
    pub invoice_date: Option<NaiveDate>,
    pub customer_name: Option<String>,

    pub review_score: Option<f64>,
    pub review_date: Option<NaiveDate>,
}

/// First row wins for duplicated keys. Empty keys are null and never match.
fn index_by<'a, T, F>(rows: &'a [T], key: F) -> HashMap<&'a str, &'a T>
where
    F: Fn(&'a T) -> &'a str,
{
    let mut index = HashMap::with_capacity(rows.len());
    for row in rows {
        let k = key(row);
        if !k.is_empty() {
            index.entry(k).or_insert(row);
        }
    }
    index
}

/// Empty cells read as null
fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Build the enriched table from the six input tables
pub fn join_tables(tables: &Tables) -> Vec<EnrichedLine> {
    let products: HashMap<&str, &Product> = index_by(&tables.products, |p| p.id.as_str());
    let categories: HashMap<&str, &Category> = index_by(&tables.categories, |c| c.id.as_str());
    let invoices: HashMap<&str, &Invoice> = index_by(&tables.invoices, |i| i.id.as_str());
    let customers: HashMap<&str, &Customer> = index_by(&tables.customers, |c| c.id.as_str());
    let reviews: HashMap<&str, &Review> = index_by(&tables.reviews, |r| r.invoice_id.as_str());

    let mut bad_invoice_dates = 0usize;
    let mut bad_review_dates = 0usize;

    let enriched: Vec<EnrichedLine> = tables
        .lines
        .iter()
        .map(|line| {
            let product = products.get(line.product_id.as_str()).copied();
            let category = product.and_then(|p| categories.get(p.category_id.as_str()).copied());
            let invoice = invoices.get(line.invoice_id.as_str()).copied();
            let customer = invoice.and_then(|i| customers.get(i.customer_id.as_str()).copied());
            let review = reviews.get(line.invoice_id.as_str()).copied();

            let invoice_date = invoice.and_then(|i| parse_date(&i.date));
            if invoice.is_some() && invoice_date.is_none() {
                bad_invoice_dates += 1;
            }
            let review_date = review.and_then(|r| parse_date(&r.date));
            if review.is_some() && review_date.is_none() {
                bad_review_dates += 1;
            }

            EnrichedLine {
                invoice_id: line.invoice_id.clone(),
                product_id: line.product_id.clone(),
                quantity: line.quantity,
                unit_price: line.unit_price,
                subtotal: line.quantity.unwrap_or(0.0) * line.unit_price.unwrap_or(0.0),
                category_id: product.and_then(|p| non_empty(&p.category_id)),
                description: product.and_then(|p| non_empty(&p.description)),
                category_name: category.and_then(|c| non_empty(&c.name)),
                customer_id: invoice.and_then(|i| non_empty(&i.customer_id)),
                invoice_date_raw: invoice.and_then(|i| non_empty(&i.date)),
                invoice_date,
                customer_name: customer.and_then(|c| non_empty(&c.name)),
                review_score: review.and_then(|r| r.score),
                review_date,
            }
        })
        .collect();

    if bad_invoice_dates > 0 || bad_review_dates > 0 {
        debug!(
            bad_invoice_dates,
            bad_review_dates, "unparseable dates coerced to null"
        );
    }

    enriched
}
