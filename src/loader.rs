// Loader - presence check + CSV → tables
//
// Fail-fast: if any required extract is missing, nothing is read.

use crate::error::{DashboardError, Result};
use crate::tables::Tables;
use csv::{ReaderBuilder, Trim};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::{debug, info};

pub const CUSTOMERS_FILE: &str = "cliente.csv";
pub const INVOICES_FILE: &str = "factura.csv";
pub const LINES_FILE: &str = "detalle_factura.csv";
pub const PRODUCTS_FILE: &str = "producto.csv";
pub const CATEGORIES_FILE: &str = "rubro.csv";
pub const REVIEWS_FILE: &str = "reseña.csv";

/// Required extracts, in the order they are checked and reported
pub const REQUIRED_FILES: [&str; 6] = [
    CUSTOMERS_FILE,
    INVOICES_FILE,
    LINES_FILE,
    PRODUCTS_FILE,
    CATEGORIES_FILE,
    REVIEWS_FILE,
];

/// Required file names that do not exist under `base_dir`
pub fn missing_files(base_dir: &Path) -> Vec<String> {
    REQUIRED_FILES
        .iter()
        .filter(|name| !base_dir.join(name).exists())
        .map(|name| name.to_string())
        .collect()
}

/// Check presence of all six extracts, then read them
pub fn load_tables(base_dir: &Path) -> Result<Tables> {
    let missing = missing_files(base_dir);
    if !missing.is_empty() {
        return Err(DashboardError::MissingInputFiles(missing));
    }

    let tables = Tables {
        customers: read_table(base_dir, CUSTOMERS_FILE)?,
        invoices: read_table(base_dir, INVOICES_FILE)?,
        lines: read_table(base_dir, LINES_FILE)?,
        products: read_table(base_dir, PRODUCTS_FILE)?,
        categories: read_table(base_dir, CATEGORIES_FILE)?,
        reviews: read_table(base_dir, REVIEWS_FILE)?,
    };

    let counts = tables.row_counts();
    info!(
        customers = counts[0].1,
        invoices = counts[1].1,
        lines = counts[2].1,
        products = counts[3].1,
        categories = counts[4].1,
        reviews = counts[5].1,
        "loaded input tables from {}",
        base_dir.display()
    );

    Ok(tables)
}

fn read_table<T: DeserializeOwned>(base_dir: &Path, file: &str) -> Result<Vec<T>> {
    let path = base_dir.join(file);
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .from_path(&path)
        .map_err(|source| DashboardError::Csv {
            file: file.to_string(),
            source,
        })?;

    let rows = rdr
        .deserialize()
        .collect::<std::result::Result<Vec<T>, _>>()
        .map_err(|source| DashboardError::Csv {
            file: file.to_string(),
            source,
        })?;

    debug!("{}: {} rows", file, rows.len());
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) {
        fs::write(dir.path().join(name), content).unwrap();
    }

    fn write_all(dir: &TempDir) {
        write(dir, CUSTOMERS_FILE, "id_cliente,nombre,email\n1,Ana,ana@example.com\n");
        write(dir, INVOICES_FILE, "id_factura,id_cliente,fecha,total\n10,1,2025-01-05,20\n");
        write(
            dir,
            LINES_FILE,
            "id_factura,id_producto,cantidad,precio_unitario\n10,100,2,10\n",
        );
        write(dir, PRODUCTS_FILE, "id_producto,id_rubro,descripcion\n100,5,Mouse\n");
        write(dir, CATEGORIES_FILE, "id_rubro,nombre_rubro\n5,Periféricos\n");
        write(dir, REVIEWS_FILE, "id_factura,puntaje,fecha_reseña\n10,4,2025-01-09\n");
    }

    #[test]
    fn test_missing_files_reports_exact_names() {
        let dir = TempDir::new().unwrap();
        write_all(&dir);
        fs::remove_file(dir.path().join(CATEGORIES_FILE)).unwrap();

        assert_eq!(missing_files(dir.path()), vec!["rubro.csv".to_string()]);

        match load_tables(dir.path()) {
            Err(DashboardError::MissingInputFiles(names)) => {
                assert_eq!(names, vec!["rubro.csv".to_string()])
            }
            other => panic!("expected MissingInputFiles, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_dir_reports_all_files_in_order() {
        let dir = TempDir::new().unwrap();
        let missing = missing_files(dir.path());
        assert_eq!(missing, REQUIRED_FILES.iter().map(|s| s.to_string()).collect::<Vec<_>>());
    }

    #[test]
    fn test_load_ignores_extra_columns() {
        let dir = TempDir::new().unwrap();
        write_all(&dir);

        let tables = load_tables(dir.path()).unwrap();
        assert_eq!(tables.customers.len(), 1);
        assert_eq!(tables.customers[0].name, "Ana");
        assert_eq!(tables.invoices[0].date, "2025-01-05");
        assert_eq!(tables.lines[0].quantity, Some(2.0));
        assert_eq!(tables.categories[0].name, "Periféricos");
        assert_eq!(tables.reviews[0].score, Some(4.0));
    }

    #[test]
    fn test_utf8_bom_does_not_break_first_header() {
        let dir = TempDir::new().unwrap();
        write_all(&dir);
        write(&dir, CUSTOMERS_FILE, "\u{feff}id_cliente,nombre\n1,Ana\n");

        let tables = load_tables(dir.path()).unwrap();
        assert_eq!(tables.customers.len(), 1);
        assert_eq!(tables.customers[0].id, "1");
        assert_eq!(tables.customers[0].name, "Ana");
    }

    #[test]
    fn test_empty_numeric_cell_is_none() {
        let dir = TempDir::new().unwrap();
        write_all(&dir);
        write(
            &dir,
            LINES_FILE,
            "id_factura,id_producto,cantidad,precio_unitario\n10,100,,10\n",
        );

        let tables = load_tables(dir.path()).unwrap();
        assert_eq!(tables.lines[0].quantity, None);
    }

    #[test]
    fn test_malformed_number_is_csv_error() {
        let dir = TempDir::new().unwrap();
        write_all(&dir);
        write(
            &dir,
            LINES_FILE,
            "id_factura,id_producto,cantidad,precio_unitario\n10,100,two,10\n",
        );

        match load_tables(dir.path()) {
            Err(DashboardError::Csv { file, .. }) => assert_eq!(file, LINES_FILE),
            other => panic!("expected Csv error, got {:?}", other),
        }
    }
}
