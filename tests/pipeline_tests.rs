// End-to-end tests: CSV fixtures on disk → load → join → aggregate → text report

use sales_dashboard::{
    build_report, join_tables, load_tables, missing_files, render_text_report, run_pipeline,
    DashboardError, ReportOptions, REQUIRED_FILES,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

struct Fixture {
    customers: &'static str,
    invoices: &'static str,
    lines: &'static str,
    products: &'static str,
    categories: &'static str,
    reviews: &'static str,
}

impl Default for Fixture {
    fn default() -> Self {
        Fixture {
            customers: "id_cliente,nombre,ciudad\n\
                        1,Ana Pérez,Córdoba\n\
                        2,Bruno Díaz,Rosario\n",
            invoices: "id_factura,id_cliente,fecha,forma_pago\n\
                       100,1,2025-01-15,tarjeta\n\
                       101,2,2025-03-20,efectivo\n",
            lines: "id_factura,id_producto,cantidad,precio_unitario\n\
                    100,10,2,10\n\
                    100,11,1,5\n\
                    101,12,3,2\n",
            products: "id_producto,id_rubro,descripcion\n\
                       10,1,Mouse inalámbrico\n\
                       11,1,Cable USB-C\n\
                       12,1,Pad gamer\n",
            categories: "id_rubro,nombre_rubro\n1,Accesorios\n",
            reviews: "id_factura,puntaje,fecha_reseña,comentario\n\
                      100,5,2025-01-20,Excelente\n\
                      101,3,2025-03-25,Demoró\n",
        }
    }
}

impl Fixture {
    fn write(&self, dir: &Path) {
        fs::write(dir.join("cliente.csv"), self.customers).unwrap();
        fs::write(dir.join("factura.csv"), self.invoices).unwrap();
        fs::write(dir.join("detalle_factura.csv"), self.lines).unwrap();
        fs::write(dir.join("producto.csv"), self.products).unwrap();
        fs::write(dir.join("rubro.csv"), self.categories).unwrap();
        fs::write(dir.join("reseña.csv"), self.reviews).unwrap();
    }
}

fn setup(fixture: Fixture) -> TempDir {
    let dir = TempDir::new().unwrap();
    fixture.write(dir.path());
    dir
}

#[test]
fn test_three_line_example_end_to_end() {
    let dir = setup(Fixture::default());
    let report = run_pipeline(dir.path(), ReportOptions::default()).unwrap();

    assert_eq!(report.headline.total_sales, 31.0);
    assert_eq!(report.headline.invoices, 2);
    assert_eq!(report.headline.customers, 2);
    assert_eq!(report.headline.products, 3);

    assert_eq!(report.category_sales.len(), 1);
    assert_eq!(report.category_sales[0].category, "Accesorios");
    assert_eq!(report.category_sales[0].sales, 31.0);
    assert_eq!(report.category_sales[0].percent, 100.0);

    assert_eq!(report.reviews.count, 2);
    assert_eq!(report.reviews.mean_score, 4.0);
}

#[test]
fn test_totals_are_partitioned_by_every_grouping() {
    let dir = setup(Fixture::default());
    let tables = load_tables(dir.path()).unwrap();
    let rows = join_tables(&tables);
    assert_eq!(rows.len(), tables.lines.len());

    let report = build_report(&tables, ReportOptions::default());
    let total = report.headline.total_sales;

    let line_sum: f64 = rows.iter().map(|r| r.subtotal).sum();
    let category_sum: f64 = report.category_sales.iter().map(|c| c.sales).sum();
    let customer_sum: f64 = report.customer_chart.iter().map(|g| g.value).sum();
    let unit_sum: f64 = report.product_chart.iter().map(|g| g.value).sum();

    assert_eq!(line_sum, total);
    assert_eq!(category_sum, total);
    assert_eq!(customer_sum, total);
    assert_eq!(unit_sum, report.headline.total_units);
}

#[test]
fn test_missing_category_file_stops_everything() {
    let dir = setup(Fixture::default());
    fs::remove_file(dir.path().join("rubro.csv")).unwrap();

    assert_eq!(missing_files(dir.path()), vec!["rubro.csv".to_string()]);

    let err = run_pipeline(dir.path(), ReportOptions::default()).unwrap_err();
    match err {
        DashboardError::MissingInputFiles(names) => assert_eq!(names, vec!["rubro.csv"]),
        other => panic!("expected MissingInputFiles, got {:?}", other),
    }
}

#[test]
fn test_every_missing_file_is_listed() {
    let dir = TempDir::new().unwrap();
    let err = run_pipeline(dir.path(), ReportOptions::default()).unwrap_err();
    assert_eq!(err.missing_files().len(), REQUIRED_FILES.len());
}

#[test]
fn test_monthly_sales_zero_filled() {
    let dir = setup(Fixture::default());
    let report = run_pipeline(dir.path(), ReportOptions::default()).unwrap();

    assert_eq!(report.monthly_sales.len(), 12);
    let sales: Vec<f64> = report.monthly_sales.iter().map(|m| m.sales).collect();
    assert_eq!(sales[0], 25.0);
    assert_eq!(sales[2], 6.0);
    assert_eq!(sales.iter().filter(|s| **s == 0.0).count(), 10);
}

#[test]
fn test_no_reviews_in_year_skips_review_chart() {
    let dir = setup(Fixture {
        reviews: "id_factura,puntaje,fecha_reseña\n\
                  100,5,2024-12-30\n\
                  101,2,no-date\n",
        ..Fixture::default()
    });
    let report = run_pipeline(dir.path(), ReportOptions::default()).unwrap();

    assert_eq!(report.reviews.mean_score, 0.0);
    assert_eq!(report.reviews.count, 0);
    assert!(report.review_trend.is_none());

    let text = render_text_report(&report);
    assert!(text.contains("0.0/5 (0 reviews)"));
    assert!(text.contains("No reviews recorded for 2025."));
}

#[test]
fn test_unmatched_rows_survive_join_as_nulls() {
    let dir = setup(Fixture {
        lines: "id_factura,id_producto,cantidad,precio_unitario\n\
                100,10,2,10\n\
                999,77,1,50\n",
        ..Fixture::default()
    });
    let tables = load_tables(dir.path()).unwrap();
    let rows = join_tables(&tables);

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].customer_name, None);
    assert_eq!(rows[1].category_name, None);
    assert_eq!(rows[1].subtotal, 50.0);

    let report = build_report(&tables, ReportOptions::default());
    assert_eq!(report.headline.total_sales, 70.0);
    // category view only sees matched rows
    assert_eq!(report.category_sales[0].sales, 20.0);
}

#[test]
fn test_reporting_year_is_configurable() {
    let dir = setup(Fixture {
        invoices: "id_factura,id_cliente,fecha\n100,1,2026-02-01\n101,2,2026-02-15\n",
        reviews: "id_factura,puntaje,fecha_reseña\n100,4,2026-02-10\n",
        ..Fixture::default()
    });

    let default_year = run_pipeline(dir.path(), ReportOptions::default()).unwrap();
    assert!(default_year.monthly_sales.iter().all(|m| m.sales == 0.0));
    assert!(default_year.review_trend.is_none());

    let options = ReportOptions {
        year: 2026,
        ..ReportOptions::default()
    };
    let report = run_pipeline(dir.path(), options).unwrap();
    assert_eq!(report.monthly_sales[1].sales, 31.0);
    let trend = report.review_trend.unwrap();
    // invoice 100 has two lines, so its review contributes twice
    assert_eq!(trend.total_reviews, 2);
    assert_eq!(trend.months[1].mean_score, 4.0);
}

#[test]
fn test_text_report_panel_order() {
    let dir = setup(Fixture::default());
    let report = run_pipeline(dir.path(), ReportOptions::default()).unwrap();
    let text = render_text_report(&report);

    let order = [
        "General Metrics",
        "Sales by Category",
        "Top Customers",
        "Monthly Sales 2025",
        "Top Products by Quantity",
        "Shipping Reviews 2025",
        "Executive Summary",
    ];
    let positions: Vec<usize> = order.iter().map(|h| text.find(h).unwrap()).collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));

    assert!(text.contains("1. Ana Pérez — $25.00"));
    assert!(text.contains("- Accesorios: $31.00 (100.0%)"));
}
