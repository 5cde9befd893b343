// Sales Dashboard - Core Library
// Exposes the load → join → aggregate → present pipeline for the CLI, the API server, and tests

pub mod error;
pub mod tables;
pub mod dates;
pub mod loader;
pub mod join;
pub mod aggregate;
pub mod present;
pub mod config;

use std::path::Path;

// Re-export commonly used types
pub use error::{DashboardError, Result};
pub use tables::{Category, Customer, Invoice, InvoiceLine, Product, Review, Tables};
pub use dates::parse_date;
pub use loader::{load_tables, missing_files, REQUIRED_FILES};
pub use join::{join_tables, EnrichedLine};
pub use aggregate::{
    aggregate, build_report,
    CategoryShare, GroupTotal, Headline, MonthlyReview, MonthlySales, ProductSummary,
    Report, ReportOptions, ReviewSummary, ReviewTrend,
    MONTH_LABELS, DEFAULT_REPORT_YEAR,
};
pub use present::{
    executive_summary, format_money, format_units, metric_cards, render_text_report,
    review_card, review_headline, review_notice, review_trend_line,
    MetricCard, SummarySection,
};
pub use config::Config;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run the whole pipeline once: presence check, load, join, aggregate.
/// Nothing is kept between runs.
pub fn run_pipeline(base_dir: &Path, options: ReportOptions) -> Result<Report> {
    let tables = load_tables(base_dir)?;
    Ok(build_report(&tables, options))
}
