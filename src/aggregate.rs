// Aggregator - grouped sums, means and counts over the enriched table
//
// Pure functions: rows in, named result series out. Groups keep their
// first-appearance order and every ordering is a stable sort, so ties are
// broken by input order.

use crate::dates::{month_in_year, parse_date};
use crate::join::{join_tables, EnrichedLine};
use crate::tables::{Review, Tables};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

pub const DEFAULT_REPORT_YEAR: i32 = 2025;

// ============================================================================
// OPTIONS
// ============================================================================

/// Knobs of one report run. The reporting year is a parameter, not a literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportOptions {
    pub year: i32,
    pub top_customers_chart: usize,
    pub top_customers_summary: usize,
    pub top_products_chart: usize,
    pub top_products_summary: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        ReportOptions {
            year: DEFAULT_REPORT_YEAR,
            top_customers_chart: 8,
            top_customers_summary: 5,
            top_products_chart: 10,
            top_products_summary: 5,
        }
    }
}

// ============================================================================
// RESULT TYPES
// ============================================================================

/// A labelled sum (sales or units)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupTotal {
    pub label: String,
    pub value: f64,
}

impl GroupTotal {
    fn new(label: &str, value: f64) -> Self {
        GroupTotal {
            label: label.to_string(),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Headline {
    pub total_sales: f64,
    pub total_units: f64,
    pub invoices: usize,
    pub customers: usize,
    pub products: usize,
}

/// Review score over the reporting year, taken from the review table itself
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewSummary {
    pub year: i32,
    pub mean_score: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub category: String,
    pub sales: f64,
    /// 0-100, 0 when total sales are 0
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductSummary {
    pub description: String,
    pub units: f64,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySales {
    pub month: u32,
    pub label: &'static str,
    pub sales: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyReview {
    pub month: u32,
    pub label: &'static str,
    pub mean_score: f64,
    pub count: usize,
}

/// Month-by-month review score and volume for the reporting year
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewTrend {
    pub months: Vec<MonthlyReview>,
    /// Mean of the monthly means. Empty months count as 0; months whose
    /// reviews are all unscored are left out.
    pub overall_mean: f64,
    pub total_reviews: usize,
}

/// Everything the presenters need, computed once per run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub options: ReportOptions,
    pub headline: Headline,
    pub reviews: ReviewSummary,
    /// Descending, with share of total
    pub category_sales: Vec<CategoryShare>,
    /// Ascending, for the horizontal bar chart
    pub category_chart: Vec<GroupTotal>,
    pub customer_chart: Vec<GroupTotal>,
    pub customer_summary: Vec<GroupTotal>,
    /// Top products by units, re-sorted ascending for the horizontal bar chart
    pub product_chart: Vec<GroupTotal>,
    pub product_summary: Vec<ProductSummary>,
    /// Always 12 entries, Jan-Dec
    pub monthly_sales: Vec<MonthlySales>,
    /// None when no review falls in the reporting year
    pub review_trend: Option<ReviewTrend>,
}

// ============================================================================
// GROUPING HELPERS
// ============================================================================

/// Sum `value` per `key`, skipping rows with a missing or empty key. Groups come out in
/// first-appearance order.
fn group_sum<'a, K, V>(rows: &'a [EnrichedLine], key: K, value: V) -> Vec<GroupTotal>
where
    K: Fn(&'a EnrichedLine) -> Option<&'a str>,
    V: Fn(&EnrichedLine) -> f64,
{
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<GroupTotal> = Vec::new();

    for row in rows {
        let Some(k) = key(row).filter(|k| !k.is_empty()) else { continue };
        match positions.get(k) {
            Some(&i) => groups[i].value += value(row),
            None => {
                positions.insert(k, groups.len());
                groups.push(GroupTotal::new(k, value(row)));
            }
        }
    }

    groups
}

fn by_value_desc(a: &GroupTotal, b: &GroupTotal) -> Ordering {
    b.value.partial_cmp(&a.value).unwrap_or(Ordering::Equal)
}

fn by_value_asc(a: &GroupTotal, b: &GroupTotal) -> Ordering {
    a.value.partial_cmp(&b.value).unwrap_or(Ordering::Equal)
}

/// First `n` entries, never padded
pub fn top_n(groups: &[GroupTotal], n: usize) -> Vec<GroupTotal> {
    groups.iter().take(n).cloned().collect()
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

// ============================================================================
// AGGREGATIONS
// ============================================================================

pub fn total_sales(rows: &[EnrichedLine]) -> f64 {
    rows.iter().map(|r| r.subtotal).sum()
}

pub fn total_units(rows: &[EnrichedLine]) -> f64 {
    rows.iter().map(|r| r.quantity.unwrap_or(0.0)).sum()
}

/// Distinct non-empty values; empty cells are null and not counted
fn distinct<'a, I>(values: I) -> usize
where
    I: Iterator<Item = &'a str>,
{
    values.filter(|v| !v.is_empty()).collect::<HashSet<_>>().len()
}

pub fn headline(rows: &[EnrichedLine]) -> Headline {
    let invoices = distinct(rows.iter().map(|r| r.invoice_id.as_str()));
    let customers = distinct(rows.iter().filter_map(|r| r.customer_id.as_deref()));
    let products = distinct(rows.iter().map(|r| r.product_id.as_str()));

    Headline {
        total_sales: total_sales(rows),
        total_units: total_units(rows),
        invoices,
        customers,
        products,
    }
}

/// Mean score and count of reviews dated in `year`; 0/0 when there are none
pub fn review_summary(reviews: &[Review], year: i32) -> ReviewSummary {
    let in_year: Vec<&Review> = reviews
        .iter()
        .filter(|r| month_in_year(parse_date(&r.date), year).is_some())
        .collect();

    let scores: Vec<f64> = in_year.iter().filter_map(|r| r.score).collect();

    ReviewSummary {
        year,
        mean_score: mean(&scores),
        count: in_year.len(),
    }
}

/// Sales per category, descending
pub fn sales_by_category(rows: &[EnrichedLine]) -> Vec<GroupTotal> {
    let mut groups = group_sum(rows, |r| r.category_name.as_deref(), |r| r.subtotal);
    groups.sort_by(by_value_desc);
    groups
}

/// Sales per customer name, descending
pub fn sales_by_customer(rows: &[EnrichedLine]) -> Vec<GroupTotal> {
    let mut groups = group_sum(rows, |r| r.customer_name.as_deref(), |r| r.subtotal);
    groups.sort_by(by_value_desc);
    groups
}

/// Units sold per product description, descending
pub fn units_by_product(rows: &[EnrichedLine]) -> Vec<GroupTotal> {
    let mut groups = group_sum(
        rows,
        |r| r.description.as_deref(),
        |r| r.quantity.unwrap_or(0.0),
    );
    groups.sort_by(by_value_desc);
    groups
}

/// Revenue of one product, recomputed from the enriched rows
pub fn product_revenue(rows: &[EnrichedLine], description: &str) -> f64 {
    rows.iter()
        .filter(|r| r.description.as_deref() == Some(description))
        .map(|r| r.subtotal)
        .sum()
}

pub fn category_shares(categories: &[GroupTotal], total: f64) -> Vec<CategoryShare> {
    categories
        .iter()
        .map(|g| CategoryShare {
            category: g.label.clone(),
            sales: g.value,
            percent: if total != 0.0 { g.value / total * 100.0 } else { 0.0 },
        })
        .collect()
}

/// Sales per invoice month for `year`, zero-filled over all 12 months
pub fn monthly_sales(rows: &[EnrichedLine], year: i32) -> Vec<MonthlySales> {
    let mut totals = [0.0f64; 12];
    for row in rows {
        if let Some(month) = month_in_year(row.invoice_date, year) {
            totals[(month - 1) as usize] += row.subtotal;
        }
    }

    totals
        .iter()
        .enumerate()
        .map(|(i, &sales)| MonthlySales {
            month: i as u32 + 1,
            label: MONTH_LABELS[i],
            sales,
        })
        .collect()
}

/// Review score and count per review month for `year`, over the enriched
/// rows. None when no row has a review dated in `year`.
pub fn review_trend(rows: &[EnrichedLine], year: i32) -> Option<ReviewTrend> {
    let mut scores: Vec<Vec<f64>> = vec![Vec::new(); 12];
    let mut counts = [0usize; 12];

    for row in rows {
        if let Some(month) = month_in_year(row.review_date, year) {
            let idx = (month - 1) as usize;
            counts[idx] += 1;
            if let Some(score) = row.review_score {
                scores[idx].push(score);
            }
        }
    }

    let total_reviews: usize = counts.iter().sum();
    if total_reviews == 0 {
        return None;
    }

    let months: Vec<MonthlyReview> = (0..12)
        .map(|i| MonthlyReview {
            month: i as u32 + 1,
            label: MONTH_LABELS[i],
            mean_score: mean(&scores[i]),
            count: counts[i],
        })
        .collect();

    // months with reviews but no scores show 0 and are left out of the overall mean
    let monthly_means: Vec<f64> = months
        .iter()
        .zip(&scores)
        .filter(|(m, s)| m.count == 0 || !s.is_empty())
        .map(|(m, _)| m.mean_score)
        .collect();

    Some(ReviewTrend {
        overall_mean: mean(&monthly_means),
        total_reviews,
        months,
    })
}

/// Aggregate an already-joined table
pub fn aggregate(rows: &[EnrichedLine], reviews: &[Review], options: ReportOptions) -> Report {
    let headline = headline(rows);
    let reviews = review_summary(reviews, options.year);
    if reviews.count == 0 {
        warn!("no reviews recorded for {}", options.year);
    }

    let categories = sales_by_category(rows);
    let mut category_chart = categories.clone();
    category_chart.sort_by(by_value_asc);
    let category_sales = category_shares(&categories, headline.total_sales);

    let customers = sales_by_customer(rows);
    let customer_chart = top_n(&customers, options.top_customers_chart);
    let customer_summary = top_n(&customers, options.top_customers_summary);

    let products = units_by_product(rows);
    let mut product_chart = top_n(&products, options.top_products_chart);
    product_chart.sort_by(by_value_asc);
    let product_summary = top_n(&products, options.top_products_summary)
        .into_iter()
        .map(|g| ProductSummary {
            revenue: product_revenue(rows, &g.label),
            description: g.label,
            units: g.value,
        })
        .collect();

    let review_trend = review_trend(rows, options.year);

    debug!(
        categories = categories.len(),
        customers = customers.len(),
        products = products.len(),
        has_review_trend = review_trend.is_some(),
        "aggregation complete"
    );

    Report {
        options,
        headline,
        reviews,
        category_sales,
        category_chart,
        customer_chart,
        customer_summary,
        product_chart,
        product_summary,
        monthly_sales: monthly_sales(rows, options.year),
        review_trend,
    }
}

/// Join + aggregate in one call
pub fn build_report(tables: &Tables, options: ReportOptions) -> Report {
    let rows = join_tables(tables);
    aggregate(&rows, &tables.reviews, options)
}

// ============================================================================
// TESTS
// ============================================================================
