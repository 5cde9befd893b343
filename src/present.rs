// Presenter - text rendering shared by the terminal UI, the CLI summary and
// the HTTP surface

use crate::aggregate::{GroupTotal, Report};
use serde::Serialize;
use std::fmt::Write as _;

const BAR_WIDTH: usize = 40;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricCard {
    pub icon: &'static str,
    pub title: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummarySection {
    pub title: &'static str,
    pub items: Vec<String>,
}

// ============================================================================
// NUMBER FORMATTING
// ============================================================================

/// `$12,345.67`
pub fn format_money(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = group_thousands(cents / 100);
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, whole, cents % 100)
}

/// Whole units print without decimals
pub fn format_units(units: f64) -> String {
    if units.fract() != 0.0 {
        return format!("{:.2}", units);
    }
    let sign = if units < 0.0 { "-" } else { "" };
    format!("{}{}", sign, group_thousands(units.abs() as u64))
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

// ============================================================================
// REPORT PIECES
// ============================================================================

/// The four headline cards, in display order
pub fn metric_cards(report: &Report) -> Vec<MetricCard> {
    let h = &report.headline;
    vec![
        MetricCard {
            icon: "💰",
            title: "Total Sales".to_string(),
            value: format_money(h.total_sales),
        },
        MetricCard {
            icon: "🧾",
            title: "Invoices".to_string(),
            value: h.invoices.to_string(),
        },
        MetricCard {
            icon: "👥",
            title: "Unique Customers".to_string(),
            value: h.customers.to_string(),
        },
        MetricCard {
            icon: "📦",
            title: "Products Sold".to_string(),
            value: h.products.to_string(),
        },
    ]
}

/// `4.2/5 (17 reviews)`
pub fn review_headline(report: &Report) -> String {
    format!(
        "{:.1}/5 ({} reviews)",
        report.reviews.mean_score, report.reviews.count
    )
}

/// Review card, titled with the reporting year
pub fn review_card(report: &Report) -> MetricCard {
    MetricCard {
        icon: "⭐",
        title: format!("Average Review {}", report.options.year),
        value: review_headline(report),
    }
}

/// Warning shown when the reporting year has no reviews at all
pub fn review_notice(report: &Report) -> Option<String> {
    if report.reviews.count == 0 {
        Some(format!("No reviews recorded for {}.", report.options.year))
    } else {
        None
    }
}

/// Info line under the monthly review chart
pub fn review_trend_line(report: &Report) -> Option<String> {
    report.review_trend.as_ref().map(|trend| {
        format!(
            "Overall average score: {:.2}/5 | Total reviews: {}",
            trend.overall_mean, trend.total_reviews
        )
    })
}

/// Top customers, top products and per-category sales
pub fn executive_summary(report: &Report) -> Vec<SummarySection> {
    let customers = report
        .customer_summary
        .iter()
        .enumerate()
        .map(|(i, g)| format!("{}. {} — {}", i + 1, g.label, format_money(g.value)))
        .collect();

    let products = report
        .product_summary
        .iter()
        .enumerate()
        .map(|(i, p)| {
            format!(
                "{}. {} — {} units | {}",
                i + 1,
                p.description,
                format_units(p.units),
                format_money(p.revenue)
            )
        })
        .collect();

    let categories = report
        .category_sales
        .iter()
        .map(|c| format!("- {}: {} ({:.1}%)", c.category, format_money(c.sales), c.percent))
        .collect();

    vec![
        SummarySection {
            title: "Top Customers",
            items: customers,
        },
        SummarySection {
            title: "Top Selling Products",
            items: products,
        },
        SummarySection {
            title: "Sales by Category",
            items: categories,
        },
    ]
}

// ============================================================================
// PLAIN TEXT REPORT
// ============================================================================

/// Proportional bar of `#`; at least one cell for any positive value
pub fn ascii_bar(value: f64, max: f64, width: usize) -> String {
    if width == 0 || max <= 0.0 || value <= 0.0 {
        return String::new();
    }
    let cells = ((value / max) * width as f64).round() as usize;
    "#".repeat(cells.clamp(1, width))
}

fn write_bars<F>(out: &mut String, groups: &[GroupTotal], fmt_value: F)
where
    F: Fn(f64) -> String,
{
    let max = groups.iter().map(|g| g.value).fold(0.0, f64::max);
    let label_width = groups
        .iter()
        .map(|g| g.label.chars().count())
        .max()
        .unwrap_or(0)
        .min(32);

    for g in groups {
        let label: String = g.label.chars().take(label_width).collect();
        let _ = writeln!(
            out,
            "  {:<width$}  {:<bar$}  {}",
            label,
            ascii_bar(g.value, max, BAR_WIDTH),
            fmt_value(g.value),
            width = label_width,
            bar = BAR_WIDTH
        );
    }
}

fn heading(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n{}", title);
    let _ = writeln!(out, "{}", "━".repeat(title.chars().count().max(20)));
}

/// The whole dashboard as plain text, in the fixed panel order
pub fn render_text_report(report: &Report) -> String {
    let year = report.options.year;
    let mut out = String::new();

    heading(&mut out, "📈 General Metrics");
    for card in metric_cards(report) {
        let _ = writeln!(out, "  {} {:<18} {}", card.icon, card.title, card.value);
    }
    let review = review_card(report);
    let _ = writeln!(out, "  {} {:<18} {}", review.icon, review.title, review.value);
    if let Some(notice) = review_notice(report) {
        let _ = writeln!(out, "  ⚠️  {}", notice);
    }

    heading(&mut out, "🏷️  Sales by Category");
    write_bars(&mut out, &report.category_chart, format_money);

    heading(&mut out, "👑 Top Customers");
    write_bars(&mut out, &report.customer_chart, format_money);

    heading(&mut out, &format!("📆 Monthly Sales {}", year));
    let months: Vec<GroupTotal> = report
        .monthly_sales
        .iter()
        .map(|m| GroupTotal {
            label: m.label.to_string(),
            value: m.sales,
        })
        .collect();
    write_bars(&mut out, &months, format_money);

    heading(&mut out, "📊 Top Products by Quantity");
    write_bars(&mut out, &report.product_chart, format_units);

    heading(&mut out, &format!("📦 Shipping Reviews {}", year));
    match &report.review_trend {
        Some(trend) => {
            for m in &trend.months {
                let _ = writeln!(
                    out,
                    "  {}  score {:.2}  {:<bar$}  {} reviews",
                    m.label,
                    m.mean_score,
                    ascii_bar(m.mean_score, 5.0, BAR_WIDTH / 2),
                    m.count,
                    bar = BAR_WIDTH / 2
                );
            }
            if let Some(line) = review_trend_line(report) {
                let _ = writeln!(out, "  ℹ️  {}", line);
            }
        }
        None => {
            let _ = writeln!(out, "  ⚠️  No reviews recorded for {}.", year);
        }
    }

    heading(&mut out, "🧾 Executive Summary");
    for section in executive_summary(report) {
        let _ = writeln!(out, "\n  {}", section.title);
        for item in section.items {
            let _ = writeln!(out, "    {}", item);
        }
    }

    out
}
