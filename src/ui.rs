use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, GraphType, Paragraph, Wrap},
    Frame, Terminal,
};
use sales_dashboard::{
    executive_summary, format_money, format_units, metric_cards, review_card, review_notice,
    review_trend_line, run_pipeline, DashboardError, GroupTotal, Report, ReportOptions, MONTH_LABELS,
};
use std::io;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Overview,
    MonthlySales,
    Products,
    Reviews,
    Summary,
}

impl Page {
    pub const ALL: [Page; 5] = [
        Page::Overview,
        Page::MonthlySales,
        Page::Products,
        Page::Reviews,
        Page::Summary,
    ];

    pub fn next(&self) -> Self {
        match self {
            Page::Overview => Page::MonthlySales,
            Page::MonthlySales => Page::Products,
            Page::Products => Page::Reviews,
            Page::Reviews => Page::Summary,
            Page::Summary => Page::Overview,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::Overview => Page::Summary,
            Page::MonthlySales => Page::Overview,
            Page::Products => Page::MonthlySales,
            Page::Reviews => Page::Products,
            Page::Summary => Page::Reviews,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Overview => "Overview",
            Page::MonthlySales => "Monthly Sales",
            Page::Products => "Products",
            Page::Reviews => "Reviews",
            Page::Summary => "Summary",
        }
    }
}

pub struct App {
    /// None after a reload that hit a fatal input error
    pub report: Option<Report>,
    pub error: Option<String>,
    pub base_dir: PathBuf,
    pub options: ReportOptions,
    pub current_page: Page,
}

impl App {
    pub fn new(report: Report, base_dir: PathBuf, options: ReportOptions) -> Self {
        Self {
            report: Some(report),
            error: None,
            base_dir,
            options,
            current_page: Page::Overview,
        }
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
    }

    /// 1-based page shortcut
    pub fn select_page(&mut self, n: usize) {
        if let Some(page) = n.checked_sub(1).and_then(|i| Page::ALL.get(i)) {
            self.current_page = *page;
        }
    }

    /// Re-run the whole pipeline from disk. A fatal error replaces the report.
    pub fn reload(&mut self) {
        match run_pipeline(&self.base_dir, self.options) {
            Ok(report) => {
                info!("report reloaded from {}", self.base_dir.display());
                self.report = Some(report);
                self.error = None;
            }
            Err(e) => {
                warn!("reload failed: {}", e);
                self.report = None;
                self.error = Some(describe_error(&e));
            }
        }
    }
}

fn describe_error(e: &DashboardError) -> String {
    match e {
        DashboardError::MissingInputFiles(names) => {
            let mut msg = String::from("Missing required files:");
            for name in names {
                msg.push_str("\n   - ");
                msg.push_str(name);
            }
            msg
        }
        other => other.to_string(),
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Tab => app.next_page(),
                KeyCode::BackTab => app.previous_page(),
                KeyCode::Right | KeyCode::Char('l') => app.next_page(),
                KeyCode::Left | KeyCode::Char('h') => app.previous_page(),
                KeyCode::Char('r') => app.reload(),
                KeyCode::Char(c) if c.is_ascii_digit() => {
                    app.select_page(c.to_digit(10).unwrap_or(0) as usize)
                }
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    return Ok(())
                }
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    match (&app.report, &app.error) {
        (Some(report), _) => match app.current_page {
            Page::Overview => render_overview(f, chunks[1], report),
            Page::MonthlySales => render_monthly_sales(f, chunks[1], report),
            Page::Products => render_products(f, chunks[1], report),
            Page::Reviews => render_reviews(f, chunks[1], report),
            Page::Summary => render_summary(f, chunks[1], report),
        },
        (None, error) => render_error(f, chunks[1], error.as_deref().unwrap_or("No report")),
    }

    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let mut tab_spans = vec![];
    for (i, page) in Page::ALL.iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(format!("{} {}", i + 1, page.title()), style));
    }

    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Year: {}", app.options.year),
        Style::default().fg(Color::White),
    ));
    if let Some(report) = &app.report {
        tab_spans.push(Span::raw("  |  "));
        tab_spans.push(Span::styled(
            format_money(report.headline.total_sales),
            Style::default().fg(Color::Green),
        ));
    }

    let header = Paragraph::new(vec![Line::from(tab_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" 📊 Sales Analysis "),
    );

    f.render_widget(header, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let status_spans = vec![
        Span::styled(
            format!(" {} ", app.base_dir.display()),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw(" | "),
        Span::styled("Tab", Style::default().fg(Color::Yellow)),
        Span::raw(" Page | "),
        Span::styled("1-5", Style::default().fg(Color::Yellow)),
        Span::raw(" Jump | "),
        Span::styled("r", Style::default().fg(Color::Yellow)),
        Span::raw(" Reload | "),
        Span::styled("q", Style::default().fg(Color::Red)),
        Span::raw(" Quit"),
    ];

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn render_error(f: &mut Frame, area: Rect, message: &str) {
    let mut content = vec![Line::from("")];
    for line in message.lines() {
        content.push(Line::from(Span::styled(
            format!("  {}", line),
            Style::default().fg(Color::Red),
        )));
    }
    content.push(Line::from(""));
    content.push(Line::from(Span::styled(
        "  Fix the data directory and press r to reload",
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::ITALIC),
    )));

    let panel = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red))
            .title(" ❌ Input Error "),
    );
    f.render_widget(panel, area);
}

// ============================================================================
// PAGES
// ============================================================================

fn render_overview(f: &mut Frame, area: Rect, report: &Report) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0)])
        .split(area);

    let mut cards = metric_cards(report);
    cards.push(review_card(report));

    let card_areas = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 5); 5])
        .split(rows[0]);

    let review_index = cards.len() - 1;
    for (i, (card, card_area)) in cards.iter().zip(card_areas.iter()).enumerate() {
        let value_style = Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD);
        let mut lines = vec![Line::from(Span::styled(card.value.clone(), value_style))];
        if i == review_index {
            if let Some(notice) = review_notice(report) {
                lines.push(Line::from(Span::styled(
                    format!("⚠️  {}", notice),
                    Style::default().fg(Color::Yellow),
                )));
            }
        }
        let widget = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(format!(" {} {} ", card.icon, card.title)),
        );
        f.render_widget(widget, *card_area);
    }

    let charts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);

    // category_chart is ascending; largest goes on top
    let categories: Vec<GroupTotal> = report.category_chart.iter().rev().cloned().collect();
    render_hbars(f, charts[0], " 🏷️  Sales by Category ", &categories, format_money, Color::Magenta);
    render_hbars(f, charts[1], " 👑 Top Customers ", &report.customer_chart, format_money, Color::Green);
}

fn render_products(f: &mut Frame, area: Rect, report: &Report) {
    let products: Vec<GroupTotal> = report.product_chart.iter().rev().cloned().collect();
    render_hbars(
        f,
        area,
        " 📊 Top Products by Quantity ",
        &products,
        format_units,
        Color::LightRed,
    );
}

fn render_hbars<F>(
    f: &mut Frame,
    area: Rect,
    title: &str,
    groups: &[GroupTotal],
    fmt_value: F,
    color: Color,
) where
    F: Fn(f64) -> String,
{
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .title(title.to_string());

    if groups.is_empty() {
        f.render_widget(Paragraph::new("  No data").block(block), area);
        return;
    }

    let bars: Vec<Bar> = groups
        .iter()
        .map(|g| {
            Bar::default()
                .value(bar_value(g.value))
                .label(Line::from(truncate(&g.label, 24)))
                .text_value(fmt_value(g.value))
                .style(Style::default().fg(color))
                .value_style(Style::default().fg(Color::Black).bg(color))
        })
        .collect();

    let chart = BarChart::default()
        .block(block)
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(1)
        .data(BarGroup::default().bars(&bars));

    f.render_widget(chart, area);
}

fn render_monthly_sales(f: &mut Frame, area: Rect, report: &Report) {
    let values: Vec<f64> = report.monthly_sales.iter().map(|m| m.sales).collect();
    let line_points = series_points(&values);
    let y_max = axis_max(&values);
    let area_points = fill_points(&values, y_max / 24.0);

    let datasets = vec![
        Dataset::default()
            .marker(Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(Color::Green).add_modifier(Modifier::DIM))
            .data(&area_points),
        Dataset::default()
            .name("Sales")
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
            .data(&line_points),
    ];

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(format!(" 📆 Monthly Sales ({}) ", report.options.year)),
        )
        .x_axis(month_axis())
        .y_axis(
            Axis::default()
                .style(Style::default().fg(Color::DarkGray))
                .bounds([0.0, y_max])
                .labels(vec![
                    Span::raw("$0"),
                    Span::raw(format_money(y_max / 2.0)),
                    Span::raw(format_money(y_max)),
                ]),
        );

    f.render_widget(chart, area);
}

fn render_reviews(f: &mut Frame, area: Rect, report: &Report) {
    let title = format!(" 📦 Shipping Reviews ({}) ", report.options.year);

    let Some(trend) = &report.review_trend else {
        let notice = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                format!("  ⚠️  No reviews recorded for {}.", report.options.year),
                Style::default().fg(Color::Yellow),
            )),
        ])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(title),
        );
        f.render_widget(notice, area);
        return;
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(55),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    let scores: Vec<f64> = trend.months.iter().map(|m| m.mean_score).collect();
    let score_points = series_points(&scores);
    let score_chart = Chart::new(vec![Dataset::default()
        .name("Average score (1-5)")
        .marker(Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
        .data(&score_points)])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(title),
    )
    .x_axis(month_axis())
    .y_axis(
        Axis::default()
            .title(Span::styled("Score", Style::default().fg(Color::Red)))
            .style(Style::default().fg(Color::DarkGray))
            .bounds([0.0, 5.0])
            .labels(vec![Span::raw("0"), Span::raw("2.5"), Span::raw("5")]),
    );
    f.render_widget(score_chart, rows[0]);

    let bars: Vec<Bar> = trend
        .months
        .iter()
        .map(|m| {
            Bar::default()
                .value(m.count as u64)
                .label(Line::from(m.label))
                .style(Style::default().fg(Color::LightBlue))
        })
        .collect();
    let counts = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(Span::styled(" Review count ", Style::default().fg(Color::LightBlue))),
        )
        .bar_width(3)
        .bar_gap(1)
        .data(BarGroup::default().bars(&bars));
    f.render_widget(counts, rows[1]);

    if let Some(info_line) = review_trend_line(report) {
        f.render_widget(
            Paragraph::new(Span::styled(
                format!(" ℹ️  {}", info_line),
                Style::default().fg(Color::Cyan),
            )),
            rows[2],
        );
    }
}

fn render_summary(f: &mut Frame, area: Rect, report: &Report) {
    let mut content = vec![Line::from("")];

    for section in executive_summary(report) {
        content.push(Line::from(Span::styled(
            format!("  {}", section.title),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )));
        content.push(Line::from(""));
        for item in section.items {
            content.push(Line::from(format!("    {}", item)));
        }
        content.push(Line::from(""));
    }

    let summary = Paragraph::new(content)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(" 🧾 Executive Summary "),
        );

    f.render_widget(summary, area);
}

// ============================================================================
// CHART HELPERS
// ============================================================================

fn month_axis<'a>() -> Axis<'a> {
    Axis::default()
        .style(Style::default().fg(Color::DarkGray))
        .bounds([1.0, 12.0])
        .labels(MONTH_LABELS.iter().map(|m| Span::raw(*m)).collect())
}

/// (month, value) pairs, months 1-12
fn series_points(values: &[f64]) -> Vec<(f64, f64)> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| ((i + 1) as f64, *v))
        .collect()
}

/// Upper bound of the y axis, never 0
fn axis_max(values: &[f64]) -> f64 {
    let max = values.iter().copied().fold(0.0, f64::max);
    if max > 0.0 {
        max * 1.1
    } else {
        1.0
    }
}

/// Grid of points under the polyline through `values`, used to shade the
/// area beneath the monthly sales line
fn fill_points(values: &[f64], y_step: f64) -> Vec<(f64, f64)> {
    const X_STEPS_PER_MONTH: usize = 8;

    if values.len() < 2 || y_step <= 0.0 {
        return Vec::new();
    }

    let mut points = Vec::new();
    let segments = values.len() - 1;
    for s in 0..segments {
        for k in 0..X_STEPS_PER_MONTH {
            let t = k as f64 / X_STEPS_PER_MONTH as f64;
            let x = (s + 1) as f64 + t;
            let top = values[s] + (values[s + 1] - values[s]) * t;
            let mut y = 0.0;
            while y < top {
                points.push((x, y));
                y += y_step;
            }
        }
    }
    points
}

fn bar_value(v: f64) -> u64 {
    // saturating: negatives clamp to 0
    v.round() as u64
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sales_dashboard::{aggregate, EnrichedLine};

    fn sample_report() -> Report {
        let line = EnrichedLine {
            invoice_id: "1".into(),
            product_id: "p".into(),
            quantity: Some(2.0),
            unit_price: Some(10.0),
            subtotal: 20.0,
            category_id: Some("c".into()),
            description: Some("Teclado".into()),
            category_name: Some("Accesorios".into()),
            customer_id: Some("1".into()),
            invoice_date_raw: Some("2025-04-01".into()),
            invoice_date: chrono::NaiveDate::from_ymd_opt(2025, 4, 1),
            customer_name: Some("Ana".into()),
            review_score: None,
            review_date: None,
        };
        aggregate(&[line], &[], ReportOptions::default())
    }

    #[test]
    fn test_page_cycle() {
        let mut page = Page::Overview;
        for _ in 0..Page::ALL.len() {
            page = page.next();
        }
        assert_eq!(page, Page::Overview);
        assert_eq!(Page::Overview.previous(), Page::Summary);
    }

    #[test]
    fn test_select_page_ignores_out_of_range() {
        let mut app = App::new(sample_report(), PathBuf::from("data"), ReportOptions::default());
        app.select_page(4);
        assert_eq!(app.current_page, Page::Reviews);
        app.select_page(0);
        app.select_page(9);
        assert_eq!(app.current_page, Page::Reviews);
    }

    #[test]
    fn test_reload_with_missing_files_drops_report() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut app = App::new(sample_report(), dir.path().to_path_buf(), ReportOptions::default());

        app.reload();

        assert!(app.report.is_none());
        let error = app.error.unwrap();
        assert!(error.starts_with("Missing required files:"));
        assert!(error.contains("   - rubro.csv"));
    }

    #[test]
    fn test_fill_points_stay_under_line() {
        let values = [0.0, 10.0, 0.0];
        let points = fill_points(&values, 1.0);
        assert!(!points.is_empty());
        for (x, y) in points {
            let top = if x <= 2.0 { (x - 1.0) * 10.0 } else { (3.0 - x) * 10.0 };
            assert!(y < top + 1e-9, "({}, {}) above line", x, y);
        }
    }

    #[test]
    fn test_axis_max_never_zero() {
        assert_eq!(axis_max(&[0.0; 12]), 1.0);
        assert!(axis_max(&[10.0]) > 10.0);
    }

    #[test]
    fn test_truncate_is_char_safe() {
        assert_eq!(truncate("Periféricos", 20), "Periféricos");
        assert_eq!(truncate("Periféricos y más cosas", 10), "Perifér...");
    }
}
