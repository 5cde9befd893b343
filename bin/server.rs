// Sales Dashboard - Web Server
// Every report request re-runs the whole pipeline from disk

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Json},
    routing::get,
    Router,
};
use clap::Parser;
use sales_dashboard::{
    executive_summary, metric_cards, missing_files, review_card, review_notice, review_trend_line,
    run_pipeline, Config, DashboardError, MetricCard, Report, ReportOptions, SummarySection,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Serve the sales dashboard over HTTP", long_about = None)]
struct Args {
    /// Directory holding the six CSV extracts
    #[arg(short, long, value_name = "DIR", env = "SALES_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Reporting year
    #[arg(short, long, env = "SALES_REPORT_YEAR")]
    year: Option<i32>,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Listen address, overrides [server] addr
    #[arg(long, env = "SALES_SERVER_ADDR")]
    addr: Option<String>,
}

/// Shared application state. Read-only; nothing is cached between requests.
#[derive(Clone)]
struct AppState {
    base_dir: Arc<PathBuf>,
    options: ReportOptions,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    missing_files: Vec<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
            missing_files: Vec::new(),
        }
    }
}

impl ApiResponse<Option<ReportResponse>> {
    fn failed(err: &DashboardError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(err.to_string()),
            missing_files: err.missing_files().to_vec(),
        }
    }
}

/// Report plus the pre-rendered text pieces, so the page renders exactly
/// what the terminal shows
#[derive(Serialize)]
struct ReportResponse {
    report: Report,
    cards: Vec<MetricCard>,
    review_card: MetricCard,
    review_notice: Option<String>,
    review_trend_line: Option<String>,
    summary: Vec<SummarySection>,
}

impl From<Report> for ReportResponse {
    fn from(report: Report) -> Self {
        Self {
            cards: metric_cards(&report),
            review_card: review_card(&report),
            review_notice: review_notice(&report),
            review_trend_line: review_trend_line(&report),
            summary: executive_summary(&report),
            report,
        }
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/report - Load, join and aggregate from scratch
async fn get_report(State(state): State<AppState>) -> impl IntoResponse {
    let base_dir = state.base_dir.clone();
    let options = state.options;

    let result = tokio::task::spawn_blocking(move || run_pipeline(&base_dir, options)).await;

    match result {
        Ok(Ok(report)) => {
            (StatusCode::OK, Json(ApiResponse::ok(Some(ReportResponse::from(report))))).into_response()
        }
        Ok(Err(e @ DashboardError::MissingInputFiles(_))) => {
            warn!("report requested but inputs are missing: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, Json(ApiResponse::failed(&e))).into_response()
        }
        Ok(Err(e)) => {
            error!("Error building report: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(ApiResponse::failed(&e))).into_response()
        }
        Err(join_err) => {
            error!("report task panicked: {}", join_err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<Option<ReportResponse>> {
                    success: false,
                    data: None,
                    error: Some("internal error".to_string()),
                    missing_files: Vec::new(),
                }),
            )
                .into_response()
        }
    }
}

/// GET /api/missing - Which required files are absent right now
async fn get_missing(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::ok(missing_files(&state.base_dir)))
}

/// GET / - Serve index.html
async fn serve_index() -> impl IntoResponse {
    Html(include_str!("../web/index.html"))
}

fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/report", get(get_report))
        .route("/missing", get(get_missing))
        .with_state(state);

    Router::new()
        .route("/", get(serve_index))
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    let mut config = Config::load(args.config.as_deref()).context("Failed to load configuration")?;
    config.merge_overrides(args.data_dir, args.year);
    if let Some(addr) = args.addr {
        config.server.addr = addr;
    }

    let missing = missing_files(&config.data.base_dir);
    if !missing.is_empty() {
        warn!(
            "data directory {} is missing {:?}; /api/report will fail until they exist",
            config.data.base_dir.display(),
            missing
        );
    }

    let state = AppState {
        base_dir: Arc::new(config.data.base_dir.clone()),
        options: config.report_options(),
    };

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.server.addr))?;

    info!("🚀 Server running on http://{}", config.server.addr);
    info!("   API: http://{}/api/report", config.server.addr);
    info!("   data: {} | year: {}", config.data.base_dir.display(), config.report.year);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
