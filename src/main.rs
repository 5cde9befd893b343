// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, info, Level};
use tracing_subscriber::EnvFilter;

// Use library instead of local modules
use sales_dashboard::{render_text_report, run_pipeline, Config, DashboardError, Report, ReportOptions};

/// Sales & review dashboard for the technology-products CSV extracts
///
/// Reads cliente.csv, factura.csv, detalle_factura.csv, producto.csv,
/// rubro.csv and reseña.csv from the data directory and renders the report.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding the six CSV extracts
    #[arg(short, long, value_name = "DIR", env = "SALES_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Reporting year for the monthly and review views
    #[arg(short, long, env = "SALES_REPORT_YEAR", global = true)]
    year: Option<i32>,

    /// Path to configuration file (defaults to ./dashboard.toml when present)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Interactive terminal dashboard (default)
    Tui,
    /// Print the full report as plain text and exit
    Summary,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let command = args.command.unwrap_or(Command::Tui);

    init_logging(&args, command);
    debug!("Arguments: {:?}", args);

    let mut config = Config::load(args.config.as_deref()).context("Failed to load configuration")?;
    config.merge_overrides(args.data_dir.clone(), args.year);
    let options = config.report_options();
    let base_dir = config.data.base_dir.clone();

    info!("Sales Dashboard v{} - data: {}, year: {}", sales_dashboard::VERSION, base_dir.display(), options.year);

    let report = match run_pipeline(&base_dir, options) {
        Ok(report) => report,
        Err(DashboardError::MissingInputFiles(missing)) => {
            eprintln!("❌ Missing required files in {}:", base_dir.display());
            for name in &missing {
                eprintln!("   - {}", name);
            }
            std::process::exit(1);
        }
        Err(e) => return Err(e).context("Failed to build report"),
    };

    match command {
        Command::Summary => {
            print!("{}", render_text_report(&report));
            Ok(())
        }
        Command::Tui => run_ui_mode(report, base_dir, options),
    }
}

/// Default level depends on the surface: log lines would tear the TUI screen.
fn init_logging(args: &Args, command: Command) {
    let level = if args.quiet {
        Level::ERROR
    } else if args.verbose {
        Level::DEBUG
    } else if command == Command::Tui {
        Level::WARN
    } else {
        Level::INFO
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

#[cfg(feature = "tui")]
fn run_ui_mode(report: Report, base_dir: PathBuf, options: ReportOptions) -> Result<()> {
    let mut app = ui::App::new(report, base_dir, options);
    ui::run_ui(&mut app)?;
    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(report: Report, _base_dir: PathBuf, _options: ReportOptions) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Showing the plain-text report instead.\n");
    print!("{}", render_text_report(&report));
    Ok(())
}
