//! Configuration file handling.
//!
//! Settings come from three layers: built-in defaults, an optional
//! `dashboard.toml`, and command-line overrides applied by the binaries.

use crate::aggregate::ReportOptions;
use crate::error::{DashboardError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "dashboard.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub report: ReportConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

/// Where the CSV extracts live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
        }
    }
}

fn default_base_dir() -> PathBuf {
    PathBuf::from("csv de ventas_2025")
}

/// Report parameters. Missing keys fall back to [`ReportOptions::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_year")]
    pub year: i32,

    #[serde(default = "default_top_customers_chart")]
    pub top_customers_chart: usize,

    #[serde(default = "default_top_customers_summary")]
    pub top_customers_summary: usize,

    #[serde(default = "default_top_products_chart")]
    pub top_products_chart: usize,

    #[serde(default = "default_top_products_summary")]
    pub top_products_summary: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        let o = ReportOptions::default();
        Self {
            year: o.year,
            top_customers_chart: o.top_customers_chart,
            top_customers_summary: o.top_customers_summary,
            top_products_chart: o.top_products_chart,
            top_products_summary: o.top_products_summary,
        }
    }
}

fn default_year() -> i32 {
    ReportOptions::default().year
}

fn default_top_customers_chart() -> usize {
    ReportOptions::default().top_customers_chart
}

fn default_top_customers_summary() -> usize {
    ReportOptions::default().top_customers_summary
}

fn default_top_products_chart() -> usize {
    ReportOptions::default().top_products_chart
}

fn default_top_products_summary() -> usize {
    ReportOptions::default().top_products_summary
}

/// HTTP server settings (only read by `sales-server`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_addr")]
    pub addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
        }
    }
}

fn default_addr() -> String {
    "0.0.0.0:3000".to_string()
}

impl Config {
    /// Parse a TOML document.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| DashboardError::Config(e.to_string()))
    }

    /// Load from an explicit path; the file must exist.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| DashboardError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Load `path` if given, else `dashboard.toml` if present, else defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load_from_file(p),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::load_from_file(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            year: self.report.year,
            top_customers_chart: self.report.top_customers_chart,
            top_customers_summary: self.report.top_customers_summary,
            top_products_chart: self.report.top_products_chart,
            top_products_summary: self.report.top_products_summary,
        }
    }

    /// Apply command-line overrides.
    pub fn merge_overrides(&mut self, base_dir: Option<PathBuf>, year: Option<i32>) {
        if let Some(dir) = base_dir {
            self.data.base_dir = dir;
        }
        if let Some(year) = year {
            self.report.year = year;
        }
    }
}
