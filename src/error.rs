// Error types shared by the loader, the config layer and the binaries

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    /// One or more of the required CSV extracts is absent from the data directory.
    /// Fatal: no partial report is produced.
    #[error("missing required files: {}", .0.join(", "))]
    MissingInputFiles(Vec<String>),

    /// A CSV file exists but could not be read or deserialized.
    #[error("failed to read {file}: {source}")]
    Csv {
        file: String,
        #[source]
        source: csv::Error,
    },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration error: {0}")]
    Config(String),
}

impl DashboardError {
    /// Names of the missing files, empty for every other error kind.
    pub fn missing_files(&self) -> &[String] {
        match self {
            DashboardError::MissingInputFiles(names) => names,
            _ => &[],
        }
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
