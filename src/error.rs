//! Error types.
use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum ReportError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("serde JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Missing column {column} in {path}")]
    MissingColumn { path: PathBuf, column: String },
}

impl ReportError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ReportError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
