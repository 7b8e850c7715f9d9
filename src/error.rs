//! Error types for the sales dashboard.

use std::path::PathBuf;

/// Dashboard error type.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    /// IO error.
    #[error("IO error at {path}: {message}")]
    Io { path: PathBuf, message: String },

    /// The server could not bind or accept on its address.
    #[error("Server error on {addr}: {message}")]
    Server { addr: String, message: String },

    /// CSV reader error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Boundary download failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The boundary document is not a usable feature collection.
    #[error("Invalid boundary data: {0}")]
    InvalidBoundaries(String),

    /// A request carried a value the dashboard cannot use.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// The sales file produced no usable rows.
    #[error("No sales rows loaded from {0}")]
    NoData(PathBuf),
}

impl DashboardError {
    pub fn io(path: impl Into<PathBuf>, e: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: e.to_string(),
        }
    }
}

/// Result type for dashboard operations.
pub type DashboardResult<T> = Result<T, DashboardError>;
