// Error types shared by the library modules. The binary wraps these in
// `anyhow` with extra context before reporting them to the user.

use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum DstnError {
    #[error("Failed to read {}: {source}", .path.display())]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Unsupported config format '{0}' (expected .json, .yaml or .yml)")]
    UnsupportedConfigFormat(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A student list row that cannot be turned into a query.
    #[error("Invalid row {line} in student list: {reason}")]
    InvalidRow { line: u64, reason: String },

    /// Raised while rendering a record, never while building one.
    #[error("Missing field '{0}' in record")]
    MissingField(String),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, DstnError>;
