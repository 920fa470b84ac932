use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("CSV input has no 'text' column (found: {found})")]
    MissingTextColumn { found: String },

    #[error("Unsupported input file: {}", .0.display())]
    UnsupportedFile(PathBuf),

    #[error("Invalid label: {0}")]
    InvalidLabel(String),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
