use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("document is not a JSON object (found {0})")]
    NotAMapping(&'static str),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("record has no integer id")]
    MissingId,

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Why a single source document did not make it into the store.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error("write failed: {0}")]
    Store(#[from] StoreError),
}

/// A per-document failure, kept with its source path for diagnostics.
#[derive(Debug)]
pub struct DocumentFailure {
    pub source: PathBuf,
    pub error: DocumentError,
}
