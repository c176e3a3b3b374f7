//! Error types for the SQLite catalog

use thiserror::Error;

/// Error type for catalog storage
#[derive(Error, Debug)]
pub enum Error {
    /// Core library error
    #[error("Core error: {0}")]
    Core(#[from] trainset_core::Error),

    /// SQLite error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Stored JSON could not be decoded
    #[error("Malformed stored value: {0}")]
    Json(#[from] serde_json::Error),

    /// The connection lock was poisoned by a panicking holder
    #[error("Catalog connection lock poisoned")]
    Poisoned,
}

/// Result type for catalog storage
pub type Result<T> = std::result::Result<T, Error>;

impl From<Error> for trainset_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Core(core) => core,
            other => trainset_core::Error::Catalog(other.to_string()),
        }
    }
}
