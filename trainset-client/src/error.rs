//! Error types for clients

use thiserror::Error;

/// Error type for clients
#[derive(Error, Debug)]
pub enum Error {
    /// Core library error
    #[error("{0}")]
    Core(#[from] trainset_core::Error),

    /// Catalog storage error
    #[error("Catalog error: {0}")]
    Catalog(#[from] trainset_catalog::Error),

    /// Configuration could not be read or is inconsistent
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON encoding or decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for clients
pub type Result<T> = std::result::Result<T, Error>;
