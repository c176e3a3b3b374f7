//! Error types for source readers

use thiserror::Error;

/// Error type for source readers
#[derive(Error, Debug)]
pub enum Error {
    /// Core library error
    #[error("Core error: {0}")]
    Core(#[from] trainset_core::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV format error
    #[cfg(feature = "csv")]
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for source readers
pub type Result<T> = std::result::Result<T, Error>;

impl From<Error> for trainset_core::Error {
    fn from(err: Error) -> Self {
        match err {
            // Core errors pass through untouched so callers can match on them
            Error::Core(core) => core,
            Error::Io(io) => trainset_core::Error::Io(io),
            #[cfg(feature = "csv")]
            Error::Csv(csv) => trainset_core::Error::Parse(format!("CSV error: {csv}")),
        }
    }
}
