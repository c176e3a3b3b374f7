//! Error types for training set assembly

use std::io;
use thiserror::Error;

use crate::catalog::VariantRef;

/// Result type for training set operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for training set operations
#[derive(Error, Debug)]
pub enum Error {
    /// A name/variant reference that the catalog does not know
    #[error("{kind} not found: {reference}")]
    NotFound {
        /// Kind of resource that was looked up (feature, label, source, ...)
        kind: &'static str,
        /// The missing reference
        reference: VariantRef,
    },

    /// A required column is absent from a resolved table
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// Malformed timestamp or value
    #[error("Parse error: {0}")]
    Parse(String),

    /// Registered transformation logic failed
    #[error("Transformation {reference} failed: {message}")]
    Transformation {
        /// The transformation that failed
        reference: VariantRef,
        /// Failure reported by the transformation logic
        message: String,
    },

    /// Zero items where at least one is required, or a non-positive size
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// A point query found no row for the requested entity
    #[error("Join mismatch: {0}")]
    JoinMismatch(String),

    /// A transformation depends on itself, directly or transitively
    #[error("Transformation cycle detected: {}", format_chain(.0))]
    CycleDetected(Vec<VariantRef>),

    /// IO error during file operations
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Metadata catalog failure
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Remote serving transport failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Data type mismatch
    #[error("Data type mismatch: {0}")]
    TypeMismatch(String),

    /// Index out of bounds
    #[error("Index out of bounds")]
    IndexOutOfBounds,
}

fn format_chain(chain: &[VariantRef]) -> String {
    chain
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}

impl Error {
    /// Build a [`Error::NotFound`] for the given resource kind
    pub fn not_found(kind: &'static str, reference: VariantRef) -> Self {
        Self::NotFound { kind, reference }
    }

    /// Build a [`Error::Parse`] from any message
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Build a [`Error::EmptyInput`] from any message
    pub fn empty_input(msg: impl Into<String>) -> Self {
        Self::EmptyInput(msg.into())
    }
}
