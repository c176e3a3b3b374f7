//! Source loaders for training set assembly
//!
//! This crate loads raw sources into in-memory tables, infers column
//! types, parses event-time columns, and validates the column roles a
//! feature or label declares.

mod error;
mod memory;

#[cfg(feature = "csv")]
pub mod csv;

#[cfg(feature = "csv")]
mod loader;

pub mod common;
pub mod timestamp;

pub use common::{apply_roles, validate_roles, SchemaInference};
pub use error::{Error, Result};
pub use memory::MemorySourceLoader;
pub use timestamp::{parse_timestamp, parse_timestamp_column, parse_timestamp_value};

#[cfg(feature = "csv")]
pub use csv::{CsvReader, CsvReaderOptions};
#[cfg(feature = "csv")]
pub use loader::CsvSourceLoader;

// Re-export core types
pub use trainset_core::{SourceLoader, Table};
