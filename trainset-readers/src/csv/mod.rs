//! CSV reader
//!
//! Reads a delimited file with a header row into an in-memory table,
//! inferring one type per column.

mod reader;

pub use reader::{CsvReader, CsvReaderOptions};
