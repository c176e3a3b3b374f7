//! CSV reader implementation

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use serde::{Deserialize, Serialize};
use tracing::debug;
use trainset_core::Table;

use crate::common::SchemaInference;
use crate::error::{Error, Result};

/// Options for CSV reader
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvReaderOptions {
    /// Whether the CSV has a header row
    pub has_header: bool,

    /// Delimiter character
    pub delimiter: u8,

    /// Quote character
    pub quote: u8,

    /// Escape character
    pub escape: Option<u8>,

    /// Comment character
    pub comment: Option<u8>,

    /// Whether to trim whitespace
    pub trim: bool,

    /// Cell contents read as null
    pub null_values: Vec<String>,
}

impl Default for CsvReaderOptions {
    fn default() -> Self {
        Self {
            has_header: true,
            delimiter: b',',
            quote: b'"',
            escape: None,
            comment: None,
            trim: false,
            null_values: ["", "NA", "N/A", "NaN", "null", "NULL"]
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

/// Reads a whole delimited file into a [`Table`], inferring column types
pub struct CsvReader<R: Read> {
    /// Inner CSV reader
    reader: csv::Reader<R>,

    /// Reader options
    options: CsvReaderOptions,
}

impl CsvReader<File> {
    /// Open a CSV file
    pub fn from_path(path: &Path, options: CsvReaderOptions) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(file, options))
    }
}

impl<R: Read> CsvReader<R> {
    /// Create a new CSV reader
    pub fn new(reader: R, options: CsvReaderOptions) -> Self {
        let mut builder = ReaderBuilder::new();
        builder
            .delimiter(options.delimiter)
            .quote(options.quote)
            .has_headers(options.has_header)
            .flexible(false);

        if let Some(escape) = options.escape {
            builder.escape(Some(escape));
        }

        if let Some(comment) = options.comment {
            builder.comment(Some(comment));
        }

        if options.trim {
            builder.trim(csv::Trim::All);
        }

        Self {
            reader: builder.from_reader(reader),
            options,
        }
    }

    /// Read all remaining records into a table
    pub fn read_table(&mut self) -> Result<Table> {
        let header: Option<StringRecord> = if self.options.has_header {
            Some(self.reader.headers()?.clone())
        } else {
            None
        };

        let mut records = Vec::new();
        for record in self.reader.records() {
            records.push(record?);
        }

        let column_count = header
            .as_ref()
            .map(StringRecord::len)
            .or_else(|| records.first().map(StringRecord::len))
            .unwrap_or(0);

        let names: Vec<String> = (0..column_count)
            .map(|i| match header.as_ref().and_then(|h| h.get(i)) {
                Some(name) => name.to_string(),
                None => format!("column_{i}"),
            })
            .collect();

        let mut columns = Vec::with_capacity(column_count);
        for (col_idx, name) in names.iter().enumerate() {
            let cells: Vec<Option<&str>> = records
                .iter()
                .map(|record| {
                    let cell = record.get(col_idx).unwrap_or("");
                    if self.options.null_values.iter().any(|n| n == cell) {
                        None
                    } else {
                        Some(cell)
                    }
                })
                .collect();

            columns.push(SchemaInference::build_column(name, &cells)?);
        }

        debug!(rows = records.len(), columns = column_count, "read csv table");

        Table::new(columns).map_err(Error::Core)
    }
}
