//! In-memory table of named columns

use std::fmt;
use std::sync::Arc;

use crate::column::Column;
use crate::error::{Error, Result};
use crate::row::Row;
use crate::schema::Schema;
use crate::value::Value;

/// An ordered collection of equally long, uniquely named columns
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Schema describing the data
    schema: Arc<Schema>,

    /// Columns in this table
    columns: Vec<Column>,

    /// Number of rows in this table
    row_count: usize,
}

impl Table {
    /// Create a new table from columns
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let schema = Schema::new(columns.iter().map(Column::field).collect())?;

        // Verify all columns have the same length
        let row_count = columns.first().map_or(0, Column::len);
        if let Some(column) = columns.iter().find(|c| c.len() != row_count) {
            return Err(Error::InvalidArgument(format!(
                "Column '{}' has {} rows, expected {}",
                column.name(),
                column.len(),
                row_count
            )));
        }

        Ok(Self {
            schema: Arc::new(schema),
            columns,
            row_count,
        })
    }

    /// Build a table from row-major values, inferring column types
    pub fn from_rows(names: &[&str], rows: Vec<Vec<Value>>) -> Result<Self> {
        let mut buffers: Vec<Vec<Value>> = names.iter().map(|_| Vec::with_capacity(rows.len())).collect();

        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != names.len() {
                return Err(Error::InvalidArgument(format!(
                    "Row {} has {} values, expected {}",
                    i,
                    row.len(),
                    names.len()
                )));
            }
            for (buffer, value) in buffers.iter_mut().zip(row) {
                buffer.push(value);
            }
        }

        let columns = names
            .iter()
            .zip(buffers)
            .map(|(name, values)| Column::from_values(name, values))
            .collect::<Result<Vec<_>>>()?;

        Self::new(columns)
    }

    /// Get the schema of this table
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Get the number of rows in this table
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Get the number of columns in this table
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Check if this table has no rows
    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    /// Get a reference to a column by index
    pub fn column(&self, index: usize) -> Result<&Column> {
        self.columns.get(index).ok_or(Error::IndexOutOfBounds)
    }

    /// Get a reference to a column by name
    pub fn column_by_name(&self, name: &str) -> Result<&Column> {
        let index = self.schema.index_of(name)?;
        self.column(index)
    }

    /// Get all columns
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Create a projection of this table with only the named columns, in the given order
    pub fn project_by_names(&self, names: &[&str]) -> Result<Self> {
        let columns = names
            .iter()
            .map(|name| self.column_by_name(name).cloned())
            .collect::<Result<Vec<_>>>()?;

        Self::new(columns)
    }

    /// Append a column at the end
    pub fn with_column(self, column: Column) -> Result<Self> {
        if !self.columns.is_empty() && column.len() != self.row_count {
            return Err(Error::InvalidArgument(format!(
                "Column '{}' has {} rows, table has {}",
                column.name(),
                column.len(),
                self.row_count
            )));
        }

        let mut columns = self.columns;
        columns.push(column);
        Self::new(columns)
    }

    /// Remove a column by name
    pub fn drop_column(self, name: &str) -> Result<Self> {
        let index = self.schema.index_of(name)?;
        let mut columns = self.columns;
        columns.remove(index);
        let row_count = self.row_count;

        let mut table = Self::new(columns)?;
        // Keep the row count of a table whose last column was dropped
        if table.columns.is_empty() {
            table.row_count = row_count;
        }
        Ok(table)
    }

    /// Get one row by index
    pub fn row(&self, index: usize) -> Result<Row> {
        if index >= self.row_count {
            return Err(Error::IndexOutOfBounds);
        }

        let values = self
            .columns
            .iter()
            .map(|c| c.get(index).cloned())
            .collect::<Result<Vec<_>>>()?;

        Row::new(values)
    }

    /// All rows in order
    pub fn rows(&self) -> Result<Vec<Row>> {
        (0..self.row_count).map(|i| self.row(i)).collect()
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Table: {} rows, {} columns", self.row_count, self.columns.len())?;

        // Limit number of rows to display
        const MAX_ROWS: usize = 10;

        let header: Vec<String> = self.columns.iter().map(|c| format!("{:15}", c.name())).collect();
        writeln!(f, "{}", header.join(" | "))?;

        let separator: Vec<String> = self.columns.iter().map(|_| format!("{:-<15}", "")).collect();
        writeln!(f, "{}", separator.join(" | "))?;

        for row in 0..self.row_count.min(MAX_ROWS) {
            let cells: Vec<String> = self
                .columns
                .iter()
                .map(|c| format!("{:15}", c.values()[row].to_string()))
                .collect();
            writeln!(f, "{}", cells.join(" | "))?;
        }

        if self.row_count > MAX_ROWS {
            writeln!(f, "... ({} more rows)", self.row_count - MAX_ROWS)?;
        }

        Ok(())
    }
}
