//! Rows of an assembled training set

use std::fmt;

use crate::error::{Error, Result};
use crate::value::Value;

/// One training example: feature values followed by exactly one label
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    values: Vec<Value>,
}

impl Row {
    /// Create a row; the last value is the label
    pub fn new(values: Vec<Value>) -> Result<Self> {
        if values.is_empty() {
            return Err(Error::empty_input("a row needs at least a label value"));
        }
        Ok(Self { values })
    }

    /// Create a row from separate features and label
    pub fn from_parts(mut features: Vec<Value>, label: Value) -> Self {
        features.push(label);
        Self { values: features }
    }

    /// Feature values (all but the last column)
    pub fn features(&self) -> &[Value] {
        &self.values[..self.values.len() - 1]
    }

    /// Label value (the last column)
    pub fn label(&self) -> &Value {
        &self.values[self.values.len() - 1]
    }

    /// Features and label, in column order
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Consume the row, returning its values
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let features: Vec<String> = self.features().iter().map(ToString::to_string).collect();
        write!(f, "Features: [{}] , Label: {}", features.join(", "), self.label())
    }
}

/// A group of rows with parallel feature and label collections
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchRow {
    features: Vec<Vec<Value>>,
    labels: Vec<Value>,
    rows: Vec<Row>,
}

impl BatchRow {
    /// Create an empty batch
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a batch holding `rows`
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let mut batch = Self::new();
        for row in rows {
            batch.push(row);
        }
        batch
    }

    /// Append a row
    pub fn push(&mut self, row: Row) {
        self.features.push(row.features().to_vec());
        self.labels.push(row.label().clone());
        self.rows.push(row);
    }

    /// Feature vectors, one per row
    pub fn features(&self) -> &[Vec<Value>] {
        &self.features
    }

    /// Labels, one per row
    pub fn labels(&self) -> &[Value] {
        &self.labels
    }

    /// The original rows
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of rows in the batch
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the batch holds no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_split() {
        let row = Row::new(vec![Value::Int(1), Value::Float(2.0), Value::Bool(true)]).unwrap();
        assert_eq!(row.features(), &[Value::Int(1), Value::Float(2.0)]);
        assert_eq!(row.label(), &Value::Bool(true));
    }

    #[test]
    fn test_label_only_row() {
        let row = Row::new(vec![Value::Int(0)]).unwrap();
        assert!(row.features().is_empty());
        assert_eq!(row.label(), &Value::Int(0));
    }

    #[test]
    fn test_empty_row_rejected() {
        assert!(matches!(Row::new(Vec::new()), Err(Error::EmptyInput(_))));
    }

    #[test]
    fn test_batch_row_parallel_collections() {
        let batch = BatchRow::from_rows(vec![
            Row::from_parts(vec![Value::Int(1)], Value::Int(10)),
            Row::from_parts(vec![Value::Int(2)], Value::Int(20)),
        ]);

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.features(), &[vec![Value::Int(1)], vec![Value::Int(2)]]);
        assert_eq!(batch.labels(), &[Value::Int(10), Value::Int(20)]);
        assert_eq!(batch.rows()[1].label(), &Value::Int(20));
    }
}
