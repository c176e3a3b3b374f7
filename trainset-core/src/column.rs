//! Column implementation for storing typed vectors of values

use std::fmt;

use crate::error::{Error, Result};
use crate::schema::{DataType, Field};
use crate::value::Value;

/// A named, type-homogeneous column of values
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Name of the column
    name: String,

    /// Data type of the column
    data_type: DataType,

    /// The values, nulls included
    values: Vec<Value>,

    /// Count of null values in this column
    null_count: usize,
}

impl Column {
    /// Create a new column with the given name, type, and values.
    ///
    /// Every non-null value must match `data_type`; integers stored in a
    /// `Float64` column are widened.
    pub fn new(name: &str, data_type: DataType, values: Vec<Value>) -> Result<Self> {
        let mut null_count = 0;
        let mut checked = Vec::with_capacity(values.len());

        for value in values {
            let value = match (&data_type, value) {
                (_, Value::Null) => {
                    null_count += 1;
                    Value::Null
                }
                #[allow(clippy::cast_precision_loss)]
                (DataType::Float64, Value::Int(i)) => Value::Float(i as f64),
                (expected, value) if value.data_type() == *expected => value,
                (expected, value) => {
                    return Err(Error::TypeMismatch(format!(
                        "Column '{}' expects {}, got {}",
                        name,
                        expected,
                        value.data_type()
                    )));
                }
            };
            checked.push(value);
        }

        Ok(Self {
            name: name.to_string(),
            data_type,
            values: checked,
            null_count,
        })
    }

    /// Create a column, inferring its type from the values
    pub fn from_values(name: &str, values: Vec<Value>) -> Result<Self> {
        let mut data_type = DataType::Null;

        for value in &values {
            data_type = data_type.unify(&value.data_type()).ok_or_else(|| {
                Error::TypeMismatch(format!(
                    "Column '{}' mixes {} and {} values",
                    name,
                    data_type,
                    value.data_type()
                ))
            })?;
        }

        Self::new(name, data_type, values)
    }

    /// Get the name of this column
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the data type of this column
    pub fn data_type(&self) -> &DataType {
        &self.data_type
    }

    /// Schema field describing this column
    pub fn field(&self) -> Field {
        Field::new(&self.name, self.data_type, self.null_count > 0)
    }

    /// Get the length of this column (number of values)
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if this column is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get the number of null values in this column
    pub fn null_count(&self) -> usize {
        self.null_count
    }

    /// Check if a specific value is null
    pub fn is_null(&self, index: usize) -> bool {
        self.values.get(index).is_some_and(Value::is_null)
    }

    /// Get the value at `index`
    pub fn get(&self, index: usize) -> Result<&Value> {
        self.values.get(index).ok_or(Error::IndexOutOfBounds)
    }

    /// All values in order
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Consume the column, returning its values
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    /// Return this column under a new name
    #[must_use]
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Gather the rows at `indices`; `None` produces a null
    pub fn take(&self, indices: &[Option<usize>]) -> Result<Self> {
        let mut values = Vec::with_capacity(indices.len());
        let mut null_count = 0;

        for index in indices {
            let value = match index {
                Some(i) => self.get(*i)?.clone(),
                None => Value::Null,
            };
            if value.is_null() {
                null_count += 1;
            }
            values.push(value);
        }

        Ok(Self {
            name: self.name.clone(),
            data_type: self.data_type,
            values,
            null_count,
        })
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Column '{}' ({}, {} values, {} nulls)",
            self.name,
            self.data_type,
            self.values.len(),
            self.null_count
        )
    }
}
