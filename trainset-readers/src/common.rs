//! Common utilities shared by source readers

use trainset_core::{Column, ColumnRoles, DataType, Error, Result, Table, Value};

use crate::timestamp::parse_timestamp_column;

/// Schema inference for string records
pub struct SchemaInference;

impl SchemaInference {
    /// Infer data type for a column of string values; `None` entries are nulls
    pub fn infer_data_type(values: &[Option<&str>]) -> DataType {
        let non_null: Vec<&str> = values.iter().flatten().copied().collect();

        if non_null.is_empty() {
            return DataType::Null;
        }

        // Try to parse as integer
        if non_null.iter().all(|s| s.parse::<i64>().is_ok()) {
            return DataType::Int64;
        }

        // Try to parse as float
        if non_null.iter().all(|s| s.parse::<f64>().is_ok()) {
            return DataType::Float64;
        }

        // Try to parse as boolean
        if non_null.iter().all(|s| parse_bool(s).is_some()) {
            return DataType::Boolean;
        }

        DataType::String
    }

    /// Build a typed column from string cells
    pub fn build_column(name: &str, cells: &[Option<&str>]) -> Result<Column> {
        let data_type = Self::infer_data_type(cells);

        let values = cells
            .iter()
            .map(|cell| match cell {
                None => Ok(Value::Null),
                Some(s) => parse_cell(s, data_type),
            })
            .collect::<Result<Vec<_>>>()?;

        Column::new(name, data_type, values)
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Parse one cell as the given type
pub fn parse_cell(s: &str, data_type: DataType) -> Result<Value> {
    let parsed = match data_type {
        DataType::Int64 => s.parse::<i64>().ok().map(Value::Int),
        DataType::Float64 => s.parse::<f64>().ok().map(Value::Float),
        DataType::Boolean => parse_bool(s).map(Value::Bool),
        DataType::String => Some(Value::String(s.to_string())),
        DataType::Timestamp => Some(Value::Timestamp(crate::timestamp::parse_timestamp(s)?)),
        DataType::Null => Some(Value::Null),
    };

    parsed.ok_or_else(|| Error::parse(format!("Failed to parse '{s}' as {data_type}")))
}

/// Check that every role column exists, naming the first missing one
pub fn validate_roles(table: &Table, roles: &ColumnRoles) -> Result<()> {
    for column in roles.columns() {
        if !table.schema().contains(column) {
            return Err(Error::ColumnNotFound(column.to_string()));
        }
    }
    Ok(())
}

/// Validate role columns and parse the timestamp column, if any
pub fn apply_roles(table: Table, roles: &ColumnRoles) -> Result<Table> {
    validate_roles(&table, roles)?;

    match &roles.timestamp {
        Some(ts) => parse_timestamp_column(table, ts),
        None => Ok(table),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(&[Some("1"), Some("2")], DataType::Int64 ; "integers")]
    #[test_case(&[Some("1"), Some("2.5")], DataType::Float64 ; "floats")]
    #[test_case(&[Some("true"), Some("False")], DataType::Boolean ; "booleans")]
    #[test_case(&[Some("a"), Some("1")], DataType::String ; "strings")]
    #[test_case(&[None, None], DataType::Null ; "all null")]
    #[test_case(&[None, Some("7")], DataType::Int64 ; "nulls ignored")]
    fn test_infer_data_type(cells: &[Option<&str>], expected: DataType) {
        assert_eq!(SchemaInference::infer_data_type(cells), expected);
    }

    #[test]
    fn test_validate_roles_names_missing_column() {
        let table = Table::from_rows(
            &["user", "amount"],
            vec![vec![Value::from("a"), Value::Int(1)]],
        )
        .unwrap();

        let roles = ColumnRoles::new("user", "amount").with_timestamp("event_time");
        match validate_roles(&table, &roles) {
            Err(Error::ColumnNotFound(c)) => assert_eq!(c, "event_time"),
            other => panic!("unexpected result: {other:?}"),
        }

        let roles = ColumnRoles::new("user", "avg_amount");
        match validate_roles(&table, &roles) {
            Err(Error::ColumnNotFound(c)) => assert_eq!(c, "avg_amount"),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
