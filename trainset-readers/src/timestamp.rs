//! Timestamp parsing for event-time columns
//!
//! Accepted forms, tried in order:
//! - RFC 3339 / ISO 8601 with offset (`2022-03-01T10:15:00Z`, `...+02:00`)
//! - naive date-times, read as UTC (`2022-03-01 10:15:00`, `2022-03-01T10:15:00.123`)
//! - bare dates, read as UTC midnight (`2022-03-01`)
//!
//! Integer values are taken as seconds since the Unix epoch.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use trainset_core::{Column, DataType, Error, Result, Table, Value};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Parse a timestamp string
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Ok(ts.with_timezone(&Utc));
    }

    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(naive.and_utc());
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            if let Some(naive) = date.and_hms_opt(0, 0, 0) {
                return Ok(naive.and_utc());
            }
        }
    }

    Err(Error::parse(format!("Failed to parse '{s}' as timestamp")))
}

/// Interpret a cell as a timestamp
pub fn parse_timestamp_value(value: &Value) -> Result<DateTime<Utc>> {
    match value {
        Value::Timestamp(ts) => Ok(*ts),
        Value::String(s) => parse_timestamp(s),
        Value::Int(secs) => DateTime::from_timestamp(*secs, 0)
            .ok_or_else(|| Error::parse(format!("Epoch seconds out of range: {secs}"))),
        Value::Null => Err(Error::parse("missing timestamp")),
        other => Err(Error::parse(format!(
            "Failed to parse {} value '{}' as timestamp",
            other.data_type(),
            other
        ))),
    }
}

/// Replace the named column with its values parsed as timestamps
pub fn parse_timestamp_column(table: Table, name: &str) -> Result<Table> {
    let column = table.column_by_name(name)?;
    if column.data_type() == &DataType::Timestamp && column.null_count() == 0 {
        return Ok(table);
    }

    let values = column
        .values()
        .iter()
        .map(|v| {
            parse_timestamp_value(v)
                .map(Value::Timestamp)
                .map_err(|e| Error::parse(format!("column '{name}': {e}")))
        })
        .collect::<Result<Vec<_>>>()?;
    let parsed = Column::new(name, DataType::Timestamp, values)?;

    let order: Vec<String> = table.schema().names().iter().map(ToString::to_string).collect();
    let table = table.drop_column(name)?.with_column(parsed)?;

    // Restore the original column position
    let order: Vec<&str> = order.iter().map(String::as_str).collect();
    table.project_by_names(&order)
}
