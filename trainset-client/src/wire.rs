//! Messages of the remote serving protocol
//!
//! Values travel as a one-of: exactly one variant is populated and the
//! reader takes whichever one is active.

use serde::{Deserialize, Serialize};
use trainset_core::{Row, Value, VariantRef};

/// A value on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireValue {
    /// String value
    StrValue(String),
    /// Integer value
    IntValue(i64),
    /// 32-bit integer value
    Int32Value(i32),
    /// 64-bit integer value
    Int64Value(i64),
    /// Single precision value
    FloatValue(f32),
    /// Double precision value
    DoubleValue(f64),
    /// Boolean value
    BoolValue(bool),
    /// No value
    NullValue,
}

impl From<WireValue> for Value {
    fn from(value: WireValue) -> Self {
        match value {
            WireValue::StrValue(s) => Value::String(s),
            WireValue::IntValue(i) | WireValue::Int64Value(i) => Value::Int(i),
            WireValue::Int32Value(i) => Value::Int(i64::from(i)),
            WireValue::FloatValue(f) => Value::Float(f64::from(f)),
            WireValue::DoubleValue(f) => Value::Float(f),
            WireValue::BoolValue(b) => Value::Bool(b),
            WireValue::NullValue => Value::Null,
        }
    }
}

/// A `(name, version)` identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceId {
    /// Resource name
    pub name: String,
    /// Resource version
    pub version: String,
}

impl From<&VariantRef> for ResourceId {
    fn from(reference: &VariantRef) -> Self {
        Self {
            name: reference.name.clone(),
            version: reference.variant.clone(),
        }
    }
}

/// An entity named in a serving request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityValue {
    /// Entity name, such as `user`
    pub name: String,
    /// Entity key
    pub value: String,
}

/// Request for the current values of features for entities
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureServeRequest {
    /// Entities to look up
    pub entities: Vec<EntityValue>,
    /// Features to serve, in response order
    pub features: Vec<ResourceId>,
}

/// Feature values, one per requested feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureServeResponse {
    /// Values in request order
    pub values: Vec<WireValue>,
}

/// Request for the rows of a training set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingDataRequest {
    /// Training set to stream
    pub id: ResourceId,
}

/// One training row on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireRow {
    /// Feature values
    pub features: Vec<WireValue>,
    /// Label value
    pub label: WireValue,
}

impl From<WireRow> for Row {
    fn from(row: WireRow) -> Self {
        Row::from_parts(row.features.into_iter().map(Value::from).collect(), row.label.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(r#"{"str_value":"NZ"}"#, Value::from("NZ") ; "string")]
    #[test_case(r#"{"int32_value":7}"#, Value::Int(7) ; "int32")]
    #[test_case(r#"{"int64_value":-3}"#, Value::Int(-3) ; "int64")]
    #[test_case(r#"{"double_value":2.5}"#, Value::Float(2.5) ; "double")]
    #[test_case(r#"{"bool_value":true}"#, Value::Bool(true) ; "bool")]
    #[test_case(r#""null_value""#, Value::Null ; "null")]
    fn test_active_variant_is_read(json: &str, expected: Value) {
        let wire: WireValue = serde_json::from_str(json).unwrap();
        assert_eq!(Value::from(wire), expected);
    }

    #[test]
    fn test_wire_row_becomes_row() {
        let json = r#"{"features":[{"int_value":1},{"str_value":"a"}],"label":{"bool_value":false}}"#;
        let row: Row = serde_json::from_str::<WireRow>(json).unwrap().into();

        assert_eq!(row.features(), &[Value::Int(1), Value::from("a")]);
        assert_eq!(row.label(), &Value::Bool(false));
    }

    #[test]
    fn test_two_active_variants_rejected() {
        let json = r#"{"int_value":1,"str_value":"a"}"#;
        assert!(serde_json::from_str::<WireValue>(json).is_err());
    }
}
