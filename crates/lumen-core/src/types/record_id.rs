//! Record identifier type.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// The value a record is looked up by.
///
/// Identifiers are either text (UUIDs, `ISS-1001`) or integers, matching
/// the two kinds of primary key the dashboard's tables use.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Integer(i64),
    Text(String),
}

impl RecordId {
    /// The identifier as a JSON value, for equality filters.
    pub fn to_value(&self) -> Value {
        match self {
            RecordId::Integer(n) => Value::from(*n),
            RecordId::Text(s) => Value::from(s.as_str()),
        }
    }

    /// Read an identifier back out of a row's id column.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(RecordId::Text(s.clone())),
            Value::Number(n) => n.as_i64().map(RecordId::Integer),
            _ => None,
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Integer(n) => write!(f, "{}", n),
            RecordId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        RecordId::Text(s.to_string())
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        RecordId::Text(s)
    }
}

impl From<&String> for RecordId {
    fn from(s: &String) -> Self {
        RecordId::Text(s.clone())
    }
}

impl From<i64> for RecordId {
    fn from(n: i64) -> Self {
        RecordId::Integer(n)
    }
}

impl From<i32> for RecordId {
    fn from(n: i32) -> Self {
        RecordId::Integer(n.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn value_conversion() {
        assert_eq!(RecordId::from("ISS-1001").to_value(), json!("ISS-1001"));
        assert_eq!(RecordId::from(7).to_value(), json!(7));
    }

    #[test]
    fn from_value_rejects_non_keys() {
        assert_eq!(RecordId::from_value(&json!(3)), Some(RecordId::Integer(3)));
        assert_eq!(RecordId::from_value(&json!(1.5)), None);
        assert_eq!(RecordId::from_value(&json!(null)), None);
    }
}
