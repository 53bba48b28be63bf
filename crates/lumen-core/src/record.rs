//! Untyped rows and mutation payloads.
//!
//! Stores deal in [`Row`]s. Callers describe the shape they expect with a
//! type parameter and rows are decoded into it on the way out; nothing here
//! knows a table's schema.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, InvalidInputError};
use crate::types::TableName;

/// A single record as exchanged with a store.
pub type Row = Map<String, Value>;

/// Field values for an insert or a partial update.
///
/// Always a JSON object. Build one from a map, or from any serializable
/// value that serializes to an object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(Row);

impl Payload {
    /// An empty payload.
    pub fn new() -> Self {
        Self(Row::new())
    }

    /// Build a payload from any value that serializes to a JSON object.
    ///
    /// # Errors
    ///
    /// Returns an error if the value serializes to anything but an object.
    pub fn from_serialize<T: Serialize>(value: &T) -> Result<Self, Error> {
        let value = serde_json::to_value(value).map_err(|e| InvalidInputError::Payload {
            reason: e.to_string(),
        })?;
        Self::try_from(value)
    }

    /// Set a field, returning the payload for chaining.
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_row(&self) -> &Row {
        &self.0
    }

    pub fn into_row(self) -> Row {
        self.0
    }
}

impl From<Row> for Payload {
    fn from(row: Row) -> Self {
        Self(row)
    }
}

impl TryFrom<Value> for Payload {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(InvalidInputError::Payload {
                reason: format!("expected a JSON object, got {}", json_kind(&other)),
            }
            .into()),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Payload {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Decode a row into the caller's record type.
pub fn decode_row<T: DeserializeOwned>(table: &TableName, row: Row) -> Result<T, Error> {
    serde_json::from_value(Value::Object(row)).map_err(|e| Error::Decode {
        table: table.to_string(),
        message: e.to_string(),
    })
}

/// Decode every row, failing on the first one that does not fit.
pub fn decode_rows<T: DeserializeOwned>(table: &TableName, rows: Vec<Row>) -> Result<Vec<T>, Error> {
    rows.into_iter().map(|row| decode_row(table, row)).collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
