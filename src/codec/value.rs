//! Value serialization
//!
//! Values are stored as JSON text. Equality between list elements is decided
//! on the serialized form; serde_json's default map keeps object keys sorted,
//! so equal values always serialize identically.

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ValueRef};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;

/// Stateless JSON codec
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueCodec;

impl ValueCodec {
    /// Application value → JSON text
    pub fn serialize(value: &Value) -> Result<String> {
        Ok(serde_json::to_string(value)?)
    }

    /// Stored value → application value
    ///
    /// Columns are already decoded by [`JsonColumn`] during row mapping, so
    /// this is the identity.
    pub fn deserialize(stored: Value) -> Value {
        stored
    }

    /// Parse JSON text produced by [`ValueCodec::serialize`]
    pub fn deserialize_forced(text: &str) -> Result<Value> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_value<T: Serialize>(value: &T) -> Result<Value> {
        Ok(serde_json::to_value(value)?)
    }

    pub fn from_value<T: DeserializeOwned>(value: Value) -> Result<T> {
        Ok(serde_json::from_value(value)?)
    }
}

/// A JSON-typed column decoded while the row is read
///
/// SQL `NULL` maps to `None`; JSON `null` maps to `Some(Value::Null)`.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonColumn(pub Option<Value>);

impl JsonColumn {
    pub fn into_inner(self) -> Option<Value> {
        self.0.map(ValueCodec::deserialize)
    }
}

impl FromSql for JsonColumn {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value {
            ValueRef::Null => Ok(JsonColumn(None)),
            ValueRef::Text(bytes) | ValueRef::Blob(bytes) => serde_json::from_slice(bytes)
                .map(|v| JsonColumn(Some(v)))
                .map_err(|e| FromSqlError::Other(Box::new(e))),
            ValueRef::Integer(i) => Ok(JsonColumn(Some(Value::from(i)))),
            ValueRef::Real(f) => Ok(JsonColumn(
                serde_json::Number::from_f64(f).map(Value::Number),
            )),
        }
    }
}
