//! Value enum for dynamic statement values

use std::fmt::Write as _;

use chrono::DateTime;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// A dynamic value that can hold any SQL parameter or scalar result type.
///
/// Used both for bound statement parameters and for cached scalar results
/// and row cells.
///
/// # Example
///
/// ```
/// use statement_cache::model::Value;
///
/// let name = Value::from("Contoso");
/// let count = Value::from(42i64);
/// let empty = Value::Null;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Null/absent value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// 32-bit integer.
    Int(i32),
    /// 64-bit integer.
    Long(i64),
    /// 64-bit floating point.
    Float(f64),
    /// Arbitrary precision decimal.
    Decimal(Decimal),
    /// String value.
    String(String),
    /// GUID/UUID value.
    Guid(Uuid),
    /// Date and time with timezone.
    DateTime(DateTime<Utc>),
    /// Raw byte sequence.
    Bytes(Vec<u8>),
    /// Ordered collection of values.
    List(Vec<Value>),
}

impl Value {
    /// Returns `true` if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the type name of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Long(_) => "long",
            Value::Float(_) => "float",
            Value::Decimal(_) => "decimal",
            Value::String(_) => "string",
            Value::Guid(_) => "guid",
            Value::DateTime(_) => "datetime",
            Value::Bytes(_) => "bytes",
            Value::List(_) => "list",
        }
    }

    /// Renders this value in its canonical cache-key form.
    ///
    /// Two logically equal values must always render identically, since the
    /// rendering participates in the cache key hash:
    ///
    /// - `Null` renders as the literal token `null`
    /// - `Bytes` render as uppercase hex with no separators
    /// - `List` elements are rendered and space-joined in iteration order
    /// - everything else uses its invariant textual representation
    pub fn key_fragment(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(n) => n.to_string(),
            Value::Long(n) => n.to_string(),
            Value::Float(n) => n.to_string(),
            Value::Decimal(d) => d.to_string(),
            Value::String(s) => s.clone(),
            Value::Guid(g) => g.to_string(),
            Value::DateTime(dt) => dt.to_rfc3339(),
            Value::Bytes(buffer) => bytes_to_hex(buffer),
            Value::List(items) => items
                .iter()
                .map(Value::key_fragment)
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

fn bytes_to_hex(buffer: &[u8]) -> String {
    let mut out = String::with_capacity(buffer.len() * 2);
    for byte in buffer {
        let _ = write!(out, "{byte:02X}");
    }
    out
}

// =============================================================================
// From implementations
// =============================================================================

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Long(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Value::Decimal(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Guid(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::DateTime(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Value::Null,
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_renders_as_literal_token() {
        assert_eq!(Value::Null.key_fragment(), "null");
    }

    #[test]
    fn test_bytes_render_as_uppercase_hex() {
        let value = Value::Bytes(vec![0x0a, 0xff, 0x00]);
        assert_eq!(value.key_fragment(), "0AFF00");
    }

    #[test]
    fn test_list_renders_space_joined() {
        let value = Value::List(vec![Value::Int(1), Value::from("two"), Value::Null]);
        assert_eq!(value.key_fragment(), "1 two null");
    }

    #[test]
    fn test_option_conversion() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some(5i32)), Value::Int(5));
    }
}
