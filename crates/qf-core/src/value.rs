//! Scalar filter values and the emptiness rule
//!
//! The emptiness rule decides which inputs mean "no filter requested":
//! null and the empty string are empty, while `false` and `0` are valid
//! filter values and must never be skipped.

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;

use crate::error::FilterError;
use crate::result::FilterResult;

/// A scalar value a filter can compare a column against
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// Explicit absence ("no filter")
    Null,
    /// String value
    Str(String),
    /// Integer value
    Int(i64),
    /// Floating point value
    Float(f64),
    /// Boolean value
    Bool(bool),
    /// UTC timestamp (date bounds are always stored in UTC)
    Timestamp(DateTime<Utc>),
}

impl FilterValue {
    /// Whether this value means "no filter requested".
    ///
    /// Only `Null` and the empty string qualify; `Bool(false)`, `Int(0)`
    /// and `Float(0.0)` are real filter values.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Str(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Convert a JSON scalar into a filter value.
    ///
    /// Arrays and objects are not scalars; classifying those shapes is the
    /// directive layer's job.
    pub fn from_json(value: &JsonValue) -> FilterResult<Self> {
        match value {
            JsonValue::Null => Ok(Self::Null),
            JsonValue::Bool(b) => Ok(Self::Bool(*b)),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Self::Int(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(Self::Float(f))
                } else {
                    Err(FilterError::invalid_directive(format!(
                        "unrepresentable number: {n}"
                    )))
                }
            }
            JsonValue::String(s) => Ok(Self::Str(s.clone())),
            JsonValue::Array(_) | JsonValue::Object(_) => Err(FilterError::invalid_directive(
                "expected a scalar, got a compound JSON value",
            )),
        }
    }

    /// Render the value as the plain text a substring search would use
    pub fn to_plain_string(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Str(s) => s.clone(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Timestamp(ts) => ts.to_rfc3339(),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<i64> for FilterValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for FilterValue {
    fn from(i: i32) -> Self {
        Self::Int(i as i64)
    }
}

impl From<f64> for FilterValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<DateTime<Utc>> for FilterValue {
    fn from(ts: DateTime<Utc>) -> Self {
        Self::Timestamp(ts)
    }
}

impl<T: Into<FilterValue>> From<Option<T>> for FilterValue {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => Self::Null,
        }
    }
}
