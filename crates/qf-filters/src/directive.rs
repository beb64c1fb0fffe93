//! Filter directives
//!
//! A directive is the tagged description of one constraint on one field.
//! Inputs often arrive as loosely-typed request values; `Directive::from_json`
//! is the single place where value shape is inspected and classified. Past
//! that boundary everything is explicit.

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::Value as JsonValue;

use qf_core::{CompareOp, FilterError, FilterResult, FilterValue, QueryDsl};

/// Opaque caller-supplied predicate builder (escape hatch)
#[derive(Clone)]
pub struct CustomPredicate(Arc<dyn Fn(&mut dyn QueryDsl) + Send + Sync>);

impl CustomPredicate {
    pub fn new(f: impl Fn(&mut dyn QueryDsl) + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Run the builder against a query scope
    pub fn apply(&self, q: &mut dyn QueryDsl) {
        (self.0)(q)
    }
}

impl fmt::Debug for CustomPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomPredicate(..)")
    }
}

/// Calendar granularity of a range directive; bounds snap outward to
/// cover the whole period they fall in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RangeUnit {
    #[default]
    Day,
    Month,
    Year,
}

/// One constraint on one field
#[derive(Debug, Clone)]
pub enum Directive {
    /// Field must equal the scalar value; an empty value means "no
    /// filter" and is skipped
    Equals(FilterValue),
    /// Field must be one of the given values; an empty list is skipped
    In(Vec<FilterValue>),
    /// Field must be null (`true`) or not null (`false`)
    Null(bool),
    /// Field must contain the substring; empty substring is skipped
    Like(String),
    /// Field compared with an explicit operator
    Compare(CompareOp, FilterValue),
    /// Field falls within an inclusive calendar interval, normalized
    /// through the effective timezone; both bounds optional
    Range {
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        unit: RangeUnit,
    },
    /// Opaque sub-query fragment supplied by the caller
    Custom(CustomPredicate),
}

impl Directive {
    /// Equality on any scalar
    pub fn equals(value: impl Into<FilterValue>) -> Self {
        Self::Equals(value.into())
    }

    /// Membership in a list of scalars
    pub fn in_list<V: Into<FilterValue>>(values: impl IntoIterator<Item = V>) -> Self {
        Self::In(values.into_iter().map(Into::into).collect())
    }

    /// Null check: `is_null == true` keeps null rows only
    pub fn null(is_null: bool) -> Self {
        Self::Null(is_null)
    }

    /// Substring match
    pub fn like(needle: impl Into<String>) -> Self {
        Self::Like(needle.into())
    }

    /// Comparison with an operator given as its string form
    pub fn compare(op: &str, value: impl Into<FilterValue>) -> FilterResult<Self> {
        Ok(Self::Compare(CompareOp::parse(op)?, value.into()))
    }

    /// Inclusive day-granularity date range
    pub fn date_range(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self::Range {
            from,
            to,
            unit: RangeUnit::Day,
        }
    }

    /// Caller-built sub-query fragment
    pub fn custom(f: impl Fn(&mut dyn QueryDsl) + Send + Sync + 'static) -> Self {
        Self::Custom(CustomPredicate::new(f))
    }

    /// Whether this directive contributes no predicate and is skipped.
    ///
    /// A null check is never empty: `{null: false}` is a real constraint.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Equals(v) => v.is_empty(),
            Self::In(values) => values.is_empty(),
            Self::Null(_) => false,
            Self::Like(needle) => needle.is_empty(),
            Self::Compare(_, _) => false,
            Self::Range { from, to, .. } => from.is_none() && to.is_none(),
            Self::Custom(_) => false,
        }
    }

    /// Classify a loosely-typed JSON value into a directive.
    ///
    /// - `null` and `""` become an empty `Equals` (skipped downstream)
    /// - scalars become `Equals`
    /// - arrays of scalars become `In`
    /// - `{"null": bool}` becomes a null check
    /// - any other object shape is rejected
    pub fn from_json(value: &JsonValue) -> FilterResult<Self> {
        match value {
            JsonValue::Array(items) => {
                let values = items
                    .iter()
                    .map(FilterValue::from_json)
                    .collect::<FilterResult<Vec<_>>>()?;
                Ok(Self::In(values))
            }
            JsonValue::Object(map) => {
                if map.len() == 1 {
                    if let Some(flag) = map.get("null") {
                        return match flag {
                            JsonValue::Bool(b) => Ok(Self::Null(*b)),
                            other => Err(FilterError::invalid_directive(format!(
                                "null check expects a boolean, got {other}"
                            ))),
                        };
                    }
                }
                Err(FilterError::invalid_directive(format!(
                    "unrecognized directive shape: {value}"
                )))
            }
            scalar => Ok(Self::Equals(FilterValue::from_json(scalar)?)),
        }
    }
}

impl From<FilterValue> for Directive {
    fn from(value: FilterValue) -> Self {
        Self::Equals(value)
    }
}

impl From<&str> for Directive {
    fn from(s: &str) -> Self {
        Self::Equals(s.into())
    }
}

impl From<String> for Directive {
    fn from(s: String) -> Self {
        Self::Equals(s.into())
    }
}

impl From<i64> for Directive {
    fn from(i: i64) -> Self {
        Self::Equals(i.into())
    }
}

impl From<bool> for Directive {
    fn from(b: bool) -> Self {
        Self::Equals(b.into())
    }
}

impl<V: Into<FilterValue>> From<Vec<V>> for Directive {
    fn from(values: Vec<V>) -> Self {
        Self::in_list(values)
    }
}
