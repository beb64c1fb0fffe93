//! Predicate wire types
//!
//! These are the operations the compiler pushes into a query-builder
//! capability. Backends decide how to realize them (SQL text, in-memory
//! evaluation, a real ORM binding).

use crate::error::FilterError;
use crate::result::FilterResult;
use crate::value::FilterValue;

/// How a predicate (or group) joins the clauses before it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Combinator {
    #[default]
    And,
    Or,
}

impl Combinator {
    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "and" => Some(Self::And),
            "or" => Some(Self::Or),
            _ => None,
        }
    }

    /// SQL keyword
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

/// Comparison operators accepted in explicit-operator conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// Equals (=)
    Eq,
    /// Not equals (!= or <>)
    NotEq,
    /// Less than (<)
    Lt,
    /// Less than or equal (<=)
    LtEq,
    /// Greater than (>)
    Gt,
    /// Greater than or equal (>=)
    GtEq,
    /// Pattern match; the value is used as the complete pattern
    Like,
}

impl CompareOp {
    /// Parse an operator from its SQL-ish string form.
    ///
    /// Unknown operators are rejected rather than passed through.
    pub fn parse(s: &str) -> FilterResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "=" | "==" => Ok(Self::Eq),
            "!=" | "<>" => Ok(Self::NotEq),
            "<" => Ok(Self::Lt),
            "<=" => Ok(Self::LtEq),
            ">" => Ok(Self::Gt),
            ">=" => Ok(Self::GtEq),
            "like" => Ok(Self::Like),
            other => Err(FilterError::invalid_directive(format!(
                "unknown comparison operator: {other:?}"
            ))),
        }
    }

    /// SQL spelling
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::Like => "LIKE",
        }
    }
}

/// A single predicate on a single column
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Column compared against a scalar with an explicit operator
    Cmp {
        column: String,
        op: CompareOp,
        value: FilterValue,
    },
    /// Column must be one of the given values
    In {
        column: String,
        values: Vec<FilterValue>,
    },
    /// Column must be null / not null
    Null { column: String, is_null: bool },
    /// Column must contain `needle` as a substring (case rules are
    /// backend-defined); the backend adds the pattern wrapping
    Like { column: String, needle: String },
    /// Column falls within an inclusive interval
    Between {
        column: String,
        low: FilterValue,
        high: FilterValue,
    },
}

impl Predicate {
    /// Create an equality predicate
    pub fn eq(column: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::Cmp {
            column: column.into(),
            op: CompareOp::Eq,
            value: value.into(),
        }
    }

    /// Create a comparison predicate
    pub fn cmp(
        column: impl Into<String>,
        op: CompareOp,
        value: impl Into<FilterValue>,
    ) -> Self {
        Self::Cmp {
            column: column.into(),
            op,
            value: value.into(),
        }
    }

    /// Create an IN predicate
    pub fn is_in(column: impl Into<String>, values: Vec<FilterValue>) -> Self {
        Self::In {
            column: column.into(),
            values,
        }
    }

    /// Create a null-check predicate
    pub fn null(column: impl Into<String>, is_null: bool) -> Self {
        Self::Null {
            column: column.into(),
            is_null,
        }
    }

    /// Create a substring-match predicate
    pub fn like(column: impl Into<String>, needle: impl Into<String>) -> Self {
        Self::Like {
            column: column.into(),
            needle: needle.into(),
        }
    }

    /// Create an inclusive interval predicate
    pub fn between(
        column: impl Into<String>,
        low: impl Into<FilterValue>,
        high: impl Into<FilterValue>,
    ) -> Self {
        Self::Between {
            column: column.into(),
            low: low.into(),
            high: high.into(),
        }
    }

    /// The column this predicate constrains
    pub fn column(&self) -> &str {
        match self {
            Self::Cmp { column, .. }
            | Self::In { column, .. }
            | Self::Null { column, .. }
            | Self::Like { column, .. }
            | Self::Between { column, .. } => column,
        }
    }
}
