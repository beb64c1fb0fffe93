//! Error types for QueryFilter RS
//!
//! Absent or empty filter inputs are never errors; every operation that
//! receives one degrades to a no-op. The variants below cover the inputs
//! that are present but unusable.

use thiserror::Error;

/// Error type for all filter-compilation operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("invalid filter directive: {message}")]
    InvalidDirective { message: String },

    #[error("invalid {kind} value: {value}")]
    InvalidPeriodValue { kind: PeriodKind, value: i64 },

    #[error("unresolved timezone: {name}")]
    UnresolvedTimezone { name: String },

    #[error("unknown relation: {name}")]
    UnknownRelation { name: String },
}

/// Calendar period kinds a filter can target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodKind {
    Month,
    Year,
}

impl std::fmt::Display for PeriodKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Month => write!(f, "month"),
            Self::Year => write!(f, "year"),
        }
    }
}

impl FilterError {
    /// Build an `InvalidDirective` from anything printable
    pub fn invalid_directive(message: impl Into<String>) -> Self {
        Self::InvalidDirective {
            message: message.into(),
        }
    }

    /// Stable machine-readable code for each variant
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidDirective { .. } => "invalid_directive",
            Self::InvalidPeriodValue { .. } => "invalid_period_value",
            Self::UnresolvedTimezone { .. } => "unresolved_timezone",
            Self::UnknownRelation { .. } => "unknown_relation",
        }
    }
}
