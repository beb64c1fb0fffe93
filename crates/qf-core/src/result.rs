//! Result type alias

use crate::error::FilterError;

/// Standard Result type for filter operations
pub type FilterResult<T> = Result<T, FilterError>;
