//! # qf-core
//!
//! Core types, traits, and timezone handling for QueryFilter RS.
//!
//! This crate provides the foundational building blocks used across the
//! other crates:
//! - The error taxonomy and result alias
//! - The `FilterValue` scalar model and its emptiness rule
//! - Predicate wire types (`Predicate`, `CompareOp`, `Combinator`)
//! - The `QueryDsl` and `ValueSource` capability traits
//! - Filter configuration and timezone resolution

pub mod config;
pub mod error;
pub mod predicate;
pub mod result;
pub mod timezone;
pub mod traits;
pub mod types;
pub mod value;

pub use config::FilterConfig;
pub use error::{FilterError, PeriodKind};
pub use predicate::{Combinator, CompareOp, Predicate};
pub use result::FilterResult;
pub use timezone::TimezoneContext;
pub use traits::{QueryDsl, ValueSource};
pub use types::SortDirection;
pub use value::FilterValue;
