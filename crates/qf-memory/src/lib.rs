//! # qf-memory
//!
//! Reference in-memory backend for QueryFilter RS.
//!
//! `MemoryQuery` implements the `QueryDsl` capability by accumulating a
//! predicate tree and evaluating it against `serde_json` rows. It gives
//! compiled filters observable row-level behavior without a database and
//! backs the behavioral test fixtures of the compiler.

pub mod eval;
pub mod query;

pub use eval::{eval_predicate, like_match, parse_timestamp};
pub use query::MemoryQuery;
