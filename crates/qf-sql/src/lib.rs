//! # qf-sql
//!
//! Reference SQL-text backend for QueryFilter RS.
//!
//! `SqlQuery` implements the `QueryDsl` capability by rendering predicates
//! as escaped SQL fragments. It exists to make compiled filters observable
//! and to exercise the capability trait; it executes nothing and holds no
//! connection.

pub mod builder;
pub mod render;

pub use builder::{RelationDef, SqlQuery};
pub use render::{escape_like, escape_string, render_predicate};
