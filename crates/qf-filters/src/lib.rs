//! # qf-filters
//!
//! Declarative filter directives and the compiler that turns them into
//! predicate operations on an abstract query builder.
//!
//! ## Structure
//!
//! - `directive` - Tagged filter directives and JSON boundary classification
//! - `spec` - Ordered field-to-directive mappings
//! - `relation` - Relation-scoped filter conditions
//! - `period` - One-or-many month/year arguments
//! - `compiler` - The `FilterCompiler` applying specs to a `QueryDsl`
//!
//! ## Example
//!
//! ```
//! use qf_filters::{FilterCompiler, FilterSpec};
//! use qf_memory::MemoryQuery;
//!
//! let compiler = FilterCompiler::with_defaults();
//! let spec = FilterSpec::new()
//!     .with("status", "active")
//!     .with("role_id", vec![1i64, 2]);
//!
//! let mut query = MemoryQuery::new();
//! compiler.apply_spec(&mut query, &spec).unwrap();
//! assert_eq!(query.predicate_count(), 2);
//! ```

pub mod compiler;
pub mod directive;
pub mod period;
pub mod relation;
pub mod spec;

// Re-exports for convenience
pub use compiler::FilterCompiler;
pub use directive::{CustomPredicate, Directive, RangeUnit};
pub use period::PeriodArg;
pub use relation::{RelationCondition, RelationFilterSpec, RelationPredicate};
pub use spec::FilterSpec;
