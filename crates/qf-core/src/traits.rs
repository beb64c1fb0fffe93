//! Capability traits consumed by the filter compiler
//!
//! `QueryDsl` is the abstract, mutable query-builder handle. The compiler
//! appends predicates through it and never constructs SQL itself; a
//! concrete backend (SQL renderer, in-memory evaluator, ORM binding)
//! decides what "append" means. `ValueSource` abstracts the mapping-like
//! external source (typically HTTP request parameters) that
//! `apply_from_source` reads.

use std::collections::HashMap;

use serde_json::Value as JsonValue;

use crate::predicate::{Combinator, CompareOp, Predicate};
use crate::types::SortDirection;
use crate::value::FilterValue;

/// Abstract query-builder capability.
///
/// Predicates accumulate in call order. Each predicate or scope carries the
/// combinator joining it to whatever precedes it; the combinator of the
/// first entry in a scope is ignored. Backends must honor SQL precedence
/// (AND binds tighter than OR) when realizing a flat sequence.
pub trait QueryDsl {
    /// Append one predicate
    fn push(&mut self, conj: Combinator, predicate: Predicate);

    /// Append a parenthesized group; the callback fills the sub-scope
    fn push_group(&mut self, conj: Combinator, build: &mut dyn FnMut(&mut dyn QueryDsl));

    /// Append an existence constraint over a named relation: at least one
    /// related row must satisfy the predicates pushed in the callback
    fn push_exists(
        &mut self,
        conj: Combinator,
        relation: &str,
        build: &mut dyn FnMut(&mut dyn QueryDsl),
    );

    /// Append an ORDER BY clause
    fn order_by(&mut self, column: &str, direction: SortDirection);

    // Convenience wrappers; all AND-joined

    /// `column = value`
    fn where_eq(&mut self, column: &str, value: FilterValue) {
        self.push(Combinator::And, Predicate::eq(column, value));
    }

    /// `column <op> value`
    fn where_cmp(&mut self, column: &str, op: CompareOp, value: FilterValue) {
        self.push(Combinator::And, Predicate::cmp(column, op, value));
    }

    /// `column IN (values)`
    fn where_in(&mut self, column: &str, values: Vec<FilterValue>) {
        self.push(Combinator::And, Predicate::is_in(column, values));
    }

    /// `column IS NULL` / `column IS NOT NULL`
    fn where_null(&mut self, column: &str, is_null: bool) {
        self.push(Combinator::And, Predicate::null(column, is_null));
    }

    /// Substring match on `column`
    fn where_like(&mut self, column: &str, needle: &str) {
        self.push(Combinator::And, Predicate::like(column, needle));
    }

    /// Inclusive interval on `column`
    fn where_between(&mut self, column: &str, low: FilterValue, high: FilterValue) {
        self.push(Combinator::And, Predicate::between(column, low, high));
    }
}

/// Mapping-like source of loosely-typed values.
///
/// `has` is a presence check, not an emptiness check; a key present with a
/// null value still counts as present.
pub trait ValueSource {
    fn has(&self, key: &str) -> bool;
    fn get(&self, key: &str) -> Option<JsonValue>;
}

impl ValueSource for HashMap<String, JsonValue> {
    fn has(&self, key: &str) -> bool {
        self.contains_key(key)
    }

    fn get(&self, key: &str) -> Option<JsonValue> {
        HashMap::get(self, key).cloned()
    }
}

impl ValueSource for serde_json::Map<String, JsonValue> {
    fn has(&self, key: &str) -> bool {
        self.contains_key(key)
    }

    fn get(&self, key: &str) -> Option<JsonValue> {
        serde_json::Map::get(self, key).cloned()
    }
}

impl ValueSource for JsonValue {
    fn has(&self, key: &str) -> bool {
        self.as_object().is_some_and(|m| m.contains_key(key))
    }

    fn get(&self, key: &str) -> Option<JsonValue> {
        self.as_object().and_then(|m| m.get(key)).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_source_presence_vs_emptiness() {
        let source = json!({"status": null, "name": "tj"});
        assert!(source.has("status"));
        assert!(source.has("name"));
        assert!(!source.has("missing"));
        assert_eq!(ValueSource::get(&source, "status"), Some(json!(null)));
        assert_eq!(ValueSource::get(&source, "missing"), None);
    }

    #[test]
    fn test_value_source_hashmap() {
        let mut source = HashMap::new();
        source.insert("page".to_string(), json!(2));
        assert!(source.has("page"));
        assert_eq!(ValueSource::get(&source, "page"), Some(json!(2)));
    }
}
