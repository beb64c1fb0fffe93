//! Relation filter specifications
//!
//! Constraints on related rows, expressed either as a direct
//! column/operator/value comparison or as a set of per-column conditions
//! checked inside an existence subquery.

use qf_core::{CompareOp, FilterResult, FilterValue};

use crate::directive::CustomPredicate;

/// One condition inside a relation's existence subquery
#[derive(Debug, Clone)]
pub enum RelationPredicate {
    /// Opaque caller-built fragment, applied in a grouped scope
    Custom(CustomPredicate),
    /// Comparison with an explicit operator
    Compare(CompareOp, FilterValue),
    /// Null / not-null check
    Null(bool),
    /// Exact equality; empty values are skipped
    Equals(FilterValue),
}

impl RelationPredicate {
    /// Comparison with the operator given in string form
    pub fn compare(op: &str, value: impl Into<FilterValue>) -> FilterResult<Self> {
        Ok(Self::Compare(CompareOp::parse(op)?, value.into()))
    }

    /// Whether this condition is skipped
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Equals(v) => v.is_empty(),
            _ => false,
        }
    }
}

impl From<FilterValue> for RelationPredicate {
    fn from(value: FilterValue) -> Self {
        Self::Equals(value)
    }
}

impl From<&str> for RelationPredicate {
    fn from(s: &str) -> Self {
        Self::Equals(s.into())
    }
}

impl From<String> for RelationPredicate {
    fn from(s: String) -> Self {
        Self::Equals(s.into())
    }
}

impl From<i64> for RelationPredicate {
    fn from(i: i64) -> Self {
        Self::Equals(i.into())
    }
}

impl From<bool> for RelationPredicate {
    fn from(b: bool) -> Self {
        Self::Equals(b.into())
    }
}

/// How one relation is constrained
#[derive(Debug, Clone)]
pub enum RelationCondition {
    /// Direct relation-column comparison
    Compare {
        column: String,
        op: CompareOp,
        value: FilterValue,
    },
    /// Per-column conditions inside an existence subquery
    Where(Vec<(String, RelationPredicate)>),
}

impl RelationCondition {
    /// Direct comparison, operator in string form
    pub fn compare(
        column: impl Into<String>,
        op: &str,
        value: impl Into<FilterValue>,
    ) -> FilterResult<Self> {
        Ok(Self::Compare {
            column: column.into(),
            op: CompareOp::parse(op)?,
            value: value.into(),
        })
    }

    /// Start an empty condition set
    pub fn where_all() -> Self {
        Self::Where(vec![])
    }

    /// Add a per-column condition (builder pattern; no-op on the
    /// `Compare` variant)
    pub fn with(
        mut self,
        column: impl Into<String>,
        predicate: impl Into<RelationPredicate>,
    ) -> Self {
        if let Self::Where(conditions) = &mut self {
            conditions.push((column.into(), predicate.into()));
        }
        self
    }

    /// Whether the whole condition is skipped
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Compare { .. } => false,
            Self::Where(conditions) => conditions.is_empty(),
        }
    }
}

/// Ordered mapping from relation name to its condition
#[derive(Debug, Clone, Default)]
pub struct RelationFilterSpec {
    entries: Vec<(String, RelationCondition)>,
}

impl RelationFilterSpec {
    pub fn new() -> Self {
        Self { entries: vec![] }
    }

    /// Add a condition for a relation (builder pattern)
    pub fn with(mut self, relation: impl Into<String>, condition: RelationCondition) -> Self {
        self.entries.push((relation.into(), condition));
        self
    }

    /// Add a condition for a relation
    pub fn add(&mut self, relation: impl Into<String>, condition: RelationCondition) -> &mut Self {
        self.entries.push((relation.into(), condition));
        self
    }

    /// All entries in insertion order
    pub fn entries(&self) -> &[(String, RelationCondition)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
