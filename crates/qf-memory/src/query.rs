//! In-memory query builder
//!
//! Accumulates a predicate tree and evaluates it against JSON rows with
//! SQL precedence (AND binds tighter than OR). Relations are nested
//! arrays on the row: an existence constraint on `"orders"` matches when
//! at least one element of `row["orders"]` satisfies the sub-tree.

use serde_json::Value as JsonValue;

use qf_core::{Combinator, Predicate, QueryDsl, SortDirection};

use crate::eval::{eval_predicate, json_cmp};

#[derive(Debug, Clone)]
enum Node {
    Pred {
        conj: Combinator,
        predicate: Predicate,
    },
    Group {
        conj: Combinator,
        children: Vec<Node>,
    },
    Exists {
        conj: Combinator,
        relation: String,
        children: Vec<Node>,
    },
}

impl Node {
    fn conj(&self) -> Combinator {
        match self {
            Self::Pred { conj, .. } | Self::Group { conj, .. } | Self::Exists { conj, .. } => {
                *conj
            }
        }
    }
}

/// Query builder that filters JSON rows in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryQuery {
    nodes: Vec<Node>,
    order: Vec<(String, SortDirection)>,
}

impl MemoryQuery {
    /// Create an unfiltered query
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether no predicate has been appended; an unfiltered query
    /// matches every row
    pub fn is_unfiltered(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Total number of leaf predicates, groups included
    pub fn predicate_count(&self) -> usize {
        fn count(nodes: &[Node]) -> usize {
            nodes
                .iter()
                .map(|n| match n {
                    Node::Pred { .. } => 1,
                    Node::Group { children, .. } | Node::Exists { children, .. } => {
                        count(children)
                    }
                })
                .sum()
        }
        count(&self.nodes)
    }

    /// Whether a row satisfies the accumulated predicates
    pub fn matches(&self, row: &JsonValue) -> bool {
        eval_nodes(&self.nodes, row)
    }

    /// Indices of matching rows, in input order
    pub fn run_indices(&self, rows: &[JsonValue]) -> Vec<usize> {
        rows.iter()
            .enumerate()
            .filter(|(_, row)| self.matches(row))
            .map(|(i, _)| i)
            .collect()
    }

    /// Matching rows, sorted per any ORDER BY clauses
    pub fn run<'a>(&self, rows: &'a [JsonValue]) -> Vec<&'a JsonValue> {
        let mut out: Vec<&JsonValue> = rows.iter().filter(|row| self.matches(row)).collect();
        for (column, direction) in self.order.iter().rev() {
            out.sort_by(|a, b| {
                let ordering = json_cmp(
                    a.as_object().and_then(|m| m.get(column)),
                    b.as_object().and_then(|m| m.get(column)),
                );
                match direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            });
        }
        out
    }
}

impl QueryDsl for MemoryQuery {
    fn push(&mut self, conj: Combinator, predicate: Predicate) {
        self.nodes.push(Node::Pred { conj, predicate });
    }

    fn push_group(&mut self, conj: Combinator, build: &mut dyn FnMut(&mut dyn QueryDsl)) {
        let mut group = MemoryQuery::new();
        build(&mut group);
        if group.nodes.is_empty() {
            return;
        }
        self.nodes.push(Node::Group {
            conj,
            children: group.nodes,
        });
    }

    fn push_exists(
        &mut self,
        conj: Combinator,
        relation: &str,
        build: &mut dyn FnMut(&mut dyn QueryDsl),
    ) {
        let mut sub = MemoryQuery::new();
        build(&mut sub);
        self.nodes.push(Node::Exists {
            conj,
            relation: relation.to_string(),
            children: sub.nodes,
        });
    }

    fn order_by(&mut self, column: &str, direction: SortDirection) {
        self.order.push((column.to_string(), direction));
    }
}

/// Evaluate a flat node sequence with SQL precedence: the sequence splits
/// into OR-separated runs, each run an AND conjunction. The leading
/// combinator is ignored.
fn eval_nodes(nodes: &[Node], row: &JsonValue) -> bool {
    if nodes.is_empty() {
        return true;
    }

    let mut any_run = false;
    let mut current = true;
    for (i, node) in nodes.iter().enumerate() {
        if i > 0 && node.conj() == Combinator::Or {
            any_run = any_run || current;
            current = true;
        }
        current = current && eval_node(node, row);
    }
    any_run || current
}

fn eval_node(node: &Node, row: &JsonValue) -> bool {
    match node {
        Node::Pred { predicate, .. } => eval_predicate(predicate, row),
        Node::Group { children, .. } => eval_nodes(children, row),
        Node::Exists {
            relation, children, ..
        } => match row.as_object().and_then(|m| m.get(relation)) {
            Some(JsonValue::Array(related)) => {
                related.iter().any(|r| eval_nodes(children, r))
            }
            _ => false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qf_core::CompareOp;
    use serde_json::json;

    fn rows() -> Vec<JsonValue> {
        vec![
            json!({
                "name": "Alice",
                "status": "active",
                "score": 10,
                "deleted_at": null,
                "orders": [{"total": 120, "state": "paid"}],
            }),
            json!({
                "name": "Bob",
                "status": "inactive",
                "score": 3,
                "deleted_at": "2024-01-01T00:00:00Z",
                "orders": [{"total": 20, "state": "pending"}],
            }),
        ]
    }

    #[test]
    fn test_unfiltered_matches_everything() {
        let q = MemoryQuery::new();
        assert!(q.is_unfiltered());
        assert_eq!(q.run_indices(&rows()), vec![0, 1]);
    }

    #[test]
    fn test_and_conjunction() {
        let mut q = MemoryQuery::new();
        q.where_eq("status", "active".into());
        q.where_eq("name", "Bob".into());
        assert_eq!(q.run_indices(&rows()), Vec::<usize>::new());
    }

    #[test]
    fn test_or_precedence() {
        // status = 'inactive' AND score > 100 OR name = 'Alice'
        // must parse as (inactive AND score>100) OR (name=Alice)
        let mut q = MemoryQuery::new();
        q.where_eq("status", "inactive".into());
        q.where_cmp("score", CompareOp::Gt, 100i64.into());
        q.push(Combinator::Or, Predicate::eq("name", "Alice"));
        assert_eq!(q.run_indices(&rows()), vec![0]);
    }

    #[test]
    fn test_grouped_or() {
        let mut q = MemoryQuery::new();
        q.push_group(Combinator::And, &mut |g| {
            g.push(Combinator::Or, Predicate::eq("name", "Alice"));
            g.push(Combinator::Or, Predicate::eq("name", "Bob"));
        });
        q.where_eq("status", "active".into());
        assert_eq!(q.run_indices(&rows()), vec![0]);
    }

    #[test]
    fn test_exists_over_nested_relation() {
        let mut q = MemoryQuery::new();
        q.push_exists(Combinator::And, "orders", &mut |sub| {
            sub.push(
                Combinator::And,
                Predicate::cmp("total", CompareOp::Gt, 100i64),
            );
        });
        assert_eq!(q.run_indices(&rows()), vec![0]);
    }

    #[test]
    fn test_exists_with_no_conditions_checks_presence() {
        let mut q = MemoryQuery::new();
        q.push_exists(Combinator::And, "orders", &mut |_| {});
        assert_eq!(q.run_indices(&rows()), vec![0, 1]);

        let mut q = MemoryQuery::new();
        q.push_exists(Combinator::And, "payments", &mut |_| {});
        assert_eq!(q.run_indices(&rows()), Vec::<usize>::new());
    }

    #[test]
    fn test_order_by() {
        let mut q = MemoryQuery::new();
        q.order_by("score", SortDirection::Asc);
        let data = rows();
        let sorted = q.run(&data);
        assert_eq!(sorted[0]["name"], "Bob");
        assert_eq!(sorted[1]["name"], "Alice");
    }

    #[test]
    fn test_predicate_count() {
        let mut q = MemoryQuery::new();
        q.where_eq("status", "active".into());
        q.push_group(Combinator::And, &mut |g| {
            g.push(Combinator::Or, Predicate::like("name", "a"));
            g.push(Combinator::Or, Predicate::like("email", "a"));
        });
        assert_eq!(q.predicate_count(), 3);
    }
}
