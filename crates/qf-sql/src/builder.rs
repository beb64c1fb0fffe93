//! SQL query builder
//!
//! Accumulates WHERE fragments and renders a complete SELECT. Relation
//! existence constraints need to know how a relation correlates with the
//! base table, so relations are registered up front; pushing an
//! unregistered relation surfaces as an error when the SQL is rendered.

use std::collections::HashMap;

use tracing::debug;

use qf_core::{Combinator, FilterError, FilterResult, Predicate, QueryDsl, SortDirection};

use crate::render::render_predicate;

/// How a named relation joins back to its parent table
#[derive(Debug, Clone)]
pub struct RelationDef {
    /// Related table name
    pub table: String,
    /// Column on the related table pointing at the parent
    pub foreign_key: String,
    /// Key column on the parent table
    pub local_key: String,
}

/// Query builder rendering WHERE/ORDER BY fragments as SQL text
#[derive(Debug, Clone)]
pub struct SqlQuery {
    table: String,
    relations: HashMap<String, RelationDef>,
    wheres: Vec<(Combinator, String)>,
    order: Vec<String>,
    error: Option<FilterError>,
}

impl SqlQuery {
    /// Create a builder for the given base table
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            relations: HashMap::new(),
            wheres: Vec::new(),
            order: Vec::new(),
            error: None,
        }
    }

    /// Register a relation so existence constraints can correlate it
    pub fn with_relation(
        mut self,
        name: impl Into<String>,
        table: impl Into<String>,
        foreign_key: impl Into<String>,
        local_key: impl Into<String>,
    ) -> Self {
        self.relations.insert(
            name.into(),
            RelationDef {
                table: table.into(),
                foreign_key: foreign_key.into(),
                local_key: local_key.into(),
            },
        );
        self
    }

    /// Number of accumulated WHERE fragments
    pub fn clause_count(&self) -> usize {
        self.wheres.len()
    }

    /// Render the WHERE clause body; empty string when unfiltered
    pub fn where_sql(&self) -> FilterResult<String> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        Ok(join_fragments(&self.wheres))
    }

    /// Render the complete SELECT statement
    pub fn to_sql(&self) -> FilterResult<String> {
        let mut sql = format!("SELECT * FROM {}", self.table);

        let where_body = self.where_sql()?;
        if !where_body.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&where_body);
        }

        if !self.order.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.order.join(", "));
        }

        Ok(sql)
    }

    fn child(&self, table: &str) -> SqlQuery {
        SqlQuery {
            table: table.to_string(),
            relations: self.relations.clone(),
            wheres: Vec::new(),
            order: Vec::new(),
            error: None,
        }
    }

    fn absorb_child_error(&mut self, child: &SqlQuery) {
        if self.error.is_none() {
            self.error = child.error.clone();
        }
    }
}

impl QueryDsl for SqlQuery {
    fn push(&mut self, conj: Combinator, predicate: Predicate) {
        let fragment = render_predicate(&predicate);
        self.wheres.push((conj, fragment));
    }

    fn push_group(&mut self, conj: Combinator, build: &mut dyn FnMut(&mut dyn QueryDsl)) {
        let mut group = self.child(&self.table.clone());
        build(&mut group);
        self.absorb_child_error(&group);
        if group.wheres.is_empty() {
            return;
        }
        let body = join_fragments(&group.wheres);
        self.wheres.push((conj, format!("({body})")));
    }

    fn push_exists(
        &mut self,
        conj: Combinator,
        relation: &str,
        build: &mut dyn FnMut(&mut dyn QueryDsl),
    ) {
        let Some(def) = self.relations.get(relation).cloned() else {
            debug!(relation, "existence pushed for unregistered relation");
            if self.error.is_none() {
                self.error = Some(FilterError::UnknownRelation {
                    name: relation.to_string(),
                });
            }
            return;
        };

        let mut sub = self.child(&def.table);
        build(&mut sub);
        self.absorb_child_error(&sub);

        let correlation = format!(
            "{}.{} = {}.{}",
            def.table, def.foreign_key, self.table, def.local_key
        );
        let fragment = if sub.wheres.is_empty() {
            format!(
                "EXISTS (SELECT 1 FROM {} WHERE {})",
                def.table, correlation
            )
        } else {
            let body = join_fragments(&sub.wheres);
            format!(
                "EXISTS (SELECT 1 FROM {} WHERE {} AND ({}))",
                def.table, correlation, body
            )
        };
        self.wheres.push((conj, fragment));
    }

    fn order_by(&mut self, column: &str, direction: SortDirection) {
        self.order.push(format!("{} {}", column, direction.as_sql()));
    }
}

/// Join fragments sequentially; the leading combinator is dropped. SQL's
/// own precedence (AND over OR) applies to the result.
fn join_fragments(fragments: &[(Combinator, String)]) -> String {
    let mut out = String::new();
    for (i, (conj, fragment)) in fragments.iter().enumerate() {
        if i > 0 {
            out.push(' ');
            out.push_str(conj.as_sql());
            out.push(' ');
        }
        out.push_str(fragment);
    }
    out
}
