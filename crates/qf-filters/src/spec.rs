//! Filter specifications
//!
//! A `FilterSpec` maps field names to directives, preserving insertion
//! order. Fields whose directive is empty contribute nothing; the
//! distinction between "filter on an empty value" and "no filter" is
//! carried by the directive itself.

use crate::directive::Directive;

/// Ordered mapping from field name to filter directive
#[derive(Debug, Clone, Default)]
pub struct FilterSpec {
    entries: Vec<(String, Directive)>,
}

impl FilterSpec {
    /// Create a new empty spec
    pub fn new() -> Self {
        Self { entries: vec![] }
    }

    /// Add a directive for a field (builder pattern)
    pub fn with(mut self, field: impl Into<String>, directive: impl Into<Directive>) -> Self {
        self.entries.push((field.into(), directive.into()));
        self
    }

    /// Add a directive for a field
    pub fn add(&mut self, field: impl Into<String>, directive: impl Into<Directive>) -> &mut Self {
        self.entries.push((field.into(), directive.into()));
        self
    }

    /// All entries in insertion order
    pub fn entries(&self) -> &[(String, Directive)] {
        &self.entries
    }

    /// Whether the spec holds no entries at all
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries (including ones that will be skipped as empty)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether a field appears in the spec
    pub fn has_field(&self, field: &str) -> bool {
        self.entries.iter().any(|(f, _)| f == field)
    }

    /// Remove all directives for a field
    pub fn remove_field(&mut self, field: &str) {
        self.entries.retain(|(f, _)| f != field);
    }
}

impl<F: Into<String>, D: Into<Directive>> FromIterator<(F, D)> for FilterSpec {
    fn from_iter<I: IntoIterator<Item = (F, D)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(f, d)| (f.into(), d.into()))
                .collect(),
        }
    }
}
