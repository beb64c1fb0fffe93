//! The filter compiler
//!
//! Translates declarative filter inputs into predicate operations on an
//! abstract query builder. Every operation is a conditional append: absent
//! or empty inputs degrade to no-ops, never errors. The only mutation is
//! to the caller-supplied builder handle; the compiler itself holds
//! nothing but configuration.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde_json::Value as JsonValue;
use tracing::{debug, trace};

use qf_core::{
    Combinator, CompareOp, FilterConfig, FilterResult, FilterValue, Predicate, QueryDsl,
    SortDirection, TimezoneContext, ValueSource,
};

use crate::directive::{Directive, RangeUnit};
use crate::period::PeriodArg;
use crate::relation::{RelationCondition, RelationFilterSpec, RelationPredicate};
use crate::spec::FilterSpec;

/// Compiles filter specifications into predicates on a `QueryDsl`
#[derive(Debug, Clone, Default)]
pub struct FilterCompiler {
    config: FilterConfig,
}

impl FilterCompiler {
    /// Create a compiler over the given configuration
    pub fn new(config: FilterConfig) -> Self {
        Self { config }
    }

    /// Compiler with default configuration (dates resolve to UTC)
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// The configuration this compiler resolves timezones from
    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Apply a single field constraint.
    ///
    /// Empty directives (null, empty string, empty list) are skipped;
    /// `false` and `0` are real values and filter normally.
    pub fn apply_equals(
        &self,
        q: &mut dyn QueryDsl,
        column: &str,
        directive: &Directive,
    ) -> FilterResult<()> {
        if directive.is_empty() {
            debug!(column, "skipping empty filter value");
            return Ok(());
        }
        let ctx = self.context_if_ranged(std::iter::once(directive))?;
        emit_directive(q, column, directive, Combinator::And, &ctx)
    }

    /// Apply every non-empty field constraint in the spec, AND-combined
    pub fn apply_spec(&self, q: &mut dyn QueryDsl, spec: &FilterSpec) -> FilterResult<()> {
        let ctx = self.context_if_ranged(spec.entries().iter().map(|(_, d)| d))?;

        for (column, directive) in spec.entries() {
            if directive.is_empty() {
                debug!(column, "skipping empty filter value");
                continue;
            }
            emit_directive(q, column, directive, Combinator::And, &ctx)?;
        }
        Ok(())
    }

    /// Substring match on one column; empty value is a no-op
    pub fn apply_like(&self, q: &mut dyn QueryDsl, column: &str, value: &str) -> FilterResult<()> {
        if value.is_empty() {
            return Ok(());
        }
        q.where_like(column, value);
        Ok(())
    }

    /// One grouped clause of OR-combined substring matches across
    /// `columns`, AND-combined with everything before it
    pub fn apply_or_like(
        &self,
        q: &mut dyn QueryDsl,
        columns: &[&str],
        value: &str,
    ) -> FilterResult<()> {
        if value.is_empty() || columns.is_empty() {
            return Ok(());
        }
        q.push_group(Combinator::And, &mut |group| {
            for column in columns {
                group.push(Combinator::Or, Predicate::like(*column, value));
            }
        });
        Ok(())
    }

    /// Existence constraint: the relation has at least one row matching
    /// `conditions`. Unmatched scalar values default to substring match
    /// (search semantics), unlike `apply_spec`'s exact equality.
    pub fn apply_relation_search(
        &self,
        q: &mut dyn QueryDsl,
        relation: &str,
        conditions: &FilterSpec,
    ) -> FilterResult<()> {
        if relation.is_empty() || conditions.is_empty() {
            return Ok(());
        }
        let ctx = self.context_if_ranged(conditions.entries().iter().map(|(_, d)| d))?;

        let mut result = Ok(());
        q.push_exists(Combinator::And, relation, &mut |sub| {
            for (column, directive) in conditions.entries() {
                if directive.is_empty() {
                    debug!(column, "skipping empty search value");
                    continue;
                }
                let emitted = match directive {
                    Directive::Equals(value) => {
                        sub.push(
                            Combinator::And,
                            Predicate::like(column.as_str(), value.to_plain_string()),
                        );
                        Ok(())
                    }
                    other => emit_directive(sub, column, other, Combinator::And, &ctx),
                };
                if emitted.is_err() {
                    result = emitted;
                    return;
                }
            }
        });
        result
    }

    /// Constrain relations per `relations`, joining each constraint to the
    /// query with `combinator`. The combinator also threads into the inner
    /// predicates so OR-style relation filters group correctly.
    pub fn apply_relation_filter(
        &self,
        q: &mut dyn QueryDsl,
        relations: &RelationFilterSpec,
        combinator: Combinator,
    ) -> FilterResult<()> {
        for (relation, condition) in relations.entries() {
            if condition.is_empty() {
                debug!(relation, "skipping empty relation conditions");
                continue;
            }

            match condition {
                RelationCondition::Compare { column, op, value } => {
                    q.push_exists(combinator, relation, &mut |sub| {
                        sub.push(
                            Combinator::And,
                            Predicate::cmp(column.as_str(), *op, value.clone()),
                        );
                    });
                }
                RelationCondition::Where(conditions) => {
                    q.push_exists(combinator, relation, &mut |sub| {
                        for (column, predicate) in conditions {
                            if predicate.is_empty() {
                                debug!(column, "skipping empty relation condition");
                                continue;
                            }
                            match predicate {
                                RelationPredicate::Custom(custom) => {
                                    sub.push_group(combinator, &mut |group| custom.apply(group));
                                }
                                RelationPredicate::Compare(op, value) => sub.push(
                                    combinator,
                                    Predicate::cmp(column.as_str(), *op, value.clone()),
                                ),
                                RelationPredicate::Null(is_null) => sub.push(
                                    combinator,
                                    Predicate::null(column.as_str(), *is_null),
                                ),
                                RelationPredicate::Equals(value) => sub.push(
                                    combinator,
                                    Predicate::eq(column.as_str(), value.clone()),
                                ),
                            }
                        }
                    });
                }
            }
        }
        Ok(())
    }

    /// Inclusive date-range filter. Either bound may be omitted; omitting
    /// both is a no-op. Bounds are interpreted as local calendar days in
    /// the effective timezone and converted to UTC.
    pub fn apply_date_range(
        &self,
        q: &mut dyn QueryDsl,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        column: &str,
        timezone: Option<&str>,
    ) -> FilterResult<()> {
        if from.is_none() && to.is_none() {
            return Ok(());
        }
        let ctx = TimezoneContext::resolve(timezone, &self.config)?;

        if let Some(from) = from {
            q.where_cmp(
                column,
                CompareOp::GtEq,
                FilterValue::Timestamp(ctx.day_start_utc(from)),
            );
        }
        if let Some(to) = to {
            q.where_cmp(
                column,
                CompareOp::LtEq,
                FilterValue::Timestamp(ctx.day_end_utc(to)),
            );
        }
        Ok(())
    }

    /// Single-day filter: rows whose column falls within the local
    /// calendar day, converted to UTC. `None` is a no-op.
    pub fn apply_date(
        &self,
        q: &mut dyn QueryDsl,
        date: Option<NaiveDate>,
        column: &str,
        timezone: Option<&str>,
    ) -> FilterResult<()> {
        let Some(date) = date else {
            return Ok(());
        };
        let ctx = TimezoneContext::resolve(timezone, &self.config)?;
        q.where_between(
            column,
            FilterValue::Timestamp(ctx.day_start_utc(date)),
            FilterValue::Timestamp(ctx.day_end_utc(date)),
        );
        Ok(())
    }

    /// Filter by calendar month(s) of the current year in the effective
    /// timezone. A collection OR-combines the per-month ranges.
    pub fn apply_month(
        &self,
        q: &mut dyn QueryDsl,
        months: impl Into<PeriodArg<u32>>,
        column: &str,
        timezone: Option<&str>,
    ) -> FilterResult<()> {
        let months = months.into();
        if months.is_empty() {
            return Ok(());
        }
        let ctx = TimezoneContext::resolve(timezone, &self.config)?;
        let year = ctx.current_year();

        let bounds = months
            .values()
            .into_iter()
            .map(|m| ctx.month_bounds_utc(year, m))
            .collect::<FilterResult<Vec<_>>>()?;

        emit_period_ranges(q, column, bounds, months.is_collection());
        Ok(())
    }

    /// Filter by calendar year(s) in the effective timezone. A collection
    /// OR-combines the per-year ranges.
    pub fn apply_year(
        &self,
        q: &mut dyn QueryDsl,
        years: impl Into<PeriodArg<i32>>,
        column: &str,
        timezone: Option<&str>,
    ) -> FilterResult<()> {
        let years = years.into();
        if years.is_empty() {
            return Ok(());
        }
        let ctx = TimezoneContext::resolve(timezone, &self.config)?;

        let bounds = years
            .values()
            .into_iter()
            .map(|y| ctx.year_bounds_utc(y))
            .collect::<FilterResult<Vec<_>>>()?;

        emit_period_ranges(q, column, bounds, years.is_collection());
        Ok(())
    }

    /// ORDER BY; an empty column is a no-op
    pub fn apply_sort(
        &self,
        q: &mut dyn QueryDsl,
        column: &str,
        direction: SortDirection,
    ) -> FilterResult<()> {
        if column.is_empty() {
            return Ok(());
        }
        q.order_by(column, direction);
        Ok(())
    }

    /// Newest-first ordering shorthand
    pub fn apply_latest(&self, q: &mut dyn QueryDsl, column: &str) -> FilterResult<()> {
        self.apply_sort(q, column, SortDirection::Desc)
    }

    /// Oldest-first ordering shorthand
    pub fn apply_oldest(&self, q: &mut dyn QueryDsl, column: &str) -> FilterResult<()> {
        self.apply_sort(q, column, SortDirection::Asc)
    }

    /// Read allowed columns from an external source and filter on the
    /// ones present. Presence is checked, not emptiness; a present-but-
    /// empty value still goes through the normal skip rule.
    pub fn apply_from_source(
        &self,
        q: &mut dyn QueryDsl,
        source: &dyn ValueSource,
        allowed_columns: &[&str],
    ) -> FilterResult<()> {
        for column in allowed_columns {
            if !source.has(column) {
                continue;
            }
            let value = source.get(column).unwrap_or(JsonValue::Null);
            let directive = Directive::from_json(&value)?;
            self.apply_equals(q, column, &directive)?;
        }
        Ok(())
    }

    /// Resolve a timezone context only when a range directive needs one
    fn context_if_ranged<'a>(
        &self,
        mut directives: impl Iterator<Item = &'a Directive>,
    ) -> FilterResult<TimezoneContext> {
        if directives.any(|d| matches!(d, Directive::Range { .. })) {
            TimezoneContext::resolve(None, &self.config)
        } else {
            Ok(TimezoneContext::utc())
        }
    }
}

fn emit_period_ranges(
    q: &mut dyn QueryDsl,
    column: &str,
    bounds: Vec<(DateTime<Utc>, DateTime<Utc>)>,
    grouped: bool,
) {
    if grouped {
        q.push_group(Combinator::And, &mut |group| {
            for (low, high) in &bounds {
                group.push(
                    Combinator::Or,
                    Predicate::between(
                        column,
                        FilterValue::Timestamp(*low),
                        FilterValue::Timestamp(*high),
                    ),
                );
            }
        });
    } else if let Some((low, high)) = bounds.into_iter().next() {
        q.where_between(
            column,
            FilterValue::Timestamp(low),
            FilterValue::Timestamp(high),
        );
    }
}

/// Snap a range bound outward to the edge of the period it falls in
fn range_bounds(
    ctx: &TimezoneContext,
    date: NaiveDate,
    unit: RangeUnit,
) -> FilterResult<(DateTime<Utc>, DateTime<Utc>)> {
    match unit {
        RangeUnit::Day => Ok((ctx.day_start_utc(date), ctx.day_end_utc(date))),
        RangeUnit::Month => ctx.month_bounds_utc(date.year(), date.month()),
        RangeUnit::Year => ctx.year_bounds_utc(date.year()),
    }
}

/// Emit one non-empty directive with the given combinator.
///
/// `ctx` must be resolved by the caller; range directives are the only
/// consumers.
fn emit_directive(
    q: &mut dyn QueryDsl,
    column: &str,
    directive: &Directive,
    conj: Combinator,
    ctx: &TimezoneContext,
) -> FilterResult<()> {
    trace!(column, ?directive, "emitting predicate");
    match directive {
        Directive::Equals(value) => q.push(conj, Predicate::eq(column, value.clone())),
        Directive::In(values) => q.push(conj, Predicate::is_in(column, values.clone())),
        Directive::Null(is_null) => q.push(conj, Predicate::null(column, *is_null)),
        Directive::Like(needle) => q.push(conj, Predicate::like(column, needle.clone())),
        Directive::Compare(op, value) => {
            q.push(conj, Predicate::cmp(column, *op, value.clone()))
        }
        Directive::Range { from, to, unit } => {
            // The lower bound keeps the caller's combinator; the upper
            // joins with AND so "x OR lo <= c AND c <= hi" groups the
            // interval under SQL precedence
            if let Some(from) = from {
                let (low, _) = range_bounds(ctx, *from, *unit)?;
                q.push(
                    conj,
                    Predicate::cmp(column, CompareOp::GtEq, FilterValue::Timestamp(low)),
                );
            }
            if let Some(to) = to {
                let (_, high) = range_bounds(ctx, *to, *unit)?;
                q.push(
                    Combinator::And,
                    Predicate::cmp(column, CompareOp::LtEq, FilterValue::Timestamp(high)),
                );
            }
        }
        Directive::Custom(custom) => {
            q.push_group(conj, &mut |group| custom.apply(group));
        }
    }
    Ok(())
}
