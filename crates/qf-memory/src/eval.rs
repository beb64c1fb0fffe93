//! Predicate evaluation against JSON rows
//!
//! Comparisons are typed: numbers compare numerically, strings lexically,
//! and timestamp values compare against RFC 3339 (or `YYYY-MM-DD
//! HH:MM:SS`) strings in the row. Values of incomparable types never
//! match, mirroring SQL's null semantics.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value as JsonValue;

use qf_core::{CompareOp, FilterValue, Predicate};

/// Evaluate one predicate against a row object
pub fn eval_predicate(predicate: &Predicate, row: &JsonValue) -> bool {
    match predicate {
        Predicate::Cmp { column, op, value } => {
            let field = field_of(row, column);
            match op {
                CompareOp::Like => match (field, value) {
                    (Some(JsonValue::String(text)), FilterValue::Str(pattern)) => {
                        like_match(pattern, text)
                    }
                    _ => false,
                },
                _ => match compare(field, value) {
                    Some(ordering) => op_holds(*op, ordering),
                    None => false,
                },
            }
        }
        Predicate::In { column, values } => {
            let field = field_of(row, column);
            values
                .iter()
                .any(|v| compare(field, v) == Some(Ordering::Equal))
        }
        Predicate::Null { column, is_null } => {
            let absent = matches!(field_of(row, column), None | Some(JsonValue::Null));
            absent == *is_null
        }
        Predicate::Like { column, needle } => match field_of(row, column) {
            Some(JsonValue::String(text)) => {
                text.to_lowercase().contains(&needle.to_lowercase())
            }
            Some(JsonValue::Number(n)) => n.to_string().contains(needle.as_str()),
            _ => false,
        },
        Predicate::Between { column, low, high } => {
            let field = field_of(row, column);
            let lower = matches!(
                compare(field, low),
                Some(Ordering::Greater) | Some(Ordering::Equal)
            );
            let upper = matches!(
                compare(field, high),
                Some(Ordering::Less) | Some(Ordering::Equal)
            );
            lower && upper
        }
    }
}

fn field_of<'a>(row: &'a JsonValue, column: &str) -> Option<&'a JsonValue> {
    row.as_object().and_then(|m| m.get(column))
}

fn op_holds(op: CompareOp, ordering: Ordering) -> bool {
    match op {
        CompareOp::Eq => ordering == Ordering::Equal,
        CompareOp::NotEq => ordering != Ordering::Equal,
        CompareOp::Lt => ordering == Ordering::Less,
        CompareOp::LtEq => ordering != Ordering::Greater,
        CompareOp::Gt => ordering == Ordering::Greater,
        CompareOp::GtEq => ordering != Ordering::Less,
        CompareOp::Like => false,
    }
}

/// Compare a row field against a filter value; `None` when the types do
/// not line up or either side is null
fn compare(field: Option<&JsonValue>, value: &FilterValue) -> Option<Ordering> {
    let field = field?;
    match (field, value) {
        (JsonValue::Number(n), FilterValue::Int(i)) => n.as_f64()?.partial_cmp(&(*i as f64)),
        (JsonValue::Number(n), FilterValue::Float(f)) => n.as_f64()?.partial_cmp(f),
        (JsonValue::String(s), FilterValue::Str(v)) => Some(s.as_str().cmp(v.as_str())),
        (JsonValue::Bool(b), FilterValue::Bool(v)) => Some(b.cmp(v)),
        (JsonValue::String(s), FilterValue::Timestamp(ts)) => {
            Some(parse_timestamp(s)?.cmp(ts))
        }
        _ => None,
    }
}

/// Parse a row timestamp: RFC 3339 first, then a naive
/// `YYYY-MM-DD HH:MM:SS[.frac]` treated as UTC, then a bare date
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }
    None
}

/// Case-insensitive SQL LIKE match with `%` and `_` wildcards
pub fn like_match(pattern: &str, text: &str) -> bool {
    fn matches(p: &[char], t: &[char]) -> bool {
        match p.first() {
            None => t.is_empty(),
            Some('%') => (0..=t.len()).any(|i| matches(&p[1..], &t[i..])),
            Some('_') => !t.is_empty() && matches(&p[1..], &t[1..]),
            Some(c) => t.first() == Some(c) && matches(&p[1..], &t[1..]),
        }
    }
    let p: Vec<char> = pattern.to_lowercase().chars().collect();
    let t: Vec<char> = text.to_lowercase().chars().collect();
    matches(&p, &t)
}

/// Ordering between two row fields, for ORDER BY
pub fn json_cmp(a: Option<&JsonValue>, b: Option<&JsonValue>) -> Ordering {
    match (a, b) {
        (None | Some(JsonValue::Null), None | Some(JsonValue::Null)) => Ordering::Equal,
        (None | Some(JsonValue::Null), Some(_)) => Ordering::Less,
        (Some(_), None | Some(JsonValue::Null)) => Ordering::Greater,
        (Some(JsonValue::Number(x)), Some(JsonValue::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(JsonValue::String(x)), Some(JsonValue::String(y))) => x.cmp(y),
        (Some(JsonValue::Bool(x)), Some(JsonValue::Bool(y))) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_eq_on_numbers_and_strings() {
        let row = json!({"score": 10, "name": "Alice"});
        assert!(eval_predicate(&Predicate::eq("score", 10i64), &row));
        assert!(!eval_predicate(&Predicate::eq("score", 11i64), &row));
        assert!(eval_predicate(&Predicate::eq("name", "Alice"), &row));
    }

    #[test]
    fn test_type_mismatch_never_matches() {
        let row = json!({"score": 10});
        assert!(!eval_predicate(&Predicate::eq("score", "10"), &row));
        assert!(!eval_predicate(
            &Predicate::cmp("score", CompareOp::NotEq, FilterValue::Str("10".into())),
            &row
        ));
    }

    #[test]
    fn test_null_checks() {
        let row = json!({"deleted_at": null, "name": "Alice"});
        assert!(eval_predicate(&Predicate::null("deleted_at", true), &row));
        assert!(eval_predicate(&Predicate::null("missing", true), &row));
        assert!(eval_predicate(&Predicate::null("name", false), &row));
        assert!(!eval_predicate(&Predicate::null("name", true), &row));
    }

    #[test]
    fn test_substring_is_case_insensitive() {
        let row = json!({"name": "Alice Cooper"});
        assert!(eval_predicate(&Predicate::like("name", "cooper"), &row));
        assert!(!eval_predicate(&Predicate::like("name", "bob"), &row));
    }

    #[test]
    fn test_between_timestamps() {
        let row = json!({"created_at": "2024-05-10T12:00:00Z"});
        let low: DateTime<Utc> = "2024-05-10T00:00:00Z".parse().unwrap();
        let high: DateTime<Utc> = "2024-05-10T23:59:59Z".parse().unwrap();
        assert!(eval_predicate(
            &Predicate::between(
                "created_at",
                FilterValue::Timestamp(low),
                FilterValue::Timestamp(high)
            ),
            &row
        ));
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp("2024-05-10T12:00:00Z").is_some());
        assert!(parse_timestamp("2024-05-10 12:00:00").is_some());
        assert!(parse_timestamp("2024-05-10 12:00:00.123456").is_some());
        assert!(parse_timestamp("2024-05-10").is_some());
        assert!(parse_timestamp("not a date").is_none());
    }

    #[test]
    fn test_like_match_wildcards() {
        assert!(like_match("%ali%", "Alice"));
        assert!(like_match("a_ice", "Alice"));
        assert!(like_match("alice", "ALICE"));
        assert!(!like_match("a_ice", "Alicce"));
        assert!(!like_match("alice%", "xalice"));
    }
}
