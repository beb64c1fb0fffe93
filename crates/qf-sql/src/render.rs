//! Predicate-to-SQL rendering
//!
//! Values render as escaped literals. Substring matches use ILIKE; the
//! needle is escaped so user input never injects wildcards.

use qf_core::{CompareOp, FilterValue, Predicate};

/// Render a single predicate as a SQL fragment
pub fn render_predicate(predicate: &Predicate) -> String {
    match predicate {
        Predicate::Cmp { column, op, value } => match op {
            CompareOp::Like => format!("{} LIKE {}", column, literal(value)),
            _ => format!("{} {} {}", column, op.as_sql(), literal(value)),
        },
        Predicate::In { column, values } => {
            if values.is_empty() {
                // An empty IN list can match nothing
                return "1 = 0".to_string();
            }
            let list = values.iter().map(literal).collect::<Vec<_>>().join(", ");
            format!("{column} IN ({list})")
        }
        Predicate::Null { column, is_null } => {
            if *is_null {
                format!("{column} IS NULL")
            } else {
                format!("{column} IS NOT NULL")
            }
        }
        Predicate::Like { column, needle } => {
            format!("{} ILIKE '%{}%'", column, escape_like(needle))
        }
        Predicate::Between { column, low, high } => {
            format!("{} BETWEEN {} AND {}", column, literal(low), literal(high))
        }
    }
}

/// Render a filter value as a SQL literal
pub fn literal(value: &FilterValue) -> String {
    match value {
        FilterValue::Null => "NULL".to_string(),
        FilterValue::Str(s) => format!("'{}'", escape_string(s)),
        FilterValue::Int(i) => i.to_string(),
        FilterValue::Float(f) => f.to_string(),
        FilterValue::Bool(b) => b.to_string(),
        FilterValue::Timestamp(ts) => format!("'{}'", ts.format("%Y-%m-%d %H:%M:%S%.6f")),
    }
}

/// Escape string for SQL (prevent SQL injection)
pub fn escape_string(s: &str) -> String {
    s.replace('\'', "''")
}

/// Escape string for LIKE patterns
pub fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
        .replace('\'', "''")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_string() {
        assert_eq!(escape_string("test"), "test");
        assert_eq!(escape_string("O'Brien"), "O''Brien");
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("it's"), "it''s");
    }

    #[test]
    fn test_render_cmp() {
        let p = Predicate::eq("status", "active");
        assert_eq!(render_predicate(&p), "status = 'active'");

        let p = Predicate::cmp("total", CompareOp::GtEq, 100i64);
        assert_eq!(render_predicate(&p), "total >= 100");
    }

    #[test]
    fn test_render_in() {
        let p = Predicate::is_in("role_id", vec![1i64.into(), 2i64.into()]);
        assert_eq!(render_predicate(&p), "role_id IN (1, 2)");

        let p = Predicate::is_in("role_id", vec![]);
        assert_eq!(render_predicate(&p), "1 = 0");
    }

    #[test]
    fn test_render_null_checks() {
        assert_eq!(
            render_predicate(&Predicate::null("deleted_at", true)),
            "deleted_at IS NULL"
        );
        assert_eq!(
            render_predicate(&Predicate::null("deleted_at", false)),
            "deleted_at IS NOT NULL"
        );
    }

    #[test]
    fn test_render_like_escapes_wildcards() {
        let p = Predicate::like("name", "50%_off");
        assert_eq!(render_predicate(&p), "name ILIKE '%50\\%\\_off%'");
    }

    #[test]
    fn test_render_timestamp_literal() {
        let ts: chrono::DateTime<chrono::Utc> = "2024-05-09T23:00:00Z".parse().unwrap();
        assert_eq!(
            literal(&FilterValue::Timestamp(ts)),
            "'2024-05-09 23:00:00.000000'"
        );
    }
}
