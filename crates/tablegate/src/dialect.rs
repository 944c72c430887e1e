//! SQL dialect differences the compiler has to care about.
//!
//! The compiler emits plain ANSI SQL and defers to [`Dialect`] only for the
//! few places where drivers disagree: placeholder syntax, LIMIT/OFFSET,
//! the sequence-name hint used to read back generated keys, and literal
//! quoting for inline IN-lists.

use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Postgres,
    MySql,
    Sqlite,
    #[serde(alias = "sqlsrv")]
    SqlServer,
}

/// Renders string literals for SQL text.
///
/// Only used for the inline IN-list rendering of match criteria and list
/// conditions; everything else is bound.
pub trait QuoteLiteral {
    fn quote_literal(&self, value: &str) -> String;
}

impl Dialect {
    /// Placeholder for the 1-based parameter index `idx`.
    pub fn placeholder(&self, idx: usize) -> String {
        match self {
            Dialect::Postgres => format!("${idx}"),
            _ => "?".to_string(),
        }
    }

    /// Sequence name passed to the gateway when reading back a generated key.
    pub fn last_insert_id_name(&self, table: &str, primary_col: &str) -> Option<String> {
        match self {
            Dialect::Postgres => Some(format!("{table}_{primary_col}_seq")),
            _ => None,
        }
    }

    /// Whether LIMIT is rendered in the projection (`SELECT TOP n`).
    pub(crate) fn uses_top(&self, limit: Option<u64>, offset: Option<u64>) -> bool {
        matches!(self, Dialect::SqlServer) && limit.is_some() && offset.is_none()
    }

    /// Append the LIMIT/OFFSET tail for this dialect.
    ///
    /// `has_order` tells SQL Server whether an ORDER BY is already present,
    /// since OFFSET/FETCH is only valid after one.
    pub(crate) fn write_limit(
        &self,
        out: &mut String,
        limit: Option<u64>,
        offset: Option<u64>,
        has_order: bool,
    ) {
        match self {
            Dialect::SqlServer => {
                if offset.is_none() {
                    // LIMIT alone is rendered as TOP n
                    return;
                }
                if !has_order {
                    out.push_str(" ORDER BY (SELECT NULL)");
                }
                let _ = write!(out, " OFFSET {} ROWS", offset.unwrap_or(0));
                if let Some(n) = limit {
                    let _ = write!(out, " FETCH NEXT {n} ROWS ONLY");
                }
            }
            _ => {
                match (limit, offset) {
                    (Some(n), _) => {
                        let _ = write!(out, " LIMIT {n}");
                    }
                    (None, Some(_)) => match self {
                        Dialect::Sqlite => out.push_str(" LIMIT -1"),
                        Dialect::MySql => out.push_str(" LIMIT 18446744073709551615"),
                        _ => {}
                    },
                    (None, None) => {}
                }
                if let Some(m) = offset {
                    let _ = write!(out, " OFFSET {m}");
                }
            }
        }
    }
}

impl QuoteLiteral for Dialect {
    fn quote_literal(&self, value: &str) -> String {
        let mut out = String::with_capacity(value.len() + 2);
        out.push('\'');
        for c in value.chars() {
            match c {
                '\'' => out.push_str("''"),
                '\\' if *self == Dialect::MySql => out.push_str("\\\\"),
                _ => out.push(c),
            }
        }
        out.push('\'');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limit(d: Dialect, l: Option<u64>, o: Option<u64>, ordered: bool) -> String {
        let mut s = String::new();
        d.write_limit(&mut s, l, o, ordered);
        s
    }

    #[test]
    fn placeholders() {
        assert_eq!(Dialect::Postgres.placeholder(3), "$3");
        assert_eq!(Dialect::MySql.placeholder(3), "?");
        assert_eq!(Dialect::Sqlite.placeholder(1), "?");
    }

    #[test]
    fn limit_and_offset() {
        assert_eq!(limit(Dialect::Postgres, Some(10), Some(20), false), " LIMIT 10 OFFSET 20");
        assert_eq!(limit(Dialect::Postgres, None, Some(5), false), " OFFSET 5");
        assert_eq!(limit(Dialect::Sqlite, None, Some(5), false), " LIMIT -1 OFFSET 5");
        assert_eq!(
            limit(Dialect::MySql, None, Some(5), false),
            " LIMIT 18446744073709551615 OFFSET 5"
        );
        assert_eq!(limit(Dialect::SqlServer, Some(10), None, false), "");
        assert_eq!(
            limit(Dialect::SqlServer, Some(10), Some(20), true),
            " OFFSET 20 ROWS FETCH NEXT 10 ROWS ONLY"
        );
        assert_eq!(
            limit(Dialect::SqlServer, None, Some(20), false),
            " ORDER BY (SELECT NULL) OFFSET 20 ROWS"
        );
    }

    #[test]
    fn sequence_hint_only_on_postgres() {
        assert_eq!(
            Dialect::Postgres.last_insert_id_name("authors", "id").as_deref(),
            Some("authors_id_seq")
        );
        assert_eq!(Dialect::MySql.last_insert_id_name("authors", "id"), None);
    }

    #[test]
    fn literal_quoting() {
        assert_eq!(Dialect::Postgres.quote_literal("O'Hara"), "'O''Hara'");
        assert_eq!(Dialect::MySql.quote_literal(r"a\b"), r"'a\\b'");
        assert_eq!(Dialect::Sqlite.quote_literal(r"a\b"), r"'a\b'");
    }

    #[test]
    fn deserializes_driver_names() {
        let d: Dialect = serde_json::from_str("\"sqlsrv\"").expect("alias");
        assert_eq!(d, Dialect::SqlServer);
        let d: Dialect = serde_json::from_str("\"mysql\"").expect("mysql");
        assert_eq!(d, Dialect::MySql);
    }
}
