//! Expression layer for WHERE/HAVING clauses.
//!
//! `Expr` is the already-validated form of a condition. `Expr::build()`
//! renders SQL with the dialect's placeholders, numbering them from the
//! shared [`ParamList`] so that fragments compiled at different points of a
//! statement never collide.

use crate::dialect::Dialect;
use crate::qb::param::ParamList;
use crate::value::Value;

/// Expression node for building WHERE/HAVING clauses.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// AND group: all conditions must be true.
    And(Vec<Expr>),

    /// OR group: at least one condition must be true.
    Or(Vec<Expr>),

    /// Simple comparison: column op $n
    Compare {
        column: String,
        op: &'static str,
        value: Value,
    },

    /// NULL check: column IS NULL or column IS NOT NULL
    NullCheck { column: String, is_null: bool },

    /// IN list with members rendered as SQL literals.
    InList {
        column: String,
        literals: Vec<String>,
        negated: bool,
    },

    /// Template with `?` placeholders that get replaced with the dialect's
    /// placeholders.
    Template { sql: String, params: Vec<Value> },

    /// Always true (used for empty NOT IN lists).
    True,

    /// Always false (used for empty IN lists).
    False,
}

impl Expr {
    /// Create an AND expression from a list of expressions.
    pub fn and(exprs: Vec<Expr>) -> Self {
        Expr::And(exprs)
    }

    /// Create an OR expression from a list of expressions.
    pub fn or(exprs: Vec<Expr>) -> Self {
        Expr::Or(exprs)
    }

    /// Create an equality condition: column = value
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Expr::Compare {
            column: column.into(),
            op: "=",
            value: value.into(),
        }
    }

    /// Create an IN condition from pre-rendered literals.
    ///
    /// An empty list is always false; an empty negated list is always true.
    pub fn in_literals(column: impl Into<String>, literals: Vec<String>, negated: bool) -> Self {
        match (literals.is_empty(), negated) {
            (true, false) => Expr::False,
            (true, true) => Expr::True,
            _ => Expr::InList {
                column: column.into(),
                literals,
                negated,
            },
        }
    }

    /// Create a template expression with `?` placeholders.
    pub fn template(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Expr::Template {
            sql: sql.into(),
            params,
        }
    }

    /// Check if this expression is empty (contains no conditions).
    pub fn is_empty(&self) -> bool {
        match self {
            Expr::And(exprs) | Expr::Or(exprs) => exprs.iter().all(|e| e.is_empty()),
            _ => false,
        }
    }

    /// Build the SQL fragment, collecting bound values into `params`.
    pub fn build(&self, dialect: Dialect, params: &mut ParamList) -> String {
        match self {
            Expr::And(exprs) => Self::join(exprs, " AND ", dialect, params),
            Expr::Or(exprs) => Self::join(exprs, " OR ", dialect, params),
            Expr::Compare { column, op, value } => {
                let ph = params.push_placeholder(dialect, value.clone());
                format!("{column} {op} {ph}")
            }
            Expr::NullCheck { column, is_null } => {
                if *is_null {
                    format!("{column} IS NULL")
                } else {
                    format!("{column} IS NOT NULL")
                }
            }
            Expr::InList {
                column,
                literals,
                negated,
            } => {
                let op = if *negated { "NOT IN" } else { "IN" };
                format!("{column} {op} ({})", literals.join(", "))
            }
            Expr::Template {
                sql,
                params: template_params,
            } => {
                let mut result = String::with_capacity(sql.len());
                let mut values = template_params.iter();
                for ch in sql.chars() {
                    if ch == '?' {
                        if let Some(v) = values.next() {
                            result.push_str(&params.push_placeholder(dialect, v.clone()));
                            continue;
                        }
                    }
                    result.push(ch);
                }
                result
            }
            Expr::True => "1=1".to_string(),
            Expr::False => "1=0".to_string(),
        }
    }

    fn join(exprs: &[Expr], sep: &str, dialect: Dialect, params: &mut ParamList) -> String {
        let parts: Vec<String> = exprs
            .iter()
            .filter(|e| !e.is_empty())
            .map(|e| {
                let sql = e.build(dialect, params);
                // nested groups and templates keep their own precedence
                if matches!(e, Expr::And(_) | Expr::Or(_) | Expr::Template { .. }) {
                    format!("({sql})")
                } else {
                    sql
                }
            })
            .collect();
        parts.join(sep)
    }
}

/// A group of expressions combined with AND, as attached to one clause.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExprGroup {
    exprs: Vec<Expr>,
}

impl ExprGroup {
    /// Create an empty group.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an expression. A top-level AND group is spliced in member by member.
    pub fn and_expr(&mut self, expr: Expr) {
        match expr {
            Expr::And(items) => {
                for item in items {
                    self.and_expr(item);
                }
            }
            other if !other.is_empty() => self.exprs.push(other),
            _ => {}
        }
    }

    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.exprs.len()
    }

    /// Build the group into `params`.
    pub fn build_into(&self, dialect: Dialect, params: &mut ParamList) -> String {
        Expr::join(&self.exprs, " AND ", dialect, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compare_binds_value() {
        let mut params = ParamList::new();
        let sql = Expr::eq("age", 18).build(Dialect::Postgres, &mut params);
        assert_eq!(sql, "age = $1");
        assert_eq!(params.as_slice(), &[Value::Int(18)]);
    }

    #[test]
    fn nested_groups_are_parenthesized() {
        let expr = Expr::and(vec![
            Expr::eq("status", "active"),
            Expr::or(vec![Expr::eq("role", "admin"), Expr::eq("role", "owner")]),
        ]);
        let mut params = ParamList::new();
        assert_eq!(
            expr.build(Dialect::Postgres, &mut params),
            "status = $1 AND (role = $2 OR role = $3)"
        );
    }

    #[test]
    fn empty_in_lists() {
        assert_eq!(Expr::in_literals("id", vec![], false), Expr::False);
        assert_eq!(Expr::in_literals("id", vec![], true), Expr::True);
    }

    #[test]
    fn template_numbering_continues() {
        let mut params = ParamList::new();
        params.push(1);
        let sql = Expr::template("a = ? OR b = ?", vec![Value::Int(2), Value::Int(3)])
            .build(Dialect::Postgres, &mut params);
        assert_eq!(sql, "a = $2 OR b = $3");
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn group_skips_empty_expressions() {
        let mut group = ExprGroup::new();
        group.and_expr(Expr::and(vec![]));
        assert!(group.is_empty());
        group.and_expr(Expr::eq("a", 1));
        let mut params = ParamList::new();
        assert_eq!(group.build_into(Dialect::MySql, &mut params), "a = ?");
    }

    #[test]
    fn group_splices_top_level_and() {
        let mut group = ExprGroup::new();
        group.and_expr(Expr::and(vec![
            Expr::eq("a", 1),
            Expr::or(vec![Expr::eq("b", 2), Expr::eq("c", 3)]),
        ]));
        assert_eq!(group.len(), 2);
        let mut params = ParamList::new();
        assert_eq!(
            group.build_into(Dialect::Postgres, &mut params),
            "a = $1 AND (b = $2 OR c = $3)"
        );
    }
}
