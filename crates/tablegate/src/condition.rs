//! Filter specifications for WHERE and HAVING, and the builder that compiles
//! them into SQL fragments.
//!
//! A [`ConditionSpec`] is an ordered list of [`Condition`] entries combined
//! with AND. Entries can be column comparisons, raw SQL with `?`
//! placeholders, or nested OR/AND groups. WHERE and HAVING share the same
//! grammar; the [`Clause`] only decides which error kind reports a malformed
//! entry.
//!
//! # Example
//!
//! ```ignore
//! use tablegate::{Clause, Condition, ConditionBuilder, ConditionSpec, Dialect};
//!
//! let spec = ConditionSpec::new()
//!     .and(Condition::cmp("age", ">", 18))
//!     .and(Condition::in_list("status", vec!["active".into(), "trial".into()]))
//!     .and(Condition::or(vec![
//!         Condition::eq("role", "admin"),
//!         Condition::raw("score > ?", vec![90.into()]),
//!     ]));
//!
//! let dialect = Dialect::Postgres;
//! let (sql, params) = ConditionBuilder::new(dialect, &dialect, Clause::Where).compile(&spec)?;
//! // age > $1 AND status IN ('active', 'trial') AND (role = $2 OR (score > $3))
//! ```

use crate::dialect::{Dialect, QuoteLiteral};
use crate::error::{ErrorKind, OrmError, OrmResult};
use crate::qb::{Expr, ParamList};
use crate::value::Value;

/// Which clause a condition spec is compiled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clause {
    Where,
    Having,
}

impl Clause {
    /// Error kind reported for malformed entries of this clause.
    pub fn error_kind(&self) -> ErrorKind {
        match self {
            Clause::Where => ErrorKind::BadWhereParam,
            Clause::Having => ErrorKind::BadHavingParam,
        }
    }

    /// Parameter key naming this clause.
    pub fn key(&self) -> &'static str {
        match self {
            Clause::Where => "where",
            Clause::Having => "having",
        }
    }

    fn error(&self, detail: impl Into<String>) -> OrmError {
        OrmError::new(
            self.error_kind(),
            format!("{}: {}", self.key(), detail.into()),
        )
    }
}

/// Right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum CondValue {
    /// Bound as a parameter.
    Scalar(Value),
    /// Rendered inline as an IN-list.
    List(Vec<Value>),
}

/// One entry of a [`ConditionSpec`].
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `column op value`. The operator defaults to `=` for scalars and `IN`
    /// for lists.
    Compare {
        column: String,
        op: Option<String>,
        value: CondValue,
    },
    /// Raw SQL with `?` placeholders, one per parameter.
    Raw { sql: String, params: Vec<Value> },
    /// At least one nested condition must hold.
    Or(Vec<Condition>),
    /// All nested conditions must hold.
    And(Vec<Condition>),
}

impl Condition {
    /// `column = value`
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Condition::Compare {
            column: column.into(),
            op: None,
            value: CondValue::Scalar(value.into()),
        }
    }

    /// `column op value`
    pub fn cmp(column: impl Into<String>, op: impl Into<String>, value: impl Into<Value>) -> Self {
        Condition::Compare {
            column: column.into(),
            op: Some(op.into()),
            value: CondValue::Scalar(value.into()),
        }
    }

    /// `column IN (...)`
    pub fn in_list(column: impl Into<String>, values: Vec<Value>) -> Self {
        Condition::Compare {
            column: column.into(),
            op: None,
            value: CondValue::List(values),
        }
    }

    /// `column NOT IN (...)`
    pub fn not_in(column: impl Into<String>, values: Vec<Value>) -> Self {
        Condition::Compare {
            column: column.into(),
            op: Some("NOT IN".to_string()),
            value: CondValue::List(values),
        }
    }

    /// `column IS NULL`
    pub fn is_null(column: impl Into<String>) -> Self {
        Self::cmp(column, "IS", Value::Null)
    }

    /// `column IS NOT NULL`
    pub fn is_not_null(column: impl Into<String>) -> Self {
        Self::cmp(column, "IS NOT", Value::Null)
    }

    pub fn raw(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Condition::Raw {
            sql: sql.into(),
            params,
        }
    }

    pub fn or(conditions: Vec<Condition>) -> Self {
        Condition::Or(conditions)
    }

    pub fn and(conditions: Vec<Condition>) -> Self {
        Condition::And(conditions)
    }

    fn from_json(json: &serde_json::Value, clause: Clause) -> OrmResult<Self> {
        let obj = json
            .as_object()
            .ok_or_else(|| clause.error(format!("entry must be an object, got {json}")))?;

        if let Some(group) = obj.get("or") {
            return Ok(Condition::Or(ConditionSpec::from_json(group, clause)?.0));
        }
        if let Some(group) = obj.get("and") {
            return Ok(Condition::And(ConditionSpec::from_json(group, clause)?.0));
        }
        if let Some(raw) = obj.get("raw") {
            let sql = raw
                .as_str()
                .ok_or_else(|| clause.error("'raw' must be a string"))?;
            let params = match obj.get("params") {
                None | Some(serde_json::Value::Null) => Vec::new(),
                Some(serde_json::Value::Array(items)) => items
                    .iter()
                    .map(|v| {
                        Value::from_json(v)
                            .ok_or_else(|| clause.error("raw params must be scalars"))
                    })
                    .collect::<OrmResult<_>>()?,
                Some(_) => return Err(clause.error("'params' must be a list")),
            };
            return Ok(Condition::raw(sql, params));
        }

        let column = obj
            .get("col")
            .or_else(|| obj.get("column"))
            .ok_or_else(|| clause.error(format!("entry is missing a column: {json}")))?
            .as_str()
            .ok_or_else(|| clause.error("column must be a string"))?;
        let op = match obj.get("op").or_else(|| obj.get("operator")) {
            None | Some(serde_json::Value::Null) => None,
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(_) => return Err(clause.error("operator must be a string")),
        };
        let raw_value = obj
            .get("val")
            .or_else(|| obj.get("value"))
            .ok_or_else(|| clause.error(format!("entry for '{column}' is missing a value")))?;
        let value = match raw_value {
            serde_json::Value::Array(items) => CondValue::List(
                items
                    .iter()
                    .map(|v| {
                        Value::from_json(v)
                            .ok_or_else(|| clause.error(format!("list for '{column}' must hold scalars")))
                    })
                    .collect::<OrmResult<_>>()?,
            ),
            other => CondValue::Scalar(
                Value::from_json(other)
                    .ok_or_else(|| clause.error(format!("value for '{column}' must be a scalar or list")))?,
            ),
        };

        Ok(Condition::Compare {
            column: column.to_string(),
            op,
            value,
        })
    }
}

/// An ordered list of conditions combined with AND.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConditionSpec(Vec<Condition>);

impl ConditionSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Chainable push.
    pub fn and(mut self, condition: Condition) -> Self {
        self.0.push(condition);
        self
    }

    pub fn push(&mut self, condition: Condition) {
        self.0.push(condition);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Condition> {
        self.0.iter()
    }

    /// Parse the untyped form: a JSON array of entries.
    ///
    /// A non-array, or any malformed entry, fails with the clause's error kind.
    pub fn from_json(json: &serde_json::Value, clause: Clause) -> OrmResult<Self> {
        let items = json
            .as_array()
            .ok_or_else(|| clause.error(format!("expected a list, got {json}")))?;
        items
            .iter()
            .map(|item| Condition::from_json(item, clause))
            .collect::<OrmResult<Vec<_>>>()
            .map(ConditionSpec)
    }
}

impl From<Vec<Condition>> for ConditionSpec {
    fn from(conditions: Vec<Condition>) -> Self {
        ConditionSpec(conditions)
    }
}

impl FromIterator<Condition> for ConditionSpec {
    fn from_iter<I: IntoIterator<Item = Condition>>(iter: I) -> Self {
        ConditionSpec(iter.into_iter().collect())
    }
}

const OPERATORS: &[&str] = &[
    "=", "!=", "<>", "<", "<=", ">", ">=", "LIKE", "NOT LIKE", "ILIKE", "NOT ILIKE", "IS",
    "IS NOT", "IN", "NOT IN",
];

fn normalize_op(op: &str) -> Option<&'static str> {
    let normalized = op.split_whitespace().collect::<Vec<_>>().join(" ").to_uppercase();
    OPERATORS.iter().copied().find(|known| *known == normalized)
}

/// Compiles a [`ConditionSpec`] into a SQL fragment plus bound values.
///
/// Scalars are always bound. List members are rendered inline: numbers as
/// written, strings through the gateway's literal quoting.
pub struct ConditionBuilder<'a> {
    dialect: Dialect,
    quoter: &'a dyn QuoteLiteral,
    clause: Clause,
}

impl<'a> ConditionBuilder<'a> {
    pub fn new(dialect: Dialect, quoter: &'a dyn QuoteLiteral, clause: Clause) -> Self {
        Self {
            dialect,
            quoter,
            clause,
        }
    }

    /// Check a spec for structural errors without rendering it.
    pub fn validate(&self, spec: &ConditionSpec) -> OrmResult<bool> {
        self.to_expr(spec).map(|_| true)
    }

    /// Compile into a fragment and its bound values.
    ///
    /// Placeholders are numbered from 1.
    pub fn compile(&self, spec: &ConditionSpec) -> OrmResult<(String, Vec<Value>)> {
        let mut params = ParamList::new();
        let sql = self.compile_into(spec, &mut params)?;
        Ok((sql, params.into_vec()))
    }

    /// Compile into a fragment, appending bound values to `params` so
    /// placeholder numbering continues from what is already there.
    pub fn compile_into(&self, spec: &ConditionSpec, params: &mut ParamList) -> OrmResult<String> {
        let expr = self.to_expr(spec)?;
        Ok(expr.build(self.dialect, params))
    }

    /// Lower a spec to the expression tree shared by the query builders.
    pub fn to_expr(&self, spec: &ConditionSpec) -> OrmResult<Expr> {
        spec.iter()
            .map(|c| self.lower(c))
            .collect::<OrmResult<Vec<_>>>()
            .map(Expr::and)
    }

    fn lower(&self, condition: &Condition) -> OrmResult<Expr> {
        match condition {
            Condition::Compare { column, op, value } => self.lower_compare(column, op.as_deref(), value),
            Condition::Raw { sql, params } => {
                if sql.trim().is_empty() {
                    return Err(self.clause.error("raw fragment is empty"));
                }
                let placeholders = sql.matches('?').count();
                if placeholders != params.len() {
                    return Err(self.clause.error(format!(
                        "raw fragment '{sql}' has {placeholders} placeholder(s) but {} param(s)",
                        params.len()
                    )));
                }
                Ok(Expr::template(sql.clone(), params.clone()))
            }
            Condition::Or(items) | Condition::And(items) => {
                if items.is_empty() {
                    return Err(self.clause.error("condition group is empty"));
                }
                let exprs = items
                    .iter()
                    .map(|c| self.lower(c))
                    .collect::<OrmResult<Vec<_>>>()?;
                Ok(match condition {
                    Condition::Or(_) => Expr::or(exprs),
                    _ => Expr::and(exprs),
                })
            }
        }
    }

    fn lower_compare(&self, column: &str, op: Option<&str>, value: &CondValue) -> OrmResult<Expr> {
        let column = column.trim();
        if column.is_empty() {
            return Err(self.clause.error("column name is empty"));
        }

        let op = match op {
            None => match value {
                CondValue::Scalar(_) => "=",
                CondValue::List(_) => "IN",
            },
            Some(raw) => normalize_op(raw)
                .ok_or_else(|| self.clause.error(format!("unsupported operator '{raw}' for '{column}'")))?,
        };

        match (value, op) {
            (CondValue::List(items), "IN" | "NOT IN") => self.in_list(column, items, op == "NOT IN"),
            (CondValue::List(_), _) => Err(self
                .clause
                .error(format!("list value for '{column}' needs IN or NOT IN, got '{op}'"))),
            (CondValue::Scalar(v), "IN" | "NOT IN") => {
                self.in_list(column, std::slice::from_ref(v), op == "NOT IN")
            }
            (CondValue::Scalar(Value::Null), "IS" | "IS NOT") => Ok(Expr::NullCheck {
                column: column.to_string(),
                is_null: op == "IS",
            }),
            (CondValue::Scalar(_), "IS" | "IS NOT") => Err(self
                .clause
                .error(format!("'{op}' on '{column}' only accepts null"))),
            (CondValue::Scalar(v), op) => Ok(Expr::Compare {
                column: column.to_string(),
                op,
                value: v.clone(),
            }),
        }
    }

    fn in_list(&self, column: &str, items: &[Value], negated: bool) -> OrmResult<Expr> {
        let literals = items
            .iter()
            .map(|v| self.literal(column, v))
            .collect::<OrmResult<Vec<_>>>()?;
        Ok(Expr::in_literals(column, literals, negated))
    }

    fn literal(&self, column: &str, value: &Value) -> OrmResult<String> {
        match value {
            Value::Null => Ok("NULL".to_string()),
            Value::Bool(b) => Ok(if *b { "1" } else { "0" }.to_string()),
            Value::Int(i) => Ok(i.to_string()),
            Value::Float(f) if f.is_finite() => Ok(f.to_string()),
            Value::Float(f) => Err(self
                .clause
                .error(format!("list for '{column}' holds non-finite number {f}"))),
            Value::Text(s) => Ok(self.quoter.quote_literal(s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn builder(clause: Clause) -> ConditionBuilder<'static> {
        ConditionBuilder::new(Dialect::Postgres, &Dialect::Postgres, clause)
    }

    #[test]
    fn scalar_is_bound_never_inlined() {
        let spec = ConditionSpec::new().and(Condition::cmp("age", ">", 18));
        let (sql, params) = builder(Clause::Where).compile(&spec).unwrap();
        assert_eq!(sql, "age > $1");
        assert!(!sql.contains("18"));
        assert_eq!(params, vec![Value::Int(18)]);
    }

    #[test]
    fn list_renders_inline_in_order() {
        let spec = ConditionSpec::new().and(Condition::in_list(
            "code",
            vec![Value::Int(3), "O'Neil".into(), Value::Float(1.5), "b".into()],
        ));
        let (sql, params) = builder(Clause::Where).compile(&spec).unwrap();
        assert_eq!(sql, "code IN (3, 'O''Neil', 1.5, 'b')");
        assert!(params.is_empty());
    }

    #[test]
    fn empty_lists() {
        let spec = ConditionSpec::new()
            .and(Condition::in_list("a", vec![]))
            .and(Condition::not_in("b", vec![]));
        let (sql, _) = builder(Clause::Where).compile(&spec).unwrap();
        assert_eq!(sql, "1=0 AND 1=1");
    }

    #[test]
    fn or_group_and_raw() {
        let spec = ConditionSpec::new()
            .and(Condition::eq("status", "active"))
            .and(Condition::or(vec![
                Condition::eq("role", "admin"),
                Condition::raw("score > ? AND score < ?", vec![10.into(), 20.into()]),
            ]));
        let (sql, params) = builder(Clause::Where).compile(&spec).unwrap();
        assert_eq!(
            sql,
            "status = $1 AND (role = $2 OR (score > $3 AND score < $4))"
        );
        assert_eq!(params.len(), 4);
    }

    #[test]
    fn null_checks_and_operator_case() {
        let spec = ConditionSpec::new()
            .and(Condition::is_null("deleted_at"))
            .and(Condition::cmp("name", "not  like", "A%"));
        let (sql, _) = builder(Clause::Where).compile(&spec).unwrap();
        assert_eq!(sql, "deleted_at IS NULL AND name NOT LIKE $1");
    }

    #[test]
    fn structural_errors_use_clause_kind() {
        let bad = [
            ConditionSpec::new().and(Condition::cmp("a", "~~", 1)),
            ConditionSpec::new().and(Condition::eq(" ", 1)),
            ConditionSpec::new().and(Condition::or(vec![])),
            ConditionSpec::new().and(Condition::raw("a = ?", vec![])),
            ConditionSpec::new().and(Condition::Compare {
                column: "a".into(),
                op: Some(">".into()),
                value: CondValue::List(vec![Value::Int(1)]),
            }),
            ConditionSpec::new().and(Condition::cmp("a", "IS", 1)),
        ];
        for spec in &bad {
            let err = builder(Clause::Having).validate(spec).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::BadHavingParam, "{spec:?}");
        }
        assert!(builder(Clause::Where).validate(&ConditionSpec::new()).unwrap());
    }

    #[test]
    fn compile_into_continues_numbering() {
        let mut params = ParamList::new();
        params.push("x");
        let spec = ConditionSpec::new().and(Condition::eq("id", 5));
        let sql = builder(Clause::Where).compile_into(&spec, &mut params).unwrap();
        assert_eq!(sql, "id = $2");
    }

    #[test]
    fn parses_json_entries() {
        let spec = ConditionSpec::from_json(
            &json!([
                {"col": "age", "op": ">=", "val": 21},
                {"column": "id", "value": [1, 2]},
                {"or": [{"col": "a", "val": null, "op": "IS"}, {"raw": "b = ?", "params": ["x"]}]}
            ]),
            Clause::Where,
        )
        .unwrap();
        assert_eq!(spec.len(), 3);
        let (sql, params) = builder(Clause::Where).compile(&spec).unwrap();
        assert_eq!(sql, "age >= $1 AND id IN (1, 2) AND (a IS NULL OR (b = $2))");
        assert_eq!(params, vec![Value::Int(21), Value::from("x")]);
    }

    #[test]
    fn json_errors() {
        let err = ConditionSpec::from_json(&json!({"col": "a"}), Clause::Where).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadWhereParam);
        let err = ConditionSpec::from_json(&json!([{"col": "a"}]), Clause::Having).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadHavingParam);
        let err = ConditionSpec::from_json(&json!([{"val": 1}]), Clause::Where).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadWhereParam);
    }
}
