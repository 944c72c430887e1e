//! SELECT query builder using the expression layer.

use crate::dialect::Dialect;
use crate::qb::expr::{Expr, ExprGroup};
use crate::qb::param::ParamList;
use crate::qb::traits::{CompiledStatement, SqlQb};
use std::fmt::Write;

/// SELECT query builder with expression-based WHERE/HAVING.
#[derive(Clone, Debug)]
pub struct SelectQb {
    dialect: Dialect,
    /// Table or FROM expression
    from_expr: String,
    distinct: bool,
    /// SELECT columns (default ["*"])
    select_cols: Vec<String>,
    where_group: ExprGroup,
    group_clauses: Vec<String>,
    having_group: ExprGroup,
    order_clauses: Vec<String>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl SelectQb {
    /// Create a new SELECT query builder for a table.
    pub fn new(table: &str) -> Self {
        Self {
            dialect: Dialect::default(),
            from_expr: table.to_string(),
            distinct: false,
            select_cols: vec!["*".to_string()],
            where_group: ExprGroup::new(),
            group_clauses: Vec::new(),
            having_group: ExprGroup::new(),
            order_clauses: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// Render for the given dialect.
    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn distinct(mut self, distinct: bool) -> Self {
        self.distinct = distinct;
        self
    }

    // ==================== SELECT columns ====================

    /// Set SELECT columns. An empty list keeps the `*` default.
    pub fn select_cols<S: AsRef<str>>(mut self, cols: &[S]) -> Self {
        if !cols.is_empty() {
            self.select_cols = cols.iter().map(|s| s.as_ref().to_string()).collect();
        }
        self
    }

    /// The SELECT column list.
    pub fn columns(&self) -> &[String] {
        &self.select_cols
    }

    // ==================== WHERE / HAVING ====================

    /// Add a WHERE expression (AND-ed with existing ones).
    pub fn and_where(mut self, expr: Expr) -> Self {
        self.where_group.and_expr(expr);
        self
    }

    /// Add a HAVING expression (AND-ed with existing ones).
    pub fn and_having(mut self, expr: Expr) -> Self {
        self.having_group.and_expr(expr);
        self
    }

    // ==================== Ordering & Grouping ====================

    /// Add GROUP BY clauses.
    pub fn group_by<S: AsRef<str>>(mut self, clauses: &[S]) -> Self {
        self.group_clauses
            .extend(clauses.iter().map(|s| s.as_ref().to_string()));
        self
    }

    /// Add ORDER BY clauses.
    pub fn order_by<S: AsRef<str>>(mut self, clauses: &[S]) -> Self {
        self.order_clauses
            .extend(clauses.iter().map(|s| s.as_ref().to_string()));
        self
    }

    // ==================== Pagination ====================

    pub fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    pub fn offset(mut self, n: u64) -> Self {
        self.offset = Some(n);
        self
    }

    pub fn limit_value(&self) -> Option<u64> {
        self.limit
    }

    pub fn offset_value(&self) -> Option<u64> {
        self.offset
    }

    // ==================== Build helpers ====================

    fn build_select_sql(&self, count_alias: Option<&str>) -> (String, ParamList) {
        let mut params = ParamList::new();
        let mut sql = String::from("SELECT ");

        match count_alias {
            Some(alias) => {
                let _ = write!(sql, "COUNT(*) AS {alias}");
            }
            None => {
                if self.distinct {
                    sql.push_str("DISTINCT ");
                }
                if self.dialect.uses_top(self.limit, self.offset) {
                    let _ = write!(sql, "TOP {} ", self.limit.unwrap_or(0));
                }
                sql.push_str(&self.select_cols.join(", "));
            }
        }

        sql.push_str(" FROM ");
        sql.push_str(&self.from_expr);

        // WHERE
        if !self.where_group.is_empty() {
            let where_sql = self.where_group.build_into(self.dialect, &mut params);
            if !where_sql.is_empty() {
                sql.push_str(" WHERE ");
                sql.push_str(&where_sql);
            }
        }

        if count_alias.is_some() {
            return (sql, params);
        }

        if !self.group_clauses.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&self.group_clauses.join(", "));
        }

        // HAVING
        if !self.having_group.is_empty() {
            let having_sql = self.having_group.build_into(self.dialect, &mut params);
            if !having_sql.is_empty() {
                sql.push_str(" HAVING ");
                sql.push_str(&having_sql);
            }
        }

        if !self.order_clauses.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.order_clauses.join(", "));
        }

        self.dialect.write_limit(
            &mut sql,
            self.limit,
            self.offset,
            !self.order_clauses.is_empty(),
        );

        (sql, params)
    }

    /// Build `SELECT COUNT(*) AS alias FROM ... WHERE ...`.
    ///
    /// Grouping, ordering and paging are ignored; only the WHERE clause
    /// decides which rows are counted.
    pub fn build_count(&self, alias: &str) -> CompiledStatement {
        let (sql, params) = self.build_select_sql(Some(alias));
        CompiledStatement::new(sql, params)
    }
}

impl SqlQb for SelectQb {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn build(&self) -> CompiledStatement {
        let (sql, params) = self.build_select_sql(None);
        CompiledStatement::new(sql, params)
    }
}
