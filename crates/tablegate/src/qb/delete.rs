//! DELETE query builder using the expression layer.

use crate::dialect::Dialect;
use crate::qb::expr::{Expr, ExprGroup};
use crate::qb::param::ParamList;
use crate::qb::traits::{CompiledStatement, SqlQb};

/// DELETE query builder with expression-based WHERE.
///
/// Without a WHERE expression the statement deletes every row.
#[derive(Clone, Debug)]
pub struct DeleteQb {
    dialect: Dialect,
    table: String,
    where_group: ExprGroup,
}

impl DeleteQb {
    /// Create a new DELETE query builder.
    pub fn new(table: &str) -> Self {
        Self {
            dialect: Dialect::default(),
            table: table.to_string(),
            where_group: ExprGroup::new(),
        }
    }

    /// Render for the given dialect.
    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Add a WHERE expression (AND-ed with existing ones).
    pub fn and_where(mut self, expr: Expr) -> Self {
        self.where_group.and_expr(expr);
        self
    }

    fn build_delete(&self) -> (String, ParamList) {
        let mut params = ParamList::new();
        let mut sql = format!("DELETE FROM {}", self.table);
        if !self.where_group.is_empty() {
            let where_sql = self.where_group.build_into(self.dialect, &mut params);
            if !where_sql.is_empty() {
                sql.push_str(" WHERE ");
                sql.push_str(&where_sql);
            }
        }
        (sql, params)
    }
}

impl SqlQb for DeleteQb {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn build(&self) -> CompiledStatement {
        let (sql, params) = self.build_delete();
        CompiledStatement::new(sql, params)
    }
}
