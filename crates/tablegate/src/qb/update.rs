//! UPDATE query builder using the expression layer.

use crate::dialect::Dialect;
use crate::error::{ErrorKind, OrmError, OrmResult};
use crate::qb::expr::{Expr, ExprGroup};
use crate::qb::param::ParamList;
use crate::qb::traits::CompiledStatement;
use crate::value::{ColumnValues, Value};

/// UPDATE query builder with expression-based WHERE.
///
/// Without a WHERE expression the statement updates every row. Building
/// without any SET field fails with `EmptyPayload`.
#[derive(Clone, Debug)]
pub struct UpdateQb {
    dialect: Dialect,
    table: String,
    set_fields: Vec<(String, Value)>,
    where_group: ExprGroup,
}

impl UpdateQb {
    /// Create a new UPDATE query builder.
    pub fn new(table: &str) -> Self {
        Self {
            dialect: Dialect::default(),
            table: table.to_string(),
            set_fields: Vec::new(),
            where_group: ExprGroup::new(),
        }
    }

    /// Render for the given dialect.
    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Set a column value.
    pub fn set(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.set_fields.push((column.to_string(), value.into()));
        self
    }

    /// Set every column of `row`, in order.
    pub fn set_all(mut self, row: &ColumnValues) -> Self {
        for (column, value) in row.iter() {
            self.set_fields.push((column.to_string(), value.clone()));
        }
        self
    }

    /// Add a WHERE expression (AND-ed with existing ones).
    pub fn and_where(mut self, expr: Expr) -> Self {
        self.where_group.and_expr(expr);
        self
    }

    /// Build the statement.
    pub fn build(&self) -> OrmResult<CompiledStatement> {
        if self.set_fields.is_empty() {
            return Err(OrmError::new(
                ErrorKind::EmptyPayload,
                format!("nothing to update in '{}'", self.table),
            ));
        }

        let mut params = ParamList::new();

        // SET values are numbered before WHERE values
        let set_parts: Vec<String> = self
            .set_fields
            .iter()
            .map(|(col, value)| {
                let ph = params.push_placeholder(self.dialect, value.clone());
                format!("{col} = {ph}")
            })
            .collect();

        let mut sql = format!("UPDATE {} SET {}", self.table, set_parts.join(", "));

        if !self.where_group.is_empty() {
            let where_sql = self.where_group.build_into(self.dialect, &mut params);
            if !where_sql.is_empty() {
                sql.push_str(" WHERE ");
                sql.push_str(&where_sql);
            }
        }

        Ok(CompiledStatement::new(sql, params))
    }
}
