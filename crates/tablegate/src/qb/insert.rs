//! INSERT query builder.

use crate::dialect::Dialect;
use crate::error::{ErrorKind, OrmError, OrmResult};
use crate::qb::param::ParamList;
use crate::qb::traits::CompiledStatement;
use crate::value::{ColumnValues, Value};

/// INSERT query builder. Every value is bound.
///
/// Building without any column fails with `EmptyPayload`; no row is ever
/// inserted from defaults alone.
#[derive(Clone, Debug)]
pub struct InsertQb {
    dialect: Dialect,
    table: String,
    columns: Vec<String>,
    values: Vec<Value>,
}

impl InsertQb {
    /// Create a new INSERT query builder.
    pub fn new(table: &str) -> Self {
        Self {
            dialect: Dialect::default(),
            table: table.to_string(),
            columns: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Render for the given dialect.
    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Set a column value.
    pub fn set(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.columns.push(column.to_string());
        self.values.push(value.into());
        self
    }

    /// Set every column of `row`, in order.
    pub fn set_all(mut self, row: &ColumnValues) -> Self {
        for (column, value) in row.iter() {
            self.columns.push(column.to_string());
            self.values.push(value.clone());
        }
        self
    }

    /// Column list, in bind order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Build the statement.
    pub fn build(&self) -> OrmResult<CompiledStatement> {
        if self.columns.is_empty() {
            return Err(OrmError::new(
                ErrorKind::EmptyPayload,
                format!("nothing to insert into '{}'", self.table),
            ));
        }

        let mut params = ParamList::new();
        let placeholders: Vec<String> = self
            .values
            .iter()
            .map(|v| params.push_placeholder(self.dialect, v.clone()))
            .collect();

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table,
            self.columns.join(", "),
            placeholders.join(", ")
        );
        Ok(CompiledStatement::new(sql, params))
    }
}
