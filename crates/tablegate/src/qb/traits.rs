//! Shared query-builder trait and the compiled statement type.

use crate::dialect::Dialect;
use crate::qb::param::ParamList;
use crate::value::{BindKind, Value};

/// Base trait for all query builders.
pub trait SqlQb {
    /// Dialect the builder renders for.
    fn dialect(&self) -> Dialect;

    /// Build the SQL string and its bound values.
    fn build(&self) -> CompiledStatement;

    /// Debug helper to get the SQL string.
    fn to_sql(&self) -> String {
        self.build().sql
    }
}

/// SQL text paired with its bound values, ready for the execution gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledStatement {
    pub sql: String,
    pub params: Vec<Value>,
}

impl CompiledStatement {
    /// Create a new compiled statement.
    pub fn new(sql: impl Into<String>, params: ParamList) -> Self {
        Self {
            sql: sql.into(),
            params: params.into_vec(),
        }
    }

    /// Bind kind of each value, in placeholder order.
    pub fn bind_kinds(&self) -> Vec<BindKind> {
        self.params.iter().map(Value::bind_kind).collect()
    }
}
