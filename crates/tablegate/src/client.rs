//! Execution gateway trait: the narrow seam between compiled statements and a
//! live database connection.

use crate::dialect::{Dialect, QuoteLiteral};
use crate::error::{ErrorKind, OrmError, OrmResult};
use crate::qb::CompiledStatement;
use crate::value::{Row, Value};

/// Executes compiled SQL against a database connection.
///
/// Implementations own connection management, timeouts and cancellation.
/// Errors they return are propagated by the core unchanged.
pub trait ExecutionGateway {
    /// SQL dialect spoken by the underlying connection.
    fn dialect(&self) -> Dialect;

    /// Execute a query and return all rows.
    fn query(&self, sql: &str, params: &[Value]) -> OrmResult<Vec<Row>>;

    /// Execute a command and return the affected row count.
    fn execute(&self, sql: &str, params: &[Value]) -> OrmResult<u64>;

    /// Value generated for the most recent INSERT on this connection.
    ///
    /// `sequence` is the dialect's sequence-name hint (Postgres only).
    /// `Ok(None)` means no key was generated.
    fn last_insert_id(&self, sequence: Option<&str>) -> OrmResult<Option<Value>>;

    /// Quote a string literal for inline SQL.
    ///
    /// The default defers to the dialect's quoting rules.
    fn quote_literal(&self, value: &str) -> String {
        self.dialect().quote_literal(value)
    }

    /// Execute a query and return the first row, if any.
    fn query_opt(&self, sql: &str, params: &[Value]) -> OrmResult<Option<Row>> {
        Ok(self.query(sql, params)?.into_iter().next())
    }

    /// Execute a compiled SELECT.
    fn query_statement(&self, stmt: &CompiledStatement) -> OrmResult<Vec<Row>> {
        self.query(&stmt.sql, &stmt.params)
    }

    /// Execute a compiled INSERT/UPDATE/DELETE.
    fn execute_statement(&self, stmt: &CompiledStatement) -> OrmResult<u64> {
        self.execute(&stmt.sql, &stmt.params)
    }
}

impl<G: ExecutionGateway + ?Sized> ExecutionGateway for &G {
    fn dialect(&self) -> Dialect {
        (**self).dialect()
    }

    fn query(&self, sql: &str, params: &[Value]) -> OrmResult<Vec<Row>> {
        (**self).query(sql, params)
    }

    fn execute(&self, sql: &str, params: &[Value]) -> OrmResult<u64> {
        (**self).execute(sql, params)
    }

    fn last_insert_id(&self, sequence: Option<&str>) -> OrmResult<Option<Value>> {
        (**self).last_insert_id(sequence)
    }

    fn quote_literal(&self, value: &str) -> String {
        (**self).quote_literal(value)
    }
}

/// Adapts a gateway to the [`QuoteLiteral`] seam used by condition compilation.
pub(crate) struct GatewayQuoter<'a, G: ?Sized>(pub(crate) &'a G);

impl<G: ExecutionGateway + ?Sized> QuoteLiteral for GatewayQuoter<'_, G> {
    fn quote_literal(&self, value: &str) -> String {
        self.0.quote_literal(value)
    }
}

/// Read a count out of the first column named `alias` in `rows`.
///
/// Drivers disagree on how `COUNT(*)` comes back, so integer, whole float and
/// numeric text are all accepted. No rows counts as zero.
pub(crate) fn read_count(rows: &[Row], alias: &str) -> OrmResult<u64> {
    let Some(row) = rows.first() else {
        return Ok(0);
    };
    let value = row.get(alias).ok_or_else(|| {
        OrmError::decode(alias, "count column missing from result row")
    })?;
    match value {
        Value::Null => Ok(0),
        other => other
            .as_i64()
            .and_then(|n| u64::try_from(n).ok())
            .ok_or_else(|| OrmError::decode(alias, format!("not a row count: {other:?}"))),
    }
}

/// Ensure a generated key is present and non-empty.
pub(crate) fn require_generated_key(
    key: Option<Value>,
    table: &str,
    primary_col: &str,
) -> OrmResult<Value> {
    match key {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(OrmError::new(
            ErrorKind::PrimaryKeyNotRetrievableAfterInsert,
            format!("no value generated for '{table}.{primary_col}'"),
        )),
    }
}
