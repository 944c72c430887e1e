//! Compiles [`QueryParameters`] into a SELECT statement.

use crate::condition::{Clause, ConditionBuilder};
use crate::dialect::{Dialect, QuoteLiteral};
use crate::error::{ErrorKind, OrmError, OrmResult};
use crate::params::{ParamKey, QueryParameters};
use crate::qb::{self, CompiledStatement, SelectQb, SqlQb};

/// Assembles SELECT statements from fetch parameters.
///
/// Filters are delegated to [`ConditionBuilder`]; WHERE values are bound
/// before HAVING values. `group`, `order` and `cols` entries are passed
/// through as written.
pub struct QueryParameterCompiler<'a> {
    dialect: Dialect,
    quoter: &'a dyn QuoteLiteral,
}

impl<'a> QueryParameterCompiler<'a> {
    pub fn new(dialect: Dialect, quoter: &'a dyn QuoteLiteral) -> Self {
        Self { dialect, quoter }
    }

    /// Build the SELECT for `table`, skipping every key in `disallowed`.
    pub fn select(
        &self,
        params: &QueryParameters,
        disallowed: &[ParamKey],
        table: &str,
    ) -> OrmResult<SelectQb> {
        if table.trim().is_empty() {
            return Err(OrmError::new(
                ErrorKind::TableNameNotConfigured,
                "cannot compile a SELECT without a table name",
            ));
        }

        let allowed = |key: ParamKey| {
            if !disallowed.contains(&key) {
                return true;
            }
            if params.has(key) {
                tracing::trace!(target: "tablegate", key = %key, "ignoring disallowed fetch param");
            }
            false
        };

        let mut select = qb::select(table).dialect(self.dialect);

        if allowed(ParamKey::Distinct) {
            select = select.distinct(params.distinct.unwrap_or(false));
        }
        if allowed(ParamKey::Cols) {
            if let Some(cols) = &params.cols {
                select = select.select_cols(cols);
            }
        }
        if allowed(ParamKey::Where) {
            if let Some(spec) = &params.r#where {
                let builder = ConditionBuilder::new(self.dialect, self.quoter, Clause::Where);
                select = select.and_where(builder.to_expr(spec)?);
            }
        }
        if allowed(ParamKey::Group) {
            if let Some(group) = &params.group {
                select = select.group_by(group);
            }
        }
        if allowed(ParamKey::Having) {
            if let Some(spec) = &params.having {
                let builder = ConditionBuilder::new(self.dialect, self.quoter, Clause::Having);
                select = select.and_having(builder.to_expr(spec)?);
            }
        }
        if allowed(ParamKey::Order) {
            if let Some(order) = &params.order {
                select = select.order_by(order);
            }
        }
        if allowed(ParamKey::LimitSize) {
            if let Some(n) = params.limit_size {
                select = select.limit(n);
            }
        }
        if allowed(ParamKey::LimitOffset) {
            if let Some(n) = params.limit_offset {
                select = select.offset(n);
            }
        }

        Ok(select)
    }

    /// Compile straight to SQL text and bound values.
    pub fn compile(
        &self,
        params: &QueryParameters,
        disallowed: &[ParamKey],
        table: &str,
    ) -> OrmResult<CompiledStatement> {
        self.select(params, disallowed, table).map(|qb| qb.build())
    }

    /// Parse the untyped dictionary form and compile it.
    ///
    /// Disallowed keys are dropped before parsing, so a malformed value under
    /// one of them is never reported.
    pub fn compile_json(
        &self,
        params: &serde_json::Value,
        disallowed: &[ParamKey],
        table: &str,
    ) -> OrmResult<CompiledStatement> {
        let params = QueryParameters::from_json_filtered(params, disallowed)?;
        self.compile(&params, disallowed, table)
    }
}
