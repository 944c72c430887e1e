use super::truncate_sql_bytes;
use super::types::QueryType;
use crate::client::ExecutionGateway;
use crate::dialect::Dialect;
use crate::error::OrmResult;
use crate::value::{Row, Value};
use std::time::Instant;
use tracing::Level;

/// Dispatch a tracing event at a runtime-determined level.
macro_rules! emit_at_level {
    ($level:expr, $($field:tt)*) => {
        match $level {
            Level::ERROR => tracing::error!($($field)*),
            Level::WARN  => tracing::warn!($($field)*),
            Level::INFO  => tracing::info!($($field)*),
            Level::DEBUG => tracing::debug!($($field)*),
            Level::TRACE => tracing::trace!($($field)*),
        }
    };
}

/// An [`ExecutionGateway`] wrapper that emits every statement as a `tracing`
/// event under the `tablegate.sql` target.
///
/// The SQL is logged before execution; a second event carries the elapsed
/// time and the row or affected count. Failures are logged at `WARN`
/// regardless of the configured level.
#[derive(Debug, Clone)]
pub struct TracingGateway<G> {
    inner: G,
    /// Tracing event level to emit at.
    level: Level,
    /// Truncate long SQL strings (in bytes). `None` means no truncation.
    max_sql_length: Option<usize>,
}

impl<G: ExecutionGateway> TracingGateway<G> {
    /// Wrap `inner` with defaults (DEBUG, SQL truncated to 200 bytes).
    pub fn new(inner: G) -> Self {
        Self {
            inner,
            level: Level::DEBUG,
            max_sql_length: Some(200),
        }
    }

    /// Override the tracing event level.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set maximum SQL length to display.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    pub fn inner(&self) -> &G {
        &self.inner
    }

    pub fn into_inner(self) -> G {
        self.inner
    }

    fn truncate_sql(&self, sql: &str) -> String {
        match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)),
            _ => sql.to_string(),
        }
    }

    fn run<T>(
        &self,
        sql: &str,
        params: &[Value],
        exec: impl FnOnce() -> OrmResult<T>,
        count: impl Fn(&T) -> usize,
    ) -> OrmResult<T> {
        let query_type = QueryType::from_sql(sql);
        let shown = self.truncate_sql(sql);
        emit_at_level!(
            self.level,
            target: "tablegate.sql",
            query_type = ?query_type,
            param_count = params.len(),
            sql = %shown,
            "executing statement"
        );

        let start = Instant::now();
        let result = exec();
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

        match &result {
            Ok(value) => emit_at_level!(
                self.level,
                target: "tablegate.sql",
                query_type = ?query_type,
                elapsed_ms,
                rows = count(value),
                "statement finished"
            ),
            Err(err) => tracing::warn!(
                target: "tablegate.sql",
                query_type = ?query_type,
                elapsed_ms,
                error = %err,
                sql = %shown,
                "statement failed"
            ),
        }
        result
    }
}

impl<G: ExecutionGateway> ExecutionGateway for TracingGateway<G> {
    fn dialect(&self) -> Dialect {
        self.inner.dialect()
    }

    fn query(&self, sql: &str, params: &[Value]) -> OrmResult<Vec<Row>> {
        self.run(sql, params, || self.inner.query(sql, params), Vec::len)
    }

    fn execute(&self, sql: &str, params: &[Value]) -> OrmResult<u64> {
        self.run(
            sql,
            params,
            || self.inner.execute(sql, params),
            |n| usize::try_from(*n).unwrap_or(usize::MAX),
        )
    }

    fn last_insert_id(&self, sequence: Option<&str>) -> OrmResult<Option<Value>> {
        let id = self.inner.last_insert_id(sequence)?;
        emit_at_level!(
            self.level,
            target: "tablegate.sql",
            sequence = sequence.unwrap_or("-"),
            id = ?id,
            "read generated key"
        );
        Ok(id)
    }

    fn quote_literal(&self, value: &str) -> String {
        self.inner.quote_literal(value)
    }
}
