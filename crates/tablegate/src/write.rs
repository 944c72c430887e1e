//! Schema-aware INSERT/UPDATE/DELETE with timestamp injection and the
//! count-then-mutate protocol.
//!
//! # Count-then-mutate
//!
//! `update_matching` and `delete_matching` first run
//! `SELECT COUNT(*) AS num_of_matched_records` with the same WHERE clause the
//! mutating statement will use, and only send the UPDATE/DELETE when that
//! count is non-zero. The two statements are separate round trips and are
//! not wrapped in a transaction: a concurrent writer can change the matched
//! rows between them. Callers that need the two to agree must run them
//! inside a transaction owned by the gateway.

use crate::client::{read_count, require_generated_key, ExecutionGateway, GatewayQuoter};
use crate::condition::{Clause, CondValue, Condition, ConditionBuilder, ConditionSpec};
use crate::error::{ErrorKind, OrmError, OrmResult};
use crate::qb::{self, Expr, SqlQb};
use crate::schema::TableSchema;
use crate::value::{ColumnValues, Value};

/// Alias of the COUNT column in the pre-check query.
pub const COUNT_ALIAS: &str = "num_of_matched_records";

/// Timestamp format written into created/updated columns.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Result of a write.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOutcome {
    /// Insert succeeded; the written payload plus the generated primary key.
    Inserted(ColumnValues),
    /// Update/delete was sent.
    Executed { affected: u64 },
    /// The COUNT pre-check matched nothing; no mutating statement was sent.
    NoMatchingRows,
}

impl WriteOutcome {
    pub fn is_no_matching_rows(&self) -> bool {
        matches!(self, WriteOutcome::NoMatchingRows)
    }

    /// Affected row count for an executed update/delete.
    pub fn affected(&self) -> Option<u64> {
        match self {
            WriteOutcome::Executed { affected } => Some(*affected),
            _ => None,
        }
    }

    /// Row written by an insert.
    pub fn inserted(&self) -> Option<&ColumnValues> {
        match self {
            WriteOutcome::Inserted(row) => Some(row),
            _ => None,
        }
    }

    /// Consume and return the row written by an insert.
    pub fn into_inserted(self) -> Option<ColumnValues> {
        match self {
            WriteOutcome::Inserted(row) => Some(row),
            _ => None,
        }
    }
}

/// Column → value criteria identifying the rows to update or delete.
///
/// Scalars compile to `col = ?` with the value bound; lists compile to an
/// inline `col IN (...)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchCriteria {
    entries: Vec<(String, CondValue)>,
}

impl MatchCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Match rows where `column = value`.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(column.into(), CondValue::Scalar(value.into()));
        self
    }

    /// Match rows where `column IN (values...)`.
    pub fn with_list(mut self, column: impl Into<String>, values: Vec<Value>) -> Self {
        self.set(column.into(), CondValue::List(values));
        self
    }

    fn set(&mut self, column: String, value: CondValue) {
        match self.entries.iter_mut().find(|(c, _)| *c == column) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((column, value)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Equivalent condition spec (all entries AND-ed).
    pub fn to_condition_spec(&self) -> ConditionSpec {
        self.entries
            .iter()
            .map(|(column, value)| Condition::Compare {
                column: column.clone(),
                op: None,
                value: value.clone(),
            })
            .collect()
    }

    /// Parse a JSON object whose values are scalars or lists of scalars.
    pub fn from_json(json: &serde_json::Value) -> OrmResult<Self> {
        let bad = |detail: String| OrmError::new(ErrorKind::BadWhereParam, detail);
        let obj = json
            .as_object()
            .ok_or_else(|| bad(format!("match criteria must be an object, got {json}")))?;
        let mut criteria = MatchCriteria::new();
        for (column, value) in obj {
            let value = match value {
                serde_json::Value::Array(items) => CondValue::List(
                    items
                        .iter()
                        .map(|v| {
                            Value::from_json(v)
                                .ok_or_else(|| bad(format!("list for '{column}' must hold scalars")))
                        })
                        .collect::<OrmResult<_>>()?,
                ),
                other => CondValue::Scalar(
                    Value::from_json(other)
                        .ok_or_else(|| bad(format!("value for '{column}' must be a scalar")))?,
                ),
            };
            criteria.set(column.clone(), value);
        }
        Ok(criteria)
    }
}

impl From<ColumnValues> for MatchCriteria {
    fn from(values: ColumnValues) -> Self {
        let mut criteria = MatchCriteria::new();
        for (column, value) in values {
            criteria.set(column, CondValue::Scalar(value));
        }
        criteria
    }
}

/// Builds and runs INSERT/UPDATE/DELETE statements for one table.
pub struct WriteCommandBuilder<'a, G: ExecutionGateway + ?Sized> {
    gateway: &'a G,
    schema: &'a TableSchema,
    created_at: Option<&'a str>,
    updated_at: Option<&'a str>,
    timestamp: Option<String>,
}

impl<'a, G: ExecutionGateway + ?Sized> WriteCommandBuilder<'a, G> {
    pub fn new(gateway: &'a G, schema: &'a TableSchema) -> Self {
        Self {
            gateway,
            schema,
            created_at: None,
            updated_at: None,
            timestamp: None,
        }
    }

    /// Column stamped with the current time on insert.
    pub fn created_at(mut self, column: Option<&'a str>) -> Self {
        self.created_at = column.filter(|c| !c.is_empty());
        self
    }

    /// Column stamped with the current time on insert and update.
    pub fn updated_at(mut self, column: Option<&'a str>) -> Self {
        self.updated_at = column.filter(|c| !c.is_empty());
        self
    }

    /// Use a fixed timestamp instead of the local clock.
    pub fn timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    fn now(&self) -> String {
        match &self.timestamp {
            Some(ts) => ts.clone(),
            None => chrono::Local::now().format(TIMESTAMP_FORMAT).to_string(),
        }
    }

    fn stamp(&self, payload: &mut ColumnValues, column: Option<&str>) {
        if let Some(col) = column.filter(|c| self.schema.has_column(c)) {
            payload.set(col, self.now());
        }
    }

    fn drop_unknown_columns(&self, payload: &mut ColumnValues) {
        let schema = self.schema;
        payload.retain(|column, _| {
            let known = schema.has_column(column);
            if !known {
                tracing::debug!(
                    target: "tablegate",
                    table = schema.name(),
                    column,
                    "dropping payload column not in table"
                );
            }
            known
        });
    }

    /// Apply timestamps and schema filtering to an insert payload.
    ///
    /// Created and updated columns (when configured and present in the
    /// table) are overwritten with the current time. Columns not in the
    /// table are dropped, as are autoincrement columns with an empty value.
    pub fn prepare_insert(&self, payload: &ColumnValues) -> ColumnValues {
        let mut payload = payload.clone();
        self.stamp(&mut payload, self.created_at);
        self.stamp(&mut payload, self.updated_at);
        self.drop_unknown_columns(&mut payload);

        let schema = self.schema;
        payload.retain(|column, value| {
            let generated = schema.is_autoincrement(column) && value.is_empty();
            if generated {
                tracing::debug!(
                    target: "tablegate",
                    table = schema.name(),
                    column,
                    "removing empty autoincrement column"
                );
            }
            !generated
        });
        payload
    }

    /// Apply the updated timestamp and schema filtering to an update payload.
    pub fn prepare_update(&self, payload: &ColumnValues) -> ColumnValues {
        let mut payload = payload.clone();
        self.stamp(&mut payload, self.updated_at);
        self.drop_unknown_columns(&mut payload);
        payload
    }

    fn where_expr(&self, criteria: &MatchCriteria) -> OrmResult<Expr> {
        let quoter = GatewayQuoter(self.gateway);
        ConditionBuilder::new(self.gateway.dialect(), &quoter, Clause::Where)
            .to_expr(&criteria.to_condition_spec())
    }

    fn count_matching(&self, filter: &Expr) -> OrmResult<u64> {
        let stmt = qb::select(self.schema.name())
            .dialect(self.gateway.dialect())
            .and_where(filter.clone())
            .build_count(COUNT_ALIAS);
        let rows = self.gateway.query_statement(&stmt)?;
        read_count(&rows, COUNT_ALIAS)
    }

    /// Insert a row and read back its generated primary key.
    pub fn insert(&self, payload: &ColumnValues) -> OrmResult<WriteOutcome> {
        if payload.is_empty() {
            return Err(OrmError::new(
                ErrorKind::EmptyPayload,
                format!("nothing to insert into '{}'", self.schema.name()),
            ));
        }

        // unknown columns are dropped here, so the builder rejects an empty row
        let mut row = self.prepare_insert(payload);
        let dialect = self.gateway.dialect();
        let stmt = qb::insert(self.schema.name())
            .dialect(dialect)
            .set_all(&row)
            .build()?;
        self.gateway.execute_statement(&stmt)?;

        let pk = self.schema.primary_key();
        let sequence = dialect.last_insert_id_name(self.schema.name(), pk);
        let key = self.gateway.last_insert_id(sequence.as_deref())?;
        let key = require_generated_key(key, self.schema.name(), pk)?;
        row.set(pk, key);
        Ok(WriteOutcome::Inserted(row))
    }

    /// Update every row matching `criteria`, after a COUNT pre-check.
    ///
    /// Empty criteria match every row.
    pub fn update_matching(
        &self,
        payload: &ColumnValues,
        criteria: &MatchCriteria,
    ) -> OrmResult<WriteOutcome> {
        if payload.is_empty() {
            return Err(OrmError::new(
                ErrorKind::EmptyPayload,
                format!("nothing to update in '{}'", self.schema.name()),
            ));
        }

        let row = self.prepare_update(payload);
        let filter = self.where_expr(criteria)?;
        // built before the count so a payload of unknown columns sends nothing
        let stmt = qb::update(self.schema.name())
            .dialect(self.gateway.dialect())
            .set_all(&row)
            .and_where(filter.clone())
            .build()?;

        if self.count_matching(&filter)? == 0 {
            tracing::debug!(target: "tablegate", table = self.schema.name(), "update matched no rows");
            return Ok(WriteOutcome::NoMatchingRows);
        }

        let affected = self.gateway.execute_statement(&stmt)?;
        Ok(WriteOutcome::Executed { affected })
    }

    /// Delete every row matching `criteria`, after a COUNT pre-check.
    ///
    /// Empty criteria delete nothing and send no statement.
    pub fn delete_matching(&self, criteria: &MatchCriteria) -> OrmResult<WriteOutcome> {
        if criteria.is_empty() {
            tracing::debug!(target: "tablegate", table = self.schema.name(), "delete without criteria skipped");
            return Ok(WriteOutcome::NoMatchingRows);
        }

        let filter = self.where_expr(criteria)?;
        if self.count_matching(&filter)? == 0 {
            tracing::debug!(target: "tablegate", table = self.schema.name(), "delete matched no rows");
            return Ok(WriteOutcome::NoMatchingRows);
        }

        let stmt = qb::delete(self.schema.name())
            .dialect(self.gateway.dialect())
            .and_where(filter)
            .build();
        let affected = self.gateway.execute_statement(&stmt)?;
        Ok(WriteOutcome::Executed { affected })
    }
}
