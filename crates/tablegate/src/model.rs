//! Table-bound facade combining the compiler, the write path and the gateway.

use crate::client::{ExecutionGateway, GatewayQuoter};
use crate::compiler::QueryParameterCompiler;
use crate::config::ModelConfig;
use crate::error::{ErrorKind, OrmError, OrmResult};
use crate::params::{ParamKey, QueryParameters};
use crate::qb::SqlQb;
use crate::record::{FromRow, Record, RecordLike};
use crate::schema::{SchemaCatalog, TableSchema};
use crate::value::{ColumnValues, Row, Value};
use crate::write::{MatchCriteria, WriteCommandBuilder, WriteOutcome};

/// Keys a single-row fetch never takes from the caller.
const SINGLE_ROW_DISALLOWED: &[ParamKey] = &[ParamKey::LimitSize, ParamKey::LimitOffset];

/// Data access for one table.
///
/// The table schema is loaded once, at construction, and never refreshed.
/// Every operation is synchronous and issues at most two statements.
///
/// # Example
///
/// ```ignore
/// use tablegate::{Model, ModelConfig, QueryParameters, ColumnValues};
///
/// let config = ModelConfig::new("authors", "author_id")
///     .created_timestamp_column("date_created")
///     .updated_timestamp_column("m_timestamp");
/// let model = Model::new(config, &catalog, gateway)?;
///
/// let inserted = model.insert(&ColumnValues::new().with("name", "Ann"))?;
/// let names = model.fetch_col(&QueryParameters::new().cols(["name"]).order(["name"]))?;
/// ```
pub struct Model<G: ExecutionGateway> {
    config: ModelConfig,
    schema: TableSchema,
    gateway: G,
}

impl<G: ExecutionGateway> Model<G> {
    /// Build a model, loading column metadata from `catalog` unless the
    /// configuration already carries it.
    ///
    /// Fails with `PrimaryColumnNotConfigured` or `TableNameNotConfigured`
    /// before the catalog is consulted.
    pub fn new<C>(config: ModelConfig, catalog: &C, gateway: G) -> OrmResult<Self>
    where
        C: SchemaCatalog + ?Sized,
    {
        config.validate()?;

        let columns = match config.preloaded_table_cols() {
            Some(columns) => columns.to_vec(),
            None => catalog.fetch_table_columns(config.table_name())?,
        };
        let schema = TableSchema::new(config.table_name(), columns, config.primary_col())?;

        tracing::debug!(
            target: "tablegate",
            table = schema.name(),
            primary_key = schema.primary_key(),
            columns = schema.columns().len(),
            "model ready"
        );

        Ok(Self {
            config,
            schema,
            gateway,
        })
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Column names of the table, in catalog order.
    pub fn table_cols(&self) -> Vec<&str> {
        self.schema.column_names()
    }

    /// Wrap `data` in a record that belongs to this table.
    pub fn create_record(&self, data: ColumnValues, is_new: bool) -> Record {
        Record::new(data, is_new)
    }

    // ==================== Fetching ====================

    fn select_rows(
        &self,
        params: &QueryParameters,
        disallowed: &[ParamKey],
        forced_limit: Option<u64>,
    ) -> OrmResult<Vec<Row>> {
        let quoter = GatewayQuoter(&self.gateway);
        let compiler = QueryParameterCompiler::new(self.gateway.dialect(), &quoter);
        let mut select = compiler.select(params, disallowed, self.schema.name())?;
        if let Some(n) = forced_limit {
            select = select.limit(n);
        }
        self.gateway.query_statement(&select.build())
    }

    /// All matching rows as column maps.
    pub fn fetch_rows(&self, params: &QueryParameters) -> OrmResult<Vec<Row>> {
        self.select_rows(params, &[], None)
    }

    /// All matching rows mapped through `T`.
    pub fn fetch_all<T: FromRow>(&self, params: &QueryParameters) -> OrmResult<Vec<T>> {
        self.fetch_rows(params)?.iter().map(T::from_row).collect()
    }

    /// The first matching row, if any.
    ///
    /// Caller-supplied `limit_size`/`limit_offset` are ignored; the query
    /// always uses `LIMIT 1`.
    pub fn fetch_one<T: FromRow>(&self, params: &QueryParameters) -> OrmResult<Option<T>> {
        let rows = self.select_rows(params, SINGLE_ROW_DISALLOWED, Some(1))?;
        rows.first().map(T::from_row).transpose()
    }

    /// Values of the first listed column, one per matching row.
    ///
    /// Fails with `BadFetchParams` if `cols` is missing or empty.
    pub fn fetch_col(&self, params: &QueryParameters) -> OrmResult<Vec<Value>> {
        let params = with_leading_cols(params, 1, "fetch_col")?;
        let rows = self.select_rows(&params, &[], None)?;
        rows.iter().map(|row| nth_value(row, 0)).collect()
    }

    /// Key/value pairs from the first two listed columns.
    ///
    /// Keys are compared by their text form; a later row with the same key
    /// overwrites the earlier value but keeps its position. Fails with
    /// `BadFetchParams` unless `cols` names at least two columns.
    pub fn fetch_pairs(&self, params: &QueryParameters) -> OrmResult<ColumnValues> {
        let params = with_leading_cols(params, 2, "fetch_pairs")?;
        let rows = self.select_rows(&params, &[], None)?;
        let mut pairs = ColumnValues::new();
        for row in &rows {
            let key = nth_value(row, 0)?;
            let value = nth_value(row, 1)?;
            pairs.set(key.key_text(), value);
        }
        Ok(pairs)
    }

    /// The first listed column of the first matching row.
    ///
    /// Caller-supplied limits are ignored. Fails with `BadFetchParams` if
    /// `cols` is missing or empty.
    pub fn fetch_value(&self, params: &QueryParameters) -> OrmResult<Option<Value>> {
        let params = with_leading_cols(params, 1, "fetch_value")?;
        let rows = self.select_rows(&params, SINGLE_ROW_DISALLOWED, Some(1))?;
        rows.first().map(|row| nth_value(row, 0)).transpose()
    }

    // ==================== Writing ====================

    fn writer(&self) -> WriteCommandBuilder<'_, G> {
        WriteCommandBuilder::new(&self.gateway, &self.schema)
            .created_at(self.config.created_timestamp_column_name())
            .updated_at(self.config.updated_timestamp_column_name())
    }

    /// Insert a row; see [`WriteCommandBuilder::insert`].
    pub fn insert(&self, payload: &ColumnValues) -> OrmResult<WriteOutcome> {
        self.writer().insert(payload)
    }

    /// Update matching rows; see [`WriteCommandBuilder::update_matching`].
    pub fn update_matching(
        &self,
        payload: &ColumnValues,
        criteria: &MatchCriteria,
    ) -> OrmResult<WriteOutcome> {
        self.writer().update_matching(payload, criteria)
    }

    /// Delete matching rows; see [`WriteCommandBuilder::delete_matching`].
    pub fn delete_matching(&self, criteria: &MatchCriteria) -> OrmResult<WriteOutcome> {
        self.writer().delete_matching(criteria)
    }

    fn record_criteria<R: RecordLike + ?Sized>(&self, record: &R) -> MatchCriteria {
        let pk = self.schema.primary_key();
        let value = record.primary_value(pk).cloned().unwrap_or(Value::Null);
        MatchCriteria::new().with(pk, value)
    }

    /// Save a record's data to the row with its primary key.
    ///
    /// A record without data is a no-op reported as `NoMatchingRows`.
    pub fn update_record<R: RecordLike + ?Sized>(&self, record: &R) -> OrmResult<WriteOutcome> {
        if record.data().is_empty() {
            return Ok(WriteOutcome::NoMatchingRows);
        }
        self.update_matching(record.data(), &self.record_criteria(record))
    }

    /// Delete the row with the record's primary key.
    ///
    /// When a row was actually removed the record is marked new.
    pub fn delete_record<R: RecordLike + ?Sized>(&self, record: &mut R) -> OrmResult<WriteOutcome> {
        if record.data().is_empty() {
            return Ok(WriteOutcome::NoMatchingRows);
        }
        let outcome = self.delete_matching(&self.record_criteria(record))?;
        if outcome.affected().is_some_and(|n| n > 0) {
            record.set_state_to_new();
        }
        Ok(outcome)
    }
}

/// Copy `params` keeping only the first `needed` columns, or fail if fewer
/// are listed.
fn with_leading_cols(
    params: &QueryParameters,
    needed: usize,
    op: &str,
) -> OrmResult<QueryParameters> {
    let cols = params.cols.as_deref().unwrap_or_default();
    if cols.len() < needed {
        return Err(OrmError::new(
            ErrorKind::BadFetchParams,
            format!("{op} needs at least {needed} column(s) in 'cols', got {}", cols.len()),
        ));
    }
    let mut params = params.clone();
    params.cols = Some(cols[..needed].to_vec());
    Ok(params)
}

/// Value at position `idx` of a row.
fn nth_value(row: &Row, idx: usize) -> OrmResult<Value> {
    row.iter()
        .nth(idx)
        .map(|(_, v)| v.clone())
        .ok_or_else(|| OrmError::decode(format!("#{idx}"), "result row has too few columns"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_cols_precondition() {
        let err = with_leading_cols(&QueryParameters::new(), 1, "fetch_col").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadFetchParams);
        let err =
            with_leading_cols(&QueryParameters::new().cols(["id"]), 2, "fetch_pairs").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadFetchParams);
        let params =
            with_leading_cols(&QueryParameters::new().cols(["a", "b", "c"]), 2, "fetch_pairs")
                .unwrap();
        assert_eq!(params.cols, Some(vec!["a".to_string(), "b".to_string()]));
    }

    #[test]
    fn nth_value_is_positional() {
        let row = Row::new().with("z", 1).with("a", 2);
        assert_eq!(nth_value(&row, 1).unwrap(), Value::Int(2));
        assert_eq!(nth_value(&row, 2).unwrap_err().kind(), ErrorKind::Decode);
    }
}
