//! Row mapping and the entity contract used by single-record writes.

use crate::error::{OrmError, OrmResult};
use crate::value::{ColumnValues, Row, Value};

/// Trait for types that can be constructed from a result row.
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> OrmResult<Self>;
}

impl FromRow for Row {
    fn from_row(row: &Row) -> OrmResult<Self> {
        Ok(row.clone())
    }
}

/// Helper for implementing [`FromRow`] by hand.
pub trait RowExt {
    /// Get a column value, failing with a decode error if it is missing.
    fn try_get_column(&self, column: &str) -> OrmResult<&Value>;
}

impl RowExt for Row {
    fn try_get_column(&self, column: &str) -> OrmResult<&Value> {
        self.get(column)
            .ok_or_else(|| OrmError::decode(column, "column not present in row"))
    }
}

/// An entity the model can update or delete by primary key.
pub trait RecordLike {
    /// Column data held by the entity.
    fn data(&self) -> &ColumnValues;

    /// Value of the primary key column, if set.
    fn primary_value(&self, primary_col: &str) -> Option<&Value> {
        self.data().get(primary_col)
    }

    /// Mark the entity as not persisted (after it was deleted).
    fn set_state_to_new(&mut self);
}

/// A plain entity: column data plus a persisted/new flag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    data: ColumnValues,
    is_new: bool,
}

impl Record {
    pub fn new(data: ColumnValues, is_new: bool) -> Self {
        Self { data, is_new }
    }

    pub fn is_new(&self) -> bool {
        self.is_new
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.data.get(column)
    }

    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.data.set(column, value);
    }

    pub fn into_data(self) -> ColumnValues {
        self.data
    }
}

impl RecordLike for Record {
    fn data(&self) -> &ColumnValues {
        &self.data
    }

    fn set_state_to_new(&mut self) {
        self.is_new = true;
    }
}

impl FromRow for Record {
    fn from_row(row: &Row) -> OrmResult<Self> {
        Ok(Record::new(row.clone(), false))
    }
}
