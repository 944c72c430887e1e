//! Typed model configuration, loadable from a JSON document.

use crate::error::{ErrorKind, OrmError, OrmResult};
use crate::schema::ColumnMetadata;
use serde::{Deserialize, Serialize};

/// Configuration for a [`Model`](crate::Model).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Table the model reads and writes.
    table_name: String,
    /// Primary key column.
    primary_col: String,
    /// Column stamped with the current time on insert.
    created_timestamp_column_name: Option<String>,
    /// Column stamped with the current time on insert and update.
    updated_timestamp_column_name: Option<String>,
    /// Preloaded column metadata. When set, the schema catalog is not consulted.
    table_cols: Option<Vec<ColumnMetadata>>,
}

impl ModelConfig {
    /// Create a configuration for `table_name` keyed by `primary_col`.
    pub fn new(table_name: impl Into<String>, primary_col: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            primary_col: primary_col.into(),
            ..Self::default()
        }
    }

    /// Load a configuration document.
    ///
    /// Parse failures are reported as `InvalidConfig` with the serde error as source.
    pub fn from_json_str(json: &str) -> OrmResult<Self> {
        serde_json::from_str(json).map_err(OrmError::Config)
    }

    /// Set the created-at column.
    pub fn created_timestamp_column(mut self, column: impl Into<String>) -> Self {
        self.created_timestamp_column_name = Some(column.into());
        self
    }

    /// Set the updated-at column.
    pub fn updated_timestamp_column(mut self, column: impl Into<String>) -> Self {
        self.updated_timestamp_column_name = Some(column.into());
        self
    }

    /// Provide column metadata up front instead of asking the catalog.
    pub fn table_cols(mut self, columns: Vec<ColumnMetadata>) -> Self {
        self.table_cols = Some(columns);
        self
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn primary_col(&self) -> &str {
        &self.primary_col
    }

    pub fn created_timestamp_column_name(&self) -> Option<&str> {
        self.created_timestamp_column_name.as_deref()
    }

    pub fn updated_timestamp_column_name(&self) -> Option<&str> {
        self.updated_timestamp_column_name.as_deref()
    }

    pub fn preloaded_table_cols(&self) -> Option<&[ColumnMetadata]> {
        self.table_cols.as_deref()
    }

    /// Check that the table and primary key are set.
    ///
    /// The primary key is checked first.
    pub fn validate(&self) -> OrmResult<()> {
        if self.primary_col.trim().is_empty() {
            return Err(OrmError::new(
                ErrorKind::PrimaryColumnNotConfigured,
                format!("primary key column not configured for '{}'", self.table_name),
            ));
        }
        if self.table_name.trim().is_empty() {
            return Err(OrmError::new(
                ErrorKind::TableNameNotConfigured,
                "table name not configured",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_checks_primary_key_first() {
        let err = ModelConfig::default().validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PrimaryColumnNotConfigured);
        let err = ModelConfig::new("", "id").validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TableNameNotConfigured);
        assert!(ModelConfig::new("authors", "id").validate().is_ok());
    }

    #[test]
    fn loads_from_json() {
        let config = ModelConfig::from_json_str(
            r#"{
                "table_name": "authors",
                "primary_col": "author_id",
                "created_timestamp_column_name": "date_created",
                "table_cols": [{"name": "author_id", "type": "integer", "autoinc": true, "primary": true}]
            }"#,
        )
        .unwrap();
        assert_eq!(config.table_name(), "authors");
        assert_eq!(config.primary_col(), "author_id");
        assert_eq!(config.created_timestamp_column_name(), Some("date_created"));
        assert_eq!(config.updated_timestamp_column_name(), None);
        assert_eq!(config.preloaded_table_cols().map(<[_]>::len), Some(1));
    }

    #[test]
    fn bad_json_is_a_configuration_error() {
        let err = ModelConfig::from_json_str("{").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
        assert!(err.is_configuration());
        assert!(!err.is_gateway());
        assert!(std::error::Error::source(&err).is_some());

        let err = ModelConfig::from_json_str(r#"{"table_name": 7}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
    }
}
