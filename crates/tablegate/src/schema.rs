//! Table metadata: column descriptions, the per-table schema, and the
//! catalog trait that supplies them.

use crate::error::{ErrorKind, OrmError, OrmResult};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Description of a single table column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMetadata {
    /// Column name.
    pub name: String,
    /// Declared SQL type (e.g. `integer`, `varchar`).
    #[serde(rename = "type")]
    pub data_type: String,
    /// Declared size, if any.
    #[serde(default)]
    pub size: Option<u32>,
    /// Declared scale, if any.
    #[serde(default)]
    pub scale: Option<u32>,
    /// Whether the column is `NOT NULL`.
    #[serde(default)]
    pub not_null: bool,
    /// Default value, if any.
    #[serde(default)]
    pub default: Option<Value>,
    /// Whether the database generates values for this column.
    #[serde(default)]
    pub autoinc: bool,
    /// Whether the column is (part of) the primary key.
    #[serde(default)]
    pub primary: bool,
}

impl ColumnMetadata {
    /// Create a nullable column of the given type.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            size: None,
            scale: None,
            not_null: false,
            default: None,
            autoinc: false,
            primary: false,
        }
    }

    pub fn size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    pub fn scale(mut self, scale: u32) -> Self {
        self.scale = Some(scale);
        self
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Mark as a database-generated column.
    pub fn autoinc(mut self) -> Self {
        self.autoinc = true;
        self
    }

    /// Mark as primary key. Primary key columns are implicitly `NOT NULL`.
    pub fn primary(mut self) -> Self {
        self.primary = true;
        self.not_null = true;
        self
    }
}

/// Column metadata for one table, loaded once and never refreshed.
#[derive(Debug, Clone)]
pub struct TableSchema {
    name: String,
    columns: Vec<ColumnMetadata>,
    primary_key: String,
}

impl TableSchema {
    /// Create a table schema.
    ///
    /// Fails with `TableNameNotConfigured` if `name` is empty and with
    /// `PrimaryColumnNotConfigured` if `primary_key` is empty.
    pub fn new(
        name: impl Into<String>,
        columns: Vec<ColumnMetadata>,
        primary_key: impl Into<String>,
    ) -> OrmResult<Self> {
        let name = name.into();
        let primary_key = primary_key.into();

        if primary_key.trim().is_empty() {
            return Err(OrmError::new(
                ErrorKind::PrimaryColumnNotConfigured,
                format!("primary key column name not set for table '{name}'"),
            ));
        }
        if name.trim().is_empty() {
            return Err(OrmError::new(
                ErrorKind::TableNameNotConfigured,
                "table name not set",
            ));
        }

        Ok(Self {
            name,
            columns,
            primary_key,
        })
    }

    /// Table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Primary key column name.
    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    /// All columns, in catalog order.
    pub fn columns(&self) -> &[ColumnMetadata] {
        &self.columns
    }

    /// Column names, in catalog order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&ColumnMetadata> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Check if this table has a column with the given name.
    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Check if a column is database-generated.
    pub fn is_autoincrement(&self, name: &str) -> bool {
        self.column(name).is_some_and(|c| c.autoinc)
    }
}

/// Supplies per-table column metadata.
///
/// Implemented by live introspection code outside this crate; [`StaticCatalog`]
/// covers preconfigured schemas and tests.
pub trait SchemaCatalog {
    /// Column metadata for `table`, in declaration order.
    fn fetch_table_columns(&self, table: &str) -> OrmResult<Vec<ColumnMetadata>>;
}

impl<C: SchemaCatalog + ?Sized> SchemaCatalog for &C {
    fn fetch_table_columns(&self, table: &str) -> OrmResult<Vec<ColumnMetadata>> {
        (**self).fetch_table_columns(table)
    }
}

/// In-memory catalog of table columns.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    tables: HashMap<String, Vec<ColumnMetadata>>,
}

impl StaticCatalog {
    /// Create a new empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table's columns, replacing any previous registration.
    pub fn register_table(&mut self, table: impl Into<String>, columns: Vec<ColumnMetadata>) {
        self.tables.insert(table.into(), columns);
    }

    /// Chainable form of [`StaticCatalog::register_table`].
    pub fn with_table(mut self, table: impl Into<String>, columns: Vec<ColumnMetadata>) -> Self {
        self.register_table(table, columns);
        self
    }

    /// Check if a table is registered.
    pub fn has_table(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }

    /// Number of registered tables.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl SchemaCatalog for StaticCatalog {
    fn fetch_table_columns(&self, table: &str) -> OrmResult<Vec<ColumnMetadata>> {
        self.tables
            .get(table)
            .cloned()
            .ok_or_else(|| OrmError::gateway_msg(format!("table '{table}' is not registered")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> Vec<ColumnMetadata> {
        vec![
            ColumnMetadata::new("id", "integer").primary().autoinc(),
            ColumnMetadata::new("name", "varchar").size(255).not_null(),
            ColumnMetadata::new("price", "numeric").size(10).scale(2),
        ]
    }

    #[test]
    fn schema_requires_primary_key() {
        let err = TableSchema::new("products", columns(), "").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PrimaryColumnNotConfigured);
    }

    #[test]
    fn schema_requires_table_name() {
        let err = TableSchema::new("", columns(), "id").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TableNameNotConfigured);
    }

    #[test]
    fn schema_lookups() {
        let schema = TableSchema::new("products", columns(), "id").unwrap();
        assert_eq!(schema.column_names(), vec!["id", "name", "price"]);
        assert!(schema.has_column("price"));
        assert!(!schema.has_column("missing"));
        assert!(schema.is_autoincrement("id"));
        assert!(!schema.is_autoincrement("name"));
        assert_eq!(schema.column("price").and_then(|c| c.scale), Some(2));
    }

    #[test]
    fn static_catalog_round_trip() {
        let catalog = StaticCatalog::new().with_table("products", columns());
        assert!(catalog.has_table("products"));
        assert_eq!(catalog.fetch_table_columns("products").unwrap().len(), 3);
        let err = catalog.fetch_table_columns("orders").unwrap_err();
        assert!(err.is_gateway());
    }

    #[test]
    fn column_metadata_from_json() {
        let col: ColumnMetadata = serde_json::from_str(
            r#"{"name":"id","type":"bigint","not_null":true,"autoinc":true,"primary":true}"#,
        )
        .unwrap();
        assert!(col.autoinc && col.primary && col.not_null);
        assert_eq!(col.size, None);
    }
}
