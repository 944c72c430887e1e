//! # tablegate
//!
//! A table-level data access layer that compiles structured fetch parameters
//! into SQL and runs schema-aware writes through a pluggable execution
//! gateway.
//!
//! ## Features
//!
//! - **Typed fetch parameters**: `distinct`, `cols`, `where`, `having`, `group`,
//!   `order`, `limit_size`, `limit_offset`, also parseable from an untyped
//!   JSON dictionary
//! - **Condition trees**: AND/OR groups, whitelisted operators and raw
//!   fragments with `?` placeholders, shared by WHERE and HAVING
//! - **Schema-aware writes**: unknown columns dropped, empty autoincrement
//!   columns removed, created/updated timestamps injected
//! - **Count-then-mutate**: UPDATE/DELETE only run when a COUNT pre-check
//!   matches rows
//! - **Dialects**: Postgres, MySQL, SQLite and SQL Server placeholders and paging
//! - **Statement logging**: `tracing` events via [`monitor::TracingGateway`]
//!
//! ## Example
//!
//! ```ignore
//! use tablegate::{Condition, ConditionSpec, Model, ModelConfig, QueryParameters, StaticCatalog};
//!
//! let model = Model::new(ModelConfig::new("users", "id"), &catalog, gateway)?;
//!
//! let adults = model.fetch_rows(
//!     &QueryParameters::new()
//!         .cols(["id", "name"])
//!         .filter(ConditionSpec::new().and(Condition::cmp("age", ">=", 18)))
//!         .order(["name"])
//!         .limit(20),
//! )?;
//! ```

pub mod client;
pub mod compiler;
pub mod condition;
pub mod config;
pub mod dialect;
pub mod error;
pub mod model;
pub mod monitor;
pub mod params;
pub mod qb;
pub mod record;
pub mod schema;
pub mod value;
pub mod write;

pub use client::ExecutionGateway;
pub use compiler::QueryParameterCompiler;
pub use condition::{Clause, CondValue, Condition, ConditionBuilder, ConditionSpec};
pub use config::ModelConfig;
pub use dialect::{Dialect, QuoteLiteral};
pub use error::{ErrorKind, OrmError, OrmResult};
pub use model::Model;
pub use monitor::{QueryType, TracingGateway};
pub use params::{ParamKey, QueryParameters};
pub use qb::{CompiledStatement, SqlQb};
pub use record::{FromRow, Record, RecordLike, RowExt};
pub use schema::{ColumnMetadata, SchemaCatalog, StaticCatalog, TableSchema};
pub use value::{BindKind, ColumnValues, Row, Value};
pub use write::{MatchCriteria, WriteCommandBuilder, WriteOutcome, COUNT_ALIAS};
