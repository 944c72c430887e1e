//! Query builders shared by the fetch compiler and the write path.
//!
//! All builders render through the same expression layer and number their
//! placeholders from a single [`ParamList`], so SET values, WHERE values and
//! HAVING values always line up with the order the SQL text references them.
//!
//! # Usage
//!
//! ```ignore
//! use tablegate::qb::{self, Expr, SqlQb};
//! use tablegate::Dialect;
//!
//! let stmt = qb::select("users")
//!     .dialect(Dialect::MySql)
//!     .select_cols(&["id", "name"])
//!     .and_where(Expr::eq("status", "active"))
//!     .limit(20)
//!     .build();
//!
//! // INSERT and UPDATE refuse to build without columns
//! let stmt = qb::update("users")
//!     .set("status", "inactive")
//!     .and_where(Expr::eq("id", 7))
//!     .build()?;
//! ```

mod delete;
mod expr;
mod insert;
mod param;
mod select;
mod traits;
mod update;

pub use delete::DeleteQb;
pub use expr::{Expr, ExprGroup};
pub use insert::InsertQb;
pub use param::ParamList;
pub use select::SelectQb;
pub use traits::{CompiledStatement, SqlQb};
pub use update::UpdateQb;

/// Create a SELECT query builder for the given table.
pub fn select(table: &str) -> SelectQb {
    SelectQb::new(table)
}

/// Create an INSERT query builder for the given table.
pub fn insert(table: &str) -> InsertQb {
    InsertQb::new(table)
}

/// Create an UPDATE query builder for the given table.
pub fn update(table: &str) -> UpdateQb {
    UpdateQb::new(table)
}

/// Create a DELETE query builder for the given table.
pub fn delete(table: &str) -> DeleteQb {
    DeleteQb::new(table)
}
