//! Statement logging.
//!
//! [`TracingGateway`] wraps any [`ExecutionGateway`](crate::ExecutionGateway)
//! and emits each statement as a `tracing` event, classified by
//! [`QueryType`].
//!
//! # Example
//!
//! ```rust,ignore
//! use tablegate::monitor::TracingGateway;
//! use tracing::Level;
//!
//! let gateway = TracingGateway::new(my_gateway)
//!     .level(Level::INFO)
//!     .max_sql_length(500);
//! let model = Model::new(config, &catalog, gateway)?;
//! ```

mod tracing_gateway;
mod types;

pub use tracing_gateway::TracingGateway;
pub use types::QueryType;

pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}
