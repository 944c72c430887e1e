//! Error types for tablegate

use std::fmt;
use thiserror::Error;

/// Result type alias for tablegate operations
pub type OrmResult<T> = Result<T, OrmError>;

/// What went wrong, independent of the detail message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// `cols` was not a list (or held a non-string entry).
    BadColsParam,
    /// `where` was not a list, or one of its entries is malformed.
    BadWhereParam,
    /// `having` was not a list, or one of its entries is malformed.
    BadHavingParam,
    /// `group` was not a list of strings.
    BadGroupByParam,
    /// `order` was not a list of strings.
    BadOrderByParam,
    /// `limit_size` / `limit_offset` was not a non-negative number.
    BadLimitParam,
    /// A fetch variant's column-count precondition was not met.
    BadFetchParams,
    /// The gateway reported no generated key after an INSERT.
    PrimaryKeyNotRetrievableAfterInsert,
    /// The model was configured without a primary key column.
    PrimaryColumnNotConfigured,
    /// The model was configured without a table name.
    TableNameNotConfigured,
    /// A configuration document could not be parsed.
    InvalidConfig,
    /// Nothing to write.
    EmptyPayload,
    /// Failure reported by the execution gateway or schema catalog.
    Gateway,
    /// A result row did not have the shape the core needs.
    Decode,
}

impl ErrorKind {
    /// Stable name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::BadColsParam => "BadColsParam",
            ErrorKind::BadWhereParam => "BadWhereParam",
            ErrorKind::BadHavingParam => "BadHavingParam",
            ErrorKind::BadGroupByParam => "BadGroupByParam",
            ErrorKind::BadOrderByParam => "BadOrderByParam",
            ErrorKind::BadLimitParam => "BadLimitParam",
            ErrorKind::BadFetchParams => "BadFetchParams",
            ErrorKind::PrimaryKeyNotRetrievableAfterInsert => {
                "PrimaryKeyNotRetrievableAfterInsert"
            }
            ErrorKind::PrimaryColumnNotConfigured => "PrimaryColumnNotConfigured",
            ErrorKind::TableNameNotConfigured => "TableNameNotConfigured",
            ErrorKind::InvalidConfig => "InvalidConfig",
            ErrorKind::EmptyPayload => "EmptyPayload",
            ErrorKind::Gateway => "Gateway",
            ErrorKind::Decode => "Decode",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error types for compilation, configuration and execution
#[derive(Debug, Error)]
pub enum OrmError {
    /// Parameter, configuration or write-protocol violation detected by the core.
    #[error("{kind}: {detail}")]
    Invalid { kind: ErrorKind, detail: String },

    /// Error raised by the execution gateway or schema catalog, passed through as-is.
    #[error("Gateway error: {0}")]
    Gateway(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Malformed configuration document
    #[error("Configuration error: {0}")]
    Config(#[source] serde_json::Error),
}

impl OrmError {
    /// Create an error of the given kind with a detail message.
    pub fn new(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self::Invalid {
            kind,
            detail: detail.into(),
        }
    }

    /// Wrap a collaborator error without interpreting it.
    pub fn gateway<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Gateway(Box::new(err))
    }

    /// Create a gateway error from a plain message.
    pub fn gateway_msg(message: impl Into<String>) -> Self {
        let message: String = message.into();
        Self::Gateway(message.into())
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// The kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Invalid { kind, .. } => *kind,
            Self::Gateway(_) => ErrorKind::Gateway,
            Self::Decode { .. } => ErrorKind::Decode,
            Self::Config(_) => ErrorKind::InvalidConfig,
        }
    }

    /// Check if this error came from a malformed fetch parameter.
    pub fn is_bad_param(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::BadColsParam
                | ErrorKind::BadWhereParam
                | ErrorKind::BadHavingParam
                | ErrorKind::BadGroupByParam
                | ErrorKind::BadOrderByParam
                | ErrorKind::BadLimitParam
                | ErrorKind::BadFetchParams
        )
    }

    /// Check if this is a construction-time configuration error.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::PrimaryColumnNotConfigured
                | ErrorKind::TableNameNotConfigured
                | ErrorKind::InvalidConfig
        )
    }

    /// Check if this error was produced by the gateway.
    pub fn is_gateway(&self) -> bool {
        matches!(self, Self::Gateway(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_kind_and_detail() {
        let err = OrmError::new(ErrorKind::BadColsParam, "expected a list for 'cols'");
        assert_eq!(err.to_string(), "BadColsParam: expected a list for 'cols'");
        assert_eq!(err.kind(), ErrorKind::BadColsParam);
        assert!(err.is_bad_param());
        assert!(!err.is_configuration());
    }

    #[test]
    fn gateway_errors_keep_their_source() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "connection reset");
        let err = OrmError::gateway(io);
        assert_eq!(err.kind(), ErrorKind::Gateway);
        assert!(err.is_gateway());
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("connection reset"));
    }
}
