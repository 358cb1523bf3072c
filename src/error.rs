//! Error types for qmap.

use thiserror::Error;

/// The main error type for qmap operations.
#[derive(Debug, Error)]
pub enum QmapError {
    /// The server identifier is not in the dialect registry.
    #[error("Unsupported dialect: '{0}'. Expected one of: mysql, mariadb, pgsql, sqlserver, dblib")]
    UnsupportedDialect(String),

    /// The dialect is known but no driver is available to execute against it.
    #[error("Server does not support driver: {0}")]
    UnsupportedDriver(String),

    /// A DSL argument is the wrong kind of container.
    #[error("Invalid argument shape: {0}")]
    InvalidArgumentShape(String),

    /// A HAVING entry does not have exactly three parts.
    #[error("Incorrect number of parameters for HAVING clause: {0}")]
    MalformedHavingClause(String),

    /// A bracketed token is not in the closed table for its position.
    #[error("Unmapped {kind} token: '{token}'")]
    UnmappedToken { kind: &'static str, token: String },

    /// A value does not fit the operator or position it is used in.
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// A column, condition or join key could not be tokenized.
    #[error("Parse error in '{input}': {message}")]
    Parse { input: String, message: String },

    /// Insert rows do not share the first row's column set.
    #[error("Insert row {row} does not have the same columns as the first row")]
    HeterogeneousRows { row: usize },

    /// A statement references a named placeholder with no bound value.
    #[error("No value bound for parameter ':{0}'")]
    UnboundParameter(String),

    /// Connection error.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Statement execution error reported by the driver.
    #[error("Execution error: {0}")]
    Execution(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl QmapError {
    /// Create a tokenizer error for the given input.
    pub fn parse(input: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            input: input.into(),
            message: message.into(),
        }
    }

    /// Create an unmapped token error.
    pub fn unmapped(kind: &'static str, token: impl Into<String>) -> Self {
        Self::UnmappedToken {
            kind,
            token: token.into(),
        }
    }

    /// Create an invalid argument shape error.
    pub fn shape(message: impl Into<String>) -> Self {
        Self::InvalidArgumentShape(message.into())
    }
}

/// Result type alias for qmap operations.
pub type QmapResult<T> = Result<T, QmapError>;
