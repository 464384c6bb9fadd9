//! Error types for distdb
//!
//! A single enum covers every error kind the storage engine, index manager,
//! parser, executor, and consensus log can raise. Every variant carries the
//! human-readable message that ends up verbatim in a `Result` object's
//! `message` field.

use std::fmt;
use std::io;

/// Unified error type for distdb operations
#[derive(Debug)]
pub enum DbError {
    /// SQL failed to parse
    Parse(String),
    /// A syntactically valid but unimplemented statement kind
    UnsupportedStatement(String),
    /// Table does not exist
    NoSuchTable(String),
    /// Table already exists
    TableExists(String),
    /// Row contains a column absent from the table's schema
    UnknownColumn(String),
    /// Index name already registered on the table
    IndexExists(String),
    /// Index construction request is invalid (e.g. multi-column ordered index)
    IndexKindInvalid(String),
    /// Range scan requested on an index kind that doesn't support it
    RangeNotSupported(String),
    /// Write attempted against a non-leader node
    NotLeader(String),
    /// Consensus log refused or failed to replicate a command
    ReplicationFailed(String),
    /// WAL append could not be made durable
    DurableWriteFailed(String),
    /// I/O error not covered by a more specific kind
    Io(io::Error),
    /// JSON (de)serialization error, e.g. snapshot encode/decode
    Json(String),
    /// Binary (de)serialization error, e.g. WAL record encode/decode
    Encoding(String),
}

impl fmt::Display for DbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbError::Parse(msg) => write!(f, "parse error: {}", msg),
            DbError::UnsupportedStatement(msg) => write!(f, "unsupported statement: {}", msg),
            DbError::NoSuchTable(msg) => write!(f, "{}", msg),
            DbError::TableExists(msg) => write!(f, "{}", msg),
            DbError::UnknownColumn(msg) => write!(f, "{}", msg),
            DbError::IndexExists(msg) => write!(f, "{}", msg),
            DbError::IndexKindInvalid(msg) => write!(f, "{}", msg),
            DbError::RangeNotSupported(msg) => write!(f, "{}", msg),
            DbError::NotLeader(msg) => write!(f, "{}", msg),
            DbError::ReplicationFailed(msg) => write!(f, "{}", msg),
            DbError::DurableWriteFailed(msg) => write!(f, "{}", msg),
            DbError::Io(e) => write!(f, "{}", e),
            DbError::Json(msg) => write!(f, "{}", msg),
            DbError::Encoding(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for DbError {}

impl From<io::Error> for DbError {
    fn from(e: io::Error) -> Self {
        DbError::Io(e)
    }
}

impl From<serde_json::Error> for DbError {
    fn from(e: serde_json::Error) -> Self {
        DbError::Json(e.to_string())
    }
}

impl From<Box<bincode::ErrorKind>> for DbError {
    fn from(e: Box<bincode::ErrorKind>) -> Self {
        DbError::Encoding(e.to_string())
    }
}

/// Result type alias for distdb operations
pub type Result<T> = std::result::Result<T, DbError>;

impl DbError {
    pub fn no_such_table(table: &str) -> Self {
        DbError::NoSuchTable(format!("table '{}' does not exist", table))
    }

    pub fn table_exists(table: &str) -> Self {
        DbError::TableExists(format!("table '{}' already exists", table))
    }

    pub fn unknown_column(table: &str, column: &str) -> Self {
        DbError::UnknownColumn(format!(
            "column '{}' is not in the schema for table '{}'",
            column, table
        ))
    }

    pub fn index_exists(table: &str, name: &str) -> Self {
        DbError::IndexExists(format!(
            "index '{}' already exists on table '{}'",
            name, table
        ))
    }
}
