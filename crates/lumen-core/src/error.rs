//! Error types for lumen.
//!
//! Reads and writes fail with distinct variants so callers can tell which
//! side of the record service gave up. Both carry the store's own error
//! detail unmodified.

use std::fmt;
use thiserror::Error;

/// The unified error type for lumen operations.
///
/// `Clone` so that hooks can keep the last failure in their state while
/// also handing it back to imperative callers.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Reading from the remote store failed.
    #[error(transparent)]
    RemoteQuery(#[from] RemoteQueryError),

    /// Inserting, updating or deleting failed.
    #[error(transparent)]
    RemoteWrite(#[from] RemoteWriteError),

    /// A row came back in a shape the caller's type cannot hold.
    #[error("failed to decode row from '{table}': {message}")]
    Decode { table: String, message: String },

    /// Input validation errors (table names, ids, payloads, URLs).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

impl Error {
    /// The underlying store error, if this failure came from the store.
    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            Error::RemoteQuery(e) => Some(&e.source),
            Error::RemoteWrite(e) => Some(&e.source),
            _ => None,
        }
    }

    /// Returns true if the store reported that the table does not exist.
    pub fn is_missing_table(&self) -> bool {
        self.store_error().is_some_and(StoreError::is_missing_table)
    }
}

/// A failed read against the remote store.
#[derive(Debug, Clone, Error)]
#[error("query on '{table}' failed: {source}")]
pub struct RemoteQueryError {
    /// The table that was queried.
    pub table: String,
    /// What the store reported.
    #[source]
    pub source: StoreError,
}

/// A failed insert, update or delete.
#[derive(Debug, Clone, Error)]
#[error("{op} on '{table}' failed: {source}")]
pub struct RemoteWriteError {
    /// The table that was written to.
    pub table: String,
    /// Which write was attempted.
    pub op: WriteOp,
    /// What the store reported.
    #[source]
    pub source: StoreError,
}

/// The kind of write a [`RemoteWriteError`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WriteOp {
    Insert,
    Update,
    Delete,
}

impl fmt::Display for WriteOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WriteOp::Insert => "insert",
            WriteOp::Update => "update",
            WriteOp::Delete => "delete",
        };
        f.write_str(s)
    }
}

/// Error code the backend uses for a relation that does not exist.
pub const UNDEFINED_TABLE: &str = "42P01";

/// Error code the backend uses when a single row was expected but several matched.
pub const MULTIPLE_ROWS: &str = "PGRST116";

/// Error code used for failures that never reached the store.
pub const TRANSPORT: &str = "transport";

/// An error as reported by a remote store.
///
/// This is the error half of the `{data, error}` pair every store call
/// produces. Stores return it instead of panicking or retrying; the
/// record service decides what it means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError {
    /// HTTP status code, when the store is reached over HTTP.
    pub status: Option<u16>,
    /// Machine-readable error code (e.g. `42P01`).
    pub code: Option<String>,
    /// Human-readable message, passed through untouched.
    pub message: String,
    /// Additional detail from the store.
    pub details: Option<String>,
    /// Suggested fix from the store.
    pub hint: Option<String>,
}

impl StoreError {
    /// Create a store error with just a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            code: None,
            message: message.into(),
            details: None,
            hint: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// The error a store reports for a table it does not have.
    pub fn undefined_table(table: &str) -> Self {
        Self::new(format!("relation \"public.{}\" does not exist", table))
            .with_status(404)
            .with_code(UNDEFINED_TABLE)
    }

    /// The error reported when a single-row write matched several rows.
    pub fn multiple_rows(count: usize) -> Self {
        Self::new("JSON object requested, multiple (or no) rows returned")
            .with_status(406)
            .with_code(MULTIPLE_ROWS)
            .with_details(format!("The result contains {} rows", count))
    }

    /// A failure that happened before the store could answer.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(message).with_code(TRANSPORT)
    }

    pub fn is_missing_table(&self) -> bool {
        self.code.as_deref() == Some(UNDEFINED_TABLE)
    }

    pub fn is_transport(&self) -> bool {
        self.code.as_deref() == Some(TRANSPORT)
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(status) = self.status {
            write!(f, "HTTP {} ", status)?;
        }
        if let Some(ref code) = self.code {
            write!(f, "[{}] ", code)?;
        }
        write!(f, "{}", self.message)?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for StoreError {}

/// Input validation errors.
#[derive(Debug, Clone, Error)]
pub enum InvalidInputError {
    /// Invalid table name.
    #[error("invalid table name '{value}': {reason}")]
    TableName { value: String, reason: String },

    /// Invalid column name.
    #[error("invalid column '{value}': {reason}")]
    Column { value: String, reason: String },

    /// Invalid record identifier.
    #[error("invalid record id '{value}': {reason}")]
    RecordId { value: String, reason: String },

    /// Invalid store URL.
    #[error("invalid store URL '{value}': {reason}")]
    StoreUrl { value: String, reason: String },

    /// Pagination window with `from` past `to`.
    #[error("invalid range {from}..={to}: start is past end")]
    Range { from: u64, to: u64 },

    /// Mutation payload that is not a JSON object.
    #[error("invalid payload: {reason}")]
    Payload { reason: String },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}
