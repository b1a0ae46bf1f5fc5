/// Viewer Error Module
///
/// This module defines the error type shared by the data access layer and
/// the presentation shell. Engine failures are carried unchanged so the user
/// sees SQLite's own message text.
use rusqlite::ErrorCode;
use thiserror::Error;

/// Error type for the viewer.
///
/// The taxonomy stays flat on purpose for the user: a connection could not be
/// opened, or a statement failed. Everything else covers the ambient layers
/// (configuration, files, export).
#[derive(Error, Debug)]
pub enum ViewerError {
    /// The database file could not be opened (bad path, permissions, not a database)
    #[error("Failed to open database '{path}': {source}")]
    ConnectionOpen {
        path: String,
        #[source]
        source: rusqlite::Error,
    },

    /// Any engine-reported statement failure (syntax, constraint, type mismatch)
    #[error("Query failed: {0}")]
    Query(#[from] rusqlite::Error),

    /// A table name that the engine catalog does not report
    #[error("Query failed: no such table: {0}")]
    UnknownTable(String),

    /// A column name that the table's column metadata does not report
    #[error("Query failed: no such column: {table}.{column}")]
    UnknownColumn { table: String, column: String },

    /// An operation needed an open database but none is open
    #[error("No database is open")]
    NoConnection,

    /// Configuration loading and validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// UI-related errors (export formats, prompts)
    #[error("UI error: {0}")]
    Ui(String),

    /// File system and I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Coarse classification of a failure, used by the shell to label messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Connection,
    Syntax,
    Constraint,
    NotFound,
    Other,
}

impl FailureKind {
    pub fn label(self) -> &'static str {
        match self {
            FailureKind::Connection => "Connection error",
            FailureKind::Syntax => "SQL error",
            FailureKind::Constraint => "Constraint violation",
            FailureKind::NotFound => "Not found",
            FailureKind::Other => "Error",
        }
    }
}

impl ViewerError {
    /// Classifies the error from the SQLite error code and message.
    pub fn kind(&self) -> FailureKind {
        match self {
            ViewerError::ConnectionOpen { .. } | ViewerError::NoConnection => {
                FailureKind::Connection
            }
            ViewerError::UnknownTable(_) | ViewerError::UnknownColumn { .. } => {
                FailureKind::NotFound
            }
            ViewerError::Query(err) => classify_engine_error(err),
            _ => FailureKind::Other,
        }
    }
}

fn classify_engine_error(err: &rusqlite::Error) -> FailureKind {
    match err {
        rusqlite::Error::SqliteFailure(code, message) => {
            let message = message.as_deref().unwrap_or_default();
            match code.code {
                ErrorCode::ConstraintViolation => FailureKind::Constraint,
                ErrorCode::CannotOpen | ErrorCode::NotADatabase | ErrorCode::PermissionDenied => {
                    FailureKind::Connection
                }
                _ if message.starts_with("no such table")
                    || message.starts_with("no such column") =>
                {
                    FailureKind::NotFound
                }
                _ if message.contains("syntax error") || message.starts_with("incomplete input") => {
                    FailureKind::Syntax
                }
                _ => FailureKind::Other,
            }
        }
        rusqlite::Error::MultipleStatement | rusqlite::Error::InvalidParameterCount(..) => {
            FailureKind::Syntax
        }
        _ => FailureKind::Other,
    }
}

/// Type alias for Result to use ViewerError as the error type.
pub type Result<T> = std::result::Result<T, ViewerError>;
