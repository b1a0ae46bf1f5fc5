/// Core Module
///
/// The data access layer and the error type shared with the presentation
/// shell.

pub mod db;
pub mod error;

// Re-export commonly used types for convenience
pub use error::{FailureKind, Result, ViewerError};
