//! Statement-level error type.

use thiserror::Error;

/// Errors returned by an [`crate::ExecutionContext`] or a migration step.
///
/// Migrations are assumed non-idempotent, so none of these are retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StatementError {
    /// No usable connection could be checked out or it dropped mid-statement.
    #[error("connection unavailable: {0}")]
    Connection(String),

    /// The server rejected the statement.
    #[error("statement failed: {0}")]
    Failed(String),

    /// A parameter or result column has a type the context cannot map.
    #[error("unsupported value: {0}")]
    Unsupported(String),
}
