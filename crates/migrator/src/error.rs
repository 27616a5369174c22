//! Migrator error types.

use migrations::{Direction, StatementError};
use thiserror::Error;

/// Errors produced while discovering, applying or reverting migrations.
///
/// None of these are retried: a failed step halts the run and is surfaced to
/// the caller as-is.
#[derive(Debug, Error)]
pub enum MigrateError {
    // ------ Ledger / connection errors ------

    /// No execution context could be acquired from the pool.
    #[error("database connection failed: {0}")]
    Connection(String),

    /// The ledger table could not be created.
    #[error("failed to initialise migration ledger: {0}")]
    LedgerInit(#[source] db::DbError),

    /// A ledger read or delete failed.
    #[error("migration ledger query failed: {0}")]
    Ledger(#[source] db::DbError),

    /// The ledger already holds this name. Points at a concurrent or double run.
    #[error("migration '{0}' is already recorded in the ledger")]
    DuplicateName(String),

    // ------ Execution errors ------

    /// A migration's `up` or `down` failed; it was not (un)recorded.
    #[error("migration '{name}' failed during {direction}: {source}")]
    Execution {
        name: String,
        direction: Direction,
        #[source]
        source: StatementError,
    },

    /// The ledger names a migration that is no longer registered.
    #[error("migration '{0}' is recorded in the ledger but has no registered definition")]
    NotFound(String),

    // ------ Registry errors ------

    /// Two definitions were registered under the same name.
    #[error("migration '{0}' is registered more than once")]
    DuplicateDefinition(String),

    #[error("invalid migration name '{name}': {reason}")]
    InvalidName {
        name: String,
        reason: &'static str,
    },

    /// A SQL script could not be read or parsed.
    #[error("migration script error: {0}")]
    Script(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn execution_error_names_migration_and_direction() {
        let e = MigrateError::Execution {
            name: "002_add_col".into(),
            direction: Direction::Up,
            source: StatementError::Failed("syntax error".into()),
        };
        assert_eq!(
            e.to_string(),
            "migration '002_add_col' failed during up: statement failed: syntax error"
        );
    }

    #[test]
    fn not_found_mentions_ledger() {
        let e = MigrateError::NotFound("003_gone".into());
        assert!(e.to_string().contains("003_gone"));
        assert!(e.to_string().contains("ledger"));
    }
}
