//! The contracts between the runner, the connection pool and each migration.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;

use crate::{SqlRow, SqlValue, StatementError};

/// An acquired handle able to run statements, scoped to one migration step.
///
/// Implementations release their connection when dropped.
#[async_trait]
pub trait ExecutionContext: Send {
    /// Run one parameterized statement (`$1`, `$2`, … placeholders) and
    /// return the rows it produced.
    ///
    /// Result columns must map onto a [`SqlValue`] variant. JSON columns come
    /// back as their text form; other types (`NUMERIC`, arrays, ranges) fail
    /// with [`StatementError::Unsupported`] and should be cast in the query,
    /// for example `amount::TEXT` or `amount::FLOAT8`.
    async fn execute(
        &mut self,
        statement: &str,
        params: &[SqlValue],
    ) -> Result<Vec<SqlRow>, StatementError>;

    /// Run a script that may contain several statements or control blocks.
    async fn batch(&mut self, script: &str) -> Result<(), StatementError>;
}

/// Hands out execution contexts. Backed by the shared connection pool.
#[async_trait]
pub trait ContextSource: Send + Sync {
    async fn acquire(&self) -> Result<Box<dyn ExecutionContext>, StatementError>;
}

/// A versioned schema change.
///
/// A migration never opens its own connection; it runs against whatever
/// context the caller hands it. `up` should be internally atomic (a single
/// batch or an explicit transaction block) since a failed `up` is not rolled
/// back for it.
#[async_trait]
pub trait Migration: Send + Sync {
    /// Move the schema forward.
    async fn up(&self, ctx: &mut dyn ExecutionContext) -> Result<(), StatementError>;

    /// Undo the effect of [`Migration::up`].
    async fn down(&self, ctx: &mut dyn ExecutionContext) -> Result<(), StatementError>;
}

/// Which half of a migration is being run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => write!(f, "up"),
            Self::Down => write!(f, "down"),
        }
    }
}

impl FromStr for Direction {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            other => Err(format!("unknown migration direction: {other}")),
        }
    }
}
