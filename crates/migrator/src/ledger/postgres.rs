//! Ledger backed by the `__migrations__` table.

use async_trait::async_trait;
use db::{repository::ledger as ledger_repo, DbError, DbPool};
use tracing::{debug, info};

use super::{Ledger, LedgerEntry};
use crate::MigrateError;

/// [`Ledger`] implementation over the shared Postgres pool.
#[derive(Clone)]
pub struct PgLedger {
    pool: DbPool,
}

impl PgLedger {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn init_error(err: DbError) -> MigrateError {
    match err {
        DbError::Connection(e) => MigrateError::Connection(e.to_string()),
        other => MigrateError::LedgerInit(other),
    }
}

fn query_error(err: DbError) -> MigrateError {
    match err {
        DbError::Connection(e) => MigrateError::Connection(e.to_string()),
        other => MigrateError::Ledger(other),
    }
}

#[async_trait]
impl Ledger for PgLedger {
    async fn ensure_exists(&self) -> Result<(), MigrateError> {
        let exists = ledger_repo::ledger_exists(&self.pool)
            .await
            .map_err(init_error)?;

        if exists {
            debug!("ledger table {} already present", ledger_repo::LEDGER_TABLE);
            return Ok(());
        }

        ledger_repo::create_ledger(&self.pool)
            .await
            .map_err(init_error)?;
        info!("created ledger table {}", ledger_repo::LEDGER_TABLE);
        Ok(())
    }

    async fn has(&self, name: &str) -> Result<bool, MigrateError> {
        ledger_repo::is_recorded(&self.pool, name)
            .await
            .map_err(query_error)
    }

    async fn record_applied(&self, name: &str) -> Result<(), MigrateError> {
        match ledger_repo::insert_entry(&self.pool, name).await {
            Ok(_) => Ok(()),
            Err(DbError::Duplicate(_)) => Err(MigrateError::DuplicateName(name.to_owned())),
            Err(other) => Err(query_error(other)),
        }
    }

    async fn record_reverted(&self, name: &str) -> Result<(), MigrateError> {
        let removed = ledger_repo::delete_entry(&self.pool, name)
            .await
            .map_err(query_error)?;
        if !removed {
            debug!("ledger had no entry for '{}'", name);
        }
        Ok(())
    }

    async fn most_recent(&self) -> Result<Option<LedgerEntry>, MigrateError> {
        ledger_repo::latest_entry(&self.pool)
            .await
            .map_err(query_error)
    }

    async fn entries(&self) -> Result<Vec<LedgerEntry>, MigrateError> {
        ledger_repo::list_entries(&self.pool)
            .await
            .map_err(query_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_connection_failures_stay_connection_errors() {
        let err = init_error(DbError::Connection(sqlx::Error::PoolTimedOut));
        assert!(matches!(err, MigrateError::Connection(_)));
    }

    #[test]
    fn other_init_failures_are_ledger_init() {
        let err = init_error(DbError::Sqlx(sqlx::Error::RowNotFound));
        assert!(matches!(err, MigrateError::LedgerInit(DbError::Sqlx(_))));
    }
}
