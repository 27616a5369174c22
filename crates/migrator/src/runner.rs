//! Migration runner.
//!
//! `MigrationRunner` is the central orchestrator:
//! 1. Makes sure the ledger exists.
//! 2. Walks the registry in name order and applies every migration the
//!    ledger does not list, one at a time, each on its own execution context.
//! 3. Records each success in the ledger right after its `up` returns.
//! 4. Stops at the first failure. Earlier successes stay recorded; the
//!    failing migration is never recorded.
//!
//! Reverting is single-step: only the most recently applied migration is
//! rolled back per call.

use std::sync::{Arc, Mutex};

use tracing::{debug, error, info, instrument};

use db::DbPool;
use migrations::{ContextSource, Direction};

use crate::ledger::{Ledger, PgLedger};
use crate::postgres::PgContextSource;
use crate::{MigrateError, MigrationRegistry};

// ---------------------------------------------------------------------------
// Run state
// ---------------------------------------------------------------------------

/// Where the last (or current) run got to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Uninitialized,
    LedgerReady,
    Applying,
    Reverting,
    Done,
    Failed,
}

/// Outcome of a successful [`MigrationRunner::run_pending`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Migrations applied by this run, in application order.
    pub applied: Vec<String>,
    /// Migrations skipped because the ledger already listed them.
    pub skipped: Vec<String>,
}

impl RunReport {
    pub fn is_noop(&self) -> bool {
        self.applied.is_empty()
    }
}

// ---------------------------------------------------------------------------
// MigrationRunner
// ---------------------------------------------------------------------------

/// Applies and reverts migrations against one database.
///
/// The runner never holds a connection between steps; each `up`/`down` gets
/// a fresh context from `source` and releases it before the ledger write.
pub struct MigrationRunner {
    ledger: Arc<dyn Ledger>,
    source: Arc<dyn ContextSource>,
    registry: MigrationRegistry,
    phase: Mutex<RunPhase>,
}

impl MigrationRunner {
    /// Create a new runner.
    pub fn new(
        ledger: Arc<dyn Ledger>,
        source: Arc<dyn ContextSource>,
        registry: MigrationRegistry,
    ) -> Self {
        Self {
            ledger,
            source,
            registry,
            phase: Mutex::new(RunPhase::Uninitialized),
        }
    }

    /// A runner using the `__migrations__` table and contexts from `pool`.
    pub fn postgres(pool: DbPool, registry: MigrationRegistry) -> Self {
        Self::new(
            Arc::new(PgLedger::new(pool.clone())),
            Arc::new(PgContextSource::new(pool)),
            registry,
        )
    }

    pub fn registry(&self) -> &MigrationRegistry {
        &self.registry
    }

    pub fn ledger(&self) -> &dyn Ledger {
        self.ledger.as_ref()
    }

    /// Phase reached by the most recent run.
    pub fn phase(&self) -> RunPhase {
        *self.phase.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn enter(&self, phase: RunPhase) {
        debug!(?phase, "migration runner phase");
        *self.phase.lock().unwrap_or_else(|p| p.into_inner()) = phase;
    }

    fn finish<T>(&self, result: Result<T, MigrateError>) -> Result<T, MigrateError> {
        self.enter(if result.is_ok() {
            RunPhase::Done
        } else {
            RunPhase::Failed
        });
        result
    }

    /// Apply every registered migration the ledger does not list yet.
    ///
    /// # Errors
    /// Returns the first failure. Nothing after it is attempted.
    #[instrument(skip(self), fields(registered = self.registry.len()))]
    pub async fn run_pending(&self) -> Result<RunReport, MigrateError> {
        self.enter(RunPhase::Uninitialized);
        let result = self.apply_pending().await;
        self.finish(result)
    }

    /// Revert the most recently applied migration.
    ///
    /// Returns the reverted name, or `None` when the ledger is empty.
    ///
    /// # Errors
    /// [`MigrateError::NotFound`] when the ledger entry has no registered
    /// definition; [`MigrateError::Execution`] when `down` fails, in which
    /// case the entry is kept.
    #[instrument(skip(self))]
    pub async fn revert_last(&self) -> Result<Option<String>, MigrateError> {
        self.enter(RunPhase::Uninitialized);
        let result = self.revert_most_recent().await;
        self.finish(result)
    }

    async fn apply_pending(&self) -> Result<RunReport, MigrateError> {
        self.ledger.ensure_exists().await?;
        self.enter(RunPhase::LedgerReady);
        self.enter(RunPhase::Applying);

        let mut report = RunReport::default();

        for (name, migration) in self.registry.iter() {
            if self.ledger.has(name).await? {
                debug!("migration '{}' already applied", name);
                report.skipped.push(name.to_owned());
                continue;
            }

            let outcome = {
                let mut ctx = self
                    .source
                    .acquire()
                    .await
                    .map_err(|e| MigrateError::Connection(e.to_string()))?;
                migration.up(ctx.as_mut()).await
            };

            if let Err(source) = outcome {
                error!("migration '{}' failed: {}", name, source);
                return Err(MigrateError::Execution {
                    name: name.to_owned(),
                    direction: Direction::Up,
                    source,
                });
            }

            // The unique constraint, not the `has` pre-check, is what
            // rejects a concurrent runner here.
            self.ledger.record_applied(name).await?;
            info!("migration up: {}", name);
            report.applied.push(name.to_owned());
        }

        if report.is_noop() {
            info!("no pending migrations");
        } else {
            info!("applied {} migration(s)", report.applied.len());
        }

        Ok(report)
    }

    async fn revert_most_recent(&self) -> Result<Option<String>, MigrateError> {
        self.ledger.ensure_exists().await?;
        self.enter(RunPhase::LedgerReady);

        let Some(last) = self.ledger.most_recent().await? else {
            info!("no migrations to revert");
            return Ok(None);
        };

        self.enter(RunPhase::Reverting);

        let migration = self
            .registry
            .get(&last.name)
            .ok_or_else(|| MigrateError::NotFound(last.name.clone()))?;

        let outcome = {
            let mut ctx = self
                .source
                .acquire()
                .await
                .map_err(|e| MigrateError::Connection(e.to_string()))?;
            migration.down(ctx.as_mut()).await
        };

        if let Err(source) = outcome {
            error!("revert of '{}' failed: {}", last.name, source);
            return Err(MigrateError::Execution {
                name: last.name,
                direction: Direction::Down,
                source,
            });
        }

        self.ledger.record_reverted(&last.name).await?;
        info!("migration reverted: {}", last.name);
        Ok(Some(last.name))
    }
}
