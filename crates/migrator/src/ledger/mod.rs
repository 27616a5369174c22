//! The migration ledger: which migrations have been applied, and when.
//!
//! [`PgLedger`] persists to the `__migrations__` table; [`MemoryLedger`]
//! keeps the same semantics in process memory.

use async_trait::async_trait;

use crate::MigrateError;

pub mod memory;
pub mod postgres;

pub use db::models::LedgerRow as LedgerEntry;
pub use memory::MemoryLedger;
pub use postgres::PgLedger;

/// Durable record of applied migrations.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Create the ledger storage if it is absent. Safe to call every run.
    async fn ensure_exists(&self) -> Result<(), MigrateError>;

    /// Whether `name` has been recorded as applied.
    async fn has(&self, name: &str) -> Result<bool, MigrateError>;

    /// Record `name` as applied now.
    ///
    /// Must fail with [`MigrateError::DuplicateName`] if `name` is already
    /// present, even though callers check [`Ledger::has`] first.
    async fn record_applied(&self, name: &str) -> Result<(), MigrateError>;

    /// Forget `name`. A missing entry is not an error.
    async fn record_reverted(&self, name: &str) -> Result<(), MigrateError>;

    /// The entry with the latest `executed_at` (ties: highest `id`).
    async fn most_recent(&self) -> Result<Option<LedgerEntry>, MigrateError>;

    /// Every entry, oldest first.
    async fn entries(&self) -> Result<Vec<LedgerEntry>, MigrateError>;
}
