//! `migrator` crate: the migration ledger, registry and runner.
//!
//! [`MigrationRunner`] applies pending migrations in name order and reverts
//! the most recent one. It talks to the database only through a [`Ledger`]
//! and a [`migrations::ContextSource`], so it runs just as well against the
//! in-memory implementations.

pub mod error;
pub mod ledger;
pub mod postgres;
pub mod registry;
pub mod runner;
pub mod script;

pub use error::MigrateError;
pub use ledger::{Ledger, LedgerEntry, MemoryLedger, PgLedger};
pub use postgres::PgContextSource;
pub use registry::MigrationRegistry;
pub use runner::{MigrationRunner, RunPhase, RunReport};
pub use script::SqlScriptMigration;
