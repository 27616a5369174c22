//! `db` crate: pure persistence layer.
//!
//! Provides connection settings, a connection pool, typed row structs, and
//! repository functions for every table in the workers-registry schema.
//! No business logic lives here.

pub mod config;
pub mod error;
pub mod pool;
pub mod repository;
pub mod models;

pub use config::DatabaseConfig;
pub use pool::DbPool;
pub use error::DbError;
