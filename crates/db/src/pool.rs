//! Postgres connection pool.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use crate::{config::DatabaseConfig, DbError};

/// Type alias for the shared Postgres pool used across the whole application.
pub type DbPool = PgPool;

/// Create a new connection pool from the given `database_url`.
///
/// `max_connections` controls the pool ceiling.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<DbPool, DbError> {
    info!("Connecting to database (max_connections={})", max_connections);
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .map_err(DbError::Connection)?;
    Ok(pool)
}

/// Create a pool from resolved [`DatabaseConfig`] settings.
pub async fn connect(config: &DatabaseConfig) -> Result<DbPool, DbError> {
    create_pool(&config.url, config.max_connections).await
}
