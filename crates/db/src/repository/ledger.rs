//! Migration ledger (`__migrations__`) queries.
//!
//! The table layout is fixed; other tooling reads it, so it must not drift:
//! `id` identity primary key, unique `name`, `executed_at` defaulting to the
//! insertion time.

use sqlx::PgPool;

use crate::{DbError, models::LedgerRow};

/// Reserved table name, kept apart from application tables.
pub const LEDGER_TABLE: &str = "__migrations__";

/// Whether the ledger table exists in the connection's current schema.
pub async fn ledger_exists(pool: &PgPool) -> Result<bool, DbError> {
    let exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM information_schema.tables
            WHERE table_schema = current_schema() AND table_name = $1
        )
        "#,
    )
    .bind(LEDGER_TABLE)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}

/// Create the ledger table.
///
/// `IF NOT EXISTS` keeps this safe when a caller skipped [`ledger_exists`].
/// `clock_timestamp()` rather than `now()` so rows written inside one
/// transaction still get distinct, increasing times.
pub async fn create_ledger(pool: &PgPool) -> Result<(), DbError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS __migrations__ (
            id          BIGINT GENERATED ALWAYS AS IDENTITY PRIMARY KEY,
            name        VARCHAR(255) NOT NULL UNIQUE,
            executed_at TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp()
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Whether a migration named `name` is recorded.
pub async fn is_recorded(pool: &PgPool, name: &str) -> Result<bool, DbError> {
    let recorded: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM __migrations__ WHERE name = $1)")
            .bind(name)
            .fetch_one(pool)
            .await?;

    Ok(recorded)
}

/// Record `name` as applied now.
///
/// Returns `DbError::Duplicate` if `name` is already present.
pub async fn insert_entry(pool: &PgPool, name: &str) -> Result<LedgerRow, DbError> {
    let row = sqlx::query_as::<_, LedgerRow>(
        "INSERT INTO __migrations__ (name) VALUES ($1) RETURNING id, name, executed_at",
    )
    .bind(name)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Remove the entry for `name`. Returns whether a row was deleted.
pub async fn delete_entry(pool: &PgPool, name: &str) -> Result<bool, DbError> {
    let result = sqlx::query("DELETE FROM __migrations__ WHERE name = $1")
        .bind(name)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// The most recently applied entry, if any.
pub async fn latest_entry(pool: &PgPool) -> Result<Option<LedgerRow>, DbError> {
    let row = sqlx::query_as::<_, LedgerRow>(
        r#"
        SELECT id, name, executed_at FROM __migrations__
        ORDER BY executed_at DESC, id DESC
        LIMIT 1
        "#,
    )
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Every entry in application order.
pub async fn list_entries(pool: &PgPool) -> Result<Vec<LedgerRow>, DbError> {
    let rows = sqlx::query_as::<_, LedgerRow>(
        "SELECT id, name, executed_at FROM __migrations__ ORDER BY executed_at ASC, id ASC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
