//! Worker CRUD operations.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    DbError,
    models::{NewWorker, WorkerRow},
};

/// Insert a new worker into the database.
///
/// Returns `DbError::Duplicate` when another worker already holds the same
/// `document_number`.
pub async fn create_worker(pool: &PgPool, worker: &NewWorker) -> Result<WorkerRow, DbError> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    let row = sqlx::query_as::<_, WorkerRow>(
        r#"
        INSERT INTO workers
            (id, first_name, last_name, document_number, date_of_birth, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $6)
        RETURNING id, first_name, last_name, document_number, date_of_birth, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(&worker.first_name)
    .bind(&worker.last_name)
    .bind(&worker.document_number)
    .bind(worker.date_of_birth)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Fetch a single worker by its primary key.
pub async fn get_worker(pool: &PgPool, id: Uuid) -> Result<WorkerRow, DbError> {
    let row = sqlx::query_as::<_, WorkerRow>(
        r#"
        SELECT id, first_name, last_name, document_number, date_of_birth, created_at, updated_at
        FROM workers
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(row)
}

/// Return all workers ordered by registration time (oldest first).
pub async fn list_workers(pool: &PgPool) -> Result<Vec<WorkerRow>, DbError> {
    let rows = sqlx::query_as::<_, WorkerRow>(
        r#"
        SELECT id, first_name, last_name, document_number, date_of_birth, created_at, updated_at
        FROM workers
        ORDER BY created_at ASC, id ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
