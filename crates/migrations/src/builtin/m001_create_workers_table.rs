use async_trait::async_trait;

use crate::{ExecutionContext, Migration, StatementError};

/// Creates the `workers` table and its lookup indexes.
pub struct CreateWorkersTable;

impl CreateWorkersTable {
    pub const NAME: &'static str = "001_create_workers_table";
}

const UP: &str = r#"
CREATE TABLE workers (
    id              UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    first_name      VARCHAR(255) NOT NULL,
    last_name       VARCHAR(255) NOT NULL,
    document_number VARCHAR(50) NOT NULL UNIQUE,
    date_of_birth   DATE NOT NULL,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_workers_document_number ON workers (document_number);
CREATE INDEX idx_workers_created_at ON workers (created_at);
"#;

const DOWN: &str = r#"
DROP INDEX IF EXISTS idx_workers_created_at;
DROP INDEX IF EXISTS idx_workers_document_number;
DROP TABLE IF EXISTS workers;
"#;

#[async_trait]
impl Migration for CreateWorkersTable {
    async fn up(&self, ctx: &mut dyn ExecutionContext) -> Result<(), StatementError> {
        ctx.batch(UP).await
    }

    async fn down(&self, ctx: &mut dyn ExecutionContext) -> Result<(), StatementError> {
        ctx.batch(DOWN).await
    }
}
