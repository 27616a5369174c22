//! Row structs that map 1-to-1 onto database tables.
//!
//! These are *persistence* models. The HTTP layer serialises `WorkerRow`
//! directly, so its JSON field names are camelCase.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// workers
// ---------------------------------------------------------------------------

/// A persisted worker row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WorkerRow {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    /// National identity document; unique across workers.
    pub document_number: String,
    pub date_of_birth: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Column values for inserting a worker.
#[derive(Debug, Clone)]
pub struct NewWorker {
    pub first_name: String,
    pub last_name: String,
    pub document_number: String,
    pub date_of_birth: NaiveDate,
}

// ---------------------------------------------------------------------------
// __migrations__
// ---------------------------------------------------------------------------

/// One applied migration, as recorded in the ledger table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct LedgerRow {
    pub id: i64,
    pub name: String,
    pub executed_at: DateTime<Utc>,
}
