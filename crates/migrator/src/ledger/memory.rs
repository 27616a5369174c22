//! In-process ledger with the same semantics as the Postgres one.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use super::{Ledger, LedgerEntry};
use crate::MigrateError;

#[derive(Default)]
struct State {
    initialised: bool,
    next_id: i64,
    rows: Vec<LedgerEntry>,
}

/// A [`Ledger`] held in memory. Rows are lost when it is dropped.
#[derive(Default)]
pub struct MemoryLedger {
    state: Mutex<State>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// A ledger that already lists `names` as applied, in order.
    pub fn with_applied<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ledger = Self::new();
        {
            let mut state = ledger.lock();
            state.initialised = true;
            for name in names {
                push_row(&mut state, name.into());
            }
        }
        ledger
    }

    /// Whether `ensure_exists` has run (or the ledger was pre-seeded).
    pub fn is_initialised(&self) -> bool {
        self.lock().initialised
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn push_row(state: &mut State, name: String) {
    state.next_id += 1;
    // Never step backwards, even if the wall clock does.
    let now = Utc::now();
    let executed_at = match state.rows.last() {
        Some(last) if last.executed_at > now => last.executed_at,
        _ => now,
    };
    state.rows.push(LedgerEntry {
        id: state.next_id,
        name,
        executed_at,
    });
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn ensure_exists(&self) -> Result<(), MigrateError> {
        self.lock().initialised = true;
        Ok(())
    }

    async fn has(&self, name: &str) -> Result<bool, MigrateError> {
        Ok(self.lock().rows.iter().any(|row| row.name == name))
    }

    async fn record_applied(&self, name: &str) -> Result<(), MigrateError> {
        let mut state = self.lock();
        if state.rows.iter().any(|row| row.name == name) {
            return Err(MigrateError::DuplicateName(name.to_owned()));
        }
        push_row(&mut state, name.to_owned());
        Ok(())
    }

    async fn record_reverted(&self, name: &str) -> Result<(), MigrateError> {
        self.lock().rows.retain(|row| row.name != name);
        Ok(())
    }

    async fn most_recent(&self) -> Result<Option<LedgerEntry>, MigrateError> {
        Ok(self
            .lock()
            .rows
            .iter()
            .max_by_key(|row| (row.executed_at, row.id))
            .cloned())
    }

    async fn entries(&self) -> Result<Vec<LedgerEntry>, MigrateError> {
        let mut rows = self.lock().rows.clone();
        rows.sort_by_key(|row| (row.executed_at, row.id));
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn record_applied_rejects_duplicates() {
        let ledger = MemoryLedger::new();
        ledger.record_applied("001_a").await.unwrap();

        let err = ledger.record_applied("001_a").await.unwrap_err();
        assert!(matches!(err, MigrateError::DuplicateName(ref n) if n == "001_a"));
        assert_eq!(ledger.entries().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn reverting_a_missing_name_is_a_no_op() {
        let ledger = MemoryLedger::with_applied(["001_a"]);
        ledger.record_reverted("999_missing").await.unwrap();
        assert!(ledger.has("001_a").await.unwrap());
    }

    #[tokio::test]
    async fn most_recent_breaks_ties_by_insertion_order() {
        let ledger = MemoryLedger::with_applied(["001_a", "002_b", "003_c"]);
        let latest = ledger.most_recent().await.unwrap().unwrap();
        assert_eq!(latest.name, "003_c");
    }

    #[tokio::test]
    async fn empty_ledger_has_no_most_recent() {
        let ledger = MemoryLedger::new();
        assert!(ledger.most_recent().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn ensure_exists_is_idempotent() {
        let ledger = MemoryLedger::new();
        assert!(!ledger.is_initialised());
        ledger.ensure_exists().await.unwrap();
        ledger.ensure_exists().await.unwrap();
        assert!(ledger.is_initialised());
    }
}
