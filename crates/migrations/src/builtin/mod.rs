//! Migrations compiled into the binary.
//!
//! Add new ones here with a name that sorts after the last entry.

use std::sync::Arc;

use crate::Migration;

mod m001_create_workers_table;

pub use m001_create_workers_table::CreateWorkersTable;

/// Every built-in migration with the name it is registered under.
pub fn all() -> Vec<(&'static str, Arc<dyn Migration>)> {
    vec![(CreateWorkersTable::NAME, Arc::new(CreateWorkersTable))]
}
