//! Route handlers.

pub mod workers;

use db::DbPool;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
}
