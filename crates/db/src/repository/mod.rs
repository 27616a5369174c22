//! Repository functions: one function per database operation.
//!
//! Every function takes a `&DbPool` and returns a `Result<T, DbError>`.
//! Plain SQL only.

pub mod ledger;
pub mod workers;
