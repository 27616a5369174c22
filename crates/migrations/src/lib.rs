//! `migrations` crate: the `Migration` contract and the built-in migrations.
//!
//! Every migration, built-in or loaded from a SQL script, implements
//! [`Migration`]. The `migrator` crate drives them through this trait object
//! and supplies each one with an [`ExecutionContext`].

pub mod builtin;
pub mod error;
pub mod mock;
pub mod traits;
pub mod value;

pub use error::StatementError;
pub use traits::{ContextSource, Direction, ExecutionContext, Migration};
pub use value::{HasSqlType, SqlRow, SqlType, SqlValue};
