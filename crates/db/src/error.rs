//! Typed error type for the db crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("sqlx error: {0}")]
    Sqlx(#[source] sqlx::Error),

    /// The pool could not open (or re-open) a connection to the server.
    #[error("connection error: {0}")]
    Connection(#[source] sqlx::Error),

    #[error("row not found")]
    NotFound,

    /// A unique constraint rejected the write. Carries the constraint name.
    #[error("duplicate value violates unique constraint '{0}'")]
    Duplicate(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return DbError::Duplicate(db_err.constraint().unwrap_or("unique").to_owned());
            }
        }

        if matches!(
            err,
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)
        ) {
            return DbError::Connection(err);
        }

        DbError::Sqlx(err)
    }
}

#[cfg(test)]
mod tests {
    use super::DbError;

    #[test]
    fn pool_failures_are_classified_as_connection_errors() {
        assert!(matches!(DbError::from(sqlx::Error::PoolTimedOut), DbError::Connection(_)));
        assert!(matches!(DbError::from(sqlx::Error::PoolClosed), DbError::Connection(_)));
    }

    #[test]
    fn sqlx_cause_is_kept_as_source() {
        use std::error::Error;

        let e = DbError::from(sqlx::Error::PoolTimedOut);
        let source = e.source().expect("connection error keeps its cause");
        assert_eq!(source.to_string(), sqlx::Error::PoolTimedOut.to_string());
        assert!(DbError::from(sqlx::Error::RowNotFound).source().is_some());
        assert!(DbError::NotFound.source().is_none());
    }

    #[test]
    fn other_sqlx_errors_pass_through() {
        assert!(matches!(DbError::from(sqlx::Error::RowNotFound), DbError::Sqlx(_)));
    }

    #[test]
    fn duplicate_display_names_the_constraint() {
        let e = DbError::Duplicate("workers_document_number_key".into());
        assert_eq!(
            e.to_string(),
            "duplicate value violates unique constraint 'workers_document_number_key'"
        );
    }
}
