//! PostgreSQL execution contexts.
//!
//! `PgContextSource` checks one connection out of the shared pool per
//! migration step. The connection returns to the pool when the
//! [`PgContext`] is dropped, whether the step succeeded or not.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgArguments, PgConnection, PgRow};
use sqlx::query::Query;
use sqlx::types::JsonValue;
use sqlx::{Column, Postgres, Row, TypeInfo};
use uuid::Uuid;

use db::DbPool;
use migrations::{ContextSource, ExecutionContext, SqlRow, SqlType, SqlValue, StatementError};

/// Hands out [`PgContext`]s backed by the shared pool.
#[derive(Clone)]
pub struct PgContextSource {
    pool: DbPool,
}

impl PgContextSource {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContextSource for PgContextSource {
    async fn acquire(&self) -> Result<Box<dyn ExecutionContext>, StatementError> {
        let conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| StatementError::Connection(e.to_string()))?;
        Ok(Box::new(PgContext { conn }))
    }
}

/// One checked-out pool connection.
pub struct PgContext {
    conn: PoolConnection<Postgres>,
}

fn statement_error(err: sqlx::Error) -> StatementError {
    match err {
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            StatementError::Connection(err.to_string())
        }
        other => StatementError::Failed(other.to_string()),
    }
}

fn bind_value<'q>(
    query: Query<'q, Postgres, PgArguments>,
    value: &SqlValue,
) -> Query<'q, Postgres, PgArguments> {
    match value {
        SqlValue::Null(ty) => match ty {
            SqlType::Bool => query.bind(None::<bool>),
            SqlType::Int => query.bind(None::<i64>),
            SqlType::Float => query.bind(None::<f64>),
            SqlType::Text => query.bind(None::<String>),
            SqlType::Bytes => query.bind(None::<Vec<u8>>),
            SqlType::Uuid => query.bind(None::<Uuid>),
            SqlType::Date => query.bind(None::<NaiveDate>),
            SqlType::Timestamp => query.bind(None::<DateTime<Utc>>),
        },
        SqlValue::Bool(b) => query.bind(*b),
        SqlValue::Int(n) => query.bind(*n),
        SqlValue::Float(x) => query.bind(*x),
        SqlValue::Text(s) => query.bind(s.clone()),
        SqlValue::Bytes(b) => query.bind(b.clone()),
        SqlValue::Uuid(u) => query.bind(*u),
        SqlValue::Date(d) => query.bind(*d),
        SqlValue::Timestamp(t) => query.bind(*t),
    }
}

fn decode_column(
    row: &PgRow,
    idx: usize,
    type_name: &str,
) -> Option<(SqlType, Result<Option<SqlValue>, sqlx::Error>)> {
    let decoded = match type_name {
        "BOOL" => (
            SqlType::Bool,
            row.try_get::<Option<bool>, _>(idx).map(|v| v.map(SqlValue::Bool)),
        ),
        "INT2" => (
            SqlType::Int,
            row.try_get::<Option<i16>, _>(idx)
                .map(|v| v.map(|n| SqlValue::Int(n.into()))),
        ),
        "INT4" => (
            SqlType::Int,
            row.try_get::<Option<i32>, _>(idx)
                .map(|v| v.map(|n| SqlValue::Int(n.into()))),
        ),
        "INT8" => (
            SqlType::Int,
            row.try_get::<Option<i64>, _>(idx).map(|v| v.map(SqlValue::Int)),
        ),
        "FLOAT4" => (
            SqlType::Float,
            row.try_get::<Option<f32>, _>(idx)
                .map(|v| v.map(|x| SqlValue::Float(x.into()))),
        ),
        "FLOAT8" => (
            SqlType::Float,
            row.try_get::<Option<f64>, _>(idx).map(|v| v.map(SqlValue::Float)),
        ),
        "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" => (
            SqlType::Text,
            row.try_get::<Option<String>, _>(idx).map(|v| v.map(SqlValue::Text)),
        ),
        "JSON" | "JSONB" => (
            SqlType::Text,
            row.try_get::<Option<JsonValue>, _>(idx)
                .map(|v| v.map(|json| SqlValue::Text(json.to_string()))),
        ),
        "BYTEA" => (
            SqlType::Bytes,
            row.try_get::<Option<Vec<u8>>, _>(idx).map(|v| v.map(SqlValue::Bytes)),
        ),
        "UUID" => (
            SqlType::Uuid,
            row.try_get::<Option<Uuid>, _>(idx).map(|v| v.map(SqlValue::Uuid)),
        ),
        "DATE" => (
            SqlType::Date,
            row.try_get::<Option<NaiveDate>, _>(idx).map(|v| v.map(SqlValue::Date)),
        ),
        "TIMESTAMPTZ" => (
            SqlType::Timestamp,
            row.try_get::<Option<DateTime<Utc>>, _>(idx)
                .map(|v| v.map(SqlValue::Timestamp)),
        ),
        "TIMESTAMP" => (
            SqlType::Timestamp,
            row.try_get::<Option<NaiveDateTime>, _>(idx)
                .map(|v| v.map(|t| SqlValue::Timestamp(t.and_utc()))),
        ),
        _ => return None,
    };
    Some(decoded)
}

fn decode_row(row: &PgRow) -> Result<SqlRow, StatementError> {
    let mut out = SqlRow::new();

    for column in row.columns() {
        let type_name = column.type_info().name();
        let Some((ty, decoded)) = decode_column(row, column.ordinal(), type_name) else {
            return Err(StatementError::Unsupported(format!(
                "column '{}' has type {type_name}; cast it to a supported type in the query",
                column.name()
            )));
        };

        let value = decoded
            .map_err(statement_error)?
            .unwrap_or(SqlValue::Null(ty));
        out.insert(column.name().to_owned(), value);
    }

    Ok(out)
}

#[async_trait]
impl ExecutionContext for PgContext {
    async fn execute(
        &mut self,
        statement: &str,
        params: &[SqlValue],
    ) -> Result<Vec<SqlRow>, StatementError> {
        let query = params
            .iter()
            .fold(sqlx::query(statement), |query, value| bind_value(query, value));

        let conn: &mut PgConnection = &mut self.conn;
        let rows = query
            .fetch_all(conn)
            .await
            .map_err(statement_error)?;

        rows.iter().map(decode_row).collect()
    }

    async fn batch(&mut self, script: &str) -> Result<(), StatementError> {
        let conn: &mut PgConnection = &mut self.conn;
        sqlx::Executor::execute(conn, sqlx::raw_sql(script))
            .await
            .map_err(statement_error)?;
        Ok(())
    }
}
