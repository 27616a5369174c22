//! Database-agnostic statement parameters and result cells.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

/// Column type of a value, carried by [`SqlValue::Null`] so a NULL parameter
/// can be bound with the type its target column expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Bool,
    Int,
    Float,
    Text,
    Bytes,
    Uuid,
    Date,
    Timestamp,
}

/// A single bound parameter or returned column value.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null(SqlType),
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Uuid(Uuid),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
}

/// One result row, keyed by column name.
pub type SqlRow = BTreeMap<String, SqlValue>;

impl SqlValue {
    /// A NULL of the given column type.
    pub fn null(ty: SqlType) -> Self {
        SqlValue::Null(ty)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null(_))
    }

    pub fn sql_type(&self) -> SqlType {
        match self {
            SqlValue::Null(ty) => *ty,
            SqlValue::Bool(_) => SqlType::Bool,
            SqlValue::Int(_) => SqlType::Int,
            SqlValue::Float(_) => SqlType::Float,
            SqlValue::Text(_) => SqlType::Text,
            SqlValue::Bytes(_) => SqlType::Bytes,
            SqlValue::Uuid(_) => SqlType::Uuid,
            SqlValue::Date(_) => SqlType::Date,
            SqlValue::Timestamp(_) => SqlType::Timestamp,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SqlValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SqlValue::Int(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null(_) => write!(f, "NULL"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => write!(f, "'{s}'"),
            Self::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            Self::Uuid(u) => write!(f, "{u}"),
            Self::Date(d) => write!(f, "{d}"),
            Self::Timestamp(t) => write!(f, "{}", t.to_rfc3339()),
        }
    }
}

/// Rust types with a fixed [`SqlType`]; lets `None::<T>` become a typed NULL.
pub trait HasSqlType {
    const SQL_TYPE: SqlType;
}

macro_rules! sql_value_from {
    ($($ty:ty => $sql:ident, |$v:ident| $conv:expr;)*) => {
        $(
            impl From<$ty> for SqlValue {
                fn from($v: $ty) -> Self {
                    SqlValue::$sql($conv)
                }
            }

            impl HasSqlType for $ty {
                const SQL_TYPE: SqlType = SqlType::$sql;
            }
        )*
    };
}

sql_value_from! {
    &str => Text, |s| s.to_owned();
    String => Text, |s| s;
    i64 => Int, |n| n;
    i32 => Int, |n| n.into();
    bool => Bool, |b| b;
    f64 => Float, |x| x;
    Vec<u8> => Bytes, |b| b;
    Uuid => Uuid, |u| u;
    NaiveDate => Date, |d| d;
    DateTime<Utc> => Timestamp, |t| t;
}

impl<T: Into<SqlValue> + HasSqlType> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(SqlValue::Null(T::SQL_TYPE))
    }
}
