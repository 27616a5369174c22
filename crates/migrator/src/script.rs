//! Plain SQL migrations loaded from `.sql` files.
//!
//! File layout:
//!
//! ```sql
//! -- up
//! CREATE TABLE example (id INT PRIMARY KEY);
//!
//! -- down
//! DROP TABLE example;
//! ```
//!
//! The `-- up` marker is optional; everything before `-- down` is the up
//! script. Markers are matched case-insensitively on their own line.

use std::fs;
use std::path::Path;

use async_trait::async_trait;
use migrations::{ExecutionContext, Migration, StatementError};

use crate::MigrateError;

/// A migration whose halves are SQL scripts run with a single `batch` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlScriptMigration {
    pub up_sql: String,
    pub down_sql: String,
}

fn is_marker(line: &str, marker: &str) -> bool {
    line.trim()
        .strip_prefix("--")
        .map(|rest| rest.trim().eq_ignore_ascii_case(marker))
        .unwrap_or(false)
}

impl SqlScriptMigration {
    /// Split script text into its up and down halves.
    pub fn parse(content: &str) -> Result<Self, MigrateError> {
        let mut up = Vec::new();
        let mut down = Vec::new();
        let mut in_down = false;

        for line in content.lines() {
            if is_marker(line, "down") {
                if in_down {
                    return Err(MigrateError::Script(
                        "more than one '-- down' marker".to_string(),
                    ));
                }
                in_down = true;
                continue;
            }
            if !in_down && is_marker(line, "up") {
                continue;
            }
            if in_down {
                down.push(line);
            } else {
                up.push(line);
            }
        }

        let up_sql = up.join("\n").trim().to_string();
        let down_sql = down.join("\n").trim().to_string();

        if up_sql.is_empty() {
            return Err(MigrateError::Script("migration has no up SQL".to_string()));
        }

        Ok(Self { up_sql, down_sql })
    }

    /// Read and parse a script file.
    pub fn from_file(path: &Path) -> Result<Self, MigrateError> {
        let content = fs::read_to_string(path).map_err(|e| {
            MigrateError::Script(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::parse(&content)
            .map_err(|e| MigrateError::Script(format!("{}: {e}", path.display())))
    }
}

#[async_trait]
impl Migration for SqlScriptMigration {
    async fn up(&self, ctx: &mut dyn ExecutionContext) -> Result<(), StatementError> {
        ctx.batch(&self.up_sql).await
    }

    async fn down(&self, ctx: &mut dyn ExecutionContext) -> Result<(), StatementError> {
        // Nothing to undo is a valid down half.
        if self.down_sql.is_empty() {
            return Ok(());
        }
        ctx.batch(&self.down_sql).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_markers() {
        let m = SqlScriptMigration::parse(
            "-- Up\nCREATE TABLE t (id INT);\n\n-- Down\nDROP TABLE t;\n",
        )
        .unwrap();
        assert_eq!(m.up_sql, "CREATE TABLE t (id INT);");
        assert_eq!(m.down_sql, "DROP TABLE t;");
    }

    #[test]
    fn up_marker_is_optional() {
        let m = SqlScriptMigration::parse("CREATE TABLE t (id INT);").unwrap();
        assert_eq!(m.up_sql, "CREATE TABLE t (id INT);");
        assert!(m.down_sql.is_empty());
    }

    #[test]
    fn ordinary_comments_are_kept() {
        let m = SqlScriptMigration::parse("-- up\n-- keep me\nSELECT 1;\n-- down\n").unwrap();
        assert_eq!(m.up_sql, "-- keep me\nSELECT 1;");
    }

    #[test]
    fn empty_up_is_rejected() {
        let err = SqlScriptMigration::parse("-- up\n\n-- down\nDROP TABLE t;").unwrap_err();
        assert!(matches!(err, MigrateError::Script(_)));
    }

    #[test]
    fn second_down_marker_is_rejected() {
        assert!(SqlScriptMigration::parse("SELECT 1;\n-- down\nSELECT 2;\n-- down\n").is_err());
    }
}
