//! The set of known migrations, keyed and ordered by name.
//!
//! Migration authors encode application order entirely in the name, so the
//! order is byte-wise lexicographic: `"010_x"` sorts before `"2_y"`.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use migrations::Migration;
use tracing::debug;

use crate::script::SqlScriptMigration;
use crate::MigrateError;

/// Longest name the ledger's `name` column accepts.
pub const MAX_NAME_LEN: usize = 255;

/// Script files whose stem starts with this are shared artifacts (templates,
/// docs), never migrations.
pub const RESERVED_PREFIX: char = '_';

const SCRIPT_EXTENSION: &str = "sql";

/// Explicit name → migration mapping.
#[derive(Default, Clone)]
pub struct MigrationRegistry {
    migrations: BTreeMap<String, Arc<dyn Migration>>,
}

impl MigrationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every migration compiled into the binary.
    pub fn builtin() -> Result<Self, MigrateError> {
        let mut registry = Self::new();
        for (name, migration) in migrations::builtin::all() {
            registry.register(name, migration)?;
        }
        Ok(registry)
    }

    /// Add `migration` under `name`.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        migration: Arc<dyn Migration>,
    ) -> Result<(), MigrateError> {
        let name = name.into();
        validate_name(&name)?;

        if self.migrations.contains_key(&name) {
            return Err(MigrateError::DuplicateDefinition(name));
        }
        self.migrations.insert(name, migration);
        Ok(())
    }

    /// Register every `*.sql` script in `dir`, named after its file stem.
    ///
    /// Other files, and scripts whose stem starts with [`RESERVED_PREFIX`],
    /// are skipped. Returns the number of scripts registered.
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize, MigrateError> {
        let entries = fs::read_dir(dir).map_err(|e| {
            MigrateError::Script(format!("failed to read {}: {e}", dir.display()))
        })?;

        let mut loaded = 0;
        for entry in entries {
            let path = entry
                .map_err(|e| MigrateError::Script(format!("failed to read directory entry: {e}")))?
                .path();

            if !path.is_file()
                || path.extension().and_then(|s| s.to_str()) != Some(SCRIPT_EXTENSION)
            {
                continue;
            }

            let name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .ok_or_else(|| {
                    MigrateError::Script(format!("non UTF-8 file name: {}", path.display()))
                })?
                .to_owned();

            if name.starts_with(RESERVED_PREFIX) {
                debug!("skipping reserved script {}", path.display());
                continue;
            }

            let migration = SqlScriptMigration::from_file(&path)?;
            self.register(name, Arc::new(migration))?;
            loaded += 1;
        }

        debug!("loaded {} script migrations from {}", loaded, dir.display());
        Ok(loaded)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Migration>> {
        self.migrations.get(name)
    }

    /// Migrations in application order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn Migration>)> {
        self.migrations.iter().map(|(name, m)| (name.as_str(), m))
    }

    /// Names in application order.
    pub fn names(&self) -> Vec<&str> {
        self.migrations.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }
}

fn validate_name(name: &str) -> Result<(), MigrateError> {
    let reason = if name.is_empty() {
        Some("name is empty")
    } else if name.len() > MAX_NAME_LEN {
        Some("name is longer than 255 bytes")
    } else if name.chars().any(|c| c.is_whitespace() || c == '/' || c == '\\') {
        Some("name contains whitespace or a path separator")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(MigrateError::InvalidName {
            name: name.to_owned(),
            reason,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use migrations::mock::{CallJournal, MockMigration};
    use std::fs::write;
    use tempfile::TempDir;

    fn mock(name: &str, journal: &CallJournal) -> Arc<dyn Migration> {
        Arc::new(MockMigration::succeeding(name, journal))
    }

    #[test]
    fn names_sort_bytewise_not_numerically() {
        let journal = CallJournal::default();
        let mut registry = MigrationRegistry::new();
        for name in ["2_d", "010_c", "001_a", "002_b"] {
            registry.register(name, mock(name, &journal)).unwrap();
        }
        assert_eq!(registry.names(), vec!["001_a", "002_b", "010_c", "2_d"]);
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let journal = CallJournal::default();
        let mut registry = MigrationRegistry::new();
        registry.register("001_a", mock("001_a", &journal)).unwrap();

        let err = registry.register("001_a", mock("001_a", &journal)).unwrap_err();
        assert!(matches!(err, MigrateError::DuplicateDefinition(ref n) if n == "001_a"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn invalid_names_are_rejected() {
        let journal = CallJournal::default();
        let mut registry = MigrationRegistry::new();
        let too_long = "x".repeat(256);
        for bad in ["", "001 create", "nested/001", too_long.as_str()] {
            let err = registry.register(bad, mock(bad, &journal)).unwrap_err();
            assert!(matches!(err, MigrateError::InvalidName { .. }), "{bad:?}");
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn builtin_registry_contains_workers_table() {
        let registry = MigrationRegistry::builtin().unwrap();
        assert_eq!(registry.names(), vec!["001_create_workers_table"]);
    }

    #[test]
    fn load_dir_skips_reserved_and_foreign_files() {
        let dir = TempDir::new().unwrap();
        write(dir.path().join("002_add_col.sql"), "ALTER TABLE t ADD c INT;\n-- down\nALTER TABLE t DROP c;").unwrap();
        write(dir.path().join("001_create_t.sql"), "CREATE TABLE t (id INT);").unwrap();
        write(dir.path().join("_template.sql"), "-- up\n-- down\n").unwrap();
        write(dir.path().join("README.md"), "# migrations").unwrap();

        let mut registry = MigrationRegistry::new();
        let loaded = registry.load_dir(dir.path()).unwrap();

        assert_eq!(loaded, 2);
        assert_eq!(registry.names(), vec!["001_create_t", "002_add_col"]);
    }

    #[test]
    fn load_dir_conflicting_with_builtin_is_rejected() {
        let dir = TempDir::new().unwrap();
        write(dir.path().join("001_create_workers_table.sql"), "SELECT 1;").unwrap();

        let mut registry = MigrationRegistry::builtin().unwrap();
        let err = registry.load_dir(dir.path()).unwrap_err();
        assert!(matches!(err, MigrateError::DuplicateDefinition(_)));
    }

    #[test]
    fn load_dir_reports_missing_directory() {
        let mut registry = MigrationRegistry::new();
        let err = registry.load_dir(Path::new("/does/not/exist")).unwrap_err();
        assert!(matches!(err, MigrateError::Script(_)));
    }
}
