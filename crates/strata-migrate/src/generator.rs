//! Migration file generation.

use std::path::PathBuf;

use crate::{MigrateError, Registry};

const MIGRATION_TEMPLATE: &str = r#"//! Migration: __NAME__.

use strata_migrate::{register, MigrateError};
use strata_schema::Schema;

/// Registers this migration with the default registry. Call once
/// during startup, after `set_migrations_dir`.
pub fn register_migration() -> Result<(), MigrateError> {
    register("__VERSION__", "__NAME__", up, down)
}

/// The complete schema after this migration is applied.
fn up() -> Schema {
    let mut schema = Schema::new();
    // schema.create_table("example", |t| {
    //     t.column("id", ColumnType::Integer, &[]);
    //     t.set_primary_key("example_pkey", &["id"]);
    // });
    schema
}

/// The complete schema after this migration is rolled back.
fn down() -> Schema {
    Schema::new()
}
"#;

/// Writes new migration file stubs into a registry's migrations
/// directory.
#[derive(Debug)]
pub struct Generator<'a> {
    registry: &'a Registry,
}

impl<'a> Generator<'a> {
    /// Creates a generator for the registry's migrations directory.
    #[must_use]
    pub fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }

    /// Creates `{version}_{name}.rs` from the stub template and
    /// returns its path. Refuses to overwrite an existing file.
    pub fn generate(&self, name: &str) -> Result<PathBuf, MigrateError> {
        let name = name.trim().to_lowercase().replace(' ', "_");
        let version = Registry::generate_version();

        let dir = self.registry.migrations_dir();
        std::fs::create_dir_all(dir)?;

        let path = dir.join(format!("{version}_{name}.rs"));
        if path.exists() {
            return Err(MigrateError::MigrationExists(path));
        }

        let contents = MIGRATION_TEMPLATE
            .replace("__VERSION__", &version)
            .replace("__NAME__", &name);
        std::fs::write(&path, contents)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_a_stub_file() {
        let dir = tempfile::tempdir().unwrap();
        let registry = Registry::new(dir.path());
        let generator = Generator::new(&registry);

        let path = generator.generate("Create Users").unwrap();
        let file_name = path.file_name().unwrap().to_str().unwrap();
        assert!(file_name.ends_with("_create_users.rs"));
        assert_eq!(file_name.len(), "00000000000000_create_users.rs".len());

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("register("));
        assert!(contents.contains("\"create_users\""));
        assert!(contents.contains("fn up() -> Schema"));
        assert!(contents.contains("fn down() -> Schema"));

        // The generated file shows up in the directory listing.
        let files = registry.load_from_directory().unwrap();
        assert_eq!(files, vec![path]);
    }

    #[test]
    fn listing_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("migrations");
        let registry = Registry::new(&nested);
        assert!(registry.load_from_directory().unwrap().is_empty());
        assert!(nested.is_dir());
    }
}
