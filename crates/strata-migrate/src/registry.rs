//! The migration registry.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::debug;

use crate::{Migration, MigrateError};

/// An ordered collection of migrations plus the directory their files
/// live in.
///
/// Registration is programmatic: [`Registry::load_from_directory`]
/// only enumerates what is on disk so tooling can report it — file
/// contents are never interpreted at runtime.
#[derive(Debug, Clone)]
pub struct Registry {
    migrations: Vec<Migration>,
    migrations_dir: PathBuf,
}

impl Registry {
    /// Creates an empty registry rooted at a migrations directory.
    #[must_use]
    pub fn new(migrations_dir: impl Into<PathBuf>) -> Self {
        Self {
            migrations: Vec::new(),
            migrations_dir: migrations_dir.into(),
        }
    }

    /// Adds a migration.
    pub fn add(&mut self, migration: Migration) {
        self.migrations.push(migration);
    }

    /// Finds a migration by its version string.
    #[must_use]
    pub fn find_by_version(&self, version: &str) -> Option<&Migration> {
        self.migrations.iter().find(|m| m.version == version)
    }

    /// All migrations sorted by version ascending.
    #[must_use]
    pub fn sorted(&self) -> Vec<Migration> {
        let mut migrations = self.migrations.clone();
        migrations.sort_by(|a, b| a.version.cmp(&b.version));
        migrations
    }

    /// Number of registered migrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    /// True when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }

    /// The directory migration files are generated into.
    #[must_use]
    pub fn migrations_dir(&self) -> &Path {
        &self.migrations_dir
    }

    /// Enumerates migration files (`{14-digit-version}_{name}.rs`) in
    /// the migrations directory, creating the directory if missing.
    ///
    /// Migrations must still be registered programmatically; this only
    /// reports what exists on disk.
    pub fn load_from_directory(&self) -> Result<Vec<PathBuf>, MigrateError> {
        if !self.migrations_dir.exists() {
            std::fs::create_dir_all(&self.migrations_dir)?;
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in std::fs::read_dir(&self.migrations_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_dir() {
                continue;
            }
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if is_migration_file(file_name) {
                files.push(path);
            }
        }
        files.sort();
        debug!(count = files.len(), dir = %self.migrations_dir.display(), "migration files on disk");
        Ok(files)
    }

    /// Generates a `YYYYMMDDHHMMSS` version stamp for a new migration.
    #[must_use]
    pub fn generate_version() -> String {
        Utc::now().format("%Y%m%d%H%M%S").to_string()
    }
}

/// True for file names shaped `{14-digit-version}_{name}.rs`.
fn is_migration_file(file_name: &str) -> bool {
    let Some(stem) = file_name.strip_suffix(".rs") else {
        return false;
    };
    let mut chars = stem.chars();
    let version: String = chars.by_ref().take(14).collect();
    version.len() == 14
        && version.chars().all(|c| c.is_ascii_digit())
        && chars.next() == Some('_')
}
