//! Versioned, transactional schema migrations.
//!
//! A [`Migration`] is a versioned pair of builders, each returning the
//! *complete* schema the database should have after applying (`up`) or
//! rolling back (`down`) the migration. The [`Migrator`] introspects
//! the live database, diffs it against the builder output, and applies
//! the resulting changes inside a single transaction per batch,
//! recording progress in the `schema_migrations` table.
//!
//! Migrations are registered programmatically — either on an explicit
//! [`Registry`] or through the process-global convenience layer
//! ([`set_migrations_dir`] + [`register`]):
//!
//! ```
//! use strata_migrate::{Migration, Registry};
//! use strata_schema::{ColumnType, Schema};
//!
//! let mut registry = Registry::new("./migrations");
//! registry.add(Migration::new(
//!     "20240101120000",
//!     "create_users",
//!     || {
//!         let mut s = Schema::new();
//!         s.create_table("users", |t| {
//!             t.column("id", ColumnType::Integer, &[]);
//!             t.set_primary_key("users_pkey", &["id"]);
//!         });
//!         s
//!     },
//!     Schema::new,
//! ));
//! ```

mod db;
mod error;
mod generator;
mod migrator;
mod registry;
mod tracker;

pub use db::Database;
pub use error::MigrateError;
pub use generator::Generator;
pub use migrator::{MigrationState, MigrationStatus, Migrator};
pub use registry::Registry;
pub use tracker::{MigrationRecord, VersionTracker};

use std::path::PathBuf;
use std::sync::{Arc, Mutex, OnceLock};

use strata_schema::Schema;

/// A schema-producing migration callback.
pub type SchemaFn = Arc<dyn Fn() -> Schema + Send + Sync>;

/// A named, versioned pair of up/down schema builders.
///
/// `version` is a 14-character `YYYYMMDDHHMMSS` timestamp, so
/// lexicographic order equals chronological order.
#[derive(Clone)]
pub struct Migration {
    pub version: String,
    pub name: String,
    up: SchemaFn,
    down: SchemaFn,
}

impl Migration {
    /// Creates a migration from its version, name and builders.
    pub fn new<U, D>(version: impl Into<String>, name: impl Into<String>, up: U, down: D) -> Self
    where
        U: Fn() -> Schema + Send + Sync + 'static,
        D: Fn() -> Schema + Send + Sync + 'static,
    {
        Self {
            version: version.into(),
            name: name.into(),
            up: Arc::new(up),
            down: Arc::new(down),
        }
    }

    /// The complete schema after applying this migration.
    #[must_use]
    pub fn up(&self) -> Schema {
        (self.up)()
    }

    /// The complete schema after rolling this migration back.
    #[must_use]
    pub fn down(&self) -> Schema {
        (self.down)()
    }

    /// `{version}_{name}`, the filename stem of this migration.
    #[must_use]
    pub fn full_version(&self) -> String {
        format!("{}_{}", self.version, self.name)
    }
}

impl std::fmt::Debug for Migration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Migration")
            .field("version", &self.version)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

static DEFAULT_REGISTRY: OnceLock<Mutex<Registry>> = OnceLock::new();

/// Initializes the process-global registry with a migrations
/// directory. The first call wins; later calls are no-ops.
pub fn set_migrations_dir(dir: impl Into<PathBuf>) {
    let _ = DEFAULT_REGISTRY.set(Mutex::new(Registry::new(dir)));
}

/// Registers a migration with the global registry.
///
/// # Errors
///
/// [`MigrateError::RegistryNotInitialized`] when [`set_migrations_dir`]
/// has not been called.
pub fn register<U, D>(
    version: impl Into<String>,
    name: impl Into<String>,
    up: U,
    down: D,
) -> Result<(), MigrateError>
where
    U: Fn() -> Schema + Send + Sync + 'static,
    D: Fn() -> Schema + Send + Sync + 'static,
{
    let registry = DEFAULT_REGISTRY
        .get()
        .ok_or(MigrateError::RegistryNotInitialized)?;
    registry
        .lock()
        .expect("default registry lock poisoned")
        .add(Migration::new(version, name, up, down));
    Ok(())
}

/// Returns a snapshot of the global registry.
///
/// # Errors
///
/// [`MigrateError::RegistryNotInitialized`] when [`set_migrations_dir`]
/// has not been called.
pub fn default_registry() -> Result<Registry, MigrateError> {
    let registry = DEFAULT_REGISTRY
        .get()
        .ok_or(MigrateError::RegistryNotInitialized)?;
    Ok(registry
        .lock()
        .expect("default registry lock poisoned")
        .clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    // The only test in this binary touching the process-global
    // registry, so the uninitialized state is observable.
    #[test]
    fn global_registry_is_one_shot() {
        assert!(matches!(
            default_registry(),
            Err(MigrateError::RegistryNotInitialized)
        ));
        assert!(register("20240101120000", "early", Schema::new, Schema::new).is_err());

        set_migrations_dir("./migrations_a");
        set_migrations_dir("./migrations_b"); // no-op after the first call

        register("20240101120000", "one", Schema::new, Schema::new).unwrap();
        let registry = default_registry().unwrap();
        assert_eq!(registry.migrations_dir(), Path::new("./migrations_a"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn migration_builders_run_lazily() {
        let migration = Migration::new(
            "20240101120000",
            "create_users",
            || {
                let mut s = Schema::new();
                s.create_table("users", |t| {
                    t.integer("id", &[]);
                });
                s
            },
            Schema::new,
        );

        assert_eq!(migration.full_version(), "20240101120000_create_users");
        assert_eq!(migration.up().tables.len(), 1);
        assert!(migration.down().tables.is_empty());
    }
}
