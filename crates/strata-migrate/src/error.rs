//! Migration runtime errors.

use std::path::PathBuf;

use strata_dialect::DialectError;

/// Errors from the migration runtime.
#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    /// The registry holds no migrations.
    #[error("no migrations registered")]
    NoMigrations,

    /// Rollback was requested but nothing has been applied.
    #[error("no migrations to roll back")]
    NothingToRollback,

    /// A version recorded in the tracker is missing from the registry.
    #[error("migration version {0} is recorded as applied but missing from the registry")]
    UnknownVersion(String),

    /// The database URL does not carry a supported driver prefix.
    #[error("unsupported database URL {0:?}: expected postgres://, mysql:// or sqlite://")]
    UnsupportedUrl(String),

    /// The global registry was used before `set_migrations_dir`.
    #[error("migrations directory not set; call set_migrations_dir first")]
    RegistryNotInitialized,

    /// The generator refused to overwrite an existing migration file.
    #[error("migration file already exists: {0}")]
    MigrationExists(PathBuf),

    /// The dialect could not introspect or emit SQL.
    #[error(transparent)]
    Dialect(#[from] DialectError),

    /// Any other driver error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Filesystem error while generating or listing migration files.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
