//! Dialect capability layer.
//!
//! Each supported database pairs two capabilities:
//!
//! - **Introspection**: reading the live catalog into a
//!   [`strata_schema::Schema`] value. These are inherent async methods
//!   on the dialect structs taking a `&mut` sqlx connection, so they
//!   run equally well inside or outside a transaction.
//! - **Emission**: the [`SqlGenerator`] trait translating a
//!   [`Change`] into one or more `;`-terminated SQL statements.
//!
//! Unsupported changes come back as [`DialectError::Unsupported`] with
//! a message naming the dialect and the limitation; nothing is emitted
//! silently.

mod error;
pub mod mysql;
pub mod postgres;
pub mod seed;
pub mod sqlite;

pub use error::DialectError;
pub use mysql::MySql;
pub use postgres::Postgres;
pub use seed::CsvImportOptions;
pub use sqlite::Sqlite;

use strata_schema::Change;

/// Name of the migration log table. It is engine state, not part of a
/// user schema, so every dialect's table listing excludes it.
pub const MIGRATIONS_TABLE: &str = "schema_migrations";

/// The databases strata can talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseType {
    Postgres,
    MySql,
    Sqlite,
}

impl DatabaseType {
    /// Lowercase driver name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Postgres => "postgresql",
            Self::MySql => "mysql",
            Self::Sqlite => "sqlite",
        }
    }

    /// The SQL generator for this database.
    #[must_use]
    pub fn generator(self) -> &'static dyn SqlGenerator {
        match self {
            Self::Postgres => &Postgres,
            Self::MySql => &MySql,
            Self::Sqlite => &Sqlite,
        }
    }
}

impl std::fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Translates schema changes into dialect-specific SQL.
pub trait SqlGenerator: Send + Sync {
    /// Lowercase dialect name for logs and errors.
    fn dialect_name(&self) -> &'static str;

    /// Emits the SQL statement(s) applying `change`, `;`-terminated.
    ///
    /// # Errors
    ///
    /// [`DialectError::Unsupported`] when the dialect cannot express
    /// the change.
    fn generate_sql(&self, change: &Change) -> Result<String, DialectError>;
}
