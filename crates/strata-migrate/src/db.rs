//! Database handles.

use sqlx::mysql::MySqlPoolOptions;
use sqlx::postgres::PgPoolOptions;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{MySqlPool, PgPool, SqlitePool};
use strata_dialect::{DatabaseType, SqlGenerator};

use crate::MigrateError;

/// A connected database, one pool per process.
///
/// The URL prefix selects the driver: `postgres://` (or
/// `postgresql://`), `mysql://`, `sqlite://`. Anything else fails
/// fast.
#[derive(Debug, Clone)]
pub enum Database {
    Postgres(PgPool),
    MySql(MySqlPool),
    Sqlite(SqlitePool),
}

impl Database {
    /// Connects to the database named by `url`.
    pub async fn connect(url: &str) -> Result<Self, MigrateError> {
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            let pool = PgPoolOptions::new().max_connections(5).connect(url).await?;
            Ok(Self::Postgres(pool))
        } else if url.starts_with("mysql://") {
            let pool = MySqlPoolOptions::new().max_connections(5).connect(url).await?;
            Ok(Self::MySql(pool))
        } else if url.starts_with("sqlite:") {
            let pool = SqlitePoolOptions::new().max_connections(1).connect(url).await?;
            Ok(Self::Sqlite(pool))
        } else {
            Err(MigrateError::UnsupportedUrl(url.to_string()))
        }
    }

    /// Which engine this handle talks to.
    #[must_use]
    pub fn database_type(&self) -> DatabaseType {
        match self {
            Self::Postgres(_) => DatabaseType::Postgres,
            Self::MySql(_) => DatabaseType::MySql,
            Self::Sqlite(_) => DatabaseType::Sqlite,
        }
    }

    /// The SQL generator for this database.
    #[must_use]
    pub fn generator(&self) -> &'static dyn SqlGenerator {
        self.database_type().generator()
    }
}
