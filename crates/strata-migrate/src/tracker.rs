//! The version tracker: the `schema_migrations` log inside the target
//! database.

use chrono::{NaiveDateTime, Utc};
use strata_dialect::DatabaseType;

use crate::{Database, MigrateError};

/// DDL for the migration log, portable across all three dialects.
pub const CREATE_MIGRATIONS_TABLE: &str = "CREATE TABLE IF NOT EXISTS schema_migrations (\
     version VARCHAR(255) PRIMARY KEY, \
     name VARCHAR(255) NOT NULL, \
     applied_at TIMESTAMP NOT NULL)";

pub(crate) const INSERT_MIGRATION: &str =
    "INSERT INTO schema_migrations (version, name, applied_at) VALUES (?, ?, ?)";
pub(crate) const INSERT_MIGRATION_PG: &str =
    "INSERT INTO schema_migrations (version, name, applied_at) VALUES ($1, $2, $3)";
pub(crate) const DELETE_MIGRATION: &str = "DELETE FROM schema_migrations WHERE version = ?";
pub(crate) const DELETE_MIGRATION_PG: &str = "DELETE FROM schema_migrations WHERE version = $1";

const SELECT_APPLIED: &str =
    "SELECT version, name, applied_at FROM schema_migrations ORDER BY version";
const SELECT_CURRENT: &str =
    "SELECT version FROM schema_migrations ORDER BY version DESC LIMIT 1";

/// One row of the migration log.
#[derive(Debug, Clone, PartialEq)]
pub struct MigrationRecord {
    pub version: String,
    pub name: String,
    pub applied_at: NaiveDateTime,
}

/// Reads and writes the `schema_migrations` table.
#[derive(Debug, Clone)]
pub struct VersionTracker {
    db: Database,
}

impl VersionTracker {
    /// Creates a tracker over a connected database.
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Creates the migration log table if it does not exist.
    pub async fn ensure_table(&self) -> Result<(), MigrateError> {
        match &self.db {
            Database::Postgres(pool) => {
                sqlx::query(CREATE_MIGRATIONS_TABLE).execute(pool).await?;
            }
            Database::MySql(pool) => {
                sqlx::query(CREATE_MIGRATIONS_TABLE).execute(pool).await?;
            }
            Database::Sqlite(pool) => {
                sqlx::query(CREATE_MIGRATIONS_TABLE).execute(pool).await?;
            }
        }
        Ok(())
    }

    /// All applied migrations, ordered by version ascending.
    pub async fn applied_migrations(&self) -> Result<Vec<MigrationRecord>, MigrateError> {
        type Row = (String, String, NaiveDateTime);
        let rows: Vec<Row> = match &self.db {
            Database::Postgres(pool) => {
                sqlx::query_as(SELECT_APPLIED).fetch_all(pool).await?
            }
            Database::MySql(pool) => sqlx::query_as(SELECT_APPLIED).fetch_all(pool).await?,
            Database::Sqlite(pool) => sqlx::query_as(SELECT_APPLIED).fetch_all(pool).await?,
        };
        Ok(rows
            .into_iter()
            .map(|(version, name, applied_at)| MigrationRecord { version, name, applied_at })
            .collect())
    }

    /// Records a migration as applied at the current wall-clock time.
    pub async fn record(&self, version: &str, name: &str) -> Result<(), MigrateError> {
        let now = Utc::now().naive_utc();
        match &self.db {
            Database::Postgres(pool) => {
                sqlx::query(INSERT_MIGRATION_PG)
                    .bind(version)
                    .bind(name)
                    .bind(now)
                    .execute(pool)
                    .await?;
            }
            Database::MySql(pool) => {
                sqlx::query(INSERT_MIGRATION)
                    .bind(version)
                    .bind(name)
                    .bind(now)
                    .execute(pool)
                    .await?;
            }
            Database::Sqlite(pool) => {
                sqlx::query(INSERT_MIGRATION)
                    .bind(version)
                    .bind(name)
                    .bind(now)
                    .execute(pool)
                    .await?;
            }
        }
        Ok(())
    }

    /// Deletes one migration record.
    pub async fn remove(&self, version: &str) -> Result<(), MigrateError> {
        match &self.db {
            Database::Postgres(pool) => {
                sqlx::query(DELETE_MIGRATION_PG).bind(version).execute(pool).await?;
            }
            Database::MySql(pool) => {
                sqlx::query(DELETE_MIGRATION).bind(version).execute(pool).await?;
            }
            Database::Sqlite(pool) => {
                sqlx::query(DELETE_MIGRATION).bind(version).execute(pool).await?;
            }
        }
        Ok(())
    }

    /// The highest applied version, or `None` before the first
    /// migration.
    pub async fn current_version(&self) -> Result<Option<String>, MigrateError> {
        let version: Option<(String,)> = match &self.db {
            Database::Postgres(pool) => {
                sqlx::query_as(SELECT_CURRENT).fetch_optional(pool).await?
            }
            Database::MySql(pool) => sqlx::query_as(SELECT_CURRENT).fetch_optional(pool).await?,
            Database::Sqlite(pool) => {
                sqlx::query_as(SELECT_CURRENT).fetch_optional(pool).await?
            }
        };
        Ok(version.map(|(v,)| v))
    }

    /// True when the version has been applied.
    pub async fn has(&self, version: &str) -> Result<bool, MigrateError> {
        let count: (i64,) = match &self.db {
            Database::Postgres(pool) => {
                sqlx::query_as("SELECT COUNT(*) FROM schema_migrations WHERE version = $1")
                    .bind(version)
                    .fetch_one(pool)
                    .await?
            }
            Database::MySql(pool) => {
                sqlx::query_as("SELECT COUNT(*) FROM schema_migrations WHERE version = ?")
                    .bind(version)
                    .fetch_one(pool)
                    .await?
            }
            Database::Sqlite(pool) => {
                sqlx::query_as("SELECT COUNT(*) FROM schema_migrations WHERE version = ?")
                    .bind(version)
                    .fetch_one(pool)
                    .await?
            }
        };
        Ok(count.0 > 0)
    }

    /// Which engine the tracked database runs on.
    #[must_use]
    pub fn database_type(&self) -> DatabaseType {
        self.db.database_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_tracker() -> VersionTracker {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await
            .expect("in-memory SQLite pool");
        VersionTracker::new(Database::Sqlite(pool))
    }

    #[tokio::test]
    async fn ensure_table_is_idempotent() {
        let tracker = test_tracker().await;
        tracker.ensure_table().await.unwrap();
        tracker.ensure_table().await.unwrap();
    }

    #[tokio::test]
    async fn record_and_read_back() {
        let tracker = test_tracker().await;
        tracker.ensure_table().await.unwrap();

        assert!(tracker.applied_migrations().await.unwrap().is_empty());
        assert_eq!(tracker.current_version().await.unwrap(), None);

        tracker.record("20240101120000", "create_users").await.unwrap();
        tracker.record("20240201120000", "create_posts").await.unwrap();

        let applied = tracker.applied_migrations().await.unwrap();
        assert_eq!(applied.len(), 2);
        assert_eq!(applied[0].version, "20240101120000");
        assert_eq!(applied[0].name, "create_users");
        assert_eq!(applied[1].version, "20240201120000");

        assert_eq!(
            tracker.current_version().await.unwrap().as_deref(),
            Some("20240201120000")
        );
        assert!(tracker.has("20240101120000").await.unwrap());
        assert!(!tracker.has("20990101120000").await.unwrap());
    }

    #[tokio::test]
    async fn remove_deletes_one_row() {
        let tracker = test_tracker().await;
        tracker.ensure_table().await.unwrap();

        tracker.record("20240101120000", "create_users").await.unwrap();
        tracker.record("20240201120000", "create_posts").await.unwrap();
        tracker.remove("20240201120000").await.unwrap();

        let applied = tracker.applied_migrations().await.unwrap();
        assert_eq!(applied.len(), 1);
        assert_eq!(applied[0].version, "20240101120000");
        assert_eq!(
            tracker.current_version().await.unwrap().as_deref(),
            Some("20240101120000")
        );
    }

    #[tokio::test]
    async fn database_type_reflects_driver() {
        let tracker = test_tracker().await;
        assert_eq!(tracker.database_type(), DatabaseType::Sqlite);
    }
}
