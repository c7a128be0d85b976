//! The migration runner.
//!
//! Each `migrate`/`rollback` call is one transaction. For every
//! migration in the batch the runner introspects the live schema
//! (inside the transaction, so the snapshot is consistent with the
//! changes already executed), diffs it against the migration's
//! builder output, emits SQL through the database's dialect, executes
//! it, and updates the migration log. Any error rolls the whole batch
//! back.

use std::collections::{HashMap, HashSet};

use chrono::{NaiveDateTime, Utc};
use sqlx::{MySqlPool, PgPool, SqlitePool};
use strata_dialect::{MySql, Postgres, Sqlite, SqlGenerator};
use strata_schema::{diff, Schema};
use tracing::{debug, info};

use crate::tracker::{DELETE_MIGRATION, DELETE_MIGRATION_PG, INSERT_MIGRATION, INSERT_MIGRATION_PG};
use crate::{Database, Migration, MigrateError, Registry, VersionTracker};

/// Whether a migration has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationState {
    Pending,
    Applied,
}

impl std::fmt::Display for MigrationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => f.write_str("Pending"),
            Self::Applied => f.write_str("Applied"),
        }
    }
}

/// One row of `Migrator::status` output.
#[derive(Debug, Clone, PartialEq)]
pub struct MigrationStatus {
    pub version: String,
    pub name: String,
    pub state: MigrationState,
    pub applied_at: Option<NaiveDateTime>,
}

/// Applies and rolls back migrations against a connected database.
pub struct Migrator {
    db: Database,
    registry: Registry,
    tracker: VersionTracker,
}

impl Migrator {
    /// Creates a migrator over a database and a registry.
    #[must_use]
    pub fn new(db: Database, registry: Registry) -> Self {
        let tracker = VersionTracker::new(db.clone());
        Self { db, registry, tracker }
    }

    /// The migration log tracker.
    #[must_use]
    pub fn tracker(&self) -> &VersionTracker {
        &self.tracker
    }

    /// Ensures the migration log table exists.
    pub async fn init(&self) -> Result<(), MigrateError> {
        self.tracker.ensure_table().await
    }

    /// Applies pending migrations in version order, up to
    /// `target_version` inclusive (all of them when `None`), inside
    /// one transaction.
    pub async fn migrate(&self, target_version: Option<&str>) -> Result<(), MigrateError> {
        self.init().await?;

        let migrations = self.registry.sorted();
        if migrations.is_empty() {
            return Err(MigrateError::NoMigrations);
        }

        let applied = self.tracker.applied_migrations().await?;
        let applied_versions: HashSet<&str> =
            applied.iter().map(|r| r.version.as_str()).collect();

        let pending: Vec<Migration> = migrations
            .into_iter()
            .filter(|m| !applied_versions.contains(m.version.as_str()))
            .filter(|m| target_version.map_or(true, |v| m.version.as_str() <= v))
            .collect();
        if pending.is_empty() {
            info!("nothing to migrate");
            return Ok(());
        }

        // Before the first-ever migration there is nothing worth
        // introspecting; start from the empty schema.
        let bootstrap = applied.is_empty();
        match &self.db {
            Database::Postgres(pool) => migrate_postgres(pool, &pending, bootstrap).await,
            Database::MySql(pool) => migrate_mysql(pool, &pending, bootstrap).await,
            Database::Sqlite(pool) => migrate_sqlite(pool, &pending, bootstrap).await,
        }
    }

    /// Rolls back the last `steps` applied migrations (all of them
    /// when `steps` exceeds the applied count), newest first, inside
    /// one transaction.
    pub async fn rollback(&self, steps: usize) -> Result<(), MigrateError> {
        self.init().await?;

        let applied = self.tracker.applied_migrations().await?;
        if applied.is_empty() {
            return Err(MigrateError::NothingToRollback);
        }
        let steps = steps.max(1).min(applied.len());

        let mut batch = Vec::with_capacity(steps);
        for record in applied.iter().rev().take(steps) {
            let migration = self
                .registry
                .find_by_version(&record.version)
                .ok_or_else(|| MigrateError::UnknownVersion(record.version.clone()))?;
            batch.push(migration.clone());
        }

        match &self.db {
            Database::Postgres(pool) => rollback_postgres(pool, &batch).await,
            Database::MySql(pool) => rollback_mysql(pool, &batch).await,
            Database::Sqlite(pool) => rollback_sqlite(pool, &batch).await,
        }
    }

    /// Crosses the registry with the migration log into a flat status
    /// list, version ascending.
    pub async fn status(&self) -> Result<Vec<MigrationStatus>, MigrateError> {
        self.init().await?;

        let applied: HashMap<String, NaiveDateTime> = self
            .tracker
            .applied_migrations()
            .await?
            .into_iter()
            .map(|r| (r.version, r.applied_at))
            .collect();

        Ok(self
            .registry
            .sorted()
            .into_iter()
            .map(|m| {
                let applied_at = applied.get(&m.version).copied();
                MigrationStatus {
                    version: m.version,
                    name: m.name,
                    state: if applied_at.is_some() {
                        MigrationState::Applied
                    } else {
                        MigrationState::Pending
                    },
                    applied_at,
                }
            })
            .collect())
    }
}

macro_rules! run_batch {
    ($pool:expr, $batch:expr, $bootstrap:expr, $dialect:ty, $dialect_value:expr,
     $insert:expr, $delete:expr, $forward:expr) => {{
        let mut tx = $pool.begin().await?;
        let mut bootstrap = $bootstrap;
        for migration in $batch {
            if $forward {
                info!(version = %migration.version, name = %migration.name, "migrating up");
            } else {
                info!(version = %migration.version, name = %migration.name, "rolling back");
            }

            let current = if bootstrap {
                Schema::new()
            } else {
                <$dialect>::introspect(&mut *tx).await?
            };
            bootstrap = false;

            let target = if $forward { migration.up() } else { migration.down() };
            for change in diff(&current, &target) {
                let sql = $dialect_value.generate_sql(&change)?;
                debug!(change = %change, sql = %sql, "executing");
                sqlx::raw_sql(&sql).execute(&mut *tx).await?;
            }

            if $forward {
                sqlx::query($insert)
                    .bind(&migration.version)
                    .bind(&migration.name)
                    .bind(Utc::now().naive_utc())
                    .execute(&mut *tx)
                    .await?;
            } else {
                sqlx::query($delete)
                    .bind(&migration.version)
                    .execute(&mut *tx)
                    .await?;
            }
        }
        tx.commit().await?;
        Ok(())
    }};
}

async fn migrate_postgres(
    pool: &PgPool,
    pending: &[Migration],
    bootstrap: bool,
) -> Result<(), MigrateError> {
    run_batch!(pool, pending, bootstrap, Postgres, Postgres, INSERT_MIGRATION_PG, DELETE_MIGRATION_PG, true)
}

async fn rollback_postgres(pool: &PgPool, batch: &[Migration]) -> Result<(), MigrateError> {
    run_batch!(pool, batch, false, Postgres, Postgres, INSERT_MIGRATION_PG, DELETE_MIGRATION_PG, false)
}

async fn migrate_mysql(
    pool: &MySqlPool,
    pending: &[Migration],
    bootstrap: bool,
) -> Result<(), MigrateError> {
    run_batch!(pool, pending, bootstrap, MySql, MySql, INSERT_MIGRATION, DELETE_MIGRATION, true)
}

async fn rollback_mysql(pool: &MySqlPool, batch: &[Migration]) -> Result<(), MigrateError> {
    run_batch!(pool, batch, false, MySql, MySql, INSERT_MIGRATION, DELETE_MIGRATION, false)
}

async fn migrate_sqlite(
    pool: &SqlitePool,
    pending: &[Migration],
    bootstrap: bool,
) -> Result<(), MigrateError> {
    run_batch!(pool, pending, bootstrap, Sqlite, Sqlite, INSERT_MIGRATION, DELETE_MIGRATION, true)
}

async fn rollback_sqlite(pool: &SqlitePool, batch: &[Migration]) -> Result<(), MigrateError> {
    run_batch!(pool, batch, false, Sqlite, Sqlite, INSERT_MIGRATION, DELETE_MIGRATION, false)
}
