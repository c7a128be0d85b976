//! End-to-end migration runs against an in-memory SQLite database:
//! apply two migrations with version targeting, inspect the tracker,
//! roll one back, and check failure atomicity.

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use strata_migrate::{Database, MigrateError, Migration, MigrationState, Migrator, Registry};
use strata_schema::{ColumnType, Schema};

const USERS_VERSION: &str = "20240101120000";
const POSTS_VERSION: &str = "20240201120000";

fn users_schema() -> Schema {
    let mut schema = Schema::new();
    schema.create_table("users", |t| {
        t.column("id", ColumnType::Integer, &[]);
        t.column("name", ColumnType::Varchar { length: 255 }, &[]);
        t.column("email", ColumnType::Varchar { length: 255 }, &[]);
        t.date_time("created_at", &[]);
        t.set_primary_key("users_pkey", &["id"]);
    });
    schema
}

fn users_and_posts_schema() -> Schema {
    let mut schema = users_schema();
    schema.create_table("posts", |t| {
        t.column("id", ColumnType::Integer, &[]);
        t.column("title", ColumnType::Varchar { length: 255 }, &[]);
        t.text("content", &[]);
        t.integer("user_id", &[]);
        t.date_time("created_at", &[]);
        t.set_primary_key("posts_pkey", &["id"]);
        t.foreign_key("fk_posts_users", &["user_id"], "users", &["id"], &[]);
    });
    schema
}

fn test_registry() -> Registry {
    let mut registry = Registry::new("./migrations");
    registry.add(Migration::new(
        USERS_VERSION,
        "create_users",
        users_schema,
        Schema::new,
    ));
    registry.add(Migration::new(
        POSTS_VERSION,
        "create_posts",
        users_and_posts_schema,
        users_schema,
    ));
    registry
}

async fn test_pool() -> SqlitePool {
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect(":memory:")
        .await
        .expect("in-memory SQLite pool")
}

async fn table_exists(pool: &SqlitePool, name: &str) -> bool {
    let count: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?",
    )
    .bind(name)
    .fetch_one(pool)
    .await
    .expect("sqlite_master query");
    count.0 == 1
}

#[tokio::test]
async fn migrate_up_to_a_target_version() {
    let pool = test_pool().await;
    let migrator = Migrator::new(Database::Sqlite(pool.clone()), test_registry());

    migrator.migrate(Some(USERS_VERSION)).await.expect("first migration");
    assert!(table_exists(&pool, "users").await);
    assert!(!table_exists(&pool, "posts").await);
    assert_eq!(
        migrator.tracker().current_version().await.unwrap().as_deref(),
        Some(USERS_VERSION)
    );

    // Run the rest.
    migrator.migrate(None).await.expect("second migration");
    assert!(table_exists(&pool, "posts").await);
    assert_eq!(
        migrator.tracker().current_version().await.unwrap().as_deref(),
        Some(POSTS_VERSION)
    );

    let applied = migrator.tracker().applied_migrations().await.unwrap();
    assert_eq!(applied.len(), 2);
    assert_eq!(applied[0].name, "create_users");
    assert_eq!(applied[1].name, "create_posts");
}

#[tokio::test]
async fn migrate_is_idempotent() {
    let pool = test_pool().await;
    let migrator = Migrator::new(Database::Sqlite(pool.clone()), test_registry());

    migrator.migrate(None).await.expect("first run");
    migrator.migrate(None).await.expect("second run is a no-op");

    let applied = migrator.tracker().applied_migrations().await.unwrap();
    assert_eq!(applied.len(), 2);
}

#[tokio::test]
async fn rollback_one_step_restores_previous_version() {
    let pool = test_pool().await;
    let migrator = Migrator::new(Database::Sqlite(pool.clone()), test_registry());

    migrator.migrate(None).await.expect("migrate");
    migrator.rollback(1).await.expect("rollback");

    assert!(!table_exists(&pool, "posts").await);
    assert!(table_exists(&pool, "users").await);

    let applied = migrator.tracker().applied_migrations().await.unwrap();
    assert_eq!(applied.len(), 1);
    assert_eq!(applied[0].version, USERS_VERSION);
    assert_eq!(
        migrator.tracker().current_version().await.unwrap().as_deref(),
        Some(USERS_VERSION)
    );
}

#[tokio::test]
async fn rollback_more_steps_than_applied_drops_everything() {
    let pool = test_pool().await;
    let migrator = Migrator::new(Database::Sqlite(pool.clone()), test_registry());

    migrator.migrate(None).await.expect("migrate");
    migrator.rollback(10).await.expect("rollback all");

    assert!(!table_exists(&pool, "users").await);
    assert!(!table_exists(&pool, "posts").await);
    assert_eq!(migrator.tracker().current_version().await.unwrap(), None);
}

#[tokio::test]
async fn rollback_with_nothing_applied_fails() {
    let pool = test_pool().await;
    let migrator = Migrator::new(Database::Sqlite(pool), test_registry());

    let err = migrator.rollback(1).await.unwrap_err();
    assert!(matches!(err, MigrateError::NothingToRollback));
}

#[tokio::test]
async fn empty_registry_is_an_error() {
    let pool = test_pool().await;
    let migrator = Migrator::new(Database::Sqlite(pool), Registry::new("./migrations"));

    let err = migrator.migrate(None).await.unwrap_err();
    assert!(matches!(err, MigrateError::NoMigrations));
}

#[tokio::test]
async fn rollback_of_unregistered_version_is_an_error() {
    let pool = test_pool().await;
    let migrator = Migrator::new(Database::Sqlite(pool.clone()), test_registry());
    migrator.migrate(None).await.expect("migrate");

    // A registry missing the newest applied migration cannot roll it
    // back.
    let mut partial = Registry::new("./migrations");
    partial.add(Migration::new(
        USERS_VERSION,
        "create_users",
        users_schema,
        Schema::new,
    ));
    let broken = Migrator::new(Database::Sqlite(pool), partial);

    let err = broken.rollback(1).await.unwrap_err();
    assert!(matches!(err, MigrateError::UnknownVersion(v) if v == POSTS_VERSION));
}

#[tokio::test]
async fn status_lists_applied_and_pending() {
    let pool = test_pool().await;
    let migrator = Migrator::new(Database::Sqlite(pool), test_registry());

    migrator.migrate(Some(USERS_VERSION)).await.expect("migrate");
    let statuses = migrator.status().await.expect("status");

    assert_eq!(statuses.len(), 2);
    assert_eq!(statuses[0].version, USERS_VERSION);
    assert_eq!(statuses[0].state, MigrationState::Applied);
    assert!(statuses[0].applied_at.is_some());
    assert_eq!(statuses[1].version, POSTS_VERSION);
    assert_eq!(statuses[1].state, MigrationState::Pending);
    assert!(statuses[1].applied_at.is_none());
}

#[tokio::test]
async fn failed_batch_leaves_tracker_unchanged() {
    let pool = test_pool().await;
    let migrator = Migrator::new(Database::Sqlite(pool.clone()), test_registry());
    migrator.migrate(None).await.expect("migrate");

    // A migration that needs an unsupported SQLite change: dropping a
    // column from users.
    let mut registry = test_registry();
    registry.add(Migration::new(
        "20240301120000",
        "drop_users_email",
        || {
            let mut schema = users_and_posts_schema();
            let users = schema.tables.iter_mut().find(|t| t.name == "users").unwrap();
            users.columns.retain(|c| c.name != "email");
            schema
        },
        users_and_posts_schema,
    ));
    let failing = Migrator::new(Database::Sqlite(pool.clone()), registry);

    let err = failing.migrate(None).await.unwrap_err();
    assert!(err.to_string().contains("SQLite does not support DROP COLUMN"));

    // The batch rolled back: tracker still at the previous head and
    // the column survives.
    assert_eq!(
        failing.tracker().current_version().await.unwrap().as_deref(),
        Some(POSTS_VERSION)
    );
    let applied = failing.tracker().applied_migrations().await.unwrap();
    assert_eq!(applied.len(), 2);
}
