//! Round-trip tests against an in-memory SQLite database: emit the
//! SQL for a schema, apply it, introspect, and check the model comes
//! back unchanged (so a re-diff is empty).

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use strata_dialect::{Sqlite, SqlGenerator};
use strata_schema::{
    diff, ColumnOption, ColumnType, ForeignKeyOption, IndexOption, Schema, TriggerEvent,
    TriggerOption,
};

async fn test_pool() -> SqlitePool {
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect(":memory:")
        .await
        .expect("in-memory SQLite pool")
}

/// Applies every change needed to reach `target` from an empty
/// database.
async fn apply_schema(pool: &SqlitePool, target: &Schema) {
    let mut conn = pool.acquire().await.expect("connection");
    for change in diff(&Schema::new(), target) {
        let sql = Sqlite.generate_sql(&change).expect("supported change");
        sqlx::raw_sql(&sql)
            .execute(&mut *conn)
            .await
            .unwrap_or_else(|e| panic!("executing {sql}: {e}"));
    }
}

async fn introspect(pool: &SqlitePool) -> Schema {
    let mut conn = pool.acquire().await.expect("connection");
    Sqlite::introspect(&mut conn).await.expect("introspection")
}

fn blog_schema() -> Schema {
    let mut schema = Schema::new();
    schema.create_table("users", |t| {
        t.column("id", ColumnType::Integer, &[]);
        t.column("name", ColumnType::Varchar { length: 255 }, &[]);
        t.column("email", ColumnType::Varchar { length: 255 }, &[ColumnOption::Nullable]);
        t.set_primary_key("users_pkey", &["id"]);
        t.index("idx_users_email", &["email"], &[IndexOption::Unique]);
    });
    schema.create_table("posts", |t| {
        t.column("id", ColumnType::Integer, &[]);
        t.column("title", ColumnType::Varchar { length: 255 }, &[]);
        t.text("content", &[ColumnOption::Nullable]);
        t.integer("user_id", &[]);
        t.date_time("created_at", &[]);
        t.set_primary_key("posts_pkey", &["id"]);
        t.foreign_key("fk_posts_users", &["user_id"], "users", &["id"], &[]);
        t.index("idx_posts_user_id", &["user_id"], &[]);
    });
    schema
}

#[tokio::test]
async fn empty_database_introspects_to_empty_schema() {
    let pool = test_pool().await;
    let schema = introspect(&pool).await;
    assert!(schema.tables.is_empty());
    assert!(schema.views.is_empty());
    assert!(schema.triggers.is_empty());
}

#[tokio::test]
async fn tables_round_trip() {
    let pool = test_pool().await;
    let target = blog_schema();
    apply_schema(&pool, &target).await;

    let introspected = introspect(&pool).await;
    assert_eq!(introspected.tables.len(), 2);

    let users = introspected.get_table("users").expect("users table");
    assert_eq!(users.columns.len(), 3);
    assert_eq!(users.columns[0].name, "id");
    assert_eq!(users.columns[0].column_type, ColumnType::Integer);
    assert!(!users.columns[0].nullable);
    assert!(users.columns[2].nullable);
    assert_eq!(users.primary_key.as_ref().unwrap().name, "users_pkey");
    assert_eq!(users.primary_key.as_ref().unwrap().columns, vec!["id"]);
    assert_eq!(users.indexes.len(), 1);
    assert!(users.indexes[0].unique);

    let posts = introspected.get_table("posts").expect("posts table");
    assert_eq!(posts.foreign_keys.len(), 1);
    let fk = &posts.foreign_keys[0];
    assert_eq!(fk.name, "fk_posts_users");
    assert_eq!(fk.ref_table, "users");
    assert_eq!(fk.columns, vec!["user_id"]);
    assert_eq!(fk.ref_columns, vec!["id"]);
    assert_eq!(fk.on_delete, "");
}

#[tokio::test]
async fn rediff_after_apply_is_empty() {
    let pool = test_pool().await;
    let target = blog_schema();
    apply_schema(&pool, &target).await;

    let introspected = introspect(&pool).await;
    let changes = diff(&introspected, &target);
    assert!(
        changes.is_empty(),
        "expected clean re-diff, got: {changes:?}"
    );
}

#[tokio::test]
async fn foreign_key_actions_round_trip() {
    let pool = test_pool().await;
    let mut target = Schema::new();
    target.create_table("children", |t| {
        t.integer("id", &[]);
        t.integer("parent_id", &[]);
        t.set_primary_key("children_pkey", &["id"]);
        t.foreign_key(
            "fk_children_parents",
            &["parent_id"],
            "parents",
            &["id"],
            &[
                ForeignKeyOption::OnDelete("CASCADE".into()),
                ForeignKeyOption::OnUpdate("SET NULL".into()),
            ],
        );
    });
    target.create_table("parents", |t| {
        t.integer("id", &[]);
        t.set_primary_key("parents_pkey", &["id"]);
    });
    apply_schema(&pool, &target).await;

    let introspected = introspect(&pool).await;
    let fk = &introspected.get_table("children").unwrap().foreign_keys[0];
    assert_eq!(fk.on_delete, "CASCADE");
    assert_eq!(fk.on_update, "SET NULL");

    assert!(diff(&introspected, &target).is_empty());
}

#[tokio::test]
async fn views_round_trip() {
    let pool = test_pool().await;
    let mut target = Schema::new();
    target.create_table("users", |t| {
        t.integer("id", &[]);
        t.integer("active", &[]);
        t.set_primary_key("users_pkey", &["id"]);
    });
    target.create_view("active_users", "SELECT id FROM users WHERE active = 1", &[]);
    apply_schema(&pool, &target).await;

    let introspected = introspect(&pool).await;
    assert_eq!(introspected.views.len(), 1);
    let view = &introspected.views[0];
    assert_eq!(view.name, "active_users");
    assert_eq!(view.definition, "SELECT id FROM users WHERE active = 1");
    assert_eq!(view.columns, vec!["id"]);
}

#[tokio::test]
async fn triggers_round_trip() {
    let pool = test_pool().await;
    let mut target = Schema::new();
    target.create_table("users", |t| {
        t.integer("id", &[]);
        t.integer("touched", &[ColumnOption::Nullable]);
        t.set_primary_key("users_pkey", &["id"]);
    });
    target.create_trigger(
        "touch_users",
        "users",
        "UPDATE users SET touched = 1 WHERE id = NEW.id",
        &[TriggerOption::After, TriggerOption::OnEvents(vec![TriggerEvent::Update])],
    );
    apply_schema(&pool, &target).await;

    let introspected = introspect(&pool).await;
    assert_eq!(introspected.triggers.len(), 1);
    let trigger = &introspected.triggers[0];
    assert_eq!(trigger.name, "touch_users");
    assert_eq!(trigger.table, "users");
    assert_eq!(trigger.events, vec![TriggerEvent::Update]);
    assert_eq!(trigger.function, "UPDATE users SET touched = 1 WHERE id = NEW.id");

    assert!(diff(&introspected, &target).is_empty());
}

#[tokio::test]
async fn migration_log_table_is_invisible() {
    let pool = test_pool().await;
    let mut conn = pool.acquire().await.unwrap();
    sqlx::raw_sql(
        "CREATE TABLE schema_migrations (version VARCHAR(255) PRIMARY KEY, \
         name VARCHAR(255) NOT NULL, applied_at TIMESTAMP NOT NULL);",
    )
    .execute(&mut *conn)
    .await
    .unwrap();
    drop(conn);

    let introspected = introspect(&pool).await;
    assert!(introspected.tables.is_empty());
}
