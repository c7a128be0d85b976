//! SQLite SQL emission.

use strata_schema::{Change, Column, Index, Table, Trigger, View};

use super::{quote_identifier, Sqlite};
use crate::{DialectError, SqlGenerator};

impl SqlGenerator for Sqlite {
    fn dialect_name(&self) -> &'static str {
        "sqlite"
    }

    fn generate_sql(&self, change: &Change) -> Result<String, DialectError> {
        match change {
            Change::CreateSchema { .. } | Change::DropSchema { .. } => Err(
                DialectError::Unsupported("SQLite does not support schema namespaces".into()),
            ),
            Change::EnableExtension { .. } | Change::DisableExtension { .. } => Err(
                DialectError::Unsupported("SQLite does not support extensions".into()),
            ),
            Change::CreateSequence { .. }
            | Change::AlterSequence { .. }
            | Change::DropSequence { .. } => Err(DialectError::Unsupported(
                "SQLite does not support sequences".into(),
            )),
            Change::CreateFunction { .. }
            | Change::AlterFunction { .. }
            | Change::DropFunction { .. } => Err(DialectError::Unsupported(
                "SQLite does not support stored functions".into(),
            )),
            Change::CreateRowPolicy { .. }
            | Change::AlterRowPolicy { .. }
            | Change::DropRowPolicy { .. } => Err(DialectError::Unsupported(
                "SQLite does not support row-level security policies".into(),
            )),
            Change::CreateTable { table } => Ok(create_table(table)),
            Change::DropTable { name, .. } => {
                Ok(format!("DROP TABLE {};", quote_identifier(name)))
            }
            Change::AddColumn { table, column } => Ok(format!(
                "ALTER TABLE {} ADD COLUMN {};",
                quote_identifier(table),
                column_sql(column)
            )),
            Change::DropColumn { .. } => Err(DialectError::Unsupported(
                "SQLite does not support DROP COLUMN directly; the table must be recreated".into(),
            )),
            Change::AlterColumn { .. } => Err(DialectError::Unsupported(
                "SQLite does not support ALTER COLUMN directly; the table must be recreated".into(),
            )),
            Change::AddPrimaryKey { .. } => Err(DialectError::Unsupported(
                "SQLite does not support adding a primary key to an existing table; \
                 the table must be recreated"
                    .into(),
            )),
            Change::DropPrimaryKey { .. } => Err(DialectError::Unsupported(
                "SQLite does not support dropping a primary key; the table must be recreated"
                    .into(),
            )),
            Change::AddIndex { table, index } => Ok(add_index(table, index)),
            Change::DropIndex { name, .. } => {
                Ok(format!("DROP INDEX {};", quote_identifier(name)))
            }
            Change::AddForeignKey { .. } => Err(DialectError::Unsupported(
                "SQLite does not support adding a foreign key to an existing table; \
                 the table must be recreated"
                    .into(),
            )),
            Change::DropForeignKey { .. } => Err(DialectError::Unsupported(
                "SQLite does not support dropping a foreign key; the table must be recreated"
                    .into(),
            )),
            Change::CreateView { view } => Ok(view_sql(view, false)),
            Change::AlterView { view } => Ok(view_sql(view, true)),
            Change::DropView { name, .. } => {
                Ok(format!("DROP VIEW {};", quote_identifier(name)))
            }
            Change::CreateTrigger { trigger } => Ok(trigger_sql(trigger, false)),
            Change::AlterTrigger { trigger } => Ok(trigger_sql(trigger, true)),
            Change::DropTrigger { name, .. } => {
                Ok(format!("DROP TRIGGER {};", quote_identifier(name)))
            }
        }
    }
}

fn quote_columns(columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| quote_identifier(c))
        .collect::<Vec<_>>()
        .join(", ")
}

fn column_sql(column: &Column) -> String {
    let mut sql = format!(
        "{} {}",
        quote_identifier(&column.name),
        column.column_type.sql()
    );
    if !column.nullable {
        sql.push_str(" NOT NULL");
    }
    if let Some(default) = &column.default {
        sql.push_str(&format!(" DEFAULT {default}"));
    }
    sql
}

fn create_table(table: &Table) -> String {
    let mut parts: Vec<String> = table.columns.iter().map(column_sql).collect();

    if let Some(pk) = &table.primary_key {
        parts.push(format!(
            "CONSTRAINT {} PRIMARY KEY ({})",
            quote_identifier(&pk.name),
            quote_columns(&pk.columns)
        ));
    }
    for fk in &table.foreign_keys {
        let mut clause = format!(
            "CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({})",
            quote_identifier(&fk.name),
            quote_columns(&fk.columns),
            quote_identifier(&fk.ref_table),
            quote_columns(&fk.ref_columns)
        );
        if !fk.on_delete.is_empty() {
            clause.push_str(&format!(" ON DELETE {}", fk.on_delete));
        }
        if !fk.on_update.is_empty() {
            clause.push_str(&format!(" ON UPDATE {}", fk.on_update));
        }
        parts.push(clause);
    }

    let mut sql = format!(
        "CREATE TABLE {} ({});",
        quote_identifier(&table.name),
        parts.join(", ")
    );
    for index in &table.indexes {
        sql.push('\n');
        sql.push_str(&add_index(&table.name, index));
    }
    sql
}

fn add_index(table: &str, index: &Index) -> String {
    let kind = if index.unique { "CREATE UNIQUE INDEX" } else { "CREATE INDEX" };
    format!(
        "{kind} {} ON {} ({});",
        quote_identifier(&index.name),
        quote_identifier(table),
        quote_columns(&index.columns)
    )
}

fn view_sql(view: &View, replace: bool) -> String {
    let mut sql = String::new();
    if replace {
        sql.push_str(&format!("DROP VIEW IF EXISTS {};\n", quote_identifier(&view.name)));
    }
    sql.push_str(&format!("CREATE VIEW {}", quote_identifier(&view.name)));
    if !view.columns.is_empty() {
        sql.push_str(&format!(" ({})", quote_columns(&view.columns)));
    }
    sql.push_str(" AS ");
    sql.push_str(&view.definition);
    if !view.definition.ends_with(';') {
        sql.push(';');
    }
    sql
}

fn trigger_sql(trigger: &Trigger, replace: bool) -> String {
    let mut sql = String::new();
    if replace {
        sql.push_str(&format!(
            "DROP TRIGGER IF EXISTS {};\n",
            quote_identifier(&trigger.name)
        ));
    }
    sql.push_str(&format!("CREATE TRIGGER {}\n", quote_identifier(&trigger.name)));
    sql.push_str(trigger.timing.as_sql());
    sql.push(' ');
    sql.push_str(
        &trigger
            .events
            .iter()
            .map(|e| e.as_sql())
            .collect::<Vec<_>>()
            .join(" OR "),
    );
    sql.push_str(&format!(
        " ON {}\nFOR EACH {}\n",
        quote_identifier(&trigger.table),
        trigger.for_each.as_sql()
    ));
    if let Some(when) = &trigger.when {
        sql.push_str(&format!("WHEN ({when})\n"));
    }
    sql.push_str("BEGIN\n");
    // The trigger logic lives in the body; `function` holds either a
    // routine invocation or the statement itself.
    let body = trigger.function.trim();
    if !body.is_empty() {
        if trigger.arguments.is_empty() && body.contains(' ') {
            sql.push_str(&format!("  {body}"));
        } else {
            sql.push_str(&format!("  SELECT {body}"));
            sql.push('(');
            sql.push_str(&trigger.arguments.join(", "));
            sql.push(')');
        }
        if !sql.ends_with(';') {
            sql.push(';');
        }
        sql.push('\n');
    }
    sql.push_str("END;");
    sql
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_schema::{
        ColumnOption, ColumnType, Function, PrimaryKey, Schema, Sequence, TriggerEvent,
        TriggerOption,
    };

    fn generate(change: &Change) -> String {
        Sqlite.generate_sql(change).expect("supported change")
    }

    #[test]
    fn create_table_inlines_constraints() {
        let mut schema = Schema::new();
        schema.create_table("posts", |t| {
            t.integer("id", &[]);
            t.integer("user_id", &[]);
            t.set_primary_key("posts_pkey", &["id"]);
            t.foreign_key("fk_posts_users", &["user_id"], "users", &["id"], &[]);
        });

        let sql = generate(&Change::CreateTable { table: schema.tables[0].clone() });
        assert_eq!(
            sql,
            "CREATE TABLE \"posts\" (\"id\" integer NOT NULL, \"user_id\" integer NOT NULL, \
             CONSTRAINT \"posts_pkey\" PRIMARY KEY (\"id\"), \
             CONSTRAINT \"fk_posts_users\" FOREIGN KEY (\"user_id\") \
             REFERENCES \"users\" (\"id\"));"
        );
    }

    #[test]
    fn add_column_is_supported() {
        let column = Column::new("email", ColumnType::Varchar { length: 255 });
        let sql = generate(&Change::AddColumn { table: "users".into(), column });
        assert_eq!(sql, "ALTER TABLE \"users\" ADD COLUMN \"email\" varchar(255) NOT NULL;");
    }

    #[test]
    fn capability_floor_is_rejected_with_precise_messages() {
        let drop_column =
            Sqlite.generate_sql(&Change::DropColumn { table: "users".into(), column: "email".into() });
        assert!(drop_column
            .unwrap_err()
            .to_string()
            .contains("SQLite does not support DROP COLUMN"));

        let alter_column = Sqlite.generate_sql(&Change::AlterColumn {
            table: "users".into(),
            column: Column::new("email", ColumnType::Text),
        });
        assert!(alter_column
            .unwrap_err()
            .to_string()
            .contains("SQLite does not support ALTER COLUMN"));

        let add_pk = Sqlite.generate_sql(&Change::AddPrimaryKey {
            table: "users".into(),
            primary_key: PrimaryKey { name: "pk".into(), columns: vec!["id".into()] },
        });
        assert!(add_pk.unwrap_err().to_string().contains("primary key"));

        let drop_fk = Sqlite
            .generate_sql(&Change::DropForeignKey { table: "posts".into(), name: "fk".into() });
        assert!(drop_fk.unwrap_err().to_string().contains("foreign key"));

        assert!(Sqlite
            .generate_sql(&Change::CreateSequence { sequence: Sequence::new("s") })
            .is_err());
        assert!(Sqlite
            .generate_sql(&Change::EnableExtension { name: "x".into() })
            .is_err());
        assert!(Sqlite
            .generate_sql(&Change::CreateFunction { function: Function::new("f", "int", "1") })
            .is_err());
    }

    #[test]
    fn index_statements() {
        let index = Index {
            name: "idx_users_email".into(),
            columns: vec!["email".into()],
            unique: true,
        };
        assert_eq!(
            generate(&Change::AddIndex { table: "users".into(), index }),
            "CREATE UNIQUE INDEX \"idx_users_email\" ON \"users\" (\"email\");"
        );
        assert_eq!(
            generate(&Change::DropIndex { table: "users".into(), name: "idx_users_email".into() }),
            "DROP INDEX \"idx_users_email\";"
        );
    }

    #[test]
    fn view_alter_drops_then_creates() {
        let view = View::new("active_users", "SELECT * FROM users WHERE active = 1");
        let sql = generate(&Change::AlterView { view });
        assert!(sql.starts_with("DROP VIEW IF EXISTS \"active_users\";\n"));
        assert!(sql.ends_with("CREATE VIEW \"active_users\" AS SELECT * FROM users WHERE active = 1;"));
    }

    #[test]
    fn trigger_wraps_body_in_begin_end() {
        let mut schema = Schema::new();
        schema.create_trigger(
            "touch_users",
            "users",
            "UPDATE users SET updated_at = datetime('now') WHERE id = NEW.id",
            &[TriggerOption::After, TriggerOption::OnEvents(vec![TriggerEvent::Update])],
        );
        let sql = generate(&Change::CreateTrigger { trigger: schema.triggers[0].clone() });
        assert_eq!(
            sql,
            "CREATE TRIGGER \"touch_users\"\nAFTER UPDATE ON \"users\"\nFOR EACH ROW\nBEGIN\n  \
             UPDATE users SET updated_at = datetime('now') WHERE id = NEW.id;\nEND;"
        );
    }
}
