//! PostgreSQL SQL emission.

use strata_schema::{
    Change, Column, ColumnType, ForeignKey, Function, FunctionSecurity, Index, RowPolicy,
    Sequence, Table, Trigger, View, Volatility,
};

use super::{qualified, quote_identifier, quote_literal, Postgres};
use crate::{DialectError, SqlGenerator};

impl SqlGenerator for Postgres {
    fn dialect_name(&self) -> &'static str {
        "postgresql"
    }

    fn generate_sql(&self, change: &Change) -> Result<String, DialectError> {
        match change {
            Change::CreateSchema { name } => {
                Ok(format!("CREATE SCHEMA {};", quote_identifier(name)))
            }
            Change::DropSchema { name } => Ok(format!("DROP SCHEMA {};", quote_identifier(name))),
            Change::EnableExtension { name } => Ok(format!(
                "CREATE EXTENSION IF NOT EXISTS {};",
                quote_identifier(name)
            )),
            Change::DisableExtension { name } => {
                Ok(format!("DROP EXTENSION IF EXISTS {};", quote_identifier(name)))
            }
            Change::CreateTable { table } => Ok(create_table(table)),
            Change::DropTable { schema, name } => Ok(format!(
                "DROP TABLE {};",
                quote_identifier(&qualified(schema, name))
            )),
            Change::AddColumn { table, column } => Ok(add_column(table, column)),
            Change::DropColumn { table, column } => Ok(format!(
                "ALTER TABLE {} DROP COLUMN {};",
                quote_identifier(table),
                quote_identifier(column)
            )),
            Change::AlterColumn { table, column } => Ok(alter_column(table, column)),
            Change::AddPrimaryKey { table, primary_key } => Ok(format!(
                "ALTER TABLE {} ADD CONSTRAINT {} PRIMARY KEY ({});",
                quote_identifier(table),
                quote_identifier(&primary_key.name),
                quote_columns(&primary_key.columns)
            )),
            Change::DropPrimaryKey { table, name } => Ok(format!(
                "ALTER TABLE {} DROP CONSTRAINT {};",
                quote_identifier(table),
                quote_identifier(name)
            )),
            Change::AddIndex { table, index } => Ok(add_index(table, index)),
            Change::DropIndex { name, .. } => {
                Ok(format!("DROP INDEX {};", quote_identifier(name)))
            }
            Change::AddForeignKey { table, foreign_key } => Ok(add_foreign_key(table, foreign_key)),
            Change::DropForeignKey { table, name } => Ok(format!(
                "ALTER TABLE {} DROP CONSTRAINT {};",
                quote_identifier(table),
                quote_identifier(name)
            )),
            Change::CreateSequence { sequence } => Ok(create_sequence(sequence)),
            Change::AlterSequence { sequence } => Ok(alter_sequence(sequence)),
            Change::DropSequence { schema, name } => Ok(format!(
                "DROP SEQUENCE {};",
                quote_identifier(&qualified(schema, name))
            )),
            Change::CreateFunction { function } => Ok(function_sql("CREATE FUNCTION", function)),
            Change::AlterFunction { function } => {
                Ok(function_sql("CREATE OR REPLACE FUNCTION", function))
            }
            Change::DropFunction { schema, name, arguments } => {
                let qualified_name = quote_identifier(&qualified(schema, name));
                if arguments.is_empty() {
                    Ok(format!("DROP FUNCTION {qualified_name};"))
                } else {
                    let arg_types: Vec<&str> =
                        arguments.iter().map(|a| a.arg_type.as_str()).collect();
                    Ok(format!("DROP FUNCTION {qualified_name}({});", arg_types.join(", ")))
                }
            }
            Change::CreateView { view } => Ok(create_view(view, false)),
            Change::AlterView { view } => Ok(create_view(view, true)),
            Change::DropView { schema, name } => Ok(format!(
                "DROP VIEW {};",
                quote_identifier(&qualified(schema, name))
            )),
            Change::CreateTrigger { trigger } => Ok(trigger_sql(trigger)),
            Change::AlterTrigger { trigger } => {
                // No in-place redefinition of triggers; drop and
                // recreate.
                let drop = format!(
                    "DROP TRIGGER {} ON {};",
                    quote_identifier(&trigger.name),
                    quote_identifier(&trigger.table)
                );
                Ok(format!("{drop}\n{}", trigger_sql(trigger)))
            }
            Change::DropTrigger { schema, name, table } => Ok(format!(
                "DROP TRIGGER {} ON {};",
                quote_identifier(name),
                quote_identifier(&qualified(schema, table))
            )),
            Change::CreateRowPolicy { policy } => Ok(create_policy(policy)),
            Change::AlterRowPolicy { policy } => {
                // CREATE POLICY cannot be replaced in place when the
                // command or permissiveness changes; drop and recreate.
                let drop = format!(
                    "DROP POLICY {} ON {};",
                    quote_identifier(&policy.name),
                    quote_identifier(&qualified(&policy.schema, &policy.table))
                );
                Ok(format!("{drop}\n{}", create_policy(policy)))
            }
            Change::DropRowPolicy { schema, table, name } => Ok(format!(
                "DROP POLICY {} ON {};",
                quote_identifier(name),
                quote_identifier(&qualified(schema, table))
            )),
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

/// Spells a column's type, substituting serial types for
/// auto-incrementing integers.
fn type_sql(column: &Column) -> String {
    if column.auto_increment {
        match column.column_type {
            ColumnType::Integer => return "serial".to_string(),
            ColumnType::BigInt => return "bigserial".to_string(),
            ColumnType::SmallInt => return "smallserial".to_string(),
            _ => {}
        }
    }
    column.column_type.sql()
}

fn column_sql(column: &Column) -> String {
    let mut sql = format!("{} {}", quote_identifier(&column.name), type_sql(column));
    if !column.nullable {
        sql.push_str(" NOT NULL");
    }
    if let Some(default) = &column.default {
        sql.push_str(&format!(" DEFAULT {default}"));
    }
    sql
}

fn comment_sql(table: &str, column: &Column) -> Option<String> {
    column.comment.as_ref().map(|comment| {
        format!(
            "COMMENT ON COLUMN {}.{} IS {};",
            quote_identifier(table),
            quote_identifier(&column.name),
            quote_literal(comment)
        )
    })
}

fn create_table(table: &Table) -> String {
    let name = qualified(&table.schema, &table.name);
    let mut parts: Vec<String> = table.columns.iter().map(column_sql).collect();

    if let Some(pk) = &table.primary_key {
        parts.push(format!(
            "CONSTRAINT {} PRIMARY KEY ({})",
            quote_identifier(&pk.name),
            quote_columns(&pk.columns)
        ));
    }
    for fk in &table.foreign_keys {
        parts.push(foreign_key_clause(fk));
    }

    let mut sql = format!("CREATE TABLE {} ({});", quote_identifier(&name), parts.join(", "));

    for index in &table.indexes {
        sql.push('\n');
        sql.push_str(&add_index(&name, index));
    }
    for column in &table.columns {
        if let Some(comment) = comment_sql(&name, column) {
            sql.push('\n');
            sql.push_str(&comment);
        }
    }
    sql
}

fn foreign_key_clause(fk: &ForeignKey) -> String {
    let mut sql = format!(
        "CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({})",
        quote_identifier(&fk.name),
        quote_columns(&fk.columns),
        quote_identifier(&fk.ref_table),
        quote_columns(&fk.ref_columns)
    );
    if !fk.on_delete.is_empty() {
        sql.push_str(&format!(" ON DELETE {}", fk.on_delete));
    }
    if !fk.on_update.is_empty() {
        sql.push_str(&format!(" ON UPDATE {}", fk.on_update));
    }
    sql
}

fn add_column(table: &str, column: &Column) -> String {
    let mut sql = format!(
        "ALTER TABLE {} ADD COLUMN {};",
        quote_identifier(table),
        column_sql(column)
    );
    if let Some(comment) = comment_sql(table, column) {
        sql.push('\n');
        sql.push_str(&comment);
    }
    sql
}

fn alter_column(table: &str, column: &Column) -> String {
    let table_ident = quote_identifier(table);
    let column_ident = quote_identifier(&column.name);
    let mut statements = vec![format!(
        "ALTER TABLE {table_ident} ALTER COLUMN {column_ident} TYPE {};",
        type_sql(column)
    )];

    if column.nullable {
        statements.push(format!(
            "ALTER TABLE {table_ident} ALTER COLUMN {column_ident} DROP NOT NULL;"
        ));
    } else {
        statements.push(format!(
            "ALTER TABLE {table_ident} ALTER COLUMN {column_ident} SET NOT NULL;"
        ));
    }

    match &column.default {
        Some(default) => statements.push(format!(
            "ALTER TABLE {table_ident} ALTER COLUMN {column_ident} SET DEFAULT {default};"
        )),
        None => statements.push(format!(
            "ALTER TABLE {table_ident} ALTER COLUMN {column_ident} DROP DEFAULT;"
        )),
    }

    if let Some(comment) = comment_sql(table, column) {
        statements.push(comment);
    }

    statements.join("\n")
}

fn add_index(table: &str, index: &Index) -> String {
    let unique = if index.unique { "UNIQUE " } else { "" };
    format!(
        "CREATE {unique}INDEX {} ON {} ({});",
        quote_identifier(&index.name),
        quote_identifier(table),
        quote_columns(&index.columns)
    )
}

fn add_foreign_key(table: &str, fk: &ForeignKey) -> String {
    let mut sql = format!(
        "ALTER TABLE {} ADD CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({})",
        quote_identifier(table),
        quote_identifier(&fk.name),
        quote_columns(&fk.columns),
        quote_identifier(&fk.ref_table),
        quote_columns(&fk.ref_columns)
    );
    if !fk.on_delete.is_empty() {
        sql.push_str(&format!(" ON DELETE {}", fk.on_delete));
    }
    if !fk.on_update.is_empty() {
        sql.push_str(&format!(" ON UPDATE {}", fk.on_update));
    }
    sql.push(';');
    sql
}

fn create_sequence(seq: &Sequence) -> String {
    let name = qualified(&seq.schema, &seq.name);
    let mut sql = format!("CREATE SEQUENCE {}", quote_identifier(&name));

    if seq.increment != 1 {
        sql.push_str(&format!(" INCREMENT BY {}", seq.increment));
    }
    if seq.min_value != 1 {
        sql.push_str(&format!(" MINVALUE {}", seq.min_value));
    }
    if seq.max_value != i64::MAX {
        sql.push_str(&format!(" MAXVALUE {}", seq.max_value));
    }
    if seq.start != 1 {
        sql.push_str(&format!(" START WITH {}", seq.start));
    }
    if seq.cache != 1 {
        sql.push_str(&format!(" CACHE {}", seq.cache));
    }
    if seq.cycle {
        sql.push_str(" CYCLE");
    }
    sql.push(';');
    sql
}

fn alter_sequence(seq: &Sequence) -> String {
    let name = qualified(&seq.schema, &seq.name);
    let mut sql = format!("ALTER SEQUENCE {}", quote_identifier(&name));

    if seq.increment != 1 {
        sql.push_str(&format!(" INCREMENT BY {}", seq.increment));
    }
    if seq.min_value != 1 {
        sql.push_str(&format!(" MINVALUE {}", seq.min_value));
    } else {
        sql.push_str(" NO MINVALUE");
    }
    if seq.max_value != i64::MAX {
        sql.push_str(&format!(" MAXVALUE {}", seq.max_value));
    } else {
        sql.push_str(" NO MAXVALUE");
    }
    if seq.cache != 1 {
        sql.push_str(&format!(" CACHE {}", seq.cache));
    }
    if seq.cycle {
        sql.push_str(" CYCLE");
    } else {
        sql.push_str(" NO CYCLE");
    }
    sql.push(';');
    sql
}

fn function_sql(command: &str, function: &Function) -> String {
    let name = qualified(&function.schema, &function.name);
    let mut args = Vec::new();
    for arg in &function.arguments {
        let mut spec = String::new();
        if !arg.name.is_empty() {
            spec.push_str(&arg.name);
            spec.push(' ');
        }
        if arg.mode.as_sql() != "IN" {
            spec.push_str(arg.mode.as_sql());
            spec.push(' ');
        }
        spec.push_str(&arg.arg_type);
        if let Some(default) = &arg.default {
            spec.push_str(&format!(" DEFAULT {default}"));
        }
        args.push(spec);
    }

    let mut sql = format!(
        "{command} {}({}) RETURNS {} AS $${}$$ LANGUAGE {}",
        quote_identifier(&name),
        args.join(", "),
        function.returns,
        function.body,
        function.language
    );

    if function.volatility != Volatility::Volatile {
        sql.push(' ');
        sql.push_str(function.volatility.as_sql());
    }
    if function.strict {
        sql.push_str(" STRICT");
    }
    if function.security != FunctionSecurity::Invoker {
        sql.push_str(" SECURITY ");
        sql.push_str(function.security.as_sql());
    }
    sql.push_str(&format!(" COST {};", function.cost));
    sql
}

fn create_view(view: &View, or_replace: bool) -> String {
    let name = qualified(&view.schema, &view.name);
    let command = if or_replace { "CREATE OR REPLACE VIEW" } else { "CREATE VIEW" };
    let mut sql = format!("{command} {}", quote_identifier(&name));

    if !view.columns.is_empty() {
        sql.push_str(&format!(" ({})", quote_columns(&view.columns)));
    }
    if !view.options.is_empty() {
        sql.push_str(&format!(" WITH ({})", view.options.join(", ")));
    }
    sql.push_str(" AS ");
    sql.push_str(&view.definition);
    if !view.definition.ends_with(';') {
        sql.push(';');
    }
    sql
}

fn trigger_sql(trigger: &Trigger) -> String {
    let mut sql = format!("CREATE TRIGGER {}\n", quote_identifier(&trigger.name));
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
        quote_identifier(&qualified(&trigger.schema, &trigger.table)),
        trigger.for_each.as_sql()
    ));
    if let Some(when) = &trigger.when {
        sql.push_str(&format!("WHEN ({when})\n"));
    }
    sql.push_str("EXECUTE FUNCTION ");
    sql.push_str(&trigger.function);
    sql.push('(');
    sql.push_str(&trigger.arguments.join(", "));
    sql.push_str(");");
    sql
}

fn create_policy(policy: &RowPolicy) -> String {
    let mut sql = format!(
        "CREATE POLICY {} ON {}",
        quote_identifier(&policy.name),
        quote_identifier(&qualified(&policy.schema, &policy.table))
    );
    if !policy.permissive {
        sql.push_str(" AS RESTRICTIVE");
    }
    sql.push_str(&format!(" FOR {}", policy.command.as_sql()));
    if !policy.roles.is_empty() {
        let roles: Vec<String> = policy.roles.iter().map(|r| quote_identifier(r)).collect();
        sql.push_str(&format!(" TO {}", roles.join(", ")));
    }
    if let Some(using) = &policy.using_expr {
        sql.push_str(&format!(" USING ({using})"));
    }
    if let Some(check) = &policy.check_expr {
        sql.push_str(&format!(" WITH CHECK ({check})"));
    }
    sql.push(';');
    sql
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_schema::{
        ColumnOption, ForeignKeyOption, FunctionArg, FunctionOption, IndexOption, Schema,
        SequenceOption, TriggerEvent, TriggerOption,
    };

    fn generate(change: &Change) -> String {
        Postgres.generate_sql(change).expect("supported change")
    }

    #[test]
    fn create_table_is_a_single_statement_with_inline_pk() {
        let mut schema = Schema::new();
        schema.create_table("users", |t| {
            t.column("id", ColumnType::Integer, &[]);
            t.column(
                "name",
                ColumnType::Varchar { length: 100 },
                &[ColumnOption::Nullable],
            );
            t.set_primary_key("users_pkey", &["id"]);
        });

        let change = Change::CreateTable { table: schema.tables[0].clone() };
        assert_eq!(
            generate(&change),
            "CREATE TABLE \"users\" (\"id\" integer NOT NULL, \"name\" varchar(100), \
             CONSTRAINT \"users_pkey\" PRIMARY KEY (\"id\"));"
        );
    }

    #[test]
    fn create_table_appends_indexes_and_comments() {
        let mut schema = Schema::new();
        schema.create_table("users", |t| {
            t.string("email", &[ColumnOption::Comment("login address".into())]);
            t.index("idx_users_email", &["email"], &[IndexOption::Unique]);
        });

        let sql = generate(&Change::CreateTable { table: schema.tables[0].clone() });
        assert!(sql.starts_with("CREATE TABLE \"users\" (\"email\" varchar(255) NOT NULL);"));
        assert!(sql.contains("CREATE UNIQUE INDEX \"idx_users_email\" ON \"users\" (\"email\");"));
        assert!(sql.contains("COMMENT ON COLUMN \"users\".\"email\" IS 'login address';"));
    }

    #[test]
    fn serial_substitution_for_auto_increment() {
        let mut column = Column::new("id", ColumnType::BigInt);
        column.auto_increment = true;
        let sql = generate(&Change::AddColumn { table: "users".into(), column });
        assert_eq!(sql, "ALTER TABLE \"users\" ADD COLUMN \"id\" bigserial NOT NULL;");
    }

    #[test]
    fn add_foreign_key_with_cascade() {
        let mut schema = Schema::new();
        schema.create_table("posts", |t| {
            t.integer("user_id", &[]);
            t.foreign_key(
                "fk_posts_user",
                &["user_id"],
                "users",
                &["id"],
                &[ForeignKeyOption::OnDelete("CASCADE".into())],
            );
        });
        let fk = schema.tables[0].foreign_keys[0].clone();

        assert_eq!(
            generate(&Change::AddForeignKey { table: "posts".into(), foreign_key: fk }),
            "ALTER TABLE \"posts\" ADD CONSTRAINT \"fk_posts_user\" FOREIGN KEY (\"user_id\") \
             REFERENCES \"users\" (\"id\") ON DELETE CASCADE;"
        );
    }

    #[test]
    fn alter_column_emits_type_null_and_default_statements() {
        let mut column = Column::new("email", ColumnType::Varchar { length: 255 });
        column.nullable = true;
        column.default = Some("''".into());

        let sql = generate(&Change::AlterColumn { table: "users".into(), column });
        let statements: Vec<&str> = sql.lines().collect();
        assert_eq!(
            statements,
            vec![
                "ALTER TABLE \"users\" ALTER COLUMN \"email\" TYPE varchar(255);",
                "ALTER TABLE \"users\" ALTER COLUMN \"email\" DROP NOT NULL;",
                "ALTER TABLE \"users\" ALTER COLUMN \"email\" SET DEFAULT '';",
            ]
        );
    }

    #[test]
    fn primary_key_changes() {
        let sql = generate(&Change::DropPrimaryKey { table: "users".into(), name: "pk_users".into() });
        assert_eq!(sql, "ALTER TABLE \"users\" DROP CONSTRAINT \"pk_users\";");
    }

    #[test]
    fn sequence_defaults_are_elided() {
        let seq = Sequence::new("order_ids");
        assert_eq!(
            generate(&Change::CreateSequence { sequence: seq }),
            "CREATE SEQUENCE \"order_ids\";"
        );

        let mut schema = Schema::new();
        schema.create_sequence(
            "order_ids",
            &[SequenceOption::Start(100), SequenceOption::Increment(5), SequenceOption::Cycle],
        );
        let sql = generate(&Change::CreateSequence { sequence: schema.sequences[0].clone() });
        assert_eq!(
            sql,
            "CREATE SEQUENCE \"order_ids\" INCREMENT BY 5 START WITH 100 CYCLE;"
        );
    }

    #[test]
    fn function_round_trip_spelling() {
        let mut schema = Schema::new();
        schema.create_function(
            "add_numbers",
            "integer",
            " BEGIN RETURN a + b; END; ",
            &[
                FunctionOption::Language("plpgsql".into()),
                FunctionOption::Immutable,
                FunctionOption::Strict,
                FunctionOption::Args(vec![
                    FunctionArg::new("a", "integer"),
                    FunctionArg::new("b", "integer"),
                ]),
            ],
        );
        let sql = generate(&Change::CreateFunction { function: schema.functions[0].clone() });
        assert_eq!(
            sql,
            "CREATE FUNCTION \"add_numbers\"(a integer, b integer) RETURNS integer AS \
             $$ BEGIN RETURN a + b; END; $$ LANGUAGE plpgsql IMMUTABLE STRICT COST 100;"
        );
    }

    #[test]
    fn drop_function_includes_arg_types_for_overloads() {
        let sql = generate(&Change::DropFunction {
            schema: String::new(),
            name: "add_numbers".into(),
            arguments: vec![FunctionArg::new("a", "integer"), FunctionArg::new("b", "integer")],
        });
        assert_eq!(sql, "DROP FUNCTION \"add_numbers\"(integer, integer);");
    }

    #[test]
    fn trigger_uses_execute_function() {
        let mut schema = Schema::new();
        schema.create_trigger(
            "users_touch",
            "users",
            "touch_updated_at",
            &[
                TriggerOption::After,
                TriggerOption::OnEvents(vec![TriggerEvent::Insert, TriggerEvent::Update]),
                TriggerOption::When("NEW.updated_at IS NULL".into()),
            ],
        );
        let sql = generate(&Change::CreateTrigger { trigger: schema.triggers[0].clone() });
        assert_eq!(
            sql,
            "CREATE TRIGGER \"users_touch\"\nAFTER INSERT OR UPDATE ON \"users\"\n\
             FOR EACH ROW\nWHEN (NEW.updated_at IS NULL)\nEXECUTE FUNCTION touch_updated_at();"
        );
    }

    #[test]
    fn alter_trigger_drops_then_creates() {
        let trigger = Trigger::new("t", "users", "f");
        let sql = generate(&Change::AlterTrigger { trigger });
        assert!(sql.starts_with("DROP TRIGGER \"t\" ON \"users\";\n"));
        assert!(sql.contains("CREATE TRIGGER \"t\""));
    }

    #[test]
    fn row_policy_sql() {
        let mut schema = Schema::new();
        let policy = schema.create_row_policy("tenant_read", "documents", &[]);
        policy.using_expr = Some("tenant_id = current_tenant()".into());
        policy.roles = vec!["app_user".into()];

        let sql = generate(&Change::CreateRowPolicy { policy: schema.row_policies[0].clone() });
        assert_eq!(
            sql,
            "CREATE POLICY \"tenant_read\" ON \"documents\" FOR ALL TO \"app_user\" \
             USING (tenant_id = current_tenant());"
        );
    }

    #[test]
    fn schema_qualified_names_quote_partwise() {
        let sql = generate(&Change::DropTable { schema: "analytics".into(), name: "events".into() });
        assert_eq!(sql, "DROP TABLE \"analytics\".\"events\";");
    }

    #[test]
    fn extension_sql() {
        assert_eq!(
            generate(&Change::EnableExtension { name: "uuid-ossp".into() }),
            "CREATE EXTENSION IF NOT EXISTS \"uuid-ossp\";"
        );
        assert_eq!(
            generate(&Change::DisableExtension { name: "uuid-ossp".into() }),
            "DROP EXTENSION IF EXISTS \"uuid-ossp\";"
        );
    }
}
