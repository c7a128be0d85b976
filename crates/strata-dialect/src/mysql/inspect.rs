//! MySQL catalog introspection over `information_schema`.

use sqlx::{MySqlConnection, Row};
use strata_schema::{
    Function, FunctionArg, Schema, Table, Trigger, TriggerEvent, TriggerScope, TriggerTiming,
    View, Volatility,
};

use super::{column_type_from_catalog, MySql};
use crate::{DialectError, MIGRATIONS_TABLE};

impl MySql {
    /// Reads the current database into a schema value.
    pub async fn introspect(conn: &mut MySqlConnection) -> Result<Schema, DialectError> {
        let mut schema = Schema::new();

        for table_name in Self::inspect_tables(&mut *conn).await? {
            let mut table = Table::new(table_name);
            Self::inspect_columns(&mut *conn, &mut table).await?;
            Self::inspect_primary_key(&mut *conn, &mut table).await?;
            Self::inspect_indexes(&mut *conn, &mut table).await?;
            Self::inspect_foreign_keys(&mut *conn, &mut table).await?;
            schema.tables.push(table);
        }

        Self::inspect_views(&mut *conn, &mut schema).await?;
        Self::inspect_functions(&mut *conn, &mut schema).await?;
        Self::inspect_triggers(&mut *conn, &mut schema).await?;

        Ok(schema)
    }

    /// Lists base tables in the current database.
    pub async fn inspect_tables(conn: &mut MySqlConnection) -> Result<Vec<String>, DialectError> {
        let names = sqlx::query_scalar::<_, String>(
            "SELECT table_name FROM information_schema.tables \
             WHERE table_schema = DATABASE() AND table_type = 'BASE TABLE' \
             AND table_name <> ? ORDER BY table_name",
        )
        .bind(MIGRATIONS_TABLE)
        .fetch_all(conn)
        .await
        .map_err(DialectError::inspect("tables"))?;
        Ok(names)
    }

    /// Reads all columns of a table, in ordinal order.
    pub async fn inspect_columns(
        conn: &mut MySqlConnection,
        table: &mut Table,
    ) -> Result<(), DialectError> {
        let rows = sqlx::query(
            "SELECT column_name, data_type, column_type, is_nullable, column_default, \
                    CAST(character_maximum_length AS SIGNED) AS character_maximum_length, \
                    CAST(numeric_precision AS SIGNED) AS numeric_precision, \
                    CAST(numeric_scale AS SIGNED) AS numeric_scale, \
                    column_comment, extra \
             FROM information_schema.columns \
             WHERE table_schema = DATABASE() AND table_name = ? \
             ORDER BY ordinal_position",
        )
        .bind(&table.name)
        .fetch_all(conn)
        .await
        .map_err(DialectError::inspect(format!("columns of {}", table.name)))?;

        for row in rows {
            let name: String = row.try_get("column_name")?;
            let data_type: String = row.try_get("data_type")?;
            let column_type: String = row.try_get("column_type")?;
            let is_nullable: String = row.try_get("is_nullable")?;
            let default: Option<String> = row.try_get("column_default")?;
            let char_length: Option<i64> = row.try_get("character_maximum_length")?;
            let precision: Option<i64> = row.try_get("numeric_precision")?;
            let scale: Option<i64> = row.try_get("numeric_scale")?;
            let comment: String = row.try_get("column_comment")?;
            let extra: String = row.try_get("extra")?;

            let ty = column_type_from_catalog(&data_type, &column_type, char_length, precision, scale);
            let column = table.column(name, ty, &[]);
            column.nullable = is_nullable == "YES";
            column.auto_increment = extra.to_lowercase().contains("auto_increment");
            column.comment = Some(comment).filter(|c| !c.is_empty());
            column.default = default.map(|value| {
                // MySQL 8 reports CURRENT_TIMESTAMP(n); fold to the
                // portable spelling.
                if value.to_uppercase().starts_with("CURRENT_TIMESTAMP") {
                    "CURRENT_TIMESTAMP".to_string()
                } else {
                    value
                }
            });
        }
        Ok(())
    }

    /// Reads the primary key, if any. MySQL always names it `PRIMARY`.
    pub async fn inspect_primary_key(
        conn: &mut MySqlConnection,
        table: &mut Table,
    ) -> Result<(), DialectError> {
        let columns = sqlx::query_scalar::<_, String>(
            "SELECT column_name FROM information_schema.key_column_usage \
             WHERE table_schema = DATABASE() AND table_name = ? \
               AND constraint_name = 'PRIMARY' \
             ORDER BY ordinal_position",
        )
        .bind(&table.name)
        .fetch_all(conn)
        .await
        .map_err(DialectError::inspect(format!("primary key of {}", table.name)))?;

        if !columns.is_empty() {
            let refs: Vec<&str> = columns.iter().map(String::as_str).collect();
            table.set_primary_key("PRIMARY", &refs);
        }
        Ok(())
    }

    /// Reads secondary indexes, skipping the primary key and the
    /// `{table}_ibfk_N` indexes MySQL creates to back foreign keys.
    pub async fn inspect_indexes(
        conn: &mut MySqlConnection,
        table: &mut Table,
    ) -> Result<(), DialectError> {
        let rows = sqlx::query(
            "SELECT i.index_name, CAST(i.non_unique AS SIGNED) AS non_unique, \
                    GROUP_CONCAT(i.column_name ORDER BY i.seq_in_index) AS column_names \
             FROM information_schema.statistics i \
             WHERE i.table_schema = DATABASE() AND i.table_name = ? \
               AND i.index_name != 'PRIMARY' \
             GROUP BY i.index_name, i.non_unique \
             ORDER BY i.index_name",
        )
        .bind(&table.name)
        .fetch_all(conn)
        .await
        .map_err(DialectError::inspect(format!("indexes of {}", table.name)))?;

        let fk_backing_prefix = format!("{}_ibfk_", table.name);
        for row in rows {
            let name: String = row.try_get("index_name")?;
            if name.starts_with(&fk_backing_prefix) {
                continue;
            }
            let non_unique: i64 = row.try_get("non_unique")?;
            let column_names: String = row.try_get("column_names")?;

            table.indexes.push(strata_schema::Index {
                name,
                columns: column_names.split(',').map(|c| c.trim().to_string()).collect(),
                unique: non_unique == 0,
            });
        }
        Ok(())
    }

    /// Reads foreign keys, grouping composite keys by constraint name.
    pub async fn inspect_foreign_keys(
        conn: &mut MySqlConnection,
        table: &mut Table,
    ) -> Result<(), DialectError> {
        let rows = sqlx::query(
            "SELECT tc.constraint_name, \
                    GROUP_CONCAT(kcu.column_name ORDER BY kcu.ordinal_position) AS columns, \
                    kcu.referenced_table_name, \
                    GROUP_CONCAT(kcu.referenced_column_name ORDER BY kcu.ordinal_position) \
                        AS referenced_columns, \
                    rc.update_rule, rc.delete_rule \
             FROM information_schema.table_constraints tc \
             JOIN information_schema.key_column_usage kcu \
               ON tc.constraint_name = kcu.constraint_name \
              AND tc.constraint_type = 'FOREIGN KEY' \
             JOIN information_schema.referential_constraints rc \
               ON tc.constraint_name = rc.constraint_name \
             WHERE tc.table_name = ? AND tc.table_schema = DATABASE() \
             GROUP BY tc.constraint_name, kcu.referenced_table_name, \
                      rc.update_rule, rc.delete_rule \
             ORDER BY tc.constraint_name",
        )
        .bind(&table.name)
        .fetch_all(conn)
        .await
        .map_err(DialectError::inspect(format!("foreign keys of {}", table.name)))?;

        for row in rows {
            let name: String = row.try_get("constraint_name")?;
            let columns: String = row.try_get("columns")?;
            let ref_table: String = row.try_get("referenced_table_name")?;
            let ref_columns: String = row.try_get("referenced_columns")?;
            let update_rule: String = row.try_get("update_rule")?;
            let delete_rule: String = row.try_get("delete_rule")?;

            table.foreign_keys.push(strata_schema::ForeignKey {
                name,
                columns: columns.split(',').map(|c| c.trim().to_string()).collect(),
                ref_table,
                ref_columns: ref_columns.split(',').map(|c| c.trim().to_string()).collect(),
                on_delete: normalize_rule(&delete_rule),
                on_update: normalize_rule(&update_rule),
            });
        }
        Ok(())
    }

    /// Reads views and their column lists.
    pub async fn inspect_views(
        conn: &mut MySqlConnection,
        schema: &mut Schema,
    ) -> Result<(), DialectError> {
        let rows = sqlx::query(
            "SELECT table_name, view_definition FROM information_schema.views \
             WHERE table_schema = DATABASE() ORDER BY table_name",
        )
        .fetch_all(&mut *conn)
        .await
        .map_err(DialectError::inspect("views"))?;

        for row in rows {
            let name: String = row.try_get("table_name")?;
            let definition: Option<String> = row.try_get("view_definition")?;
            let Some(definition) = definition else { continue };

            let mut view = View::new(name, definition);
            view.columns = sqlx::query_scalar::<_, String>(
                "SELECT column_name FROM information_schema.columns \
                 WHERE table_schema = DATABASE() AND table_name = ? \
                 ORDER BY ordinal_position",
            )
            .bind(&view.name)
            .fetch_all(&mut *conn)
            .await
            .map_err(DialectError::inspect(format!("columns of view {}", view.name)))?;

            schema.views.push(view);
        }
        Ok(())
    }

    /// Reads stored functions and their parameters.
    pub async fn inspect_functions(
        conn: &mut MySqlConnection,
        schema: &mut Schema,
    ) -> Result<(), DialectError> {
        let rows = sqlx::query(
            "SELECT routine_name, data_type, routine_definition, is_deterministic \
             FROM information_schema.routines \
             WHERE routine_schema = DATABASE() AND routine_type = 'FUNCTION' \
             ORDER BY routine_name",
        )
        .fetch_all(&mut *conn)
        .await
        .map_err(DialectError::inspect("functions"))?;

        for row in rows {
            let name: String = row.try_get("routine_name")?;
            let returns: String = row.try_get("data_type")?;
            let body: Option<String> = row.try_get("routine_definition")?;
            let deterministic: String = row.try_get("is_deterministic")?;
            let Some(body) = body else { continue };

            let body = body
                .trim()
                .strip_prefix("BEGIN")
                .and_then(|b| b.strip_suffix("END"))
                .map(|b| b.trim().to_string())
                .unwrap_or(body);

            let mut function = Function::new(name, returns, body);
            function.language = "sql".to_string();
            function.volatility = if deterministic == "YES" {
                Volatility::Immutable
            } else {
                Volatility::Stable
            };
            function.arguments =
                Self::inspect_function_parameters(&mut *conn, &function.name).await?;
            schema.functions.push(function);
        }
        Ok(())
    }

    async fn inspect_function_parameters(
        conn: &mut MySqlConnection,
        function: &str,
    ) -> Result<Vec<FunctionArg>, DialectError> {
        let rows = sqlx::query(
            "SELECT parameter_name, data_type, \
                    CAST(character_maximum_length AS SIGNED) AS character_maximum_length, \
                    CAST(numeric_precision AS SIGNED) AS numeric_precision \
             FROM information_schema.parameters \
             WHERE specific_name = ? AND specific_schema = DATABASE() \
               AND ordinal_position > 0 \
             ORDER BY ordinal_position",
        )
        .bind(function)
        .fetch_all(conn)
        .await
        .map_err(DialectError::inspect(format!("parameters of {function}")))?;

        let mut args = Vec::new();
        for row in rows {
            let name: Option<String> = row.try_get("parameter_name")?;
            let data_type: String = row.try_get("data_type")?;
            let char_length: Option<i64> = row.try_get("character_maximum_length")?;
            let precision: Option<i64> = row.try_get("numeric_precision")?;

            let full_type = match (char_length, precision) {
                (Some(len), _) if len > 0 => format!("{data_type}({len})"),
                (_, Some(p)) if p > 0 => format!("{data_type}({p})"),
                _ => data_type,
            };
            let mut arg = FunctionArg::new(name.unwrap_or_default(), full_type);
            arg.name = arg.name.trim().to_string();
            args.push(arg);
        }
        Ok(args)
    }

    /// Reads triggers. MySQL triggers have one event each, always fire
    /// per row, and carry their body inline.
    pub async fn inspect_triggers(
        conn: &mut MySqlConnection,
        schema: &mut Schema,
    ) -> Result<(), DialectError> {
        let rows = sqlx::query(
            "SELECT trigger_name, event_manipulation, action_timing, \
                    event_object_table, action_statement \
             FROM information_schema.triggers \
             WHERE trigger_schema = DATABASE() \
             ORDER BY trigger_name",
        )
        .fetch_all(conn)
        .await
        .map_err(DialectError::inspect("triggers"))?;

        for row in rows {
            let name: String = row.try_get("trigger_name")?;
            let event: String = row.try_get("event_manipulation")?;
            let timing: String = row.try_get("action_timing")?;
            let table: String = row.try_get("event_object_table")?;
            let action: String = row.try_get("action_statement")?;

            let body = action
                .trim()
                .strip_prefix("BEGIN")
                .and_then(|b| b.strip_suffix("END"))
                .map(|b| b.trim().to_string())
                .unwrap_or(action);

            let mut trigger = Trigger::new(name, table, body);
            trigger.timing = match timing.as_str() {
                "AFTER" => TriggerTiming::After,
                _ => TriggerTiming::Before,
            };
            trigger.events = TriggerEvent::parse(&event).into_iter().collect();
            trigger.for_each = TriggerScope::Row;
            schema.triggers.push(trigger);
        }
        Ok(())
    }
}

fn normalize_rule(rule: &str) -> String {
    if rule.eq_ignore_ascii_case("NO ACTION") {
        String::new()
    } else {
        rule.to_string()
    }
}
