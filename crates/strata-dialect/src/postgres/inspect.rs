//! PostgreSQL catalog introspection.

use sqlx::{PgConnection, Row};
use strata_schema::{
    ArgMode, FunctionArg, FunctionOption, PolicyCommand, Schema, SequenceOption, Table, Trigger,
    TriggerEvent, TriggerScope, TriggerTiming, View, Volatility,
};

use super::{column_type_from_catalog, parse_pg_array, Postgres};
use crate::{DialectError, MIGRATIONS_TABLE};

impl Postgres {
    /// Reads the live database into a schema value.
    ///
    /// Only the `public` namespace is inspected; the migration log
    /// table is excluded.
    pub async fn introspect(conn: &mut PgConnection) -> Result<Schema, DialectError> {
        let mut schema = Schema::new();

        Self::inspect_extensions(&mut *conn, &mut schema).await?;
        Self::inspect_sequences(&mut *conn, &mut schema).await?;
        Self::inspect_functions(&mut *conn, &mut schema).await?;
        Self::inspect_views(&mut *conn, &mut schema).await?;
        Self::inspect_row_policies(&mut *conn, &mut schema).await?;

        for table_name in Self::inspect_tables(&mut *conn).await? {
            let mut table = Table::new(table_name);
            Self::inspect_columns(&mut *conn, &mut table).await?;
            Self::inspect_primary_key(&mut *conn, &mut table).await?;
            Self::inspect_indexes(&mut *conn, &mut table).await?;
            Self::inspect_foreign_keys(&mut *conn, &mut table).await?;
            schema.tables.push(table);
        }

        // Triggers last so their tables and functions already exist in
        // the model.
        Self::inspect_triggers(&mut *conn, &mut schema).await?;

        Ok(schema)
    }

    /// Lists user tables in the public namespace.
    pub async fn inspect_tables(conn: &mut PgConnection) -> Result<Vec<String>, DialectError> {
        let names = sqlx::query_scalar::<_, String>(
            "SELECT table_name FROM information_schema.tables \
             WHERE table_schema = 'public' AND table_type = 'BASE TABLE' \
             AND table_name <> $1 ORDER BY table_name",
        )
        .bind(MIGRATIONS_TABLE)
        .fetch_all(conn)
        .await
        .map_err(DialectError::inspect("tables"))?;
        Ok(names)
    }

    /// Lists schema namespaces, excluding the system ones.
    pub async fn inspect_schemas(conn: &mut PgConnection) -> Result<Vec<String>, DialectError> {
        let names = sqlx::query_scalar::<_, String>(
            "SELECT schema_name FROM information_schema.schemata \
             WHERE schema_name NOT IN ('information_schema', 'pg_catalog', 'pg_toast') \
             ORDER BY schema_name",
        )
        .fetch_all(conn)
        .await
        .map_err(DialectError::inspect("schemas"))?;
        Ok(names)
    }

    /// Reads all columns of a table, in ordinal order.
    pub async fn inspect_columns(
        conn: &mut PgConnection,
        table: &mut Table,
    ) -> Result<(), DialectError> {
        let rows = sqlx::query(
            "SELECT c.column_name, c.data_type, c.udt_name, c.is_nullable, c.column_default, \
                    c.character_maximum_length, c.numeric_precision, c.numeric_scale, \
                    pd.description AS column_comment \
             FROM information_schema.columns c \
             LEFT JOIN pg_catalog.pg_statio_all_tables st \
                    ON c.table_schema = st.schemaname AND c.table_name = st.relname \
             LEFT JOIN pg_catalog.pg_description pd \
                    ON st.relid = pd.objoid AND pd.objsubid = c.ordinal_position \
             WHERE c.table_schema = 'public' AND c.table_name = $1 \
             ORDER BY c.ordinal_position",
        )
        .bind(&table.name)
        .fetch_all(conn)
        .await
        .map_err(DialectError::inspect(format!("columns of {}", table.name)))?;

        for row in rows {
            let name: String = row.try_get("column_name")?;
            let data_type: String = row.try_get("data_type")?;
            let udt_name: String = row.try_get("udt_name")?;
            let is_nullable: String = row.try_get("is_nullable")?;
            let default: Option<String> = row.try_get("column_default")?;
            let char_length: Option<i32> = row.try_get("character_maximum_length")?;
            let precision: Option<i32> = row.try_get("numeric_precision")?;
            let scale: Option<i32> = row.try_get("numeric_scale")?;
            let comment: Option<String> = row.try_get("column_comment")?;

            let column_type =
                column_type_from_catalog(&data_type, &udt_name, char_length, precision, scale);
            let auto_increment = default
                .as_deref()
                .is_some_and(|d| d.starts_with("nextval("));

            let column = table.column(name, column_type, &[]);
            column.nullable = is_nullable == "YES";
            column.default = default;
            column.comment = comment.filter(|c| !c.is_empty());
            column.auto_increment = auto_increment;
        }
        Ok(())
    }

    /// Reads the table's primary key constraint, if any.
    pub async fn inspect_primary_key(
        conn: &mut PgConnection,
        table: &mut Table,
    ) -> Result<(), DialectError> {
        let rows = sqlx::query(
            "SELECT tc.constraint_name, kcu.column_name \
             FROM information_schema.table_constraints tc \
             JOIN information_schema.key_column_usage kcu \
               ON tc.constraint_name = kcu.constraint_name \
             WHERE tc.table_schema = 'public' AND tc.table_name = $1 \
               AND tc.constraint_type = 'PRIMARY KEY' \
             ORDER BY kcu.ordinal_position",
        )
        .bind(&table.name)
        .fetch_all(conn)
        .await
        .map_err(DialectError::inspect(format!("primary key of {}", table.name)))?;

        let mut pk_name = String::new();
        let mut columns = Vec::new();
        for row in rows {
            let constraint: String = row.try_get("constraint_name")?;
            let column: String = row.try_get("column_name")?;
            if pk_name.is_empty() {
                pk_name = constraint;
            }
            columns.push(column);
        }

        if !columns.is_empty() {
            let column_refs: Vec<&str> = columns.iter().map(String::as_str).collect();
            table.set_primary_key(pk_name, &column_refs);
        }
        Ok(())
    }

    /// Reads secondary indexes, excluding the one backing the primary
    /// key.
    pub async fn inspect_indexes(
        conn: &mut PgConnection,
        table: &mut Table,
    ) -> Result<(), DialectError> {
        let rows = sqlx::query(
            "SELECT i.relname AS index_name, a.attname AS column_name, \
                    ix.indisunique AS is_unique \
             FROM pg_index ix \
             JOIN pg_class i ON i.oid = ix.indexrelid \
             JOIN pg_class t ON t.oid = ix.indrelid \
             JOIN pg_attribute a ON a.attrelid = t.oid AND a.attnum = ANY(ix.indkey) \
             JOIN pg_namespace n ON t.relnamespace = n.oid \
             LEFT JOIN pg_constraint c ON c.conindid = ix.indexrelid \
             WHERE t.relname = $1 AND n.nspname = 'public' \
               AND (c.contype IS NULL OR c.contype != 'p') \
             ORDER BY i.relname, a.attnum",
        )
        .bind(&table.name)
        .fetch_all(conn)
        .await
        .map_err(DialectError::inspect(format!("indexes of {}", table.name)))?;

        let mut grouped: std::collections::BTreeMap<String, (Vec<String>, bool)> =
            std::collections::BTreeMap::new();
        for row in rows {
            let index_name: String = row.try_get("index_name")?;
            let column: String = row.try_get("column_name")?;
            let unique: bool = row.try_get("is_unique")?;
            let entry = grouped.entry(index_name).or_default();
            entry.0.push(column);
            entry.1 = unique;
        }

        for (name, (columns, unique)) in grouped {
            table.indexes.push(strata_schema::Index { name, columns, unique });
        }
        Ok(())
    }

    /// Reads foreign keys, grouping composite keys by constraint name.
    pub async fn inspect_foreign_keys(
        conn: &mut PgConnection,
        table: &mut Table,
    ) -> Result<(), DialectError> {
        let rows = sqlx::query(
            "SELECT tc.constraint_name, kcu.column_name, \
                    ccu.table_name AS foreign_table_name, \
                    ccu.column_name AS foreign_column_name, \
                    rc.update_rule, rc.delete_rule \
             FROM information_schema.table_constraints tc \
             JOIN information_schema.key_column_usage kcu \
               ON tc.constraint_name = kcu.constraint_name \
             JOIN information_schema.constraint_column_usage ccu \
               ON tc.constraint_name = ccu.constraint_name \
             JOIN information_schema.referential_constraints rc \
               ON tc.constraint_name = rc.constraint_name \
             WHERE tc.table_schema = 'public' AND tc.table_name = $1 \
               AND tc.constraint_type = 'FOREIGN KEY' \
             ORDER BY tc.constraint_name, kcu.ordinal_position",
        )
        .bind(&table.name)
        .fetch_all(conn)
        .await
        .map_err(DialectError::inspect(format!("foreign keys of {}", table.name)))?;

        let mut grouped: std::collections::BTreeMap<String, strata_schema::ForeignKey> =
            std::collections::BTreeMap::new();
        for row in rows {
            let constraint: String = row.try_get("constraint_name")?;
            let column: String = row.try_get("column_name")?;
            let ref_table: String = row.try_get("foreign_table_name")?;
            let ref_column: String = row.try_get("foreign_column_name")?;
            let update_rule: String = row.try_get("update_rule")?;
            let delete_rule: String = row.try_get("delete_rule")?;

            let fk = grouped
                .entry(constraint.clone())
                .or_insert_with(|| strata_schema::ForeignKey {
                    name: constraint,
                    columns: Vec::new(),
                    ref_table,
                    ref_columns: Vec::new(),
                    on_delete: normalize_rule(&delete_rule),
                    on_update: normalize_rule(&update_rule),
                });
            fk.columns.push(column);
            fk.ref_columns.push(ref_column);
        }

        table.foreign_keys.extend(grouped.into_values());
        Ok(())
    }

    /// Reads installed extensions.
    pub async fn inspect_extensions(
        conn: &mut PgConnection,
        schema: &mut Schema,
    ) -> Result<(), DialectError> {
        // plpgsql ships installed in every database; surfacing it would
        // make every diff want to drop it.
        let names = sqlx::query_scalar::<_, String>(
            "SELECT extname FROM pg_extension WHERE extname <> 'plpgsql' ORDER BY extname",
        )
        .fetch_all(conn)
        .await
        .map_err(DialectError::inspect("extensions"))?;

        for name in names {
            schema.enable_extension(name);
        }
        Ok(())
    }

    /// Reads all sequences outside the system namespaces.
    pub async fn inspect_sequences(
        conn: &mut PgConnection,
        schema: &mut Schema,
    ) -> Result<(), DialectError> {
        let rows = sqlx::query(
            "SELECT schemaname, sequencename, start_value, increment_by, \
                    min_value, max_value, cache_size, cycle \
             FROM pg_sequences \
             WHERE schemaname NOT IN ('pg_catalog', 'information_schema') \
             ORDER BY schemaname, sequencename",
        )
        .fetch_all(conn)
        .await
        .map_err(DialectError::inspect("sequences"))?;

        for row in rows {
            let schema_name: String = row.try_get("schemaname")?;
            let name: String = row.try_get("sequencename")?;
            let start: i64 = row.try_get("start_value")?;
            let increment: i64 = row.try_get("increment_by")?;
            let min_value: i64 = row.try_get("min_value")?;
            let max_value: i64 = row.try_get("max_value")?;
            let cache: i64 = row.try_get("cache_size")?;
            let cycle: bool = row.try_get("cycle")?;

            let mut options = vec![
                SequenceOption::Start(start),
                SequenceOption::Increment(increment),
                SequenceOption::MinValue(min_value),
                SequenceOption::MaxValue(max_value),
                SequenceOption::Cache(cache),
            ];
            if cycle {
                options.push(SequenceOption::Cycle);
            }
            if schema_name != "public" {
                options.push(SequenceOption::InSchema(schema_name));
            }
            schema.create_sequence(name, &options);
        }
        Ok(())
    }

    /// Reads stored functions with their arguments and bodies.
    pub async fn inspect_functions(
        conn: &mut PgConnection,
        schema: &mut Schema,
    ) -> Result<(), DialectError> {
        let rows = sqlx::query(
            "SELECT n.nspname AS schema_name, p.proname AS function_name, \
                    pg_get_function_result(p.oid) AS result_type, \
                    pg_get_function_arguments(p.oid) AS argument_types, \
                    pg_get_functiondef(p.oid) AS definition, \
                    l.lanname AS language, p.provolatile::text AS volatility, \
                    p.proisstrict AS strict, p.prosecdef AS security_definer, \
                    p.procost AS cost \
             FROM pg_proc p \
             JOIN pg_namespace n ON p.pronamespace = n.oid \
             JOIN pg_language l ON p.prolang = l.oid \
             WHERE n.nspname NOT IN ('pg_catalog', 'information_schema') \
               AND p.prokind = 'f' \
               AND NOT EXISTS (SELECT 1 FROM pg_depend d \
                               WHERE d.objid = p.oid AND d.deptype = 'e') \
             ORDER BY n.nspname, p.proname",
        )
        .fetch_all(conn)
        .await
        .map_err(DialectError::inspect("functions"))?;

        for row in rows {
            let schema_name: String = row.try_get("schema_name")?;
            let name: String = row.try_get("function_name")?;
            let returns: String = row.try_get("result_type")?;
            let argument_str: String = row.try_get("argument_types")?;
            let definition: String = row.try_get("definition")?;
            let language: String = row.try_get("language")?;
            let volatility: String = row.try_get("volatility")?;
            let strict: bool = row.try_get("strict")?;
            let security_definer: bool = row.try_get("security_definer")?;
            let cost: f32 = row.try_get("cost")?;

            let mut options = vec![
                FunctionOption::Language(language),
                FunctionOption::Cost(cost as i32),
                FunctionOption::Args(parse_function_arguments(&argument_str)),
            ];
            options.push(match Volatility::parse(&volatility) {
                Volatility::Immutable => FunctionOption::Immutable,
                Volatility::Stable => FunctionOption::Stable,
                Volatility::Volatile => FunctionOption::Volatile,
            });
            options.push(if strict {
                FunctionOption::Strict
            } else {
                FunctionOption::NotStrict
            });
            options.push(if security_definer {
                FunctionOption::SecurityDefiner
            } else {
                FunctionOption::SecurityInvoker
            });
            if schema_name != "public" {
                options.push(FunctionOption::InSchema(schema_name));
            }

            schema.create_function(name, returns, extract_function_body(&definition), &options);
        }
        Ok(())
    }

    /// Reads views with their column lists.
    pub async fn inspect_views(
        conn: &mut PgConnection,
        schema: &mut Schema,
    ) -> Result<(), DialectError> {
        let rows = sqlx::query(
            "SELECT n.nspname AS schema_name, c.relname AS view_name, \
                    pg_get_viewdef(c.oid, true) AS definition, \
                    array_agg(a.attname ORDER BY a.attnum)::text AS columns \
             FROM pg_class c \
             JOIN pg_namespace n ON c.relnamespace = n.oid \
             LEFT JOIN pg_attribute a \
               ON c.oid = a.attrelid AND a.attnum > 0 AND NOT a.attisdropped \
             WHERE c.relkind = 'v' \
               AND n.nspname NOT IN ('pg_catalog', 'information_schema') \
             GROUP BY n.nspname, c.relname, c.oid \
             ORDER BY n.nspname, c.relname",
        )
        .fetch_all(conn)
        .await
        .map_err(DialectError::inspect("views"))?;

        for row in rows {
            let schema_name: String = row.try_get("schema_name")?;
            let name: String = row.try_get("view_name")?;
            let definition: String = row.try_get("definition")?;
            let columns: Option<String> = row.try_get("columns")?;

            let mut view = View::new(name, definition);
            if schema_name != "public" {
                view.schema = schema_name;
            }
            if let Some(columns) = columns {
                view.columns = parse_pg_array(&columns);
            }
            schema.views.push(view);
        }
        Ok(())
    }

    /// Reads row-level security policies.
    pub async fn inspect_row_policies(
        conn: &mut PgConnection,
        schema: &mut Schema,
    ) -> Result<(), DialectError> {
        let rows = sqlx::query(
            "SELECT schemaname, tablename, policyname, cmd, roles::text AS roles, \
                    qual, with_check, \
                    (permissive = 'PERMISSIVE') AS is_permissive \
             FROM pg_policies \
             ORDER BY schemaname, tablename, policyname",
        )
        .fetch_all(conn)
        .await
        .map_err(DialectError::inspect("row policies"))?;

        for row in rows {
            let schema_name: String = row.try_get("schemaname")?;
            let table: String = row.try_get("tablename")?;
            let name: String = row.try_get("policyname")?;
            let cmd: String = row.try_get("cmd")?;
            let roles: String = row.try_get("roles")?;
            let using_expr: Option<String> = row.try_get("qual")?;
            let check_expr: Option<String> = row.try_get("with_check")?;
            let permissive: bool = row.try_get("is_permissive")?;

            let policy = schema.create_row_policy(name, table, &[]);
            policy.command = PolicyCommand::parse(&cmd);
            policy.roles = parse_pg_array(&roles);
            policy.using_expr = using_expr;
            policy.check_expr = check_expr;
            policy.permissive = permissive;
            if schema_name != "public" {
                policy.schema = schema_name;
            }
        }
        Ok(())
    }

    /// Reads triggers by parsing `pg_get_triggerdef` output.
    pub async fn inspect_triggers(
        conn: &mut PgConnection,
        schema: &mut Schema,
    ) -> Result<(), DialectError> {
        let rows = sqlx::query(
            "SELECT n.nspname AS schema_name, c.relname AS table_name, \
                    t.tgname AS trigger_name, pg_get_triggerdef(t.oid) AS definition \
             FROM pg_trigger t \
             JOIN pg_class c ON t.tgrelid = c.oid \
             JOIN pg_namespace n ON c.relnamespace = n.oid \
             WHERE NOT t.tgisinternal \
               AND n.nspname NOT IN ('pg_catalog', 'information_schema') \
             ORDER BY n.nspname, c.relname, t.tgname",
        )
        .fetch_all(conn)
        .await
        .map_err(DialectError::inspect("triggers"))?;

        for row in rows {
            let schema_name: String = row.try_get("schema_name")?;
            let table: String = row.try_get("table_name")?;
            let name: String = row.try_get("trigger_name")?;
            let definition: String = row.try_get("definition")?;

            let parsed = parse_trigger_definition(&definition);
            let mut trigger = Trigger::new(name, table, parsed.function);
            trigger.timing = parsed.timing;
            trigger.events = parsed.events;
            trigger.for_each = parsed.for_each;
            trigger.when = parsed.when;
            trigger.arguments = parsed.arguments;
            if schema_name != "public" {
                trigger.schema = schema_name;
            }
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

/// Extracts the body between the `$function$` (or `$$`) delimiters of
/// a `pg_get_functiondef` result.
pub(crate) fn extract_function_body(definition: &str) -> String {
    for delimiter in ["$function$", "$$"] {
        let mut parts = definition.splitn(3, delimiter);
        let _head = parts.next();
        if let (Some(body), Some(_tail)) = (parts.next(), parts.next()) {
            return body.to_string();
        }
    }
    String::new()
}

/// Parses a `pg_get_function_arguments` string like
/// `a integer, OUT total bigint, b text DEFAULT 'x'`.
pub(crate) fn parse_function_arguments(arguments: &str) -> Vec<FunctionArg> {
    let mut parsed = Vec::new();
    if arguments.trim().is_empty() {
        return parsed;
    }

    for part in arguments.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        let (spec, default) = match part.split_once(" DEFAULT ") {
            Some((spec, default)) => (spec.trim(), Some(default.trim().to_string())),
            None => (part, None),
        };

        let mut fields = spec.split_whitespace().peekable();
        let mut arg = FunctionArg::default();
        if let Some(&first) = fields.peek() {
            let mode = ArgMode::parse(first);
            if mode != ArgMode::In || first.eq_ignore_ascii_case("IN") {
                arg.mode = mode;
                fields.next();
            }
        }

        let rest: Vec<&str> = fields.collect();
        match rest.len() {
            0 => continue,
            // Unnamed argument: everything is the type.
            1 => arg.arg_type = rest[0].to_string(),
            _ => {
                arg.name = rest[0].to_string();
                arg.arg_type = rest[1..].join(" ");
            }
        }
        arg.default = default;
        parsed.push(arg);
    }
    parsed
}

pub(crate) struct ParsedTriggerDef {
    pub timing: TriggerTiming,
    pub events: Vec<TriggerEvent>,
    pub for_each: TriggerScope,
    pub when: Option<String>,
    pub function: String,
    pub arguments: Vec<String>,
}

/// Parses a `pg_get_triggerdef` definition like
/// `CREATE TRIGGER t BEFORE INSERT OR UPDATE ON users FOR EACH ROW
/// WHEN (NEW.x IS NULL) EXECUTE FUNCTION f('a')`.
pub(crate) fn parse_trigger_definition(definition: &str) -> ParsedTriggerDef {
    let timing = if definition.contains("INSTEAD OF") {
        TriggerTiming::InsteadOf
    } else if definition.contains(" AFTER ") {
        TriggerTiming::After
    } else {
        TriggerTiming::Before
    };

    let mut events = Vec::new();
    if definition.contains(" INSERT ") {
        events.push(TriggerEvent::Insert);
    }
    if definition.contains(" UPDATE ") {
        events.push(TriggerEvent::Update);
    }
    if definition.contains(" DELETE ") {
        events.push(TriggerEvent::Delete);
    }

    let for_each = if definition.contains("FOR EACH STATEMENT") {
        TriggerScope::Statement
    } else {
        TriggerScope::Row
    };

    // WHEN clause: match parentheses so nested expressions survive.
    let when = definition.split_once("WHEN (").and_then(|(_, rest)| {
        let mut depth = 1usize;
        for (i, ch) in rest.char_indices() {
            match ch {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(rest[..i].to_string());
                    }
                }
                _ => {}
            }
        }
        None
    });

    // EXECUTE FUNCTION f(args) — older servers print PROCEDURE.
    let call = definition
        .split_once("EXECUTE FUNCTION ")
        .or_else(|| definition.split_once("EXECUTE PROCEDURE "))
        .map(|(_, call)| call.trim_end_matches(';').trim())
        .unwrap_or_default();

    let (function, arguments) = match call.split_once('(') {
        Some((name, rest)) => {
            let args_part = rest.trim_end_matches(')');
            let arguments = if args_part.is_empty() {
                Vec::new()
            } else {
                split_call_arguments(args_part)
            };
            (name.trim().to_string(), arguments)
        }
        None => (call.to_string(), Vec::new()),
    };

    ParsedTriggerDef { timing, events, for_each, when, function, arguments }
}

/// Splits a call argument list on commas outside single quotes.
fn split_call_arguments(args: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    for ch in args.chars() {
        match ch {
            '\'' => {
                in_quotes = !in_quotes;
                current.push(ch);
            }
            ',' if !in_quotes => {
                out.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    if !current.trim().is_empty() {
        out.push(current.trim().to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_body_extraction() {
        let def = "CREATE OR REPLACE FUNCTION public.add(a integer)\n RETURNS integer\n \
                   LANGUAGE plpgsql\nAS $function$ BEGIN RETURN a + 1; END; $function$";
        assert_eq!(extract_function_body(def), " BEGIN RETURN a + 1; END; ");
        assert_eq!(extract_function_body("no delimiters here"), "");
    }

    #[test]
    fn function_argument_parsing() {
        let args = parse_function_arguments("a integer, b text DEFAULT 'x'");
        assert_eq!(args.len(), 2);
        assert_eq!(args[0].name, "a");
        assert_eq!(args[0].arg_type, "integer");
        assert_eq!(args[0].mode, ArgMode::In);
        assert_eq!(args[1].name, "b");
        assert_eq!(args[1].default.as_deref(), Some("'x'"));

        let args = parse_function_arguments("OUT total bigint, VARIADIC rest text");
        assert_eq!(args[0].mode, ArgMode::Out);
        assert_eq!(args[0].name, "total");
        assert_eq!(args[1].mode, ArgMode::Variadic);

        // Unnamed argument: only a type.
        let args = parse_function_arguments("integer");
        assert_eq!(args[0].name, "");
        assert_eq!(args[0].arg_type, "integer");

        assert!(parse_function_arguments("").is_empty());
    }

    #[test]
    fn multi_word_types_survive_argument_parsing() {
        let args = parse_function_arguments("at timestamp with time zone");
        assert_eq!(args[0].name, "at");
        assert_eq!(args[0].arg_type, "timestamp with time zone");
    }

    #[test]
    fn trigger_definition_parsing() {
        let def = "CREATE TRIGGER users_touch BEFORE INSERT OR UPDATE ON public.users \
                   FOR EACH ROW WHEN ((new.updated_at IS NULL)) \
                   EXECUTE FUNCTION touch_updated_at('now', '1')";
        let parsed = parse_trigger_definition(def);
        assert_eq!(parsed.timing, TriggerTiming::Before);
        assert_eq!(parsed.events, vec![TriggerEvent::Insert, TriggerEvent::Update]);
        assert_eq!(parsed.for_each, TriggerScope::Row);
        assert_eq!(parsed.when.as_deref(), Some("(new.updated_at IS NULL)"));
        assert_eq!(parsed.function, "touch_updated_at");
        assert_eq!(parsed.arguments, vec!["'now'", "'1'"]);
    }

    #[test]
    fn trigger_definition_statement_level() {
        let def = "CREATE TRIGGER audit AFTER DELETE ON public.users \
                   FOR EACH STATEMENT EXECUTE PROCEDURE log_change()";
        let parsed = parse_trigger_definition(def);
        assert_eq!(parsed.timing, TriggerTiming::After);
        assert_eq!(parsed.events, vec![TriggerEvent::Delete]);
        assert_eq!(parsed.for_each, TriggerScope::Statement);
        assert!(parsed.when.is_none());
        assert_eq!(parsed.function, "log_change");
        assert!(parsed.arguments.is_empty());
    }
}
