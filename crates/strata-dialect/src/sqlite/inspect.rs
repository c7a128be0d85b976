//! SQLite introspection over `sqlite_master` and the PRAGMA surface.
//!
//! SQLite's catalog does not record constraint names, so the primary
//! key is reported as `{table}_pkey` and foreign keys as
//! `fk_{table}_{ref_table}`; builders that want clean diffs against
//! SQLite should use the same convention.

use regex::Regex;
use sqlx::{Row, SqliteConnection};
use strata_schema::{
    Schema, Table, Trigger, TriggerEvent, TriggerScope, TriggerTiming, View,
};

use super::{parse_declared_type, quote_identifier, Sqlite};
use crate::{DialectError, MIGRATIONS_TABLE};

impl Sqlite {
    /// Reads the live database into a schema value.
    pub async fn introspect(conn: &mut SqliteConnection) -> Result<Schema, DialectError> {
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
        Self::inspect_triggers(&mut *conn, &mut schema).await?;

        Ok(schema)
    }

    /// Lists user tables, excluding SQLite internals and the migration
    /// log.
    pub async fn inspect_tables(conn: &mut SqliteConnection) -> Result<Vec<String>, DialectError> {
        let names = sqlx::query_scalar::<_, String>(
            "SELECT name FROM sqlite_master \
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%' AND name <> ? \
             ORDER BY name",
        )
        .bind(MIGRATIONS_TABLE)
        .fetch_all(conn)
        .await
        .map_err(DialectError::inspect("tables"))?;
        Ok(names)
    }

    /// Reads columns from `PRAGMA table_info`.
    pub async fn inspect_columns(
        conn: &mut SqliteConnection,
        table: &mut Table,
    ) -> Result<(), DialectError> {
        let rows = sqlx::query(&format!(
            "PRAGMA table_info({})",
            quote_identifier(&table.name)
        ))
        .fetch_all(&mut *conn)
        .await
        .map_err(DialectError::inspect(format!("columns of {}", table.name)))?;

        let create_sql = autoincrement_create_sql(conn, &table.name).await?;

        for row in rows {
            let name: String = row.try_get("name")?;
            let declared: String = row.try_get("type")?;
            let notnull: i64 = row.try_get("notnull")?;
            let default: Option<String> = row.try_get("dflt_value")?;

            let column = table.column(name, parse_declared_type(&declared), &[]);
            column.nullable = notnull == 0;
            column.default = default;
            if let Some(create_sql) = &create_sql {
                column.auto_increment = column_is_autoincrement(create_sql, &column.name);
            }
        }
        Ok(())
    }

    /// Reads the primary key columns from `PRAGMA table_info`, in key
    /// order. The constraint name is synthesized as `{table}_pkey`.
    pub async fn inspect_primary_key(
        conn: &mut SqliteConnection,
        table: &mut Table,
    ) -> Result<(), DialectError> {
        let rows = sqlx::query(&format!(
            "PRAGMA table_info({})",
            quote_identifier(&table.name)
        ))
        .fetch_all(conn)
        .await
        .map_err(DialectError::inspect(format!("primary key of {}", table.name)))?;

        let mut pk_columns: Vec<(i64, String)> = Vec::new();
        for row in rows {
            let pk: i64 = row.try_get("pk")?;
            if pk > 0 {
                pk_columns.push((pk, row.try_get("name")?));
            }
        }
        pk_columns.sort_by_key(|(position, _)| *position);

        if !pk_columns.is_empty() {
            let columns: Vec<String> = pk_columns.into_iter().map(|(_, name)| name).collect();
            let refs: Vec<&str> = columns.iter().map(String::as_str).collect();
            table.set_primary_key(format!("{}_pkey", table.name), &refs);
        }
        Ok(())
    }

    /// Reads explicitly created indexes (`origin = 'c'`); automatic
    /// ones backing UNIQUE or PRIMARY KEY constraints are skipped.
    pub async fn inspect_indexes(
        conn: &mut SqliteConnection,
        table: &mut Table,
    ) -> Result<(), DialectError> {
        let rows = sqlx::query(&format!(
            "PRAGMA index_list({})",
            quote_identifier(&table.name)
        ))
        .fetch_all(&mut *conn)
        .await
        .map_err(DialectError::inspect(format!("indexes of {}", table.name)))?;

        for row in rows {
            let name: String = row.try_get("name")?;
            let unique: i64 = row.try_get("unique")?;
            let origin: String = row.try_get("origin")?;
            if origin != "c" || name.starts_with("sqlite_") {
                continue;
            }

            let column_rows = sqlx::query(&format!("PRAGMA index_info({})", quote_identifier(&name)))
                .fetch_all(&mut *conn)
                .await
                .map_err(DialectError::inspect(format!("index {name}")))?;

            let mut columns: Vec<(i64, String)> = Vec::new();
            for column_row in column_rows {
                let seqno: i64 = column_row.try_get("seqno")?;
                let column: String = column_row.try_get("name")?;
                columns.push((seqno, column));
            }
            columns.sort_by_key(|(seqno, _)| *seqno);

            table.indexes.push(strata_schema::Index {
                name,
                columns: columns.into_iter().map(|(_, c)| c).collect(),
                unique: unique != 0,
            });
        }
        Ok(())
    }

    /// Reads foreign keys from `PRAGMA foreign_key_list`, grouping
    /// composite keys by id and synthesizing
    /// `fk_{table}_{ref_table}` names.
    pub async fn inspect_foreign_keys(
        conn: &mut SqliteConnection,
        table: &mut Table,
    ) -> Result<(), DialectError> {
        let rows = sqlx::query(&format!(
            "PRAGMA foreign_key_list({})",
            quote_identifier(&table.name)
        ))
        .fetch_all(conn)
        .await
        .map_err(DialectError::inspect(format!("foreign keys of {}", table.name)))?;

        let mut grouped: std::collections::BTreeMap<i64, strata_schema::ForeignKey> =
            std::collections::BTreeMap::new();
        for row in rows {
            let id: i64 = row.try_get("id")?;
            let ref_table: String = row.try_get("table")?;
            let from: String = row.try_get("from")?;
            let to: Option<String> = row.try_get("to")?;
            let on_update: String = row.try_get("on_update")?;
            let on_delete: String = row.try_get("on_delete")?;

            let fk = grouped.entry(id).or_insert_with(|| strata_schema::ForeignKey {
                name: format!("fk_{}_{}", table.name, ref_table.to_lowercase()),
                columns: Vec::new(),
                ref_table,
                ref_columns: Vec::new(),
                on_delete: normalize_rule(&on_delete),
                on_update: normalize_rule(&on_update),
            });
            fk.columns.push(from);
            fk.ref_columns.push(to.unwrap_or_default());
        }

        table.foreign_keys.extend(grouped.into_values());
        Ok(())
    }

    /// Reads views from `sqlite_master`, extracting the definition
    /// after `AS` and the column list from `PRAGMA table_info`.
    pub async fn inspect_views(
        conn: &mut SqliteConnection,
        schema: &mut Schema,
    ) -> Result<(), DialectError> {
        let rows = sqlx::query(
            "SELECT name, sql FROM sqlite_master WHERE type = 'view' ORDER BY name",
        )
        .fetch_all(&mut *conn)
        .await
        .map_err(DialectError::inspect("views"))?;

        for row in rows {
            let name: String = row.try_get("name")?;
            let sql: String = row.try_get("sql")?;

            let mut view = View::new(&name, extract_view_definition(&sql));
            let column_rows = sqlx::query(&format!("PRAGMA table_info({})", quote_identifier(&name)))
                .fetch_all(&mut *conn)
                .await
                .map_err(DialectError::inspect(format!("columns of view {name}")))?;
            for column_row in column_rows {
                view.columns.push(column_row.try_get("name")?);
            }
            schema.views.push(view);
        }
        Ok(())
    }

    /// Reads triggers from `sqlite_master`, parsing timing, events,
    /// scope and WHEN condition out of the stored definition. The body
    /// stays inline; there is no separate function object.
    pub async fn inspect_triggers(
        conn: &mut SqliteConnection,
        schema: &mut Schema,
    ) -> Result<(), DialectError> {
        let rows = sqlx::query(
            "SELECT name, tbl_name, sql FROM sqlite_master WHERE type = 'trigger' ORDER BY name",
        )
        .fetch_all(conn)
        .await
        .map_err(DialectError::inspect("triggers"))?;

        for row in rows {
            let name: String = row.try_get("name")?;
            let table: String = row.try_get("tbl_name")?;
            let sql: String = row.try_get("sql")?;

            let parsed = parse_trigger_sql(&sql);
            let mut trigger = Trigger::new(name, table, parsed.body);
            trigger.timing = parsed.timing;
            trigger.events = parsed.events;
            trigger.for_each = parsed.for_each;
            trigger.when = parsed.when;
            schema.triggers.push(trigger);
        }
        Ok(())
    }
}

fn normalize_rule(rule: &str) -> String {
    let upper = rule.to_uppercase();
    if upper == "NO ACTION" {
        String::new()
    } else {
        upper
    }
}

/// Fetches the uppercased CREATE TABLE statement, or `None` when the
/// table carries no AUTOINCREMENT at all.
async fn autoincrement_create_sql(
    conn: &mut SqliteConnection,
    table: &str,
) -> Result<Option<String>, DialectError> {
    let create_sql: Option<String> = sqlx::query_scalar(
        "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = ?",
    )
    .bind(table)
    .fetch_optional(conn)
    .await
    .map_err(DialectError::inspect(format!("definition of {table}")))?;

    Ok(create_sql
        .map(|sql| sql.to_uppercase())
        .filter(|sql| sql.contains("AUTOINCREMENT")))
}

/// True when the column's definition inside the uppercased CREATE
/// TABLE statement carries AUTOINCREMENT.
fn column_is_autoincrement(create_sql: &str, column: &str) -> bool {
    let pattern = format!(
        r#""?{}"?\s+[^,]*AUTOINCREMENT"#,
        regex::escape(&column.to_uppercase())
    );
    Regex::new(&pattern).map(|re| re.is_match(create_sql)).unwrap_or(false)
}

/// Extracts the `SELECT …` part after the `AS` keyword of a stored
/// view definition.
pub(crate) fn extract_view_definition(sql: &str) -> String {
    let upper = sql.to_uppercase();
    let bytes = upper.as_bytes();
    for (i, window) in bytes.windows(4).enumerate() {
        let lead = window[0];
        let trail = window[3];
        if (lead == b' ' || lead == b'\n' || lead == b'\t')
            && &window[1..3] == b"AS"
            && (trail == b' ' || trail == b'\n' || trail == b'\t')
        {
            return sql[i + 4..].trim().to_string();
        }
    }
    sql.to_string()
}

pub(crate) struct ParsedTriggerSql {
    pub timing: TriggerTiming,
    pub events: Vec<TriggerEvent>,
    pub for_each: TriggerScope,
    pub when: Option<String>,
    pub body: String,
}

/// Parses a stored `CREATE TRIGGER` statement.
pub(crate) fn parse_trigger_sql(sql: &str) -> ParsedTriggerSql {
    let upper = sql.to_uppercase();

    let timing = if upper.contains("INSTEAD OF") {
        TriggerTiming::InsteadOf
    } else if upper.contains("AFTER ") {
        TriggerTiming::After
    } else {
        TriggerTiming::Before
    };

    let mut events = Vec::new();
    for (needle, event) in [
        ("INSERT", TriggerEvent::Insert),
        ("UPDATE", TriggerEvent::Update),
        ("DELETE", TriggerEvent::Delete),
    ] {
        // Only the part before BEGIN describes the firing events.
        let head = upper.split("BEGIN").next().unwrap_or(&upper);
        if head.contains(needle) {
            events.push(event);
        }
    }

    let for_each = if upper.contains("FOR EACH STATEMENT") {
        TriggerScope::Statement
    } else {
        TriggerScope::Row
    };

    let when = upper.find("WHEN (").and_then(|start| {
        let rest = &sql[start + "WHEN (".len()..];
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

    let body = match (upper.find("BEGIN"), upper.rfind("END")) {
        (Some(begin), Some(end)) if end > begin => {
            sql[begin + "BEGIN".len()..end].trim().trim_end_matches(';').to_string()
        }
        _ => String::new(),
    };

    ParsedTriggerSql { timing, events, for_each, when, body }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_definition_extraction() {
        assert_eq!(
            extract_view_definition("CREATE VIEW v AS SELECT 1"),
            "SELECT 1"
        );
        assert_eq!(
            extract_view_definition("CREATE VIEW v (a, b)\nAS\nSELECT a, b FROM t"),
            "SELECT a, b FROM t"
        );
    }

    #[test]
    fn trigger_sql_parsing() {
        let sql = "CREATE TRIGGER touch_users\nAFTER UPDATE ON \"users\"\nFOR EACH ROW\n\
                   WHEN (NEW.id > 0)\nBEGIN\n  UPDATE users SET updated_at = 1;\nEND";
        let parsed = parse_trigger_sql(sql);
        assert_eq!(parsed.timing, TriggerTiming::After);
        assert_eq!(parsed.events, vec![TriggerEvent::Update]);
        assert_eq!(parsed.for_each, TriggerScope::Row);
        assert_eq!(parsed.when.as_deref(), Some("NEW.id > 0"));
        assert_eq!(parsed.body, "UPDATE users SET updated_at = 1");
    }

    #[test]
    fn trigger_sql_defaults() {
        let parsed = parse_trigger_sql(
            "CREATE TRIGGER t BEFORE INSERT ON x BEGIN SELECT 1; END",
        );
        assert_eq!(parsed.timing, TriggerTiming::Before);
        assert_eq!(parsed.events, vec![TriggerEvent::Insert]);
        assert!(parsed.when.is_none());
        assert_eq!(parsed.body, "SELECT 1");
    }
}
