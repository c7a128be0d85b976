//! MySQL SQL emission.

use strata_schema::{Change, Column, ForeignKey, Function, Index, Table, Trigger, View, Volatility};

use super::{quote_identifier, quote_literal, MySql};
use crate::{DialectError, SqlGenerator};

impl SqlGenerator for MySql {
    fn dialect_name(&self) -> &'static str {
        "mysql"
    }

    fn generate_sql(&self, change: &Change) -> Result<String, DialectError> {
        match change {
            // MySQL schemas are databases.
            Change::CreateSchema { name } => {
                Ok(format!("CREATE DATABASE {};", quote_identifier(name)))
            }
            Change::DropSchema { name } => {
                Ok(format!("DROP DATABASE {};", quote_identifier(name)))
            }
            Change::EnableExtension { .. } | Change::DisableExtension { .. } => Err(
                DialectError::Unsupported("extensions are not supported by MySQL".into()),
            ),
            Change::CreateSequence { .. }
            | Change::AlterSequence { .. }
            | Change::DropSequence { .. } => Err(DialectError::Unsupported(
                "sequences are not supported by MySQL; use AUTO_INCREMENT instead".into(),
            )),
            Change::CreateRowPolicy { .. }
            | Change::AlterRowPolicy { .. }
            | Change::DropRowPolicy { .. } => Err(DialectError::Unsupported(
                "row-level security policies are not supported by MySQL".into(),
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
            Change::DropColumn { table, column } => Ok(format!(
                "ALTER TABLE {} DROP COLUMN {};",
                quote_identifier(table),
                quote_identifier(column)
            )),
            Change::AlterColumn { table, column } => Ok(format!(
                "ALTER TABLE {} MODIFY COLUMN {};",
                quote_identifier(table),
                column_sql(column)
            )),
            Change::AddPrimaryKey { table, primary_key } => Ok(format!(
                "ALTER TABLE {} ADD PRIMARY KEY ({});",
                quote_identifier(table),
                quote_columns(&primary_key.columns)
            )),
            Change::DropPrimaryKey { table, .. } => Ok(format!(
                "ALTER TABLE {} DROP PRIMARY KEY;",
                quote_identifier(table)
            )),
            Change::AddIndex { table, index } => Ok(add_index(table, index)),
            Change::DropIndex { table, name } => Ok(format!(
                "DROP INDEX {} ON {};",
                quote_identifier(name),
                quote_identifier(table)
            )),
            Change::AddForeignKey { table, foreign_key } => Ok(add_foreign_key(table, foreign_key)),
            Change::DropForeignKey { table, name } => Ok(format!(
                "ALTER TABLE {} DROP FOREIGN KEY {};",
                quote_identifier(table),
                quote_identifier(name)
            )),
            Change::CreateFunction { function } => Ok(create_function(function)),
            Change::AlterFunction { function } => {
                // No in-place redefinition of bodies; drop and
                // recreate.
                Ok(format!(
                    "DROP FUNCTION IF EXISTS {};\n{}",
                    quote_identifier(&function.name),
                    create_function(function)
                ))
            }
            Change::DropFunction { name, .. } => Ok(format!(
                "DROP FUNCTION IF EXISTS {};",
                quote_identifier(name)
            )),
            Change::CreateView { view } => Ok(view_sql("CREATE VIEW", view)),
            Change::AlterView { view } => Ok(view_sql("CREATE OR REPLACE VIEW", view)),
            Change::DropView { name, .. } => Ok(format!(
                "DROP VIEW IF EXISTS {};",
                quote_identifier(name)
            )),
            Change::CreateTrigger { trigger } => trigger_sql(trigger),
            Change::AlterTrigger { trigger } => {
                let create = trigger_sql(trigger)?;
                Ok(format!(
                    "DROP TRIGGER IF EXISTS {};\n{create}",
                    quote_identifier(&trigger.name)
                ))
            }
            Change::DropTrigger { name, .. } => Ok(format!(
                "DROP TRIGGER IF EXISTS {};",
                quote_identifier(name)
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

fn column_sql(column: &Column) -> String {
    let mut sql = format!(
        "{} {}",
        quote_identifier(&column.name),
        column.column_type.sql()
    );
    if !column.nullable {
        sql.push_str(" NOT NULL");
    }
    if column.auto_increment {
        sql.push_str(" AUTO_INCREMENT");
    }
    if let Some(default) = &column.default {
        sql.push_str(&format!(" DEFAULT {default}"));
    }
    if let Some(comment) = &column.comment {
        sql.push_str(&format!(" COMMENT {}", quote_literal(comment)));
    }
    sql
}

fn create_table(table: &Table) -> String {
    let mut parts: Vec<String> = table.columns.iter().map(column_sql).collect();

    if let Some(pk) = &table.primary_key {
        parts.push(format!("PRIMARY KEY ({})", quote_columns(&pk.columns)));
    }
    for fk in &table.foreign_keys {
        parts.push(foreign_key_clause(fk));
    }

    let mut sql = format!(
        "CREATE TABLE {} ({}) ENGINE=InnoDB;",
        quote_identifier(&table.name),
        parts.join(", ")
    );
    for index in &table.indexes {
        sql.push('\n');
        sql.push_str(&add_index(&table.name, index));
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

fn add_index(table: &str, index: &Index) -> String {
    let kind = if index.unique { "UNIQUE INDEX" } else { "INDEX" };
    format!(
        "CREATE {kind} {} ON {} ({});",
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

fn create_function(function: &Function) -> String {
    let mut args = Vec::new();
    for arg in &function.arguments {
        let mut spec = String::new();
        if !arg.name.is_empty() {
            spec.push_str(&arg.name);
            spec.push(' ');
        }
        spec.push_str(&arg.arg_type);
        args.push(spec);
    }

    let deterministic = if function.volatility == Volatility::Immutable {
        "DETERMINISTIC"
    } else {
        "NOT DETERMINISTIC"
    };

    format!(
        "CREATE FUNCTION {}({})\nRETURNS {}\n{deterministic}\nBEGIN\n{}\nEND;",
        quote_identifier(&function.name),
        args.join(", "),
        function.returns,
        function.body
    )
}

fn view_sql(command: &str, view: &View) -> String {
    let mut sql = format!("{command} {}", quote_identifier(&view.name));
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

fn trigger_sql(trigger: &Trigger) -> Result<String, DialectError> {
    if trigger.when.is_some() {
        return Err(DialectError::Unsupported(
            "MySQL does not support WHEN conditions on triggers".into(),
        ));
    }
    // MySQL triggers fire on exactly one event and embed the body
    // directly; `function` holds the action statement.
    let Some(event) = trigger.events.first() else {
        return Err(DialectError::Unsupported(
            "MySQL triggers require exactly one event".into(),
        ));
    };

    let mut body = trigger.function.trim().to_string();
    if !body.ends_with(';') {
        body.push(';');
    }

    Ok(format!(
        "CREATE TRIGGER {}\n{} {} ON {}\nFOR EACH ROW\nBEGIN\n{}\nEND;",
        quote_identifier(&trigger.name),
        trigger.timing.as_sql(),
        event.as_sql(),
        quote_identifier(&trigger.table),
        body
    ))
}
