//! Human-readable schema rendering, for debug output and review.

use std::fmt;

use crate::schema::Schema;

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Schema: {}", self.name)?;

        if !self.extensions.is_empty() {
            write!(f, "\n  Extensions:")?;
            for ext in &self.extensions {
                write!(f, "\n    {ext}")?;
            }
        }

        if !self.sequences.is_empty() {
            write!(f, "\n  Sequences:")?;
            for seq in &self.sequences {
                write!(f, "\n    {}{} (START {}", prefix(&seq.schema), seq.name, seq.start)?;
                if seq.increment != 1 {
                    write!(f, ", INCREMENT {}", seq.increment)?;
                }
                if seq.min_value != 1 {
                    write!(f, ", MINVALUE {}", seq.min_value)?;
                }
                if seq.max_value != i64::MAX {
                    write!(f, ", MAXVALUE {}", seq.max_value)?;
                }
                if seq.cache != 1 {
                    write!(f, ", CACHE {}", seq.cache)?;
                }
                if seq.cycle {
                    write!(f, ", CYCLE")?;
                }
                write!(f, ")")?;
            }
        }

        if !self.functions.is_empty() {
            write!(f, "\n  Functions:")?;
            for function in &self.functions {
                let args: Vec<String> = function
                    .arguments
                    .iter()
                    .map(|arg| {
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
                        spec
                    })
                    .collect();
                write!(
                    f,
                    "\n    {}{}({}) RETURNS {} [{}]",
                    prefix(&function.schema),
                    function.name,
                    args.join(", "),
                    function.returns,
                    function.language
                )?;
            }
        }

        if !self.views.is_empty() {
            write!(f, "\n  Views:")?;
            for view in &self.views {
                write!(f, "\n    {}{}", prefix(&view.schema), view.name)?;
                if !view.columns.is_empty() {
                    write!(f, " ({})", view.columns.join(", "))?;
                }
            }
        }

        if !self.row_policies.is_empty() {
            write!(f, "\n  Row Policies:")?;
            for policy in &self.row_policies {
                write!(
                    f,
                    "\n    {} ON {}{} FOR {}",
                    policy.name,
                    prefix(&policy.schema),
                    policy.table,
                    policy.command.as_sql()
                )?;
            }
        }

        for table in &self.tables {
            write!(f, "\n  Table: {}{}", prefix(&table.schema), table.name)?;
            for column in &table.columns {
                write!(f, "\n    {} {}", column.name, column.column_type)?;
                if !column.nullable {
                    write!(f, " NOT NULL")?;
                }
                if let Some(default) = &column.default {
                    write!(f, " DEFAULT {default}")?;
                }
                if column.auto_increment {
                    write!(f, " AUTOINCREMENT")?;
                }
            }
            if let Some(pk) = &table.primary_key {
                write!(f, "\n    PRIMARY KEY {} ({})", pk.name, pk.columns.join(", "))?;
            }
            for index in &table.indexes {
                let unique = if index.unique { "UNIQUE INDEX" } else { "INDEX" };
                write!(f, "\n    {unique} {} ({})", index.name, index.columns.join(", "))?;
            }
            for fk in &table.foreign_keys {
                write!(
                    f,
                    "\n    FOREIGN KEY {} ({}) -> {} ({})",
                    fk.name,
                    fk.columns.join(", "),
                    fk.ref_table,
                    fk.ref_columns.join(", ")
                )?;
            }
        }

        if !self.triggers.is_empty() {
            write!(f, "\n  Triggers:")?;
            for trigger in &self.triggers {
                let events: Vec<&str> = trigger.events.iter().map(|e| e.as_sql()).collect();
                write!(
                    f,
                    "\n    {} {} {} ON {}{}",
                    trigger.name,
                    trigger.timing.as_sql(),
                    events.join(" OR "),
                    prefix(&trigger.schema),
                    trigger.table
                )?;
            }
        }

        Ok(())
    }
}

fn prefix(schema: &str) -> String {
    if schema.is_empty() || schema == "public" {
        String::new()
    } else {
        format!("{schema}.")
    }
}

#[cfg(test)]
mod tests {
    use crate::{ColumnOption, ColumnType, Schema, TriggerEvent, TriggerOption};

    #[test]
    fn renders_tables_and_constraints() {
        let mut schema = Schema::new();
        schema.enable_extension("uuid-ossp");
        schema.create_table("users", |t| {
            t.column("id", ColumnType::Integer, &[]);
            t.string("name", &[ColumnOption::Nullable]);
            t.set_primary_key("users_pkey", &["id"]);
            t.index("idx_users_name", &["name"], &[]);
        });
        schema.create_trigger(
            "audit_users",
            "users",
            "log_change",
            &[TriggerOption::After, TriggerOption::OnEvents(vec![TriggerEvent::Delete])],
        );

        let rendered = schema.to_string();
        assert!(rendered.starts_with("Schema: public"));
        assert!(rendered.contains("uuid-ossp"));
        assert!(rendered.contains("Table: users"));
        assert!(rendered.contains("id integer NOT NULL"));
        assert!(rendered.contains("name varchar(255)\n"));
        assert!(rendered.contains("PRIMARY KEY users_pkey (id)"));
        assert!(rendered.contains("INDEX idx_users_name (name)"));
        assert!(rendered.contains("audit_users AFTER DELETE ON users"));
    }

    #[test]
    fn empty_schema_renders_header_only() {
        assert_eq!(Schema::new().to_string(), "Schema: public");
    }
}
