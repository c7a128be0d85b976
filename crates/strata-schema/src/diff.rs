//! The diff engine.
//!
//! [`diff`] compares a `source` schema (usually introspected from a
//! live database) against a `target` schema (usually built by a
//! migration) and returns the ordered change sequence that transforms
//! source into target. The function is pure: inputs are never mutated
//! and the output depends only on the two values.
//!
//! Bucket order: schema namespaces, extensions, sequences, functions,
//! views, row policies, table drops, per-table diffs for tables on
//! both sides, table creates, triggers last. Creates and alters follow
//! target declaration order; drops follow source declaration order.

use crate::change::Change;
use crate::foreign_key::fk_actions_equal;
use crate::function::Function;
use crate::schema::{Schema, DEFAULT_SCHEMA};
use crate::table::Table;
use crate::trigger::Trigger;

/// Computes the ordered changes that migrate `source` into `target`.
#[must_use]
pub fn diff(source: &Schema, target: &Schema) -> Vec<Change> {
    let mut changes = Vec::new();

    diff_schema_names(source, target, &mut changes);
    diff_extensions(source, target, &mut changes);
    diff_sequences(source, target, &mut changes);
    diff_functions(source, target, &mut changes);
    diff_views(source, target, &mut changes);
    diff_row_policies(source, target, &mut changes);
    diff_tables(source, target, &mut changes);
    diff_triggers(source, target, &mut changes);

    changes
}

fn is_default_namespace(name: &str) -> bool {
    name.is_empty() || name == DEFAULT_SCHEMA
}

fn diff_schema_names(source: &Schema, target: &Schema, changes: &mut Vec<Change>) {
    if !is_default_namespace(&target.name) && source.name != target.name {
        changes.push(Change::CreateSchema { name: target.name.clone() });
    }

    if !is_default_namespace(&source.name) && source.name != target.name {
        // Only drop the namespace once nothing in the target still
        // lives in it.
        let still_used = target.tables.iter().any(|t| t.schema == source.name);
        if !still_used {
            changes.push(Change::DropSchema { name: source.name.clone() });
        }
    }
}

fn diff_extensions(source: &Schema, target: &Schema, changes: &mut Vec<Change>) {
    for ext in &source.extensions {
        if !target.extensions.contains(ext) {
            changes.push(Change::DisableExtension { name: ext.clone() });
        }
    }
    for ext in &target.extensions {
        if !source.extensions.contains(ext) {
            changes.push(Change::EnableExtension { name: ext.clone() });
        }
    }
}

fn diff_sequences(source: &Schema, target: &Schema, changes: &mut Vec<Change>) {
    for seq in &source.sequences {
        let found = target
            .sequences
            .iter()
            .any(|t| t.name == seq.name && t.schema == seq.schema);
        if !found {
            changes.push(Change::DropSequence {
                schema: seq.schema.clone(),
                name: seq.name.clone(),
            });
        }
    }

    for seq in &target.sequences {
        match source
            .sequences
            .iter()
            .find(|s| s.name == seq.name && s.schema == seq.schema)
        {
            Some(existing) => {
                if existing.start != seq.start
                    || existing.increment != seq.increment
                    || existing.min_value != seq.min_value
                    || existing.max_value != seq.max_value
                    || existing.cache != seq.cache
                    || existing.cycle != seq.cycle
                {
                    changes.push(Change::AlterSequence { sequence: seq.clone() });
                }
            }
            None => changes.push(Change::CreateSequence { sequence: seq.clone() }),
        }
    }
}

fn same_function_definition(a: &Function, b: &Function) -> bool {
    a.same_identity(b)
        && a.returns == b.returns
        && a.language == b.language
        && a.body == b.body
        && a.volatility == b.volatility
        && a.strict == b.strict
        && a.security == b.security
        && a.cost == b.cost
}

fn diff_functions(source: &Schema, target: &Schema, changes: &mut Vec<Change>) {
    for func in &source.functions {
        if !target.functions.iter().any(|t| t.same_identity(func)) {
            changes.push(Change::DropFunction {
                schema: func.schema.clone(),
                name: func.name.clone(),
                arguments: func.arguments.clone(),
            });
        }
    }

    for func in &target.functions {
        match source.functions.iter().find(|s| s.same_identity(func)) {
            Some(existing) => {
                if !same_function_definition(existing, func) {
                    changes.push(Change::AlterFunction { function: func.clone() });
                }
            }
            None => changes.push(Change::CreateFunction { function: func.clone() }),
        }
    }
}

fn diff_views(source: &Schema, target: &Schema, changes: &mut Vec<Change>) {
    for view in &source.views {
        let found = target
            .views
            .iter()
            .any(|t| t.name == view.name && t.schema == view.schema);
        if !found {
            changes.push(Change::DropView {
                schema: view.schema.clone(),
                name: view.name.clone(),
            });
        }
    }

    for view in &target.views {
        match source
            .views
            .iter()
            .find(|s| s.name == view.name && s.schema == view.schema)
        {
            Some(existing) => {
                if existing.definition != view.definition
                    || existing.columns != view.columns
                    || existing.options != view.options
                {
                    changes.push(Change::AlterView { view: view.clone() });
                }
            }
            None => changes.push(Change::CreateView { view: view.clone() }),
        }
    }
}

fn diff_row_policies(source: &Schema, target: &Schema, changes: &mut Vec<Change>) {
    for policy in &source.row_policies {
        let found = target.row_policies.iter().any(|t| {
            t.name == policy.name && t.table == policy.table && t.schema == policy.schema
        });
        if !found {
            changes.push(Change::DropRowPolicy {
                schema: policy.schema.clone(),
                table: policy.table.clone(),
                name: policy.name.clone(),
            });
        }
    }

    for policy in &target.row_policies {
        match source.row_policies.iter().find(|s| {
            s.name == policy.name && s.table == policy.table && s.schema == policy.schema
        }) {
            Some(existing) => {
                if existing.command != policy.command
                    || existing.roles != policy.roles
                    || existing.using_expr != policy.using_expr
                    || existing.check_expr != policy.check_expr
                    || existing.permissive != policy.permissive
                {
                    changes.push(Change::AlterRowPolicy { policy: policy.clone() });
                }
            }
            None => changes.push(Change::CreateRowPolicy { policy: policy.clone() }),
        }
    }
}

fn diff_tables(source: &Schema, target: &Schema, changes: &mut Vec<Change>) {
    // Drops first, in source declaration order.
    for table in &source.tables {
        let found = target
            .tables
            .iter()
            .any(|t| t.name == table.name && t.schema == table.schema);
        if !found {
            changes.push(Change::DropTable {
                schema: table.schema.clone(),
                name: table.name.clone(),
            });
        }
    }

    // Per-table diffs for tables on both sides, target order.
    for table in &target.tables {
        if let Some(existing) = source
            .tables
            .iter()
            .find(|s| s.name == table.name && s.schema == table.schema)
        {
            diff_table(existing, table, changes);
        }
    }

    // New tables last, full definition inline.
    for table in &target.tables {
        let found = source
            .tables
            .iter()
            .any(|s| s.name == table.name && s.schema == table.schema);
        if !found {
            changes.push(Change::CreateTable { table: table.clone() });
        }
    }
}

fn diff_table(source: &Table, target: &Table, changes: &mut Vec<Change>) {
    diff_columns(source, target, changes);
    diff_primary_keys(source, target, changes);
    diff_indexes(source, target, changes);
    diff_foreign_keys(source, target, changes);
}

fn diff_columns(source: &Table, target: &Table, changes: &mut Vec<Change>) {
    for column in &source.columns {
        if target.get_column(&column.name).is_none() {
            changes.push(Change::DropColumn {
                table: source.name.clone(),
                column: column.name.clone(),
            });
        }
    }

    for column in &target.columns {
        match source.get_column(&column.name) {
            Some(existing) => {
                if existing.column_type != column.column_type
                    || existing.nullable != column.nullable
                    || existing.default != column.default
                    || existing.comment != column.comment
                {
                    changes.push(Change::AlterColumn {
                        table: target.name.clone(),
                        column: column.clone(),
                    });
                }
            }
            None => changes.push(Change::AddColumn {
                table: target.name.clone(),
                column: column.clone(),
            }),
        }
    }
}

fn diff_primary_keys(source: &Table, target: &Table, changes: &mut Vec<Change>) {
    match (&source.primary_key, &target.primary_key) {
        (Some(existing), None) => {
            changes.push(Change::DropPrimaryKey {
                table: source.name.clone(),
                name: existing.name.clone(),
            });
        }
        (None, Some(pk)) => {
            changes.push(Change::AddPrimaryKey {
                table: target.name.clone(),
                primary_key: pk.clone(),
            });
        }
        (Some(existing), Some(pk)) => {
            // Any difference, including name-only, is a drop-then-add.
            if existing.name != pk.name || existing.columns != pk.columns {
                changes.push(Change::DropPrimaryKey {
                    table: source.name.clone(),
                    name: existing.name.clone(),
                });
                changes.push(Change::AddPrimaryKey {
                    table: target.name.clone(),
                    primary_key: pk.clone(),
                });
            }
        }
        (None, None) => {}
    }
}

fn diff_indexes(source: &Table, target: &Table, changes: &mut Vec<Change>) {
    for index in &source.indexes {
        if !target.indexes.iter().any(|t| t.name == index.name) {
            changes.push(Change::DropIndex {
                table: source.name.clone(),
                name: index.name.clone(),
            });
        }
    }

    for index in &target.indexes {
        match source.indexes.iter().find(|s| s.name == index.name) {
            Some(existing) => {
                if existing.columns != index.columns || existing.unique != index.unique {
                    changes.push(Change::DropIndex {
                        table: source.name.clone(),
                        name: existing.name.clone(),
                    });
                    changes.push(Change::AddIndex {
                        table: target.name.clone(),
                        index: index.clone(),
                    });
                }
            }
            None => changes.push(Change::AddIndex {
                table: target.name.clone(),
                index: index.clone(),
            }),
        }
    }
}

fn diff_foreign_keys(source: &Table, target: &Table, changes: &mut Vec<Change>) {
    for fk in &source.foreign_keys {
        if !target.foreign_keys.iter().any(|t| t.name == fk.name) {
            changes.push(Change::DropForeignKey {
                table: source.name.clone(),
                name: fk.name.clone(),
            });
        }
    }

    for fk in &target.foreign_keys {
        match source.foreign_keys.iter().find(|s| s.name == fk.name) {
            Some(existing) => {
                if existing.columns != fk.columns
                    || existing.ref_columns != fk.ref_columns
                    || existing.ref_table != fk.ref_table
                    || !fk_actions_equal(&existing.on_delete, &fk.on_delete)
                    || !fk_actions_equal(&existing.on_update, &fk.on_update)
                {
                    changes.push(Change::DropForeignKey {
                        table: source.name.clone(),
                        name: existing.name.clone(),
                    });
                    changes.push(Change::AddForeignKey {
                        table: target.name.clone(),
                        foreign_key: fk.clone(),
                    });
                }
            }
            None => changes.push(Change::AddForeignKey {
                table: target.name.clone(),
                foreign_key: fk.clone(),
            }),
        }
    }
}

fn same_trigger_definition(a: &Trigger, b: &Trigger) -> bool {
    a.timing == b.timing
        && a.for_each == b.for_each
        && a.when == b.when
        && a.function == b.function
        && a.events == b.events
        && a.arguments == b.arguments
}

fn diff_triggers(source: &Schema, target: &Schema, changes: &mut Vec<Change>) {
    for trigger in &source.triggers {
        let found = target.triggers.iter().any(|t| {
            t.name == trigger.name && t.schema == trigger.schema && t.table == trigger.table
        });
        if !found {
            changes.push(Change::DropTrigger {
                schema: trigger.schema.clone(),
                name: trigger.name.clone(),
                table: trigger.table.clone(),
            });
        }
    }

    for trigger in &target.triggers {
        match source.triggers.iter().find(|s| {
            s.name == trigger.name && s.schema == trigger.schema && s.table == trigger.table
        }) {
            Some(existing) => {
                if !same_trigger_definition(existing, trigger) {
                    changes.push(Change::AlterTrigger { trigger: trigger.clone() });
                }
            }
            None => changes.push(Change::CreateTrigger { trigger: trigger.clone() }),
        }
    }
}
