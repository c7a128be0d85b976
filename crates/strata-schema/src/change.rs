//! The change algebra.
//!
//! One closed enum covers every structural mutation the diff engine
//! can emit. Each variant carries everything a dialect needs to
//! generate SQL and everything a review tool needs to describe the
//! change.

use serde::{Deserialize, Serialize};

use crate::function::{Function, FunctionArg};
use crate::policy::RowPolicy;
use crate::sequence::Sequence;
use crate::table::{Column, Index, PrimaryKey, Table};
use crate::trigger::Trigger;
use crate::view::View;

/// A single structural mutation to a schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Change {
    CreateSchema { name: String },
    DropSchema { name: String },
    EnableExtension { name: String },
    DisableExtension { name: String },
    CreateTable { table: Table },
    DropTable { schema: String, name: String },
    AddColumn { table: String, column: Column },
    DropColumn { table: String, column: String },
    AlterColumn { table: String, column: Column },
    AddPrimaryKey { table: String, primary_key: PrimaryKey },
    DropPrimaryKey { table: String, name: String },
    AddIndex { table: String, index: Index },
    DropIndex { table: String, name: String },
    AddForeignKey { table: String, foreign_key: crate::foreign_key::ForeignKey },
    DropForeignKey { table: String, name: String },
    CreateSequence { sequence: Sequence },
    AlterSequence { sequence: Sequence },
    DropSequence { schema: String, name: String },
    CreateFunction { function: Function },
    AlterFunction { function: Function },
    DropFunction { schema: String, name: String, arguments: Vec<FunctionArg> },
    CreateView { view: View },
    AlterView { view: View },
    DropView { schema: String, name: String },
    CreateTrigger { trigger: Trigger },
    AlterTrigger { trigger: Trigger },
    DropTrigger { schema: String, name: String, table: String },
    CreateRowPolicy { policy: RowPolicy },
    AlterRowPolicy { policy: RowPolicy },
    DropRowPolicy { schema: String, table: String, name: String },
}

/// Stable tags for the change variants, usable as log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeKind {
    CreateSchema,
    DropSchema,
    EnableExtension,
    DisableExtension,
    CreateTable,
    DropTable,
    AddColumn,
    DropColumn,
    AlterColumn,
    AddPrimaryKey,
    DropPrimaryKey,
    AddIndex,
    DropIndex,
    AddForeignKey,
    DropForeignKey,
    CreateSequence,
    AlterSequence,
    DropSequence,
    CreateFunction,
    AlterFunction,
    DropFunction,
    CreateView,
    AlterView,
    DropView,
    CreateTrigger,
    AlterTrigger,
    DropTrigger,
    CreateRowPolicy,
    AlterRowPolicy,
    DropRowPolicy,
}

impl ChangeKind {
    /// Snake_case tag, stable across releases.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreateSchema => "create_schema",
            Self::DropSchema => "drop_schema",
            Self::EnableExtension => "enable_extension",
            Self::DisableExtension => "disable_extension",
            Self::CreateTable => "create_table",
            Self::DropTable => "drop_table",
            Self::AddColumn => "add_column",
            Self::DropColumn => "drop_column",
            Self::AlterColumn => "alter_column",
            Self::AddPrimaryKey => "add_primary_key",
            Self::DropPrimaryKey => "drop_primary_key",
            Self::AddIndex => "add_index",
            Self::DropIndex => "drop_index",
            Self::AddForeignKey => "add_foreign_key",
            Self::DropForeignKey => "drop_foreign_key",
            Self::CreateSequence => "create_sequence",
            Self::AlterSequence => "alter_sequence",
            Self::DropSequence => "drop_sequence",
            Self::CreateFunction => "create_function",
            Self::AlterFunction => "alter_function",
            Self::DropFunction => "drop_function",
            Self::CreateView => "create_view",
            Self::AlterView => "alter_view",
            Self::DropView => "drop_view",
            Self::CreateTrigger => "create_trigger",
            Self::AlterTrigger => "alter_trigger",
            Self::DropTrigger => "drop_trigger",
            Self::CreateRowPolicy => "create_row_policy",
            Self::AlterRowPolicy => "alter_row_policy",
            Self::DropRowPolicy => "drop_row_policy",
        }
    }
}

impl Change {
    /// The variant tag of this change.
    #[must_use]
    pub fn kind(&self) -> ChangeKind {
        match self {
            Self::CreateSchema { .. } => ChangeKind::CreateSchema,
            Self::DropSchema { .. } => ChangeKind::DropSchema,
            Self::EnableExtension { .. } => ChangeKind::EnableExtension,
            Self::DisableExtension { .. } => ChangeKind::DisableExtension,
            Self::CreateTable { .. } => ChangeKind::CreateTable,
            Self::DropTable { .. } => ChangeKind::DropTable,
            Self::AddColumn { .. } => ChangeKind::AddColumn,
            Self::DropColumn { .. } => ChangeKind::DropColumn,
            Self::AlterColumn { .. } => ChangeKind::AlterColumn,
            Self::AddPrimaryKey { .. } => ChangeKind::AddPrimaryKey,
            Self::DropPrimaryKey { .. } => ChangeKind::DropPrimaryKey,
            Self::AddIndex { .. } => ChangeKind::AddIndex,
            Self::DropIndex { .. } => ChangeKind::DropIndex,
            Self::AddForeignKey { .. } => ChangeKind::AddForeignKey,
            Self::DropForeignKey { .. } => ChangeKind::DropForeignKey,
            Self::CreateSequence { .. } => ChangeKind::CreateSequence,
            Self::AlterSequence { .. } => ChangeKind::AlterSequence,
            Self::DropSequence { .. } => ChangeKind::DropSequence,
            Self::CreateFunction { .. } => ChangeKind::CreateFunction,
            Self::AlterFunction { .. } => ChangeKind::AlterFunction,
            Self::DropFunction { .. } => ChangeKind::DropFunction,
            Self::CreateView { .. } => ChangeKind::CreateView,
            Self::AlterView { .. } => ChangeKind::AlterView,
            Self::DropView { .. } => ChangeKind::DropView,
            Self::CreateTrigger { .. } => ChangeKind::CreateTrigger,
            Self::AlterTrigger { .. } => ChangeKind::AlterTrigger,
            Self::DropTrigger { .. } => ChangeKind::DropTrigger,
            Self::CreateRowPolicy { .. } => ChangeKind::CreateRowPolicy,
            Self::AlterRowPolicy { .. } => ChangeKind::AlterRowPolicy,
            Self::DropRowPolicy { .. } => ChangeKind::DropRowPolicy,
        }
    }

    /// True for changes that can lose data or break dependents and
    /// deserve human review before execution. Nothing in the engine
    /// gates on this flag.
    #[must_use]
    pub fn is_unsafe(&self) -> bool {
        matches!(
            self,
            Self::DropSchema { .. }
                | Self::DisableExtension { .. }
                | Self::DropTable { .. }
                | Self::DropColumn { .. }
                | Self::AlterColumn { .. }
                | Self::DropPrimaryKey { .. }
                | Self::DropIndex { .. }
                | Self::DropForeignKey { .. }
                | Self::DropSequence { .. }
                | Self::AlterSequence { .. }
                | Self::DropFunction { .. }
                | Self::AlterFunction { .. }
                | Self::DropView { .. }
                | Self::AlterView { .. }
                | Self::DropTrigger { .. }
                | Self::AlterTrigger { .. }
                | Self::DropRowPolicy { .. }
                | Self::AlterRowPolicy { .. }
        )
    }
}

impl std::fmt::Display for Change {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CreateSchema { name } => write!(f, "create schema {name}"),
            Self::DropSchema { name } => write!(f, "drop schema {name}"),
            Self::EnableExtension { name } => write!(f, "enable extension {name}"),
            Self::DisableExtension { name } => write!(f, "disable extension {name}"),
            Self::CreateTable { table } => {
                write!(f, "create table {} ({} columns)", table.name, table.columns.len())
            }
            Self::DropTable { name, .. } => write!(f, "drop table {name}"),
            Self::AddColumn { table, column } => {
                write!(f, "add column {}.{} {}", table, column.name, column.column_type)
            }
            Self::DropColumn { table, column } => write!(f, "drop column {table}.{column}"),
            Self::AlterColumn { table, column } => {
                write!(f, "alter column {}.{} {}", table, column.name, column.column_type)
            }
            Self::AddPrimaryKey { table, primary_key } => {
                write!(f, "add primary key {} on {table}", primary_key.name)
            }
            Self::DropPrimaryKey { table, name } => {
                write!(f, "drop primary key {name} on {table}")
            }
            Self::AddIndex { table, index } => write!(f, "add index {} on {table}", index.name),
            Self::DropIndex { table, name } => write!(f, "drop index {name} on {table}"),
            Self::AddForeignKey { table, foreign_key } => {
                write!(
                    f,
                    "add foreign key {} on {table} -> {}",
                    foreign_key.name, foreign_key.ref_table
                )
            }
            Self::DropForeignKey { table, name } => {
                write!(f, "drop foreign key {name} on {table}")
            }
            Self::CreateSequence { sequence } => write!(f, "create sequence {}", sequence.name),
            Self::AlterSequence { sequence } => write!(f, "alter sequence {}", sequence.name),
            Self::DropSequence { name, .. } => write!(f, "drop sequence {name}"),
            Self::CreateFunction { function } => write!(f, "create function {}", function.name),
            Self::AlterFunction { function } => write!(f, "alter function {}", function.name),
            Self::DropFunction { name, .. } => write!(f, "drop function {name}"),
            Self::CreateView { view } => write!(f, "create view {}", view.name),
            Self::AlterView { view } => write!(f, "alter view {}", view.name),
            Self::DropView { name, .. } => write!(f, "drop view {name}"),
            Self::CreateTrigger { trigger } => {
                write!(f, "create trigger {} on {}", trigger.name, trigger.table)
            }
            Self::AlterTrigger { trigger } => {
                write!(f, "alter trigger {} on {}", trigger.name, trigger.table)
            }
            Self::DropTrigger { name, table, .. } => {
                write!(f, "drop trigger {name} on {table}")
            }
            Self::CreateRowPolicy { policy } => {
                write!(f, "create row policy {} on {}", policy.name, policy.table)
            }
            Self::AlterRowPolicy { policy } => {
                write!(f, "alter row policy {} on {}", policy.name, policy.table)
            }
            Self::DropRowPolicy { name, table, .. } => {
                write!(f, "drop row policy {name} on {table}")
            }
        }
    }
}
