//! Dialect-neutral schema model and diff engine.
//!
//! `strata-schema` is the pure core of the strata migration system:
//!
//! - A normalized, in-memory model of a relational schema — tables,
//!   columns, constraints, indexes, foreign keys, views, functions,
//!   triggers, sequences, row policies and extensions.
//! - Fluent builders for constructing schema values in migration code.
//! - A closed [`Change`] algebra enumerating every structural mutation.
//! - [`diff`], the deterministic function computing the ordered change
//!   sequence that transforms one schema into another.
//!
//! This crate never talks to a database. Introspection and SQL
//! emission live in `strata-dialect`.
//!
//! # Example
//!
//! ```
//! use strata_schema::{diff, ColumnOption, ColumnType, Schema};
//!
//! let source = Schema::new();
//! let mut target = Schema::new();
//! target.create_table("users", |t| {
//!     t.column("id", ColumnType::Integer, &[]);
//!     t.string("name", &[ColumnOption::Nullable]);
//!     t.set_primary_key("users_pkey", &["id"]);
//! });
//!
//! let changes = diff(&source, &target);
//! assert_eq!(changes.len(), 1);
//! ```

mod change;
mod column_type;
mod diff;
mod display;
mod foreign_key;
mod function;
mod policy;
mod schema;
mod sequence;
mod table;
mod trigger;
mod view;

pub use change::{Change, ChangeKind};
pub use column_type::ColumnType;
pub use diff::diff;
pub use foreign_key::{fk_actions_equal, ForeignKey, ForeignKeyOption};
pub use function::{ArgMode, Function, FunctionArg, FunctionOption, FunctionSecurity, Volatility};
pub use policy::{PolicyCommand, RowPolicy, RowPolicyOption};
pub use schema::Schema;
pub use sequence::{Sequence, SequenceOption};
pub use table::{Column, ColumnOption, Index, IndexOption, PrimaryKey, Table};
pub use trigger::{Trigger, TriggerEvent, TriggerOption, TriggerScope, TriggerTiming};
pub use view::{View, ViewOption};
