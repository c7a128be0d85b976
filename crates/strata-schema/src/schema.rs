//! The root schema value and its builders.

use serde::{Deserialize, Serialize};

use crate::function::{Function, FunctionOption};
use crate::policy::{RowPolicy, RowPolicyOption};
use crate::sequence::{Sequence, SequenceOption};
use crate::table::Table;
use crate::trigger::{Trigger, TriggerOption};
use crate::view::{View, ViewOption};

/// The default schema namespace.
pub const DEFAULT_SCHEMA: &str = "public";

/// A complete database schema: the root value the diff engine
/// compares.
///
/// Builders append in declaration order; that order is observable and
/// drives diff determinism. Names are assumed unique within their kind
/// — the builders do not reject duplicates, and the diff engine's
/// behavior on duplicates is unspecified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Schema namespace name.
    pub name: String,
    /// Enabled extensions, by name (PostgreSQL).
    pub extensions: Vec<String>,
    pub tables: Vec<Table>,
    pub sequences: Vec<Sequence>,
    pub functions: Vec<Function>,
    pub triggers: Vec<Trigger>,
    pub views: Vec<View>,
    pub row_policies: Vec<RowPolicy>,
}

impl Schema {
    /// Creates an empty schema in the `public` namespace.
    #[must_use]
    pub fn new() -> Self {
        Self::with_name(DEFAULT_SCHEMA)
    }

    /// Creates an empty schema with an explicit namespace name.
    #[must_use]
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extensions: Vec::new(),
            tables: Vec::new(),
            sequences: Vec::new(),
            functions: Vec::new(),
            triggers: Vec::new(),
            views: Vec::new(),
            row_policies: Vec::new(),
        }
    }

    /// Adds a table, letting the callback populate its columns and
    /// constraints.
    pub fn create_table<F>(&mut self, name: impl Into<String>, build: F) -> &mut Table
    where
        F: FnOnce(&mut Table),
    {
        let mut table = Table::new(name);
        build(&mut table);
        self.tables.push(table);
        self.tables.last_mut().expect("table was just pushed")
    }

    /// Removes a table from the schema value, if present.
    ///
    /// This is the down-builder pattern: the returned schema simply
    /// omits the table and the diff emits the drop.
    pub fn drop_table(&mut self, name: &str) {
        self.tables.retain(|t| t.name != name);
    }

    /// Looks up a table by name.
    #[must_use]
    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Enables an extension. Enabling twice is a no-op.
    pub fn enable_extension(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.extensions.contains(&name) {
            self.extensions.push(name);
        }
    }

    /// Disables an extension, if enabled.
    pub fn disable_extension(&mut self, name: &str) {
        self.extensions.retain(|e| e != name);
    }

    /// Adds a sequence.
    pub fn create_sequence(
        &mut self,
        name: impl Into<String>,
        options: &[SequenceOption],
    ) -> &mut Sequence {
        let mut sequence = Sequence::new(name);
        for option in options {
            option.apply(&mut sequence);
        }
        self.sequences.push(sequence);
        self.sequences.last_mut().expect("sequence was just pushed")
    }

    /// Adds a function.
    pub fn create_function(
        &mut self,
        name: impl Into<String>,
        returns: impl Into<String>,
        body: impl Into<String>,
        options: &[FunctionOption],
    ) -> &mut Function {
        let mut function = Function::new(name, returns, body);
        for option in options {
            option.apply(&mut function);
        }
        self.functions.push(function);
        self.functions.last_mut().expect("function was just pushed")
    }

    /// Adds a trigger on a table.
    pub fn create_trigger(
        &mut self,
        name: impl Into<String>,
        table: impl Into<String>,
        function: impl Into<String>,
        options: &[TriggerOption],
    ) -> &mut Trigger {
        let mut trigger = Trigger::new(name, table, function);
        for option in options {
            option.apply(&mut trigger);
        }
        self.triggers.push(trigger);
        self.triggers.last_mut().expect("trigger was just pushed")
    }

    /// Adds a view.
    pub fn create_view(
        &mut self,
        name: impl Into<String>,
        definition: impl Into<String>,
        options: &[ViewOption],
    ) -> &mut View {
        let mut view = View::new(name, definition);
        for option in options {
            option.apply(&mut view);
        }
        self.views.push(view);
        self.views.last_mut().expect("view was just pushed")
    }

    /// Adds a row-level security policy on a table.
    pub fn create_row_policy(
        &mut self,
        name: impl Into<String>,
        table: impl Into<String>,
        options: &[RowPolicyOption],
    ) -> &mut RowPolicy {
        let mut policy = RowPolicy::new(name, table);
        for option in options {
            option.apply(&mut policy);
        }
        self.row_policies.push(policy);
        self.row_policies.last_mut().expect("policy was just pushed")
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column_type::ColumnType;
    use crate::function::FunctionOption;
    use crate::sequence::SequenceOption;
    use crate::trigger::{TriggerEvent, TriggerOption, TriggerTiming};

    #[test]
    fn create_table_with_callback() {
        let mut schema = Schema::new();
        schema.create_table("users", |t| {
            t.column("id", ColumnType::Integer, &[]);
            t.string("name", &[]);
            t.set_primary_key("users_pkey", &["id"]);
        });

        let table = schema.get_table("users").unwrap();
        assert_eq!(table.columns.len(), 2);
        assert_eq!(table.primary_key.as_ref().unwrap().name, "users_pkey");
    }

    #[test]
    fn drop_table_removes_entry() {
        let mut schema = Schema::new();
        schema.create_table("users", |_| {});
        schema.create_table("posts", |_| {});
        schema.drop_table("users");
        assert!(schema.get_table("users").is_none());
        assert!(schema.get_table("posts").is_some());
        // Dropping an absent table is a no-op.
        schema.drop_table("users");
    }

    #[test]
    fn enable_extension_is_idempotent() {
        let mut schema = Schema::new();
        schema.enable_extension("uuid-ossp");
        schema.enable_extension("uuid-ossp");
        assert_eq!(schema.extensions, vec!["uuid-ossp"]);

        schema.disable_extension("uuid-ossp");
        assert!(schema.extensions.is_empty());
    }

    #[test]
    fn create_sequence_with_options() {
        let mut schema = Schema::new();
        schema.create_sequence(
            "order_id_seq",
            &[SequenceOption::Start(1000), SequenceOption::Increment(10), SequenceOption::Cycle],
        );
        let seq = &schema.sequences[0];
        assert_eq!(seq.start, 1000);
        assert_eq!(seq.increment, 10);
        assert!(seq.cycle);
    }

    #[test]
    fn create_function_defaults() {
        let mut schema = Schema::new();
        schema.create_function(
            "touch_updated_at",
            "trigger",
            "BEGIN NEW.updated_at = now(); RETURN NEW; END;",
            &[FunctionOption::Language("plpgsql".into())],
        );
        let f = &schema.functions[0];
        assert_eq!(f.language, "plpgsql");
        assert_eq!(f.cost, 100);
        assert!(!f.strict);
    }

    #[test]
    fn create_trigger_defaults_and_options() {
        let mut schema = Schema::new();
        schema.create_trigger(
            "users_touch",
            "users",
            "touch_updated_at",
            &[
                TriggerOption::Before,
                TriggerOption::OnEvents(vec![TriggerEvent::Update]),
            ],
        );
        let t = &schema.triggers[0];
        assert_eq!(t.timing, TriggerTiming::Before);
        assert_eq!(t.events, vec![TriggerEvent::Update]);
        assert_eq!(t.table, "users");
    }
}
