//! Table triggers.

use serde::{Deserialize, Serialize};

/// Events a trigger can fire on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerEvent {
    Insert,
    Update,
    Delete,
}

impl TriggerEvent {
    #[must_use]
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        }
    }

    /// Parses an event keyword.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "INSERT" => Some(Self::Insert),
            "UPDATE" => Some(Self::Update),
            "DELETE" => Some(Self::Delete),
            _ => None,
        }
    }
}

/// When the trigger fires relative to the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TriggerTiming {
    #[default]
    Before,
    After,
    InsteadOf,
}

impl TriggerTiming {
    #[must_use]
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Before => "BEFORE",
            Self::After => "AFTER",
            Self::InsteadOf => "INSTEAD OF",
        }
    }
}

/// Row-level or statement-level firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TriggerScope {
    #[default]
    Row,
    Statement,
}

impl TriggerScope {
    #[must_use]
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Row => "ROW",
            Self::Statement => "STATEMENT",
        }
    }
}

/// A trigger attached to a table. Identity is `(schema, table, name)`.
///
/// `function` names the routine to invoke on PostgreSQL; on MySQL and
/// SQLite it holds the body statement since those dialects embed the
/// logic in the trigger itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    /// Schema namespace ("" means the default namespace).
    pub schema: String,
    pub name: String,
    pub table: String,
    pub events: Vec<TriggerEvent>,
    pub timing: TriggerTiming,
    pub for_each: TriggerScope,
    /// Optional WHEN condition, passed through verbatim.
    pub when: Option<String>,
    pub function: String,
    /// Argument expressions passed to the function, in order.
    pub arguments: Vec<String>,
}

impl Trigger {
    /// Creates a `BEFORE INSERT … FOR EACH ROW` trigger, the builder
    /// defaults.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        table: impl Into<String>,
        function: impl Into<String>,
    ) -> Self {
        Self {
            schema: String::new(),
            name: name.into(),
            table: table.into(),
            events: vec![TriggerEvent::Insert],
            timing: TriggerTiming::Before,
            for_each: TriggerScope::Row,
            when: None,
            function: function.into(),
            arguments: Vec::new(),
        }
    }
}

/// Options accepted by the trigger builder.
#[derive(Debug, Clone, PartialEq)]
pub enum TriggerOption {
    Before,
    After,
    InsteadOf,
    ForEachRow,
    ForEachStatement,
    OnEvents(Vec<TriggerEvent>),
    When(String),
    Arguments(Vec<String>),
    InSchema(String),
}

impl TriggerOption {
    pub(crate) fn apply(&self, trigger: &mut Trigger) {
        match self {
            Self::Before => trigger.timing = TriggerTiming::Before,
            Self::After => trigger.timing = TriggerTiming::After,
            Self::InsteadOf => trigger.timing = TriggerTiming::InsteadOf,
            Self::ForEachRow => trigger.for_each = TriggerScope::Row,
            Self::ForEachStatement => trigger.for_each = TriggerScope::Statement,
            Self::OnEvents(events) => trigger.events = events.clone(),
            Self::When(cond) => trigger.when = Some(cond.clone()),
            Self::Arguments(args) => trigger.arguments = args.clone(),
            Self::InSchema(schema) => trigger.schema = schema.clone(),
        }
    }
}
