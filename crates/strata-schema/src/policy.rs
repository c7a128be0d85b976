//! Row-level security policies.

use serde::{Deserialize, Serialize};

/// Commands a row policy can apply to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PolicyCommand {
    #[default]
    All,
    Select,
    Insert,
    Update,
    Delete,
}

impl PolicyCommand {
    #[must_use]
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::All => "ALL",
            Self::Select => "SELECT",
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        }
    }

    /// Parses a catalog command string, defaulting to `ALL`.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "SELECT" | "R" => Self::Select,
            "INSERT" | "A" => Self::Insert,
            "UPDATE" | "W" => Self::Update,
            "DELETE" | "D" => Self::Delete,
            _ => Self::All,
        }
    }
}

/// A row-level security policy (PostgreSQL). Identity is
/// `(schema, table, name)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowPolicy {
    /// Schema namespace ("" means the default namespace).
    pub schema: String,
    pub table: String,
    pub name: String,
    pub command: PolicyCommand,
    /// Roles the policy applies to; empty means PUBLIC.
    pub roles: Vec<String>,
    /// USING expression filtering visible rows.
    pub using_expr: Option<String>,
    /// WITH CHECK expression filtering writable rows.
    pub check_expr: Option<String>,
    /// PERMISSIVE (true, default) or RESTRICTIVE.
    pub permissive: bool,
}

impl RowPolicy {
    #[must_use]
    pub fn new(name: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            schema: String::new(),
            table: table.into(),
            name: name.into(),
            command: PolicyCommand::All,
            roles: Vec::new(),
            using_expr: None,
            check_expr: None,
            permissive: true,
        }
    }
}

/// Options accepted by the row policy builder.
#[derive(Debug, Clone, PartialEq)]
pub enum RowPolicyOption {
    ForCommands(PolicyCommand),
    ForRoles(Vec<String>),
    Using(String),
    Check(String),
    Permissive(bool),
    InSchema(String),
}

impl RowPolicyOption {
    pub(crate) fn apply(&self, policy: &mut RowPolicy) {
        match self {
            Self::ForCommands(command) => policy.command = *command,
            Self::ForRoles(roles) => policy.roles = roles.clone(),
            Self::Using(expr) => policy.using_expr = Some(expr.clone()),
            Self::Check(expr) => policy.check_expr = Some(expr.clone()),
            Self::Permissive(permissive) => policy.permissive = *permissive,
            Self::InSchema(schema) => policy.schema = schema.clone(),
        }
    }
}
