//! Database views.

use serde::{Deserialize, Serialize};

/// A view. Identity is `(schema, name)`; the definition body is passed
/// through verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct View {
    /// Schema namespace ("" means the default namespace).
    pub schema: String,
    pub name: String,
    pub definition: String,
    /// Explicit column list, if any.
    pub columns: Vec<String>,
    /// Dialect options (e.g. `security_barrier`), passed through.
    pub options: Vec<String>,
}

impl View {
    #[must_use]
    pub fn new(name: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            schema: String::new(),
            name: name.into(),
            definition: definition.into(),
            columns: Vec::new(),
            options: Vec::new(),
        }
    }
}

/// Options accepted by the view builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewOption {
    /// Explicit column names.
    Columns(Vec<String>),
    /// Dialect view options.
    Options(Vec<String>),
    /// Schema namespace.
    InSchema(String),
}

impl ViewOption {
    pub(crate) fn apply(&self, view: &mut View) {
        match self {
            Self::Columns(columns) => view.columns = columns.clone(),
            Self::Options(options) => view.options = options.clone(),
            Self::InSchema(schema) => view.schema = schema.clone(),
        }
    }
}
