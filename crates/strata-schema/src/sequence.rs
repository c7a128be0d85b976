//! Database sequences.

use serde::{Deserialize, Serialize};

/// A database sequence (PostgreSQL).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequence {
    /// Schema namespace ("" means the default namespace).
    pub schema: String,
    pub name: String,
    pub start: i64,
    pub increment: i64,
    pub min_value: i64,
    pub max_value: i64,
    pub cache: i64,
    pub cycle: bool,
}

impl Sequence {
    /// Creates a sequence with the database defaults: start 1,
    /// increment 1, min 1, max 2^63-1, cache 1, no cycle.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            schema: String::new(),
            name: name.into(),
            start: 1,
            increment: 1,
            min_value: 1,
            max_value: i64::MAX,
            cache: 1,
            cycle: false,
        }
    }
}

/// Options accepted by the sequence builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceOption {
    Start(i64),
    Increment(i64),
    MinValue(i64),
    MaxValue(i64),
    Cache(i64),
    Cycle,
    NoCycle,
    InSchema(String),
}

impl SequenceOption {
    pub(crate) fn apply(&self, seq: &mut Sequence) {
        match self {
            Self::Start(v) => seq.start = *v,
            Self::Increment(v) => seq.increment = *v,
            Self::MinValue(v) => seq.min_value = *v,
            Self::MaxValue(v) => seq.max_value = *v,
            Self::Cache(v) => seq.cache = *v,
            Self::Cycle => seq.cycle = true,
            Self::NoCycle => seq.cycle = false,
            Self::InSchema(s) => seq.schema = s.clone(),
        }
    }
}
