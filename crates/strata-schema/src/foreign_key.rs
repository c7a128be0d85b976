//! Foreign key constraints.

use serde::{Deserialize, Serialize};

/// A foreign key relationship between two tables.
///
/// `on_delete` / `on_update` are referential actions from the closed
/// set `""`, `NO ACTION`, `RESTRICT`, `CASCADE`, `SET NULL`,
/// `SET DEFAULT`. An empty string means the database default, which is
/// `NO ACTION`; the two spellings compare equal during diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    pub name: String,
    pub columns: Vec<String>,
    pub ref_table: String,
    pub ref_columns: Vec<String>,
    pub on_delete: String,
    pub on_update: String,
}

/// Options accepted by the foreign key builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForeignKeyOption {
    /// Referential action on delete.
    OnDelete(String),
    /// Referential action on update.
    OnUpdate(String),
}

impl ForeignKeyOption {
    pub(crate) fn apply(&self, fk: &mut ForeignKey) {
        match self {
            Self::OnDelete(action) => fk.on_delete = action.clone(),
            Self::OnUpdate(action) => fk.on_update = action.clone(),
        }
    }
}

/// Compares two referential actions, treating `""` and `NO ACTION` as
/// the same action.
#[must_use]
pub fn fk_actions_equal(a: &str, b: &str) -> bool {
    let norm = |s: &str| {
        if s.eq_ignore_ascii_case("NO ACTION") {
            String::new()
        } else {
            s.to_ascii_uppercase()
        }
    };
    norm(a) == norm(b)
}
