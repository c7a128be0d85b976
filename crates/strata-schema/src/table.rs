//! Tables, columns, indexes and primary keys.

use serde::{Deserialize, Serialize};

use crate::column_type::ColumnType;
use crate::foreign_key::{ForeignKey, ForeignKeyOption};

/// A database table: ordered columns, at most one primary key, and the
/// indexes and foreign keys attached to it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Schema namespace ("" means the default namespace).
    pub schema: String,
    pub name: String,
    /// Columns in declaration order. Order is observable and preserved
    /// by introspection.
    pub columns: Vec<Column>,
    pub indexes: Vec<Index>,
    pub primary_key: Option<PrimaryKey>,
    pub foreign_keys: Vec<ForeignKey>,
}

impl Table {
    /// Creates an empty table in the default namespace.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Adds a column of the given type.
    pub fn column(
        &mut self,
        name: impl Into<String>,
        column_type: ColumnType,
        options: &[ColumnOption],
    ) -> &mut Column {
        let mut column = Column::new(name, column_type);
        for option in options {
            option.apply(&mut column);
        }
        self.columns.push(column);
        self.columns.last_mut().expect("column was just pushed")
    }

    /// Adds an index over the given columns.
    pub fn index(
        &mut self,
        name: impl Into<String>,
        columns: &[&str],
        options: &[IndexOption],
    ) -> &mut Index {
        let mut index = Index {
            name: name.into(),
            columns: columns.iter().map(ToString::to_string).collect(),
            unique: false,
        };
        for option in options {
            option.apply(&mut index);
        }
        self.indexes.push(index);
        self.indexes.last_mut().expect("index was just pushed")
    }

    /// Sets the primary key, replacing any existing one.
    pub fn set_primary_key(&mut self, name: impl Into<String>, columns: &[&str]) -> &PrimaryKey {
        self.primary_key = Some(PrimaryKey {
            name: name.into(),
            columns: columns.iter().map(ToString::to_string).collect(),
        });
        self.primary_key.as_ref().expect("primary key was just set")
    }

    /// Adds a foreign key referencing another table.
    pub fn foreign_key(
        &mut self,
        name: impl Into<String>,
        columns: &[&str],
        ref_table: impl Into<String>,
        ref_columns: &[&str],
        options: &[ForeignKeyOption],
    ) -> &mut ForeignKey {
        let mut fk = ForeignKey {
            name: name.into(),
            columns: columns.iter().map(ToString::to_string).collect(),
            ref_table: ref_table.into(),
            ref_columns: ref_columns.iter().map(ToString::to_string).collect(),
            on_delete: String::new(),
            on_update: String::new(),
        };
        for option in options {
            option.apply(&mut fk);
        }
        self.foreign_keys.push(fk);
        self.foreign_keys.last_mut().expect("foreign key was just pushed")
    }

    /// Looks up a column by name.
    #[must_use]
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    // Type shortcuts.

    /// Adds a `varchar(255)` column.
    pub fn string(&mut self, name: impl Into<String>, options: &[ColumnOption]) -> &mut Column {
        self.column(name, ColumnType::Varchar { length: 255 }, options)
    }

    /// Adds a `text` column.
    pub fn text(&mut self, name: impl Into<String>, options: &[ColumnOption]) -> &mut Column {
        self.column(name, ColumnType::Text, options)
    }

    /// Adds an `integer` column.
    pub fn integer(&mut self, name: impl Into<String>, options: &[ColumnOption]) -> &mut Column {
        self.column(name, ColumnType::Integer, options)
    }

    /// Adds a `bigint` column.
    pub fn bigint(&mut self, name: impl Into<String>, options: &[ColumnOption]) -> &mut Column {
        self.column(name, ColumnType::BigInt, options)
    }

    /// Adds a `float` column.
    pub fn float(&mut self, name: impl Into<String>, options: &[ColumnOption]) -> &mut Column {
        self.column(name, ColumnType::Float, options)
    }

    /// Adds an unbounded `numeric` column.
    pub fn decimal(&mut self, name: impl Into<String>, options: &[ColumnOption]) -> &mut Column {
        self.column(name, ColumnType::Decimal { precision: 0, scale: 0 }, options)
    }

    /// Adds a `timestamp` column.
    pub fn date_time(&mut self, name: impl Into<String>, options: &[ColumnOption]) -> &mut Column {
        self.column(name, ColumnType::Timestamp { with_time_zone: false }, options)
    }

    /// Adds a `time` column.
    pub fn time(&mut self, name: impl Into<String>, options: &[ColumnOption]) -> &mut Column {
        self.column(name, ColumnType::Time, options)
    }

    /// Adds a `date` column.
    pub fn date(&mut self, name: impl Into<String>, options: &[ColumnOption]) -> &mut Column {
        self.column(name, ColumnType::Date, options)
    }

    /// Adds a `blob` column.
    pub fn binary(&mut self, name: impl Into<String>, options: &[ColumnOption]) -> &mut Column {
        self.column(name, ColumnType::Blob, options)
    }

    /// Adds a `boolean` column.
    pub fn boolean(&mut self, name: impl Into<String>, options: &[ColumnOption]) -> &mut Column {
        self.column(name, ColumnType::Boolean, options)
    }
}

/// A table column.
///
/// Columns are NOT NULL unless [`ColumnOption::Nullable`] is given,
/// matching the builder's common case of constrained columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    pub nullable: bool,
    /// Default expression, emitted verbatim. The engine does not
    /// interpret it.
    pub default: Option<String>,
    pub comment: Option<String>,
    /// SERIAL / AUTO_INCREMENT flag.
    pub auto_increment: bool,
}

impl Column {
    /// Creates a NOT NULL column with no default.
    #[must_use]
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable: false,
            default: None,
            comment: None,
            auto_increment: false,
        }
    }
}

/// Options accepted by the column builders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnOption {
    /// Forbid NULL values (the default).
    NotNull,
    /// Allow NULL values.
    Nullable,
    /// Default expression, emitted verbatim.
    Default(String),
    /// Column comment.
    Comment(String),
    /// Mark the column auto-incrementing.
    AutoIncrement,
}

impl ColumnOption {
    pub(crate) fn apply(&self, column: &mut Column) {
        match self {
            Self::NotNull => column.nullable = false,
            Self::Nullable => column.nullable = true,
            Self::Default(expr) => column.default = Some(expr.clone()),
            Self::Comment(text) => column.comment = Some(text.clone()),
            Self::AutoIncrement => column.auto_increment = true,
        }
    }
}

/// A secondary index. Uniqueness of the index name within its table is
/// assumed by the diff engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    pub name: String,
    pub columns: Vec<String>,
    pub unique: bool,
}

/// Options accepted by the index builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexOption {
    /// Make the index unique.
    Unique,
}

impl IndexOption {
    pub(crate) fn apply(self, index: &mut Index) {
        match self {
            Self::Unique => index.unique = true,
        }
    }
}

/// A table's primary key. Column order is significant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryKey {
    pub name: String,
    pub columns: Vec<String>,
}
