//! SQLite dialect.

mod inspect;
mod sql;

use strata_schema::ColumnType;

/// The SQLite dialect.
///
/// SQLite cannot alter constraints in place, so column drops/alters
/// and primary/foreign key changes are rejected with typed errors;
/// callers must recreate the table. Extensions, sequences, stored
/// functions and row policies are outside its vocabulary.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sqlite;

impl Sqlite {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

/// Quotes an identifier with double quotes.
#[must_use]
pub(crate) fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Maps a SQLite declared type string (e.g. `VARCHAR(255)`,
/// `NUMERIC(10,2)`) to a [`ColumnType`].
///
/// SQLite is loose about type names; this covers the spellings the
/// engine itself emits plus the common affinity names.
#[must_use]
pub(crate) fn parse_declared_type(declared: &str) -> ColumnType {
    let declared = declared.trim();
    let (base, params) = match declared.split_once('(') {
        Some((base, rest)) => (
            base.trim().to_lowercase(),
            rest.trim_end_matches(')')
                .split(',')
                .filter_map(|p| p.trim().parse::<u32>().ok())
                .collect::<Vec<u32>>(),
        ),
        None => (declared.to_lowercase(), Vec::new()),
    };

    match base.as_str() {
        "integer" | "int" => ColumnType::Integer,
        "bigint" => ColumnType::BigInt,
        "smallint" | "tinyint" => ColumnType::SmallInt,
        "real" | "float" | "double" | "double precision" => ColumnType::Float,
        "numeric" | "decimal" => ColumnType::Decimal {
            precision: params.first().copied().unwrap_or(0),
            scale: params.get(1).copied().unwrap_or(0),
        },
        "varchar" | "character varying" | "char" | "character" => ColumnType::Varchar {
            length: params.first().copied().unwrap_or(0),
        },
        "text" | "clob" => ColumnType::Text,
        "blob" => ColumnType::Blob,
        "boolean" | "bool" => ColumnType::Boolean,
        "date" => ColumnType::Date,
        "time" => ColumnType::Time,
        "timestamp" | "datetime" => ColumnType::Timestamp { with_time_zone: false },
        "uuid" => ColumnType::Uuid,
        other => {
            tracing::warn!(declared = other, "unknown SQLite column type, falling back to text");
            ColumnType::Text
        }
    }
}
