//! MySQL dialect.

mod inspect;
mod sql;

use strata_schema::ColumnType;

/// The MySQL dialect.
///
/// Extensions, sequences and row policies are outside MySQL's
/// vocabulary and are rejected with typed errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySql;

impl MySql {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

/// Quotes an identifier with backticks.
#[must_use]
pub(crate) fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Quotes a string literal with single quotes.
#[must_use]
pub(crate) fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Maps an `information_schema.columns` row to a [`ColumnType`].
///
/// MySQL normalizes booleans to `tinyint(1)`, so booleans come back as
/// integers; that is a documented round-trip normalization.
#[must_use]
pub(crate) fn column_type_from_catalog(
    data_type: &str,
    column_type: &str,
    char_length: Option<i64>,
    precision: Option<i64>,
    scale: Option<i64>,
) -> ColumnType {
    match data_type.trim().to_lowercase().as_str() {
        "varchar" | "char" | "binary" | "varbinary" => ColumnType::Varchar {
            length: char_length.unwrap_or(0).max(0) as u32,
        },
        "text" | "tinytext" | "mediumtext" | "longtext" => ColumnType::Text,
        "decimal" | "numeric" => ColumnType::Decimal {
            precision: precision.unwrap_or(0).max(0) as u32,
            scale: scale.unwrap_or(0).max(0) as u32,
        },
        "int" | "integer" | "tinyint" | "smallint" | "mediumint" => ColumnType::Integer,
        "bigint" => ColumnType::BigInt,
        "float" | "double" => ColumnType::Float,
        "boolean" | "bool" => ColumnType::Boolean,
        "date" => ColumnType::Date,
        "time" => ColumnType::Time,
        "timestamp" | "datetime" => ColumnType::Timestamp { with_time_zone: false },
        "json" => ColumnType::Json,
        "blob" | "tinyblob" | "mediumblob" | "longblob" => ColumnType::Blob,
        "enum" => ColumnType::Enum { values: parse_enum_values(column_type) },
        other => {
            tracing::warn!(data_type = other, "unknown MySQL column type, falling back to text");
            ColumnType::Text
        }
    }
}

/// Extracts the values from a MySQL `enum('a','b')` column type
/// string.
#[must_use]
pub(crate) fn parse_enum_values(column_type: &str) -> Vec<String> {
    let Some(inner) = column_type
        .strip_prefix("enum(")
        .and_then(|v| v.strip_suffix(')'))
    else {
        return Vec::new();
    };

    let mut values = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = inner.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\'' if in_quotes && chars.peek() == Some(&'\'') => {
                current.push('\'');
                chars.next();
            }
            '\'' => {
                if in_quotes {
                    values.push(current.clone());
                    current.clear();
                }
                in_quotes = !in_quotes;
            }
            _ if in_quotes => current.push(ch),
            _ => {}
        }
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoting() {
        assert_eq!(quote_identifier("users"), "`users`");
        assert_eq!(quote_identifier("we`ird"), "`we``ird`");
        assert_eq!(quote_literal("it's"), "'it''s'");
    }

    #[test]
    fn catalog_type_mapping() {
        assert_eq!(
            column_type_from_catalog("varchar", "varchar(255)", Some(255), None, None),
            ColumnType::Varchar { length: 255 }
        );
        // Booleans surface as tinyint; mapped to integer.
        assert_eq!(
            column_type_from_catalog("tinyint", "tinyint(1)", None, Some(3), Some(0)),
            ColumnType::Integer
        );
        assert_eq!(
            column_type_from_catalog("decimal", "decimal(10,2)", None, Some(10), Some(2)),
            ColumnType::Decimal { precision: 10, scale: 2 }
        );
        assert_eq!(
            column_type_from_catalog("datetime", "datetime", None, None, None),
            ColumnType::Timestamp { with_time_zone: false }
        );
    }

    #[test]
    fn enum_value_parsing() {
        assert_eq!(
            parse_enum_values("enum('small','medium','large')"),
            vec!["small", "medium", "large"]
        );
        assert_eq!(parse_enum_values("enum('it''s')"), vec!["it's"]);
        assert!(parse_enum_values("int").is_empty());
    }
}
