//! PostgreSQL dialect.

mod inspect;
mod sql;

use strata_schema::ColumnType;

/// The PostgreSQL dialect. Supports the full change set.
#[derive(Debug, Clone, Copy, Default)]
pub struct Postgres;

impl Postgres {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

/// Quotes an identifier with double quotes, part-wise around `.` for
/// schema-qualified names.
#[must_use]
pub(crate) fn quote_identifier(name: &str) -> String {
    if name.contains('.') {
        return name
            .split('.')
            .map(quote_identifier)
            .collect::<Vec<_>>()
            .join(".");
    }
    if name.starts_with('"') && name.ends_with('"') {
        return name.to_string();
    }
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quotes a string literal with single quotes.
#[must_use]
pub(crate) fn quote_literal(value: &str) -> String {
    if value.starts_with('\'') && value.ends_with('\'') {
        return value.to_string();
    }
    format!("'{}'", value.replace('\'', "''"))
}

/// Prefixes `name` with `schema.` unless it is the default namespace.
#[must_use]
pub(crate) fn qualified(schema: &str, name: &str) -> String {
    if schema.is_empty() || schema == "public" {
        name.to_string()
    } else {
        format!("{schema}.{name}")
    }
}

/// Maps a PostgreSQL catalog type name to a [`ColumnType`].
#[must_use]
pub(crate) fn column_type_from_catalog(
    data_type: &str,
    udt_name: &str,
    char_length: Option<i32>,
    precision: Option<i32>,
    scale: Option<i32>,
) -> ColumnType {
    let data_type = data_type.trim().to_lowercase();

    if data_type == "array" {
        // information_schema spells arrays as ARRAY with the element
        // in udt_name, prefixed with an underscore.
        let element = udt_name.trim_start_matches('_');
        return ColumnType::Array(Box::new(column_type_from_catalog(
            element, element, None, None, None,
        )));
    }

    match data_type.as_str() {
        "integer" | "int" | "int4" => ColumnType::Integer,
        "bigint" | "int8" => ColumnType::BigInt,
        "smallint" | "int2" => ColumnType::SmallInt,
        "text" => ColumnType::Text,
        "boolean" | "bool" => ColumnType::Boolean,
        "real" | "float4" | "double precision" | "float8" => ColumnType::Float,
        "numeric" | "decimal" => ColumnType::Decimal {
            precision: precision.unwrap_or(0).max(0) as u32,
            scale: scale.unwrap_or(0).max(0) as u32,
        },
        "varchar" | "character varying" => ColumnType::Varchar {
            length: char_length.unwrap_or(0).max(0) as u32,
        },
        "timestamp" | "timestamp without time zone" => {
            ColumnType::Timestamp { with_time_zone: false }
        }
        "timestamptz" | "timestamp with time zone" => {
            ColumnType::Timestamp { with_time_zone: true }
        }
        "date" => ColumnType::Date,
        "time" | "time without time zone" => ColumnType::Time,
        "uuid" => ColumnType::Uuid,
        "bytea" => ColumnType::Blob,
        "json" => ColumnType::Json,
        "jsonb" => ColumnType::Jsonb,
        "serial" => ColumnType::Serial,
        "bigserial" => ColumnType::BigSerial,
        other => {
            tracing::warn!(data_type = other, "unknown PostgreSQL column type, keeping verbatim");
            ColumnType::Custom(other.to_string())
        }
    }
}

/// Parses a PostgreSQL array literal like `{a,b,c}` into a vector,
/// honoring double-quoted elements.
#[must_use]
pub(crate) fn parse_pg_array(value: &str) -> Vec<String> {
    let Some(inner) = value.strip_prefix('{').and_then(|v| v.strip_suffix('}')) else {
        return Vec::new();
    };
    if inner.is_empty() {
        return Vec::new();
    }

    let mut items = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    for ch in inner.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                items.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    if !current.is_empty() {
        items.push(current.trim().to_string());
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoting() {
        assert_eq!(quote_identifier("users"), "\"users\"");
        assert_eq!(quote_identifier("analytics.events"), "\"analytics\".\"events\"");
        assert_eq!(quote_identifier("we\"ird"), "\"we\"\"ird\"");
        assert_eq!(quote_literal("it's"), "'it''s'");
    }

    #[test]
    fn catalog_type_mapping() {
        assert_eq!(
            column_type_from_catalog("integer", "int4", None, None, None),
            ColumnType::Integer
        );
        assert_eq!(
            column_type_from_catalog("character varying", "varchar", Some(255), None, None),
            ColumnType::Varchar { length: 255 }
        );
        assert_eq!(
            column_type_from_catalog("numeric", "numeric", None, Some(10), Some(2)),
            ColumnType::Decimal { precision: 10, scale: 2 }
        );
        assert_eq!(
            column_type_from_catalog("timestamp with time zone", "timestamptz", None, None, None),
            ColumnType::Timestamp { with_time_zone: true }
        );
        assert_eq!(
            column_type_from_catalog("ARRAY", "_text", None, None, None),
            ColumnType::Array(Box::new(ColumnType::Text))
        );
        assert_eq!(
            column_type_from_catalog("citext", "citext", None, None, None),
            ColumnType::Custom("citext".into())
        );
    }

    #[test]
    fn pg_array_parsing() {
        assert_eq!(parse_pg_array("{a,b,c}"), vec!["a", "b", "c"]);
        assert_eq!(parse_pg_array("{}"), Vec::<String>::new());
        assert_eq!(parse_pg_array("{\"first,name\",second}"), vec!["first,name", "second"]);
        assert_eq!(parse_pg_array("not an array"), Vec::<String>::new());
    }
}
