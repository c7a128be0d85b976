//! SQL column types.
//!
//! A single closed enum covers the portable types plus the
//! dialect-flavored ones (JSON, serial, enum, arrays). Every variant
//! has a canonical lowercase SQL spelling; two types are considered
//! equal when their spellings match, with one carve-out for `Varchar`
//! where a length of 0 means "unspecified" and matches any length.

use serde::{Deserialize, Serialize};

/// A SQL column type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ColumnType {
    /// 32-bit integer.
    Integer,
    /// 64-bit integer.
    BigInt,
    /// 16-bit integer.
    SmallInt,
    /// Boolean.
    Boolean,
    /// Floating point.
    Float,
    /// Exact numeric with precision and scale (0 = unspecified).
    Decimal { precision: u32, scale: u32 },
    /// Variable-length string (length 0 = unspecified).
    Varchar { length: u32 },
    /// Unbounded text.
    Text,
    /// Timestamp, optionally with time zone.
    Timestamp { with_time_zone: bool },
    /// Calendar date.
    Date,
    /// Time of day.
    Time,
    /// UUID.
    Uuid,
    /// Binary blob (BYTEA on PostgreSQL).
    Blob,
    /// JSON document (PostgreSQL, MySQL).
    Json,
    /// Binary JSON document (PostgreSQL).
    Jsonb,
    /// Auto-incrementing 32-bit integer (PostgreSQL).
    Serial,
    /// Auto-incrementing 64-bit integer (PostgreSQL).
    BigSerial,
    /// Enumerated string set (MySQL).
    Enum { values: Vec<String> },
    /// Array of an element type (PostgreSQL).
    Array(Box<ColumnType>),
    /// Any type the model does not know about, spelled verbatim.
    Custom(String),
}

impl ColumnType {
    /// Canonical lowercase SQL spelling of this type.
    #[must_use]
    pub fn sql(&self) -> String {
        match self {
            Self::Integer => "integer".to_string(),
            Self::BigInt => "bigint".to_string(),
            Self::SmallInt => "smallint".to_string(),
            Self::Boolean => "boolean".to_string(),
            Self::Float => "float".to_string(),
            Self::Decimal { precision, scale } => {
                if *precision > 0 {
                    format!("numeric({precision},{scale})")
                } else {
                    "numeric".to_string()
                }
            }
            Self::Varchar { length } => {
                if *length > 0 {
                    format!("varchar({length})")
                } else {
                    "varchar".to_string()
                }
            }
            Self::Text => "text".to_string(),
            Self::Timestamp { with_time_zone } => {
                if *with_time_zone {
                    "timestamp with time zone".to_string()
                } else {
                    "timestamp".to_string()
                }
            }
            Self::Date => "date".to_string(),
            Self::Time => "time".to_string(),
            Self::Uuid => "uuid".to_string(),
            Self::Blob => "blob".to_string(),
            Self::Json => "json".to_string(),
            Self::Jsonb => "jsonb".to_string(),
            Self::Serial => "serial".to_string(),
            Self::BigSerial => "bigserial".to_string(),
            Self::Enum { values } => {
                if values.is_empty() {
                    "enum".to_string()
                } else {
                    let quoted: Vec<String> =
                        values.iter().map(|v| format!("'{}'", v.replace('\'', "''"))).collect();
                    format!("enum({})", quoted.join(","))
                }
            }
            Self::Array(element) => format!("{}[]", element.sql()),
            Self::Custom(name) => name.to_lowercase(),
        }
    }
}

impl PartialEq for ColumnType {
    fn eq(&self, other: &Self) -> bool {
        // A varchar of unspecified length (introspection often cannot
        // recover it) matches any varchar.
        if let (Self::Varchar { .. }, Self::Varchar { .. }) = (self, other) {
            return true;
        }
        self.sql() == other.sql()
    }
}

impl Eq for ColumnType {}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.sql())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_spellings() {
        assert_eq!(ColumnType::Integer.sql(), "integer");
        assert_eq!(ColumnType::BigInt.sql(), "bigint");
        assert_eq!(ColumnType::Varchar { length: 255 }.sql(), "varchar(255)");
        assert_eq!(ColumnType::Varchar { length: 0 }.sql(), "varchar");
        assert_eq!(
            ColumnType::Decimal { precision: 10, scale: 2 }.sql(),
            "numeric(10,2)"
        );
        assert_eq!(ColumnType::Decimal { precision: 0, scale: 0 }.sql(), "numeric");
        assert_eq!(
            ColumnType::Timestamp { with_time_zone: true }.sql(),
            "timestamp with time zone"
        );
        assert_eq!(ColumnType::Timestamp { with_time_zone: false }.sql(), "timestamp");
        assert_eq!(
            ColumnType::Array(Box::new(ColumnType::Text)).sql(),
            "text[]"
        );
        assert_eq!(ColumnType::Custom("CITEXT".into()).sql(), "citext");
    }

    #[test]
    fn enum_spelling_includes_values() {
        let ty = ColumnType::Enum {
            values: vec!["small".into(), "large".into()],
        };
        assert_eq!(ty.sql(), "enum('small','large')");
    }

    #[test]
    fn varchar_length_is_a_wildcard() {
        let unspecified = ColumnType::Varchar { length: 0 };
        let bounded = ColumnType::Varchar { length: 255 };
        assert_eq!(unspecified, bounded);
        assert_eq!(bounded, ColumnType::Varchar { length: 100 });
    }

    #[test]
    fn equality_follows_spelling() {
        assert_eq!(ColumnType::Integer, ColumnType::Integer);
        assert_ne!(ColumnType::Integer, ColumnType::BigInt);
        assert_ne!(
            ColumnType::Timestamp { with_time_zone: false },
            ColumnType::Timestamp { with_time_zone: true }
        );
        assert_eq!(ColumnType::Custom("text".into()), ColumnType::Text);
    }
}
