//! CSV bulk loading.
//!
//! PostgreSQL gets a real `COPY … FROM STDIN` fast path; the other
//! dialects reject with a typed error.

use sqlx::PgConnection;

use crate::postgres::{quote_identifier, Postgres};
use crate::DialectError;

/// Options for importing CSV data into a table.
#[derive(Debug, Clone)]
pub struct CsvImportOptions {
    /// Field delimiter.
    pub delimiter: char,
    /// String that represents NULL; empty means the database default.
    pub null_value: String,
    /// Whether the input starts with a header row.
    pub header: bool,
    /// Quote character.
    pub quote: char,
    /// Escape character.
    pub escape: char,
    /// Input encoding.
    pub encoding: String,
    /// Explicit target columns; empty means the table's column order.
    pub columns: Vec<String>,
}

impl Default for CsvImportOptions {
    fn default() -> Self {
        Self {
            delimiter: ',',
            null_value: String::new(),
            header: true,
            quote: '"',
            escape: '\\',
            encoding: "UTF8".to_string(),
            columns: Vec::new(),
        }
    }
}

impl CsvImportOptions {
    /// Renders the `COPY` statement for this option set.
    #[must_use]
    pub(crate) fn copy_statement(&self, schema: &str, table: &str) -> String {
        let target = if schema.is_empty() || schema == "public" {
            quote_identifier(table)
        } else {
            format!("{}.{}", quote_identifier(schema), quote_identifier(table))
        };

        let mut sql = format!("COPY {target}");
        if !self.columns.is_empty() {
            let columns: Vec<String> =
                self.columns.iter().map(|c| quote_identifier(c)).collect();
            sql.push_str(&format!(" ({})", columns.join(", ")));
        }

        sql.push_str(&format!(
            " FROM STDIN WITH (FORMAT CSV, DELIMITER '{}'",
            self.delimiter
        ));
        if self.header {
            sql.push_str(", HEADER");
        }
        sql.push_str(&format!(", QUOTE '{}'", self.quote));
        sql.push_str(&format!(", ESCAPE '{}'", escape_char_literal(self.escape)));
        if !self.null_value.is_empty() {
            sql.push_str(&format!(", NULL '{}'", self.null_value));
        }
        sql.push_str(&format!(", ENCODING '{}'", self.encoding));
        sql.push(')');
        sql
    }
}

fn escape_char_literal(ch: char) -> String {
    if ch == '\'' {
        "''".to_string()
    } else {
        ch.to_string()
    }
}

impl Postgres {
    /// Bulk-loads CSV data into a table via `COPY … FROM STDIN`.
    ///
    /// `data` is the raw CSV byte stream, handed to the server
    /// unchanged.
    pub async fn import_csv(
        conn: &mut PgConnection,
        schema: &str,
        table: &str,
        data: &[u8],
        options: &CsvImportOptions,
    ) -> Result<u64, DialectError> {
        let statement = options.copy_statement(schema, table);
        let mut copy = conn.copy_in_raw(&statement).await?;
        if let Err(error) = copy.send(data).await {
            copy.abort("aborting failed CSV import").await.ok();
            return Err(error.into());
        }
        Ok(copy.finish().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copy_statement_defaults() {
        let options = CsvImportOptions::default();
        assert_eq!(
            options.copy_statement("", "users"),
            "COPY \"users\" FROM STDIN WITH (FORMAT CSV, DELIMITER ',', HEADER, \
             QUOTE '\"', ESCAPE '\\', ENCODING 'UTF8')"
        );
    }

    #[test]
    fn copy_statement_with_columns_and_schema() {
        let options = CsvImportOptions {
            header: false,
            delimiter: ';',
            null_value: "NULL".into(),
            columns: vec!["id".into(), "name".into()],
            ..CsvImportOptions::default()
        };
        assert_eq!(
            options.copy_statement("analytics", "events"),
            "COPY \"analytics\".\"events\" (\"id\", \"name\") FROM STDIN WITH \
             (FORMAT CSV, DELIMITER ';', QUOTE '\"', ESCAPE '\\', NULL 'NULL', \
             ENCODING 'UTF8')"
        );
    }
}
