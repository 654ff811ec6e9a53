mod connection;
mod postgres;
mod queries;
mod rest;

pub use connection::*;
pub use postgres::PgBackend;
pub use queries::*;
pub use rest::RestBackend;

use std::fmt;

use serde_json::Value;

use crate::error::ExecutionError;

/// One result row, keyed by column name in backend order.
pub type Row = serde_json::Map<String, Value>;

pub const DEFAULT_ROW_CAP: usize = 100;

const MAX_IDENTIFIER_LEN: usize = 63;

/// Remote capabilities every backend handle exposes.
#[allow(async_fn_in_trait)]
pub trait Backend {
    fn kind(&self) -> &'static str;

    /// Runs a raw SQL statement and returns its rows.
    async fn execute(&self, sql: &str) -> Result<Vec<Row>, ExecutionError>;

    /// Reads at most `limit` rows from `table` with no filter and no ordering.
    async fn select(&self, table: &TableName, limit: usize) -> Result<Vec<Row>, ExecutionError>;
}

/// A table identifier that is safe to place in SQL and in URL paths once
/// quoted or encoded. Any name Postgres accepts is representable.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TableName(String);

impl TableName {
    /// Rejects names Postgres itself could never hold: empty, longer than
    /// `NAMEDATALEN - 1` bytes, or containing control characters.
    pub fn parse(name: &str) -> Result<Self, ExecutionError> {
        if name.is_empty() || name.len() > MAX_IDENTIFIER_LEN || name.chars().any(char::is_control) {
            return Err(ExecutionError::InvalidIdentifier(name.to_string()));
        }
        Ok(Self(name.to_string()))
    }

    /// Accepts `name` only if the table lister returned it.
    pub fn listed(name: &str, listed: &[String]) -> Result<Self, ExecutionError> {
        if !listed.iter().any(|t| t == name) {
            return Err(ExecutionError::UnlistedTable(name.to_string()));
        }
        Self::parse(name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The name as a single-quoted SQL string literal.
    pub fn sql_literal(&self) -> String {
        format!("'{}'", self.0.replace('\'', "''"))
    }

    /// The name as a double-quoted SQL identifier.
    pub fn quoted_ident(&self) -> String {
        format!("\"{}\"", self.0.replace('"', "\"\""))
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
    pub default: Option<String>,
    pub position: u32,
}

/// Text shown for a cell, both on screen and in CSV exports.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Column names across `rows`, in order of first appearance.
pub fn row_columns(rows: &[Row]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for row in rows {
        for key in row.keys() {
            if !columns.iter().any(|c| c == key) {
                columns.push(key.clone());
            }
        }
    }
    columns
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn table_name_accepts_catalog_names() {
        for name in ["users", "_audit", "Orders2024", "t$x", "café", "user-profiles", "Order Items"] {
            assert!(TableName::parse(name).is_ok(), "{name} should be valid");
        }
    }

    #[test]
    fn table_name_rejects_impossible_names() {
        for name in ["", "a\0b", "line\nbreak"] {
            assert!(
                matches!(TableName::parse(name), Err(ExecutionError::InvalidIdentifier(_))),
                "{name:?} should be rejected"
            );
        }
        assert!(TableName::parse(&"a".repeat(64)).is_err());
        assert!(TableName::parse(&"a".repeat(63)).is_ok());
    }

    #[test]
    fn listed_requires_catalog_membership() {
        let tables = vec!["users".to_string(), "user-profiles".to_string()];
        assert_eq!(TableName::listed("user-profiles", &tables).unwrap().as_str(), "user-profiles");
        assert!(matches!(
            TableName::listed("users; drop table users", &tables),
            Err(ExecutionError::UnlistedTable(_))
        ));
    }

    #[test]
    fn quoting_helpers() {
        let t = TableName::parse("users").unwrap();
        assert_eq!(t.sql_literal(), "'users'");
        assert_eq!(t.quoted_ident(), "\"users\"");

        let odd = TableName::parse("o'clock \"x\"").unwrap();
        assert_eq!(odd.sql_literal(), "'o''clock \"x\"'");
        assert_eq!(odd.quoted_ident(), "\"o'clock \"\"x\"\"\"");
    }

    #[test]
    fn cell_text_formats_json_values() {
        assert_eq!(cell_text(&Value::Null), "");
        assert_eq!(cell_text(&json!("a,b")), "a,b");
        assert_eq!(cell_text(&json!(42)), "42");
        assert_eq!(cell_text(&json!(true)), "true");
        assert_eq!(cell_text(&json!({"k": [1, 2]})), r#"{"k":[1,2]}"#);
    }

    #[test]
    fn row_columns_follow_first_appearance() {
        let rows: Vec<Row> = vec![
            json!({"id": 1, "name": "a"}).as_object().unwrap().clone(),
            json!({"id": 2, "email": "b@x"}).as_object().unwrap().clone(),
        ];
        assert_eq!(row_columns(&rows), vec!["id", "name", "email"]);
    }
}
