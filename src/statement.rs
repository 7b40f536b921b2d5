//! Statement types exchanged with the query-compilation layer.
//!
//! The layer above this crate compiles queries down to SQL text plus a
//! positional parameter list; the driver forwards them to the engine without
//! inspecting the SQL.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// A positional statement parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SqlParam {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// Binary data (base64 encoded in JSON)
    #[serde(with = "base64_bytes")]
    Bytes(Vec<u8>),
    Json(JsonValue),
}

impl SqlParam {
    /// Check if this parameter is SQL NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<&str> for SqlParam {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for SqlParam {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<i64> for SqlParam {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<bool> for SqlParam {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<Vec<u8>> for SqlParam {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

/// Custom serialization for binary data as base64.
mod base64_bytes {
    use base64::{Engine as _, engine::general_purpose::STANDARD};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(bytes: &Vec<u8>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        STANDARD.encode(bytes).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        STANDARD.decode(&s).map_err(serde::de::Error::custom)
    }
}

/// A statement already compiled by the query layer: final SQL text and its
/// positional parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledStatement {
    pub sql: String,
    #[serde(default)]
    pub params: Vec<SqlParam>,
}

impl CompiledStatement {
    /// Create a statement with no parameters.
    pub fn raw(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Create a statement with positional parameters.
    pub fn with_params(sql: impl Into<String>, params: Vec<SqlParam>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }
}

/// Result of executing a statement.
#[derive(Debug, Clone, Default, Serialize)]
pub struct QueryResult {
    /// Result rows as column-name -> JSON value maps. Empty for DML.
    pub rows: Vec<serde_json::Map<String, JsonValue>>,
    /// Rows affected by DML. Zero for plain queries.
    pub rows_affected: u64,
}

impl QueryResult {
    /// A result carrying only an affected-row count.
    pub fn affected(rows_affected: u64) -> Self {
        Self {
            rows: Vec::new(),
            rows_affected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_conversions() {
        assert_eq!(SqlParam::from("abc"), SqlParam::Text("abc".to_string()));
        assert_eq!(SqlParam::from(42i64), SqlParam::Int(42));
        assert_eq!(SqlParam::from(true), SqlParam::Bool(true));
        assert_eq!(
            SqlParam::from(vec![0xde, 0xad]),
            SqlParam::Bytes(vec![0xde, 0xad])
        );
        assert!(SqlParam::Null.is_null());
        assert!(!SqlParam::Int(0).is_null());
    }

    #[test]
    fn test_bytes_param_serializes_as_base64() {
        let param = SqlParam::Bytes(vec![0xde, 0xad, 0xbe, 0xef]);
        let json = serde_json::to_string(&param).unwrap();
        assert_eq!(json, "\"3q2+7w==\"");
    }

    #[test]
    fn test_raw_statement_has_no_params() {
        let stmt = CompiledStatement::raw("SELECT 1");
        assert_eq!(stmt.sql, "SELECT 1");
        assert!(stmt.params.is_empty());
    }

    #[test]
    fn test_statement_with_params() {
        let stmt = CompiledStatement::with_params(
            "INSERT INTO t (a, b) VALUES (?, ?)",
            vec![SqlParam::Int(1), SqlParam::Text("x".to_string())],
        );
        assert_eq!(stmt.params.len(), 2);
    }

    #[test]
    fn test_query_result_affected() {
        let result = QueryResult::affected(3);
        assert_eq!(result.rows_affected, 3);
        assert!(result.rows.is_empty());
    }
}
