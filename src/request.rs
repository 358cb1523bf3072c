//! Serialized request documents.
//!
//! A request is one JSON object tagged by `op`:
//!
//! ```json
//! {"op": "select", "table": "t", "columns": {"t": ["name"]}, "where": {"AND": {"t": {"age[>]": 18}}}}
//! {"op": "insert", "table": "t", "rows": [{"a": 1, "b": "x"}]}
//! {"op": "update", "table": "t", "set": {"a": 2}, "where": {"AND": {"t": {"id": 1}}}}
//! {"op": "delete", "table": "t", "where": {"AND": {"t": {"id": 1}}}}
//! {"op": "raw", "sql": "SELECT 1 WHERE :x = 1", "params": {"x": 1}}
//! ```
//!
//! The DSL parts stay as raw JSON; shape checks happen at compile time.

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::error::{QmapError, QmapResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Request {
    Select {
        table: String,
        #[serde(default)]
        columns: Json,
        #[serde(default, rename = "where")]
        filter: Json,
        #[serde(default)]
        join: Json,
    },
    Insert {
        table: String,
        rows: Json,
    },
    Update {
        table: String,
        set: Json,
        #[serde(default, rename = "where")]
        filter: Json,
    },
    Delete {
        table: String,
        #[serde(default, rename = "where")]
        filter: Json,
    },
    Raw {
        sql: String,
        #[serde(default)]
        params: Json,
    },
}

impl Request {
    /// Parse one request document.
    pub fn from_json_str(input: &str) -> QmapResult<Self> {
        serde_json::from_str(input)
            .map_err(|e| QmapError::shape(format!("invalid request document: {}", e)))
    }

    pub fn op(&self) -> &'static str {
        match self {
            Request::Select { .. } => "select",
            Request::Insert { .. } => "insert",
            Request::Update { .. } => "update",
            Request::Delete { .. } => "delete",
            Request::Raw { .. } => "raw",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_select_defaults() {
        let request = Request::from_json_str(r#"{"op": "select", "table": "t"}"#).unwrap();
        assert_eq!(
            request,
            Request::Select {
                table: "t".into(),
                columns: Json::Null,
                filter: Json::Null,
                join: Json::Null,
            }
        );
        assert_eq!(request.op(), "select");
    }

    #[test]
    fn test_where_is_renamed() {
        let request =
            Request::from_json_str(r#"{"op": "delete", "table": "t", "where": {"AND": {}}}"#).unwrap();
        let Request::Delete { filter, .. } = request else {
            panic!("expected delete");
        };
        assert!(filter.get("AND").is_some());
    }

    #[test]
    fn test_unknown_op() {
        assert!(matches!(
            Request::from_json_str(r#"{"op": "merge", "table": "t"}"#),
            Err(QmapError::InvalidArgumentShape(_))
        ));
    }
}
