//! # qmap: structured queries to parameterized SQL
//!
//! qmap turns a nested-map description of a query (columns, conditions,
//! joins, grouping, ordering, pagination) into dialect-correct SQL text with
//! named placeholders plus an ordered parameter mapping.
//!
//! ## Quick Example
//!
//! ```rust
//! use qmap::prelude::*;
//! use serde_json::json;
//!
//! let query = Compiler::new(Dialect::MySql)
//!     .select(
//!         "t",
//!         &json!({"t": ["name"]}),
//!         &json!({"AND": {"t": {"age[>]": 18}}}),
//!         &json!(null),
//!     )
//!     .unwrap();
//! assert_eq!(query.text(), "SELECT t.name FROM t WHERE ( t.age > :p1 );");
//! assert_eq!(query.params().get("p1"), Some(&Value::Int(18)));
//! ```
//!
//! ## Tokens
//!
//! | Token              | Where             | Meaning                      |
//! |--------------------|-------------------|------------------------------|
//! | `name[sum]`        | column            | `SUM(t.name)`                |
//! | `name{alias}`      | column            | `t.name AS alias`            |
//! | `age[>=]`          | condition key     | `t.age >= :p1`               |
//! | `id[in]`           | condition key     | `t.id IN (:p1, :p2)`         |
//! | `age[<>]`          | condition key     | `t.age BETWEEN :p1 AND :p2`  |
//! | `deleted[null]`    | condition key     | `t.deleted IS NULL`          |
//! | `[>]other`         | join key          | `LEFT JOIN other ON (...)`   |
//! | `created[DESC]`    | ORDER entry       | `t.created DESC`             |
//!
//! Execution goes through an [`engine::Executor`]; [`engine::Session`] pairs
//! one with a compiler and keeps the query history.

pub mod ast;
pub mod config;
pub mod dialect;
pub mod engine;
pub mod error;
pub mod history;
pub mod parser;
pub mod placeholders;
pub mod request;
pub mod transpiler;

pub use dialect::Dialect;
pub use error::{QmapError, QmapResult};
pub use request::Request;
pub use transpiler::{CompiledQuery, Compiler, InsertBatch, Params, Statement};

pub mod prelude {
    pub use crate::ast::*;
    pub use crate::config::SessionConfig;
    pub use crate::dialect::{Capabilities, Dialect, StatusAttribute};
    pub use crate::engine::{ExecuteResult, Executor, Row, Session, SqlxExecutor};
    pub use crate::error::*;
    pub use crate::request::Request;
    pub use crate::transpiler::{CompiledQuery, Compiler, InsertBatch, Params, Statement};
}

/// Compile one JSON request document for a dialect.
///
/// # Example
///
/// ```
/// use qmap::{compile, Dialect, Statement};
///
/// let stmt = compile(
///     Dialect::SqlServer,
///     r#"{"op": "delete", "table": "t", "where": {"LIMIT": 10}}"#,
/// )
/// .unwrap();
/// let Statement::Query(query) = stmt else { panic!("expected a query") };
/// assert_eq!(query.text(), "DELETE TOP (:limit) FROM t;");
/// ```
pub fn compile(dialect: Dialect, request: &str) -> QmapResult<Statement> {
    let request = Request::from_json_str(request)?;
    Compiler::new(dialect).compile(&request)
}
