//! DSL parser.
//!
//! Turns the JSON-shaped query description into typed [`crate::ast`] nodes.
//! Bracket and brace tokens inside keys go through a small nom grammar in
//! [`tokens`]; everything else is a walk over `serde_json::Value`.
//!
//! Every symbolic token is resolved here, so an unknown operator, aggregate,
//! join kind or sort direction fails before any SQL is assembled.

pub mod columns;
pub mod conditions;
pub mod tokens;

pub use columns::{
    parse_assignments, parse_column_spec, parse_columns, parse_joins, parse_rows, InsertRows,
};
pub use conditions::parse_filter;
