//! Transpiler test modules.
//!
//! Tests are organized by category:
//! - `core`: SELECT, INSERT, UPDATE and DELETE assembly
//! - `dialects`: pagination and casting differences between dialects

mod core;
