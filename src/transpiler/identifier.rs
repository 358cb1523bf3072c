//! Table and column qualification.
//!
//! Identifiers are emitted as given, never quoted or validated. Only values
//! travel as parameters, so table and column names must not come from
//! untrusted input.

/// `prefix + table`, followed by `.column` when a column is given.
pub fn qualify(prefix: &str, table: &str, column: Option<&str>) -> String {
    match column {
        Some(column) => format!("{}{}.{}", prefix, table, column),
        None => format!("{}{}", prefix, table),
    }
}
