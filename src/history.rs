//! Append-only log of executed statements.

use crate::dialect::Capabilities;
use crate::placeholders;
use crate::transpiler::Params;

/// Executed statements with their values spliced in, oldest first.
///
/// Entries are for display only; they are never executed again.
#[derive(Debug, Clone, Default)]
pub struct QueryHistory {
    entries: Vec<String>,
}

impl QueryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one executed statement, read with the dialect's quoting rules.
    pub fn record(&mut self, sql: &str, params: &Params, caps: &Capabilities) {
        self.entries.push(placeholders::render(sql, params, caps));
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}
