//! JOIN clause rendering.

use crate::ast::JoinSpec;

use super::identifier::qualify;

/// `KIND JOIN target ON (table.local = target.foreign)`.
pub fn render_join(prefix: &str, table: &str, join: &JoinSpec) -> String {
    format!(
        "{} JOIN {} ON ({} = {})",
        join.kind.keyword(),
        qualify(prefix, &join.target_table, None),
        qualify(prefix, table, Some(&join.local_column)),
        qualify(prefix, &join.target_table, Some(&join.foreign_column)),
    )
}

/// All joins in input order, space-separated. Empty when there are none.
pub fn render_joins(prefix: &str, table: &str, joins: &[JoinSpec]) -> String {
    joins
        .iter()
        .map(|join| render_join(prefix, table, join))
        .collect::<Vec<_>>()
        .join(" ")
}
