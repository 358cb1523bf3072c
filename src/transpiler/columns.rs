//! SELECT projection rendering.

use crate::ast::ColumnSpec;

use super::identifier::qualify;

/// The column expression without its alias: `t.c` or `FUNC(t.c)`.
pub fn column_expr(prefix: &str, spec: &ColumnSpec) -> String {
    let qualified = qualify(prefix, &spec.table, Some(&spec.column));
    match spec.aggregate {
        Some(aggregate) => format!("{}({})", aggregate.function(), qualified),
        None => qualified,
    }
}

/// One projected column, with `AS alias` when requested.
pub fn render_column(prefix: &str, spec: &ColumnSpec) -> String {
    let expr = column_expr(prefix, spec);
    match &spec.alias {
        Some(alias) => format!("{} AS {}", expr, alias),
        None => expr,
    }
}

/// Comma-joined projection list; `*` when nothing is requested.
pub fn render_projection(prefix: &str, specs: &[ColumnSpec]) -> String {
    if specs.is_empty() {
        return "*".to_string();
    }
    specs
        .iter()
        .map(|spec| render_column(prefix, spec))
        .collect::<Vec<_>>()
        .join(", ")
}
