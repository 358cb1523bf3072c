//! SELECT SQL generation.

use crate::ast::*;
use crate::transpiler::columns::render_projection;
use crate::transpiler::conditions::render_filter;
use crate::transpiler::identifier::qualify;
use crate::transpiler::joins::render_joins;
use crate::transpiler::{CompiledQuery, Compiler, ParamContext};

use super::finish;

/// Generate SELECT SQL.
pub fn build_select(
    compiler: &Compiler,
    table: &str,
    columns: &[ColumnSpec],
    filter: &Filter,
    joins: &[JoinSpec],
) -> CompiledQuery {
    let prefix = compiler.prefix();
    let mut ctx = ParamContext::new();
    let rendered = render_filter(filter, compiler.capabilities(), prefix, &mut ctx);

    let mut parts = vec!["SELECT".to_string()];
    if let Some(top) = rendered.top_clause() {
        parts.push(top);
    }
    parts.push(render_projection(prefix, columns));
    parts.push("FROM".to_string());
    parts.push(qualify(prefix, table, None));

    let joins = render_joins(prefix, table, joins);
    if !joins.is_empty() {
        parts.push(joins);
    }

    rendered.push_clauses(&mut parts);

    CompiledQuery::new(finish(parts), ctx.into_params())
}
