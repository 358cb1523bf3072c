//! UPDATE SQL generation.

use crate::ast::*;
use crate::transpiler::conditions::render_filter;
use crate::transpiler::identifier::qualify;
use crate::transpiler::{CompiledQuery, Compiler, ParamContext};

use super::finish;

/// Generate UPDATE SQL.
///
/// Assignments bind first, so `SET` placeholders take the lowest indexes and
/// WHERE values continue the same counter.
pub fn build_update(
    compiler: &Compiler,
    table: &str,
    assignments: &[Assignment],
    filter: &Filter,
) -> CompiledQuery {
    let prefix = compiler.prefix();
    let mut ctx = ParamContext::new();

    let set: Vec<String> = assignments
        .iter()
        .map(|(column, value)| format!("{} = {}", column, ctx.bind(value.clone())))
        .collect();

    let rendered = render_filter(filter, compiler.capabilities(), prefix, &mut ctx);

    let mut parts = vec!["UPDATE".to_string()];
    if let Some(top) = rendered.top_clause() {
        parts.push(top);
    }
    parts.push(qualify(prefix, table, None));
    parts.push("SET".to_string());
    parts.push(set.join(", "));
    rendered.push_clauses(&mut parts);

    CompiledQuery::new(finish(parts), ctx.into_params())
}
