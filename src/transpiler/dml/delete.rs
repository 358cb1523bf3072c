//! DELETE SQL generation.

use crate::ast::*;
use crate::transpiler::conditions::render_filter;
use crate::transpiler::identifier::qualify;
use crate::transpiler::{CompiledQuery, Compiler, ParamContext};

use super::finish;

/// Generate DELETE SQL. Without conditions the statement has no WHERE.
pub fn build_delete(compiler: &Compiler, table: &str, filter: &Filter) -> CompiledQuery {
    let prefix = compiler.prefix();
    let mut ctx = ParamContext::new();
    let rendered = render_filter(filter, compiler.capabilities(), prefix, &mut ctx);

    let mut parts = vec!["DELETE".to_string()];
    if let Some(top) = rendered.top_clause() {
        parts.push(top);
    }
    parts.push("FROM".to_string());
    parts.push(qualify(prefix, table, None));
    rendered.push_clauses(&mut parts);

    CompiledQuery::new(finish(parts), ctx.into_params())
}
