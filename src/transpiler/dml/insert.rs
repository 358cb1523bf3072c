//! INSERT SQL generation.

use crate::parser::InsertRows;
use crate::transpiler::identifier::qualify;
use crate::transpiler::{Compiler, InsertBatch, Params};

/// Generate one INSERT template and a parameter set per row.
pub fn build_insert(compiler: &Compiler, table: &str, rows: &InsertRows) -> InsertBatch {
    let names = param_names(&rows.columns);

    let placeholders: Vec<String> = names.iter().map(|n| format!(":{}", n)).collect();
    let sql = format!(
        "INSERT INTO {}({}) VALUES({});",
        qualify(compiler.prefix(), table, None),
        rows.columns.join(", "),
        placeholders.join(", ")
    );

    let params = rows
        .rows
        .iter()
        .map(|row| {
            names
                .iter()
                .zip(row)
                .map(|(name, value)| (name.as_str(), value.clone()))
                .collect::<Params>()
        })
        .collect();

    InsertBatch::new(sql, params)
}

/// `p_<column>` with non-alphanumerics replaced by `_`. Columns that
/// sanitize to the same name get a numeric suffix.
fn param_names(columns: &[String]) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(columns.len());
    for column in columns {
        let base: String = column
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
            .collect();
        let base = format!("p_{}", base);

        let mut name = base.clone();
        let mut suffix = 2;
        while names.contains(&name) {
            name = format!("{}_{}", base, suffix);
            suffix += 1;
        }
        names.push(name);
    }
    names
}
