//! Column, join, assignment and insert-row parsing.

use serde_json::Value as Json;

use crate::ast::*;
use crate::error::{QmapError, QmapResult};

use super::tokens::{parse_column_token, parse_join_key};

/// Parse one column token owned by `table`.
pub fn parse_column_spec(table: &str, token: &str) -> QmapResult<ColumnSpec> {
    let parts = parse_column_token(token)?;

    let aggregate = match parts.bracket {
        Some(fn_token) => Some(
            Aggregate::from_token(fn_token)
                .ok_or_else(|| QmapError::unmapped("aggregate", fn_token))?,
        ),
        None => None,
    };

    Ok(ColumnSpec {
        table: table.to_string(),
        column: parts.name.to_string(),
        aggregate,
        alias: parts.alias.map(str::to_string),
    })
}

/// Parse a `{table: [column tokens]}` projection.
pub fn parse_columns(columns: &Json) -> QmapResult<Vec<ColumnSpec>> {
    let map = match columns {
        Json::Null => return Ok(Vec::new()),
        Json::Object(map) => map,
        _ => {
            return Err(QmapError::shape(
                "columns must be a mapping of table name to column list",
            ))
        }
    };

    let mut specs = Vec::new();
    for (table, tokens) in map {
        for token in string_list(tokens, "columns", table)? {
            specs.push(parse_column_spec(table, token)?);
        }
    }
    Ok(specs)
}

/// Parse a `{"[kind]table": [local, foreign]}` join mapping.
pub fn parse_joins(join: &Json) -> QmapResult<Vec<JoinSpec>> {
    let map = match join {
        Json::Null => return Ok(Vec::new()),
        Json::Object(map) => map,
        _ => {
            return Err(QmapError::shape(
                "join must be a mapping of [kind]table to a column pair",
            ))
        }
    };

    let mut joins = Vec::with_capacity(map.len());
    for (key, pair) in map {
        let (kind_token, target) = parse_join_key(key)?;
        let kind =
            JoinKind::from_token(kind_token).ok_or_else(|| QmapError::unmapped("join", kind_token))?;

        let columns = string_list(pair, "join", key)?;
        let [local, foreign] = columns.as_slice() else {
            return Err(QmapError::shape(format!(
                "join '{}' needs exactly two columns, got {}",
                key,
                columns.len()
            )));
        };

        joins.push(JoinSpec {
            kind,
            target_table: target.to_string(),
            local_column: local.to_string(),
            foreign_column: foreign.to_string(),
        });
    }
    Ok(joins)
}

/// Parse an UPDATE `{column: value}` mapping.
pub fn parse_assignments(set: &Json) -> QmapResult<Vec<Assignment>> {
    let Json::Object(map) = set else {
        return Err(QmapError::shape("update columns must be a mapping of column to value"));
    };
    if map.is_empty() {
        return Err(QmapError::shape("update needs at least one column"));
    }

    map.iter()
        .map(|(column, value)| -> QmapResult<Assignment> {
            Ok((column.clone(), Value::from_json(value)?))
        })
        .collect()
}

/// Rows of an INSERT: the shared column list and each row's values in that order.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertRows {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

/// Parse insert rows. A single object is one row.
///
/// Every row must carry exactly the first row's column set; row indexes in
/// errors are zero-based.
pub fn parse_rows(rows: &Json) -> QmapResult<InsertRows> {
    let objects: Vec<&serde_json::Map<String, Json>> = match rows {
        Json::Object(map) => vec![map],
        Json::Array(items) => items
            .iter()
            .map(|item| match item {
                Json::Object(map) => Ok(map),
                _ => Err(QmapError::shape("every insert row must be a mapping of column to value")),
            })
            .collect::<QmapResult<_>>()?,
        _ => return Err(QmapError::shape("insert rows must be a list of mappings")),
    };

    let Some(first) = objects.first() else {
        return Err(QmapError::shape("insert needs at least one row"));
    };
    if first.is_empty() {
        return Err(QmapError::shape("insert rows need at least one column"));
    }

    let columns: Vec<String> = first.keys().cloned().collect();
    let mut values = Vec::with_capacity(objects.len());

    for (index, row) in objects.iter().enumerate() {
        if row.len() != columns.len() {
            return Err(QmapError::HeterogeneousRows { row: index });
        }
        let mut ordered = Vec::with_capacity(columns.len());
        for column in &columns {
            let value = row
                .get(column)
                .ok_or(QmapError::HeterogeneousRows { row: index })?;
            ordered.push(Value::from_json(value)?);
        }
        values.push(ordered);
    }

    Ok(InsertRows { columns, rows: values })
}

/// Read a JSON array of strings.
pub(crate) fn string_list<'a>(value: &'a Json, what: &str, owner: &str) -> QmapResult<Vec<&'a str>> {
    let Json::Array(items) = value else {
        return Err(QmapError::shape(format!("{} for '{}' must be a list", what, owner)));
    };
    items
        .iter()
        .map(|item| {
            item.as_str().ok_or_else(|| {
                QmapError::shape(format!("{} for '{}' must contain only strings", what, owner))
            })
        })
        .collect()
}
