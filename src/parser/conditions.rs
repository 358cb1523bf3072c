//! WHERE description parsing.

use serde_json::Value as Json;

use crate::ast::*;
use crate::error::{QmapError, QmapResult};

use super::columns::{parse_column_spec, string_list};
use super::tokens::parse_keyed_token;

/// Parse the top-level WHERE mapping.
pub fn parse_filter(filter: &Json) -> QmapResult<Filter> {
    let map = match filter {
        Json::Null => return Ok(Filter::default()),
        Json::Object(map) => map,
        _ => return Err(QmapError::shape("where must be a mapping")),
    };

    let mut nodes = Vec::with_capacity(map.len());
    let mut has_conjunction = false;

    for (key, value) in map {
        if let Some(kind) = Conjunction::from_key(key) {
            if has_conjunction {
                return Err(QmapError::shape(
                    "where accepts only one of AND, OR or SINGLE at the top level",
                ));
            }
            has_conjunction = true;
            nodes.push(parse_conjunction(kind, value)?);
            continue;
        }

        let node = match key.as_str() {
            "MATCH" => parse_match(value)?,
            "GROUP" => ConditionNode::GroupBy {
                columns: parse_table_columns(value, "GROUP")?,
            },
            "HAVING" => parse_having(value)?,
            "ORDER" => parse_order(value)?,
            "LIMIT" => parse_limit(value)?,
            other => {
                return Err(QmapError::shape(format!(
                    "unknown where key '{}'; expected AND, OR, SINGLE, MATCH, GROUP, HAVING, ORDER or LIMIT",
                    other
                )))
            }
        };
        nodes.push(node);
    }

    Ok(Filter { nodes })
}

/// Parse the children of one conjunction. Keys are nested conjunctions or
/// table names; a table's leaves are grouped under the same conjunction.
fn parse_conjunction(kind: Conjunction, value: &Json) -> QmapResult<ConditionNode> {
    let Json::Object(map) = value else {
        return Err(QmapError::shape(format!(
            "{} must map table names to conditions",
            kind.keyword()
        )));
    };

    let mut children = Vec::with_capacity(map.len());
    for (key, child) in map {
        if let Some(inner) = Conjunction::from_key(key) {
            children.push(parse_conjunction(inner, child)?);
            continue;
        }

        let Json::Object(conditions) = child else {
            return Err(QmapError::shape(format!(
                "conditions for table '{}' must be a mapping of column to value",
                key
            )));
        };

        let leaves = conditions
            .iter()
            .map(|(column_key, v)| parse_leaf(key, column_key, v).map(ConditionNode::Leaf))
            .collect::<QmapResult<Vec<_>>>()?;

        children.push(ConditionNode::Conjunction {
            kind,
            children: leaves,
        });
    }

    Ok(ConditionNode::Conjunction { kind, children })
}

/// Parse `column[op] => value`. A key without a bracket means `[=]`.
fn parse_leaf(table: &str, key: &str, value: &Json) -> QmapResult<Leaf> {
    let (column, op_token) = parse_keyed_token(key)?;
    let operator = match op_token {
        Some(token) => {
            Operator::from_token(token).ok_or_else(|| QmapError::unmapped("operator", token))?
        }
        None => Operator::Eq,
    };

    let qualified = format!("{}.{}", table, column);
    Ok(Leaf {
        table: table.to_string(),
        column: column.to_string(),
        operator,
        values: operator_values(operator, value, &qualified)?,
    })
}

/// Check a value against the operator's arity and flatten it.
fn operator_values(operator: Operator, value: &Json, subject: &str) -> QmapResult<Vec<Value>> {
    match operator.arity() {
        Arity::Unary => Ok(Vec::new()),
        Arity::Binary => {
            if value.is_array() || value.is_object() {
                return Err(QmapError::InvalidValue(format!(
                    "[{}] on {} expects a single value",
                    operator.token(),
                    subject
                )));
            }
            Ok(vec![Value::from_json(value)?])
        }
        Arity::Ternary => match value {
            Json::Array(items) if Some(items.len()) == operator.arity().expected_values() => {
                items.iter().map(Value::from_json).collect()
            }
            _ => Err(QmapError::InvalidValue(format!(
                "[{}] on {} expects exactly two values",
                operator.token(),
                subject
            ))),
        },
        Arity::List => match value {
            Json::Array(items) if !items.is_empty() => items.iter().map(Value::from_json).collect(),
            _ => Err(QmapError::InvalidValue(format!(
                "[{}] on {} expects a non-empty list of values",
                operator.token(),
                subject
            ))),
        },
    }
}

/// Parse `{table: [columns]}`.
fn parse_table_columns(value: &Json, what: &str) -> QmapResult<TableColumns> {
    let Json::Object(map) = value else {
        return Err(QmapError::shape(format!(
            "{} must map table names to column lists",
            what
        )));
    };

    map.iter()
        .map(|(table, columns)| -> QmapResult<(String, Vec<String>)> {
            let columns: Vec<String> = string_list(columns, what, table)?
                .into_iter()
                .map(str::to_string)
                .collect();
            Ok((table.clone(), columns))
        })
        .collect()
}

fn parse_match(value: &Json) -> QmapResult<ConditionNode> {
    let Json::Object(map) = value else {
        return Err(QmapError::shape("MATCH must be a mapping with columns and search"));
    };

    let columns = parse_table_columns(
        map.get("columns")
            .ok_or_else(|| QmapError::shape("MATCH needs columns"))?,
        "MATCH columns",
    )?;
    if columns.iter().all(|(_, cols)| cols.is_empty()) {
        return Err(QmapError::shape("MATCH needs at least one column"));
    }

    let search = map
        .get("search")
        .and_then(Json::as_str)
        .ok_or_else(|| QmapError::shape("MATCH search must be a string"))?
        .to_string();

    let option = match map.get("option") {
        None | Some(Json::Null) => String::new(),
        Some(Json::String(s)) => s.trim().to_string(),
        Some(_) => return Err(QmapError::shape("MATCH option must be a string")),
    };

    Ok(ConditionNode::Match {
        columns,
        search,
        option,
    })
}

/// Each table maps to exactly `[column, operator, value]`.
fn parse_having(value: &Json) -> QmapResult<ConditionNode> {
    let Json::Object(map) = value else {
        return Err(QmapError::shape("HAVING must map table names to [column, operator, value]"));
    };

    let mut conditions = Vec::with_capacity(map.len());
    for (table, spec) in map {
        let parts = match spec {
            Json::Array(parts) if parts.len() == 3 => parts,
            _ => return Err(QmapError::MalformedHavingClause(format!("{}: {}", table, spec))),
        };

        let (Some(column_token), Some(op_token)) = (parts[0].as_str(), parts[1].as_str()) else {
            return Err(QmapError::MalformedHavingClause(format!(
                "{}: column and operator must be strings",
                table
            )));
        };

        let column = parse_column_spec(table, column_token)?;
        let bare = op_token
            .trim()
            .strip_prefix('[')
            .and_then(|t| t.strip_suffix(']'))
            .unwrap_or(op_token);
        let operator =
            Operator::from_token(bare).ok_or_else(|| QmapError::unmapped("operator", op_token))?;

        let subject = format!("{}.{}", table, column.column);
        let values = operator_values(operator, &parts[2], &subject)?;

        conditions.push(HavingCondition {
            table: table.clone(),
            column,
            operator,
            values,
        });
    }

    Ok(ConditionNode::Having { conditions })
}

fn parse_order(value: &Json) -> QmapResult<ConditionNode> {
    let Json::Object(map) = value else {
        return Err(QmapError::shape("ORDER must map table names to column lists"));
    };

    let mut terms = Vec::new();
    for (table, columns) in map {
        for token in string_list(columns, "ORDER", table)? {
            let (column, dir_token) = parse_keyed_token(token)?;
            let direction = match dir_token {
                Some(d) => Some(SortOrder::from_token(d).ok_or_else(|| QmapError::unmapped("direction", d))?),
                None => None,
            };
            terms.push(OrderTerm {
                table: table.clone(),
                column: column.to_string(),
                direction,
            });
        }
    }

    Ok(ConditionNode::OrderBy { terms })
}

fn parse_limit(value: &Json) -> QmapResult<ConditionNode> {
    let invalid = || {
        QmapError::shape(format!(
            "LIMIT must be an integer in 0..={} or [count, offset]",
            i64::MAX
        ))
    };
    // Counts are bound as signed integers.
    let count = |v: &Json| {
        v.as_u64()
            .filter(|n| i64::try_from(*n).is_ok())
            .ok_or_else(invalid)
    };

    match value {
        Json::Number(_) => Ok(ConditionNode::Limit {
            count: count(value)?,
            offset: None,
        }),
        Json::Array(items) if items.len() == 2 => Ok(ConditionNode::Limit {
            count: count(&items[0])?,
            offset: Some(count(&items[1])?),
        }),
        _ => Err(invalid()),
    }
}
