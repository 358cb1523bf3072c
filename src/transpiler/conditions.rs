//! WHERE tree and trailing clause rendering.
//!
//! A [`Filter`] renders into three pieces that the statement builders place
//! themselves:
//!
//! ```text
//! condition   ( t.age > :p1 ) AND ( t.name LIKE :p2 ) AND MATCH(...) AGAINST(...)
//! trailing    GROUP BY ... HAVING ... ORDER BY ... LIMIT :limit OFFSET :offset
//! top         :limit          (prefix pagination dialects only)
//! ```
//!
//! Trailing clauses always come out in that order, whatever order the DSL
//! listed them in.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

use crate::ast::*;
use crate::dialect::Capabilities;

use super::columns::column_expr;
use super::identifier::qualify;
use super::ParamContext;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d %B %Y", "%B %d, %Y"];
const TIME_FORMATS: &[&str] = &["%H:%M:%S", "%H:%M"];

/// A rendered filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedFilter {
    /// Boolean expression, MATCH included. Empty when there is nothing to test.
    pub condition: String,
    /// GROUP BY / HAVING / ORDER BY / LIMIT, space-separated.
    pub trailing: String,
    /// Placeholder for `TOP (...)` on dialects without trailing LIMIT.
    pub top: Option<String>,
}

impl RenderedFilter {
    /// Append `WHERE condition` and the trailing clauses to statement parts.
    pub fn push_clauses(&self, parts: &mut Vec<String>) {
        if !self.condition.is_empty() {
            parts.push(format!("WHERE {}", self.condition));
        }
        if !self.trailing.is_empty() {
            parts.push(self.trailing.clone());
        }
    }

    /// `TOP (:limit)` when the dialect paginates with a prefix.
    pub fn top_clause(&self) -> Option<String> {
        self.top.as_ref().map(|placeholder| format!("TOP ({})", placeholder))
    }
}

/// Render a parsed filter, binding values into `ctx` in text order.
pub fn render_filter(
    filter: &Filter,
    caps: &Capabilities,
    prefix: &str,
    ctx: &mut ParamContext,
) -> RenderedFilter {
    let mut condition = Vec::new();

    if let Some(ConditionNode::Conjunction { kind, children }) = filter.condition() {
        if let Some((expr, _)) = render_group(*kind, children, caps, prefix, ctx) {
            condition.push(expr);
        }
    }

    if let Some(ConditionNode::Match {
        columns,
        search,
        option,
    }) = filter.full_text()
    {
        condition.push(render_match(columns, search, option, prefix, ctx));
    }

    let mut trailing = Vec::new();

    if let Some(columns) = filter.group_by() {
        let list = qualified_list(prefix, columns);
        if !list.is_empty() {
            trailing.push(format!("GROUP BY {}", list));
        }
    }

    if let Some(conditions) = filter.having() {
        let rendered: Vec<String> = conditions
            .iter()
            .map(|having| {
                let subject = column_expr(prefix, &having.column);
                render_comparison(&subject, having.operator, &having.values, caps, ctx)
            })
            .collect();
        if !rendered.is_empty() {
            trailing.push(format!("HAVING {}", rendered.join(" AND ")));
        }
    }

    if let Some(terms) = filter.order_by() {
        let rendered: Vec<String> = terms
            .iter()
            .map(|term| {
                let column = qualify(prefix, &term.table, Some(&term.column));
                match term.direction {
                    Some(direction) => format!("{} {}", column, direction.keyword()),
                    None => column,
                }
            })
            .collect();
        if !rendered.is_empty() {
            trailing.push(format!("ORDER BY {}", rendered.join(", ")));
        }
    }

    let mut top = None;
    if let Some((count, offset)) = filter.limit() {
        let limit = ctx.bind_named("limit", count_value(count));
        if caps.supports_limit_offset {
            match offset {
                Some(offset) => {
                    let offset = ctx.bind_named("offset", count_value(offset));
                    trailing.push(format!("LIMIT {} OFFSET {}", limit, offset));
                }
                None => trailing.push(format!("LIMIT {}", limit)),
            }
        } else if caps.supports_top {
            top = Some(limit);
        }
    }

    RenderedFilter {
        condition: condition.join(" AND "),
        trailing: trailing.join(" "),
        top,
    }
}

/// Join a group's fragments with its keyword. Nested groups are
/// parenthesized once; `None` when nothing inside renders.
///
/// The flag is set when the result is already a single parenthesized group.
fn render_group(
    kind: Conjunction,
    children: &[ConditionNode],
    caps: &Capabilities,
    prefix: &str,
    ctx: &mut ParamContext,
) -> Option<(String, bool)> {
    let mut fragments = Vec::with_capacity(children.len());
    let mut last_was_group = false;

    for child in children {
        match child {
            ConditionNode::Conjunction {
                kind: inner,
                children,
            } => {
                if let Some((expr, wrapped)) = render_group(*inner, children, caps, prefix, ctx) {
                    fragments.push(if wrapped { expr } else { format!("( {} )", expr) });
                    last_was_group = true;
                }
            }
            ConditionNode::Leaf(leaf) => {
                let subject = qualify(prefix, &leaf.table, Some(&leaf.column));
                fragments.push(render_comparison(
                    &subject,
                    leaf.operator,
                    &leaf.values,
                    caps,
                    ctx,
                ));
                last_was_group = false;
            }
            _ => {}
        }
    }

    match fragments.len() {
        0 => None,
        1 => fragments.pop().map(|expr| (expr, last_was_group)),
        _ => Some((fragments.join(&format!(" {} ", kind.keyword())), false)),
    }
}

/// Render `subject OP placeholder(s)`. The number of placeholders always
/// follows the operator's arity.
fn render_comparison(
    subject: &str,
    operator: Operator,
    values: &[Value],
    caps: &Capabilities,
    ctx: &mut ParamContext,
) -> String {
    match operator.arity() {
        Arity::Unary => format!("{} {}", subject, operator.keyword()),
        Arity::Binary => {
            let value = values.first().cloned().unwrap_or(Value::Null);
            let cast = !caps.supports_native_date_cast && is_temporal(&value);
            let placeholder = ctx.bind(value);
            if cast {
                format!("{} {} Convert(datetime, {})", subject, operator.keyword(), placeholder)
            } else {
                format!("{} {} {}", subject, operator.keyword(), placeholder)
            }
        }
        Arity::Ternary => {
            let low = ctx.bind(values.first().cloned().unwrap_or(Value::Null));
            let high = ctx.bind(values.get(1).cloned().unwrap_or(Value::Null));
            format!("{} {} {} AND {}", subject, operator.keyword(), low, high)
        }
        Arity::List => {
            let placeholders: Vec<String> = values.iter().map(|v| ctx.bind(v.clone())).collect();
            format!("{} {} ({})", subject, operator.keyword(), placeholders.join(", "))
        }
    }
}

fn render_match(
    columns: &TableColumns,
    search: &str,
    option: &str,
    prefix: &str,
    ctx: &mut ParamContext,
) -> String {
    let placeholder = ctx.bind(Value::from(search));
    let against = if option.is_empty() {
        placeholder
    } else {
        format!("{} {}", placeholder, option)
    };
    format!("MATCH({}) AGAINST({})", qualified_list(prefix, columns), against)
}

fn qualified_list(prefix: &str, columns: &TableColumns) -> String {
    columns
        .iter()
        .flat_map(|(table, cols)| cols.iter().map(move |c| qualify(prefix, table, Some(c))))
        .collect::<Vec<_>>()
        .join(", ")
}

fn count_value(count: u64) -> Value {
    Value::Int(i64::try_from(count).unwrap_or(i64::MAX))
}

/// Whether a value is a string the server would have to cast to a date/time.
pub fn is_temporal(value: &Value) -> bool {
    let Some(s) = value.as_str() else {
        return false;
    };
    let s = s.trim();
    if s.is_empty() {
        return false;
    }

    DateTime::parse_from_rfc3339(s).is_ok()
        || DATETIME_FORMATS
            .iter()
            .any(|f| NaiveDateTime::parse_from_str(s, f).is_ok())
        || DATE_FORMATS.iter().any(|f| NaiveDate::parse_from_str(s, f).is_ok())
        || TIME_FORMATS.iter().any(|f| NaiveTime::parse_from_str(s, f).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Dialect;
    use crate::parser::parse_filter;
    use serde_json::json;

    fn render(dialect: Dialect, filter: serde_json::Value) -> (RenderedFilter, ParamContext) {
        let filter = parse_filter(&filter).unwrap();
        let mut ctx = ParamContext::new();
        let rendered = render_filter(&filter, dialect.capabilities(), "", &mut ctx);
        (rendered, ctx)
    }

    #[test]
    fn test_single_table_group() {
        let (rendered, ctx) = render(Dialect::MySql, json!({"AND": {"t": {"age[>]": 18}}}));
        assert_eq!(rendered.condition, "( t.age > :p1 )");
        assert_eq!(rendered.trailing, "");
        assert_eq!(ctx.params.get("p1"), Some(&Value::Int(18)));
    }

    #[test]
    fn test_table_groups_join_with_outer_keyword() {
        let (rendered, _) = render(
            Dialect::MySql,
            json!({"OR": {"t": {"a": 1, "b[!=]": 2}, "u": {"c[null]": true}}}),
        );
        assert_eq!(rendered.condition, "( t.a = :p1 OR t.b != :p2 ) OR ( u.c IS NULL )");
    }

    #[test]
    fn test_single_joins_with_and() {
        let (rendered, ctx) = render(Dialect::MySql, json!({"SINGLE": {"t": {"a": 1}}}));
        assert_eq!(rendered.condition, "( t.a = :p1 )");
        assert_eq!(ctx.params.get("p1"), Some(&Value::Int(1)));

        let (rendered, ctx) = render(
            Dialect::MySql,
            json!({"SINGLE": {"t": {"a": 1, "b[<=]": 5}, "u": {"c[in]": ["x", "y"]}}}),
        );
        assert_eq!(
            rendered.condition,
            "( t.a = :p1 AND t.b <= :p2 ) AND ( u.c IN (:p3, :p4) )"
        );
        assert_eq!(ctx.params.len(), 4);
    }

    #[test]
    fn test_is_and_not_like_operators() {
        let (rendered, ctx) = render(
            Dialect::Postgres,
            json!({"AND": {"t": {"flag[is]": true, "deleted[!is]": null, "name[!~]": "tmp%"}}}),
        );
        assert_eq!(
            rendered.condition,
            "( t.flag IS :p1 AND t.deleted IS NOT :p2 AND t.name NOT LIKE :p3 )"
        );
        let values: Vec<_> = ctx.params.iter().map(|(_, v)| v.clone()).collect();
        assert_eq!(values, vec![Value::Bool(true), Value::Null, Value::from("tmp%")]);
    }

    #[test]
    fn test_nested_groups() {
        let (rendered, ctx) = render(
            Dialect::Postgres,
            json!({"AND": {
                "OR #age": {"t": {"age[<]": 18, "age[>]": 65}},
                "OR #name": {"t": {"name[~]": "a%"}}
            }}),
        );
        assert_eq!(
            rendered.condition,
            "( t.age < :p1 OR t.age > :p2 ) AND ( t.name LIKE :p3 )"
        );
        assert_eq!(ctx.params.len(), 3);
    }

    #[test]
    fn test_empty_groups_render_nothing() {
        let (rendered, ctx) = render(Dialect::MySql, json!({"AND": {"t": {}, "OR": {}}}));
        assert_eq!(rendered.condition, "");
        assert!(ctx.params.is_empty());
    }

    #[test]
    fn test_list_and_between_placeholders() {
        let (rendered, ctx) = render(
            Dialect::MySql,
            json!({"AND": {"t": {"id[in]": [3, 1, 2], "age[!<>]": [10, 20]}}}),
        );
        assert_eq!(
            rendered.condition,
            "( t.id IN (:p1, :p2, :p3) AND t.age NOT BETWEEN :p4 AND :p5 )"
        );
        let values: Vec<_> = ctx.params.iter().map(|(_, v)| v.clone()).collect();
        let expected: Vec<Value> = [3, 1, 2, 10, 20].into_iter().map(Value::Int).collect();
        assert_eq!(values, expected);
    }

    #[test]
    fn test_unary_binds_nothing() {
        let (rendered, ctx) = render(Dialect::MySql, json!({"AND": {"t": {"deleted[!null]": null}}}));
        assert_eq!(rendered.condition, "( t.deleted IS NOT NULL )");
        assert!(ctx.params.is_empty());
    }

    #[test]
    fn test_date_cast_only_without_native_support() {
        let filter = json!({"AND": {"t": {"created[>=]": "2024-01-31", "name": "bob"}}});

        let (rendered, _) = render(Dialect::SqlServer, filter.clone());
        assert_eq!(
            rendered.condition,
            "( t.created >= Convert(datetime, :p1) AND t.name = :p2 )"
        );

        let (rendered, _) = render(Dialect::MySql, filter);
        assert_eq!(rendered.condition, "( t.created >= :p1 AND t.name = :p2 )");
    }

    #[test]
    fn test_is_temporal() {
        assert!(is_temporal(&Value::from("2024-01-31")));
        assert!(is_temporal(&Value::from("2024-01-31 10:15:00")));
        assert!(is_temporal(&Value::from("2024-01-31T10:15:00+02:00")));
        assert!(is_temporal(&Value::from("10:15:00")));
        assert!(!is_temporal(&Value::from("bob")));
        assert!(!is_temporal(&Value::from("2024")));
        assert!(!is_temporal(&Value::Int(20240131)));
    }

    #[test]
    fn test_trailing_clause_order_is_fixed() {
        let (rendered, ctx) = render(
            Dialect::MySql,
            json!({
                "LIMIT": [10, 5],
                "ORDER": {"t": ["created[DESC]"]},
                "HAVING": {"t": ["amount[sum]", "[>]", 100]},
                "GROUP": {"t": ["owner"]},
                "AND": {"t": {"active": true}}
            }),
        );
        assert_eq!(rendered.condition, "( t.active = :p1 )");
        assert_eq!(
            rendered.trailing,
            "GROUP BY t.owner HAVING SUM(t.amount) > :p2 ORDER BY t.created DESC LIMIT :limit OFFSET :offset"
        );
        assert_eq!(ctx.params.get("limit"), Some(&Value::Int(10)));
        assert_eq!(ctx.params.get("offset"), Some(&Value::Int(5)));
        assert_eq!(rendered.top, None);
    }

    #[test]
    fn test_match_is_a_predicate() {
        let (rendered, ctx) = render(
            Dialect::MySql,
            json!({"MATCH": {"columns": {"t": ["title", "body"]}, "search": "rust", "option": "IN BOOLEAN MODE"}}),
        );
        assert_eq!(
            rendered.condition,
            "MATCH(t.title, t.body) AGAINST(:p1 IN BOOLEAN MODE)"
        );
        assert_eq!(ctx.params.get(":p1"), Some(&Value::from("rust")));

        let (rendered, _) = render(
            Dialect::MySql,
            json!({"AND": {"t": {"id[>]": 1}}, "MATCH": {"columns": {"t": ["title"]}, "search": "x"}}),
        );
        assert_eq!(rendered.condition, "( t.id > :p1 ) AND MATCH(t.title) AGAINST(:p2)");
    }

    #[test]
    fn test_multiple_having_and_order_tables() {
        let (rendered, _) = render(
            Dialect::Postgres,
            json!({
                "HAVING": {"t": ["id[count]", "[>=]", 2], "u": ["score[max]", "[<]", 9]},
                "ORDER": {"t": ["a"], "u": ["b[ASC]"]}
            }),
        );
        assert_eq!(
            rendered.trailing,
            "HAVING COUNT(t.id) >= :p1 AND MAX(u.score) < :p2 ORDER BY t.a, u.b ASC"
        );
    }

    #[test]
    fn test_top_dialect_drops_offset() {
        let (rendered, ctx) = render(Dialect::SqlServer, json!({"LIMIT": [10, 5]}));
        assert_eq!(rendered.trailing, "");
        assert_eq!(rendered.top.as_deref(), Some(":limit"));
        assert_eq!(rendered.top_clause().as_deref(), Some("TOP (:limit)"));
        assert_eq!(ctx.params.get("limit"), Some(&Value::Int(10)));
        assert_eq!(ctx.params.get("offset"), None);
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let filter = json!({"OR": {"t": {"a[in]": [1, 2]}, "AND #x": {"u": {"b[<>]": [1, 9]}}}});
        assert_eq!(render(Dialect::MySql, filter.clone()).0, render(Dialect::MySql, filter).0);
    }
}
