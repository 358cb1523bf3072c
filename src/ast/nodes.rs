use serde::{Deserialize, Serialize};

use crate::ast::{Aggregate, Conjunction, JoinKind, Operator, SortOrder, Value};

/// A projected column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub table: String,
    pub column: String,
    #[serde(default)]
    pub aggregate: Option<Aggregate>,
    #[serde(default)]
    pub alias: Option<String>,
}

impl ColumnSpec {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
            aggregate: None,
            alias: None,
        }
    }
}

/// One `column OP value(s)` condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leaf {
    pub table: String,
    pub column: String,
    pub operator: Operator,
    /// Exactly as many values as the operator's arity asks for.
    pub values: Vec<Value>,
}

/// A HAVING condition, always built from a `[column, operator, value]` triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HavingCondition {
    pub table: String,
    /// May carry an aggregate wrapper (`amount[sum]`).
    pub column: ColumnSpec,
    pub operator: Operator,
    pub values: Vec<Value>,
}

/// A single ORDER BY term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderTerm {
    pub table: String,
    pub column: String,
    #[serde(default)]
    pub direction: Option<SortOrder>,
}

/// Columns grouped by owning table, in input order.
pub type TableColumns = Vec<(String, Vec<String>)>;

/// A node of the WHERE description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConditionNode {
    Conjunction {
        kind: Conjunction,
        children: Vec<ConditionNode>,
    },
    Leaf(Leaf),
    Match {
        columns: TableColumns,
        search: String,
        option: String,
    },
    GroupBy {
        columns: TableColumns,
    },
    Having {
        conditions: Vec<HavingCondition>,
    },
    OrderBy {
        terms: Vec<OrderTerm>,
    },
    Limit {
        count: u64,
        offset: Option<u64>,
    },
}

/// A parsed WHERE description: top-level nodes in DSL order.
///
/// Each top-level kind appears at most once. Rendering order does not
/// depend on the order stored here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub nodes: Vec<ConditionNode>,
}

impl Filter {
    /// The boolean condition tree, if any.
    pub fn condition(&self) -> Option<&ConditionNode> {
        self.nodes
            .iter()
            .find(|n| matches!(n, ConditionNode::Conjunction { .. }))
    }

    pub fn full_text(&self) -> Option<&ConditionNode> {
        self.nodes.iter().find(|n| matches!(n, ConditionNode::Match { .. }))
    }

    pub fn group_by(&self) -> Option<&TableColumns> {
        self.nodes.iter().find_map(|n| match n {
            ConditionNode::GroupBy { columns } => Some(columns),
            _ => None,
        })
    }

    pub fn having(&self) -> Option<&[HavingCondition]> {
        self.nodes.iter().find_map(|n| match n {
            ConditionNode::Having { conditions } => Some(conditions.as_slice()),
            _ => None,
        })
    }

    pub fn order_by(&self) -> Option<&[OrderTerm]> {
        self.nodes.iter().find_map(|n| match n {
            ConditionNode::OrderBy { terms } => Some(terms.as_slice()),
            _ => None,
        })
    }

    /// `(count, offset)` of the LIMIT node.
    pub fn limit(&self) -> Option<(u64, Option<u64>)> {
        self.nodes.iter().find_map(|n| match n {
            ConditionNode::Limit { count, offset } => Some((*count, *offset)),
            _ => None,
        })
    }
}

/// A join definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinSpec {
    pub kind: JoinKind,
    pub target_table: String,
    pub local_column: String,
    pub foreign_column: String,
}

/// One `column = value` pair of an UPDATE or of an INSERT row.
pub type Assignment = (String, Value);
