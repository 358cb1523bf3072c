use serde::{Deserialize, Serialize};

/// How many values an operator consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Arity {
    /// IS NULL style, no value
    Unary,
    /// One value
    Binary,
    /// BETWEEN style, two values
    Ternary,
    /// IN style, one or more values
    List,
}

impl Arity {
    /// Exact number of bound values, `None` for lists.
    pub fn expected_values(&self) -> Option<usize> {
        match self {
            Arity::Unary => Some(0),
            Arity::Binary => Some(1),
            Arity::Ternary => Some(2),
            Arity::List => None,
        }
    }
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    /// `[>]`
    Gt,
    /// `[>=]`
    Gte,
    /// `[<]`
    Lt,
    /// `[<=]`
    Lte,
    /// `[=]`
    Eq,
    /// `[!=]`
    Ne,
    /// `[~]` LIKE
    Like,
    /// `[!~]` NOT LIKE
    NotLike,
    /// `[null]`
    IsNull,
    /// `[!null]`
    IsNotNull,
    /// `[is]`
    Is,
    /// `[!is]`
    IsNot,
    /// `[<>]` BETWEEN
    Between,
    /// `[!<>]` NOT BETWEEN
    NotBetween,
    /// `[in]`
    In,
    /// `[!in]`
    NotIn,
}

impl Operator {
    pub const ALL: [Operator; 16] = [
        Operator::Gt,
        Operator::Gte,
        Operator::Lt,
        Operator::Lte,
        Operator::Eq,
        Operator::Ne,
        Operator::Like,
        Operator::NotLike,
        Operator::IsNull,
        Operator::IsNotNull,
        Operator::Is,
        Operator::IsNot,
        Operator::Between,
        Operator::NotBetween,
        Operator::In,
        Operator::NotIn,
    ];

    /// Resolve the text between the brackets of a condition key.
    pub fn from_token(token: &str) -> Option<Self> {
        let op = match token.trim().to_ascii_lowercase().as_str() {
            ">" => Operator::Gt,
            ">=" => Operator::Gte,
            "<" => Operator::Lt,
            "<=" => Operator::Lte,
            "=" => Operator::Eq,
            "!=" => Operator::Ne,
            "~" => Operator::Like,
            "!~" => Operator::NotLike,
            "null" => Operator::IsNull,
            "!null" => Operator::IsNotNull,
            "is" => Operator::Is,
            "!is" => Operator::IsNot,
            "<>" => Operator::Between,
            "!<>" => Operator::NotBetween,
            "in" => Operator::In,
            "!in" => Operator::NotIn,
            _ => return None,
        };
        Some(op)
    }

    pub fn token(&self) -> &'static str {
        match self {
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Like => "~",
            Operator::NotLike => "!~",
            Operator::IsNull => "null",
            Operator::IsNotNull => "!null",
            Operator::Is => "is",
            Operator::IsNot => "!is",
            Operator::Between => "<>",
            Operator::NotBetween => "!<>",
            Operator::In => "in",
            Operator::NotIn => "!in",
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Like => "LIKE",
            Operator::NotLike => "NOT LIKE",
            Operator::IsNull => "IS NULL",
            Operator::IsNotNull => "IS NOT NULL",
            Operator::Is => "IS",
            Operator::IsNot => "IS NOT",
            Operator::Between => "BETWEEN",
            Operator::NotBetween => "NOT BETWEEN",
            Operator::In => "IN",
            Operator::NotIn => "NOT IN",
        }
    }

    pub fn arity(&self) -> Arity {
        match self {
            Operator::IsNull | Operator::IsNotNull => Arity::Unary,
            Operator::Between | Operator::NotBetween => Arity::Ternary,
            Operator::In | Operator::NotIn => Arity::List,
            _ => Arity::Binary,
        }
    }
}

/// Aggregate function wrappers for projected columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Aggregate {
    Count,
    Sum,
    Avg,
    Min,
    Max,
    /// `[group]`
    GroupConcat,
}

impl Aggregate {
    pub fn from_token(token: &str) -> Option<Self> {
        let agg = match token.trim().to_ascii_lowercase().as_str() {
            "count" => Aggregate::Count,
            "sum" => Aggregate::Sum,
            "avg" => Aggregate::Avg,
            "min" => Aggregate::Min,
            "max" => Aggregate::Max,
            "group" => Aggregate::GroupConcat,
            _ => return None,
        };
        Some(agg)
    }

    pub fn function(&self) -> &'static str {
        match self {
            Aggregate::Count => "COUNT",
            Aggregate::Sum => "SUM",
            Aggregate::Avg => "AVG",
            Aggregate::Min => "MIN",
            Aggregate::Max => "MAX",
            Aggregate::GroupConcat => "GROUP_CONCAT",
        }
    }
}

/// Join kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JoinKind {
    /// `[>]`
    Left,
    /// `[<]`
    Right,
    /// `[<>]`
    FullOuter,
    /// `[><]`
    Inner,
}

impl JoinKind {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim() {
            ">" => Some(JoinKind::Left),
            "<" => Some(JoinKind::Right),
            "<>" => Some(JoinKind::FullOuter),
            "><" => Some(JoinKind::Inner),
            _ => None,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            JoinKind::Left => "LEFT",
            JoinKind::Right => "RIGHT",
            JoinKind::FullOuter => "FULL OUTER",
            JoinKind::Inner => "INNER",
        }
    }
}

/// Sort order direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_uppercase().as_str() {
            "ASC" => Some(SortOrder::Asc),
            "DESC" => Some(SortOrder::Desc),
            _ => None,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Boolean grouping of condition children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Conjunction {
    #[default]
    And,
    Or,
    /// Non-combining pass-through group. Renders with AND if it ever holds
    /// more than one fragment.
    Single,
}

impl Conjunction {
    /// Resolve a DSL key. Nested group keys may carry a label after
    /// whitespace (`"OR #age"`) so that several can share one object.
    pub fn from_key(key: &str) -> Option<Self> {
        let head = key.split_whitespace().next().unwrap_or("");
        match head {
            "AND" => Some(Conjunction::And),
            "OR" => Some(Conjunction::Or),
            "SINGLE" => Some(Conjunction::Single),
            _ => None,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Conjunction::And | Conjunction::Single => "AND",
            Conjunction::Or => "OR",
        }
    }
}
