//! SQL transpiler for the query DSL.
//!
//! Converts parsed DSL structures into parameterized SQL text. Output is a
//! pure function of the input and the dialect capabilities: parameter names
//! come from a per-statement counter, so compiling the same request twice
//! yields byte-identical text.

pub mod columns;
pub mod conditions;
pub mod dml;
pub mod identifier;
pub mod joins;

#[cfg(test)]
mod tests;

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value as Json;

use crate::ast::Value;
use crate::dialect::{Capabilities, Dialect};
use crate::error::{QmapError, QmapResult};
use crate::parser;
use crate::request::Request;

/// Ordered `name -> value` parameter mapping.
///
/// Names are stored without the leading `:`; lookups accept either form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    entries: Vec<(String, Value)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `value` under `name`, replacing an earlier binding of the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let name = name.strip_prefix(':').map(str::to_string).unwrap_or(name);
        let value = value.into();

        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        let name = name.strip_prefix(':').unwrap_or(name);
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build from a JSON object of scalar values (raw statements).
    pub fn from_json(json: &Json) -> QmapResult<Self> {
        match json {
            Json::Null => Ok(Self::new()),
            Json::Object(map) => {
                let mut params = Self::new();
                for (name, value) in map {
                    params.insert(name.as_str(), Value::from_json(value)?);
                }
                Ok(params)
            }
            _ => Err(QmapError::shape("params must be a mapping of name to value")),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (name, value) in iter {
            params.insert(name, value);
        }
        params
    }
}

impl Serialize for Params {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Context for parameterized statement building.
#[derive(Debug, Default)]
pub struct ParamContext {
    /// Last counter-derived parameter index (`p1`, `p2`, ...).
    pub index: usize,
    /// Bound values in binding order.
    pub params: Params,
}

impl ParamContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a value under the next counter name and return its placeholder.
    pub fn bind(&mut self, value: Value) -> String {
        self.index += 1;
        let name = format!("p{}", self.index);
        let placeholder = format!(":{}", name);
        self.params.insert(name, value);
        placeholder
    }

    /// Bind a value under a fixed name (`limit`, `offset`).
    pub fn bind_named(&mut self, name: &str, value: Value) -> String {
        self.params.insert(name, value);
        format!(":{}", name)
    }

    pub fn into_params(self) -> Params {
        self.params
    }
}

/// SQL text plus its bound parameters.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct CompiledQuery {
    text: String,
    params: Params,
}

impl CompiledQuery {
    pub fn new(text: impl Into<String>, params: Params) -> Self {
        Self {
            text: text.into(),
            params,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn params(&self) -> &Params {
        &self.params
    }
}

impl std::fmt::Display for CompiledQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

/// One INSERT template executed once per row.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct InsertBatch {
    text: String,
    rows: Vec<Params>,
}

impl InsertBatch {
    pub fn new(text: impl Into<String>, rows: Vec<Params>) -> Self {
        Self {
            text: text.into(),
            rows,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn rows(&self) -> &[Params] {
        &self.rows
    }
}

/// Output of compiling a [`Request`].
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum Statement {
    /// A single statement with one parameter set.
    Query(CompiledQuery),
    /// An INSERT template with one parameter set per row.
    Batch(InsertBatch),
}

/// Compiles DSL structures for one dialect and table prefix.
#[derive(Debug, Clone)]
pub struct Compiler {
    caps: &'static Capabilities,
    prefix: String,
}

impl Compiler {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            caps: dialect.capabilities(),
            prefix: String::new(),
        }
    }

    /// Prepend `prefix` to every table name.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn capabilities(&self) -> &'static Capabilities {
        self.caps
    }

    pub fn dialect(&self) -> Dialect {
        self.caps.dialect
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Compile a SELECT. `columns` and `join` map table names to lists,
    /// `filter` is the WHERE description; each may be null.
    pub fn select(
        &self,
        table: &str,
        columns: &Json,
        filter: &Json,
        join: &Json,
    ) -> QmapResult<CompiledQuery> {
        let columns = parser::parse_columns(columns)?;
        let filter = parser::parse_filter(filter)?;
        let joins = parser::parse_joins(join)?;
        Ok(dml::select::build_select(self, table, &columns, &filter, &joins))
    }

    /// Compile an INSERT of one row (an object) or several (an array of objects).
    pub fn insert(&self, table: &str, rows: &Json) -> QmapResult<InsertBatch> {
        let rows = parser::parse_rows(rows)?;
        Ok(dml::insert::build_insert(self, table, &rows))
    }

    pub fn update(&self, table: &str, set: &Json, filter: &Json) -> QmapResult<CompiledQuery> {
        let assignments = parser::parse_assignments(set)?;
        let filter = parser::parse_filter(filter)?;
        Ok(dml::update::build_update(self, table, &assignments, &filter))
    }

    pub fn delete(&self, table: &str, filter: &Json) -> QmapResult<CompiledQuery> {
        let filter = parser::parse_filter(filter)?;
        Ok(dml::delete::build_delete(self, table, &filter))
    }

    /// Compile a serialized request. Raw statements pass through untouched.
    pub fn compile(&self, request: &Request) -> QmapResult<Statement> {
        match request {
            Request::Select {
                table,
                columns,
                filter,
                join,
            } => self.select(table, columns, filter, join).map(Statement::Query),
            Request::Insert { table, rows } => self.insert(table, rows).map(Statement::Batch),
            Request::Update { table, set, filter } => {
                self.update(table, set, filter).map(Statement::Query)
            }
            Request::Delete { table, filter } => self.delete(table, filter).map(Statement::Query),
            Request::Raw { sql, params } => Ok(Statement::Query(CompiledQuery::new(
                sql.as_str(),
                Params::from_json(params)?,
            ))),
        }
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new(Dialect::default())
    }
}
