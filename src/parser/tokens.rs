//! Tokenizer for the bracket/brace mini-grammar used inside DSL keys.
//!
//! ```text
//! amount[sum]{total}     column token   name, [aggregate], {alias}
//! age[>=]                condition key  name, [operator]
//! created[DESC]          order term     name, [direction]
//! [>]orders              join key       [kind], table
//! ```

use nom::{
    bytes::complete::{take_until, take_while1},
    character::complete::char,
    combinator::{all_consuming, opt},
    sequence::{delimited, pair},
    IResult,
};

use crate::error::{QmapError, QmapResult};

/// A column token split into its parts. Bracket and alias contents are raw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnToken<'a> {
    pub name: &'a str,
    pub bracket: Option<&'a str>,
    pub alias: Option<&'a str>,
}

fn name(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !matches!(c, '[' | ']' | '{' | '}'))(input)
}

fn bracket(input: &str) -> IResult<&str, &str> {
    delimited(char('['), take_until("]"), char(']'))(input)
}

fn brace(input: &str) -> IResult<&str, &str> {
    delimited(char('{'), take_until("}"), char('}'))(input)
}

fn column_token(input: &str) -> IResult<&str, ColumnToken<'_>> {
    let (input, name) = name(input)?;
    let (input, bracket) = opt(bracket)(input)?;
    let (input, alias) = opt(brace)(input)?;
    Ok((
        input,
        ColumnToken {
            name: name.trim(),
            bracket: bracket.map(str::trim),
            alias: alias.map(str::trim),
        },
    ))
}

fn keyed_token(input: &str) -> IResult<&str, (&str, Option<&str>)> {
    let (input, (name, bracket)) = pair(name, opt(bracket))(input)?;
    Ok((input, (name.trim(), bracket.map(str::trim))))
}

fn join_key(input: &str) -> IResult<&str, (&str, &str)> {
    let (input, (kind, table)) = pair(bracket, name)(input)?;
    Ok((input, (kind.trim(), table.trim())))
}

/// Split `name`, `name[fn]`, `name{alias}` or `name[fn]{alias}`.
pub fn parse_column_token(input: &str) -> QmapResult<ColumnToken<'_>> {
    let token = all_consuming(column_token)(input.trim())
        .map(|(_, token)| token)
        .map_err(|_| QmapError::parse(input, "expected name, name[function], name{alias} or name[function]{alias}"))?;

    if token.name.is_empty() {
        return Err(QmapError::parse(input, "missing column name"));
    }
    if token.alias == Some("") {
        return Err(QmapError::parse(input, "empty alias"));
    }
    Ok(token)
}

/// Split `name` or `name[token]`, as used by condition keys and order terms.
pub fn parse_keyed_token(input: &str) -> QmapResult<(&str, Option<&str>)> {
    let (name, bracket) = all_consuming(keyed_token)(input.trim())
        .map(|(_, parts)| parts)
        .map_err(|_| QmapError::parse(input, "expected name or name[token]"))?;

    if name.is_empty() {
        return Err(QmapError::parse(input, "missing column name"));
    }
    Ok((name, bracket))
}

/// Split `[kind]table`.
pub fn parse_join_key(input: &str) -> QmapResult<(&str, &str)> {
    let (kind, table) = all_consuming(join_key)(input.trim())
        .map(|(_, parts)| parts)
        .map_err(|_| QmapError::parse(input, "expected [kind]table"))?;

    if table.is_empty() {
        return Err(QmapError::parse(input, "missing join table"));
    }
    Ok((kind, table))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_token_forms() {
        assert_eq!(
            parse_column_token("name").unwrap(),
            ColumnToken { name: "name", bracket: None, alias: None }
        );
        assert_eq!(
            parse_column_token("amount[sum]{total}").unwrap(),
            ColumnToken { name: "amount", bracket: Some("sum"), alias: Some("total") }
        );
        assert_eq!(
            parse_column_token("string_column{string_column_two}").unwrap(),
            ColumnToken { name: "string_column", bracket: None, alias: Some("string_column_two") }
        );
        assert_eq!(parse_column_token("*").unwrap().name, "*");
    }

    #[test]
    fn test_column_token_rejects_garbage() {
        assert!(parse_column_token("amount[sum").is_err());
        assert!(parse_column_token("amount{total}[sum]").is_err());
        assert!(parse_column_token("[sum]").is_err());
        assert!(parse_column_token("amount{}").is_err());
    }

    #[test]
    fn test_keyed_token() {
        assert_eq!(parse_keyed_token("age[>=]").unwrap(), ("age", Some(">=")));
        assert_eq!(parse_keyed_token("created_at[DESC]").unwrap(), ("created_at", Some("DESC")));
        assert_eq!(parse_keyed_token("status").unwrap(), ("status", None));
        assert_eq!(parse_keyed_token("id[!<>]").unwrap(), ("id", Some("!<>")));
        assert!(parse_keyed_token("age[>]{x}").is_err());
    }

    #[test]
    fn test_join_key() {
        assert_eq!(parse_join_key("[>]other").unwrap(), (">", "other"));
        assert_eq!(parse_join_key("[<>]audit_log").unwrap(), ("<>", "audit_log"));
        assert!(parse_join_key("other").is_err());
        assert!(parse_join_key("[>]").is_err());
    }
}
