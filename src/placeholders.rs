//! Named placeholder scanning.
//!
//! Compiled statements use `:name` placeholders. Drivers want positional
//! ones, and the query history wants values spliced in for display. Both go
//! through one scanner that skips quoted literals (`'it''s'`, and `'it\'s'`
//! for the MySQL family), quoted identifiers (`"col"`, `` `col` ``),
//! comments and `::type` casts.

use crate::ast::Value;
use crate::dialect::Capabilities;
use crate::error::{QmapError, QmapResult};
use crate::transpiler::Params;

/// Positional placeholder form expected by a driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// `?` (MySQL family)
    Question,
    /// `$1`, `$2`, ... (Postgres)
    Dollar,
}

impl PlaceholderStyle {
    /// Placeholder for the 1-based position `index`.
    pub fn placeholder(&self, index: usize) -> String {
        match self {
            PlaceholderStyle::Question => "?".to_string(),
            PlaceholderStyle::Dollar => format!("${}", index),
        }
    }

    /// `?` drivers are the MySQL family, which read `\` escapes in quotes.
    pub fn backslash_escapes(&self) -> bool {
        matches!(self, PlaceholderStyle::Question)
    }
}

/// Walk `sql`, calling `on_name` for every `:name` in code. Quoted text,
/// `--` and `/* */` comments are copied through untouched, as are `#`
/// comments when `backslash_escapes` is set. The callback writes the
/// replacement into the output buffer.
fn scan<F>(sql: &str, backslash_escapes: bool, mut on_name: F) -> QmapResult<String>
where
    F: FnMut(&str, &mut String) -> QmapResult<()>,
{
    let mut out = String::with_capacity(sql.len());
    let mut chars = sql.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        let next = chars.peek().map(|&(_, n)| n);
        match c {
            '\'' | '"' | '`' => {
                out.push(c);
                // Copy through the closing quote; a doubled quote is an escape.
                while let Some((_, q)) = chars.next() {
                    out.push(q);
                    if q == '\\' && backslash_escapes && c != '`' {
                        if let Some((_, n)) = chars.next() {
                            out.push(n);
                        }
                        continue;
                    }
                    if q == c {
                        if chars.peek().map(|&(_, n)| n) == Some(c) {
                            if let Some((_, n)) = chars.next() {
                                out.push(n);
                            }
                            continue;
                        }
                        break;
                    }
                }
            }
            '-' if next == Some('-') => copy_line(c, &mut chars, &mut out),
            '#' if backslash_escapes => copy_line(c, &mut chars, &mut out),
            '/' if next == Some('*') => {
                out.push_str("/*");
                chars.next();
                let mut star = false;
                for (_, q) in chars.by_ref() {
                    out.push(q);
                    if star && q == '/' {
                        break;
                    }
                    star = q == '*';
                }
            }
            ':' => match next {
                Some(':') => {
                    out.push_str("::");
                    chars.next();
                }
                Some(n) if n.is_ascii_alphabetic() || n == '_' => {
                    let start = i + 1;
                    let mut end = start;
                    while let Some(&(j, n)) = chars.peek() {
                        if n.is_ascii_alphanumeric() || n == '_' {
                            end = j + n.len_utf8();
                            chars.next();
                        } else {
                            break;
                        }
                    }
                    on_name(&sql[start..end], &mut out)?;
                }
                _ => out.push(':'),
            },
            _ => out.push(c),
        }
    }

    Ok(out)
}

/// Copy a line comment up to and including the newline.
fn copy_line<I>(first: char, chars: &mut I, out: &mut String)
where
    I: Iterator<Item = (usize, char)>,
{
    out.push(first);
    for (_, q) in chars {
        out.push(q);
        if q == '\n' {
            break;
        }
    }
}

/// Rewrite `:name` placeholders to positional ones.
///
/// Returns the rewritten text and the values in position order. A name used
/// twice takes two positions. A name with no bound value is an error.
pub fn to_positional<'p>(
    sql: &str,
    params: &'p Params,
    style: PlaceholderStyle,
) -> QmapResult<(String, Vec<&'p Value>)> {
    let mut values = Vec::with_capacity(params.len());
    let text = scan(sql, style.backslash_escapes(), |name, out| {
        let value = params
            .get(name)
            .ok_or_else(|| QmapError::UnboundParameter(name.to_string()))?;
        values.push(value);
        out.push_str(&style.placeholder(values.len()));
        Ok(())
    })?;
    Ok((text, values))
}

/// Splice display literals into the text. Unknown names stay as written.
pub fn render(sql: &str, params: &Params, caps: &Capabilities) -> String {
    let rendered = scan(sql, caps.backslash_escapes, |name, out| {
        match params.get(name) {
            Some(value) => out.push_str(&value.to_display_literal()),
            None => {
                out.push(':');
                out.push_str(name);
            }
        }
        Ok(())
    });
    // The callback never fails.
    rendered.unwrap_or_else(|_| sql.to_string())
}
