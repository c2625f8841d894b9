//! Translation of `:name` placeholders into driver-native placeholders.
//!
//! Quoted strings, quoted identifiers, `--` and `/* */` comments and `::` casts
//! are copied through untouched.

use std::fmt::Write as _;

use fastdao_core::{DaoError, DaoResult, Params, Value};

/// Placeholder representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placeholder {
    Dollar, // $1, $2, ...
    #[default]
    Question, // ?
}

/// SQL rewritten to native placeholders plus the parameter names to bind, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSql {
    pub sql: String,
    pub names: Vec<String>,
}

impl ParsedSql {
    /// Resolves the placeholder names against `params` in binding order.
    pub fn bind(&self, params: &Params) -> DaoResult<Vec<Value>> {
        self.names
            .iter()
            .map(|name| {
                params
                    .get(name)
                    .cloned()
                    .ok_or_else(|| DaoError::MissingParameter(name.clone()))
            })
            .collect()
    }
}

fn is_ident(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Index just past the closing `quote` of a quoted run starting at `start`.
pub(crate) fn skip_quoted(bytes: &[u8], start: usize, quote: u8) -> usize {
    bytes[start + 1..]
        .iter()
        .position(|&b| b == quote)
        .map_or(bytes.len(), |p| start + 1 + p + 1)
}

/// Index just past the first `end` found at or after `from`.
pub(crate) fn skip_until(bytes: &[u8], from: usize, end: &[u8]) -> usize {
    if from >= bytes.len() {
        return bytes.len();
    }
    bytes[from..]
        .windows(end.len())
        .position(|w| w == end)
        .map_or(bytes.len(), |p| from + p + end.len())
}

/// Rewrites every `:name` placeholder of `sql` into `style`.
///
/// With [`Placeholder::Dollar`] a repeated name reuses its index; with
/// [`Placeholder::Question`] every occurrence is bound separately.
pub fn parse_named(sql: &str, style: Placeholder) -> ParsedSql {
    let bytes = sql.as_bytes();
    let mut out = String::with_capacity(sql.len());
    let mut names: Vec<String> = Vec::new();
    let mut copied = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            q @ (b'\'' | b'"') => i = skip_quoted(bytes, i, q),
            b'-' if bytes.get(i + 1) == Some(&b'-') => i = skip_until(bytes, i + 2, b"\n"),
            b'/' if bytes.get(i + 1) == Some(&b'*') => i = skip_until(bytes, i + 2, b"*/"),
            b':' if bytes.get(i + 1) == Some(&b':') => i += 2,
            b':' if bytes.get(i + 1).is_some_and(|&b| is_ident(b)) => {
                out.push_str(&sql[copied..i]);
                let start = i + 1;
                let mut end = start;
                while end < bytes.len() && is_ident(bytes[end]) {
                    end += 1;
                }
                let name = &sql[start..end];
                match style {
                    Placeholder::Question => {
                        names.push(name.to_string());
                        out.push('?');
                    }
                    Placeholder::Dollar => {
                        let n = match names.iter().position(|n| n == name) {
                            Some(p) => p + 1,
                            None => {
                                names.push(name.to_string());
                                names.len()
                            }
                        };
                        let _ = write!(out, "${n}");
                    }
                }
                i = end;
                copied = end;
            }
            _ => i += 1,
        }
    }
    out.push_str(&sql[copied..]);
    ParsedSql { sql: out, names }
}
