//! Pagination rewriting of a base SELECT into a rows query and a count query.
//!
//! The rewrite is purely textual and never looks at parameter bindings, so
//! both derived queries can be executed with the base query's parameters.

use fastdao_core::{DaoError, DaoResult};
use serde::{Deserialize, Serialize};

use crate::named::{skip_quoted, skip_until};

/// Pagination syntax family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Dialect {
    /// `LIMIT n OFFSET m` (PostgreSQL, MySQL, SQLite).
    #[default]
    LimitOffset,
    /// `ROW_NUMBER() OVER (...)` window (older Oracle, SQL Server).
    ///
    /// A base query without a trailing `ORDER BY` is numbered by
    /// `(SELECT NULL)`, which only SQL Server accepts; on Oracle the base
    /// query must end with an `ORDER BY`.
    RowNumberWindow,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSql {
    pub rows_sql: String,
    pub count_sql: String,
}

/// Derives the rows and count queries for one page of `base_sql`.
///
/// `page` is 1-based; 0 is clamped to 1. `per_page` must be positive.
pub fn paginate(
    base_sql: &str,
    page: usize,
    per_page: usize,
    dialect: Dialect,
) -> DaoResult<PageSql> {
    Ok(PageSql {
        rows_sql: rows_sql(base_sql, page, per_page, dialect)?,
        count_sql: count_sql(base_sql),
    })
}

pub fn rows_sql(
    base_sql: &str,
    page: usize,
    per_page: usize,
    dialect: Dialect,
) -> DaoResult<String> {
    if per_page == 0 {
        return Err(DaoError::InvalidArgument(
            "per_page must be greater than zero".to_string(),
        ));
    }
    let page = page.max(1);
    let offset = (page - 1).saturating_mul(per_page);
    let base = trim_statement(base_sql);
    let sql = match dialect {
        Dialect::LimitOffset => format!("{base} LIMIT {per_page} OFFSET {offset}"),
        Dialect::RowNumberWindow => {
            let words = top_level_words(base);
            let (inner, order) = match trailing_order_by(&words) {
                Some((order_start, clause_start)) => (
                    base[..order_start].trim_end(),
                    base[clause_start..].trim(),
                ),
                None => (base, "(SELECT NULL)"),
            };
            let first = offset.saturating_add(1);
            let last = offset.saturating_add(per_page);
            format!(
                "SELECT * FROM (SELECT page_.*, ROW_NUMBER() OVER (ORDER BY {order}) AS row_num_ \
                 FROM ({inner}) page_) paged_ WHERE paged_.row_num_ BETWEEN {first} AND {last} \
                 ORDER BY paged_.row_num_"
            )
        }
    };
    Ok(sql)
}

/// Words that make replacing the projection with `COUNT(*)` unsafe.
const WRAP_KEYWORDS: &[&str] = &[
    "DISTINCT",
    "GROUP",
    "HAVING",
    "UNION",
    "INTERSECT",
    "EXCEPT",
    "LIMIT",
    "OFFSET",
    "FETCH",
];

/// Derives the query counting every row of `base_sql`.
///
/// The projection is replaced by `COUNT(*)` when that preserves the row count;
/// otherwise the query is wrapped as `SELECT COUNT(*) FROM (...) t`. A trailing
/// `ORDER BY` is dropped.
pub fn count_sql(base_sql: &str) -> String {
    let base = trim_statement(base_sql);
    let words = top_level_words(base);
    let body = match trailing_order_by(&words) {
        Some((order_start, _)) => base[..order_start].trim_end(),
        None => base,
    };
    let must_wrap = words
        .iter()
        .any(|w| WRAP_KEYWORDS.contains(&w.upper.as_str()));
    if !must_wrap {
        let select = words.iter().position(|w| w.upper == "SELECT");
        let from = select.and_then(|s| words[s..].iter().find(|w| w.upper == "FROM"));
        if let (Some(s), Some(from)) = (select, from) {
            let prefix = &base[..words[s].start];
            return format!("{prefix}SELECT COUNT(*) {}", &body[from.start..]);
        }
    }
    format!("SELECT COUNT(*) FROM ({body}) t")
}

fn trim_statement(sql: &str) -> &str {
    sql.trim().trim_end_matches(';').trim_end()
}

/// A bare word at parenthesis depth zero, outside quotes and comments.
#[derive(Debug)]
struct Word {
    start: usize,
    end: usize,
    upper: String,
}

fn top_level_words(sql: &str) -> Vec<Word> {
    let bytes = sql.as_bytes();
    let mut words = Vec::new();
    let mut depth = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            q @ (b'\'' | b'"' | b'`') => i = skip_quoted(bytes, i, q),
            b'[' => i = skip_quoted(bytes, i, b']'),
            b'-' if bytes.get(i + 1) == Some(&b'-') => i = skip_until(bytes, i + 2, b"\n"),
            b'/' if bytes.get(i + 1) == Some(&b'*') => i = skip_until(bytes, i + 2, b"*/"),
            b'(' => {
                depth += 1;
                i += 1;
            }
            b')' => {
                depth = depth.saturating_sub(1);
                i += 1;
            }
            b':' => {
                // placeholder names and casts are never keywords
                i += 1;
                while i < bytes.len() && (bytes[i] == b':' || is_word(bytes[i])) {
                    i += 1;
                }
            }
            b if is_word(b) => {
                let start = i;
                while i < bytes.len() && is_word(bytes[i]) {
                    i += 1;
                }
                if depth == 0 {
                    words.push(Word {
                        start,
                        end: i,
                        upper: sql[start..i].to_ascii_uppercase(),
                    });
                }
            }
            _ => i += 1,
        }
    }
    words
}

fn is_word(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'.' || b == b'$'
}

/// Byte offsets of the last top-level `ORDER BY` and of the clause after it,
/// when nothing but the ordering follows.
fn trailing_order_by(words: &[Word]) -> Option<(usize, usize)> {
    let k = words
        .windows(2)
        .rposition(|w| w[0].upper == "ORDER" && w[1].upper == "BY")?;
    let tail_has_limit = words[k + 2..]
        .iter()
        .any(|w| matches!(w.upper.as_str(), "LIMIT" | "OFFSET" | "FETCH"));
    if tail_has_limit {
        return None;
    }
    Some((words[k].start, words[k + 1].end))
}
