//! Result rows and row mappers.

use crate::error::DaoResult;
use crate::value::Value;

/// One result row as an ordered list of `(column, value)` pairs.
///
/// Lookups by column name are ASCII case-insensitive, since drivers disagree
/// on the case they report column labels in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style push, handy for executors and tests.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(column, value);
        self
    }

    pub fn push(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.columns.push((column.into(), value.into()));
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(c, _)| c.eq_ignore_ascii_case(column))
            .map(|(_, v)| v)
    }

    /// The value of the first column, as used by `query_for_object`.
    pub fn first_value(&self) -> Option<&Value> {
        self.columns.first().map(|(_, v)| v)
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(c, v)| (c.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl IntoIterator for Row {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.into_iter()
    }
}

/// Maps one result row into a `T`. `row_num` is the zero-based index of the row.
pub trait RowMapper<T> {
    fn map_row(&self, row: &Row, row_num: usize) -> DaoResult<T>;
}

impl<T, F> RowMapper<T> for F
where
    F: Fn(&Row, usize) -> DaoResult<T>,
{
    fn map_row(&self, row: &Row, row_num: usize) -> DaoResult<T> {
        self(row, row_num)
    }
}

/// Applies `mapper` to every row, preserving order.
pub fn map_rows<T, M>(rows: &[Row], mapper: &M) -> DaoResult<Vec<T>>
where
    M: RowMapper<T> + ?Sized,
{
    rows.iter()
        .enumerate()
        .map(|(i, row)| mapper.map_row(row, i))
        .collect()
}
