#![forbid(unsafe_code)]
//! SQL text synthesis for the fastdao engine.
//!
//! Statements are rendered with `:name` placeholders; executors translate them
//! into the driver's native style with [`parse_named`]. Column lists and SET
//! clauses follow the field order of the [`EntityDescriptor`], so every column
//! token lines up with exactly one placeholder or `NULL` token.

use fastdao_core::naming::camel_to_snake;
use fastdao_core::{EntityDescriptor, Params, ID};

pub mod named;
pub mod page;

pub use named::{parse_named, ParsedSql, Placeholder};
pub use page::{count_sql, paginate, rows_sql, Dialect, PageSql};

/// What a column is set to in an INSERT or UPDATE.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    /// Bound from the parameter source under this field name.
    Param(String),
    /// The literal `NULL` token.
    Null,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub column: String,
    pub slot: Slot,
}

impl Assignment {
    fn value_token(&self) -> String {
        match &self.slot {
            Slot::Param(name) => format!(":{name}"),
            Slot::Null => "NULL".to_string(),
        }
    }
}

/// How null values are rendered into a write statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullPolicy {
    /// Leave the column out of the statement.
    Skip,
    /// Mention the column with a literal `NULL`.
    Literal,
}

/// Assignments for every non-id field of `entity`, in descriptor order.
pub fn entity_assignments<E>(
    descriptor: &EntityDescriptor<E>,
    entity: &E,
    policy: NullPolicy,
) -> Vec<Assignment> {
    descriptor
        .values(entity)
        .filter_map(|(field, value)| {
            let slot = if value.is_null() {
                match policy {
                    NullPolicy::Skip => return None,
                    NullPolicy::Literal => Slot::Null,
                }
            } else {
                Slot::Param(field.field_name().to_string())
            };
            Some(Assignment {
                column: field.column_name().to_string(),
                slot,
            })
        })
        .collect()
}

/// Assignments for a caller-supplied `fieldName -> value` map.
///
/// Keys are camelCase field names and are rewritten to snake_case columns.
pub fn map_assignments(map: &Params, policy: NullPolicy) -> Vec<Assignment> {
    map.iter()
        .filter_map(|(name, value)| {
            let slot = if value.is_null() {
                match policy {
                    NullPolicy::Skip => return None,
                    NullPolicy::Literal => Slot::Null,
                }
            } else {
                Slot::Param(name.to_string())
            };
            Some(Assignment {
                column: camel_to_snake(name),
                slot,
            })
        })
        .collect()
}

/// Renders `value` as a single-quoted SQL string literal.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Build INSERT INTO <table>(id,<cols>) VALUES('<id>',<tokens>)
pub fn insert(table: &str, id: &str, assignments: &[Assignment]) -> String {
    let mut cols = Vec::with_capacity(assignments.len() + 1);
    let mut vals = Vec::with_capacity(assignments.len() + 1);
    cols.push(ID.to_string());
    vals.push(quote_literal(id));
    for a in assignments {
        cols.push(a.column.clone());
        vals.push(a.value_token());
    }
    format!(
        "INSERT INTO {table}({cols}) VALUES({vals})",
        cols = cols.join(","),
        vals = vals.join(",")
    )
}

/// `col1=:a,col2=NULL`
pub fn set_clause(assignments: &[Assignment]) -> String {
    assignments
        .iter()
        .map(|a| format!("{}={}", a.column, a.value_token()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Build UPDATE <table> SET <clauses> WHERE id=:id
pub fn update_by_id(table: &str, assignments: &[Assignment]) -> String {
    format!(
        "UPDATE {table} SET {set} WHERE {ID}=:{ID}",
        set = set_clause(assignments)
    )
}

/// Build UPDATE <table> SET <clauses> WHERE <condition>
pub fn update_where(table: &str, assignments: &[Assignment], condition: &str) -> String {
    format!(
        "UPDATE {table} SET {set} WHERE {condition}",
        set = set_clause(assignments)
    )
}

/// Build DELETE FROM <table> WHERE id=:id
pub fn delete_by_id(table: &str) -> String {
    format!("DELETE FROM {table} WHERE {ID}=:{ID}")
}

/// Build DELETE FROM <table>
pub fn delete_all(table: &str) -> String {
    format!("DELETE FROM {table}")
}

/// Build SELECT * FROM <table> WHERE id=:id
pub fn select_by_id(table: &str) -> String {
    format!("SELECT * FROM {table} WHERE {ID}=:{ID}")
}

/// Build SELECT * FROM <table> WHERE <condition>
///
/// The condition is trusted caller text and is inserted verbatim.
pub fn select_where(table: &str, condition: &str) -> String {
    format!("SELECT * FROM {table} WHERE {condition}")
}

/// Build SELECT COUNT(*) FROM <table> WHERE <condition>
pub fn count_where(table: &str, condition: &str) -> String {
    format!("SELECT COUNT(*) FROM {table} WHERE {condition}")
}
