//! The named-parameter SQL executor the engine delegates to.
//!
//! Connection handling, transactions, statement caching and driver type
//! conversion belong to implementations of [`NamedParameterExecutor`]; the
//! engine only hands over SQL text with `:name` placeholders and a [`Params`]
//! source.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{DaoError, DaoResult};
use crate::params::Params;
use crate::row::{map_rows, Row, RowMapper};
use crate::value::Value;

#[async_trait]
pub trait NamedParameterExecutor: Send + Sync {
    /// Executes a write statement and returns the affected row count.
    async fn update(&self, sql: &str, params: &Params) -> DaoResult<u64>;

    /// Executes the same statement once per parameter source, returning the
    /// affected row count of every entry.
    async fn batch_update(&self, sql: &str, batch: &[Params]) -> DaoResult<Vec<u64>>;

    /// Executes a query and returns every row.
    async fn query(&self, sql: &str, params: &Params) -> DaoResult<Vec<Row>>;

    /// Expects exactly one row. Zero rows fail with [`DaoError::EmptyResult`].
    async fn query_for_map(&self, sql: &str, params: &Params) -> DaoResult<Row> {
        let mut rows = self.query(sql, params).await?;
        match rows.len() {
            0 => Err(DaoError::EmptyResult),
            1 => Ok(rows.remove(0)),
            n => Err(DaoError::IncorrectResultSize { actual: n }),
        }
    }

    async fn query_for_list(&self, sql: &str, params: &Params) -> DaoResult<Vec<Row>> {
        self.query(sql, params).await
    }

    /// The first column of the single result row.
    async fn query_for_object(&self, sql: &str, params: &Params) -> DaoResult<Value> {
        let row = self.query_for_map(sql, params).await?;
        row.first_value().cloned().ok_or(DaoError::EmptyResult)
    }
}

#[async_trait]
impl<X> NamedParameterExecutor for Arc<X>
where
    X: NamedParameterExecutor + ?Sized,
{
    async fn update(&self, sql: &str, params: &Params) -> DaoResult<u64> {
        (**self).update(sql, params).await
    }
    async fn batch_update(&self, sql: &str, batch: &[Params]) -> DaoResult<Vec<u64>> {
        (**self).batch_update(sql, batch).await
    }
    async fn query(&self, sql: &str, params: &Params) -> DaoResult<Vec<Row>> {
        (**self).query(sql, params).await
    }
    async fn query_for_map(&self, sql: &str, params: &Params) -> DaoResult<Row> {
        (**self).query_for_map(sql, params).await
    }
    async fn query_for_list(&self, sql: &str, params: &Params) -> DaoResult<Vec<Row>> {
        (**self).query_for_list(sql, params).await
    }
    async fn query_for_object(&self, sql: &str, params: &Params) -> DaoResult<Value> {
        (**self).query_for_object(sql, params).await
    }
}

#[async_trait]
impl<X> NamedParameterExecutor for &X
where
    X: NamedParameterExecutor + ?Sized,
{
    async fn update(&self, sql: &str, params: &Params) -> DaoResult<u64> {
        (**self).update(sql, params).await
    }
    async fn batch_update(&self, sql: &str, batch: &[Params]) -> DaoResult<Vec<u64>> {
        (**self).batch_update(sql, batch).await
    }
    async fn query(&self, sql: &str, params: &Params) -> DaoResult<Vec<Row>> {
        (**self).query(sql, params).await
    }
    async fn query_for_map(&self, sql: &str, params: &Params) -> DaoResult<Row> {
        (**self).query_for_map(sql, params).await
    }
    async fn query_for_list(&self, sql: &str, params: &Params) -> DaoResult<Vec<Row>> {
        (**self).query_for_list(sql, params).await
    }
    async fn query_for_object(&self, sql: &str, params: &Params) -> DaoResult<Value> {
        (**self).query_for_object(sql, params).await
    }
}

/// Row-mapping convenience over any executor.
#[async_trait]
pub trait ExecutorExt: NamedParameterExecutor {
    /// Runs `sql` and maps every row through `mapper`.
    async fn query_with<T, M>(&self, sql: &str, params: &Params, mapper: &M) -> DaoResult<Vec<T>>
    where
        T: Send,
        M: RowMapper<T> + Sync + ?Sized,
    {
        let rows = self.query(sql, params).await?;
        map_rows(&rows, mapper)
    }
}

#[async_trait]
impl<X: NamedParameterExecutor + ?Sized> ExecutorExt for X {}
