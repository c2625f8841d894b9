//! Pagination over arbitrary SQL with an explicit row mapper.

use fastdao_core::{
    DaoError, DaoResult, ExecutorExt, FromValue, NamedParameterExecutor, Page, Params, RowMapper,
    Value,
};
use fastdao_sql_builder::{paginate, Dialect};
use tracing::debug;

/// Runs the rows and count queries derived from `sql` with the same `params`.
pub(crate) async fn query_page<X, T, M>(
    executor: &X,
    sql: &str,
    page: usize,
    per_page: usize,
    params: &Params,
    mapper: &M,
    dialect: Dialect,
) -> DaoResult<Page<T>>
where
    X: NamedParameterExecutor + ?Sized,
    T: Send,
    M: RowMapper<T> + Sync + ?Sized,
{
    let page_sql = paginate(sql, page, per_page, dialect)?;
    debug!(sql = %page_sql.rows_sql, page, per_page, "executing page query");
    let rows = executor.query_with(&page_sql.rows_sql, params, mapper).await?;
    debug!(sql = %page_sql.count_sql, "executing count query");
    let total = count_from(executor.query_for_object(&page_sql.count_sql, params).await?)?;
    Ok(Page::new(rows, total))
}

/// Reads a `COUNT(*)` result.
pub(crate) fn count_from(value: Value) -> DaoResult<usize> {
    let n = i64::from_value(value).map_err(DaoError::mapping)?;
    usize::try_from(n).map_err(DaoError::mapping)
}

/// A non-generic pagination helper bound to one executor.
#[derive(Debug, Clone)]
pub struct PageTemplate<X> {
    executor: X,
}

impl<X: NamedParameterExecutor> PageTemplate<X> {
    pub fn new(executor: X) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &X {
        &self.executor
    }

    /// One page of `sql`, binding `:name` placeholders from `params`.
    pub async fn query_page<T, M>(
        &self,
        sql: &str,
        page: usize,
        per_page: usize,
        params: &Params,
        mapper: &M,
        dialect: Dialect,
    ) -> DaoResult<Page<T>>
    where
        T: Send,
        M: RowMapper<T> + Sync + ?Sized,
    {
        query_page(&self.executor, sql, page, per_page, params, mapper, dialect).await
    }

    /// One page of `sql`, binding `args[i]` to `:{i+1}`.
    pub async fn query_page_positional<T, M>(
        &self,
        sql: &str,
        page: usize,
        per_page: usize,
        args: &[Value],
        mapper: &M,
        dialect: Dialect,
    ) -> DaoResult<Page<T>>
    where
        T: Send,
        M: RowMapper<T> + Sync + ?Sized,
    {
        let params = Params::positional(args.iter().cloned());
        query_page(&self.executor, sql, page, per_page, &params, mapper, dialect).await
    }
}
