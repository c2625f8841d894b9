//! The generic per-entity DAO.
//!
//! Conditions passed to the `*_where` operations are trusted caller text and
//! are inserted into the SQL verbatim; only parameter values are bound. Never
//! build a condition from untrusted input.

use std::fmt;
use std::sync::Arc;

use fastdao_core::{
    BeanRowMapper, DaoError, DaoResult, Entity, EntityDescriptor, ExecutorExt,
    NamedParameterExecutor, Page, Params, Row, RowMapper, Value, ID,
};
use fastdao_sql_builder::{
    self as builder, entity_assignments, map_assignments, Dialect, NullPolicy,
};
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::config::DaoConfig;
use crate::page_template::{count_from, query_page};

/// CRUD, conditional and paginated queries for one entity type over one executor.
///
/// The entity descriptor is resolved once at construction and shared by clones.
pub struct Dao<E, X> {
    executor: X,
    descriptor: Arc<EntityDescriptor<E>>,
    dialect: Dialect,
}

impl<E, X: Clone> Clone for Dao<E, X> {
    fn clone(&self) -> Self {
        Self {
            executor: self.executor.clone(),
            descriptor: Arc::clone(&self.descriptor),
            dialect: self.dialect,
        }
    }
}

impl<E, X> fmt::Debug for Dao<E, X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dao")
            .field("descriptor", &self.descriptor)
            .field("dialect", &self.dialect)
            .finish_non_exhaustive()
    }
}

impl<E, X> Dao<E, X>
where
    E: Entity,
    X: NamedParameterExecutor,
{
    /// Resolves the entity descriptor, using the `LIMIT_OFFSET` dialect.
    pub fn new(executor: X) -> DaoResult<Self> {
        Self::with_config(executor, DaoConfig::default())
    }

    pub fn with_dialect(executor: X, dialect: Dialect) -> DaoResult<Self> {
        Self::with_config(executor, DaoConfig::with_dialect(dialect))
    }

    pub fn with_config(executor: X, config: DaoConfig) -> DaoResult<Self> {
        let descriptor = EntityDescriptor::<E>::resolve()?;
        debug!(
            table = descriptor.table_name(),
            fields = descriptor.fields().len(),
            "resolved entity descriptor"
        );
        Ok(Self {
            executor,
            descriptor: Arc::new(descriptor),
            dialect: config.dialect,
        })
    }

    pub fn descriptor(&self) -> &EntityDescriptor<E> {
        &self.descriptor
    }

    pub fn executor(&self) -> &X {
        &self.executor
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn table(&self) -> &str {
        self.descriptor.table_name()
    }

    fn id_param(id: &str) -> Params {
        Params::new().with(ID, id)
    }

    async fn execute(&self, op: &'static str, sql: &str, params: &Params) -> DaoResult<u64> {
        debug!(table = self.table(), op, %sql, "executing update");
        self.executor.update(sql, params).await
    }

    async fn select(&self, op: &'static str, sql: &str, params: &Params) -> DaoResult<Vec<E>> {
        debug!(table = self.table(), op, %sql, "executing query");
        let mapper = BeanRowMapper::new(&self.descriptor);
        self.executor.query_with(sql, params, &mapper).await
    }

    // --- save ---

    /// Inserts the non-null fields of `entity`, generating a UUID id when it has none.
    ///
    /// Returns the id, which is also installed into `entity`.
    pub async fn save_ignore_null(&self, entity: &mut E) -> DaoResult<String> {
        self.insert(entity, NullPolicy::Skip, "save_ignore_null").await
    }

    /// Inserts every field of `entity`; null fields are written as `NULL`.
    pub async fn save(&self, entity: &mut E) -> DaoResult<String> {
        self.insert(entity, NullPolicy::Literal, "save").await
    }

    async fn insert(
        &self,
        entity: &mut E,
        policy: NullPolicy,
        op: &'static str,
    ) -> DaoResult<String> {
        let mut id = self.descriptor.id_of(entity)?;
        if id.is_empty() {
            id = Uuid::new_v4().to_string();
            self.descriptor.set_id(entity, id.clone())?;
        }
        let assignments = entity_assignments(&self.descriptor, entity, policy);
        let sql = builder::insert(self.table(), &id, &assignments);
        let params = self.descriptor.params_of(entity);
        let rows = self.execute(op, &sql, &params).await?;
        if rows < 1 {
            return Err(DaoError::WriteFailed {
                table: self.table().to_string(),
                op,
                rows,
            });
        }
        Ok(id)
    }

    // --- delete ---

    pub async fn delete(&self, id: &str) -> DaoResult<u64> {
        let sql = builder::delete_by_id(self.table());
        self.execute("delete", &sql, &Self::id_param(id)).await
    }

    /// Deletes every row of the table.
    pub async fn delete_all(&self) -> DaoResult<u64> {
        warn!(table = self.table(), "delete_all removes every row of the table");
        let sql = builder::delete_all(self.table());
        self.execute("delete_all", &sql, &Params::new()).await
    }

    /// Deletes each id in one executor batch.
    ///
    /// Returns the number of batch entries that affected exactly one row.
    pub async fn delete_in_batch<S>(&self, ids: &[S]) -> DaoResult<usize>
    where
        S: AsRef<str> + Sync,
    {
        if ids.is_empty() {
            return Ok(0);
        }
        let sql = builder::delete_by_id(self.table());
        let batch: Vec<Params> = ids.iter().map(|id| Self::id_param(id.as_ref())).collect();
        debug!(
            table = self.table(),
            op = "delete_in_batch",
            %sql,
            size = batch.len(),
            "executing batch"
        );
        let counts = self.executor.batch_update(&sql, &batch).await?;
        Ok(counts.iter().filter(|&&n| n == 1).count())
    }

    // --- update ---

    fn require_id(&self, entity: &E) -> DaoResult<String> {
        let id = self.descriptor.id_of(entity)?;
        if id.is_empty() {
            return Err(DaoError::MissingId {
                table: self.table().to_string(),
            });
        }
        Ok(id)
    }

    /// Updates every non-id field; null fields are set to `NULL`.
    pub async fn update(&self, entity: &E) -> DaoResult<String> {
        let id = self.require_id(entity)?;
        let assignments = entity_assignments(&self.descriptor, entity, NullPolicy::Literal);
        if assignments.is_empty() {
            return Err(DaoError::InvalidArgument(format!(
                "{}: entity has no columns to update",
                self.table()
            )));
        }
        let sql = builder::update_by_id(self.table(), &assignments);
        let rows = self
            .execute("update", &sql, &self.descriptor.params_of(entity))
            .await?;
        if rows < 1 {
            return Err(DaoError::WriteFailed {
                table: self.table().to_string(),
                op: "update",
                rows,
            });
        }
        Ok(id)
    }

    /// Updates only the non-null fields. A miss is logged, not an error.
    pub async fn update_ignore_null(&self, entity: &E) -> DaoResult<String> {
        let id = self.require_id(entity)?;
        let assignments = entity_assignments(&self.descriptor, entity, NullPolicy::Skip);
        if assignments.is_empty() {
            warn!(
                table = self.table(),
                %id,
                "update_ignore_null: every field is null, nothing to update"
            );
            return Ok(id);
        }
        let sql = builder::update_by_id(self.table(), &assignments);
        let rows = self
            .execute("update_ignore_null", &sql, &self.descriptor.params_of(entity))
            .await?;
        if rows < 1 {
            warn!(table = self.table(), %sql, rows, "update_ignore_null affected no rows");
        }
        Ok(id)
    }

    /// Updates the columns named by `values` (camelCase keys) on row `id`.
    ///
    /// Null values are written as `NULL`. A miss is logged, not an error.
    pub async fn update_by_id(&self, id: &str, mut values: Params) -> DaoResult<String> {
        if id.is_empty() {
            return Err(DaoError::MissingId {
                table: self.table().to_string(),
            });
        }
        // The row is addressed by `id`; an `id` key in the map is not a column to set.
        let assignments: Vec<_> = map_assignments(&values, NullPolicy::Literal)
            .into_iter()
            .filter(|a| a.column != ID)
            .collect();
        if assignments.is_empty() {
            warn!(table = self.table(), %id, "update_by_id: no columns to update");
            return Ok(id.to_string());
        }
        let sql = builder::update_by_id(self.table(), &assignments);
        values.insert(ID, id);
        let rows = self.execute("update_by_id", &sql, &values).await?;
        if rows < 1 {
            warn!(table = self.table(), %sql, rows, "update_by_id affected no rows");
        }
        Ok(id.to_string())
    }

    /// `UPDATE <table> SET <values> WHERE <condition>`.
    ///
    /// `condition_params` are merged into `values` and win on a name clash.
    pub async fn update_where(
        &self,
        condition: &str,
        condition_params: Params,
        mut values: Params,
    ) -> DaoResult<u64> {
        let assignments = map_assignments(&values, NullPolicy::Literal);
        if assignments.is_empty() {
            warn!(table = self.table(), %condition, "update_where: no columns to update");
            return Ok(0);
        }
        let sql = builder::update_where(self.table(), &assignments, condition);
        warn!(table = self.table(), %sql, "update_where may touch an unbounded set of rows");
        values.merge(&condition_params);
        let rows = self.execute("update_where", &sql, &values).await?;
        if rows < 1 {
            warn!(table = self.table(), %sql, rows, "update_where affected no rows");
        }
        Ok(rows)
    }

    // --- find one ---

    pub async fn find_one(&self, id: &str) -> DaoResult<Option<E>> {
        let sql = builder::select_by_id(self.table());
        debug!(table = self.table(), op = "find_one", %sql, "executing query");
        match self.executor.query_for_map(&sql, &Self::id_param(id)).await {
            Ok(row) => {
                let mapper = BeanRowMapper::new(&self.descriptor);
                mapper.map_row(&row, 0).map(Some)
            }
            Err(e) if e.is_empty_result() => {
                warn!(table = self.table(), %id, "find_one found no row");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// The single row matching `condition`, with `values[i]` bound to `:{i+1}`.
    pub async fn find_one_where(&self, condition: &str, values: &[Value]) -> DaoResult<Option<E>> {
        if condition.trim().is_empty() {
            return Err(DaoError::InvalidArgument(
                "find_one_where requires a condition".to_string(),
            ));
        }
        let sql = builder::select_where(self.table(), condition);
        let params = Params::positional(values.iter().cloned());
        let mut rows = self.select("find_one_where", &sql, &params).await?;
        match rows.len() {
            0 => {
                warn!(table = self.table(), %condition, "find_one_where found no row");
                Ok(None)
            }
            1 => Ok(rows.pop()),
            count => {
                error!(
                    table = self.table(),
                    %condition,
                    count,
                    "find_one_where matched several rows"
                );
                Err(DaoError::TooManyResults {
                    table: self.table().to_string(),
                    count,
                })
            }
        }
    }

    // --- find list ---

    /// Every row matching `condition`, with `values[i]` bound to `:{i+1}`.
    pub async fn find_list_where(&self, condition: &str, values: &[Value]) -> DaoResult<Vec<E>> {
        let params = Params::positional(values.iter().cloned());
        self.find_list_where_map(condition, &params).await
    }

    /// Every row matching `condition`, binding `:fieldName` from `source`'s fields.
    pub async fn find_list_where_entity(&self, condition: &str, source: &E) -> DaoResult<Vec<E>> {
        let params = self.descriptor.params_of(source);
        self.find_list_where_map(condition, &params).await
    }

    pub async fn find_list_where_map(&self, condition: &str, params: &Params) -> DaoResult<Vec<E>> {
        let sql = builder::select_where(self.table(), condition);
        self.select("find_list_where", &sql, params).await
    }

    // --- count ---

    pub async fn count_where(&self, condition: &str, values: &[Value]) -> DaoResult<usize> {
        let sql = builder::count_where(self.table(), condition);
        let params = Params::positional(values.iter().cloned());
        debug!(table = self.table(), op = "count_where", %sql, "executing query");
        count_from(self.executor.query_for_object(&sql, &params).await?)
    }

    // --- page ---

    /// One page of the rows matching `condition`, with `values[i]` bound to `:{i+1}`.
    ///
    /// `page` is 1-based. The rows and count queries share the same bindings.
    pub async fn find_page_where(
        &self,
        page: usize,
        per_page: usize,
        condition: &str,
        values: &[Value],
    ) -> DaoResult<Page<E>> {
        let params = Params::positional(values.iter().cloned());
        self.find_page_where_map(page, per_page, condition, &params).await
    }

    pub async fn find_page_where_entity(
        &self,
        page: usize,
        per_page: usize,
        condition: &str,
        source: &E,
    ) -> DaoResult<Page<E>> {
        let params = self.descriptor.params_of(source);
        self.find_page_where_map(page, per_page, condition, &params).await
    }

    pub async fn find_page_where_map(
        &self,
        page: usize,
        per_page: usize,
        condition: &str,
        params: &Params,
    ) -> DaoResult<Page<E>> {
        let base = builder::select_where(self.table(), condition);
        let mapper = BeanRowMapper::new(&self.descriptor);
        query_page(&self.executor, &base, page, per_page, params, &mapper, self.dialect).await
    }

    // --- raw sql ---

    /// Runs caller SQL expecting exactly one row.
    pub async fn find_map_by_sql(&self, sql: &str, params: &Params) -> DaoResult<Row> {
        debug!(table = self.table(), op = "find_map_by_sql", %sql, "executing query");
        self.executor.query_for_map(sql, params).await
    }

    pub async fn find_map_list_by_sql(&self, sql: &str, params: &Params) -> DaoResult<Vec<Row>> {
        debug!(table = self.table(), op = "find_map_list_by_sql", %sql, "executing query");
        self.executor.query_for_list(sql, params).await
    }
}
