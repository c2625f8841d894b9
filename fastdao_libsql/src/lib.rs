#![forbid(unsafe_code)]
#![cfg_attr(
    not(feature = "libsql-backend"),
    doc = "Enable feature `libsql-backend` to use this adapter."
)]
//! A `NamedParameterExecutor` over a libsql/SQLite connection.
//!
//! `:name` placeholders are rewritten to `?` and bound positionally, so only
//! the parameters a statement actually references are sent to the driver.

#[cfg(feature = "libsql-backend")]
mod backend {
    use std::sync::Arc;
    use std::time::Instant;

    use async_trait::async_trait;
    use fastdao_core::{DaoError, DaoResult, NamedParameterExecutor, Params, Row, Value};
    use fastdao_sql_builder::{parse_named, Placeholder};
    use libsql::{Builder, Connection, Database};

    #[cfg(feature = "tracing")]
    use tracing::info;

    #[inline]
    #[allow(unused_variables)]
    fn obs_record(op: &str, start: Instant, rows: usize, success: bool) {
        let elapsed = start.elapsed().as_millis() as u64;
        #[cfg(feature = "tracing")]
        {
            info!(
                sql_kind = "sql",
                op = op,
                rows = rows,
                elapsed_ms = elapsed,
                success = success,
                "dao op"
            );
        }
        #[cfg(feature = "metrics")]
        {
            metrics::counter!("dao_ops_total", 1, "op" => op.to_string(), "success" => success.to_string());
            metrics::histogram!("dao_op_duration_ms", elapsed as f64, "op" => op.to_string());
            if !success {
                metrics::counter!("dao_op_errors_total", 1, "op" => op.to_string());
            }
        }
    }

    // Helper function to convert Value to libsql::Value.
    pub(crate) fn to_libsql_value(v: Value) -> libsql::Value {
        match v {
            Value::Null => libsql::Value::Null,
            Value::String(s) => libsql::Value::Text(s),
            Value::I32(i) => libsql::Value::Integer(i64::from(i)), // libsql uses i64 for integers
            Value::I64(i) => libsql::Value::Integer(i),
            Value::F64(f) => libsql::Value::Real(f),
            Value::Bool(b) => libsql::Value::Integer(i64::from(b)), // SQLite bools are 0/1
            Value::Bytes(b) => libsql::Value::Blob(b),
        }
    }

    pub(crate) fn from_libsql_value(v: libsql::Value) -> Value {
        match v {
            libsql::Value::Null => Value::Null,
            libsql::Value::Integer(i) => Value::I64(i),
            libsql::Value::Real(f) => Value::F64(f),
            libsql::Value::Text(s) => Value::String(s),
            libsql::Value::Blob(b) => Value::Bytes(b),
        }
    }

    /// Executes named-parameter SQL on a single libsql connection.
    ///
    /// Clones share the connection. Transactions are the caller's business:
    /// issue `BEGIN`/`COMMIT` through [`LibsqlExecutor::connection`] around DAO calls.
    #[derive(Clone)]
    pub struct LibsqlExecutor {
        // Keeps a database opened by `open` alive for as long as the connection.
        _db: Option<Arc<Database>>,
        conn: Connection,
    }

    impl LibsqlExecutor {
        /// Wraps an existing connection.
        pub fn new(conn: Connection) -> Self {
            Self { _db: None, conn }
        }

        /// Opens a local database file (or `:memory:`) and connects to it.
        pub async fn open(path: &str) -> DaoResult<Self> {
            let db = Builder::new_local(path)
                .build()
                .await
                .map_err(DaoError::executor)?;
            let conn = db.connect().map_err(DaoError::executor)?;
            Ok(Self {
                _db: Some(Arc::new(db)),
                conn,
            })
        }

        pub fn connection(&self) -> &Connection {
            &self.conn
        }

        /// Runs a batch of `;`-separated statements, e.g. a migration script.
        pub async fn execute_script(&self, sql: &str) -> DaoResult<()> {
            self.conn
                .execute_batch(sql)
                .await
                .map_err(DaoError::executor)?;
            Ok(())
        }

        async fn fetch_rows(&self, sql: &str, values: Vec<libsql::Value>) -> DaoResult<Vec<Row>> {
            let mut rows = self
                .conn
                .query(sql, values)
                .await
                .map_err(DaoError::executor)?;
            let columns: Vec<String> = (0..rows.column_count())
                .map(|i| rows.column_name(i).unwrap_or_default().to_string())
                .collect();
            let mut out = Vec::new();
            while let Some(row) = rows.next().await.map_err(DaoError::executor)? {
                let mut r = Row::new();
                for (i, name) in columns.iter().enumerate() {
                    let v = row.get_value(i as i32).map_err(DaoError::mapping)?;
                    r.push(name.clone(), from_libsql_value(v));
                }
                out.push(r);
            }
            Ok(out)
        }

        fn bind(sql: &str, params: &Params) -> DaoResult<(String, Vec<libsql::Value>)> {
            let parsed = parse_named(sql, Placeholder::Question);
            let values = parsed
                .bind(params)?
                .into_iter()
                .map(to_libsql_value)
                .collect();
            Ok((parsed.sql, values))
        }
    }

    #[async_trait]
    impl NamedParameterExecutor for LibsqlExecutor {
        async fn update(&self, sql: &str, params: &Params) -> DaoResult<u64> {
            let __start = Instant::now();
            let (native, values) = Self::bind(sql, params)?;
            match self.conn.execute(&native, values).await {
                Ok(n) => {
                    obs_record("update", __start, n as usize, true);
                    Ok(n)
                }
                Err(e) => {
                    obs_record("update", __start, 0, false);
                    Err(DaoError::executor(e))
                }
            }
        }

        async fn batch_update(&self, sql: &str, batch: &[Params]) -> DaoResult<Vec<u64>> {
            let __start = Instant::now();
            let parsed = parse_named(sql, Placeholder::Question);
            let mut counts = Vec::with_capacity(batch.len());
            for params in batch {
                let values: Vec<libsql::Value> = parsed
                    .bind(params)?
                    .into_iter()
                    .map(to_libsql_value)
                    .collect();
                let n = self.conn.execute(&parsed.sql, values).await.map_err(|e| {
                    obs_record("batch_update", __start, counts.len(), false);
                    DaoError::executor(e)
                })?;
                counts.push(n);
            }
            obs_record("batch_update", __start, counts.len(), true);
            Ok(counts)
        }

        async fn query(&self, sql: &str, params: &Params) -> DaoResult<Vec<Row>> {
            let __start = Instant::now();
            let (native, values) = Self::bind(sql, params)?;
            match self.fetch_rows(&native, values).await {
                Ok(out) => {
                    obs_record("query", __start, out.len(), true);
                    Ok(out)
                }
                Err(e) => {
                    obs_record("query", __start, 0, false);
                    Err(e)
                }
            }
        }
    }

}

#[cfg(feature = "libsql-backend")]
pub use backend::LibsqlExecutor;
