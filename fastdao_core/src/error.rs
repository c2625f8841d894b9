//! Error types shared by the engine, the SQL builder and executor adapters.

use crate::value::ValueError;

/// Lightweight, backend-agnostic error type for DAO operations.
#[derive(Debug, thiserror::Error)]
pub enum DaoError {
    /// The entity declaration is unusable (empty table override, missing id accessor, ...).
    #[error("configuration error: {0}")]
    Configuration(String),
    /// An update was requested for an entity whose id is empty.
    #[error("{table}: id must not be empty for an update")]
    MissingId { table: String },
    /// A write statement affected fewer rows than required.
    #[error("{table}#{op} failed: {rows} rows affected")]
    WriteFailed {
        table: String,
        op: &'static str,
        rows: u64,
    },
    /// A single-row lookup matched more than one row.
    #[error("{table}#findOneWhere returned {count} rows")]
    TooManyResults { table: String, count: usize },
    /// Writing a value through a field accessor failed.
    #[error("reflection error on field `{field}`")]
    Reflection {
        field: String,
        #[source]
        source: ValueError,
    },
    /// A single-row query found no rows.
    #[error("empty result")]
    EmptyResult,
    /// A single-row query found more than one row.
    #[error("incorrect result size: expected 1, actual {actual}")]
    IncorrectResultSize { actual: usize },
    /// The SQL text references `:name` but the parameter source has no such key.
    #[error("no value supplied for parameter `:{0}`")]
    MissingParameter(String),
    /// A caller-supplied argument is out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// Error while mapping a result row into a value.
    #[error("mapping error")]
    Mapping {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// Opaque error raised by the underlying executor or driver.
    #[error("executor error")]
    Executor {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl DaoError {
    /// Wrap an executor/driver error.
    pub fn executor<E>(e: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        DaoError::Executor {
            source: Box::new(e),
        }
    }

    /// Wrap a row-mapping error.
    pub fn mapping<E>(e: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        DaoError::Mapping {
            source: Box::new(e),
        }
    }

    /// True for the "zero rows" signal of single-row reads.
    pub fn is_empty_result(&self) -> bool {
        matches!(self, DaoError::EmptyResult)
    }
}

/// Convenience alias for results returned by DAO operations.
pub type DaoResult<T> = Result<T, DaoError>;
