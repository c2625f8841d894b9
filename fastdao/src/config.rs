use fastdao_sql_builder::Dialect;
use serde::{Deserialize, Serialize};

/// Per-DAO settings, typically deserialized from the application's config file.
///
/// ```
/// # use fastdao::{DaoConfig, Dialect};
/// let config: DaoConfig = serde_json::from_str(r#"{ "dialect": "ROW_NUMBER_WINDOW" }"#).unwrap();
/// assert_eq!(config.dialect, Dialect::RowNumberWindow);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DaoConfig {
    /// Pagination syntax used by the `find_page_*` operations.
    pub dialect: Dialect,
}

impl DaoConfig {
    pub fn with_dialect(dialect: Dialect) -> Self {
        Self { dialect }
    }
}
