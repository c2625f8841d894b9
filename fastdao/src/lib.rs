#![forbid(unsafe_code)]
//! Facade crate for the `fastdao` data-access layer.
//!
//! This crate provides the main public API: the generic [`Dao`], the
//! [`PageTemplate`] helper and re-exports of the core types and the
//! `#[derive(Entity)]` macro. The derive expands to `::fastdao_core` paths, so
//! applications depend on `fastdao_core` alongside this crate.
//!
//! # Example
//!
//! ```ignore
//! use fastdao::{values, Dao, Entity};
//!
//! #[derive(Entity, Default, Debug)]
//! pub struct UserAccount {
//!     pub id: String,
//!     pub user_name: Option<String>,
//!     pub age: Option<i32>,
//! }
//!
//! // Table `user_account`, columns `user_name` and `age`.
//! let dao: Dao<UserAccount, _> = Dao::new(executor)?;
//! let mut wang = UserAccount { user_name: Some("wang".into()), ..Default::default() };
//! let id = dao.save_ignore_null(&mut wang).await?;
//! let adults = dao.find_page_where(1, 20, "age>:1", &values![18]).await?;
//! ```

pub mod config;
pub mod dao;
pub mod page_template;

pub use config::DaoConfig;
pub use dao::Dao;
pub use page_template::PageTemplate;

// Re-export the core types.
pub use fastdao_core::{
    async_trait, values, BeanRowMapper, DaoError, DaoResult, Entity, EntityDef, EntityDescriptor,
    EntityId, ExecutorExt, FromValue, NamedParameterExecutor, Page, Params, Row, RowMapper, Value,
    ValueError,
};
pub use fastdao_core::naming;

// Re-export the derive macro.
pub use fastdao_macros::Entity;

pub use fastdao_sql_builder as sql_builder;
pub use fastdao_sql_builder::Dialect;

// Backend executors re-exported under a neutral namespace, so end-users don't
// have to depend on backend crates directly. These are feature-gated.
pub mod backends {
    #[cfg(feature = "libsql-backend")]
    pub use fastdao_libsql::LibsqlExecutor;
}
