#![forbid(unsafe_code)]
//! Core traits and types for the fastdao data-access layer.
//! This crate is database-agnostic and should not contain any backend-specific logic.

// Re-export for downstream executor implementations.
pub use async_trait::async_trait;

pub mod entity;
pub mod error;
pub mod executor;
pub mod naming;
pub mod page;
pub mod params;
pub mod row;
pub mod value;

pub use entity::{
    BeanRowMapper, Entity, EntityDef, EntityDescriptor, EntityId, FieldDescriptor, Reader,
    Writer, ID,
};
pub use error::{DaoError, DaoResult};
pub use executor::{ExecutorExt, NamedParameterExecutor};
pub use page::Page;
pub use params::Params;
pub use row::{map_rows, Row, RowMapper};
pub use value::{FromValue, Value, ValueError};
