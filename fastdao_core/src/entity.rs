//! Entity registration and the cached, immutable entity descriptor.
//!
//! An entity declares its shape once through [`Entity::declare`], either by hand
//! with the [`EntityDef`] builder or via `#[derive(Entity)]`. A DAO resolves the
//! declaration into an [`EntityDescriptor`] at construction time and never
//! mutates it afterwards.

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

use crate::error::{DaoError, DaoResult};
use crate::naming::{accessor_to_field, camel_to_snake, snake_to_camel};
use crate::params::Params;
use crate::row::{Row, RowMapper};
use crate::value::{Value, ValueError};

/// Name of the primary-key field, column and parameter.
pub const ID: &str = "id";

/// Reads the current value of a field.
pub type Reader<E> = fn(&E) -> Value;
/// Writes a driver-supplied value into a field.
pub type Writer<E> = fn(&mut E, Value) -> Result<(), ValueError>;

/// Types that can be persisted by a `Dao`.
///
/// Implemented via `#[derive(Entity)]` or by hand.
pub trait Entity: Default + Send + Sync + 'static {
    /// Declares the table override, the id accessor and the ordered non-id fields.
    fn declare() -> EntityDef<Self>;
}

/// Field types usable as the primary key. An empty string means "no id yet".
pub trait EntityId {
    fn to_id(&self) -> String;
    fn from_id(id: String) -> Self;
}

impl EntityId for String {
    fn to_id(&self) -> String {
        self.clone()
    }
    fn from_id(id: String) -> Self {
        id
    }
}

impl EntityId for Option<String> {
    fn to_id(&self) -> String {
        self.clone().unwrap_or_default()
    }
    fn from_id(id: String) -> Self {
        if id.is_empty() {
            None
        } else {
            Some(id)
        }
    }
}

struct IdAccessor<E> {
    get: fn(&E) -> String,
    set: fn(&mut E, String),
}

struct FieldDef<E> {
    name: String,
    read: Reader<E>,
    write: Writer<E>,
}

/// The raw declaration of an entity, as written by the entity author.
pub struct EntityDef<E> {
    type_name: &'static str,
    table: Option<String>,
    id: Option<IdAccessor<E>>,
    fields: Vec<FieldDef<E>>,
}

impl<E> EntityDef<E> {
    /// Starts a declaration for the type with the given simple name (`"UserAccount"`).
    pub fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            table: None,
            id: None,
            fields: Vec::new(),
        }
    }

    /// Overrides the derived table name.
    pub fn table(mut self, name: impl Into<String>) -> Self {
        self.table = Some(name.into());
        self
    }

    /// Registers the primary-key accessor pair.
    pub fn id(mut self, get: fn(&E) -> String, set: fn(&mut E, String)) -> Self {
        self.id = Some(IdAccessor { get, set });
        self
    }

    /// Registers a non-id field under its camelCase name.
    pub fn field(mut self, name: impl Into<String>, read: Reader<E>, write: Writer<E>) -> Self {
        self.fields.push(FieldDef {
            name: name.into(),
            read,
            write,
        });
        self
    }

    /// Registers a non-id field by accessor name: `"getUserName"` registers `userName`.
    pub fn accessor(self, accessor_name: &str, read: Reader<E>, write: Writer<E>) -> Self {
        let name = accessor_to_field(accessor_name);
        self.field(name, read, write)
    }
}

/// One non-id field of a resolved descriptor.
pub struct FieldDescriptor<E> {
    field_name: String,
    column_name: String,
    read: Reader<E>,
    write: Writer<E>,
}

impl<E> FieldDescriptor<E> {
    /// camelCase name, also the parameter name (`:userName`).
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// snake_case column name.
    pub fn column_name(&self) -> &str {
        &self.column_name
    }

    pub fn read(&self, entity: &E) -> Value {
        (self.read)(entity)
    }

    pub fn write(&self, entity: &mut E, value: Value) -> DaoResult<()> {
        (self.write)(entity, value).map_err(|source| DaoError::Reflection {
            field: self.field_name.clone(),
            source,
        })
    }
}

impl<E> fmt::Debug for FieldDescriptor<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("field_name", &self.field_name)
            .field("column_name", &self.column_name)
            .finish()
    }
}

/// Cached, immutable summary of an entity type.
///
/// Field order is the declaration order and is the canonical column order for
/// every generated statement.
pub struct EntityDescriptor<E> {
    type_name: &'static str,
    table_name: String,
    id: Option<IdAccessor<E>>,
    fields: Vec<FieldDescriptor<E>>,
    by_field: HashMap<String, usize>,
    by_column: HashMap<String, usize>,
}

impl<E: Entity> EntityDescriptor<E> {
    /// Resolves the declaration of `E`.
    pub fn resolve() -> DaoResult<Self> {
        Self::from_def(E::declare())
    }
}

impl<E> EntityDescriptor<E> {
    /// Validates a declaration and derives table and column names.
    pub fn from_def(def: EntityDef<E>) -> DaoResult<Self> {
        let table_name = match def.table {
            Some(t) if t.trim().is_empty() => {
                return Err(DaoError::Configuration(format!(
                    "{}: table name override must not be empty",
                    def.type_name
                )))
            }
            Some(t) => t,
            None => camel_to_snake(def.type_name),
        };

        let mut fields = Vec::with_capacity(def.fields.len());
        let mut by_field = HashMap::new();
        let mut by_column = HashMap::new();
        for (i, f) in def.fields.into_iter().enumerate() {
            if f.name == ID {
                return Err(DaoError::Configuration(format!(
                    "{}: `id` is the primary key; register it with EntityDef::id",
                    def.type_name
                )));
            }
            if by_field.insert(f.name.clone(), i).is_some() {
                return Err(DaoError::Configuration(format!(
                    "{}: field `{}` declared more than once",
                    def.type_name, f.name
                )));
            }
            let column_name = camel_to_snake(&f.name);
            by_column.insert(column_name.clone(), i);
            fields.push(FieldDescriptor {
                field_name: f.name,
                column_name,
                read: f.read,
                write: f.write,
            });
        }

        Ok(Self {
            type_name: def.type_name,
            table_name,
            id: def.id,
            fields,
            by_field,
            by_column,
        })
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Non-id fields in canonical order.
    pub fn fields(&self) -> &[FieldDescriptor<E>] {
        &self.fields
    }

    pub fn field(&self, field_name: &str) -> Option<&FieldDescriptor<E>> {
        self.by_field.get(field_name).map(|&i| &self.fields[i])
    }

    /// Finds the field backing a result-set column, by snake-to-camel conversion
    /// first and then by exact column name.
    pub fn field_for_column(&self, column: &str) -> Option<&FieldDescriptor<E>> {
        let lower = column.to_ascii_lowercase();
        self.by_field
            .get(&snake_to_camel(&lower))
            .or_else(|| self.by_column.get(&lower))
            .map(|&i| &self.fields[i])
    }

    fn id_accessor(&self) -> DaoResult<&IdAccessor<E>> {
        self.id.as_ref().ok_or_else(|| {
            DaoError::Configuration(format!("{}: no `id` accessor declared", self.type_name))
        })
    }

    /// Reads the primary key; empty when not yet assigned.
    pub fn id_of(&self, entity: &E) -> DaoResult<String> {
        Ok((self.id_accessor()?.get)(entity))
    }

    pub fn set_id(&self, entity: &mut E, id: String) -> DaoResult<()> {
        (self.id_accessor()?.set)(entity, id);
        Ok(())
    }

    /// `(field, current value)` pairs for all non-id fields.
    pub fn values<'a>(
        &'a self,
        entity: &'a E,
    ) -> impl Iterator<Item = (&'a FieldDescriptor<E>, Value)> + 'a {
        self.fields.iter().map(move |f| (f, f.read(entity)))
    }

    /// The bean parameter source: `id` plus every non-id field name.
    pub fn params_of(&self, entity: &E) -> Params {
        let mut params: Params = self
            .values(entity)
            .map(|(f, v)| (f.field_name.clone(), v))
            .collect();
        if let Some(acc) = &self.id {
            params.insert(ID, (acc.get)(entity));
        }
        params
    }
}

impl<E> fmt::Debug for EntityDescriptor<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityDescriptor")
            .field("type_name", &self.type_name)
            .field("table_name", &self.table_name)
            .field("has_id", &self.id.is_some())
            .field("fields", &self.fields)
            .finish()
    }
}

/// Generic bean-style row mapper: every column is routed to the matching
/// field's write accessor; columns without a matching field are ignored.
pub struct BeanRowMapper<'a, E> {
    descriptor: &'a EntityDescriptor<E>,
    _marker: PhantomData<fn() -> E>,
}

impl<'a, E> BeanRowMapper<'a, E> {
    pub fn new(descriptor: &'a EntityDescriptor<E>) -> Self {
        Self {
            descriptor,
            _marker: PhantomData,
        }
    }
}

impl<'a, E: Default> RowMapper<E> for BeanRowMapper<'a, E> {
    fn map_row(&self, row: &Row, _row_num: usize) -> DaoResult<E> {
        let mut entity = E::default();
        for (column, value) in row.columns() {
            if column.eq_ignore_ascii_case(ID) {
                let id = match value {
                    Value::Null => String::new(),
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                self.descriptor.set_id(&mut entity, id)?;
            } else if let Some(field) = self.descriptor.field_for_column(column) {
                field.write(&mut entity, value.clone())?;
            }
        }
        Ok(entity)
    }
}
