//! Type adapters: up to four independent conversion capabilities for one
//! type descriptor.
//!
//! Adapters are written against typed handler traits and erased by
//! [`AdapterBuilder`] so the registry can hold them behind one key type.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::core::{DataType, PersistError, Result, SqlData, Value};

use super::descriptor::{AnyValue, Persist, TypeDescriptor};
use super::registry::AdapterRegistry;

/// Encodes a value into its flat-file text.
pub trait SaveHandler<T>: Send + Sync {
    fn to_file_string(&self, value: &T, registry: &AdapterRegistry) -> Result<String>;
}

/// Decodes flat-file text. `Ok(None)` means "no value": the field is skipped.
pub trait LoadHandler<T>: Send + Sync {
    fn from_file_string(&self, text: &str, registry: &AdapterRegistry) -> Result<Option<T>>;
}

/// Encodes a value for the SQL layer.
pub trait SqlSaveHandler<T>: Send + Sync {
    /// Column type of every value this handler produces, including nulls.
    fn sql_type(&self) -> DataType;

    fn to_sql(&self, value: &T, registry: &AdapterRegistry) -> Result<Value>;
}

/// Decodes a raw SQL value.
pub trait SqlLoadHandler<T>: Send + Sync {
    fn from_sql(&self, value: &Value, registry: &AdapterRegistry) -> Result<Option<T>>;
}

impl<T, H: SaveHandler<T> + ?Sized> SaveHandler<T> for Arc<H> {
    fn to_file_string(&self, value: &T, registry: &AdapterRegistry) -> Result<String> {
        (**self).to_file_string(value, registry)
    }
}

impl<T, H: LoadHandler<T> + ?Sized> LoadHandler<T> for Arc<H> {
    fn from_file_string(&self, text: &str, registry: &AdapterRegistry) -> Result<Option<T>> {
        (**self).from_file_string(text, registry)
    }
}

impl<T, H: SqlSaveHandler<T> + ?Sized> SqlSaveHandler<T> for Arc<H> {
    fn sql_type(&self) -> DataType {
        (**self).sql_type()
    }

    fn to_sql(&self, value: &T, registry: &AdapterRegistry) -> Result<Value> {
        (**self).to_sql(value, registry)
    }
}

impl<T, H: SqlLoadHandler<T> + ?Sized> SqlLoadHandler<T> for Arc<H> {
    fn from_sql(&self, value: &Value, registry: &AdapterRegistry) -> Result<Option<T>> {
        (**self).from_sql(value, registry)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    SaveText,
    LoadText,
    SaveSql,
    LoadSql,
}

impl Capability {
    pub const ALL: [Capability; 4] = [
        Capability::SaveText,
        Capability::LoadText,
        Capability::SaveSql,
        Capability::LoadSql,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::SaveText => "save-to-text",
            Self::LoadText => "load-from-text",
            Self::SaveSql => "save-to-sql",
            Self::LoadSql => "load-from-sql",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

type SaveTextFn = Arc<dyn Fn(&dyn Any, &AdapterRegistry) -> Result<String> + Send + Sync>;
type LoadTextFn = Arc<dyn Fn(&str, &AdapterRegistry) -> Result<Option<AnyValue>> + Send + Sync>;
type SaveSqlFn = Arc<dyn Fn(&dyn Any, &AdapterRegistry) -> Result<Value> + Send + Sync>;
type LoadSqlFn = Arc<dyn Fn(&Value, &AdapterRegistry) -> Result<Option<AnyValue>> + Send + Sync>;

/// Immutable bundle of optional conversion capabilities for one descriptor.
#[derive(Clone)]
pub struct TypeAdapter {
    descriptor: TypeDescriptor,
    save_text: Option<SaveTextFn>,
    load_text: Option<LoadTextFn>,
    save_sql: Option<(DataType, SaveSqlFn)>,
    load_sql: Option<LoadSqlFn>,
}

impl TypeAdapter {
    pub fn builder<T: Persist>() -> AdapterBuilder<T> {
        AdapterBuilder {
            adapter: TypeAdapter {
                descriptor: T::descriptor(),
                save_text: None,
                load_text: None,
                save_sql: None,
                load_sql: None,
            },
            _marker: PhantomData,
        }
    }

    /// Descriptor of the values this adapter was built for.
    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    pub fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::SaveText => self.save_text.is_some(),
            Capability::LoadText => self.load_text.is_some(),
            Capability::SaveSql => self.save_sql.is_some(),
            Capability::LoadSql => self.load_sql.is_some(),
        }
    }

    pub fn capabilities(&self) -> Vec<Capability> {
        Capability::ALL
            .into_iter()
            .filter(|capability| self.supports(*capability))
            .collect()
    }

    pub fn has_any_capability(&self) -> bool {
        Capability::ALL.iter().any(|capability| self.supports(*capability))
    }

    /// Fails with `UnsupportedCapability` unless `capability` is present.
    pub fn require(&self, capability: Capability) -> Result<()> {
        if self.supports(capability) {
            Ok(())
        } else {
            Err(self.unsupported(capability))
        }
    }

    fn unsupported(&self, capability: Capability) -> PersistError {
        PersistError::UnsupportedCapability {
            descriptor: self.descriptor.to_string(),
            capability: capability.name(),
        }
    }

    pub fn save_text(&self, value: &dyn Any, registry: &AdapterRegistry) -> Result<String> {
        let save = self
            .save_text
            .as_ref()
            .ok_or_else(|| self.unsupported(Capability::SaveText))?;
        save(value, registry)
    }

    pub fn load_text(&self, text: &str, registry: &AdapterRegistry) -> Result<Option<AnyValue>> {
        let load = self
            .load_text
            .as_ref()
            .ok_or_else(|| self.unsupported(Capability::LoadText))?;
        load(text, registry)
    }

    pub fn sql_type(&self) -> Result<DataType> {
        self.save_sql
            .as_ref()
            .map(|(data_type, _)| *data_type)
            .ok_or_else(|| self.unsupported(Capability::SaveSql))
    }

    pub fn save_sql(&self, value: &dyn Any, registry: &AdapterRegistry) -> Result<SqlData> {
        let (data_type, save) = self
            .save_sql
            .as_ref()
            .ok_or_else(|| self.unsupported(Capability::SaveSql))?;
        let data = SqlData::new(*data_type, save(value, registry)?);
        data.validate()?;
        Ok(data)
    }

    pub fn load_sql(&self, value: &Value, registry: &AdapterRegistry) -> Result<Option<AnyValue>> {
        let load = self
            .load_sql
            .as_ref()
            .ok_or_else(|| self.unsupported(Capability::LoadSql))?;
        load(value, registry)
    }

    pub fn to_file_string<T: Persist>(&self, value: &T, registry: &AdapterRegistry) -> Result<String> {
        self.save_text(value, registry)
    }

    pub fn from_file_string<T: Persist>(
        &self,
        text: &str,
        registry: &AdapterRegistry,
    ) -> Result<Option<T>> {
        self.load_text(text, registry)?.map(downcast_owned::<T>).transpose()
    }

    pub fn to_sql<T: Persist>(&self, value: &T, registry: &AdapterRegistry) -> Result<SqlData> {
        self.save_sql(value, registry)
    }

    pub fn from_sql<T: Persist>(&self, value: &Value, registry: &AdapterRegistry) -> Result<Option<T>> {
        self.load_sql(value, registry)?.map(downcast_owned::<T>).transpose()
    }
}

impl fmt::Debug for TypeAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeAdapter")
            .field("descriptor", &self.descriptor)
            .field("capabilities", &self.capabilities())
            .finish()
    }
}

/// Typed construction of a [`TypeAdapter`]; each call adds one capability.
pub struct AdapterBuilder<T> {
    adapter: TypeAdapter,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Persist> AdapterBuilder<T> {
    pub fn save<H: SaveHandler<T> + 'static>(mut self, handler: H) -> Self {
        let save: SaveTextFn = Arc::new(move |value: &dyn Any, registry: &AdapterRegistry| {
            handler.to_file_string(downcast_ref::<T>(value)?, registry)
        });
        self.adapter.save_text = Some(save);
        self
    }

    pub fn load<H: LoadHandler<T> + 'static>(mut self, handler: H) -> Self {
        let load: LoadTextFn = Arc::new(move |text: &str, registry: &AdapterRegistry| {
            let value = handler.from_file_string(text, registry)?;
            Ok(value.map(|value| Box::new(value) as AnyValue))
        });
        self.adapter.load_text = Some(load);
        self
    }

    pub fn sql_save<H: SqlSaveHandler<T> + 'static>(mut self, handler: H) -> Self {
        let data_type = handler.sql_type();
        let save: SaveSqlFn = Arc::new(move |value: &dyn Any, registry: &AdapterRegistry| {
            handler.to_sql(downcast_ref::<T>(value)?, registry)
        });
        self.adapter.save_sql = Some((data_type, save));
        self
    }

    pub fn sql_load<H: SqlLoadHandler<T> + 'static>(mut self, handler: H) -> Self {
        let load: LoadSqlFn = Arc::new(move |value: &Value, registry: &AdapterRegistry| {
            let value = handler.from_sql(value, registry)?;
            Ok(value.map(|value| Box::new(value) as AnyValue))
        });
        self.adapter.load_sql = Some(load);
        self
    }

    /// Registers one handler for both flat-file capabilities.
    pub fn text<H>(self, handler: H) -> Self
    where
        H: SaveHandler<T> + LoadHandler<T> + 'static,
    {
        let handler = Arc::new(handler);
        self.save(Arc::clone(&handler)).load(handler)
    }

    /// Registers one handler for all four capabilities.
    pub fn full<H>(self, handler: H) -> Self
    where
        H: SaveHandler<T> + LoadHandler<T> + SqlSaveHandler<T> + SqlLoadHandler<T> + 'static,
    {
        let handler = Arc::new(handler);
        self.save(Arc::clone(&handler))
            .load(Arc::clone(&handler))
            .sql_save(Arc::clone(&handler))
            .sql_load(handler)
    }

    /// Finishes the adapter. Capability presence is checked on registration.
    pub fn build(self) -> TypeAdapter {
        self.adapter
    }
}

pub(crate) fn downcast_ref<T: Persist>(value: &dyn Any) -> Result<&T> {
    value.downcast_ref::<T>().ok_or_else(|| {
        PersistError::TypeMismatch(format!("expected a value of type {}", T::descriptor()))
    })
}

pub(crate) fn downcast_owned<T: Persist>(value: AnyValue) -> Result<T> {
    value.downcast::<T>().map(|boxed| *boxed).map_err(|_| {
        PersistError::TypeMismatch(format!("adapter produced a value that is not a {}", T::descriptor()))
    })
}
