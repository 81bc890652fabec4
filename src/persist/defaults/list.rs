use std::marker::PhantomData;

use crate::core::{DataType, PersistError, Result, Value};
use crate::persist::adapter::{LoadHandler, SaveHandler, SqlLoadHandler, SqlSaveHandler};
use crate::persist::descriptor::Persist;
use crate::persist::registry::AdapterRegistry;

/// Adapter for `Vec<T>` that delegates every element to the adapter
/// registered for `T` and joins the results with a separator.
///
/// The empty string is the empty list. Elements that decode to "no value"
/// are dropped. A separator or backslash inside an element's text is
/// escaped with a backslash.
pub struct ListAdapter<T> {
    separator: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Persist> ListAdapter<T> {
    pub fn new(separator: &'static str) -> Self {
        Self {
            separator,
            _marker: PhantomData,
        }
    }

    pub fn separator(&self) -> &'static str {
        self.separator
    }

    fn encode(&self, values: &[T], registry: &AdapterRegistry) -> Result<String> {
        let element = registry.require(&T::descriptor())?;
        let parts = values
            .iter()
            .map(|value| {
                element
                    .to_file_string(value, registry)
                    .map(|text| self.escape(&text))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(parts.join(self.separator))
    }

    fn decode(&self, text: &str, registry: &AdapterRegistry) -> Result<Vec<T>> {
        if text.is_empty() {
            return Ok(Vec::new());
        }
        let element = registry.require(&T::descriptor())?;
        let mut values = Vec::new();
        for part in self.split(text) {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            if let Some(value) = element.from_file_string::<T>(part, registry)? {
                values.push(value);
            }
        }
        Ok(values)
    }

    fn escape(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(c) = rest.chars().next() {
            if rest.starts_with(self.separator) {
                out.push('\\');
                out.push_str(self.separator);
                rest = &rest[self.separator.len()..];
                continue;
            }
            if c == '\\' {
                out.push('\\');
            }
            out.push(c);
            rest = &rest[c.len_utf8()..];
        }
        out
    }

    /// Splits on unescaped separators and removes the escapes.
    fn split(&self, text: &str) -> Vec<String> {
        let mut parts = Vec::new();
        let mut current = String::new();
        let mut rest = text;
        while let Some(c) = rest.chars().next() {
            if c == '\\' {
                rest = &rest[1..];
                if rest.starts_with(self.separator) {
                    current.push_str(self.separator);
                    rest = &rest[self.separator.len()..];
                } else if let Some(next) = rest.chars().next() {
                    current.push(next);
                    rest = &rest[next.len_utf8()..];
                }
                continue;
            }
            if rest.starts_with(self.separator) {
                parts.push(std::mem::take(&mut current));
                rest = &rest[self.separator.len()..];
                continue;
            }
            current.push(c);
            rest = &rest[c.len_utf8()..];
        }
        parts.push(current);
        parts
    }
}

impl<T: Persist> SaveHandler<Vec<T>> for ListAdapter<T> {
    fn to_file_string(&self, value: &Vec<T>, registry: &AdapterRegistry) -> Result<String> {
        self.encode(value, registry)
    }
}

impl<T: Persist> LoadHandler<Vec<T>> for ListAdapter<T> {
    fn from_file_string(&self, text: &str, registry: &AdapterRegistry) -> Result<Option<Vec<T>>> {
        self.decode(text, registry).map(Some)
    }
}

impl<T: Persist> SqlSaveHandler<Vec<T>> for ListAdapter<T> {
    fn sql_type(&self) -> DataType {
        DataType::Text
    }

    fn to_sql(&self, value: &Vec<T>, registry: &AdapterRegistry) -> Result<Value> {
        self.encode(value, registry).map(Value::Text)
    }
}

impl<T: Persist> SqlLoadHandler<Vec<T>> for ListAdapter<T> {
    fn from_sql(&self, value: &Value, registry: &AdapterRegistry) -> Result<Option<Vec<T>>> {
        let text = value.as_str().ok_or_else(|| {
            PersistError::TypeMismatch(format!("list expects a text column, got {}", value.type_name()))
        })?;
        self.decode(text, registry).map(Some)
    }
}
