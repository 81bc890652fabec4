//! Per-type field tables: the persistable fields of a struct, their type
//! descriptors, and how to read, assign and route them through setters.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::core::Result;

use super::adapter::downcast_owned;
use super::descriptor::{AnyValue, FieldSlot, Persist, TypeDescriptor};

/// Type-erased access to one field of `O`.
pub trait FieldAccess<O>: Send + Sync {
    /// Current value, or `None` when an optional field is empty.
    fn read<'a>(&self, object: &'a O) -> Option<&'a dyn Any>;

    /// Direct assignment. `value` must hold the field's inner type.
    fn assign(&self, object: &mut O, value: AnyValue) -> Result<()>;

    /// Default text form of the current value, used when no adapter exists.
    fn fallback_text(&self, object: &O) -> Option<String>;
}

/// Setter override invoked on load instead of direct assignment.
pub trait FieldSetter<O>: Send + Sync {
    fn name(&self) -> &'static str;

    fn invoke(&self, object: &mut O, value: AnyValue) -> Result<()>;
}

struct SlotAccess<O, S> {
    get: fn(&O) -> &S,
    get_mut: fn(&mut O) -> &mut S,
}

impl<O: 'static, S: FieldSlot> FieldAccess<O> for SlotAccess<O, S> {
    fn read<'a>(&self, object: &'a O) -> Option<&'a dyn Any> {
        (self.get)(object).present().map(|value| value as &dyn Any)
    }

    fn assign(&self, object: &mut O, value: AnyValue) -> Result<()> {
        let value = downcast_owned::<S::Inner>(value)?;
        (self.get_mut)(object).fill(value);
        Ok(())
    }

    fn fallback_text(&self, object: &O) -> Option<String> {
        (self.get)(object).present().map(<S::Inner as Persist>::default_text)
    }
}

struct SlotSetter<O, T> {
    name: &'static str,
    call: fn(&mut O, T) -> Result<()>,
}

impl<O: 'static, T: Persist> FieldSetter<O> for SlotSetter<O, T> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn invoke(&self, object: &mut O, value: AnyValue) -> Result<()> {
        (self.call)(object, downcast_owned::<T>(value)?)
    }
}

/// Field access of an embedded ancestor struct `B`, seen from `O`.
struct Embedded<O, B> {
    inner: Arc<dyn FieldAccess<B>>,
    get: fn(&O) -> &B,
    get_mut: fn(&mut O) -> &mut B,
}

impl<O: 'static, B: 'static> FieldAccess<O> for Embedded<O, B> {
    fn read<'a>(&self, object: &'a O) -> Option<&'a dyn Any> {
        self.inner.read((self.get)(object))
    }

    fn assign(&self, object: &mut O, value: AnyValue) -> Result<()> {
        self.inner.assign((self.get_mut)(object), value)
    }

    fn fallback_text(&self, object: &O) -> Option<String> {
        self.inner.fallback_text((self.get)(object))
    }
}

struct EmbeddedSetter<O, B> {
    inner: Arc<dyn FieldSetter<B>>,
    get_mut: fn(&mut O) -> &mut B,
}

impl<O: 'static, B: 'static> FieldSetter<O> for EmbeddedSetter<O, B> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn invoke(&self, object: &mut O, value: AnyValue) -> Result<()> {
        self.inner.invoke((self.get_mut)(object), value)
    }
}

/// Metadata for one persistable field of `O`.
pub struct FieldDescriptor<O> {
    name: &'static str,
    descriptor: TypeDescriptor,
    access: Arc<dyn FieldAccess<O>>,
    setter: Option<Arc<dyn FieldSetter<O>>>,
}

impl<O> Clone for FieldDescriptor<O> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            descriptor: self.descriptor.clone(),
            access: Arc::clone(&self.access),
            setter: self.setter.clone(),
        }
    }
}

impl<O> FieldDescriptor<O> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    pub fn setter_name(&self) -> Option<&'static str> {
        self.setter.as_ref().map(|setter| setter.name())
    }

    pub fn read<'a>(&self, object: &'a O) -> Option<&'a dyn Any> {
        self.access.read(object)
    }

    pub fn fallback_text(&self, object: &O) -> Option<String> {
        self.access.fallback_text(object)
    }

    /// Stores a decoded value: through the setter override when one is
    /// declared, by direct assignment otherwise. Never both.
    pub fn store(&self, object: &mut O, value: AnyValue) -> Result<()> {
        match &self.setter {
            Some(setter) => setter.invoke(object, value),
            None => self.access.assign(object, value),
        }
    }
}

impl<O> fmt::Debug for FieldDescriptor<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("descriptor", &self.descriptor)
            .field("setter", &self.setter_name())
            .finish()
    }
}

/// Typed builder for a [`FieldDescriptor`] over a struct field of shape `S`.
pub struct SlotField<O, S: FieldSlot> {
    name: &'static str,
    access: SlotAccess<O, S>,
    setter: Option<SlotSetter<O, S::Inner>>,
}

impl<O: 'static, S: FieldSlot> SlotField<O, S> {
    pub fn new(name: &'static str, get: fn(&O) -> &S, get_mut: fn(&mut O) -> &mut S) -> Self {
        Self {
            name,
            access: SlotAccess { get, get_mut },
            setter: None,
        }
    }

    pub fn setter(mut self, name: &'static str, call: fn(&mut O, S::Inner) -> Result<()>) -> Self {
        self.setter = Some(SlotSetter { name, call });
        self
    }
}

impl<O: 'static, S: FieldSlot> From<SlotField<O, S>> for FieldDescriptor<O> {
    fn from(field: SlotField<O, S>) -> Self {
        Self {
            name: field.name,
            descriptor: <S::Inner as Persist>::descriptor(),
            access: Arc::new(field.access),
            setter: field
                .setter
                .map(|setter| Arc::new(setter) as Arc<dyn FieldSetter<O>>),
        }
    }
}

/// Ordered field list of one persistable type, ancestors first.
pub struct FieldTable<O> {
    fields: Vec<FieldDescriptor<O>>,
}

impl<O: 'static> FieldTable<O> {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Appends a field. A field with the same name as an earlier one (for
    /// example an ancestor field) takes its place; the replaced entry is
    /// returned and no longer saved or loaded.
    pub fn push(&mut self, field: impl Into<FieldDescriptor<O>>) -> Option<FieldDescriptor<O>> {
        let field = field.into();
        match self.fields.iter().position(|f| f.name == field.name) {
            Some(idx) => {
                log::warn!(
                    "Field '{}' of {} is declared twice; the later declaration hides the earlier one",
                    field.name,
                    std::any::type_name::<O>()
                );
                Some(std::mem::replace(&mut self.fields[idx], field))
            }
            None => {
                self.fields.push(field);
                None
            }
        }
    }

    /// Lifts every field of an embedded struct `B` into this table.
    pub fn extend<B: 'static>(
        &mut self,
        base: &FieldTable<B>,
        get: fn(&O) -> &B,
        get_mut: fn(&mut O) -> &mut B,
    ) {
        for field in base.iter() {
            self.push(FieldDescriptor {
                name: field.name,
                descriptor: field.descriptor.clone(),
                access: Arc::new(Embedded {
                    inner: Arc::clone(&field.access),
                    get,
                    get_mut,
                }),
                setter: field.setter.as_ref().map(|setter| {
                    Arc::new(EmbeddedSetter {
                        inner: Arc::clone(setter),
                        get_mut,
                    }) as Arc<dyn FieldSetter<O>>
                }),
            });
        }
    }
}

impl<O> FieldTable<O> {
    pub fn iter(&self) -> std::slice::Iter<'_, FieldDescriptor<O>> {
        self.fields.iter()
    }

    pub fn get(&self, name: &str) -> Option<&FieldDescriptor<O>> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|field| field.name).collect()
    }
}

impl<O: 'static> Default for FieldTable<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, O> IntoIterator for &'a FieldTable<O> {
    type Item = &'a FieldDescriptor<O>;
    type IntoIter = std::slice::Iter<'a, FieldDescriptor<O>>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

/// A struct whose fields can be walked by the save/load engine.
///
/// Usually implemented with [`persist_object!`](crate::persist_object).
pub trait PersistObject: Sized + 'static {
    fn fields() -> &'static FieldTable<Self>;
}

/// Argument of the construction entry point used by load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitMarker {
    name: String,
}

impl InitMarker {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A persistable struct that load can construct before filling its fields.
pub trait PersistLoad: PersistObject {
    /// Builds the default instance; every field not found in the record
    /// keeps the value set here.
    fn construct(marker: InitMarker) -> Result<Self>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PersistError;

    #[derive(Default)]
    struct Base {
        id: i32,
    }

    #[derive(Default)]
    struct Child {
        base: Base,
        label: Option<String>,
        changes: u32,
        rank: i32,
    }

    impl Child {
        fn set_label(&mut self, label: String) -> Result<()> {
            if label.is_empty() {
                return Err(PersistError::field_access("label", "empty label"));
            }
            self.changes += 1;
            self.label = Some(label.to_uppercase());
            Ok(())
        }
    }

    fn base_table() -> FieldTable<Base> {
        let mut table = FieldTable::new();
        table.push(SlotField::<Base, i32>::new("id", |b| &b.id, |b| &mut b.id));
        table
    }

    fn child_table(base: &FieldTable<Base>) -> FieldTable<Child> {
        let mut table: FieldTable<Child> = FieldTable::new();
        table.extend(base, |c| &c.base, |c| &mut c.base);
        table.push(
            SlotField::<Child, Option<String>>::new("label", |c| &c.label, |c| &mut c.label)
                .setter("set_label", Child::set_label),
        );
        table
    }

    #[test]
    fn test_table_lists_ancestor_fields_first() {
        let base = base_table();
        let table = child_table(&base);
        assert_eq!(table.names(), vec!["id", "label"]);
        assert_eq!(table.get("id").unwrap().descriptor(), &i32::descriptor());
        assert_eq!(table.get("label").unwrap().descriptor(), &String::descriptor());
        assert_eq!(table.get("label").unwrap().setter_name(), Some("set_label"));
    }

    #[test]
    fn test_field_shadowing_an_ancestor_field_is_reported() {
        let base = base_table();
        let mut table = FieldTable::<Child>::new();
        table.extend(&base, |c| &c.base, |c| &mut c.base);

        let shadowed = table.push(SlotField::<Child, i32>::new("id", |c| &c.rank, |c| &mut c.rank));
        assert_eq!(shadowed.map(|field| field.name()), Some("id"));
        assert_eq!(table.len(), 1);

        let mut child = Child::default();
        table.get("id").unwrap().store(&mut child, Box::new(4i32)).unwrap();
        assert_eq!(child.rank, 4);
        assert_eq!(child.base.id, 0);
    }

    #[test]
    fn test_read_and_store_through_embedded_access() {
        let base = base_table();
        let table = child_table(&base);
        let mut child = Child::default();

        let id = table.get("id").unwrap();
        id.store(&mut child, Box::new(7i32)).unwrap();
        assert_eq!(child.base.id, 7);
        assert_eq!(id.read(&child).and_then(|v| v.downcast_ref::<i32>()), Some(&7));
        assert_eq!(id.fallback_text(&child).as_deref(), Some("7"));
    }

    #[test]
    fn test_store_routes_through_setter() {
        let base = base_table();
        let table = child_table(&base);
        let mut child = Child::default();
        let label = table.get("label").unwrap();

        assert!(label.read(&child).is_none());
        label.store(&mut child, Box::new("north".to_string())).unwrap();
        assert_eq!(child.label.as_deref(), Some("NORTH"));
        assert_eq!(child.changes, 1);

        assert!(label.store(&mut child, Box::new(String::new())).is_err());
        let err = label.store(&mut child, Box::new(3i32)).unwrap_err();
        assert!(matches!(err, PersistError::TypeMismatch(_)));
        assert_eq!(child.changes, 1);
    }
}
