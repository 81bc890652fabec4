use std::sync::Arc;

use dashmap::DashMap;

use crate::core::{PersistError, Result};

use super::adapter::TypeAdapter;
use super::defaults;
use super::descriptor::{Persist, TypeDescriptor};

/// Registry of type adapters keyed by type descriptor.
///
/// Written during setup and read on every field of every object afterwards,
/// so it sits on a sharded concurrent map rather than a single lock.
#[derive(Debug, Default)]
pub struct AdapterRegistry {
    adapters: DashMap<TypeDescriptor, Arc<TypeAdapter>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self {
            adapters: DashMap::new(),
        }
    }

    /// Registry pre-populated with the built-in adapters.
    pub fn with_default_adapters() -> Self {
        let registry = Self::new();
        for adapter in defaults::builtin_adapters() {
            registry.insert(adapter);
        }
        registry
    }

    /// Inserts or replaces the adapter for `descriptor`.
    pub fn register(&self, descriptor: TypeDescriptor, adapter: TypeAdapter) -> Result<()> {
        if !adapter.has_any_capability() {
            return Err(PersistError::InvalidAdapter(format!(
                "adapter for {} has no capabilities",
                descriptor
            )));
        }
        if adapter.descriptor() != &descriptor {
            return Err(PersistError::InvalidAdapter(format!(
                "adapter built for {} cannot be registered for {}",
                adapter.descriptor(),
                descriptor
            )));
        }

        self.insert(adapter);
        Ok(())
    }

    fn insert(&self, adapter: TypeAdapter) {
        let descriptor = adapter.descriptor().clone();
        log::debug!(
            "Registered adapter for {} ({})",
            descriptor,
            adapter
                .capabilities()
                .iter()
                .map(|capability| capability.name())
                .collect::<Vec<_>>()
                .join(", ")
        );
        if self.adapters.insert(descriptor, Arc::new(adapter)).is_some() {
            log::debug!("Previous adapter replaced");
        }
    }

    pub fn register_type<T: Persist>(&self, adapter: TypeAdapter) -> Result<()> {
        self.register(T::descriptor(), adapter)
    }

    /// The returned adapter is detached from the map, so adapters may call
    /// back into the registry while using it.
    pub fn lookup(&self, descriptor: &TypeDescriptor) -> Option<Arc<TypeAdapter>> {
        self.adapters.get(descriptor).map(|entry| Arc::clone(entry.value()))
    }

    pub fn lookup_type<T: Persist>(&self) -> Option<Arc<TypeAdapter>> {
        self.lookup(&T::descriptor())
    }

    /// Like [`lookup`](Self::lookup), failing with `UnsupportedType`.
    pub fn require(&self, descriptor: &TypeDescriptor) -> Result<Arc<TypeAdapter>> {
        self.lookup(descriptor)
            .ok_or_else(|| PersistError::UnsupportedType(descriptor.to_string()))
    }

    pub fn contains(&self, descriptor: &TypeDescriptor) -> bool {
        self.adapters.contains_key(descriptor)
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    pub fn descriptors(&self) -> Vec<TypeDescriptor> {
        self.adapters.iter().map(|entry| entry.key().clone()).collect()
    }
}
