//! Registry: the ordered, duplicate-rejecting collection every manager
//! builds on.
//!
//! A registry holds non-owning `Arc` handles to entities of one capability
//! type, in insertion order. Membership is by reference identity, the scan
//! is O(n), and the expected scale is tens of entities. Failed operations
//! are reported to the caller as `false` and to the log as a warning; they
//! never panic and never silently drop an entity.

use crate::entity::same_entity;
use std::sync::Arc;

/// Insertion-ordered, duplicate-free set of entity handles.
pub struct Registry<T: ?Sized> {
    /// Manager name used in duplicate-operation warnings.
    name: &'static str,
    items: Vec<Arc<T>>,
}

impl<T: ?Sized> Registry<T> {
    /// Create an empty registry for the manager with the given name.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            items: Vec::new(),
        }
    }

    /// Register an entity.
    ///
    /// Returns `true` on success; returns `false` and warns if the entity
    /// is already registered, leaving the registry unchanged.
    pub fn register(&mut self, item: Arc<T>) -> bool {
        if self.position(&item).is_some() {
            log::warn!(
                "Attempting to register {:p} with the {} manager when it is already registered",
                Arc::as_ptr(&item),
                self.name
            );
            return false;
        }
        self.items.push(item);
        true
    }

    /// Unregister an entity.
    ///
    /// Returns `true` on success; returns `false` and warns if the entity
    /// was not registered, leaving the registry unchanged.
    pub fn unregister(&mut self, item: &Arc<T>) -> bool {
        let Some(index) = self.position(item) else {
            log::warn!(
                "Attempting to un-register {:p} with the {} manager when it was not registered",
                Arc::as_ptr(item),
                self.name
            );
            return false;
        };
        self.items.remove(index);
        true
    }

    /// Position of the entity in insertion order, if registered.
    pub fn position(&self, item: &Arc<T>) -> Option<usize> {
        self.items.iter().position(|i| same_entity(i, item))
    }

    /// Whether the entity is registered.
    pub fn contains(&self, item: &Arc<T>) -> bool {
        self.position(item).is_some()
    }

    /// Snapshot of all registered entities in insertion order.
    ///
    /// The returned handles are clones; mutations made to the registry
    /// after the call are not observable through the snapshot.
    pub fn registered(&self) -> Vec<Arc<T>> {
        self.items.clone()
    }

    /// Iterate registered entities in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Arc<T>> {
        self.items.iter()
    }

    /// Number of registered entities.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<'a, T: ?Sized> IntoIterator for &'a Registry<T> {
    type Item = &'a Arc<T>;
    type IntoIter = std::slice::Iter<'a, Arc<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
