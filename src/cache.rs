//! Entity cache module
//!
//! This module provides the session-scoped, in-memory cache of entities keyed
//! by id. It lives as long as the [`Repository`](crate::repository::Repository)
//! that owns it; there is no eviction and no expiry.

use crate::model::EntityId;
use parking_lot::RwLock;
use std::collections::HashMap;

/// An unbounded map from entity id to the last known entity
///
/// Reads and writes may come from any number of callers. Two writers storing
/// the same id race benignly: the last write wins and both carry the same
/// data.
#[derive(Debug)]
pub struct EntityCache<E> {
    entries: RwLock<HashMap<EntityId, E>>,
}

impl<E> Default for EntityCache<E> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<E: Clone> EntityCache<E> {
    /// Creates an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached entity for `id`, if any
    ///
    /// Never triggers any network activity.
    pub fn get(&self, id: EntityId) -> Option<E> {
        self.entries.read().get(&id).cloned()
    }

    /// Stores `entity` under `id`, replacing any previous entry
    pub fn put(&self, id: EntityId, entity: E) {
        self.entries.write().insert(id, entity);
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entries.read().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_on_empty_cache() {
        let cache: EntityCache<String> = EntityCache::new();
        assert_eq!(cache.get(1), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_put_then_get() {
        let cache = EntityCache::new();
        cache.put(1, "Rick".to_string());
        cache.put(2, "Morty".to_string());

        assert_eq!(cache.get(1).as_deref(), Some("Rick"));
        assert_eq!(cache.get(2).as_deref(), Some("Morty"));
        assert!(cache.contains(2));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_last_write_wins() {
        let cache = EntityCache::new();
        cache.put(1, "Rick".to_string());
        cache.put(1, "Rick Sanchez".to_string());

        assert_eq!(cache.get(1).as_deref(), Some("Rick Sanchez"));
        assert_eq!(cache.len(), 1);
    }
}
