//! Concurrent name -> binding table
//!
//! Uses DashMap, whose shards are reader/writer locks held only for the
//! duration of a single map read or write.

use crate::factory::{Binding, EntryState};
use ahash::RandomState;
use dashmap::DashMap;
use std::sync::Arc;

/// Thread-safe storage for service bindings
pub(crate) struct ServiceStorage {
    /// Map from service name to binding
    bindings: DashMap<Arc<str>, Binding, RandomState>,
}

impl ServiceStorage {
    /// Create new empty storage.
    ///
    /// Uses 8 shards; default DashMap uses num_cpus * 4 shards which is
    /// overkill for typical registries with <50 services.
    #[inline]
    pub fn new() -> Self {
        Self {
            bindings: DashMap::with_capacity_and_hasher_and_shard_amount(
                0,
                RandomState::new(),
                8,
            ),
        }
    }

    /// Create with pre-allocated capacity, scaling shards with it.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        let shard_amount = if capacity <= 16 {
            8
        } else if capacity <= 64 {
            16
        } else {
            32
        };
        Self {
            bindings: DashMap::with_capacity_and_hasher_and_shard_amount(
                capacity,
                RandomState::new(),
                shard_amount,
            ),
        }
    }

    /// Insert a binding, replacing any previous one. Returns true if a
    /// binding was replaced.
    #[inline]
    pub fn insert(&self, name: Arc<str>, binding: Binding) -> bool {
        self.bindings.insert(name, binding).is_some()
    }

    /// Copy the binding out so the shard lock is released before resolving.
    #[inline]
    pub fn get(&self, name: &str) -> Option<Binding> {
        self.bindings.get(name).map(|entry| entry.value().clone())
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    #[inline]
    pub fn state(&self, name: &str) -> Option<EntryState> {
        self.bindings.get(name).map(|entry| entry.value().state())
    }

    /// All registered names, in no particular order
    pub fn names(&self) -> Vec<String> {
        self.bindings.iter().map(|r| r.key().to_string()).collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl Default for ServiceStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ServiceStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceStorage")
            .field("count", &self.len())
            .finish()
    }
}
