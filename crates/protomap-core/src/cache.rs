//! Process-wide classification cache

use crate::classify::{ClassificationNode, Classifier};
use crate::error::MapperResult;
use crate::schema::{Schema, TypeDescriptor};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use once_cell::sync::OnceCell;
use std::any::TypeId;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, trace};

/// Global cache instance
static GLOBAL_CACHE: OnceCell<Arc<MapperCache>> = OnceCell::new();

/// Snapshot of cache counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache
    pub hits: u64,
    /// Classifier runs started on a miss
    pub builds: u64,
}

/// Concurrent map from type identity to its classification.
///
/// Entries are inserted once and never evicted. Concurrent misses for the same
/// type run the classifier once; the others wait on the shard lock and then
/// observe the finished node.
pub struct MapperCache {
    nodes: DashMap<TypeId, Arc<ClassificationNode>>,
    hits: AtomicU64,
    builds: AtomicU64,
}

impl MapperCache {
    /// Create a new empty cache
    pub fn new() -> Self {
        Self {
            nodes: DashMap::new(),
            hits: AtomicU64::new(0),
            builds: AtomicU64::new(0),
        }
    }

    /// Get the global cache
    pub fn global() -> Arc<MapperCache> {
        Arc::clone(GLOBAL_CACHE.get_or_init(|| Arc::new(MapperCache::new())))
    }

    /// Classification of `T`, built and stored on first use
    pub fn get_or_build<T: Schema>(&self) -> MapperResult<Arc<ClassificationNode>> {
        self.get_or_build_with(TypeId::of::<T>(), T::descriptor)
    }

    /// Classification for `type_id`, using `describe` on a miss
    pub fn get_or_build_with(
        &self,
        type_id: TypeId,
        describe: impl FnOnce() -> TypeDescriptor,
    ) -> MapperResult<Arc<ClassificationNode>> {
        if let Some(node) = self.nodes.get(&type_id) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(record = node.type_name(), "classification cache hit");
            return Ok(Arc::clone(node.value()));
        }

        // The shard lock is held until the node is published, so concurrent
        // first users wait here and then count as hits.
        match self.nodes.entry(type_id) {
            Entry::Occupied(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Ok(Arc::clone(entry.get()))
            }
            Entry::Vacant(entry) => {
                self.builds.fetch_add(1, Ordering::Relaxed);
                let node = Arc::new(Classifier::new().build(&describe())?);
                debug!(record = node.type_name(), "cached classification");
                Ok(Arc::clone(entry.insert(node).value()))
            }
        }
    }

    /// Cached classification for `type_id`, if present
    pub fn get(&self, type_id: TypeId) -> Option<Arc<ClassificationNode>> {
        self.nodes.get(&type_id).map(|r| r.clone())
    }

    /// Whether `T` has been classified
    pub fn contains<T: Schema>(&self) -> bool {
        self.nodes.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            builds: self.builds.load(Ordering::Relaxed),
        }
    }
}

impl Default for MapperCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MapperCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapperCache")
            .field("len", &self.nodes.len())
            .field("stats", &self.stats())
            .finish()
    }
}
