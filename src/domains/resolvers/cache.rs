//! Resource cache for expensive resolver artifacts.
//!
//! Each caching resolver owns one `ResourceCache`, its private partition.
//! Lookups are compute-if-absent: concurrent first-time callers for the same
//! key run the constructor once and all observe the same value.

use dashmap::DashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// A keyed, lazily populated store of constructed artifacts.
///
/// Entries live as long as the cache. There is no eviction.
pub struct ResourceCache<T> {
    partition: &'static str,
    entries: DashMap<String, Arc<OnceCell<T>>>,
}

impl<T: Clone> ResourceCache<T> {
    /// Create an empty cache for the named partition.
    pub fn new(partition: &'static str) -> Self {
        Self {
            partition,
            entries: DashMap::new(),
        }
    }

    /// Name of the partition (the owning resolver type).
    pub fn partition(&self) -> &'static str {
        self.partition
    }

    /// Return the cached value for `key`, if constructed.
    pub fn get(&self, key: &str) -> Option<T> {
        self.entries
            .get(key)
            .and_then(|cell| cell.value().get().cloned())
    }

    /// Whether a value has been constructed for `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.entries
            .get(key)
            .is_some_and(|cell| cell.value().initialized())
    }

    /// Number of constructed entries.
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.value().initialized())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the value for `key`, constructing it with `init` if absent.
    ///
    /// `init` runs at most once per key at a time. If it fails nothing is
    /// stored, the key's empty slot is released, and the error is returned;
    /// a later call tries again.
    pub async fn get_or_try_init<F, Fut, E>(&self, key: &str, init: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let cell = self.cell(key);
        match cell.get_or_try_init(init).await {
            Ok(value) => Ok(value.clone()),
            Err(e) => {
                // Callers still holding the cell will retry on it, so it
                // stays until the last of them gives up.
                self.entries.remove_if(key, |_, entry| {
                    !entry.initialized() && Arc::strong_count(entry) == 2
                });
                Err(e)
            }
        }
    }

    /// Fetch or insert the cell for `key`. The shard lock is released before
    /// the caller awaits on the cell.
    fn cell(&self, key: &str) -> Arc<OnceCell<T>> {
        if let Some(cell) = self.entries.get(key) {
            return Arc::clone(cell.value());
        }

        let cell = self.entries.entry(key.to_string()).or_default();
        Arc::clone(cell.value())
    }
}

impl<T: Clone> fmt::Debug for ResourceCache<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceCache")
            .field("partition", &self.partition)
            .field("len", &self.len())
            .finish()
    }
}
