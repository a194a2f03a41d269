//! Bounded table-handle cache.
//!
//! Keyed memoization of `(table, endpoint) → handle` with LRU eviction at
//! a fixed capacity. The cache is an explicitly owned object for the
//! caller's composition root — nothing here is process-global.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Default capacity, matching the store client's typical connection
/// budget.
pub const DEFAULT_HANDLE_CAPACITY: usize = 128;

type CacheKey = (String, Option<String>);

struct Slot<H> {
    handle: Arc<H>,
    last_used: u64,
}

struct Inner<H> {
    slots: HashMap<CacheKey, Slot<H>>,
    tick: u64,
}

/// Bounded LRU cache of shared table handles.
///
/// Safe for concurrent lookup/insertion; entries are pure handles, safe
/// to share between callers.
pub struct HandleCache<H> {
    capacity: usize,
    inner: Mutex<Inner<H>>,
}

impl<H> HandleCache<H> {
    /// Cache with [`DEFAULT_HANDLE_CAPACITY`].
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HANDLE_CAPACITY)
    }

    /// Cache bounded to `capacity` entries (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: Mutex::new(Inner {
                slots: HashMap::new(),
                tick: 0,
            }),
        }
    }

    /// Returns the cached handle for `(table, endpoint)`, creating it via
    /// `init` on first use. Evicts the least recently used entry when the
    /// cache is full.
    pub fn get_or_create(
        &self,
        table: &str,
        endpoint: Option<&str>,
        init: impl FnOnce() -> H,
    ) -> Arc<H> {
        self.try_get_or_create(table, endpoint, || Ok::<_, std::convert::Infallible>(init()))
            .unwrap_or_else(|never| match never {})
    }

    /// Fallible variant of [`HandleCache::get_or_create`]. A failed `init`
    /// leaves the cache unchanged.
    pub fn try_get_or_create<E>(
        &self,
        table: &str,
        endpoint: Option<&str>,
        init: impl FnOnce() -> Result<H, E>,
    ) -> Result<Arc<H>, E> {
        let key: CacheKey = (table.to_string(), endpoint.map(str::to_string));
        let mut inner = self.lock_inner();
        inner.tick += 1;
        let tick = inner.tick;

        if let Some(slot) = inner.slots.get_mut(&key) {
            slot.last_used = tick;
            return Ok(slot.handle.clone());
        }

        let handle = Arc::new(init()?);
        if inner.slots.len() >= self.capacity {
            if let Some(oldest) = inner
                .slots
                .iter()
                .min_by_key(|(_, slot)| slot.last_used)
                .map(|(key, _)| key.clone())
            {
                inner.slots.remove(&oldest);
            }
        }
        inner.slots.insert(
            key,
            Slot {
                handle: handle.clone(),
                last_used: tick,
            },
        );
        Ok(handle)
    }

    /// Number of cached handles.
    pub fn len(&self) -> usize {
        self.lock_inner().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when a handle is cached for `(table, endpoint)`. Does not
    /// touch recency.
    pub fn contains(&self, table: &str, endpoint: Option<&str>) -> bool {
        let key: CacheKey = (table.to_string(), endpoint.map(str::to_string));
        self.lock_inner().slots.contains_key(&key)
    }

    /// A panicking `init` can poison the lock after only the recency tick
    /// moved; the slot map is still consistent, so recover the guard.
    fn lock_inner(&self) -> MutexGuard<'_, Inner<H>> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<H> Default for HandleCache<H> {
    fn default() -> Self {
        Self::new()
    }
}
