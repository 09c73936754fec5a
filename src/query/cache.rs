//! Cache of compiled expressions
//!
//! Lookups take the read lock and `peek`, so hits never contend with each
//! other. A miss compiles outside any lock and publishes under the write
//! lock; two threads missing on the same text both compile and the later
//! insert wins.
//!
//! The facade uses one process-wide instance, configured through
//! [`set_capacity`].

use std::num::NonZeroUsize;
use std::sync::{Arc, LazyLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use lru::LruCache;
use tracing::{debug, trace, warn};

use crate::error::Result;
use crate::xpath::Expr;

/// Entries kept when nothing else is configured
pub const DEFAULT_CAPACITY: usize = 50;

type Slots = Option<LruCache<String, Arc<Expr>>>;

fn new_slots(capacity: usize) -> Slots {
    NonZeroUsize::new(capacity).map(LruCache::new)
}

/// LRU map from expression text to its compiled form
pub struct ExprCache {
    slots: RwLock<Slots>,
}

impl ExprCache {
    /// A cache holding up to `capacity` expressions; zero caches nothing
    pub fn with_capacity(capacity: usize) -> Self {
        ExprCache {
            slots: RwLock::new(new_slots(capacity)),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Slots> {
        self.slots.read().unwrap_or_else(|poisoned: PoisonError<_>| {
            warn!("expression cache lock poisoned; continuing with its contents");
            poisoned.into_inner()
        })
    }

    fn write(&self) -> RwLockWriteGuard<'_, Slots> {
        self.slots.write().unwrap_or_else(|poisoned: PoisonError<_>| {
            warn!("expression cache lock poisoned; continuing with its contents");
            poisoned.into_inner()
        })
    }

    /// Compiled form of `xpath`, from the cache when present
    pub fn get_or_compile(&self, xpath: &str) -> Result<Arc<Expr>> {
        if let Some(expr) = self.read().as_ref().and_then(|slots| slots.peek(xpath)) {
            trace!(xpath, "expression cache hit");
            return Ok(Arc::clone(expr));
        }

        debug!(xpath, "expression cache miss, compiling");
        let expr = Arc::new(Expr::compile(xpath)?);
        if let Some(slots) = self.write().as_mut() {
            slots.put(xpath.to_string(), Arc::clone(&expr));
        }
        Ok(expr)
    }

    /// Resize, dropping the contents. Zero disables caching.
    pub fn set_capacity(&self, capacity: usize) {
        debug!(capacity, "reconfiguring expression cache");
        *self.write() = new_slots(capacity);
    }

    /// Configured number of entries; zero when caching is disabled
    pub fn capacity(&self) -> usize {
        self.read().as_ref().map_or(0, |slots| slots.cap().get())
    }

    pub fn len(&self) -> usize {
        self.read().as_ref().map_or(0, |slots| slots.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `xpath` is currently cached
    pub fn contains(&self, xpath: &str) -> bool {
        self.read().as_ref().is_some_and(|slots| slots.contains(xpath))
    }

    /// Drop every cached expression, keeping the capacity
    pub fn clear(&self) {
        if let Some(slots) = self.write().as_mut() {
            slots.clear();
        }
    }
}

impl Default for ExprCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

static GLOBAL: LazyLock<ExprCache> = LazyLock::new(ExprCache::default);

/// The process-wide cache behind `query::compile`
pub fn global() -> &'static ExprCache {
    &GLOBAL
}

/// Resize the process-wide cache. Zero disables caching.
pub fn set_capacity(capacity: usize) {
    GLOBAL.set_capacity(capacity);
}

/// Capacity of the process-wide cache
pub fn capacity() -> usize {
    GLOBAL.capacity()
}
