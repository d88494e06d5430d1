// src/scoring/cache.rs

use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;

use super::engine::ScoreComponents;

/// Bounded per-domain breakdown cache. One entry per hostname, overwritten
/// on every recomputation; least recently scored domains are evicted.
pub struct ScoreCache {
    inner: Mutex<LruCache<String, ScoreComponents>>,
}

impl ScoreCache {
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or_else(|| NonZeroUsize::new(512).unwrap());
        ScoreCache {
            inner: Mutex::new(LruCache::new(cap)),
        }
    }

    pub fn put(&self, domain: &str, components: ScoreComponents) {
        let mut cache = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        cache.put(domain.to_string(), components);
    }

    pub fn get(&self, domain: &str) -> Option<ScoreComponents> {
        let mut cache = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        cache.get(domain).cloned()
    }

    pub fn len(&self) -> usize {
        match self.inner.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
