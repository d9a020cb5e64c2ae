//! Memoized linguistic features.
//!
//! Constraints such as the named-entity and part-of-speech checks tag the
//! original text and every candidate, and the original text is tagged again
//! on every round of every search. [`FeatureCache`] memoizes tagger output
//! by exact sentence string in a bounded LRU.
//!
//! The cache lives for a whole batch run and is shared by reference
//! (`Arc<FeatureCache<_>>`) between all constraints and concurrent attacks
//! that use the same tagger. All reads and writes go through one mutex, so
//! the recency order is the same no matter how many attacks share it.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use lru::LruCache;
use serde::Serialize;

use crate::errors::{AttackError, Result};
use crate::pipeline::traits::{TaggedWord, Tagger};
use crate::types::AttackConfig;

/// Tagger output shared between the cache and its callers.
pub type Features = Arc<[TaggedWord]>;

/// Hit / miss counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    /// Fraction of lookups served from the cache (0.0 when unused).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            return 0.0;
        }
        self.hits as f64 / total as f64
    }
}

/// Bounded LRU memoization of a [`Tagger`].
#[derive(Debug)]
pub struct FeatureCache<T> {
    tagger: T,
    entries: Mutex<LruCache<String, Features>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<T: Tagger> FeatureCache<T> {
    /// Create a cache holding at most `capacity` sentences.
    pub fn new(tagger: T, capacity: usize) -> Result<Self> {
        let capacity = NonZeroUsize::new(capacity)
            .ok_or_else(|| AttackError::invalid_config("cache_capacity must be > 0"))?;
        Ok(Self {
            tagger,
            entries: Mutex::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        })
    }

    /// Create a cache sized by `config.cache_capacity`.
    pub fn from_config(tagger: T, config: &AttackConfig) -> Result<Self> {
        Self::new(tagger, config.cache_capacity)
    }

    /// Return the features of `sentence`, tagging it on a miss.
    ///
    /// A hit marks the entry most recently used. A miss calls the tagger
    /// outside the lock, then inserts the result, evicting the least
    /// recently used entry if the cache is full. Tagger errors propagate and
    /// nothing is stored.
    pub fn get_or_compute(&self, sentence: &str) -> Result<Features> {
        if let Some(features) = self.lock().get(sentence) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(sentence, "feature cache hit");
            return Ok(Arc::clone(features));
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let features: Features = self.tagger.tag(sentence)?.into();

        let evicted = self
            .lock()
            .push(sentence.to_string(), Arc::clone(&features));
        if let Some((key, _)) = evicted {
            if key != sentence {
                tracing::trace!(evicted = %key, "feature cache eviction");
            }
        }

        Ok(features)
    }

    /// Whether `tag` marks a named entity, as decided by the wrapped tagger.
    pub fn is_entity(&self, tag: &str) -> bool {
        self.tagger.is_entity(tag)
    }
}

impl<T> FeatureCache<T> {
    fn lock(&self) -> MutexGuard<'_, LruCache<String, Features>> {
        // A panic while holding the lock cannot leave a half-written entry.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// The wrapped tagger
    pub fn tagger(&self) -> &T {
        &self.tagger
    }

    /// Check for `sentence` without refreshing its recency.
    pub fn contains(&self, sentence: &str) -> bool {
        self.lock().contains(sentence)
    }

    /// Number of cached sentences
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Maximum number of cached sentences
    pub fn capacity(&self) -> usize {
        self.lock().cap().get()
    }

    /// Drop every entry. Counters are kept.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Snapshot of the hit / miss counters
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}
