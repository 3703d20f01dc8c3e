//! Caching for expensive language-model work.
//!
//! Concept extraction issues two LLM calls per distinct chunk content, so the
//! cache is keyed by a SHA-256 content hash rather than the raw string. The
//! cache is bounded (insertion-order eviction) and TTL-based, and is shared
//! across builds within one process.

use std::collections::{BTreeSet, HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, SystemTime};

const DEFAULT_TTL_SECONDS: u64 = 1800;
const DEFAULT_CAPACITY: usize = 4096;

struct CachedConcepts {
    concepts: BTreeSet<String>,
    computed_at: SystemTime,
}

struct CacheInner {
    map: HashMap<String, CachedConcepts>,
    // Insertion order, oldest first. Drives eviction when at capacity.
    order: VecDeque<String>,
}

/// Bounded, TTL-based cache of extracted concept sets, keyed by content hash.
/// Thread-safe: extraction workers read and write it concurrently.
pub struct ConceptCache {
    inner: Mutex<CacheInner>,
    ttl_seconds: u64,
    capacity: usize,
}

impl ConceptCache {
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_TTL_SECONDS, DEFAULT_CAPACITY)
    }

    /// Custom TTL and capacity (also used by tests).
    pub fn with_limits(ttl_seconds: u64, capacity: usize) -> Self {
        ConceptCache {
            inner: Mutex::new(CacheInner {
                map: HashMap::new(),
                order: VecDeque::new(),
            }),
            ttl_seconds,
            capacity: capacity.max(1),
        }
    }

    /// Cached concept set for a content hash, if present and not expired.
    pub fn get(&self, content_hash: &str) -> Option<BTreeSet<String>> {
        let mut inner = self.inner.lock().unwrap();
        let expired = match inner.map.get(content_hash) {
            None => return None,
            Some(cached) => {
                let age = SystemTime::now()
                    .duration_since(cached.computed_at)
                    .unwrap_or(Duration::from_secs(self.ttl_seconds + 1));
                age.as_secs() >= self.ttl_seconds
            }
        };
        if expired {
            inner.map.remove(content_hash);
            inner.order.retain(|k| k != content_hash);
            return None;
        }
        inner.map.get(content_hash).map(|c| c.concepts.clone())
    }

    pub fn insert(&self, content_hash: &str, concepts: BTreeSet<String>) {
        let mut inner = self.inner.lock().unwrap();
        if inner.map.contains_key(content_hash) {
            inner.order.retain(|k| k != content_hash);
        }
        while inner.map.len() >= self.capacity && !inner.map.contains_key(content_hash) {
            match inner.order.pop_front() {
                Some(oldest) => {
                    inner.map.remove(&oldest);
                }
                None => break,
            }
        }
        inner.order.push_back(content_hash.to_string());
        inner.map.insert(
            content_hash.to_string(),
            CachedConcepts {
                concepts,
                computed_at: SystemTime::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ConceptCache {
    fn default() -> Self {
        Self::new()
    }
}
