//! Bounded LRU cache with optional TTL and hit/miss/eviction metrics
//! (spec §4.6). Wraps the `lru` crate's intrusive linked-hashmap rather
//! than reimplementing LRU eviction, the way the teacher wraps it for its
//! query cache in `storage/sqlite.rs`.

use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use lru::LruCache as RawLruCache;

#[derive(Debug, Default, Clone, Copy)]
pub struct CacheSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub size: usize,
}

impl CacheSnapshot {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

struct Entry<V> {
    value: V,
    inserted_at: Instant,
}

struct Inner<K: Hash + Eq, V> {
    cache: RawLruCache<K, Entry<V>>,
    hits: u64,
    misses: u64,
    evictions: u64,
}

/// A bounded cache with LRU eviction and an optional time-to-live. Safe to
/// share across tasks behind a single `Mutex`, matching the granularity the
/// teacher uses for its in-process query cache.
pub struct BoundedCache<K: Hash + Eq, V: Clone> {
    inner: Mutex<Inner<K, V>>,
    ttl: Option<Duration>,
}

impl<K: Hash + Eq, V: Clone> BoundedCache<K, V> {
    pub fn new(capacity: usize, ttl: Option<Duration>) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).expect("capacity floor is 1");
        Self {
            inner: Mutex::new(Inner {
                cache: RawLruCache::new(capacity),
                hits: 0,
                misses: 0,
                evictions: 0,
            }),
            ttl,
        }
    }

    /// Fetch a live value, recording a hit or miss. An expired entry is
    /// treated as a miss and evicted.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut inner = self.inner.lock().expect("cache lock poisoned");
        let expired = match inner.cache.peek(key) {
            Some(entry) => self.ttl.is_some_and(|ttl| entry.inserted_at.elapsed() > ttl),
            None => {
                inner.misses += 1;
                return None;
            }
        };

        if expired {
            inner.cache.pop(key);
            inner.misses += 1;
            inner.evictions += 1;
            return None;
        }

        inner.hits += 1;
        inner.cache.get(key).map(|e| e.value.clone())
    }

    /// Insert or replace `key`, returning the capacity-evicted entry's key
    /// if the cache was already full.
    pub fn put(&self, key: K, value: V) {
        let mut inner = self.inner.lock().expect("cache lock poisoned");
        let entry = Entry {
            value,
            inserted_at: Instant::now(),
        };
        if let Some((_, _)) = inner.cache.push(key, entry) {
            inner.evictions += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("cache lock poisoned").cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock().expect("cache lock poisoned");
        inner.cache.clear();
    }

    pub fn snapshot(&self) -> CacheSnapshot {
        let inner = self.inner.lock().expect("cache lock poisoned");
        CacheSnapshot {
            hits: inner.hits,
            misses: inner.misses,
            evictions: inner.evictions,
            size: inner.cache.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn miss_then_hit() {
        let cache: BoundedCache<u32, Vec<f32>> = BoundedCache::new(4, None);
        assert!(cache.get(&1).is_none());
        cache.put(1, vec![1.0, 2.0]);
        assert_eq!(cache.get(&1), Some(vec![1.0, 2.0]));
        let snap = cache.snapshot();
        assert_eq!(snap.hits, 1);
        assert_eq!(snap.misses, 1);
    }

    #[test]
    fn capacity_evicts_least_recently_used() {
        let cache: BoundedCache<u32, u32> = BoundedCache::new(2, None);
        cache.put(1, 10);
        cache.put(2, 20);
        cache.get(&1); // 1 is now most-recently-used
        cache.put(3, 30); // evicts 2
        assert!(cache.get(&2).is_none());
        assert_eq!(cache.get(&1), Some(10));
        assert_eq!(cache.get(&3), Some(30));
        assert!(cache.snapshot().evictions >= 1);
    }

    #[test]
    fn ttl_expiry_counts_as_miss_and_eviction() {
        let cache: BoundedCache<u32, u32> = BoundedCache::new(4, Some(Duration::from_millis(5)));
        cache.put(1, 10);
        std::thread::sleep(Duration::from_millis(15));
        assert!(cache.get(&1).is_none());
        let snap = cache.snapshot();
        assert_eq!(snap.misses, 1);
        assert_eq!(snap.evictions, 1);
    }

    #[test]
    fn hit_rate_computed_from_totals() {
        let cache: BoundedCache<u32, u32> = BoundedCache::new(4, None);
        cache.put(1, 10);
        cache.get(&1);
        cache.get(&2);
        let snap = cache.snapshot();
        assert_eq!(snap.hit_rate(), 0.5);
    }
}
