//! Time-bounded memoization for collaborators that fetch slow data.
//!
//! A cache is an ordinary value owned by the provider that uses it; there is no
//! process-wide state. Entries expire after a fixed TTL and can be dropped
//! explicitly.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

use parking_lot::{Mutex, MutexGuard};

#[derive(Debug)]
struct Entry<V> {
    value: V,
    stored_at: Instant,
}

/// Thread-safe key/value cache with a fixed time-to-live.
#[derive(Debug)]
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: Mutex<HashMap<K, Entry<V>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<K, Entry<V>>> {
        self.entries.lock()
    }

    fn fresh(&self, entry: &Entry<V>) -> bool {
        entry.stored_at.elapsed() < self.ttl
    }

    /// Cached value if present and not expired. Expired entries are evicted.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut entries = self.lock();
        match entries.get(key) {
            Some(entry) if self.fresh(entry) => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, key: K, value: V) {
        self.lock().insert(
            key,
            Entry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    /// Return the cached value or compute, store and return a new one.
    ///
    /// Failures are returned as-is and leave the cache untouched. The lock is
    /// not held while `fetch` runs.
    pub fn get_or_try_insert_with<E, F>(&self, key: K, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }
        let value = fetch()?;
        self.insert(key, value.clone());
        Ok(value)
    }

    /// Drop one entry; returns whether it was present.
    pub fn invalidate(&self, key: &K) -> bool {
        self.lock().remove(key).is_some()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of stored entries, expired or not.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn hit_within_ttl() {
        let cache: TtlCache<&str, u32> = TtlCache::new(Duration::from_secs(3600));
        let calls = Cell::new(0);
        let fetch = || {
            calls.set(calls.get() + 1);
            Ok::<_, String>(42)
        };
        assert_eq!(cache.get_or_try_insert_with("k", fetch), Ok(42));
        assert_eq!(cache.get_or_try_insert_with("k", fetch), Ok(42));
        assert_eq!(calls.get(), 1);
        assert_eq!(cache.get(&"k"), Some(42));
    }

    #[test]
    fn zero_ttl_always_refetches() {
        let cache: TtlCache<u8, u32> = TtlCache::new(Duration::ZERO);
        cache.insert(1, 10);
        assert_eq!(cache.get(&1), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn failures_are_not_cached() {
        let cache: TtlCache<u8, u32> = TtlCache::new(Duration::from_secs(60));
        let failed: Result<u32, &str> = cache.get_or_try_insert_with(1, || Err("offline"));
        assert_eq!(failed, Err("offline"));
        assert!(cache.is_empty());
        assert_eq!(cache.get_or_try_insert_with(1, || Ok::<_, &str>(7)), Ok(7));
    }

    #[test]
    fn shared_across_threads() {
        let cache: TtlCache<u32, u32> = TtlCache::new(Duration::from_secs(60));
        std::thread::scope(|scope| {
            for worker in 0..4u32 {
                let cache = &cache;
                scope.spawn(move || {
                    for i in 0..25 {
                        cache.insert(worker * 100 + i, i);
                    }
                });
            }
        });
        assert_eq!(cache.len(), 100);
        assert_eq!(cache.get(&307), Some(7));
    }

    #[test]
    fn usable_after_a_panicking_fetch() {
        let cache: TtlCache<u8, u32> = TtlCache::new(Duration::from_secs(60));
        std::thread::scope(|scope| {
            let handle = scope.spawn(|| {
                let _ = cache.get_or_try_insert_with(1, || -> Result<u32, ()> { panic!("fetch") });
            });
            assert!(handle.join().is_err());
        });
        cache.insert(1, 5);
        assert_eq!(cache.get(&1), Some(5));
    }

    #[test]
    fn invalidate_and_clear() {
        let cache: TtlCache<u8, u32> = TtlCache::new(Duration::from_secs(60));
        cache.insert(1, 10);
        cache.insert(2, 20);
        assert!(cache.invalidate(&1));
        assert!(!cache.invalidate(&1));
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.get(&2).is_none());
    }
}
