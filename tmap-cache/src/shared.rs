//! Thread-safe handle around [`TimeoutMap`].

use std::borrow::Borrow;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;

use tmap_core::clock::{Clock, SystemClock};
use tmap_core::config::TimeoutMapConfig;
use tmap_core::error::Result;

use crate::map::{MapStats, TimeoutMap};

/// Shared, lock-protected expiring map.
///
/// Clones refer to the same map. Reads take the read lock and hand out
/// clones of the stored values; writes take the write lock.
pub struct SharedTimeoutMap<K, V, C = SystemClock> {
    inner: Arc<RwLock<TimeoutMap<K, V, C>>>,
}

impl<K, V, C> Clone for SharedTimeoutMap<K, V, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V> SharedTimeoutMap<K, V, SystemClock>
where
    K: Eq + Hash,
{
    /// Creates a shared map whose entries live for `timeout_millis` milliseconds.
    pub fn new(timeout_millis: u64) -> Result<Self> {
        TimeoutMap::new(timeout_millis).map(Self::from_map)
    }

    /// Creates a shared map from a configuration.
    pub fn with_config(config: &TimeoutMapConfig) -> Result<Self> {
        TimeoutMap::with_config(config).map(Self::from_map)
    }
}

impl<K, V, C> SharedTimeoutMap<K, V, C>
where
    K: Eq + Hash,
    C: Clock,
{
    /// Creates a shared map that reads time from `clock`.
    pub fn with_clock(timeout: Duration, clock: C) -> Result<Self> {
        TimeoutMap::with_clock(timeout, clock).map(Self::from_map)
    }

    /// Wraps an existing map.
    pub fn from_map(map: TimeoutMap<K, V, C>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(map)),
        }
    }

    /// See [`TimeoutMap::put`].
    pub fn put(&self, key: K, value: V) -> Option<V> {
        self.inner.write().put(key, value)
    }

    /// See [`TimeoutMap::put_all`].
    pub fn put_all<I>(&self, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
    {
        self.inner.write().put_all(entries);
    }

    /// Returns a clone of the live value for `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.inner.read().get(key).cloned()
    }

    /// Returns true if `key` is present and not expired.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.read().contains_key(key)
    }

    /// Returns true if some live entry holds a value equal to `value`.
    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.inner.read().contains_value(value)
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Returns true if there are no live entries.
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// See [`TimeoutMap::remove`].
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.write().remove(key)
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.inner.write().clear();
    }

    /// The lifetime given to entries.
    pub fn timeout(&self) -> Duration {
        self.inner.read().timeout()
    }

    /// See [`TimeoutMap::set_timeout`].
    pub fn set_timeout(&self, timeout: Duration) -> Result<()> {
        self.inner.write().set_timeout(timeout)
    }

    /// Drops every expired entry now, returning how many were dropped.
    pub fn purge_expired(&self) -> usize {
        self.inner.write().purge_expired()
    }

    /// Returns map statistics.
    pub fn stats(&self) -> MapStats {
        self.inner.read().stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tmap_core::clock::ManualClock;

    #[test]
    fn test_clones_share_state() {
        let map: SharedTimeoutMap<String, u32> = SharedTimeoutMap::new(60_000).unwrap();
        let other = map.clone();
        map.put("a".into(), 1);
        assert_eq!(other.get("a"), Some(1));
        other.remove("a");
        assert!(!map.contains_key("a"));
    }

    #[test]
    fn test_expiry_through_handle() {
        let clock = ManualClock::new();
        let map = SharedTimeoutMap::with_clock(Duration::from_millis(100), clock.clone()).unwrap();
        map.put_all([(1u32, "one"), (2, "two")]);
        assert_eq!(map.len(), 2);
        assert!(map.contains_value(&"two"));

        clock.advance_millis(100);
        assert!(map.is_empty());
        assert_eq!(map.get(&1), None);
        assert_eq!(map.purge_expired(), 2);
    }

    #[test]
    fn test_set_timeout_through_handle() {
        let clock = ManualClock::new();
        let map = SharedTimeoutMap::with_clock(Duration::from_millis(100), clock.clone()).unwrap();
        map.put(1u32, 1u32);
        map.set_timeout(Duration::from_secs(5)).unwrap();
        clock.advance_millis(1000);
        assert_eq!(map.get(&1), Some(1));
        assert_eq!(map.timeout(), Duration::from_secs(5));
        assert!(map.set_timeout(Duration::ZERO).is_err());
    }

    #[test]
    fn test_concurrent_writers() {
        let map: SharedTimeoutMap<u32, u32> = SharedTimeoutMap::new(60_000).unwrap();

        std::thread::scope(|s| {
            for t in 0..4u32 {
                let map = map.clone();
                s.spawn(move || {
                    for i in 0..250 {
                        let key = t * 1000 + i;
                        map.put(key, i);
                        assert_eq!(map.get(&key), Some(i));
                    }
                });
            }
        });

        assert_eq!(map.len(), 1000);
        assert_eq!(map.stats().live_entries, 1000);
    }

    #[test]
    fn test_clear() {
        let map: SharedTimeoutMap<u32, u32> =
            SharedTimeoutMap::with_config(&TimeoutMapConfig::with_timeout_ms(1000)).unwrap();
        map.put(1, 1);
        map.clear();
        assert!(map.is_empty());
    }
}
