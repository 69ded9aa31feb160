//! Single-owner expiring map.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use tmap_core::clock::{Clock, SystemClock};
use tmap_core::config::TimeoutMapConfig;
use tmap_core::constants::{DEFAULT_INITIAL_CAPACITY, DEFAULT_SWEEP_ON_WRITE};
use tmap_core::error::{Result, TimeoutMapError};

/// Stored value with the instant of its last insertion.
#[derive(Clone, Debug)]
struct Entry<V> {
    value: V,
    inserted_at: Instant,
}

/// Live iff `now < inserted_at + timeout`.
fn is_live(inserted_at: Instant, now: Instant, timeout: Duration) -> bool {
    now.saturating_duration_since(inserted_at) < timeout
}

/// Whole milliseconds, saturating at `u64::MAX`.
fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

fn check_timeout(timeout: Duration) -> Result<Duration> {
    if timeout.is_zero() {
        return Err(TimeoutMapError::InvalidArgument(
            "timeout must be positive, got 0 ms".into(),
        ));
    }
    Ok(timeout)
}

/// A map whose entries disappear a fixed time after they were last written.
///
/// Reads never see an expired entry, whether or not it has been swept yet.
/// Writes (`put`, `put_all`, `remove`, `set_timeout`) drop expired entries
/// once the oldest stored insertion can have expired.
///
/// Not synchronized; see [`SharedTimeoutMap`](crate::SharedTimeoutMap) for a
/// thread-safe handle.
pub struct TimeoutMap<K, V, C = SystemClock> {
    entries: HashMap<K, Entry<V>>,
    timeout: Duration,
    sweep_on_write: bool,
    /// Lower bound on every stored `inserted_at`.
    oldest: Option<Instant>,
    clock: C,
}

impl<K, V> TimeoutMap<K, V, SystemClock>
where
    K: Eq + Hash,
{
    /// Creates a map whose entries live for `timeout_millis` milliseconds.
    ///
    /// Fails with `InvalidArgument` when `timeout_millis` is zero.
    pub fn new(timeout_millis: u64) -> Result<Self> {
        Self::with_timeout(Duration::from_millis(timeout_millis))
    }

    /// Creates a map with the given entry timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        Self::with_clock(timeout, SystemClock)
    }

    /// Creates a map from a configuration.
    pub fn with_config(config: &TimeoutMapConfig) -> Result<Self> {
        Self::with_config_and_clock(config, SystemClock)
    }
}

impl<K, V, C> TimeoutMap<K, V, C>
where
    K: Eq + Hash,
    C: Clock,
{
    /// Creates a map that reads time from `clock`.
    pub fn with_clock(timeout: Duration, clock: C) -> Result<Self> {
        let timeout = check_timeout(timeout)?;
        Ok(Self::build(
            timeout,
            DEFAULT_SWEEP_ON_WRITE,
            DEFAULT_INITIAL_CAPACITY,
            clock,
        ))
    }

    /// Creates a map from a configuration, reading time from `clock`.
    pub fn with_config_and_clock(config: &TimeoutMapConfig, clock: C) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(
            config.timeout(),
            config.sweep_on_write,
            config.initial_capacity,
            clock,
        ))
    }

    fn build(timeout: Duration, sweep_on_write: bool, capacity: usize, clock: C) -> Self {
        debug!(
            timeout_ms = millis(timeout),
            sweep_on_write, "Created timeout map"
        );
        Self {
            entries: HashMap::with_capacity(capacity),
            timeout,
            sweep_on_write,
            oldest: None,
            clock,
        }
    }

    /// Inserts or replaces `key`, restarting its lifetime.
    ///
    /// Returns the previous value if it had not expired yet.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        let now = self.clock.now();
        self.sweep_if_due(now);
        self.insert_at(key, value, now)
    }

    /// Inserts every pair, all stamped with the same instant.
    pub fn put_all<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let now = self.clock.now();
        self.sweep_if_due(now);
        for (key, value) in entries {
            self.insert_at(key, value, now);
        }
    }

    fn insert_at(&mut self, key: K, value: V, now: Instant) -> Option<V> {
        if self.oldest.is_none() {
            self.oldest = Some(now);
        }
        let previous = self.entries.insert(key, Entry { value, inserted_at: now })?;
        is_live(previous.inserted_at, now, self.timeout).then_some(previous.value)
    }

    /// Returns the value for `key` if present and not expired.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = self.clock.now();
        self.entries
            .get(key)
            .filter(|e| is_live(e.inserted_at, now, self.timeout))
            .map(|e| &e.value)
    }

    /// Returns true if `key` is present and not expired.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).is_some()
    }

    /// Returns true if some live entry holds a value equal to `value`.
    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.values().any(|v| v == value)
    }

    /// Time left before `key` expires, if it is live.
    pub fn remaining<Q>(&self, key: &Q) -> Option<Duration>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = self.clock.now();
        let entry = self.entries.get(key)?;
        let age = now.saturating_duration_since(entry.inserted_at);
        self.timeout.checked_sub(age).filter(|left| !left.is_zero())
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        let now = self.clock.now();
        match self.oldest {
            Some(oldest) if is_live(oldest, now, self.timeout) => self.entries.len(),
            None => 0,
            Some(_) => self.iter_at(now).count(),
        }
    }

    /// Returns true if there are no live entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes `key`, returning its value if it had not expired.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = self.clock.now();
        let removed = self.entries.remove(key);
        self.sweep_if_due(now);
        let entry = removed?;
        is_live(entry.inserted_at, now, self.timeout).then_some(entry.value)
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.oldest = None;
    }

    /// The lifetime given to entries.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Changes the entry lifetime.
    ///
    /// Applies to entries already stored: each one now expires at its last
    /// insertion plus the new timeout.
    pub fn set_timeout(&mut self, timeout: Duration) -> Result<()> {
        let timeout = check_timeout(timeout)?;
        debug!(
            old_ms = millis(self.timeout),
            new_ms = millis(timeout),
            "Changed map timeout"
        );
        self.timeout = timeout;
        let now = self.clock.now();
        self.sweep_if_due(now);
        Ok(())
    }

    /// Drops every expired entry now, returning how many were dropped.
    ///
    /// Runs even when write-time sweeping is disabled.
    pub fn purge_expired(&mut self) -> usize {
        let now = self.clock.now();
        self.sweep(now)
    }

    fn sweep_if_due(&mut self, now: Instant) {
        if !self.sweep_on_write {
            return;
        }
        if let Some(oldest) = self.oldest {
            if !is_live(oldest, now, self.timeout) {
                self.sweep(now);
            }
        }
    }

    fn sweep(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        let timeout = self.timeout;
        self.entries.retain(|_, e| {
            let live = is_live(e.inserted_at, now, timeout);
            if !live {
                let age = now.saturating_duration_since(e.inserted_at);
                trace!(age_ms = millis(age), "Evicted expired entry");
            }
            live
        });
        self.oldest = self.entries.values().map(|e| e.inserted_at).min();

        let removed = before - self.entries.len();
        if removed > 0 {
            debug!(removed, remaining = self.entries.len(), "Swept expired entries");
        }
        removed
    }

    fn iter_at(&self, now: Instant) -> impl Iterator<Item = (&K, &V)> + '_ {
        let timeout = self.timeout;
        self.entries
            .iter()
            .filter(move |(_, e)| is_live(e.inserted_at, now, timeout))
            .map(|(k, e)| (k, &e.value))
    }

    /// Iterates over live entries in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.iter_at(self.clock.now())
    }

    /// Iterates over live keys.
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|(k, _)| k)
    }

    /// Iterates over live values.
    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, v)| v)
    }

    /// Returns map statistics.
    pub fn stats(&self) -> MapStats {
        let live = self.len();
        MapStats {
            total_entries: self.entries.len(),
            expired_entries: self.entries.len() - live,
            live_entries: live,
            timeout_ms: millis(self.timeout),
        }
    }
}

impl<K, V, C> Extend<(K, V)> for TimeoutMap<K, V, C>
where
    K: Eq + Hash,
    C: Clock,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.put_all(iter);
    }
}

impl<K, V, C> fmt::Debug for TimeoutMap<K, V, C>
where
    K: Eq + Hash,
    C: Clock,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimeoutMap")
            .field("live_entries", &self.len())
            .field("stored_entries", &self.entries.len())
            .field("timeout", &self.timeout)
            .field("sweep_on_write", &self.sweep_on_write)
            .finish()
    }
}

/// Map statistics.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapStats {
    /// Stored entries, including expired ones not yet swept
    pub total_entries: usize,
    /// Expired entries still stored
    pub expired_entries: usize,
    /// Live entries
    pub live_entries: usize,
    /// Entry timeout in milliseconds
    pub timeout_ms: u64,
}
