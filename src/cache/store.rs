//! Cache Store Module
//!
//! In-process engine holding five independent collection kinds per key, an
//! expiry index and a throttled sweep that purges expired entries.

use std::collections::{BTreeSet, HashMap, VecDeque};

use chrono::{DateTime, Duration, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::debug;

use crate::cache::stats::StatsCounters;
use crate::cache::{
    CacheEngine, CacheStats, ExpiryRecord, Kind, StoreValue, DEFAULT_SWEEP_INTERVAL_MS,
};
use crate::config::EngineConfig;
use crate::error::Result;

// == Memory Store ==
/// Thread-safe in-process store.
///
/// Each kind lives in its own concurrent map. The expiry index is the source
/// of truth for visibility: an entry whose record has expired is treated as
/// absent even before a sweep physically removes it.
///
/// Creating, removing and purging a key all hold its index entry while they
/// touch the payload maps. Locks are taken index first, payload map second,
/// and no path takes them in the other order.
#[derive(Debug)]
pub struct MemoryStore {
    scalars: DashMap<String, StoreValue>,
    sets: DashMap<String, BTreeSet<StoreValue>>,
    lists: DashMap<String, Vec<StoreValue>>,
    dictionaries: DashMap<String, HashMap<String, StoreValue>>,
    queues: DashMap<String, VecDeque<StoreValue>>,
    /// Key -> (kind, expiry)
    expiry: DashMap<String, ExpiryRecord>,
    /// Sweep gate; holds the instant of the previous sweep
    last_sweep: Mutex<DateTime<Utc>>,
    sweep_interval: Duration,
    stats: StatsCounters,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    // == Constructor ==
    /// Creates an empty store sweeping at most every 500 ms.
    pub fn new() -> Self {
        Self::with_sweep_interval(Duration::milliseconds(DEFAULT_SWEEP_INTERVAL_MS as i64))
    }

    /// Creates an empty store with a custom sweep throttle.
    pub fn with_sweep_interval(sweep_interval: Duration) -> Self {
        Self {
            scalars: DashMap::new(),
            sets: DashMap::new(),
            lists: DashMap::new(),
            dictionaries: DashMap::new(),
            queues: DashMap::new(),
            expiry: DashMap::new(),
            last_sweep: Mutex::new(Utc::now()),
            sweep_interval,
            stats: StatsCounters::default(),
        }
    }

    /// Creates a store honouring the configured sweep interval. Connection
    /// settings are irrelevant in-process.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::with_sweep_interval(config.sweep_interval())
    }

    /// Minimum time between two throttled sweeps.
    pub fn sweep_interval(&self) -> Duration {
        self.sweep_interval
    }

    // == Length ==
    /// Number of keys tracked, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.expiry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expiry.is_empty()
    }

    // == Stats ==
    /// Returns current store statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.expiry.len())
    }

    // == Sweep ==
    /// Purges every expired entry now, ignoring the throttle.
    ///
    /// Returns the number of entries removed.
    pub fn sweep_expired(&self) -> usize {
        let mut last = self.last_sweep.lock();
        let now = Utc::now();
        *last = now;
        self.purge_expired(now)
    }

    /// Runs a sweep when the throttle interval has elapsed. Callers that find
    /// the gate taken skip the sweep.
    fn sweep_if_due(&self) {
        let Some(mut last) = self.last_sweep.try_lock() else {
            return;
        };
        let now = Utc::now();
        if now - *last < self.sweep_interval {
            return;
        }
        *last = now;
        self.purge_expired(now);
    }

    fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let expired: Vec<String> = self
            .expiry
            .iter()
            .filter(|record| record.value().is_expired_at(now))
            .map(|record| record.key().clone())
            .collect();

        let mut purged = 0;
        for key in expired {
            // Skip keys recached since the scan
            let Entry::Occupied(record) = self.expiry.entry(key) else {
                continue;
            };
            if !record.get().is_expired_at(now) {
                continue;
            }
            self.purge_payload(record.key(), record.get().kind);
            record.remove();
            purged += 1;
        }

        self.stats.record_sweep(purged);
        if purged > 0 {
            debug!(purged, "expiry sweep purged entries");
        }
        purged
    }

    // == Helpers ==
    fn purge_payload(&self, key: &str, kind: Kind) -> bool {
        match kind {
            Kind::Scalar => self.scalars.remove(key).is_some(),
            Kind::Set => self.sets.remove(key).is_some(),
            Kind::List => self.lists.remove(key).is_some(),
            Kind::Dictionary => self.dictionaries.remove(key).is_some(),
            Kind::Queue => self.queues.remove(key).is_some(),
        }
    }

    fn is_live(&self, key: &str, kind: Kind) -> bool {
        self.expiry
            .get(key)
            .is_some_and(|record| record.kind == kind && !record.is_expired())
    }

    /// Stores `payload` as the entry for `key`, replacing an entry of any
    /// kind, and (re)starts its expiry clock.
    fn create<V>(
        &self,
        map: &DashMap<String, V>,
        kind: Kind,
        key: &str,
        payload: V,
        ttl: Duration,
    ) -> bool {
        if ttl <= Duration::zero() {
            debug!(key, %kind, "rejected cache with non-positive ttl");
            return false;
        }
        self.sweep_if_due();

        let slot = self.expiry.entry(key.to_string());
        for other in Kind::ALL {
            if other != kind {
                self.purge_payload(key, other);
            }
        }
        map.insert(key.to_string(), payload);
        slot.insert(ExpiryRecord::new(kind, Utc::now(), ttl));
        true
    }

    /// Runs `f` against a live entry of `kind`.
    fn read<V, R>(
        &self,
        map: &DashMap<String, V>,
        kind: Kind,
        key: &str,
        f: impl FnOnce(&V) -> R,
    ) -> Option<R> {
        self.sweep_if_due();
        if !self.is_live(key, kind) {
            return None;
        }
        map.get(key).map(|entry| f(entry.value()))
    }

    /// Runs `f` against a live entry of `kind`, with mutable access.
    fn write<V, R>(
        &self,
        map: &DashMap<String, V>,
        kind: Kind,
        key: &str,
        f: impl FnOnce(&mut V) -> R,
    ) -> Option<R> {
        self.sweep_if_due();
        if !self.is_live(key, kind) {
            return None;
        }
        map.get_mut(key).map(|mut entry| f(entry.value_mut()))
    }

    fn counted<T>(&self, result: Option<T>) -> Option<T> {
        self.stats.record_read(result.is_some());
        result
    }
}

/// Keeps the inclusive range `[first, last]`, resolving negative indices
/// from the end.
fn shrink(list: &mut Vec<StoreValue>, first: i64, last: i64) {
    let len = list.len() as i64;
    let resolve = |index: i64| if index < 0 { len + index } else { index };
    let first = resolve(first).max(0);
    let last = resolve(last).min(len - 1);

    if last < first {
        list.clear();
        return;
    }
    list.truncate(last as usize + 1);
    list.drain(..first as usize);
}

impl CacheEngine for MemoryStore {
    fn initialise(&self, config: &EngineConfig) -> Result<()> {
        debug!(
            server = %config.server_address,
            port = config.server_port,
            "in-process store ignores engine configuration"
        );
        Ok(())
    }

    // == Scalar ==
    fn cache(&self, key: &str, value: StoreValue, ttl: Duration) -> bool {
        self.create(&self.scalars, Kind::Scalar, key, value, ttl)
    }

    fn retrieve(&self, key: &str) -> Option<StoreValue> {
        let value = self.read(&self.scalars, Kind::Scalar, key, Clone::clone);
        self.counted(value)
    }

    fn remove(&self, key: &str) -> bool {
        self.sweep_if_due();
        let Entry::Occupied(record) = self.expiry.entry(key.to_string()) else {
            return false;
        };
        let live = !record.get().is_expired();
        self.purge_payload(key, record.get().kind);
        record.remove();
        live
    }

    fn exists(&self, key: &str) -> bool {
        self.sweep_if_due();
        self.expiry.get(key).is_some_and(|record| !record.is_expired())
    }

    fn time_to_live(&self, key: &str) -> Option<Duration> {
        self.sweep_if_due();
        self.expiry
            .get(key)
            .filter(|record| !record.is_expired())
            .map(|record| record.ttl_remaining())
    }

    // == Set ==
    fn cache_as_set(&self, key: &str, items: Vec<StoreValue>, ttl: Duration) -> bool {
        let set: BTreeSet<StoreValue> = items.into_iter().collect();
        self.create(&self.sets, Kind::Set, key, set, ttl)
    }

    fn add_to_set(&self, key: &str, value: StoreValue) -> bool {
        self.write(&self.sets, Kind::Set, key, |set| set.insert(value))
            .unwrap_or(false)
    }

    fn remove_from_set(&self, key: &str, value: &StoreValue) -> bool {
        self.write(&self.sets, Kind::Set, key, |set| set.remove(value))
            .unwrap_or(false)
    }

    fn retrieve_set(&self, key: &str) -> Option<Vec<StoreValue>> {
        let items = self.read(&self.sets, Kind::Set, key, |set| {
            set.iter().cloned().collect()
        });
        self.counted(items)
    }

    fn exists_in_set(&self, key: &str, value: &StoreValue) -> bool {
        // Ordered lookup, no full scan
        self.read(&self.sets, Kind::Set, key, |set| set.contains(value))
            .unwrap_or(false)
    }

    fn length_of_set(&self, key: &str) -> Option<usize> {
        self.read(&self.sets, Kind::Set, key, BTreeSet::len)
    }

    fn clear_set(&self, key: &str) -> bool {
        self.write(&self.sets, Kind::Set, key, BTreeSet::clear).is_some()
    }

    // == List ==
    fn cache_as_list(&self, key: &str, items: Vec<StoreValue>, ttl: Duration) -> bool {
        self.create(&self.lists, Kind::List, key, items, ttl)
    }

    fn append_to_list(&self, key: &str, value: StoreValue) -> bool {
        self.write(&self.lists, Kind::List, key, |list| list.push(value))
            .is_some()
    }

    fn retrieve_list(&self, key: &str) -> Option<Vec<StoreValue>> {
        let items = self.read(&self.lists, Kind::List, key, Clone::clone);
        self.counted(items)
    }

    fn shrink_list(&self, key: &str, first: i64, last: i64) -> bool {
        self.write(&self.lists, Kind::List, key, |list| shrink(list, first, last))
            .is_some()
    }

    fn remove_from_list(&self, key: &str, value: &StoreValue) -> i64 {
        self.write(&self.lists, Kind::List, key, |list| {
            let before = list.len();
            list.retain(|item| item != value);
            (before - list.len()) as i64
        })
        .unwrap_or(-1)
    }

    fn length_of_list(&self, key: &str) -> Option<usize> {
        self.read(&self.lists, Kind::List, key, Vec::len)
    }

    fn clear_list(&self, key: &str) -> bool {
        self.write(&self.lists, Kind::List, key, Vec::clear).is_some()
    }

    // == Dictionary ==
    fn cache_as_dictionary(
        &self,
        key: &str,
        items: HashMap<String, StoreValue>,
        ttl: Duration,
    ) -> bool {
        self.create(&self.dictionaries, Kind::Dictionary, key, items, ttl)
    }

    fn add_to_dictionary(&self, key: &str, entry: &str, value: StoreValue) -> bool {
        self.write(&self.dictionaries, Kind::Dictionary, key, |dict| {
            if dict.contains_key(entry) {
                false
            } else {
                dict.insert(entry.to_string(), value);
                true
            }
        })
        .unwrap_or(false)
    }

    fn update_dictionary_entry(&self, key: &str, entry: &str, value: StoreValue) -> bool {
        self.write(&self.dictionaries, Kind::Dictionary, key, |dict| {
            match dict.get_mut(entry) {
                Some(slot) => {
                    *slot = value;
                    true
                }
                None => false,
            }
        })
        .unwrap_or(false)
    }

    fn remove_from_dictionary(&self, key: &str, entry: &str) -> bool {
        self.write(&self.dictionaries, Kind::Dictionary, key, |dict| {
            dict.remove(entry).is_some()
        })
        .unwrap_or(false)
    }

    fn retrieve_dictionary(&self, key: &str) -> Option<HashMap<String, StoreValue>> {
        let items = self.read(&self.dictionaries, Kind::Dictionary, key, Clone::clone);
        self.counted(items)
    }

    fn retrieve_dictionary_entry(&self, key: &str, entry: &str) -> Option<StoreValue> {
        let value = self
            .read(&self.dictionaries, Kind::Dictionary, key, |dict| {
                dict.get(entry).cloned()
            })
            .flatten();
        self.counted(value)
    }

    fn exists_in_dictionary(&self, key: &str, entry: &str) -> bool {
        self.read(&self.dictionaries, Kind::Dictionary, key, |dict| {
            dict.contains_key(entry)
        })
        .unwrap_or(false)
    }

    fn length_of_dictionary(&self, key: &str) -> Option<usize> {
        self.read(&self.dictionaries, Kind::Dictionary, key, HashMap::len)
    }

    fn clear_dictionary(&self, key: &str) -> bool {
        self.write(&self.dictionaries, Kind::Dictionary, key, HashMap::clear)
            .is_some()
    }

    // == Queue ==
    fn cache_as_queue(&self, key: &str, items: Vec<StoreValue>, ttl: Duration) -> bool {
        let queue: VecDeque<StoreValue> = items.into();
        self.create(&self.queues, Kind::Queue, key, queue, ttl)
    }

    fn push_queue(&self, key: &str, value: StoreValue) -> bool {
        self.write(&self.queues, Kind::Queue, key, |queue| queue.push_back(value))
            .is_some()
    }

    fn pop_queue(&self, key: &str) -> Option<StoreValue> {
        let value = self
            .write(&self.queues, Kind::Queue, key, VecDeque::pop_front)
            .flatten();
        self.counted(value)
    }

    fn peek_queue(&self, key: &str) -> Option<StoreValue> {
        self.read(&self.queues, Kind::Queue, key, |queue| queue.front().cloned())
            .flatten()
    }

    fn retrieve_queue(&self, key: &str) -> Option<Vec<StoreValue>> {
        let items = self.read(&self.queues, Kind::Queue, key, |queue| {
            queue.iter().cloned().collect()
        });
        self.counted(items)
    }

    fn length_of_queue(&self, key: &str) -> Option<usize> {
        self.read(&self.queues, Kind::Queue, key, VecDeque::len)
    }

    fn clear_queue(&self, key: &str) -> bool {
        self.write(&self.queues, Kind::Queue, key, VecDeque::clear)
            .is_some()
    }
}
