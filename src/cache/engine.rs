//! Engine Contract Module
//!
//! The operations every storage engine offers, keyed by canonical key string.
//! [`MemoryStore`](super::MemoryStore) is the in-process implementation; a
//! remote engine would implement the same trait.
//!
//! Absence is never an error: operations report it through `bool`, `Option`
//! or, for [`CacheEngine::remove_from_list`], `-1`.

use std::collections::HashMap;

use chrono::Duration;

use super::StoreValue;
use crate::config::EngineConfig;
use crate::error::Result;

/// Storage engine contract.
pub trait CacheEngine: Send + Sync {
    /// Called once before first use with engine specific settings.
    fn initialise(&self, config: &EngineConfig) -> Result<()>;

    // == Scalar ==
    /// Stores a scalar. Returns false without touching the store when
    /// `ttl` is not positive.
    fn cache(&self, key: &str, value: StoreValue, ttl: Duration) -> bool;
    fn retrieve(&self, key: &str) -> Option<StoreValue>;
    /// Removes the entry under `key` whatever its kind. Returns whether a
    /// live entry was removed.
    fn remove(&self, key: &str) -> bool;
    fn exists(&self, key: &str) -> bool;
    /// Remaining lifetime of a live entry.
    fn time_to_live(&self, key: &str) -> Option<Duration>;

    // == Set ==
    fn cache_as_set(&self, key: &str, items: Vec<StoreValue>, ttl: Duration) -> bool;
    /// False when the set is absent or already holds `value`.
    fn add_to_set(&self, key: &str, value: StoreValue) -> bool;
    fn remove_from_set(&self, key: &str, value: &StoreValue) -> bool;
    /// Sorted copy of the set.
    fn retrieve_set(&self, key: &str) -> Option<Vec<StoreValue>>;
    fn exists_in_set(&self, key: &str, value: &StoreValue) -> bool;
    fn length_of_set(&self, key: &str) -> Option<usize>;
    fn clear_set(&self, key: &str) -> bool;

    // == List ==
    fn cache_as_list(&self, key: &str, items: Vec<StoreValue>, ttl: Duration) -> bool;
    fn append_to_list(&self, key: &str, value: StoreValue) -> bool;
    fn retrieve_list(&self, key: &str) -> Option<Vec<StoreValue>>;
    /// Keeps `[first, last]`; negative indices count from the end. A range
    /// that resolves to `last < first` clears the list.
    fn shrink_list(&self, key: &str, first: i64, last: i64) -> bool;
    /// Removes every matching element and returns how many went, or `-1`
    /// when there is no such list.
    fn remove_from_list(&self, key: &str, value: &StoreValue) -> i64;
    fn length_of_list(&self, key: &str) -> Option<usize>;
    fn clear_list(&self, key: &str) -> bool;

    // == Dictionary ==
    fn cache_as_dictionary(
        &self,
        key: &str,
        items: HashMap<String, StoreValue>,
        ttl: Duration,
    ) -> bool;
    /// Fails when `entry` already exists.
    fn add_to_dictionary(&self, key: &str, entry: &str, value: StoreValue) -> bool;
    /// Fails when `entry` does not exist.
    fn update_dictionary_entry(&self, key: &str, entry: &str, value: StoreValue) -> bool;
    fn remove_from_dictionary(&self, key: &str, entry: &str) -> bool;
    fn retrieve_dictionary(&self, key: &str) -> Option<HashMap<String, StoreValue>>;
    fn retrieve_dictionary_entry(&self, key: &str, entry: &str) -> Option<StoreValue>;
    fn exists_in_dictionary(&self, key: &str, entry: &str) -> bool;
    fn length_of_dictionary(&self, key: &str) -> Option<usize>;
    fn clear_dictionary(&self, key: &str) -> bool;

    // == Queue ==
    fn cache_as_queue(&self, key: &str, items: Vec<StoreValue>, ttl: Duration) -> bool;
    fn push_queue(&self, key: &str, value: StoreValue) -> bool;
    /// Oldest element, or None for an empty or absent queue.
    fn pop_queue(&self, key: &str) -> Option<StoreValue>;
    fn peek_queue(&self, key: &str) -> Option<StoreValue>;
    /// Snapshot in FIFO order.
    fn retrieve_queue(&self, key: &str) -> Option<Vec<StoreValue>>;
    fn length_of_queue(&self, key: &str) -> Option<usize>;
    fn clear_queue(&self, key: &str) -> bool;
}
