//! Cache Client Module
//!
//! The value encoding pipeline: canonicalizes keys, encodes typed values
//! (natively or through the serializer and compressor) and drives a
//! [`CacheEngine`].

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, warn};

use crate::cache::{CacheEngine, StoreValue};
use crate::codec::{CacheValue, Codec, CompressionKind, Compressor, JsonSerializer, Serializer};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::key::CacheKey;

// == Cache Client ==
/// Typed facade over a storage engine.
///
/// Stateless apart from its engine and codec, so it can be shared freely
/// across threads.
#[derive(Debug)]
pub struct CacheClient<E, S = JsonSerializer> {
    engine: Arc<E>,
    codec: Codec<S>,
}

impl<E, S> Clone for CacheClient<E, S>
where
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            codec: self.codec.clone(),
        }
    }
}

impl<E: CacheEngine, S: Serializer> CacheClient<E, S> {
    // == Constructors ==
    /// Creates a client that stores serialized values uncompressed.
    pub fn new(engine: Arc<E>, serializer: S) -> Self {
        Self {
            engine,
            codec: Codec::new(serializer, None),
        }
    }

    /// Creates a client compressing serialized values with `compressor`.
    pub fn with_compressor(
        engine: Arc<E>,
        serializer: S,
        compressor: Arc<dyn Compressor>,
    ) -> Self {
        Self {
            engine,
            codec: Codec::new(serializer, Some(compressor)),
        }
    }

    /// Resolves the configured compression strategy and initialises the
    /// engine. Fails before any cache operation on an unknown strategy.
    pub fn from_config(engine: Arc<E>, serializer: S, config: &EngineConfig) -> Result<Self> {
        let compression = CompressionKind::from_name(&config.compression)?;
        engine.initialise(config)?;
        debug!(?compression, "cache client configured");
        Ok(Self {
            engine,
            codec: Codec::new(serializer, compression.compressor()),
        })
    }

    pub fn engine(&self) -> &Arc<E> {
        &self.engine
    }

    pub fn codec(&self) -> &Codec<S> {
        &self.codec
    }

    // == Encoding Helpers ==
    fn encode<T: CacheValue>(&self, value: &T) -> Result<StoreValue> {
        value.encode(&self.codec)
    }

    fn decode<T: CacheValue>(&self, value: StoreValue) -> Result<T> {
        T::decode(value, &self.codec)
    }

    fn decode_opt<T: CacheValue>(&self, value: Option<StoreValue>) -> Result<Option<T>> {
        value.map(|v| self.decode(v)).transpose()
    }

    fn encode_all<T: CacheValue>(&self, items: &[T]) -> Result<Vec<StoreValue>> {
        items.iter().map(|item| self.encode(item)).collect()
    }

    fn decode_all<T: CacheValue>(
        &self,
        items: Option<Vec<StoreValue>>,
    ) -> Result<Option<Vec<T>>> {
        items
            .map(|values| {
                values
                    .into_iter()
                    .map(|v| self.decode(v))
                    .collect::<Result<Vec<_>>>()
            })
            .transpose()
    }

    // == Scalar ==
    /// Encodes and stores `value`, returning a freshly decoded copy.
    ///
    /// Returns `None` when the engine rejected the entry (non-positive TTL)
    /// or when a serialized payload came out empty, in which case the key is
    /// removed instead.
    pub fn cache<T: CacheValue>(
        &self,
        key: &CacheKey,
        value: &T,
        ttl: Duration,
    ) -> Result<Option<T>> {
        let encoded = self.encode(value)?;

        if !T::NATIVE && encoded.is_empty_bytes() {
            debug!(key = %key, "empty payload, removing key");
            self.engine.remove(key.canonical());
            return Ok(None);
        }

        let copy = self.decode(encoded.clone())?;
        if self.engine.cache(key.canonical(), encoded, ttl) {
            Ok(Some(copy))
        } else {
            Ok(None)
        }
    }

    /// The stored value, or `None` when absent or expired.
    pub fn retrieve<T: CacheValue>(&self, key: &CacheKey) -> Result<Option<T>> {
        let value = self.engine.retrieve(key.canonical());
        self.decode_opt(value)
    }

    /// The stored value, or `default` when absent or expired.
    pub fn retrieve_or<T: CacheValue>(&self, key: &CacheKey, default: T) -> Result<T> {
        Ok(self.retrieve(key)?.unwrap_or(default))
    }

    /// Returns the stored value, or computes, stores and returns a new one.
    ///
    /// `compute` runs at most once. Storing the computed value is best
    /// effort; the computed value is returned as is either way.
    pub fn retrieve_or_recache<T, F>(
        &self,
        key: &CacheKey,
        compute: F,
        ttl: Duration,
    ) -> Result<T>
    where
        T: CacheValue,
        F: FnOnce() -> T,
    {
        if let Some(value) = self.retrieve(key)? {
            return Ok(value);
        }

        let value = compute();
        match self.encode(&value) {
            Ok(encoded) => {
                if !self.engine.cache(key.canonical(), encoded, ttl) {
                    warn!(key = %key, "failed to store recomputed value");
                }
            }
            Err(err) => warn!(key = %key, error = %err, "failed to encode recomputed value"),
        }
        Ok(value)
    }

    pub fn remove(&self, key: &CacheKey) -> bool {
        self.engine.remove(key.canonical())
    }

    pub fn exists(&self, key: &CacheKey) -> bool {
        self.engine.exists(key.canonical())
    }

    pub fn time_to_live(&self, key: &CacheKey) -> Option<Duration> {
        self.engine.time_to_live(key.canonical())
    }

    // == Set ==
    pub fn cache_as_set<T: CacheValue>(
        &self,
        key: &CacheKey,
        items: &[T],
        ttl: Duration,
    ) -> Result<bool> {
        let encoded = self.encode_all(items)?;
        Ok(self.engine.cache_as_set(key.canonical(), encoded, ttl))
    }

    pub fn add_to_set<T: CacheValue>(&self, key: &CacheKey, value: &T) -> Result<bool> {
        let encoded = self.encode(value)?;
        Ok(self.engine.add_to_set(key.canonical(), encoded))
    }

    pub fn remove_from_set<T: CacheValue>(&self, key: &CacheKey, value: &T) -> Result<bool> {
        let encoded = self.encode(value)?;
        Ok(self.engine.remove_from_set(key.canonical(), &encoded))
    }

    /// Sorted copy of the set.
    pub fn retrieve_set<T: CacheValue>(&self, key: &CacheKey) -> Result<Option<Vec<T>>> {
        let items = self.engine.retrieve_set(key.canonical());
        self.decode_all(items)
    }

    pub fn exists_in_set<T: CacheValue>(&self, key: &CacheKey, value: &T) -> Result<bool> {
        let encoded = self.encode(value)?;
        Ok(self.engine.exists_in_set(key.canonical(), &encoded))
    }

    pub fn length_of_set(&self, key: &CacheKey) -> Option<usize> {
        self.engine.length_of_set(key.canonical())
    }

    pub fn clear_set(&self, key: &CacheKey) -> bool {
        self.engine.clear_set(key.canonical())
    }

    // == List ==
    pub fn cache_as_list<T: CacheValue>(
        &self,
        key: &CacheKey,
        items: &[T],
        ttl: Duration,
    ) -> Result<bool> {
        let encoded = self.encode_all(items)?;
        Ok(self.engine.cache_as_list(key.canonical(), encoded, ttl))
    }

    pub fn append_to_list<T: CacheValue>(&self, key: &CacheKey, value: &T) -> Result<bool> {
        let encoded = self.encode(value)?;
        Ok(self.engine.append_to_list(key.canonical(), encoded))
    }

    pub fn retrieve_list<T: CacheValue>(&self, key: &CacheKey) -> Result<Option<Vec<T>>> {
        let items = self.engine.retrieve_list(key.canonical());
        self.decode_all(items)
    }

    /// See [`CacheEngine::shrink_list`].
    pub fn shrink_list(&self, key: &CacheKey, first: i64, last: i64) -> bool {
        self.engine.shrink_list(key.canonical(), first, last)
    }

    /// Count of removed elements, or `-1` when there is no such list.
    pub fn remove_from_list<T: CacheValue>(&self, key: &CacheKey, value: &T) -> Result<i64> {
        let encoded = self.encode(value)?;
        Ok(self.engine.remove_from_list(key.canonical(), &encoded))
    }

    pub fn length_of_list(&self, key: &CacheKey) -> Option<usize> {
        self.engine.length_of_list(key.canonical())
    }

    pub fn clear_list(&self, key: &CacheKey) -> bool {
        self.engine.clear_list(key.canonical())
    }

    // == Dictionary ==
    pub fn cache_as_dictionary<T: CacheValue>(
        &self,
        key: &CacheKey,
        items: &HashMap<String, T>,
        ttl: Duration,
    ) -> Result<bool> {
        let encoded = items
            .iter()
            .map(|(entry, value)| Ok((entry.clone(), self.encode(value)?)))
            .collect::<Result<HashMap<_, _>>>()?;
        Ok(self.engine.cache_as_dictionary(key.canonical(), encoded, ttl))
    }

    pub fn add_to_dictionary<T: CacheValue>(
        &self,
        key: &CacheKey,
        entry: &str,
        value: &T,
    ) -> Result<bool> {
        let encoded = self.encode(value)?;
        Ok(self.engine.add_to_dictionary(key.canonical(), entry, encoded))
    }

    pub fn update_dictionary_entry<T: CacheValue>(
        &self,
        key: &CacheKey,
        entry: &str,
        value: &T,
    ) -> Result<bool> {
        let encoded = self.encode(value)?;
        Ok(self.engine.update_dictionary_entry(key.canonical(), entry, encoded))
    }

    pub fn remove_from_dictionary(&self, key: &CacheKey, entry: &str) -> bool {
        self.engine.remove_from_dictionary(key.canonical(), entry)
    }

    pub fn retrieve_dictionary<T: CacheValue>(
        &self,
        key: &CacheKey,
    ) -> Result<Option<HashMap<String, T>>> {
        self.engine
            .retrieve_dictionary(key.canonical())
            .map(|items| {
                items
                    .into_iter()
                    .map(|(entry, value)| Ok((entry, self.decode(value)?)))
                    .collect::<Result<HashMap<_, _>>>()
            })
            .transpose()
    }

    pub fn retrieve_dictionary_entry<T: CacheValue>(
        &self,
        key: &CacheKey,
        entry: &str,
    ) -> Result<Option<T>> {
        let value = self.engine.retrieve_dictionary_entry(key.canonical(), entry);
        self.decode_opt(value)
    }

    pub fn exists_in_dictionary(&self, key: &CacheKey, entry: &str) -> bool {
        self.engine.exists_in_dictionary(key.canonical(), entry)
    }

    pub fn length_of_dictionary(&self, key: &CacheKey) -> Option<usize> {
        self.engine.length_of_dictionary(key.canonical())
    }

    pub fn clear_dictionary(&self, key: &CacheKey) -> bool {
        self.engine.clear_dictionary(key.canonical())
    }

    // == Queue ==
    pub fn cache_as_queue<T: CacheValue>(
        &self,
        key: &CacheKey,
        items: &[T],
        ttl: Duration,
    ) -> Result<bool> {
        let encoded = self.encode_all(items)?;
        Ok(self.engine.cache_as_queue(key.canonical(), encoded, ttl))
    }

    pub fn push_queue<T: CacheValue>(&self, key: &CacheKey, value: &T) -> Result<bool> {
        let encoded = self.encode(value)?;
        Ok(self.engine.push_queue(key.canonical(), encoded))
    }

    /// Oldest element, or `None` for an empty or absent queue.
    pub fn pop_queue<T: CacheValue>(&self, key: &CacheKey) -> Result<Option<T>> {
        let value = self.engine.pop_queue(key.canonical());
        self.decode_opt(value)
    }

    pub fn peek_queue<T: CacheValue>(&self, key: &CacheKey) -> Result<Option<T>> {
        let value = self.engine.peek_queue(key.canonical());
        self.decode_opt(value)
    }

    pub fn retrieve_queue<T: CacheValue>(&self, key: &CacheKey) -> Result<Option<Vec<T>>> {
        let items = self.engine.retrieve_queue(key.canonical());
        self.decode_all(items)
    }

    pub fn length_of_queue(&self, key: &CacheKey) -> Option<usize> {
        self.engine.length_of_queue(key.canonical())
    }

    pub fn clear_queue(&self, key: &CacheKey) -> bool {
        self.engine.clear_queue(key.canonical())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStore;
    use crate::cache_key;
    use crate::codec::{Encoded, GzipCompressor, MessagePackSerializer, Serialized};
    use crate::error::CacheError;
    use serde::{Deserialize, Serialize};
    use std::cell::Cell;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Profile {
        name: String,
        tags: Vec<String>,
    }

    impl Encoded for Profile {}

    fn profile(name: &str) -> Profile {
        Profile {
            name: name.to_string(),
            tags: vec!["admin".to_string()],
        }
    }

    fn client() -> CacheClient<MemoryStore> {
        CacheClient::new(Arc::new(MemoryStore::new()), JsonSerializer)
    }

    fn ttl() -> Duration {
        Duration::seconds(300)
    }

    #[test]
    fn test_cache_returns_decoded_copy() {
        let client = client();
        let key = cache_key!("profile", 1);
        let original = profile("ada");

        let copy = client.cache(&key, &original, ttl()).unwrap().unwrap();

        assert_eq!(copy, original);
        assert!(!std::ptr::eq(&copy, &original));
        assert_eq!(client.retrieve::<Profile>(&key).unwrap(), Some(original));
    }

    #[test]
    fn test_serialized_values_are_bytes_in_store() {
        let client = client();
        let key = cache_key!("profile", 2);

        client.cache(&key, &profile("bob"), ttl()).unwrap();

        let raw = client.engine().retrieve(key.canonical()).unwrap();
        assert!(matches!(raw, StoreValue::Bytes(_)));
    }

    #[test]
    fn test_native_values_stored_natively() {
        let client = client();
        let key = cache_key!("counter");

        assert_eq!(client.cache(&key, &41i64, ttl()).unwrap(), Some(41));
        assert_eq!(
            client.engine().retrieve(key.canonical()),
            Some(StoreValue::Int(41))
        );
    }

    #[test]
    fn test_cache_with_non_positive_ttl() {
        let client = client();
        let key = cache_key!("profile", 3);

        assert_eq!(client.cache(&key, &profile("x"), Duration::zero()).unwrap(), None);
        assert!(!client.exists(&key));
    }

    #[test]
    fn test_retrieve_or_default() {
        let client = client();
        let key = cache_key!("missing");

        assert_eq!(client.retrieve_or(&key, 7u32).unwrap(), 7);
        client.cache(&key, &9u32, ttl()).unwrap();
        assert_eq!(client.retrieve_or(&key, 7u32).unwrap(), 9);
    }

    #[test]
    fn test_retrieve_wrong_type_is_mismatch() {
        let client = client();
        let key = cache_key!("profile", 4);

        client.cache(&key, &profile("eve"), ttl()).unwrap();

        assert!(matches!(
            client.retrieve::<i32>(&key),
            Err(CacheError::TypeMismatch(_))
        ));
        assert!(matches!(
            client.retrieve::<Serialized<Vec<u64>>>(&key),
            Err(CacheError::TypeMismatch(_))
        ));
    }

    #[test]
    fn test_retrieve_or_recache_computes_once() {
        let client = client();
        let key = cache_key!("expensive", "report");
        let calls = Cell::new(0);

        let compute = || {
            calls.set(calls.get() + 1);
            profile("computed")
        };
        let first = client.retrieve_or_recache(&key, compute, ttl()).unwrap();
        let second = client
            .retrieve_or_recache(&key, || profile("other"), ttl())
            .unwrap();

        assert_eq!(calls.get(), 1);
        assert_eq!(first, profile("computed"));
        assert_eq!(second, profile("computed"));
    }

    #[test]
    fn test_retrieve_or_recache_store_failure_still_returns() {
        let client = client();
        let key = cache_key!("expensive", "ttl");

        let value = client
            .retrieve_or_recache(&key, || 5i32, Duration::zero())
            .unwrap();

        assert_eq!(value, 5);
        assert!(!client.exists(&key));
    }

    #[test]
    fn test_compressed_client_roundtrip() {
        let store = Arc::new(MemoryStore::new());
        let plain = CacheClient::new(store.clone(), JsonSerializer);
        let gzip =
            CacheClient::with_compressor(store.clone(), JsonSerializer, Arc::new(GzipCompressor));
        let key = cache_key!("profile", "gz");

        gzip.cache(&key, &profile("zip"), ttl()).unwrap();

        assert_eq!(gzip.retrieve::<Profile>(&key).unwrap(), Some(profile("zip")));
        assert!(plain.retrieve::<Profile>(&key).is_err());
    }

    #[test]
    fn test_messagepack_client() {
        let client = CacheClient::new(Arc::new(MemoryStore::new()), MessagePackSerializer);
        let key = cache_key!("profile", "mp");

        client.cache(&key, &profile("pack"), ttl()).unwrap();

        assert_eq!(client.retrieve::<Profile>(&key).unwrap(), Some(profile("pack")));
    }

    #[test]
    fn test_from_config_rejects_unknown_compression() {
        let config = EngineConfig {
            compression: "snappy".to_string(),
            ..EngineConfig::default()
        };

        let store = Arc::new(MemoryStore::new());
        let result = CacheClient::from_config(store, JsonSerializer, &config);

        assert!(matches!(result, Err(CacheError::Configuration(_))));
    }

    #[test]
    fn test_from_config_selects_compressor() {
        let config = EngineConfig {
            compression: "deflate".to_string(),
            ..EngineConfig::default()
        };

        let store = Arc::new(MemoryStore::new());
        let client = CacheClient::from_config(store, JsonSerializer, &config).unwrap();

        assert!(client.codec().is_compressed());
    }

    #[test]
    fn test_typed_set_operations() {
        let client = client();
        let key = cache_key!("scores");

        client.cache_as_set(&key, &[34.4, 8.12, 9.0, 101022.0003], ttl()).unwrap();

        assert_eq!(
            client.retrieve_set::<f64>(&key).unwrap(),
            Some(vec![8.12, 9.0, 34.4, 101022.0003])
        );
        assert!(client.exists_in_set(&key, &8.12).unwrap());
        assert!(!client.exists_in_set(&key, &8.13).unwrap());
        assert!(client.add_to_set(&key, &1.0).unwrap());
        assert!(!client.add_to_set(&key, &1.0).unwrap());
        assert!(client.remove_from_set(&key, &1.0).unwrap());
        assert_eq!(client.length_of_set(&key), Some(4));
    }

    #[test]
    fn test_integer_width_does_not_change_lookups() {
        let client = client();
        let set_key = cache_key!("ids");
        let list_key = cache_key!("hits");

        client.cache_as_set(&set_key, &[1i32, 2, 3], ttl()).unwrap();
        client.cache_as_list(&list_key, &[7i32, 7, 8], ttl()).unwrap();

        assert_eq!(client.retrieve_set::<u32>(&set_key).unwrap(), Some(vec![1, 2, 3]));
        assert!(client.exists_in_set(&set_key, &2u32).unwrap());
        assert!(!client.add_to_set(&set_key, &3u8).unwrap());
        assert!(client.remove_from_set(&set_key, &1u64).unwrap());
        assert_eq!(client.remove_from_list(&list_key, &7u32).unwrap(), 2);
        assert_eq!(client.retrieve_list::<i64>(&list_key).unwrap(), Some(vec![8]));
    }

    #[test]
    fn test_typed_list_of_serialized_values() {
        let client = client();
        let key = cache_key!("people");

        client
            .cache_as_list(&key, &[profile("a"), profile("b"), profile("a")], ttl())
            .unwrap();
        client.append_to_list(&key, &profile("c")).unwrap();

        assert_eq!(client.remove_from_list(&key, &profile("a")).unwrap(), 2);
        assert_eq!(
            client.retrieve_list::<Profile>(&key).unwrap(),
            Some(vec![profile("b"), profile("c")])
        );
        assert_eq!(client.remove_from_list(&cache_key!("nope"), &profile("a")).unwrap(), -1);
    }

    #[test]
    fn test_typed_dictionary() {
        let client = client();
        let key = cache_key!("settings", "eu");
        let items = HashMap::from([("limit".to_string(), 10u32)]);

        client.cache_as_dictionary(&key, &items, ttl()).unwrap();

        assert!(client.add_to_dictionary(&key, "burst", &20u32).unwrap());
        assert!(!client.add_to_dictionary(&key, "limit", &99u32).unwrap());
        assert!(client.update_dictionary_entry(&key, "limit", &15u32).unwrap());
        assert_eq!(
            client.retrieve_dictionary_entry::<u32>(&key, "limit").unwrap(),
            Some(15)
        );

        let all = client.retrieve_dictionary::<u32>(&key).unwrap().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all["burst"], 20);
        assert!(client.remove_from_dictionary(&key, "burst"));
        assert!(!client.exists_in_dictionary(&key, "burst"));
    }

    #[test]
    fn test_typed_queue() {
        let client = client();
        let key = cache_key!("jobs");

        client
            .cache_as_queue(&key, &["a".to_string(), "b".to_string()], ttl())
            .unwrap();
        client.push_queue(&key, &"c".to_string()).unwrap();

        assert_eq!(client.peek_queue::<String>(&key).unwrap(), Some("a".to_string()));
        assert_eq!(client.length_of_queue(&key), Some(3));
        assert_eq!(client.pop_queue::<String>(&key).unwrap(), Some("a".to_string()));
        assert_eq!(
            client.retrieve_queue::<String>(&key).unwrap(),
            Some(vec!["b".to_string(), "c".to_string()])
        );
        assert!(client.clear_queue(&key));
        assert_eq!(client.pop_queue::<String>(&key).unwrap(), None);
    }
}
