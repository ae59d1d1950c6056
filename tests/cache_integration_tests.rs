//! Integration Tests for the Cache Client and Memory Store
//!
//! Exercises full key -> pipeline -> store cycles through the public API.

use std::sync::Arc;
use std::thread::sleep;
use std::time::Duration as StdDuration;

use chrono::{Duration, NaiveDate};
use mini_cache::codec::{Encoded, JsonSerializer};
use mini_cache::{cache_key, spawn_sweep_task, CacheClient, CacheEngine, EngineConfig, MemoryStore};
use serde::{Deserialize, Serialize};

// == Helper Functions ==

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mini_cache=debug".into()),
        )
        .with_test_writer()
        .try_init();
}

fn create_test_client() -> CacheClient<MemoryStore> {
    init_tracing();
    CacheClient::new(Arc::new(MemoryStore::new()), JsonSerializer)
}

fn ttl() -> Duration {
    Duration::seconds(300)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Invoice {
    number: u64,
    lines: Vec<(String, f64)>,
}

impl Encoded for Invoice {}

fn invoice() -> Invoice {
    Invoice {
        number: 1001,
        lines: vec![("widget".to_string(), 2.5), ("gadget".to_string(), 10.0)],
    }
}

// == Keys ==

#[test]
fn test_equal_keys_address_the_same_entry() {
    let client = create_test_client();
    let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();

    client
        .cache(&cache_key!("invoice", 1001, day), &invoice(), ttl())
        .unwrap();

    let found = client
        .retrieve::<Invoice>(&cache_key!("invoice", 1001u64, day))
        .unwrap();
    assert_eq!(found, Some(invoice()));
    assert!(client.exists(&cache_key!("invoice", "1001", "2024-05-01")));
}

// == Scalar ==

#[test]
fn test_cache_roundtrip_returns_equal_copy() {
    let client = create_test_client();
    let key = cache_key!("invoice", 1);
    let original = invoice();

    let copy = client.cache(&key, &original, ttl()).unwrap().unwrap();

    assert_eq!(copy, original);
    assert_eq!(client.retrieve::<Invoice>(&key).unwrap(), Some(original));
}

#[test]
fn test_zero_ttl_leaves_key_absent() {
    let client = create_test_client();
    let key = cache_key!("invoice", 2);

    assert_eq!(client.cache(&key, &invoice(), Duration::zero()).unwrap(), None);
    assert!(!client.exists(&key));
}

#[test]
fn test_entry_expires_after_ttl_and_sweep() {
    let client = create_test_client();
    let key = cache_key!("session", "abc");

    client
        .cache(&key, &"token".to_string(), Duration::milliseconds(640))
        .unwrap();
    assert!(client.exists(&key));

    // Past both the TTL and the 500 ms sweep throttle
    sleep(StdDuration::from_millis(1200));

    assert_eq!(client.retrieve::<String>(&key).unwrap(), None);
    assert!(client.engine().is_empty());
}

// == Queue ==

#[test]
fn test_queue_pops_in_order_then_not_found() {
    let client = create_test_client();
    let key = cache_key!("jobs");

    client
        .cache_as_queue(&key, &['a', 'b', 'c'], ttl())
        .unwrap();

    assert_eq!(client.pop_queue::<char>(&key).unwrap(), Some('a'));
    assert_eq!(client.pop_queue::<char>(&key).unwrap(), Some('b'));
    assert_eq!(client.pop_queue::<char>(&key).unwrap(), Some('c'));
    assert_eq!(client.pop_queue::<char>(&key).unwrap(), None);
}

// == List ==

#[test]
fn test_shrink_list_keeps_last_two() {
    let client = create_test_client();
    let key = cache_key!("recent");

    client.cache_as_list(&key, &[1, 2, 3, 4, 5], ttl()).unwrap();
    assert!(client.shrink_list(&key, -2, -1));

    assert_eq!(client.retrieve_list::<i32>(&key).unwrap(), Some(vec![4, 5]));
}

#[test]
fn test_shrink_list_invalid_range_clears_but_keeps_key() {
    let client = create_test_client();
    let key = cache_key!("recent");

    client.cache_as_list(&key, &[1, 2, 3, 4, 5], ttl()).unwrap();
    assert!(client.shrink_list(&key, 3, 1));

    assert_eq!(client.length_of_list(&key), Some(0));
    assert!(client.exists(&key));
}

#[test]
fn test_remove_from_list_byte_sequences() {
    let client = create_test_client();
    let key = cache_key!("blobs");
    let needle: Vec<u8> = vec![20, 19, 12, 28];

    client
        .cache_as_list(
            &key,
            &[needle.clone(), vec![1, 2], needle.clone(), needle.clone()],
            ttl(),
        )
        .unwrap();

    assert_eq!(client.remove_from_list(&key, &needle).unwrap(), 3);
    assert_eq!(client.remove_from_list(&key, &needle).unwrap(), 0);
    assert_eq!(client.length_of_list(&key), Some(1));
}

#[test]
fn test_typed_and_raw_removal_agree() {
    let client = create_test_client();
    let key = cache_key!("mixed");

    client.cache_as_list(&key, &[7i64, 8, 7], ttl()).unwrap();

    // Same logical element through the engine directly
    let removed = client
        .engine()
        .remove_from_list(key.canonical(), &mini_cache::StoreValue::Int(7));
    assert_eq!(removed, 2);
    assert_eq!(client.remove_from_list(&key, &8i64).unwrap(), 1);
}

// == Set ==

#[test]
fn test_double_set_sorted_and_searchable() {
    let client = create_test_client();
    let key = cache_key!("measurements");

    client
        .cache_as_set(&key, &[34.4, 8.12, 9.0, 101022.0003], ttl())
        .unwrap();

    let values = client.retrieve_set::<f64>(&key).unwrap().unwrap();
    assert_eq!(values, vec![8.12, 9.0, 34.4, 101022.0003]);
    assert!(client.exists_in_set(&key, &8.12).unwrap());
    assert!(!client.exists_in_set(&key, &8.13).unwrap());
}

#[test]
fn test_set_of_serialized_values_deduplicates() {
    let client = create_test_client();
    let key = cache_key!("invoices");

    client
        .cache_as_set(&key, &[invoice(), invoice()], ttl())
        .unwrap();

    assert_eq!(client.length_of_set(&key), Some(1));
    assert!(client.exists_in_set(&key, &invoice()).unwrap());
}

// == Kinds ==

#[test]
fn test_new_kind_overwrites_previous_kind() {
    let client = create_test_client();
    let key = cache_key!("shape");

    client.cache_as_list(&key, &[1, 2], ttl()).unwrap();
    client
        .cache_as_queue(&key, &["x".to_string()], ttl())
        .unwrap();

    assert_eq!(client.length_of_list(&key), None);
    assert_eq!(client.length_of_queue(&key), Some(1));
}

// == Configuration ==

#[test]
fn test_client_from_config_with_gzip() {
    init_tracing();
    let config = EngineConfig {
        compression: "gzip".to_string(),
        sweep_interval_ms: 100,
        ..EngineConfig::default()
    };
    let store = Arc::new(MemoryStore::from_config(&config));
    let client = CacheClient::from_config(store, JsonSerializer, &config).unwrap();
    let key = cache_key!("invoice", "gz");

    client.cache(&key, &invoice(), ttl()).unwrap();

    assert_eq!(client.retrieve::<Invoice>(&key).unwrap(), Some(invoice()));
    assert_eq!(client.engine().sweep_interval(), Duration::milliseconds(100));
}

// == Background Sweep ==

#[tokio::test]
async fn test_background_sweep_purges_untouched_keys() {
    init_tracing();
    let store = Arc::new(MemoryStore::new());
    let client = CacheClient::new(store.clone(), JsonSerializer);

    client
        .cache(&cache_key!("temp"), &1u8, Duration::milliseconds(50))
        .unwrap();
    let handle = spawn_sweep_task(store.clone(), StdDuration::from_millis(100));

    tokio::time::sleep(StdDuration::from_millis(400)).await;

    assert!(store.is_empty());
    handle.abort();
}
