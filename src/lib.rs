//! Mini Cache - A keyed caching layer with typed value encoding
//!
//! Callers address values through structured [`CacheKey`]s. A
//! [`CacheClient`] decides per type whether to store a value natively or to
//! serialize and compress it, then drives a [`CacheEngine`]. The bundled
//! [`MemoryStore`] engine keeps scalars, sets, lists, dictionaries and queues
//! in process with absolute TTL expiry.

pub mod cache;
pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod key;
pub mod tasks;

pub use cache::{CacheEngine, MemoryStore, StoreValue};
pub use client::CacheClient;
pub use config::EngineConfig;
pub use error::{CacheError, Result};
pub use key::{CacheKey, KeyElement};
pub use tasks::spawn_sweep_task;
