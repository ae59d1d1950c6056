//! Cache Module
//!
//! The in-process multi-type store and the engine contract it implements.

mod bytes;
mod engine;
mod entry;
mod stats;
mod store;
mod value;


// Re-export public types
pub use bytes::{bytes_equal, compare_bytes};
pub use engine::CacheEngine;
pub use entry::{ExpiryRecord, Kind};
pub use stats::CacheStats;
pub use store::MemoryStore;
pub use value::StoreValue;

// == Public Constants ==
/// Default minimum interval between two expiry sweeps, in milliseconds
pub const DEFAULT_SWEEP_INTERVAL_MS: u64 = 500;
