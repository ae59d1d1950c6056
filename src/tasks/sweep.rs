//! Expiry Sweep Task
//!
//! Background task that periodically purges expired entries from a
//! [`MemoryStore`], independent of caller traffic.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::MemoryStore;

/// Spawns a background task that forces an expiry sweep every `interval`.
///
/// The store already sweeps lazily on access; this task keeps memory bounded
/// for keys nobody touches again.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort it.
///
/// # Example
/// ```ignore
/// let store = Arc::new(MemoryStore::new());
/// let handle = spawn_sweep_task(store.clone(), Duration::from_secs(1));
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_sweep_task(store: Arc<MemoryStore>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(interval_ms = interval.as_millis() as u64, "starting expiry sweep task");

        loop {
            tokio::time::sleep(interval).await;

            let removed = store.sweep_expired();
            if removed > 0 {
                info!(removed, "expiry sweep removed entries");
            } else {
                debug!("expiry sweep found no expired entries");
            }
        }
    })
}
