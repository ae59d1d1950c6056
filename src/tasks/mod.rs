//! Background Tasks Module
//!
//! # Tasks
//! - Expiry Sweep: purges expired store entries at a fixed interval

mod sweep;

pub use sweep::spawn_sweep_task;
