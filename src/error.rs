//! Error types for the cache
//!
//! Provides unified error handling using thiserror. Absent keys are never
//! errors; only programmer and configuration mistakes end up here.

use thiserror::Error;

use crate::codec::SerializationError;

// == Cache Error Enum ==
/// Unified error type for the cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// A stored value could not be read back as the requested type
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    /// A value could not be turned into bytes
    #[error("Serialization failed: {0}")]
    Serialization(#[from] SerializationError),

    /// The compression stream failed
    #[error("Compression failed: {0}")]
    Compression(#[from] std::io::Error),

    /// Invalid or unresolvable configuration
    #[error("Configuration error: {0}")]
    Configuration(String),
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
