//! Codec Module
//!
//! Collaborators of the value encoding pipeline: serializers, compressors and
//! the compile-time split between natively stored and serialized values.

mod compressor;
mod serializer;
mod value;

pub use compressor::{CompressionKind, Compressor, DeflateCompressor, GzipCompressor};
pub use serializer::{JsonSerializer, MessagePackSerializer, SerializationError, Serializer};
pub use value::{CacheValue, Codec, Encoded, Serialized};
