//! Cache Value Module
//!
//! Decides, per type and at compile time, whether a value is stored natively
//! or serialized (and optionally compressed) into bytes.

use std::any::type_name;
use std::sync::Arc;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{Compressor, Serializer};
use crate::cache::StoreValue;
use crate::error::{CacheError, Result};

// == Codec ==
/// Serializer plus optional compressor used for non-native values.
#[derive(Debug, Clone)]
pub struct Codec<S> {
    serializer: S,
    compressor: Option<Arc<dyn Compressor>>,
}

impl<S: Serializer> Codec<S> {
    pub fn new(serializer: S, compressor: Option<Arc<dyn Compressor>>) -> Self {
        Self {
            serializer,
            compressor,
        }
    }

    pub fn serializer(&self) -> &S {
        &self.serializer
    }

    pub fn is_compressed(&self) -> bool {
        self.compressor.is_some()
    }

    /// Serialize, then compress when a compressor is configured.
    pub fn encode_bytes<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        let bytes = self.serializer.serialize(value)?;
        match &self.compressor {
            Some(compressor) => Ok(compressor.compress(&bytes)?),
            None => Ok(bytes),
        }
    }

    /// Reverse of [`Codec::encode_bytes`]. Bytes that do not decode as `T`
    /// are a type mismatch.
    pub fn decode_bytes<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        let decompressed;
        let payload = match &self.compressor {
            Some(compressor) => {
                decompressed = compressor.decompress(bytes)?;
                decompressed.as_slice()
            }
            None => bytes,
        };
        self.serializer.deserialize(payload).map_err(|err| {
            CacheError::TypeMismatch(format!(
                "cannot decode {} from stored bytes: {err}",
                type_name::<T>()
            ))
        })
    }
}

// == Cache Value ==
/// A type the encoding pipeline knows how to store.
///
/// Primitive-like types (numbers, text, booleans, characters, date/times,
/// durations and raw bytes) are stored natively. Any serde type opts into
/// the serialized path by implementing [`Encoded`].
pub trait CacheValue: Sized {
    /// True when the value bypasses the serializer.
    const NATIVE: bool;

    fn encode<S: Serializer>(&self, codec: &Codec<S>) -> Result<StoreValue>;

    fn decode<S: Serializer>(value: StoreValue, codec: &Codec<S>) -> Result<Self>;
}

/// Marker for types stored through the serializer.
///
/// ```
/// use mini_cache::codec::Encoded;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Profile {
///     name: String,
/// }
///
/// impl Encoded for Profile {}
/// ```
pub trait Encoded: Serialize + DeserializeOwned {}

impl<T: Encoded> CacheValue for T {
    const NATIVE: bool = false;

    fn encode<S: Serializer>(&self, codec: &Codec<S>) -> Result<StoreValue> {
        Ok(StoreValue::Bytes(codec.encode_bytes(self)?))
    }

    fn decode<S: Serializer>(value: StoreValue, codec: &Codec<S>) -> Result<Self> {
        match value {
            StoreValue::Bytes(bytes) => codec.decode_bytes(&bytes),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

/// Routes any serde value through the serializer, for types that cannot
/// implement [`Encoded`] themselves (e.g. `Vec<T>` or foreign structs).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Serialized<T>(pub T);

impl<T: Serialize + DeserializeOwned> Encoded for Serialized<T> {}

fn mismatch<T>(found: &StoreValue) -> CacheError {
    CacheError::TypeMismatch(format!(
        "expected {}, found {}",
        type_name::<T>(),
        found.kind_name()
    ))
}

// == Native Values ==
macro_rules! native_direct {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl CacheValue for $t {
                const NATIVE: bool = true;

                fn encode<S: Serializer>(&self, _codec: &Codec<S>) -> Result<StoreValue> {
                    Ok(StoreValue::$variant(self.clone()))
                }

                fn decode<S: Serializer>(value: StoreValue, _codec: &Codec<S>) -> Result<Self> {
                    match value {
                        StoreValue::$variant(v) => Ok(v),
                        other => Err(mismatch::<Self>(&other)),
                    }
                }
            }
        )*
    };
}

native_direct!(
    bool => Bool,
    char => Char,
    String => Text,
    Vec<u8> => Bytes,
    Duration => Duration,
    NaiveDateTime => DateTime,
    DateTime<FixedOffset> => DateTimeOffset,
);

/// Integers convert between signed and unsigned storage when the value fits.
macro_rules! native_int {
    ($variant:ident, $wide:ty; $($t:ty),*) => {
        $(
            impl CacheValue for $t {
                const NATIVE: bool = true;

                fn encode<S: Serializer>(&self, _codec: &Codec<S>) -> Result<StoreValue> {
                    Ok(StoreValue::$variant(*self as $wide))
                }

                fn decode<S: Serializer>(value: StoreValue, _codec: &Codec<S>) -> Result<Self> {
                    let converted = match &value {
                        StoreValue::Int(v) => <$t>::try_from(*v).ok(),
                        StoreValue::UInt(v) => <$t>::try_from(*v).ok(),
                        _ => None,
                    };
                    converted.ok_or_else(|| mismatch::<Self>(&value))
                }
            }
        )*
    };
}

native_int!(Int, i64; i8, i16, i32, i64, isize);
native_int!(UInt, u64; u8, u16, u32, u64, usize);

impl CacheValue for f64 {
    const NATIVE: bool = true;

    fn encode<S: Serializer>(&self, _codec: &Codec<S>) -> Result<StoreValue> {
        Ok(StoreValue::Float(*self))
    }

    fn decode<S: Serializer>(value: StoreValue, _codec: &Codec<S>) -> Result<Self> {
        match value {
            StoreValue::Float(v) => Ok(v),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl CacheValue for f32 {
    const NATIVE: bool = true;

    fn encode<S: Serializer>(&self, _codec: &Codec<S>) -> Result<StoreValue> {
        Ok(StoreValue::Float(*self as f64))
    }

    fn decode<S: Serializer>(value: StoreValue, _codec: &Codec<S>) -> Result<Self> {
        match value {
            StoreValue::Float(v) => Ok(v as f32),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl CacheValue for DateTime<Utc> {
    const NATIVE: bool = true;

    fn encode<S: Serializer>(&self, _codec: &Codec<S>) -> Result<StoreValue> {
        Ok(StoreValue::DateTimeOffset(self.fixed_offset()))
    }

    fn decode<S: Serializer>(value: StoreValue, _codec: &Codec<S>) -> Result<Self> {
        match value {
            StoreValue::DateTimeOffset(v) => Ok(v.with_timezone(&Utc)),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

/// Stored as a date/time at midnight.
impl CacheValue for NaiveDate {
    const NATIVE: bool = true;

    fn encode<S: Serializer>(&self, _codec: &Codec<S>) -> Result<StoreValue> {
        Ok(StoreValue::DateTime(self.and_time(NaiveTime::MIN)))
    }

    fn decode<S: Serializer>(value: StoreValue, _codec: &Codec<S>) -> Result<Self> {
        match value {
            StoreValue::DateTime(v) if v.time() == NaiveTime::MIN => Ok(v.date()),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}
