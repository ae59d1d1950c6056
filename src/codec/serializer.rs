//! Serializer Module
//!
//! Turns values into bytes and back. JSON is the default; MessagePack is
//! available for more compact payloads.

use std::io::{Read, Write};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Serialization errors
#[derive(Debug, Error)]
pub enum SerializationError {
    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// MessagePack serialization error
    #[error("MessagePack encode error: {0}")]
    MessagePackEncode(#[from] rmp_serde::encode::Error),

    /// MessagePack deserialization error
    #[error("MessagePack decode error: {0}")]
    MessagePackDecode(#[from] rmp_serde::decode::Error),
}

/// Serializer contract.
///
/// The stream methods are required; the byte methods are built on top of
/// them.
pub trait Serializer: Send + Sync {
    /// Serialize `value` into `writer`
    fn serialize_into<T, W>(&self, value: &T, writer: W) -> Result<(), SerializationError>
    where
        T: Serialize + ?Sized,
        W: Write;

    /// Deserialize a value from `reader`
    fn deserialize_from<T, R>(&self, reader: R) -> Result<T, SerializationError>
    where
        T: DeserializeOwned,
        R: Read;

    /// Serialize data to bytes
    fn serialize<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, SerializationError> {
        let mut bytes = Vec::new();
        self.serialize_into(value, &mut bytes)?;
        Ok(bytes)
    }

    /// Deserialize bytes to data
    fn deserialize<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, SerializationError> {
        self.deserialize_from(bytes)
    }
}

// == JSON ==
/// JSON serializer backed by serde_json.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl Serializer for JsonSerializer {
    fn serialize_into<T, W>(&self, value: &T, writer: W) -> Result<(), SerializationError>
    where
        T: Serialize + ?Sized,
        W: Write,
    {
        serde_json::to_writer(writer, value)?;
        Ok(())
    }

    fn deserialize_from<T, R>(&self, reader: R) -> Result<T, SerializationError>
    where
        T: DeserializeOwned,
        R: Read,
    {
        Ok(serde_json::from_reader(reader)?)
    }
}

// == MessagePack ==
/// MessagePack serializer backed by rmp-serde. Structs are written as maps.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessagePackSerializer;

impl Serializer for MessagePackSerializer {
    fn serialize_into<T, W>(&self, value: &T, mut writer: W) -> Result<(), SerializationError>
    where
        T: Serialize + ?Sized,
        W: Write,
    {
        rmp_serde::encode::write_named(&mut writer, value)?;
        Ok(())
    }

    fn deserialize_from<T, R>(&self, reader: R) -> Result<T, SerializationError>
    where
        T: DeserializeOwned,
        R: Read,
    {
        Ok(rmp_serde::decode::from_read(reader)?)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Order {
        id: u32,
        items: Vec<String>,
    }

    fn sample() -> Order {
        Order {
            id: 7,
            items: vec!["tea".to_string(), "milk".to_string()],
        }
    }

    #[test]
    fn test_json_roundtrip() {
        let bytes = JsonSerializer.serialize(&sample()).unwrap();
        let restored: Order = JsonSerializer.deserialize(&bytes).unwrap();
        assert_eq!(restored, sample());
    }

    #[test]
    fn test_messagepack_roundtrip() {
        let bytes = MessagePackSerializer.serialize(&sample()).unwrap();
        let restored: Order = MessagePackSerializer.deserialize(&bytes).unwrap();
        assert_eq!(restored, sample());
    }

    #[test]
    fn test_stream_roundtrip() {
        let mut buffer = Vec::new();
        JsonSerializer.serialize_into(&sample(), &mut buffer).unwrap();
        let restored: Order = JsonSerializer.deserialize_from(buffer.as_slice()).unwrap();
        assert_eq!(restored, sample());
    }

    #[test]
    fn test_deserialize_wrong_type_fails() {
        let bytes = JsonSerializer.serialize("just text").unwrap();
        let result: Result<Order, _> = JsonSerializer.deserialize(&bytes);
        assert!(matches!(result, Err(SerializationError::Json(_))));
    }
}
