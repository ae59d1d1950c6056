//! Store Value Module
//!
//! Tagged payload held by the store for scalars and collection members:
//! either raw bytes produced by the encoding pipeline or a natively
//! representable primitive.

use std::cmp::Ordering;

use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime};

use super::bytes::compare_bytes;

// == Store Value ==
/// A single stored payload.
///
/// Values are totally ordered so they can live in sorted sets: values of
/// different variants order by variant, floats use IEEE total ordering and
/// byte payloads use [`compare_bytes`]. Signed and unsigned integers share
/// one numeric ordering, so `Int(2)` equals `UInt(2)`.
#[derive(Debug, Clone)]
pub enum StoreValue {
    Bool(bool),
    Char(char),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    Duration(Duration),
    DateTime(NaiveDateTime),
    DateTimeOffset(DateTime<FixedOffset>),
    Bytes(Vec<u8>),
}

impl StoreValue {
    /// Short name of the variant, used in type mismatch messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            StoreValue::Bool(_) => "bool",
            StoreValue::Char(_) => "char",
            StoreValue::Int(_) => "signed integer",
            StoreValue::UInt(_) => "unsigned integer",
            StoreValue::Float(_) => "float",
            StoreValue::Text(_) => "text",
            StoreValue::Duration(_) => "duration",
            StoreValue::DateTime(_) => "date/time",
            StoreValue::DateTimeOffset(_) => "offset date/time",
            StoreValue::Bytes(_) => "bytes",
        }
    }

    fn rank(&self) -> u8 {
        match self {
            StoreValue::Bool(_) => 0,
            StoreValue::Char(_) => 1,
            StoreValue::Int(_) => 2,
            StoreValue::UInt(_) => 2,
            StoreValue::Float(_) => 3,
            StoreValue::Text(_) => 4,
            StoreValue::Duration(_) => 5,
            StoreValue::DateTime(_) => 6,
            StoreValue::DateTimeOffset(_) => 7,
            StoreValue::Bytes(_) => 8,
        }
    }

    /// True for a byte payload of length zero.
    pub fn is_empty_bytes(&self) -> bool {
        matches!(self, StoreValue::Bytes(b) if b.is_empty())
    }
}

impl Ord for StoreValue {
    fn cmp(&self, other: &Self) -> Ordering {
        use StoreValue as V;
        match (self, other) {
            (V::Bool(a), V::Bool(b)) => a.cmp(b),
            (V::Char(a), V::Char(b)) => a.cmp(b),
            (V::Int(a), V::Int(b)) => a.cmp(b),
            (V::UInt(a), V::UInt(b)) => a.cmp(b),
            (V::Int(a), V::UInt(b)) => i128::from(*a).cmp(&i128::from(*b)),
            (V::UInt(a), V::Int(b)) => i128::from(*a).cmp(&i128::from(*b)),
            (V::Float(a), V::Float(b)) => a.total_cmp(b),
            (V::Text(a), V::Text(b)) => a.cmp(b),
            (V::Duration(a), V::Duration(b)) => a.cmp(b),
            (V::DateTime(a), V::DateTime(b)) => a.cmp(b),
            (V::DateTimeOffset(a), V::DateTimeOffset(b)) => a.cmp(b),
            (V::Bytes(a), V::Bytes(b)) => compare_bytes(a, b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for StoreValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for StoreValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for StoreValue {}

impl From<Vec<u8>> for StoreValue {
    fn from(value: Vec<u8>) -> Self {
        StoreValue::Bytes(value)
    }
}

impl From<&[u8]> for StoreValue {
    fn from(value: &[u8]) -> Self {
        StoreValue::Bytes(value.to_vec())
    }
}

impl From<&str> for StoreValue {
    fn from(value: &str) -> Self {
        StoreValue::Text(value.to_string())
    }
}

impl From<i64> for StoreValue {
    fn from(value: i64) -> Self {
        StoreValue::Int(value)
    }
}

impl From<f64> for StoreValue {
    fn from(value: f64) -> Self {
        StoreValue::Float(value)
    }
}
