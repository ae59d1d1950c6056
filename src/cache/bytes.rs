//! Byte Comparer Module
//!
//! Total ordering and equality for raw byte payloads, used by the store when
//! set and list operations run over binary values.

use std::cmp::Ordering;

// == Compare ==
/// Lexicographic comparison; on a shared prefix the shorter sequence sorts
/// first.
pub fn compare_bytes(a: &[u8], b: &[u8]) -> Ordering {
    for (x, y) in a.iter().zip(b.iter()) {
        match x.cmp(y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    a.len().cmp(&b.len())
}

// == Equals ==
/// Element-wise equality.
pub fn bytes_equal(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && compare_bytes(a, b) == Ordering::Equal
}
