//! Cache Key Module
//!
//! Immutable composite key: a type label plus an ordered sequence of elements.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use super::{KeyElement, KEY_SEPARATOR};

// == Cache Key ==
/// A structured cache key with a deterministic canonical string.
///
/// Equality, ordering and hashing all follow the label and the formatted
/// elements, so two keys built from the same parts are interchangeable.
#[derive(Debug, Clone)]
pub struct CacheKey {
    label: String,
    elements: Vec<KeyElement>,
    /// Formatted elements, computed once at construction
    parts: Vec<String>,
    canonical: String,
}

impl CacheKey {
    // == Constructor ==
    /// Creates a new key from a label and its elements.
    pub fn new(label: impl Into<String>, elements: Vec<KeyElement>) -> Self {
        let label = label.into();
        let parts: Vec<String> = elements.iter().map(KeyElement::format).collect();

        let mut canonical = label.clone();
        for part in &parts {
            canonical.push(KEY_SEPARATOR);
            canonical.push_str(part);
        }

        Self {
            label,
            elements,
            parts,
            canonical,
        }
    }

    /// The key-type label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The elements the key was built from.
    pub fn elements(&self) -> &[KeyElement] {
        &self.elements
    }

    // == Canonical Form ==
    /// Returns the canonical string used as the store lookup token.
    pub fn canonical(&self) -> &str {
        &self.canonical
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

impl Ord for CacheKey {
    /// Label first (ordinal), then element by element; a strict prefix sorts
    /// first.
    fn cmp(&self, other: &Self) -> Ordering {
        self.label
            .cmp(&other.label)
            .then_with(|| self.parts.cmp(&other.parts))
    }
}

impl PartialOrd for CacheKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for CacheKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for CacheKey {}

impl Hash for CacheKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.label.hash(state);
        self.parts.hash(state);
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.canonical
    }
}
