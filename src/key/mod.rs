//! Cache Key Module
//!
//! Structured, ordered keys with a deterministic canonical string form.

mod cache_key;
mod element;


pub use cache_key::CacheKey;
pub use element::KeyElement;

// == Public Constants ==
/// Separator placed between the label and each formatted key element
pub const KEY_SEPARATOR: char = '|';

/// Builds a [`CacheKey`] from a label and any number of elements convertible
/// into [`KeyElement`].
///
/// ```
/// use mini_cache::cache_key;
///
/// let key = cache_key!("user", 42, "profile");
/// assert_eq!(key.canonical(), "user|42|profile");
/// ```
#[macro_export]
macro_rules! cache_key {
    ($label:expr $(, $element:expr)* $(,)?) => {
        $crate::key::CacheKey::new(
            $label,
            ::std::vec![$($crate::key::KeyElement::from($element)),*],
        )
    };
}
