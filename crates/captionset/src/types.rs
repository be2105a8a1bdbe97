//! # Common Types

/// The integer type of a vocabulary index.
pub type TokenIndex = usize;

/// Type Alias for hash maps in this crate.
pub type CSHashMap<K, V> = ahash::AHashMap<K, V>;

/// Create a new hash map with the given capacity.
pub fn hash_map_with_capacity<K, V>(capacity: usize) -> CSHashMap<K, V> {
    CSHashMap::with_capacity(capacity)
}
