#[cfg(feature = "std-hash")]
pub mod default {
    pub use std::collections::hash_map::DefaultHasher;

    #[inline]
    pub fn new() -> DefaultHasher {
        DefaultHasher::new()
    }
}

#[cfg(not(feature = "std-hash"))]
pub mod default {
    // fast branch
    pub use ahash::AHasher as DefaultHasher;

    #[inline]
    pub fn new() -> DefaultHasher {
        DefaultHasher::default()
    }
}

use std::hash::{Hash, Hasher};

/// Folds any hashable value into the 64-bit key used for sibling identity.
pub fn hash_key<K: Hash + ?Sized>(key: &K) -> crate::Key {
    let mut hasher = default::new();
    key.hash(&mut hasher);
    hasher.finish()
}
