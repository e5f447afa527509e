//! Hash collections used by the reconciler, switchable with the `std-hash` feature.

#[cfg(feature = "std-hash")]
pub mod map {
    pub use std::collections::{HashMap, HashSet};
}

#[cfg(not(feature = "std-hash"))]
pub mod map {
    pub use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};
}

use crate::Key;

/// Sibling key -> position in the old child window.
pub(crate) type KeyIndex = map::HashMap<Key, usize>;
