//! Deterministic hashing data structures. The hashing data structures in the standard library are
//! randomly seeded per process, which would make iteration order, and therefore the order in which
//! people are processed, differ between runs with the same seed.
//!
//! `HashMap<K, V, S>` does not have a `new` method for a non-default hasher. Use
//! `HashMap::default()` instead.
//!
//! The `hash_str` free function is used in `crate::random` to derive a stream seed from the name
//! of an `RngId`.

use rustc_hash::FxBuildHasher;
use xxhash_rust::xxh3::xxh3_64;

pub use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};

/// An insertion-ordered map with a deterministic hasher.
pub type IndexMap<K, V> = indexmap::IndexMap<K, V, FxBuildHasher>;

/// An insertion-ordered set with a deterministic hasher.
pub type IndexSet<K> = indexmap::IndexSet<K, FxBuildHasher>;

/// A convenience method to compute the hash of a `&str`. Stable across platforms and releases.
pub fn hash_str(data: &str) -> u64 {
    xxh3_64(data.as_bytes())
}
