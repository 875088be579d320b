//! Deterministic hashing for the simulation. The hashing data structures in the standard library
//! are not deterministic:
//!
//! > By default, HashMap uses a hashing algorithm selected to provide
//! > resistance against HashDoS attacks. The algorithm is randomly seeded, and a
//! > reasonable best-effort is made to generate this seed from a high quality,
//! > secure source of randomness provided by the host without blocking the program.
//!
//! A run must replay exactly under a fixed seed, so every map in the crate uses the `FxHasher`
//! variants re-exported here. `HashMap::default()` creates a new map; the `HashMapExt` and
//! `HashSetExt` traits add `new` and `with_capacity` when they are in scope.
//!
//! The `hash_str` free function derives the per-RNG seed offset in `crate::random`.

use xxhash_rust::xxh3::xxh3_64;

pub use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};

/// Adds `new` and `with_capacity` to the Fx-hashed `HashMap`.
pub trait HashMapExt {
    fn new() -> Self;
    fn with_capacity(capacity: usize) -> Self;
}

impl<K, V> HashMapExt for HashMap<K, V> {
    fn new() -> Self {
        HashMap::default()
    }

    fn with_capacity(capacity: usize) -> Self {
        HashMap::with_capacity_and_hasher(capacity, rustc_hash::FxBuildHasher)
    }
}

/// Adds `new` and `with_capacity` to the Fx-hashed `HashSet`.
pub trait HashSetExt {
    fn new() -> Self;
    fn with_capacity(capacity: usize) -> Self;
}

impl<T> HashSetExt for HashSet<T> {
    fn new() -> Self {
        HashSet::default()
    }

    fn with_capacity(capacity: usize) -> Self {
        HashSet::with_capacity_and_hasher(capacity, rustc_hash::FxBuildHasher)
    }
}

/// A convenience method to compute the hash of a `&str`. Stable across platforms and runs.
pub fn hash_str(data: &str) -> u64 {
    xxh3_64(data.as_bytes())
}
