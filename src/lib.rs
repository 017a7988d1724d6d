//! avl-hashmap: a key-value map whose hash buckets are AVL trees, so a bad
//! or outright adversarial hash function degrades lookups to O(log n)
//! instead of O(n).
//!
//! Internal Design:
//!
//! Summary
//! - Goal: bound the cost of hash collisions structurally, so that no
//!   hasher (not even a constant one) can produce linear-time buckets.
//! - Layers:
//!   - AvlTree<K, V>: ordered map over unique keys; nodes live in a slotmap
//!     arena owned by the tree, children are arena keys, and every insert or
//!     remove restores the AVL height-balance invariant on the unwind of its
//!     recursive descent. Keeps a per-instance rotation counter for
//!     diagnostics.
//!   - AvlHashMap<K, V, S>: public API; routes each key to a bucket by
//!     `hash % capacity`, delegates to that bucket's AvlTree, and doubles
//!     the bucket count (redistributing every entry synchronously) when an
//!     insert pushes the load factor past the configured threshold.
//!
//! Constraints
//! - Single-threaded, synchronous: no locking, no suspension points; growth
//!   is a stop-the-world rebuild. Callers needing concurrency must wrap
//!   every operation, growth included, in external mutual exclusion.
//! - Buckets and nodes are exclusively owned by the container; no external
//!   code ever holds references into tree internals.
//! - Absence is `Option::None`, not an error: overwriting on insert and
//!   removing a missing key are defined behaviors. The only fallible call
//!   is `with_config`, which validates capacity and threshold up front.
//!
//! Why this split?
//! - Localize invariants: the tree alone maintains BST order, cached
//!   heights and AVL balance; the container alone maintains
//!   `len == sum(bucket lens)` and the load-factor bound. Neither reaches
//!   into the other.
//! - The tree's `insert` returns the previous value, so the container can
//!   tell a fresh insert from an overwrite without diffing bucket sizes.
//!
//! Hasher notes
//! - The hash capability is an ordinary `BuildHasher` (default
//!   `RandomState`); the structure assumes nothing about its distribution.
//!   Bucket selection reduces the full u64 hash with an unsigned modulo, so
//!   there is no signed `abs()` edge case.
//!
//! Non-goals
//! - No iteration-order guarantee beyond ascending keys within one bucket.
//! - No persistence, no shrinking, no hash-quality improvement.

mod avl_hash_map;
pub mod avl_tree;
mod avl_tree_proptest;

// Public surface
pub use avl_hash_map::{AvlHashMap, ConfigError, Iter};
pub use avl_tree::AvlTree;
