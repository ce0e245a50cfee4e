//! Sparse long-keyed numeric vectors.
//!
//! - [`SparseVector`]: immutable map from `i64` keys to `f64` values on sorted parallel
//!   arrays, with O(1) key-range views.
//! - [`MutableSparseVector`]: a vector over a fixed key domain whose entries can be set,
//!   updated and unset in place, then frozen into a [`SparseVector`].
//! - [`ops`]: arithmetic over anything implementing [`KeyedValues`], including plain
//!   hash and B-tree maps.

pub mod active_mask;
pub mod mutable_vector;
pub mod ops;
pub mod sparse_vector;

pub use mutable_vector::MutableSparseVector;
pub use ops::KeyedValues;
pub use sparse_vector::SparseVector;
