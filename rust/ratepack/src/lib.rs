//! # Ratepack: packed rating storage for recommenders
//!
//! Ratepack stores user-item ratings in a compact binary file that is memory-mapped at
//! open time, and provides the in-memory structures a recommender builds from them.
//!
//! ## Module Organization
//!
//! * [`store`] - the packed file format, the packer that writes it and the read-only
//!   [`store::BinaryRatingStore`] with per-user, per-item and whole-file queries
//! * [`common`] - the error type and verification macros shared by every crate
//!
//! ### Support Modules
//!
//! * [`support::keys`] - sorted `i64` key sets with shared-storage range views
//! * [`support::vectors`] - immutable and mutable sparse `i64 → f64` vectors and their
//!   arithmetic
//! * [`support::topn`] - bounded and unbounded score accumulators
//!
//! ## Getting Started
//!
//! Pack ratings once with [`store::BinaryRatingPacker`], then open the file with
//! [`store::BinaryRatingStore::open`]. Lists and streams returned by the store keep the
//! mapping alive on their own, so they can outlive the store.

pub use ratepack_common as common;
pub use ratepack_store as store;

pub mod support {
    pub use ratepack_keys as keys;
    pub use ratepack_topn as topn;
    pub use ratepack_vectors as vectors;
}
