//! Score accumulators for recommendation candidates.
//!
//! A scorer feeds `(key, score)` pairs into a [`ScoredItemAccumulator`] and finishes it into
//! a score-descending list, a sparse vector or a key set. [`TopNAccumulator`] keeps only the
//! `n` highest scores using an [`IndirectMinHeap`]; [`UnlimitedAccumulator`] keeps everything.

pub mod indirect_heap;
pub mod scored_id;
pub mod topn;
pub mod unlimited;

pub use indirect_heap::IndirectMinHeap;
pub use scored_id::ScoredId;
pub use topn::TopNAccumulator;
pub use unlimited::UnlimitedAccumulator;

use ratepack_common::Result;
use ratepack_keys::KeyIndex;
use ratepack_vectors::SparseVector;

/// Collects scored keys and hands them back in score order.
///
/// Finishing resets the accumulator, which can then be reused for another batch.
/// Finishing twice without an intervening [`ScoredItemAccumulator::put`] is an
/// `InvalidOperation` error.
pub trait ScoredItemAccumulator {
    /// Returns the number of entries retained so far.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Offers a key with its score.
    fn put(&mut self, key: i64, score: f64);

    /// Returns the retained entries ordered by descending score and resets.
    fn finish_list(&mut self) -> Result<Vec<ScoredId>>;

    /// Returns the retained entries as a vector keyed by id and resets.
    fn finish_vector(&mut self) -> Result<SparseVector>;

    /// Returns the retained keys and resets.
    fn finish_set(&mut self) -> Result<KeyIndex>;
}
