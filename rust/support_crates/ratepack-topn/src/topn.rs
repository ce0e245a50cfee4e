use ratepack_common::{Result, error::Error};
use ratepack_keys::KeyIndex;
use ratepack_vectors::SparseVector;

use crate::{IndirectMinHeap, ScoredId, ScoredItemAccumulator, scored_id::finish};

/// Retains the `n` highest-scored keys of everything put into it.
///
/// Scores live in an array of `n + 1` slots and the keys in a parallel list; a min-heap
/// of slot numbers tracks the smallest retained score. Once `n` entries are held, each
/// `put` writes into the spare slot, enqueues it and evicts the heap minimum, whose slot
/// becomes the next spare. A `put` therefore costs `O(log n)` and the accumulator never
/// holds more than `n + 1` entries.
///
/// Among equal scores, which entry is evicted is unspecified.
#[derive(Clone, Debug)]
pub struct TopNAccumulator {
    count: usize,
    scores: Vec<f64>,
    items: Vec<i64>,
    slot: usize,
    size: usize,
    heap: IndirectMinHeap,
    finished: bool,
}

impl TopNAccumulator {
    /// Creates an accumulator retaining at most `n` entries.
    pub fn new(n: usize) -> TopNAccumulator {
        TopNAccumulator {
            count: n,
            scores: vec![0.0; n + 1],
            items: Vec::new(),
            slot: 0,
            size: 0,
            heap: IndirectMinHeap::with_capacity(n + 1),
            finished: false,
        }
    }

    /// Returns the maximum number of retained entries.
    pub fn capacity(&self) -> usize {
        self.count
    }

    /// Drains the heap into score-descending order and resets the accumulator.
    fn drain(&mut self) -> Result<Vec<ScoredId>> {
        if self.finished {
            return Err(Error::invalid_operation("finish"));
        }
        debug_assert_eq!(self.heap.len(), self.size);

        let mut ranked = vec![ScoredId::new(0, 0.0); self.size];
        for out in ranked.iter_mut().rev() {
            let Some(slot) = self.heap.pop(&self.scores) else {
                break;
            };
            *out = ScoredId::new(self.items[slot], self.scores[slot]);
        }
        debug_assert!(self.heap.is_empty());

        self.size = 0;
        self.slot = 0;
        self.items.clear();
        self.finished = true;
        Ok(ranked)
    }
}

impl ScoredItemAccumulator for TopNAccumulator {
    #[inline]
    fn len(&self) -> usize {
        self.size
    }

    fn put(&mut self, key: i64, score: f64) {
        debug_assert!(self.slot <= self.count);
        debug_assert_eq!(self.heap.len(), self.size);

        if self.slot == self.items.len() {
            self.items.push(key);
        } else {
            self.items[self.slot] = key;
        }
        self.scores[self.slot] = score;
        self.heap.push(self.slot, &self.scores);

        if self.size == self.count {
            // At capacity: the evicted minimum's slot is reused by the next put.
            if let Some(evicted) = self.heap.pop(&self.scores) {
                self.slot = evicted;
            }
        } else {
            self.slot += 1;
            self.size += 1;
        }
        self.finished = false;
    }

    fn finish_list(&mut self) -> Result<Vec<ScoredId>> {
        self.drain()
    }

    fn finish_vector(&mut self) -> Result<SparseVector> {
        finish::to_vector(&self.drain()?)
    }

    fn finish_set(&mut self) -> Result<KeyIndex> {
        Ok(finish::to_set(&self.drain()?))
    }
}
