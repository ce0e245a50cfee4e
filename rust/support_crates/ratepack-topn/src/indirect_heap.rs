//! A binary min-heap of slot numbers ordered by an external score array.

use std::cmp::Ordering;

/// A min-heap over slot positions into a score array the heap does not own.
///
/// Every operation that compares takes the score array as an argument, so the owner can
/// overwrite the score of a slot that is not currently in the heap and enqueue it again.
/// Scores are compared with [`f64::total_cmp`]; `NaN` sorts above every other value.
///
/// The scores of slots in the heap must not change while they are enqueued.
#[derive(Clone, Debug, Default)]
pub struct IndirectMinHeap {
    slots: Vec<usize>,
}

impl IndirectMinHeap {
    pub fn new() -> IndirectMinHeap {
        IndirectMinHeap { slots: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> IndirectMinHeap {
        IndirectMinHeap {
            slots: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns the slot with the smallest score without removing it.
    #[inline]
    pub fn peek(&self) -> Option<usize> {
        self.slots.first().copied()
    }

    /// Adds `slot` to the heap.
    pub fn push(&mut self, slot: usize, scores: &[f64]) {
        debug_assert!(slot < scores.len());
        self.slots.push(slot);
        self.sift_up(self.slots.len() - 1, scores);
    }

    /// Removes and returns the slot with the smallest score.
    pub fn pop(&mut self, scores: &[f64]) -> Option<usize> {
        let last = self.slots.pop()?;
        if self.slots.is_empty() {
            return Some(last);
        }
        let top = std::mem::replace(&mut self.slots[0], last);
        self.sift_down(0, scores);
        Some(top)
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    fn sift_up(&mut self, mut pos: usize, scores: &[f64]) {
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if Self::compare(self.slots[pos], self.slots[parent], scores) != Ordering::Less {
                break;
            }
            self.slots.swap(pos, parent);
            pos = parent;
        }
    }

    fn sift_down(&mut self, mut pos: usize, scores: &[f64]) {
        let len = self.slots.len();
        loop {
            let left = 2 * pos + 1;
            if left >= len {
                break;
            }
            let right = left + 1;
            let child = if right < len
                && Self::compare(self.slots[right], self.slots[left], scores) == Ordering::Less
            {
                right
            } else {
                left
            };
            if Self::compare(self.slots[child], self.slots[pos], scores) != Ordering::Less {
                break;
            }
            self.slots.swap(pos, child);
            pos = child;
        }
    }

    #[inline]
    fn compare(a: usize, b: usize, scores: &[f64]) -> Ordering {
        scores[a].total_cmp(&scores[b])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pops_in_score_order() {
        let scores = [5.0, 1.0, 4.0, 2.0, 3.0];
        let mut heap = IndirectMinHeap::new();
        for slot in 0..scores.len() {
            heap.push(slot, &scores);
        }
        assert_eq!(heap.len(), 5);
        assert_eq!(heap.peek(), Some(1));

        let order = std::iter::from_fn(|| heap.pop(&scores)).collect::<Vec<_>>();
        assert_eq!(order, vec![1, 3, 4, 2, 0]);
        assert!(heap.is_empty());
        assert_eq!(heap.pop(&scores), None);
    }

    #[test]
    fn test_reused_slot() {
        let mut scores = [3.0, 7.0, 0.0];
        let mut heap = IndirectMinHeap::with_capacity(3);
        heap.push(0, &scores);
        heap.push(1, &scores);
        let min = heap.pop(&scores).unwrap();
        assert_eq!(min, 0);

        scores[min] = 9.0;
        heap.push(min, &scores);
        scores[2] = 8.0;
        heap.push(2, &scores);
        assert_eq!(heap.pop(&scores), Some(1));
        assert_eq!(heap.pop(&scores), Some(2));
        assert_eq!(heap.pop(&scores), Some(0));
    }

    #[test]
    fn test_nan_and_infinities() {
        let scores = [f64::NAN, f64::NEG_INFINITY, f64::INFINITY, 0.0];
        let mut heap = IndirectMinHeap::new();
        for slot in [0, 1, 2, 3] {
            heap.push(slot, &scores);
        }
        let order = std::iter::from_fn(|| heap.pop(&scores)).collect::<Vec<_>>();
        assert_eq!(order, vec![1, 3, 2, 0]);
    }

    #[test]
    fn test_random_heap_sort() {
        let mut rng = fastrand::Rng::with_seed(3);
        let scores = (0..500).map(|_| rng.f64() * 100.0 - 50.0).collect::<Vec<_>>();
        let mut heap = IndirectMinHeap::new();
        for slot in 0..scores.len() {
            heap.push(slot, &scores);
        }
        let popped = std::iter::from_fn(|| heap.pop(&scores))
            .map(|slot| scores[slot])
            .collect::<Vec<_>>();
        assert_eq!(popped.len(), scores.len());
        assert!(popped.windows(2).all(|w| w[0] <= w[1]));
    }
}
