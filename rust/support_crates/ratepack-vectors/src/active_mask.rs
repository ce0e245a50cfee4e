//! A fixed-size set of slot positions, used to tell unset vector entries from zeros.

/// A fixed-size array of bits with `[u64]` storage and a cached population count.
///
/// Bit 0 is the least significant bit of the first word. Bits beyond `len` in the
/// final word are always zero.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActiveMask {
    words: Vec<u64>,
    len: usize,
    count: usize,
}

impl ActiveMask {
    /// Creates a mask of `len` slots with none set.
    pub fn empty(len: usize) -> ActiveMask {
        ActiveMask {
            words: vec![0; len.div_ceil(64)],
            len,
            count: 0,
        }
    }

    /// Creates a mask of `len` slots with all of them set.
    pub fn full(len: usize) -> ActiveMask {
        let mut mask = ActiveMask::empty(len);
        mask.set_all();
        mask
    }

    /// Returns the number of slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the mask has no slots at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of set slots.
    #[inline]
    pub fn count_ones(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        debug_assert!(index < self.len, "Index {index} out of bounds (len: {})", self.len);
        let (word_index, bit_position) = Self::bit_position(index);
        self.words[word_index] & (1u64 << bit_position) != 0
    }

    /// Sets the slot and returns `true` if it was already set.
    #[inline]
    pub fn insert(&mut self, index: usize) -> bool {
        debug_assert!(index < self.len, "Index {index} out of bounds (len: {})", self.len);
        let (word_index, bit_position) = Self::bit_position(index);
        let mask = 1u64 << bit_position;
        let cell = &mut self.words[word_index];
        let prev = *cell & mask != 0;
        *cell |= mask;
        if !prev {
            self.count += 1;
        }
        prev
    }

    /// Clears the slot and returns `true` if it was set.
    #[inline]
    pub fn remove(&mut self, index: usize) -> bool {
        debug_assert!(index < self.len, "Index {index} out of bounds (len: {})", self.len);
        let (word_index, bit_position) = Self::bit_position(index);
        let mask = 1u64 << bit_position;
        let cell = &mut self.words[word_index];
        let prev = *cell & mask != 0;
        *cell &= !mask;
        if prev {
            self.count -= 1;
        }
        prev
    }

    pub fn clear(&mut self) {
        self.words.fill(0);
        self.count = 0;
    }

    pub fn set_all(&mut self) {
        self.words.fill(u64::MAX);
        let partial = self.len % 64;
        if partial != 0 {
            if let Some(last) = self.words.last_mut() {
                *last &= (1u64 << partial) - 1;
            }
        }
        self.count = self.len;
    }

    /// Returns an iterator over the set slot positions in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.words
            .iter()
            .enumerate()
            .flat_map(|(word_index, &word)| SetBits {
                word,
                base: word_index * 64,
            })
    }

    #[inline]
    fn bit_position(index: usize) -> (usize, usize) {
        (index / 64, index % 64)
    }
}

struct SetBits {
    word: u64,
    base: usize,
}

impl Iterator for SetBits {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        if self.word == 0 {
            return None;
        }
        let bit = self.word.trailing_zeros() as usize;
        self.word &= self.word - 1;
        Some(self.base + bit)
    }
}
