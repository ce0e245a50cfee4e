use std::{ops::Range, sync::Arc};

use ratepack_common::{Result, error::Error, verify_arg, verify_index};

/// A sorted set of unique `i64` keys, mapping each key to a dense position.
///
/// `KeyIndex` is the bidirectional mapping between user or item identifiers and the
/// zero-based positions used to address parallel value arrays. The keys live in a
/// shared, immutable backing array; an index is a window `[lower, upper)` into that
/// array, so sub-range views are O(1) and never copy.
///
/// Positions are always relative to the window: `key_at(0)` is the first key of the
/// view, and `index_of` returns positions in `0..len()`. Consumers that share a value
/// array with the backing key array add [`KeyIndex::offset`] to translate.
///
/// # Examples
///
/// ```
/// use ratepack_keys::KeyIndex;
///
/// let index = KeyIndex::from_keys([42, 7, 19]).unwrap();
/// assert_eq!(index.keys(), &[7, 19, 42]);
/// assert_eq!(index.index_of(19), Some(1));
/// assert_eq!(index.index_of(20), None);
///
/// let tail = index.tail(10);
/// assert_eq!(tail.keys(), &[19, 42]);
/// assert_eq!(tail.index_of(42), Some(1));
/// ```
#[derive(Clone)]
pub struct KeyIndex {
    /// The underlying sorted key array, shared between views.
    keys: Arc<[i64]>,
    /// First position of the view within `keys`.
    lower: usize,
    /// One past the last position of the view within `keys`.
    upper: usize,
}

impl KeyIndex {
    /// Creates an empty `KeyIndex`.
    pub fn empty() -> KeyIndex {
        KeyIndex::from_shared(Arc::from(Vec::new()))
    }

    /// Builds an index from a collection of unique keys in any order.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateKey` if the input contains the same key more than once.
    pub fn from_keys(keys: impl IntoIterator<Item = i64>) -> Result<KeyIndex> {
        let mut keys = keys.into_iter().collect::<Vec<_>>();
        keys.sort_unstable();
        if let Some(w) = keys.windows(2).find(|w| w[0] == w[1]) {
            return Err(Error::duplicate_key(w[0]));
        }
        Ok(KeyIndex::from_shared(keys.into()))
    }

    /// Builds an index from arbitrary keys, discarding duplicates.
    pub fn from_distinct(keys: impl IntoIterator<Item = i64>) -> KeyIndex {
        let mut keys = keys.into_iter().collect::<Vec<_>>();
        keys.sort_unstable();
        keys.dedup();
        KeyIndex::from_shared(keys.into())
    }

    /// Wraps a vector that is already strictly ascending.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateKey` for repeated keys and `InvalidArgument` if the keys are
    /// out of order.
    pub fn from_sorted(keys: Vec<i64>) -> Result<KeyIndex> {
        for w in keys.windows(2) {
            if w[0] == w[1] {
                return Err(Error::duplicate_key(w[0]));
            }
            verify_arg!(keys, w[0] < w[1]);
        }
        Ok(KeyIndex::from_shared(keys.into()))
    }

    fn from_shared(keys: Arc<[i64]>) -> KeyIndex {
        let upper = keys.len();
        KeyIndex {
            keys,
            lower: 0,
            upper,
        }
    }

    /// Returns the number of keys in the view.
    #[inline]
    pub fn len(&self) -> usize {
        self.upper - self.lower
    }

    /// Returns `true` if the view contains no keys.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.upper == self.lower
    }

    /// Returns the keys of the view as a sorted slice.
    #[inline]
    pub fn keys(&self) -> &[i64] {
        &self.keys[self.lower..self.upper]
    }

    /// Returns the start of the view within the shared backing array.
    #[inline]
    pub fn offset(&self) -> usize {
        self.lower
    }

    /// Returns the length of the shared backing array.
    pub fn backing_len(&self) -> usize {
        self.keys.len()
    }

    /// Returns the range of backing-array positions covered by the view.
    pub fn backing_range(&self) -> Range<usize> {
        self.lower..self.upper
    }

    /// Returns the position of `key`, or `None` if the key is not present.
    #[inline]
    pub fn index_of(&self, key: i64) -> Option<usize> {
        self.keys().binary_search(&key).ok()
    }

    /// Returns `true` if `key` is in the view.
    #[inline]
    pub fn contains_key(&self, key: i64) -> bool {
        self.index_of(key).is_some()
    }

    /// Returns the key at `index`.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfBounds` if `index` is not in `0..len()`.
    #[inline]
    pub fn key_at(&self, index: usize) -> Result<i64> {
        verify_index!(index, self.len());
        Ok(self.keys[self.lower + index])
    }

    /// Returns the first position whose key is greater than or equal to `key`.
    pub fn lower_bound(&self, key: i64) -> usize {
        self.keys().partition_point(|&k| k < key)
    }

    /// Returns the first position whose key is strictly greater than `key`.
    pub fn upper_bound(&self, key: i64) -> usize {
        self.keys().partition_point(|&k| k <= key)
    }

    /// Returns a view over positions `lower..upper` of this view.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` unless `lower <= upper <= len()`.
    pub fn sub_index(&self, lower: usize, upper: usize) -> Result<KeyIndex> {
        verify_arg!(lower, lower <= upper);
        verify_arg!(upper, upper <= self.len());
        Ok(KeyIndex {
            keys: self.keys.clone(),
            lower: self.lower + lower,
            upper: self.lower + upper,
        })
    }

    /// Returns the view of keys in `[from, to)`. An inverted range yields an empty view.
    pub fn range(&self, from: i64, to: i64) -> KeyIndex {
        let lower = self.lower_bound(from);
        let upper = self.lower_bound(to).max(lower);
        self.window(lower, upper)
    }

    /// Returns the view of keys strictly less than `to`.
    pub fn head(&self, to: i64) -> KeyIndex {
        self.window(0, self.lower_bound(to))
    }

    /// Returns the view of keys greater than or equal to `from`.
    pub fn tail(&self, from: i64) -> KeyIndex {
        self.window(self.lower_bound(from), self.len())
    }

    fn window(&self, lower: usize, upper: usize) -> KeyIndex {
        debug_assert!(lower <= upper && upper <= self.len());
        KeyIndex {
            keys: self.keys.clone(),
            lower: self.lower + lower,
            upper: self.lower + upper,
        }
    }

    /// Returns the smallest key, or `None` if the view is empty.
    pub fn first(&self) -> Option<i64> {
        self.keys().first().copied()
    }

    /// Returns the largest key, or `None` if the view is empty.
    pub fn last(&self) -> Option<i64> {
        self.keys().last().copied()
    }

    /// Returns an iterator over the keys in ascending order.
    pub fn iter(&self) -> std::iter::Copied<std::slice::Iter<'_, i64>> {
        self.keys().iter().copied()
    }

    /// Copies the keys of the view into a fresh, compact index.
    pub fn compact(&self) -> KeyIndex {
        if self.lower == 0 && self.upper == self.keys.len() {
            return self.clone();
        }
        KeyIndex::from_shared(Arc::from(self.keys()))
    }

    /// Returns `true` if both indexes share the same backing array.
    pub fn shares_storage(&self, other: &KeyIndex) -> bool {
        Arc::ptr_eq(&self.keys, &other.keys)
    }
}

impl Default for KeyIndex {
    fn default() -> Self {
        KeyIndex::empty()
    }
}

impl PartialEq for KeyIndex {
    fn eq(&self, other: &Self) -> bool {
        self.keys() == other.keys()
    }
}

impl Eq for KeyIndex {}

impl std::fmt::Debug for KeyIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.keys()).finish()
    }
}

impl<'a> IntoIterator for &'a KeyIndex {
    type Item = i64;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, i64>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl TryFrom<Vec<i64>> for KeyIndex {
    type Error = Error;

    fn try_from(keys: Vec<i64>) -> Result<Self> {
        KeyIndex::from_keys(keys)
    }
}
