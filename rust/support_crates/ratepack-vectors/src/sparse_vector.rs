use std::sync::Arc;

use ratepack_common::{Result, error::Error, verify_arg};
use ratepack_keys::KeyIndex;

use crate::{MutableSparseVector, ops, ops::KeyedValues};

/// An immutable sparse vector: a finite map from `i64` keys to `f64` values.
///
/// Keys are held in a [`KeyIndex`] and values in a parallel array aligned with the key
/// index's backing array, so that key-range views ([`SparseVector::sub_map`] and friends)
/// share both arrays and cost O(1).
///
/// Looking up an absent key returns the vector's default value, `0.0` unless configured
/// otherwise with [`SparseVector::with_default`].
#[derive(Clone)]
pub struct SparseVector {
    keys: KeyIndex,
    /// Values aligned with the backing array of `keys`.
    values: Arc<[f64]>,
    default_value: f64,
}

impl SparseVector {
    /// Creates a vector with no entries.
    pub fn empty() -> SparseVector {
        SparseVector {
            keys: KeyIndex::empty(),
            values: Arc::from(Vec::new()),
            default_value: 0.0,
        }
    }

    /// Creates a vector from a key index and values aligned with its keys.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `values.len() != keys.len()`.
    pub fn wrap(keys: KeyIndex, values: Vec<f64>) -> Result<SparseVector> {
        verify_arg!(values, values.len() == keys.len());
        Ok(SparseVector {
            keys: keys.compact(),
            values: values.into(),
            default_value: 0.0,
        })
    }

    /// Creates a vector from `(key, value)` pairs in any order.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateKey` if a key occurs twice.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (i64, f64)>) -> Result<SparseVector> {
        let mut pairs = pairs.into_iter().collect::<Vec<_>>();
        pairs.sort_unstable_by_key(|&(k, _)| k);
        if let Some(w) = pairs.windows(2).find(|w| w[0].0 == w[1].0) {
            return Err(Error::duplicate_key(w[0].0));
        }
        let (keys, values): (Vec<i64>, Vec<f64>) = pairs.into_iter().unzip();
        SparseVector::wrap(KeyIndex::from_sorted(keys)?, values)
    }

    /// Creates a vector from parallel, unsorted key and value arrays.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the lengths differ and `DuplicateKey` if a key occurs
    /// twice.
    pub fn from_unsorted(keys: Vec<i64>, values: Vec<f64>) -> Result<SparseVector> {
        verify_arg!(values, values.len() == keys.len());
        SparseVector::from_pairs(keys.into_iter().zip(values))
    }

    /// Copies the entries of any keyed map.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateKey` if the map yields the same key twice.
    pub fn from_map<M: KeyedValues + ?Sized>(map: &M) -> Result<SparseVector> {
        SparseVector::from_pairs(map.entries())
    }

    pub(crate) fn from_parts(keys: KeyIndex, values: Vec<f64>, default_value: f64) -> SparseVector {
        debug_assert_eq!(keys.backing_len(), values.len());
        SparseVector {
            keys,
            values: values.into(),
            default_value,
        }
    }

    /// Returns a vector sharing this one's storage, with a different default value.
    pub fn with_default(self, default_value: f64) -> SparseVector {
        SparseVector {
            default_value,
            ..self
        }
    }

    /// Returns the value returned for absent keys.
    pub fn default_value(&self) -> f64 {
        self.default_value
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Returns the key set of the vector.
    pub fn keys(&self) -> &KeyIndex {
        &self.keys
    }

    /// Returns the values in ascending key order.
    pub fn values(&self) -> &[f64] {
        &self.values[self.keys.backing_range()]
    }

    /// Returns the value for `key`, or the default value if the key is absent.
    #[inline]
    pub fn get(&self, key: i64) -> f64 {
        self.try_get(key).unwrap_or(self.default_value)
    }

    /// Returns the value for `key`, or `None` if the key is absent.
    #[inline]
    pub fn try_get(&self, key: i64) -> Option<f64> {
        self.keys
            .index_of(key)
            .map(|i| self.values[self.keys.offset() + i])
    }

    #[inline]
    pub fn contains_key(&self, key: i64) -> bool {
        self.keys.contains_key(key)
    }

    /// Returns an iterator over the entries in ascending key order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (i64, f64)> + '_ {
        self.keys
            .keys()
            .iter()
            .copied()
            .zip(self.values().iter().copied())
    }

    pub fn first_key(&self) -> Option<i64> {
        self.keys.first()
    }

    pub fn last_key(&self) -> Option<i64> {
        self.keys.last()
    }

    pub fn sum(&self) -> f64 {
        self.values().iter().sum()
    }

    pub fn sum_of_squares(&self) -> f64 {
        self.values().iter().map(|v| v * v).sum()
    }

    pub fn norm(&self) -> f64 {
        self.sum_of_squares().sqrt()
    }

    /// Returns the mean of the values, or `NaN` if the vector is empty.
    pub fn mean(&self) -> f64 {
        ops::mean(self)
    }

    /// Computes the dot product with another keyed map; absent keys count as zero.
    pub fn dot<V: KeyedValues + ?Sized>(&self, other: &V) -> f64 {
        ops::dot_product(self, other)
    }

    /// Returns the view of entries whose keys are in `[from, to)`.
    pub fn sub_map(&self, from: i64, to: i64) -> SparseVector {
        self.view(self.keys.range(from, to))
    }

    /// Returns the view of entries whose keys are less than `to`.
    pub fn head_map(&self, to: i64) -> SparseVector {
        self.view(self.keys.head(to))
    }

    /// Returns the view of entries whose keys are greater than or equal to `from`.
    pub fn tail_map(&self, from: i64) -> SparseVector {
        self.view(self.keys.tail(from))
    }

    fn view(&self, keys: KeyIndex) -> SparseVector {
        SparseVector {
            keys,
            values: self.values.clone(),
            default_value: self.default_value,
        }
    }

    /// Creates a mutable vector whose key domain and entries are this vector's.
    pub fn mutable_copy(&self) -> MutableSparseVector {
        MutableSparseVector::from_vector(self)
    }
}

impl Default for SparseVector {
    fn default() -> Self {
        SparseVector::empty()
    }
}

impl KeyedValues for SparseVector {
    fn entry_count(&self) -> usize {
        self.len()
    }

    fn value_of(&self, key: i64) -> Option<f64> {
        self.try_get(key)
    }

    fn entries(&self) -> impl Iterator<Item = (i64, f64)> + '_ {
        self.iter()
    }

    fn is_key_sorted(&self) -> bool {
        true
    }
}

impl PartialEq for SparseVector {
    fn eq(&self, other: &Self) -> bool {
        self.keys == other.keys && self.values() == other.values()
    }
}

impl PartialEq<MutableSparseVector> for SparseVector {
    fn eq(&self, other: &MutableSparseVector) -> bool {
        other == self
    }
}

impl std::fmt::Debug for SparseVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
