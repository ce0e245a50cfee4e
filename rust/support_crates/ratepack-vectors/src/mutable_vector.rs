use ratepack_common::{Result, error::Error};
use ratepack_keys::KeyIndex;

use crate::{SparseVector, active_mask::ActiveMask, ops, ops::KeyedValues};

/// A sparse vector over a fixed key domain, updated in place.
///
/// Every key of the domain owns a value slot; a slot is either *set* (it has a value,
/// possibly zero) or *unset*. Only set slots are entries of the vector. Setting a key
/// outside the domain fails, as does every mutation after [`MutableSparseVector::freeze`].
///
/// The type is meant for single-threaded accumulation within one scoring pass: build it
/// over the candidate keys, fill it, then freeze it into a shareable [`SparseVector`].
#[derive(Clone)]
pub struct MutableSparseVector {
    domain: KeyIndex,
    values: Vec<f64>,
    set: ActiveMask,
    default_value: f64,
    frozen: bool,
}

impl MutableSparseVector {
    /// Creates a vector over `domain` with every slot unset.
    pub fn with_domain(domain: KeyIndex) -> MutableSparseVector {
        let domain = domain.compact();
        let len = domain.len();
        MutableSparseVector {
            domain,
            values: vec![0.0; len],
            set: ActiveMask::empty(len),
            default_value: 0.0,
            frozen: false,
        }
    }

    /// Creates a vector over the given keys with every slot unset.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateKey` if a key occurs twice.
    pub fn from_keys(keys: impl IntoIterator<Item = i64>) -> Result<MutableSparseVector> {
        Ok(MutableSparseVector::with_domain(KeyIndex::from_keys(keys)?))
    }

    /// Creates a vector whose domain and entries are copied from `vector`.
    pub fn from_vector(vector: &SparseVector) -> MutableSparseVector {
        let domain = vector.keys().compact();
        let len = domain.len();
        MutableSparseVector {
            domain,
            values: vector.values().to_vec(),
            set: ActiveMask::full(len),
            default_value: vector.default_value(),
            frozen: false,
        }
    }

    /// Sets the value returned by [`MutableSparseVector::get`] for absent keys.
    pub fn with_default(mut self, default_value: f64) -> MutableSparseVector {
        self.default_value = default_value;
        self
    }

    /// Returns the key domain.
    pub fn domain(&self) -> &KeyIndex {
        &self.domain
    }

    /// Returns the number of set entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.set.count_ones()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Returns the value for `key`, or the default value if the key is unset or outside
    /// the domain.
    #[inline]
    pub fn get(&self, key: i64) -> f64 {
        self.try_get(key).unwrap_or(self.default_value)
    }

    /// Returns the value for `key` if it is set.
    #[inline]
    pub fn try_get(&self, key: i64) -> Option<f64> {
        self.domain
            .index_of(key)
            .filter(|&i| self.set.contains(i))
            .map(|i| self.values[i])
    }

    /// Returns `true` if `key` is set.
    #[inline]
    pub fn contains_key(&self, key: i64) -> bool {
        self.try_get(key).is_some()
    }

    /// Returns an iterator over the set entries in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (i64, f64)> + '_ {
        let keys = self.domain.keys();
        self.set.iter().map(move |i| (keys[i], self.values[i]))
    }

    /// Returns the set keys in ascending order.
    pub fn keys(&self) -> impl Iterator<Item = i64> + '_ {
        self.iter().map(|(k, _)| k)
    }

    /// Sets the value for `key`, returning the previous value if the slot was set.
    ///
    /// # Errors
    ///
    /// Returns `Frozen` after a freeze and `KeyNotInDomain` for keys outside the domain.
    pub fn set(&mut self, key: i64, value: f64) -> Result<Option<f64>> {
        let i = self.slot_of(key)?;
        let previous = self.set.insert(i).then_some(self.values[i]);
        self.values[i] = value;
        Ok(previous)
    }

    /// Adds `delta` to the value of a set key, returning the previous value.
    ///
    /// # Errors
    ///
    /// Returns `Frozen` after a freeze, `KeyNotInDomain` for keys outside the domain and
    /// `KeyUnset` if the key has no value yet.
    pub fn add(&mut self, key: i64, delta: f64) -> Result<f64> {
        let i = self.slot_of(key)?;
        if !self.set.contains(i) {
            return Err(Error::key_unset(key));
        }
        let previous = self.values[i];
        self.values[i] = previous + delta;
        Ok(previous)
    }

    /// Unsets `key`, returning its previous value if it was set.
    pub fn unset(&mut self, key: i64) -> Result<Option<f64>> {
        let i = self.slot_of(key)?;
        Ok(self.set.remove(i).then_some(self.values[i]))
    }

    /// Unsets every key.
    pub fn clear(&mut self) -> Result<()> {
        self.check_mutable()?;
        self.set.clear();
        Ok(())
    }

    /// Sets every key of the domain to `value`.
    pub fn fill(&mut self, value: f64) -> Result<()> {
        self.check_mutable()?;
        self.values.fill(value);
        self.set.set_all();
        Ok(())
    }

    /// Multiplies every set value by `factor`.
    pub fn scale(&mut self, factor: f64) -> Result<()> {
        self.check_mutable()?;
        for i in self.set.iter() {
            self.values[i] *= factor;
        }
        Ok(())
    }

    /// Sets the value of every key of `other` that is in the domain; other keys of
    /// `other` are ignored.
    pub fn set_all<V: KeyedValues + ?Sized>(&mut self, other: &V) -> Result<()> {
        self.check_mutable()?;
        for (k, v) in other.entries() {
            if let Some(i) = self.domain.index_of(k) {
                self.set.insert(i);
                self.values[i] = v;
            }
        }
        Ok(())
    }

    /// Adds the values of `other` to the matching set keys; keys of `other` that are
    /// outside the domain or unset here are ignored.
    pub fn add_all<V: KeyedValues + ?Sized>(&mut self, other: &V) -> Result<()> {
        self.check_mutable()?;
        for (k, v) in other.entries() {
            if let Some(i) = self.domain.index_of(k).filter(|&i| self.set.contains(i)) {
                self.values[i] += v;
            }
        }
        Ok(())
    }

    /// Freezes the vector and returns an immutable copy of its set entries.
    ///
    /// # Errors
    ///
    /// Returns `Frozen` if the vector was already frozen.
    pub fn freeze(&mut self) -> Result<SparseVector> {
        self.check_mutable()?;
        self.frozen = true;
        Ok(self.immutable())
    }

    /// Returns an immutable copy of the set entries without freezing.
    pub fn immutable(&self) -> SparseVector {
        if self.set.count_ones() == self.domain.len() {
            return SparseVector::from_parts(
                self.domain.clone(),
                self.values.clone(),
                self.default_value,
            );
        }
        let (keys, values): (Vec<i64>, Vec<f64>) = self.iter().unzip();
        SparseVector::from_parts(KeyIndex::from_distinct(keys), values, self.default_value)
    }

    pub fn sum(&self) -> f64 {
        ops::sum(self)
    }

    pub fn sum_of_squares(&self) -> f64 {
        ops::sum_of_squares(self)
    }

    pub fn norm(&self) -> f64 {
        ops::euclidean_norm(self)
    }

    /// Returns the mean of the set values, or `NaN` if none are set.
    pub fn mean(&self) -> f64 {
        ops::mean(self)
    }

    pub fn dot<V: KeyedValues + ?Sized>(&self, other: &V) -> f64 {
        ops::dot_product(self, other)
    }

    fn check_mutable(&self) -> Result<()> {
        if self.frozen {
            Err(Error::frozen())
        } else {
            Ok(())
        }
    }

    fn slot_of(&self, key: i64) -> Result<usize> {
        self.check_mutable()?;
        self.domain
            .index_of(key)
            .ok_or_else(|| Error::key_not_in_domain(key))
    }
}

impl KeyedValues for MutableSparseVector {
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

impl PartialEq for MutableSparseVector {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl PartialEq<SparseVector> for MutableSparseVector {
    fn eq(&self, other: &SparseVector) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl std::fmt::Debug for MutableSparseVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use ratepack_common::error::ErrorKind;

    use super::*;

    fn domain_vector() -> MutableSparseVector {
        MutableSparseVector::from_keys([1, 3, 5, 7]).unwrap()
    }

    #[test]
    fn test_unset_is_not_zero() {
        let mut v = domain_vector();
        assert!(v.is_empty());
        assert_eq!(v.set(3, 0.0).unwrap(), None);
        assert_eq!(v.len(), 1);
        assert!(v.contains_key(3));
        assert_eq!(v.try_get(3), Some(0.0));
        assert_eq!(v.try_get(5), None);
        assert!(!v.contains_key(5));
        assert_eq!(v.get(5), 0.0);

        let v = v.with_default(f64::NAN);
        assert!(v.get(5).is_nan());
        assert_eq!(v.get(3), 0.0);
    }

    #[test]
    fn test_set_and_add() {
        let mut v = domain_vector();
        assert_eq!(v.set(1, 2.0).unwrap(), None);
        assert_eq!(v.set(1, 3.0).unwrap(), Some(2.0));
        assert_eq!(v.add(1, 2.0).unwrap(), 3.0);
        assert_eq!(v.get(1), 5.0);

        assert!(matches!(
            v.add(5, 1.0).unwrap_err().kind(),
            ErrorKind::KeyUnset { key: 5 }
        ));
        assert!(matches!(
            v.set(2, 1.0).unwrap_err().kind(),
            ErrorKind::KeyNotInDomain { key: 2 }
        ));
        assert!(matches!(
            v.add(2, 1.0).unwrap_err().kind(),
            ErrorKind::KeyNotInDomain { key: 2 }
        ));
    }

    #[test]
    fn test_unset_and_clear() {
        let mut v = domain_vector();
        v.fill(1.0).unwrap();
        assert_eq!(v.len(), 4);
        assert_eq!(v.unset(3).unwrap(), Some(1.0));
        assert_eq!(v.unset(3).unwrap(), None);
        assert_eq!(v.keys().collect::<Vec<_>>(), vec![1, 5, 7]);
        v.clear().unwrap();
        assert!(v.is_empty());
        assert_eq!(v.domain().len(), 4);
    }

    #[test]
    fn test_scale_only_touches_set_entries() {
        let mut v = domain_vector();
        v.set(1, 1.0).unwrap();
        v.set(7, 2.0).unwrap();
        v.scale(3.0).unwrap();
        assert_eq!(v.iter().collect::<Vec<_>>(), vec![(1, 3.0), (7, 6.0)]);
        assert_eq!(v.sum(), 9.0);
        assert_eq!(v.mean(), 4.5);
    }

    #[test]
    fn test_bulk_set_and_add() {
        let mut v = domain_vector();
        let other = SparseVector::from_pairs([(1, 1.0), (2, 2.0), (5, 5.0)]).unwrap();
        v.set_all(&other).unwrap();
        assert_eq!(v.iter().collect::<Vec<_>>(), vec![(1, 1.0), (5, 5.0)]);

        let more = SparseVector::from_pairs([(5, 1.0), (7, 1.0)]).unwrap();
        v.add_all(&more).unwrap();
        assert_eq!(v.iter().collect::<Vec<_>>(), vec![(1, 1.0), (5, 6.0)]);
    }

    #[test]
    fn test_freeze() {
        let mut v = domain_vector();
        v.set(1, 1.5).unwrap();
        v.set(5, 2.5).unwrap();
        let frozen = v.freeze().unwrap();
        assert!(v.is_frozen());
        assert_eq!(frozen.iter().collect::<Vec<_>>(), vec![(1, 1.5), (5, 2.5)]);

        assert!(matches!(v.set(1, 9.0).unwrap_err().kind(), ErrorKind::Frozen));
        assert!(matches!(v.add(1, 9.0).unwrap_err().kind(), ErrorKind::Frozen));
        assert!(matches!(v.unset(1).unwrap_err().kind(), ErrorKind::Frozen));
        assert!(v.fill(0.0).is_err());
        assert!(v.scale(2.0).is_err());
        assert!(v.clear().is_err());
        assert!(v.set_all(&frozen).is_err());
        assert!(v.add_all(&frozen).is_err());
        assert!(matches!(v.freeze().unwrap_err().kind(), ErrorKind::Frozen));

        assert_eq!(frozen.get(1), 1.5);
        assert_eq!(frozen.get(5), 2.5);
        assert_eq!(v, frozen);
        assert_eq!(frozen, v);
    }

    #[test]
    fn test_mutable_copy_roundtrip() {
        let original = SparseVector::from_pairs([(2, 3.0), (4, 5.0), (6, 7.0)]).unwrap();
        let mut copy = original.mutable_copy();
        assert_eq!(copy, original);
        assert_eq!(copy.set(4, 2.0).unwrap(), Some(5.0));
        assert_ne!(copy, original);
        assert_eq!(original.get(4), 5.0);
        assert_eq!(copy.immutable().sum(), 12.0);
        assert!(!copy.is_frozen());
    }

    #[test]
    fn test_copy_of_view() {
        let original = SparseVector::from_pairs((0..8).map(|k| (k, k as f64))).unwrap();
        let mut copy = original.tail_map(5).mutable_copy();
        assert_eq!(copy.domain().keys(), &[5, 6, 7]);
        copy.add(6, 1.0).unwrap();
        assert_eq!(copy.immutable().values(), &[5.0, 7.0, 7.0]);
    }

    #[test]
    fn test_dot_against_random_maps() {
        let mut rng = fastrand::Rng::with_seed(17);
        let domain = (0..200).collect::<Vec<i64>>();
        let mut v = MutableSparseVector::from_keys(domain.iter().copied()).unwrap();
        let mut map = ahash::AHashMap::new();
        for _ in 0..150 {
            let k = rng.i64(0..200);
            let x = rng.f64();
            v.set(k, x).unwrap();
            map.insert(k, x);
        }
        let frozen = v.freeze().unwrap();
        let merged = ops::dot_product(&frozen, &frozen);
        let looked_up = ops::dot_product(&map, &frozen);
        assert!((merged - looked_up).abs() < 1e-9);
        assert!((merged - frozen.sum_of_squares()).abs() < 1e-9);
    }
}
