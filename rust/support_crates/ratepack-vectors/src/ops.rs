//! Vector arithmetic over long-keyed maps.
//!
//! Every function here treats a key missing from a map as contributing `0.0`.

use std::{
    collections::{BTreeMap, HashMap},
    hash::BuildHasher,
};

use ahash::AHashMap;
use itertools::{EitherOrBoth, Itertools};

/// Read access to a finite map from `i64` keys to `f64` values.
///
/// Implementors that can iterate their entries in ascending key order report it through
/// [`KeyedValues::is_key_sorted`], which lets [`dot_product`] use a linear merge walk
/// instead of point lookups.
pub trait KeyedValues {
    /// Returns the number of entries.
    fn entry_count(&self) -> usize;

    /// Returns the value stored for `key`, or `None` if there is no entry.
    fn value_of(&self, key: i64) -> Option<f64>;

    /// Returns an iterator over the `(key, value)` entries.
    ///
    /// The order is ascending by key if and only if `is_key_sorted()` is `true`.
    fn entries(&self) -> impl Iterator<Item = (i64, f64)> + '_;

    /// Returns `true` if `entries()` yields keys in ascending order.
    fn is_key_sorted(&self) -> bool;
}

/// Computes the sum of the values.
pub fn sum<V: KeyedValues + ?Sized>(v: &V) -> f64 {
    v.entries().map(|(_, x)| x).sum()
}

/// Computes the sum of the squares of the values.
pub fn sum_of_squares<V: KeyedValues + ?Sized>(v: &V) -> f64 {
    v.entries().map(|(_, x)| x * x).sum()
}

/// Computes the Euclidean norm, the square root of the sum of squares.
pub fn euclidean_norm<V: KeyedValues + ?Sized>(v: &V) -> f64 {
    sum_of_squares(v).sqrt()
}

/// Computes the mean of the values; `NaN` for an empty map.
pub fn mean<V: KeyedValues + ?Sized>(v: &V) -> f64 {
    let n = v.entry_count();
    if n == 0 {
        f64::NAN
    } else {
        sum(v) / n as f64
    }
}

/// Computes the dot product, the sum of the products of values of common keys.
///
/// If both operands iterate in key order the entries are merged in a single pass over
/// both maps. Otherwise the entries of `a` are iterated and looked up in `b`. The two
/// paths add the same products, but not necessarily in the same order, so results may
/// differ in the last bits.
pub fn dot_product<A, B>(a: &A, b: &B) -> f64
where
    A: KeyedValues + ?Sized,
    B: KeyedValues + ?Sized,
{
    if a.is_key_sorted() && b.is_key_sorted() {
        a.entries()
            .merge_join_by(b.entries(), |x, y| x.0.cmp(&y.0))
            .map(|entry| match entry {
                EitherOrBoth::Both((_, x), (_, y)) => x * y,
                _ => 0.0,
            })
            .sum()
    } else {
        a.entries()
            .map(|(k, x)| x * b.value_of(k).unwrap_or(0.0))
            .sum()
    }
}

impl KeyedValues for BTreeMap<i64, f64> {
    fn entry_count(&self) -> usize {
        self.len()
    }

    fn value_of(&self, key: i64) -> Option<f64> {
        self.get(&key).copied()
    }

    fn entries(&self) -> impl Iterator<Item = (i64, f64)> + '_ {
        self.iter().map(|(&k, &v)| (k, v))
    }

    fn is_key_sorted(&self) -> bool {
        true
    }
}

impl<S: BuildHasher> KeyedValues for HashMap<i64, f64, S> {
    fn entry_count(&self) -> usize {
        self.len()
    }

    fn value_of(&self, key: i64) -> Option<f64> {
        self.get(&key).copied()
    }

    fn entries(&self) -> impl Iterator<Item = (i64, f64)> + '_ {
        self.iter().map(|(&k, &v)| (k, v))
    }

    fn is_key_sorted(&self) -> bool {
        false
    }
}

impl KeyedValues for AHashMap<i64, f64> {
    fn entry_count(&self) -> usize {
        self.len()
    }

    fn value_of(&self, key: i64) -> Option<f64> {
        self.get(&key).copied()
    }

    fn entries(&self) -> impl Iterator<Item = (i64, f64)> + '_ {
        self.iter().map(|(&k, &v)| (k, v))
    }

    fn is_key_sorted(&self) -> bool {
        false
    }
}
