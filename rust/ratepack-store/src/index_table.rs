//! Key → row-run tables of the index section.

use std::{ops::Range, sync::Arc};

use ratepack_common::{Result, error::Error, verify_data};
use ratepack_keys::KeyIndex;

use crate::format::{read_i32, read_i64};

/// A shared, immutable run of row positions.
///
/// Clones share the backing array.
#[derive(Clone)]
pub struct RowIndices {
    rows: Arc<[u32]>,
    range: Range<usize>,
}

impl RowIndices {
    pub(crate) fn new(rows: Arc<[u32]>, range: Range<usize>) -> RowIndices {
        debug_assert!(range.end <= rows.len());
        RowIndices { rows, range }
    }

    /// Wraps an owned list of row positions.
    pub fn from_vec(rows: Vec<u32>) -> RowIndices {
        let len = rows.len();
        RowIndices::new(rows.into(), 0..len)
    }

    pub fn empty() -> RowIndices {
        RowIndices::from_vec(Vec::new())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.range.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<u32> {
        self.as_slice().get(index).copied()
    }

    #[inline]
    pub fn as_slice(&self) -> &[u32] {
        &self.rows[self.range.clone()]
    }

    pub fn iter(&self) -> std::iter::Copied<std::slice::Iter<'_, u32>> {
        self.as_slice().iter().copied()
    }
}

impl std::fmt::Debug for RowIndices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

impl PartialEq for RowIndices {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

/// Maps each key of one index (by user or by item) to the rows that mention it.
///
/// The serialized table is `key_count` big-endian `i64` keys in strictly ascending order,
/// followed, for each key in the same order, by an `i32` count and that many `i32` row
/// positions. Runs are stored back to back in one array, so the concatenation of every
/// run in key order is available without copying.
#[derive(Clone)]
pub struct BinaryIndexTable {
    keys: KeyIndex,
    offsets: Arc<[usize]>,
    rows: Arc<[u32]>,
}

impl BinaryIndexTable {
    /// Parses a table from the start of `bytes` and returns it with the number of bytes
    /// it occupies.
    ///
    /// # Errors
    ///
    /// Returns `InvalidFormat` if the region is shorter than the table, the keys are not
    /// strictly ascending, a count is negative or a row position is not below
    /// `row_count`.
    pub fn parse(
        key_count: usize,
        bytes: &[u8],
        row_count: usize,
    ) -> Result<(BinaryIndexTable, usize)> {
        // Each key needs at least 12 bytes: the key and an empty run.
        verify_data!(key_count, key_count <= bytes.len() / 12);
        let mut r = bytes;

        let mut keys = Vec::with_capacity(key_count);
        for _ in 0..key_count {
            let key = read_i64(&mut r, "index_keys")?;
            if let Some(&prev) = keys.last() {
                verify_data!("index_keys", prev < key);
            }
            keys.push(key);
        }

        let mut offsets = Vec::with_capacity(key_count + 1);
        let mut rows = Vec::new();
        offsets.push(0);
        for _ in 0..key_count {
            let count = read_i32(&mut r, "index_count")?;
            verify_data!(count, count >= 0);
            verify_data!(count, count as usize <= r.len() / 4);
            rows.reserve(count as usize);
            for _ in 0..count {
                let row = read_i32(&mut r, "index_row")?;
                verify_data!(row, row >= 0 && (row as usize) < row_count);
                rows.push(row as u32);
            }
            offsets.push(rows.len());
        }

        let consumed = bytes.len() - r.len();
        log::debug!(
            "parsed index table: {} keys, {} rows, {} bytes",
            key_count,
            rows.len(),
            consumed
        );
        let keys = KeyIndex::from_sorted(keys)
            .map_err(|e| Error::invalid_format("index_keys", e.to_string()))?;
        let table = BinaryIndexTable {
            keys,
            offsets: offsets.into(),
            rows: rows.into(),
        };
        Ok((table, consumed))
    }

    /// Returns the keys that have a run in this table.
    pub fn keys(&self) -> &KeyIndex {
        &self.keys
    }

    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    /// Returns the total number of row positions in all runs.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns the rows for `key`, or `None` if the key is not in the table.
    pub fn rows_for(&self, key: i64) -> Option<RowIndices> {
        self.keys.index_of(key).map(|i| self.run(i))
    }

    /// Returns every `(key, rows)` pair in ascending key order.
    pub fn entries(&self) -> impl ExactSizeIterator<Item = (i64, RowIndices)> + '_ {
        self.keys.iter().enumerate().map(|(i, key)| (key, self.run(i)))
    }

    /// Returns the concatenation of all runs in ascending key order.
    pub fn all_rows(&self) -> RowIndices {
        RowIndices::new(self.rows.clone(), 0..self.rows.len())
    }

    /// Returns `true` if every row below `row_count` occurs exactly once.
    pub fn is_row_permutation(&self, row_count: usize) -> bool {
        if self.rows.len() != row_count {
            return false;
        }
        let mut seen = vec![false; row_count];
        self.rows
            .iter()
            .all(|&row| !std::mem::replace(&mut seen[row as usize], true))
    }

    pub(crate) fn run(&self, i: usize) -> RowIndices {
        RowIndices::new(self.rows.clone(), self.offsets[i]..self.offsets[i + 1])
    }
}

impl std::fmt::Debug for BinaryIndexTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.entries()).finish()
    }
}

/// Serializes a table in the layout read by [`BinaryIndexTable::parse`].
///
/// `runs` must be in strictly ascending key order.
pub(crate) fn write_table<W: std::io::Write>(
    w: &mut W,
    runs: &std::collections::BTreeMap<i64, Vec<u32>>,
) -> Result<()> {
    use byteorder::{BE, WriteBytesExt};

    for &key in runs.keys() {
        w.write_i64::<BE>(key)?;
    }
    for rows in runs.values() {
        let count = i32::try_from(rows.len())
            .map_err(|_| Error::invalid_arg("rows", "run length exceeds i32::MAX"))?;
        w.write_i32::<BE>(count)?;
        for &row in rows {
            w.write_i32::<BE>(row as i32)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn encode(runs: &[(i64, &[u32])]) -> Vec<u8> {
        let runs = runs
            .iter()
            .map(|&(k, rows)| (k, rows.to_vec()))
            .collect::<BTreeMap<_, _>>();
        let mut buf = Vec::new();
        write_table(&mut buf, &runs).unwrap();
        buf
    }

    #[test]
    fn test_parse() {
        let mut bytes = encode(&[(10, &[0, 2]), (20, &[]), (30, &[1])]);
        let table_len = bytes.len();
        bytes.extend_from_slice(&[0xAB; 7]);

        let (table, consumed) = BinaryIndexTable::parse(3, &bytes, 3).unwrap();
        assert_eq!(consumed, table_len);
        assert_eq!(consumed, 3 * 8 + 3 * 4 + 3 * 4);
        assert_eq!(table.keys().keys(), &[10, 20, 30]);
        assert_eq!(table.rows_for(10).unwrap().as_slice(), &[0, 2]);
        assert!(table.rows_for(20).unwrap().is_empty());
        assert!(table.rows_for(15).is_none());
        assert_eq!(table.all_rows().as_slice(), &[0, 2, 1]);
        assert!(table.is_row_permutation(3));
        assert!(!table.is_row_permutation(4));

        let keys = table.entries().map(|(k, _)| k).collect::<Vec<_>>();
        assert_eq!(keys, vec![10, 20, 30]);
        assert_eq!(table.entries().count(), 3);
    }

    #[test]
    fn test_empty_table() {
        let (table, consumed) = BinaryIndexTable::parse(0, &[], 0).unwrap();
        assert_eq!(consumed, 0);
        assert_eq!(table.key_count(), 0);
        assert!(table.all_rows().is_empty());
    }

    #[test]
    fn test_truncated() {
        let bytes = encode(&[(1, &[0]), (2, &[1, 2])]);
        for len in 0..bytes.len() {
            let err = BinaryIndexTable::parse(2, &bytes[..len], 3).unwrap_err();
            assert!(err.is_load_error(), "len {len}");
        }
    }

    #[test]
    fn test_row_out_of_range() {
        let bytes = encode(&[(1, &[0, 5])]);
        assert!(BinaryIndexTable::parse(1, &bytes, 5).unwrap_err().is_load_error());
        assert!(BinaryIndexTable::parse(1, &bytes, 6).is_ok());
    }

    #[test]
    fn test_keys_out_of_order() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&5i64.to_be_bytes());
        bytes.extend_from_slice(&3i64.to_be_bytes());
        bytes.extend_from_slice(&0i32.to_be_bytes());
        bytes.extend_from_slice(&0i32.to_be_bytes());
        assert!(BinaryIndexTable::parse(2, &bytes, 0).unwrap_err().is_load_error());
    }

    #[test]
    fn test_negative_count() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&5i64.to_be_bytes());
        bytes.extend_from_slice(&(-1i32).to_be_bytes());
        assert!(BinaryIndexTable::parse(1, &bytes, 0).unwrap_err().is_load_error());
    }
}
