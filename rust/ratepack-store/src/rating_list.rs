use std::sync::Arc;

use ahash::AHashMap;
use ratepack_common::{Result, verify_index};
use ratepack_keys::KeyIndex;
use ratepack_vectors::SparseVector;

use crate::{BinaryFormat, Rating, RowIndices, format::HEADER_LEN, mapped::MappedFile};

/// The rating rows of a mapped file.
///
/// Shared by the store and every view created from it; the file stays mapped until the
/// last holder is dropped.
#[derive(Debug)]
pub(crate) struct RowSource {
    file: MappedFile,
    format: BinaryFormat,
    rating_count: usize,
}

impl RowSource {
    /// The caller has checked that the file holds `rating_count` full rows after the header.
    pub(crate) fn new(file: MappedFile, format: BinaryFormat, rating_count: usize) -> RowSource {
        debug_assert!(file.len() >= HEADER_LEN + rating_count * format.row_width());
        RowSource {
            file,
            format,
            rating_count,
        }
    }

    #[inline]
    pub(crate) fn rating_count(&self) -> usize {
        self.rating_count
    }

    #[inline]
    pub(crate) fn row(&self, row: u32) -> Rating {
        let width = self.format.row_width();
        let start = HEADER_LEN + row as usize * width;
        self.format.decode_row(&self.file.bytes()[start..start + width])
    }

    pub(crate) fn file(&self) -> &MappedFile {
        &self.file
    }
}

/// An ordered view of selected rows of a rating file.
///
/// Lists are cheap to clone and keep the underlying mapping alive, so they remain
/// readable after the store that produced them is closed.
#[derive(Clone)]
pub struct RatingList {
    source: Arc<RowSource>,
    rows: RowIndices,
}

impl RatingList {
    pub(crate) fn new(source: Arc<RowSource>, rows: RowIndices) -> RatingList {
        RatingList { source, rows }
    }

    /// Returns an empty list over the same file.
    pub(crate) fn emptied(&self) -> RatingList {
        RatingList::new(self.source.clone(), RowIndices::empty())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the rating at position `index` of the list.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfBounds` if `index >= len()`.
    pub fn get(&self, index: usize) -> Result<Rating> {
        verify_index!(index, self.len());
        Ok(self.source.row(self.rows.as_slice()[index]))
    }

    /// Returns the file row positions of the list's ratings.
    pub fn row_indices(&self) -> &RowIndices {
        &self.rows
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = Rating> + '_ {
        self.rows.iter().map(|row| self.source.row(row))
    }

    /// Returns a vector mapping each rated item to its rating.
    ///
    /// If an item is rated more than once, the rating with the greatest timestamp wins;
    /// among equal (or missing) timestamps, the later row in the list wins.
    pub fn item_vector(&self) -> Result<SparseVector> {
        self.latest_by(|r| r.item)
    }

    /// Returns a vector mapping each rating user to their rating, with the same rule for
    /// repeated users as [`RatingList::item_vector`].
    pub fn user_vector(&self) -> Result<SparseVector> {
        self.latest_by(|r| r.user)
    }

    fn latest_by(&self, key: impl Fn(&Rating) -> i64) -> Result<SparseVector> {
        let mut latest = AHashMap::<i64, (Option<i64>, f64)>::with_capacity(self.len());
        for rating in self.iter() {
            latest
                .entry(key(&rating))
                .and_modify(|entry| {
                    if rating.timestamp >= entry.0 {
                        *entry = (rating.timestamp, rating.value);
                    }
                })
                .or_insert((rating.timestamp, rating.value));
        }
        let mut pairs = latest.into_iter().map(|(k, (_, v))| (k, v)).collect::<Vec<_>>();
        pairs.sort_unstable_by_key(|&(k, _)| k);
        let (keys, values): (Vec<i64>, Vec<f64>) = pairs.into_iter().unzip();
        SparseVector::wrap(KeyIndex::from_sorted(keys)?, values)
    }
}

impl std::fmt::Debug for RatingList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a> IntoIterator for &'a RatingList {
    type Item = Rating;
    type IntoIter = Box<dyn ExactSizeIterator<Item = Rating> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

/// All ratings of one user, as yielded by
/// [`BinaryRatingStore::stream_by_user`](crate::BinaryRatingStore::stream_by_user).
#[derive(Clone, Debug)]
pub struct UserHistory {
    pub user: i64,
    pub ratings: RatingList,
}

impl UserHistory {
    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }

    pub fn item_vector(&self) -> Result<SparseVector> {
        self.ratings.item_vector()
    }
}
