use std::{ops::Range, sync::Arc};

use crate::{
    BinaryIndexTable, Rating, RatingList, RowIndices, UserHistory, rating_list::RowSource,
};

/// The order in which [`BinaryRatingStore::stream_all`](crate::BinaryRatingStore::stream_all)
/// yields ratings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SortOrder {
    /// File order.
    #[default]
    Any,
    /// Ascending timestamp; ratings with equal timestamps keep their file order.
    Timestamp,
    /// Grouped by ascending user id.
    User,
    /// Grouped by ascending item id.
    Item,
}

enum Rows {
    Sequential(Range<u32>),
    Indexed { rows: RowIndices, next: usize },
}

/// A single pass over ratings of a store in some [`SortOrder`].
///
/// Rows are decoded from the mapping as the stream advances. The stream keeps the
/// mapping alive on its own.
pub struct RatingStream {
    source: Arc<RowSource>,
    rows: Rows,
}

impl RatingStream {
    pub(crate) fn sequential(source: Arc<RowSource>) -> RatingStream {
        let end = source.rating_count() as u32;
        RatingStream {
            source,
            rows: Rows::Sequential(0..end),
        }
    }

    pub(crate) fn indexed(source: Arc<RowSource>, rows: RowIndices) -> RatingStream {
        RatingStream {
            source,
            rows: Rows::Indexed { rows, next: 0 },
        }
    }

    fn remaining(&self) -> usize {
        match &self.rows {
            Rows::Sequential(range) => range.len(),
            Rows::Indexed { rows, next } => rows.len() - next,
        }
    }
}

impl Iterator for RatingStream {
    type Item = Rating;

    fn next(&mut self) -> Option<Rating> {
        let row = match &mut self.rows {
            Rows::Sequential(range) => range.next()?,
            Rows::Indexed { rows, next } => {
                let row = rows.get(*next)?;
                *next += 1;
                row
            }
        };
        Some(self.source.row(row))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining();
        (n, Some(n))
    }
}

impl ExactSizeIterator for RatingStream {}

impl std::iter::FusedIterator for RatingStream {}

impl std::fmt::Debug for RatingStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RatingStream")
            .field("remaining", &self.remaining())
            .finish()
    }
}

/// The per-user groups of a store in ascending user order, as returned by
/// [`BinaryRatingStore::stream_by_user`](crate::BinaryRatingStore::stream_by_user).
pub struct UserHistories {
    source: Arc<RowSource>,
    users: BinaryIndexTable,
    next: usize,
}

impl UserHistories {
    pub(crate) fn new(source: Arc<RowSource>, users: BinaryIndexTable) -> UserHistories {
        UserHistories {
            source,
            users,
            next: 0,
        }
    }
}

impl Iterator for UserHistories {
    type Item = UserHistory;

    fn next(&mut self) -> Option<UserHistory> {
        let user = self.users.keys().key_at(self.next).ok()?;
        let rows = self.users.run(self.next);
        self.next += 1;
        Some(UserHistory {
            user,
            ratings: RatingList::new(self.source.clone(), rows),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.users.key_count() - self.next;
        (n, Some(n))
    }
}

impl ExactSizeIterator for UserHistories {}
