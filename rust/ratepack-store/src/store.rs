use std::{
    path::{Path, PathBuf},
    sync::{Arc, OnceLock},
};

use ratepack_common::{Result, error::Error, verify_data};
use ratepack_keys::KeyIndex;

use crate::{
    BinaryFormat, BinaryIndexTable, EventKind, OpenOptions, RatingHeader, RatingList,
    RatingStream, RowIndices, SortOrder, UserHistories,
    mapped::MappedFile,
    rating_list::RowSource,
};

/// A read-only rating store backed by a memory-mapped packed rating file.
///
/// Opening the store validates the header and parses both index tables; rows are
/// decoded lazily from the mapping. Every list and stream returned by the store holds
/// its own handle on the mapping, so they stay valid after [`BinaryRatingStore::close`]
/// and after the store is dropped.
///
/// The store is `Send + Sync`; any number of threads may query it concurrently.
#[derive(Debug)]
pub struct BinaryRatingStore {
    path: PathBuf,
    header: RatingHeader,
    state: Option<StoreState>,
}

#[derive(Debug)]
struct StoreState {
    rows: Arc<RowSource>,
    users: BinaryIndexTable,
    items: BinaryIndexTable,
    timestamp_order: OnceLock<RowIndices>,
}

impl BinaryRatingStore {
    /// Opens the rating file at `path` with default options.
    pub fn open(path: impl AsRef<Path>) -> Result<BinaryRatingStore> {
        BinaryRatingStore::open_with(path, &OpenOptions::default())
    }

    /// Opens the rating file at `path`.
    ///
    /// # Errors
    ///
    /// Returns `FileNotFound` if the file does not exist and `InvalidFormat` if it is
    /// truncated, has a bad magic or unknown flags, or its index tables are inconsistent
    /// with the header.
    pub fn open_with(path: impl AsRef<Path>, options: &OpenOptions) -> Result<BinaryRatingStore> {
        let path = path.as_ref();
        let file = MappedFile::open(path, options.populate)?;
        let bytes = file.bytes();

        let header = RatingHeader::parse(bytes)?;
        let index_offset = header.index_offset();
        verify_data!("rating_section", index_offset <= bytes.len());

        let (users, user_len) = BinaryIndexTable::parse(
            header.user_count,
            &bytes[index_offset..],
            header.rating_count,
        )?;
        let item_offset = index_offset + user_len;
        let (items, item_len) =
            BinaryIndexTable::parse(header.item_count, &bytes[item_offset..], header.rating_count)?;
        let index_end = item_offset + item_len;
        verify_data!("index_section", index_end <= bytes.len());
        if index_end < bytes.len() {
            log::debug!(
                "ignoring {} bytes after the index tables of {}",
                bytes.len() - index_end,
                path.display()
            );
        }

        for (name, table) in [("user_index", &users), ("item_index", &items)] {
            if table.row_count() != header.rating_count {
                return Err(Error::invalid_format(
                    name,
                    format!(
                        "table addresses {} rows, header declares {}",
                        table.row_count(),
                        header.rating_count
                    ),
                ));
            }
            if options.verify_row_indices && !table.is_row_permutation(header.rating_count) {
                return Err(Error::invalid_format(
                    name,
                    "table does not list every row exactly once",
                ));
            }
        }

        log::info!(
            "opened rating store {}: {} ratings, {} users, {} items",
            path.display(),
            header.rating_count,
            header.user_count,
            header.item_count
        );
        Ok(BinaryRatingStore {
            path: path.to_path_buf(),
            header,
            state: Some(StoreState {
                rows: Arc::new(RowSource::new(file, header.format, header.rating_count)),
                users,
                items,
                timestamp_order: OnceLock::new(),
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn header(&self) -> &RatingHeader {
        &self.header
    }

    pub fn format(&self) -> BinaryFormat {
        self.header.format
    }

    pub fn rating_count(&self) -> usize {
        self.header.rating_count
    }

    pub fn user_count(&self) -> usize {
        self.header.user_count
    }

    pub fn item_count(&self) -> usize {
        self.header.item_count
    }

    /// Returns the size of the mapped file in bytes.
    pub fn file_len(&self) -> Result<usize> {
        Ok(self.state()?.rows.file().len())
    }

    /// Releases the store's handle on the mapping. Later queries fail with `Closed`.
    ///
    /// Lists and streams obtained earlier keep the mapping alive until they are dropped.
    pub fn close(&mut self) {
        if self.state.take().is_some() {
            log::debug!("closed rating store {}", self.path.display());
        }
    }

    pub fn is_closed(&self) -> bool {
        self.state.is_none()
    }

    /// Streams every rating in the requested order.
    pub fn stream_all(&self, order: SortOrder) -> Result<RatingStream> {
        let state = self.state()?;
        let rows = state.rows.clone();
        let stream = match order {
            SortOrder::Any => RatingStream::sequential(rows),
            SortOrder::Timestamp if !self.header.format.has_timestamps() => {
                RatingStream::sequential(rows)
            }
            SortOrder::Timestamp => {
                RatingStream::indexed(rows, state.timestamp_order(&self.path).clone())
            }
            SortOrder::User => RatingStream::indexed(rows, state.users.all_rows()),
            SortOrder::Item => RatingStream::indexed(rows, state.items.all_rows()),
        };
        Ok(stream)
    }

    /// Streams one [`UserHistory`](crate::UserHistory) per user in ascending user order.
    pub fn stream_by_user(&self) -> Result<UserHistories> {
        let state = self.state()?;
        Ok(UserHistories::new(state.rows.clone(), state.users.clone()))
    }

    /// Returns the ratings by `user` in file order, or `None` for an unknown user.
    pub fn ratings_for_user(&self, user: i64) -> Result<Option<RatingList>> {
        let state = self.state()?;
        Ok(state.list(&state.users, user))
    }

    /// Returns the ratings of `item` in file order, or `None` for an unknown item.
    pub fn ratings_for_item(&self, item: i64) -> Result<Option<RatingList>> {
        let state = self.state()?;
        Ok(state.list(&state.items, item))
    }

    /// Returns the events of `kind` by `user`.
    ///
    /// Unknown users yield `None`. Known users yield an empty list for every kind other
    /// than [`EventKind::Rating`], as rating files only hold ratings.
    pub fn events_for_user(&self, user: i64, kind: EventKind) -> Result<Option<RatingList>> {
        let list = self.ratings_for_user(user)?;
        Ok(list.map(|list| Self::restrict(list, kind)))
    }

    /// Returns the events of `kind` on `item`, with the same rules as
    /// [`BinaryRatingStore::events_for_user`].
    pub fn events_for_item(&self, item: i64, kind: EventKind) -> Result<Option<RatingList>> {
        let list = self.ratings_for_item(item)?;
        Ok(list.map(|list| Self::restrict(list, kind)))
    }

    /// Returns the distinct users who rated `item`, or `None` for an unknown item.
    pub fn users_for_item(&self, item: i64) -> Result<Option<KeyIndex>> {
        let list = self.ratings_for_item(item)?;
        Ok(list.map(|list| KeyIndex::from_distinct(list.iter().map(|r| r.user))))
    }

    /// Returns the distinct items rated by `user`, or `None` for an unknown user.
    pub fn items_for_user(&self, user: i64) -> Result<Option<KeyIndex>> {
        let list = self.ratings_for_user(user)?;
        Ok(list.map(|list| KeyIndex::from_distinct(list.iter().map(|r| r.item))))
    }

    /// Returns every user id in ascending order.
    pub fn all_user_ids(&self) -> Result<KeyIndex> {
        Ok(self.state()?.users.keys().clone())
    }

    /// Returns every item id in ascending order.
    pub fn all_item_ids(&self) -> Result<KeyIndex> {
        Ok(self.state()?.items.keys().clone())
    }

    pub fn user_table(&self) -> Result<&BinaryIndexTable> {
        Ok(&self.state()?.users)
    }

    pub fn item_table(&self) -> Result<&BinaryIndexTable> {
        Ok(&self.state()?.items)
    }

    fn state(&self) -> Result<&StoreState> {
        self.state.as_ref().ok_or_else(Error::closed)
    }

    fn restrict(list: RatingList, kind: EventKind) -> RatingList {
        match kind {
            EventKind::Rating => list,
            EventKind::Like | EventKind::LikeBatch => list.emptied(),
        }
    }
}

impl StoreState {
    fn list(&self, table: &BinaryIndexTable, key: i64) -> Option<RatingList> {
        table
            .rows_for(key)
            .map(|rows| RatingList::new(self.rows.clone(), rows))
    }

    /// Row positions sorted by ascending timestamp, stable with respect to file order.
    fn timestamp_order(&self, path: &Path) -> &RowIndices {
        self.timestamp_order.get_or_init(|| {
            let rows = &self.rows;
            let mut order = (0..rows.rating_count() as u32).collect::<Vec<_>>();
            order.sort_by_key(|&row| rows.row(row).timestamp);
            log::debug!(
                "built timestamp order for {} ({} rows)",
                path.display(),
                order.len()
            );
            RowIndices::from_vec(order)
        })
    }
}
