//! Packed, memory-mapped rating storage.
//!
//! A rating file is written once by [`BinaryRatingPacker`] and then opened read-only by
//! [`BinaryRatingStore`], which maps it into memory and answers per-user, per-item and
//! whole-file queries without copying rows. See [`format`] for the file layout.

pub mod event_type;
pub mod format;
pub mod index_table;
pub mod mapped;
pub mod options;
pub mod packer;
pub mod rating;
pub mod rating_list;
pub mod store;
pub mod stream;

pub use event_type::{EventKind, EventTypeRegistry};
pub use format::{BinaryFormat, FormatFlag, RatingHeader};
pub use index_table::{BinaryIndexTable, RowIndices};
pub use options::{OpenOptions, PackOptions};
pub use packer::{BinaryRatingPacker, PackSummary};
pub use rating::Rating;
pub use rating_list::{RatingList, UserHistory};
pub use store::BinaryRatingStore;
pub use stream::{RatingStream, SortOrder, UserHistories};
