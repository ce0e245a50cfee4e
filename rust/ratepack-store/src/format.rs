//! Layout of the packed rating file.
//!
//! ```text
//! +--------------------+  0
//! | header (28 bytes)  |
//! +--------------------+  HEADER_LEN
//! | rating rows        |  rating_count * row_width
//! +--------------------+
//! | by-user table      |
//! | by-item table      |
//! +--------------------+
//! ```
//!
//! All numbers are big-endian. See [`RatingHeader`] for the header fields and
//! [`BinaryFormat`] for the row layout.

use std::io::{Read, Write};

use byteorder::{BE, ByteOrder, ReadBytesExt, WriteBytesExt};
use ratepack_common::{Result, error::Error, verify_data};

use crate::Rating;

/// File magic.
pub const MAGIC: &[u8; 6] = b"LKRATE";

/// Size of the fixed file header in bytes.
pub const HEADER_LEN: usize = 28;

/// A feature bit of the file header.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FormatFlag {
    /// Every row carries a trailing `i64` timestamp.
    Timestamps,
}

/// Describes a [`FormatFlag`]: its bit in the header and its display name.
#[derive(Clone, Copy, Debug)]
pub struct FlagDescriptor {
    pub flag: FormatFlag,
    pub bit: u16,
    pub name: &'static str,
}

/// Every flag this version of the format understands.
pub const FORMAT_FLAGS: &[FlagDescriptor] = &[FlagDescriptor {
    flag: FormatFlag::Timestamps,
    bit: 1 << 0,
    name: "timestamps",
}];

impl FormatFlag {
    pub fn descriptor(self) -> &'static FlagDescriptor {
        match self {
            FormatFlag::Timestamps => &FORMAT_FLAGS[0],
        }
    }

    pub fn bit(self) -> u16 {
        self.descriptor().bit
    }

    pub fn name(self) -> &'static str {
        self.descriptor().name
    }
}

/// The row layout selected by the header flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BinaryFormat {
    timestamps: bool,
}

impl BinaryFormat {
    const BASE_ROW_WIDTH: usize = 24;
    const TIMESTAMP_WIDTH: usize = 8;

    pub fn new(timestamps: bool) -> BinaryFormat {
        BinaryFormat { timestamps }
    }

    /// Decodes the header flag word.
    ///
    /// # Errors
    ///
    /// Returns `InvalidFormat` if a bit is set that no [`FormatFlag`] describes.
    pub fn from_flags(flags: u16) -> Result<BinaryFormat> {
        let known = FORMAT_FLAGS.iter().fold(0u16, |acc, d| acc | d.bit);
        if flags & !known != 0 {
            return Err(Error::invalid_format(
                "flags",
                format!("unknown format flags {:#06x}", flags & !known),
            ));
        }
        Ok(BinaryFormat {
            timestamps: flags & FormatFlag::Timestamps.bit() != 0,
        })
    }

    /// Encodes the header flag word.
    pub fn flags(&self) -> u16 {
        self.active_flags().fold(0, |acc, f| acc | f.bit())
    }

    pub fn has_flag(&self, flag: FormatFlag) -> bool {
        match flag {
            FormatFlag::Timestamps => self.timestamps,
        }
    }

    pub fn active_flags(&self) -> impl Iterator<Item = FormatFlag> + '_ {
        FORMAT_FLAGS
            .iter()
            .map(|d| d.flag)
            .filter(|&f| self.has_flag(f))
    }

    #[inline]
    pub fn has_timestamps(&self) -> bool {
        self.timestamps
    }

    /// Width of one rating row in bytes.
    #[inline]
    pub fn row_width(&self) -> usize {
        if self.timestamps {
            Self::BASE_ROW_WIDTH + Self::TIMESTAMP_WIDTH
        } else {
            Self::BASE_ROW_WIDTH
        }
    }

    /// Decodes one row.
    ///
    /// # Errors
    ///
    /// Returns `InvalidFormat` if `bytes` is shorter than [`BinaryFormat::row_width`].
    pub fn read_row(&self, bytes: &[u8]) -> Result<Rating> {
        verify_data!("row", bytes.len() >= self.row_width());
        Ok(self.decode_row(bytes))
    }

    /// Decodes one row from a slice already known to hold a full row.
    ///
    /// # Panics
    ///
    /// Panics if `row` is shorter than [`BinaryFormat::row_width`].
    #[inline]
    pub(crate) fn decode_row(&self, row: &[u8]) -> Rating {
        Rating {
            user: BE::read_i64(&row[0..8]),
            item: BE::read_i64(&row[8..16]),
            value: BE::read_f64(&row[16..24]),
            timestamp: self.timestamps.then(|| BE::read_i64(&row[24..32])),
        }
    }

    /// Encodes one row. A missing timestamp is an error if the format has timestamps; a
    /// present one is dropped otherwise.
    pub fn write_row<W: Write>(&self, w: &mut W, rating: &Rating) -> Result<()> {
        w.write_i64::<BE>(rating.user)?;
        w.write_i64::<BE>(rating.item)?;
        w.write_f64::<BE>(rating.value)?;
        if self.timestamps {
            let timestamp = rating.timestamp.ok_or_else(|| {
                Error::invalid_arg("rating", "timestamp required by the file format")
            })?;
            w.write_i64::<BE>(timestamp)?;
        }
        Ok(())
    }
}

/// The fixed header at the start of a rating file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RatingHeader {
    pub format: BinaryFormat,
    pub rating_count: usize,
    pub user_count: usize,
    pub item_count: usize,
}

impl RatingHeader {
    pub fn new(format: BinaryFormat) -> RatingHeader {
        RatingHeader {
            format,
            rating_count: 0,
            user_count: 0,
            item_count: 0,
        }
    }

    /// Byte length of the rating section.
    pub fn rating_section_len(&self) -> usize {
        self.rating_count * self.format.row_width()
    }

    /// Byte offset of the index section.
    pub fn index_offset(&self) -> usize {
        HEADER_LEN + self.rating_section_len()
    }

    /// Parses the header from the start of `bytes`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidFormat` for a short buffer, a wrong magic, unknown flags, negative
    /// counts or a rating section length that does not match the row count.
    pub fn parse(bytes: &[u8]) -> Result<RatingHeader> {
        verify_data!("header", bytes.len() >= HEADER_LEN);
        let (magic, mut r) = bytes.split_at(MAGIC.len());
        verify_data!("magic", magic == MAGIC);

        let format = BinaryFormat::from_flags(read_header(r.read_u16::<BE>())?)?;
        let rating_count = read_header(r.read_i32::<BE>())?;
        let user_count = read_header(r.read_i32::<BE>())?;
        let item_count = read_header(r.read_i32::<BE>())?;
        let section_len = read_header(r.read_i64::<BE>())?;
        verify_data!(rating_count, rating_count >= 0);
        verify_data!(user_count, user_count >= 0);
        verify_data!(item_count, item_count >= 0);

        let header = RatingHeader {
            format,
            rating_count: rating_count as usize,
            user_count: user_count as usize,
            item_count: item_count as usize,
        };
        verify_data!(
            section_len,
            u64::try_from(section_len).ok() == Some(header.rating_section_len() as u64)
        );
        Ok(header)
    }

    /// Writes the header.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if a count does not fit the header's `i32` fields.
    pub fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        let count = |name: &str, n: usize| {
            i32::try_from(n).map_err(|_| Error::invalid_arg(name, "count exceeds i32::MAX"))
        };
        w.write_all(MAGIC)?;
        w.write_u16::<BE>(self.format.flags())?;
        w.write_i32::<BE>(count("rating_count", self.rating_count)?)?;
        w.write_i32::<BE>(count("user_count", self.user_count)?)?;
        w.write_i32::<BE>(count("item_count", self.item_count)?)?;
        w.write_i64::<BE>(self.rating_section_len() as i64)?;
        Ok(())
    }

    /// Returns the encoded header.
    pub fn to_bytes(&self) -> Result<[u8; HEADER_LEN]> {
        let mut buf = [0u8; HEADER_LEN];
        self.write_to(&mut &mut buf[..])?;
        Ok(buf)
    }
}

fn read_header<T>(r: std::io::Result<T>) -> Result<T> {
    r.map_err(|e| Error::invalid_format("header", e.to_string()))
}

/// Reads a big-endian `i32` count or row index.
pub(crate) fn read_i32(r: &mut impl Read, element: &str) -> Result<i32> {
    r.read_i32::<BE>()
        .map_err(|e| Error::invalid_format(element, e.to_string()))
}

/// Reads a big-endian `i64` key.
pub(crate) fn read_i64(r: &mut impl Read, element: &str) -> Result<i64> {
    r.read_i64::<BE>()
        .map_err(|e| Error::invalid_format(element, e.to_string()))
}
