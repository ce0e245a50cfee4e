use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufWriter, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
};

use ratepack_common::{Result, error::Error, verify_arg};

use crate::{
    BinaryFormat, PackOptions, Rating, RatingHeader, format::HEADER_LEN, index_table::write_table,
};

/// Writes ratings into a packed rating file readable by
/// [`BinaryRatingStore`](crate::BinaryRatingStore).
///
/// Rows are written in the order they are added. The index tables are accumulated in
/// memory and written by [`BinaryRatingPacker::finish`], which also fills in the header.
/// A packer dropped without finishing leaves an incomplete file behind. Once a row write
/// fails the packer refuses further rows and `finish` fails too.
pub struct BinaryRatingPacker {
    path: PathBuf,
    format: BinaryFormat,
    writer: BufWriter<File>,
    users: BTreeMap<i64, Vec<u32>>,
    items: BTreeMap<i64, Vec<u32>>,
    count: usize,
    failed: bool,
}

/// What a finished packer wrote.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackSummary {
    pub path: PathBuf,
    pub header: RatingHeader,
    pub file_len: u64,
}

impl BinaryRatingPacker {
    /// Creates (or truncates) the file at `path`.
    pub fn create(path: impl AsRef<Path>, options: PackOptions) -> Result<BinaryRatingPacker> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| Error::io(path.display().to_string(), e))?;
        let mut writer = BufWriter::new(file);
        writer.write_all(&[0u8; HEADER_LEN])?;
        Ok(BinaryRatingPacker {
            path: path.to_path_buf(),
            format: BinaryFormat::new(options.timestamps),
            writer,
            users: BTreeMap::new(),
            items: BTreeMap::new(),
            count: 0,
            failed: false,
        })
    }

    pub fn format(&self) -> BinaryFormat {
        self.format
    }

    /// Returns the number of ratings added so far.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Appends one rating.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the file stores timestamps and the rating has none, or
    /// if the file already holds `i32::MAX` ratings. Returns `InvalidOperation` if an
    /// earlier write failed.
    pub fn add(&mut self, rating: &Rating) -> Result<()> {
        if self.failed {
            return Err(Error::invalid_operation("add after a failed write"));
        }
        verify_arg!(
            rating,
            rating.timestamp.is_some() || !self.format.has_timestamps()
        );
        verify_arg!(rating_count, self.count < i32::MAX as usize);

        // A partly written row leaves the file out of step with the tables.
        if let Err(e) = self.format.write_row(&mut self.writer, rating) {
            self.failed = true;
            return Err(e);
        }
        let row = self.count as u32;
        self.users.entry(rating.user).or_default().push(row);
        self.items.entry(rating.item).or_default().push(row);
        self.count += 1;
        Ok(())
    }

    /// Appends every rating of `ratings`.
    pub fn add_all<'a>(&mut self, ratings: impl IntoIterator<Item = &'a Rating>) -> Result<()> {
        for rating in ratings {
            self.add(rating)?;
        }
        Ok(())
    }

    /// Writes the index tables and the header, and syncs the file to disk.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperation` if an earlier row write failed, and `Io` on write errors.
    pub fn finish(mut self) -> Result<PackSummary> {
        if self.failed {
            return Err(Error::invalid_operation("finish after a failed write"));
        }
        let header = RatingHeader {
            format: self.format,
            rating_count: self.count,
            user_count: self.users.len(),
            item_count: self.items.len(),
        };
        let context = self.path.display().to_string();

        write_table(&mut self.writer, &self.users)?;
        write_table(&mut self.writer, &self.items)?;
        let mut file = self
            .writer
            .into_inner()
            .map_err(|e| Error::io(context.clone(), e.into_error()))?;
        file.seek(SeekFrom::Start(0))
            .map_err(|e| Error::io(context.clone(), e))?;
        header.write_to(&mut file)?;
        file.sync_all().map_err(|e| Error::io(context.clone(), e))?;
        let file_len = file
            .metadata()
            .map_err(|e| Error::io(context, e))?
            .len();

        log::info!(
            "packed {} ratings ({} users, {} items) into {}",
            header.rating_count,
            header.user_count,
            header.item_count,
            self.path.display()
        );
        Ok(PackSummary {
            path: self.path,
            header,
            file_len,
        })
    }
}

impl std::fmt::Debug for BinaryRatingPacker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BinaryRatingPacker")
            .field("path", &self.path)
            .field("format", &self.format)
            .field("count", &self.count)
            .field("failed", &self.failed)
            .finish()
    }
}
