//! Packed rating files for tests.

use std::path::PathBuf;

use ratepack_store::{BinaryRatingPacker, PackOptions, Rating};
use tempfile::TempDir;

/// Packs `ratings` into `ratings.bin` inside a fresh temporary directory.
///
/// The directory (and the file) is removed when the returned [`TempDir`] is dropped.
pub fn pack_to_temp(
    ratings: &[Rating],
    options: PackOptions,
) -> anyhow::Result<(TempDir, PathBuf)> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("ratings.bin");
    let mut packer = BinaryRatingPacker::create(&path, options)?;
    packer.add_all(ratings)?;
    packer.finish()?;
    Ok((dir, path))
}

/// Packs `ratings` and returns the file contents.
pub fn pack_to_bytes(ratings: &[Rating], options: PackOptions) -> anyhow::Result<Vec<u8>> {
    let (_dir, path) = pack_to_temp(ratings, options)?;
    Ok(std::fs::read(path)?)
}

/// Writes arbitrary bytes to `ratings.bin` inside a fresh temporary directory.
pub fn write_temp(bytes: &[u8]) -> anyhow::Result<(TempDir, PathBuf)> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("ratings.bin");
    std::fs::write(&path, bytes)?;
    Ok((dir, path))
}

/// Three ratings: user 1 rates items 2 and 3, user 2 rates item 2.
///
/// Timestamps are out of file order: `100`, `300`, `200`.
pub fn three_ratings() -> Vec<Rating> {
    vec![
        Rating::new(1, 2, 3.5).with_timestamp(100),
        Rating::new(1, 3, 4.0).with_timestamp(300),
        Rating::new(2, 2, 3.0).with_timestamp(200),
    ]
}
