use std::{
    fs::File,
    path::{Path, PathBuf},
};

use memmap2::{Mmap, MmapOptions};
use ratepack_common::{Result, error::Error};

/// A read-only memory mapping of a whole file.
///
/// The mapping is released when the value is dropped.
pub struct MappedFile {
    mmap: Mmap,
    path: PathBuf,
}

impl MappedFile {
    /// Maps the file at `path`.
    ///
    /// With `populate`, the kernel is asked to pre-fault the whole mapping (Linux only;
    /// ignored elsewhere).
    pub fn open(path: impl AsRef<Path>, populate: bool) -> Result<MappedFile> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::file_not_found(path),
            _ => Error::io(path.display().to_string(), e),
        })?;
        let mut options = MmapOptions::new();
        if populate {
            options.populate();
        }
        // SAFETY: the mapping is read-only and rating files are never modified in place
        // once packed.
        let mmap = unsafe { options.map(&file) }
            .map_err(|e| Error::io(path.display().to_string(), e))?;
        Ok(MappedFile {
            mmap,
            path: path.to_path_buf(),
        })
    }

    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.mmap
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Debug for MappedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappedFile")
            .field("path", &self.path)
            .field("len", &self.len())
            .finish()
    }
}
