//! # Mapped Metadata Page
//!
//! `MetaPage` owns the one-page file the metadata record is persisted
//! into, mapped read-write into the process address space. The record's
//! `write_*`/`read_full` primitives take the page's byte slice as their
//! target, so an update to the record is a plain memory copy and the OS
//! page cache carries it to disk (or [`MetaPage::sync`] forces it).
//!
//! The page never grows, so unlike a data-file mapping there is no remap
//! hazard: the slice returned by [`MetaPage::bytes_mut`] stays valid for
//! the borrow's lifetime under ordinary borrow rules.
//!
//! ## Error Handling
//!
//! All fallible operations return `eyre::Result` with the file path and
//! the operation being performed in the error context.

use std::fs::OpenOptions;
use std::path::Path;

use eyre::{ensure, Result, WrapErr};
use memmap2::MmapMut;

use super::PAGE_SIZE;

#[derive(Debug)]
pub struct MetaPage {
    mmap: MmapMut,
}

impl MetaPage {
    /// Creates (or truncates) a metadata file of exactly one page,
    /// zero-filled, and maps it read-write.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .wrap_err_with(|| format!("failed to create metadata file '{}'", path.display()))?;

        file.set_len(PAGE_SIZE as u64)
            .wrap_err_with(|| format!("failed to size metadata file to {} bytes", PAGE_SIZE))?;

        // SAFETY: MmapMut::map_mut is unsafe because memory-mapped files can
        // be modified externally, leading to undefined behavior. This is safe
        // because:
        // 1. We just created this file with exclusive access (truncate=true)
        // 2. The file size is exactly PAGE_SIZE before mapping
        // 3. The mmap lifetime is tied to MetaPage, preventing use-after-unmap
        // 4. The page never grows, so the mapping is never invalidated
        let mmap = unsafe {
            MmapMut::map_mut(&file)
                .wrap_err_with(|| format!("failed to memory-map '{}'", path.display()))?
        };

        Ok(Self { mmap })
    }

    /// Opens an existing metadata file and maps it read-write.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .wrap_err_with(|| format!("failed to open metadata file '{}'", path.display()))?;

        let metadata = file
            .metadata()
            .wrap_err_with(|| format!("failed to get metadata for '{}'", path.display()))?;

        ensure!(
            metadata.len() == PAGE_SIZE as u64,
            "metadata file '{}' size {} is not one page ({})",
            path.display(),
            metadata.len(),
            PAGE_SIZE
        );

        // SAFETY: MmapMut::map_mut is unsafe because memory-mapped files can
        // be modified externally. This is safe because:
        // 1. The file is opened read+write; external writers are excluded by
        //    the caller's file-locking discipline
        // 2. The file size was verified to be exactly PAGE_SIZE
        // 3. The mmap lifetime is tied to MetaPage, preventing use-after-unmap
        let mmap = unsafe {
            MmapMut::map_mut(&file)
                .wrap_err_with(|| format!("failed to memory-map '{}'", path.display()))?
        };

        Ok(Self { mmap })
    }

    /// The whole page, zero-copy.
    pub fn bytes(&self) -> &[u8] {
        &self.mmap[..]
    }

    /// The whole page, writable. Pass this to the record's `write_*`
    /// primitives.
    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.mmap[..]
    }

    /// Flushes the page to disk.
    pub fn sync(&self) -> Result<()> {
        self.mmap.flush().wrap_err("failed to sync metadata page to disk")
    }
}
