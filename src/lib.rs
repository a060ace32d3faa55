//! # kvmeta - Crash-Consistency Metadata for Mapped KV Stores
//!
//! `kvmeta` is the metadata core of a memory-mapped, append-style key-value
//! store: a fixed-size, page-resident record that tracks enough state to
//! detect corruption, support incremental persistence, and enable
//! point-in-time backup/restore of the data file without rewriting it on
//! every mutation.
//!
//! ## Quick Start
//!
//! ```ignore
//! use kvmeta::{MetaPage, MetaRecord};
//!
//! let mut page = MetaPage::create("store.meta")?;
//! let mut record = MetaRecord::new();
//!
//! // Hot path after an append: only CRC and size change.
//! record.set_crc_digest(digest);
//! record.set_actual_size(len);
//! record.write_crc_and_size_only(page.bytes_mut());
//!
//! // Recovery: read the full record back.
//! let mut recovered = MetaRecord::new();
//! recovered.read_full(page.bytes());
//! ```
//!
//! ## Architecture
//!
//! The record is a 192-byte explicit-layout struct that always fits in one
//! 4KB page, so a full rewrite is atomic at page granularity. Three write
//! profiles (full / crc-and-size / backup-only) let the owning engine trade
//! write amplification against metadata freshness; a shadow "confirmed"
//! snapshot plus the CRC lets recovery detect a selective write that never
//! fully landed.
//!
//! Everything outside the record is a collaborator, not part of this crate:
//! the append-log engine that owns the data file, the page-flushing
//! machinery, the encryption engine that produces the stored IV, and the
//! locking layer that serializes writers.
//!
//! ## Module Overview
//!
//! - [`meta`]: the record, its backup descriptor, feature flags, format
//!   versions, and the mapped metadata page

pub mod meta;

pub use meta::{
    BackupInfo, MetaPage, MetaRecord, BACKUP_MAGIC, META_RECORD_SIZE, PAGE_SIZE,
};
