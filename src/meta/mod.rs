//! # Metadata Page Module
//!
//! This module implements the crash-consistency metadata record that is kept
//! alongside an append-style, memory-mapped key-value data file. The record
//! lives in a dedicated one-page file; because it never straddles a page
//! boundary, a full rewrite of the record is atomic with respect to the
//! storage medium's page granularity.
//!
//! ## What the record tracks
//!
//! - **Integrity**: a CRC digest and the logical size of valid data, so a
//!   reader can detect corruption or truncation of the data file.
//! - **Format version**: lets newer code interpret records written by older
//!   code (versions are strictly additive, see [`version`]).
//! - **Write-back sequence**: how many full rewrites the data file has ever
//!   had, used to disambiguate consistency state after recovery.
//! - **Encryption IV**: the 16-byte initialization vector for the current
//!   content; opaque to this crate.
//! - **Confirmed snapshot**: a shadow copy of the last size/CRC pair known
//!   to be durably synced, so recovery can tell "latest intended state"
//!   from "last guaranteed-persisted state" after an unclean shutdown.
//! - **Backup descriptor**: offset/size/CRC of an embedded point-in-time
//!   backup segment, plus a validity magic.
//!
//! ## Selective writes
//!
//! `crc_digest` and `actual_size` change on nearly every append. Writing the
//! whole 192-byte record each time would dirty unrelated cache lines and
//! inflate flush cost, so the record exposes three write profiles:
//!
//! | primitive                   | bytes touched in the target        |
//! |-----------------------------|------------------------------------|
//! | `write_full`                | the whole record                   |
//! | `write_crc_and_size_only`   | offsets 0..4 and 28..32            |
//! | `write_backup_info_only`    | offsets 112..128                   |
//!
//! There is no selective reader: a reader always wants the latest full
//! state, so `read_full` is the only way back in.
//!
//! ## Ordering and locking are the caller's choice
//!
//! This module performs no locking and does not decide whether metadata is
//! written before or after the data it describes. Write-ahead vs
//! write-behind is safety-critical for crash consistency and must be an
//! explicit choice of the owning storage engine, as must the lock (file
//! lock, mutex, or single-writer discipline) that makes each `write_*` /
//! `read_full` call atomic with respect to other writers. Overlapping
//! selective writes from concurrent writers are not defended against here.

mod backup;
mod page;
mod record;

pub mod flags;
pub mod version;

pub use backup::{BackupInfo, BACKUP_INFO_SIZE, BACKUP_MAGIC};
pub use page::MetaPage;
pub use record::{
    MetaRecord, ACTUAL_SIZE_OFFSET, BACKUP_INFO_OFFSET, CRC_DIGEST_OFFSET, IV_LEN,
    META_RECORD_SIZE,
};

/// Size of the mapped metadata page. The record must fit in one page so a
/// full write never straddles a page boundary.
pub const PAGE_SIZE: usize = 4096;
