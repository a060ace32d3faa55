//! # Metadata Record Layout and Persistence Primitives
//!
//! `MetaRecord` is the authoritative in-memory copy of the metadata page.
//! The owning storage engine mutates it as data is appended, compacted or
//! re-encrypted, then synchronizes either the whole record or a named
//! subset of it to the mapped page.
//!
//! ## Wire Layout
//!
//! The record is exactly 192 bytes, all integers little-endian, no implicit
//! padding. The byte offsets below are the on-page contract and are
//! enforced at compile time:
//!
//! ```text
//! offset  field                       size
//! 0       crc_digest                  4
//! 4       version                     4
//! 8       sequence                    4
//! 12      vector (IV)                 16
//! 28      actual_size                 4
//! 32      confirmed.last_actual_size  4
//! 36      confirmed.last_crc_digest   4
//! 40      confirmed.reserved[16]      64
//! 104     flags                       8
//! 112     backup (BackupInfo)         16
//! 128     reserved[16]                64
//! ```
//!
//! ## Preconditions
//!
//! Every persistence primitive requires a buffer of at least
//! [`META_RECORD_SIZE`] bytes. A shorter buffer is a caller bug, not a
//! runtime condition, and panics rather than silently no-opping; retries
//! belong to the caller's I/O layer, not here.

use zerocopy::little_endian::{U32, U64};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use super::version::VERSION_SEQUENCE;
use super::{BackupInfo, BACKUP_INFO_SIZE, PAGE_SIZE};

/// Length of the stored encryption initialization vector.
pub const IV_LEN: usize = 16;

/// Serialized size of [`MetaRecord`].
pub const META_RECORD_SIZE: usize = 192;

/// Byte offset of `crc_digest` within the record.
pub const CRC_DIGEST_OFFSET: usize = 0;

/// Byte offset of `actual_size` within the record.
pub const ACTUAL_SIZE_OFFSET: usize = 28;

/// Byte offset of the embedded [`BackupInfo`] within the record.
pub const BACKUP_INFO_OFFSET: usize = 112;

/// Shadow snapshot of the last size/CRC pair known to be durably synced.
///
/// After an unclean shutdown a reader compares these against the live
/// `crc_digest`/`actual_size` and a freshly computed digest to decide
/// whether the last selective write fully landed. This crate only stores
/// the pair; the comparison is the caller's.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct ConfirmedState {
    last_actual_size: U32,
    last_crc_digest: U32,
    reserved: [U32; 16],
}

impl ConfirmedState {
    pub fn last_actual_size(&self) -> u32 {
        self.last_actual_size.get()
    }

    pub fn last_crc_digest(&self) -> u32 {
        self.last_crc_digest.get()
    }
}

/// The page-resident crash-consistency record for one data file.
///
/// Exclusively owned by the calling storage engine; one instance per data
/// file, created when the file is first initialized and destroyed only
/// when the file is deleted.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct MetaRecord {
    crc_digest: U32,
    version: U32,
    sequence: U32,
    vector: [u8; IV_LEN],
    actual_size: U32,
    confirmed: ConfirmedState,
    flags: U64,
    backup: BackupInfo,
    reserved: [U32; 16],
}

// The wire contract: fixed size, fixed offsets, and the whole record must
// fit in one page so a full write never straddles a page boundary.
const _: () = assert!(std::mem::size_of::<MetaRecord>() == META_RECORD_SIZE);
const _: () = assert!(std::mem::size_of::<MetaRecord>() <= PAGE_SIZE);
const _: () = assert!(std::mem::offset_of!(MetaRecord, crc_digest) == CRC_DIGEST_OFFSET);
const _: () = assert!(std::mem::offset_of!(MetaRecord, version) == 4);
const _: () = assert!(std::mem::offset_of!(MetaRecord, sequence) == 8);
const _: () = assert!(std::mem::offset_of!(MetaRecord, vector) == 12);
const _: () = assert!(std::mem::offset_of!(MetaRecord, actual_size) == ACTUAL_SIZE_OFFSET);
const _: () = assert!(std::mem::offset_of!(MetaRecord, confirmed) == 32);
const _: () = assert!(std::mem::offset_of!(MetaRecord, flags) == 104);
const _: () = assert!(std::mem::offset_of!(MetaRecord, backup) == BACKUP_INFO_OFFSET);
const _: () = assert!(std::mem::offset_of!(MetaRecord, reserved) == 128);

impl MetaRecord {
    /// A record for a freshly initialized data file: everything zero except
    /// the version tag, which defaults to the version that introduced
    /// write-back counting.
    pub fn new() -> Self {
        Self {
            crc_digest: U32::ZERO,
            version: U32::new(VERSION_SEQUENCE),
            sequence: U32::ZERO,
            vector: [0u8; IV_LEN],
            actual_size: U32::ZERO,
            confirmed: ConfirmedState {
                last_actual_size: U32::ZERO,
                last_crc_digest: U32::ZERO,
                reserved: [U32::ZERO; 16],
            },
            flags: U64::ZERO,
            backup: BackupInfo::default(),
            reserved: [U32::ZERO; 16],
        }
    }

    /// Copies the entire record, byte for byte, into `target`. A single
    /// bulk copy with no partial-failure mode.
    ///
    /// # Panics
    ///
    /// Panics if `target` is shorter than [`META_RECORD_SIZE`].
    pub fn write_full(&self, target: &mut [u8]) {
        assert!(
            target.len() >= META_RECORD_SIZE,
            "metadata target buffer too small: {} < {}",
            target.len(),
            META_RECORD_SIZE
        );

        target[..META_RECORD_SIZE].copy_from_slice(self.as_bytes());
    }

    /// Copies only `crc_digest` and `actual_size` into their offsets in
    /// `target`, leaving every other byte untouched.
    ///
    /// These two fields change on nearly every append; limiting the write
    /// to them avoids dirtying unrelated cache lines and reduces flush
    /// cost on the hot path. The price is that after a crash the target
    /// may be ahead of the rest of the record; the caller reconciles via
    /// the confirmed snapshot and CRC verification.
    ///
    /// # Panics
    ///
    /// Panics if `target` is shorter than [`META_RECORD_SIZE`].
    pub fn write_crc_and_size_only(&self, target: &mut [u8]) {
        assert!(
            target.len() >= META_RECORD_SIZE,
            "metadata target buffer too small: {} < {}",
            target.len(),
            META_RECORD_SIZE
        );

        target[CRC_DIGEST_OFFSET..CRC_DIGEST_OFFSET + 4]
            .copy_from_slice(self.crc_digest.as_bytes());
        target[ACTUAL_SIZE_OFFSET..ACTUAL_SIZE_OFFSET + 4]
            .copy_from_slice(self.actual_size.as_bytes());
    }

    /// Copies only the embedded [`BackupInfo`] into `target`, leaving all
    /// other fields untouched. Used when backup bookkeeping changes
    /// independently of normal data writes.
    ///
    /// # Panics
    ///
    /// Panics if `target` is shorter than [`META_RECORD_SIZE`].
    pub fn write_backup_info_only(&self, target: &mut [u8]) {
        assert!(
            target.len() >= META_RECORD_SIZE,
            "metadata target buffer too small: {} < {}",
            target.len(),
            META_RECORD_SIZE
        );

        target[BACKUP_INFO_OFFSET..BACKUP_INFO_OFFSET + BACKUP_INFO_SIZE]
            .copy_from_slice(self.backup.as_bytes());
    }

    /// Overwrites the entire in-memory record from `source`. The only read
    /// primitive: partial reads are never needed, a reader always wants
    /// the latest full state.
    ///
    /// # Panics
    ///
    /// Panics if `source` is shorter than [`META_RECORD_SIZE`].
    pub fn read_full(&mut self, source: &[u8]) {
        assert!(
            source.len() >= META_RECORD_SIZE,
            "metadata source buffer too small: {} < {}",
            source.len(),
            META_RECORD_SIZE
        );

        self.as_mut_bytes().copy_from_slice(&source[..META_RECORD_SIZE]);
    }

    pub fn crc_digest(&self) -> u32 {
        self.crc_digest.get()
    }

    pub fn set_crc_digest(&mut self, digest: u32) {
        self.crc_digest = U32::new(digest);
    }

    pub fn version(&self) -> u32 {
        self.version.get()
    }

    pub fn set_version(&mut self, version: u32) {
        self.version = U32::new(version);
    }

    /// Count of full write-back operations ever performed on the data file.
    pub fn sequence(&self) -> u32 {
        self.sequence.get()
    }

    /// Records one more full write-back of the data file.
    pub fn bump_sequence(&mut self) {
        self.sequence = U32::new(self.sequence.get().wrapping_add(1));
    }

    /// The encryption IV for the current content; opaque to this crate.
    pub fn vector(&self) -> &[u8; IV_LEN] {
        &self.vector
    }

    pub fn set_vector(&mut self, vector: [u8; IV_LEN]) {
        self.vector = vector;
    }

    /// Logical size of valid data within the file, distinct from the
    /// file's physical size.
    pub fn actual_size(&self) -> u32 {
        self.actual_size.get()
    }

    pub fn set_actual_size(&mut self, size: u32) {
        self.actual_size = U32::new(size);
    }

    pub fn confirmed(&self) -> &ConfirmedState {
        &self.confirmed
    }

    /// Records a size/CRC pair as the last state known to be durably
    /// persisted. Called by the engine after a successful sync of the data
    /// file, before the next selective metadata write.
    pub fn confirm(&mut self, actual_size: u32, crc_digest: u32) {
        self.confirmed.last_actual_size = U32::new(actual_size);
        self.confirmed.last_crc_digest = U32::new(crc_digest);
    }

    pub fn flags(&self) -> u64 {
        self.flags.get()
    }

    pub fn has_flag(&self, flag: u64) -> bool {
        self.flags.get() & flag != 0
    }

    /// Sets a single flag bit. Undefined bits are preserved; future
    /// versions may give them meaning.
    pub fn set_flag(&mut self, flag: u64) {
        self.flags = U64::new(self.flags.get() | flag);
    }

    pub fn unset_flag(&mut self, flag: u64) {
        self.flags = U64::new(self.flags.get() & !flag);
    }

    pub fn backup(&self) -> &BackupInfo {
        &self.backup
    }

    pub fn backup_mut(&mut self) -> &mut BackupInfo {
        &mut self.backup
    }
}

impl Default for MetaRecord {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::flags::FLAG_KEY_EXPIRE;
    use crate::meta::BACKUP_MAGIC;

    fn sample_record() -> MetaRecord {
        let mut record = MetaRecord::new();
        record.set_crc_digest(0xCAFE_F00D);
        record.set_actual_size(8192);
        record.bump_sequence();
        record.set_vector([0xA5; IV_LEN]);
        record.confirm(4096, 0x1234_5678);
        record.set_flag(FLAG_KEY_EXPIRE);
        record.backup_mut().update(100, 50, 0xDEAD_BEEF);
        record
    }

    #[test]
    fn record_size_is_192() {
        assert_eq!(std::mem::size_of::<MetaRecord>(), META_RECORD_SIZE);
    }

    #[test]
    fn new_record_defaults_to_sequence_version() {
        let record = MetaRecord::new();

        assert_eq!(record.version(), VERSION_SEQUENCE);
        assert_eq!(record.crc_digest(), 0);
        assert_eq!(record.sequence(), 0);
        assert_eq!(record.actual_size(), 0);
        assert_eq!(record.flags(), 0);
        assert!(!record.backup().has_data());
    }

    #[test]
    fn write_then_read_round_trips() {
        let record = sample_record();

        let mut page = [0u8; META_RECORD_SIZE];
        record.write_full(&mut page);

        let mut read_back = MetaRecord::new();
        read_back.read_full(&page);

        assert_eq!(read_back, record);
        assert_eq!(read_back.as_bytes(), record.as_bytes());
    }

    #[test]
    fn crc_and_size_write_touches_only_its_offsets() {
        let record = sample_record();

        let mut page = [0xEEu8; META_RECORD_SIZE];
        record.write_crc_and_size_only(&mut page);

        assert_eq!(&page[0..4], 0xCAFE_F00Du32.to_le_bytes());
        assert_eq!(&page[28..32], 8192u32.to_le_bytes());
        for (offset, byte) in page.iter().enumerate() {
            if (0..4).contains(&offset) || (28..32).contains(&offset) {
                continue;
            }
            assert_eq!(*byte, 0xEE, "byte at offset {} was modified", offset);
        }
    }

    #[test]
    fn backup_write_touches_only_its_range() {
        let record = sample_record();

        let mut page = [0xEEu8; META_RECORD_SIZE];
        record.write_backup_info_only(&mut page);

        assert_eq!(&page[112..116], BACKUP_MAGIC.to_le_bytes());
        assert_eq!(&page[116..120], 100u32.to_le_bytes());
        assert_eq!(&page[120..124], 50u32.to_le_bytes());
        assert_eq!(&page[124..128], 0xDEAD_BEEFu32.to_le_bytes());
        for (offset, byte) in page.iter().enumerate() {
            if (112..128).contains(&offset) {
                continue;
            }
            assert_eq!(*byte, 0xEE, "byte at offset {} was modified", offset);
        }
    }

    #[test]
    fn full_write_serializes_documented_offsets() {
        let record = sample_record();

        let mut page = [0u8; META_RECORD_SIZE];
        record.write_full(&mut page);

        assert_eq!(&page[0..4], 0xCAFE_F00Du32.to_le_bytes());
        assert_eq!(&page[4..8], VERSION_SEQUENCE.to_le_bytes());
        assert_eq!(&page[8..12], 1u32.to_le_bytes());
        assert_eq!(&page[12..28], [0xA5; IV_LEN]);
        assert_eq!(&page[28..32], 8192u32.to_le_bytes());
        assert_eq!(&page[32..36], 4096u32.to_le_bytes());
        assert_eq!(&page[36..40], 0x1234_5678u32.to_le_bytes());
        assert_eq!(&page[104..112], FLAG_KEY_EXPIRE.to_le_bytes());
        assert_eq!(&page[112..116], BACKUP_MAGIC.to_le_bytes());
        assert_eq!(&page[128..192], [0u8; 64]);
    }

    #[test]
    fn flag_operations_are_isolated() {
        const OTHER_FLAG: u64 = 1 << 7;

        let mut record = MetaRecord::new();

        record.set_flag(FLAG_KEY_EXPIRE);
        assert!(record.has_flag(FLAG_KEY_EXPIRE));
        assert!(!record.has_flag(OTHER_FLAG));

        record.set_flag(OTHER_FLAG);
        assert!(record.has_flag(FLAG_KEY_EXPIRE));
        assert!(record.has_flag(OTHER_FLAG));

        record.unset_flag(FLAG_KEY_EXPIRE);
        assert!(!record.has_flag(FLAG_KEY_EXPIRE));
        assert!(record.has_flag(OTHER_FLAG));
    }

    #[test]
    fn reserved_flag_bits_survive_toggles() {
        let mut record = MetaRecord::new();
        record.set_flag(1 << 63);

        record.set_flag(FLAG_KEY_EXPIRE);
        record.unset_flag(FLAG_KEY_EXPIRE);

        assert!(record.has_flag(1 << 63));
    }

    #[test]
    fn confirm_records_the_durable_pair() {
        let mut record = MetaRecord::new();
        record.set_actual_size(1000);
        record.set_crc_digest(0xABCD);

        record.confirm(record.actual_size(), record.crc_digest());

        assert_eq!(record.confirmed().last_actual_size(), 1000);
        assert_eq!(record.confirmed().last_crc_digest(), 0xABCD);
    }

    #[test]
    fn sequence_counts_full_write_backs() {
        let mut record = MetaRecord::new();

        record.bump_sequence();
        record.bump_sequence();

        assert_eq!(record.sequence(), 2);
    }

    #[test]
    #[should_panic(expected = "metadata target buffer too small")]
    fn write_full_rejects_short_buffer() {
        let record = MetaRecord::new();
        let mut short = [0u8; META_RECORD_SIZE - 1];
        record.write_full(&mut short);
    }

    #[test]
    #[should_panic(expected = "metadata target buffer too small")]
    fn selective_write_rejects_short_buffer() {
        let record = MetaRecord::new();
        let mut short = [0u8; 32];
        record.write_crc_and_size_only(&mut short);
    }

    #[test]
    #[should_panic(expected = "metadata source buffer too small")]
    fn read_full_rejects_short_buffer() {
        let mut record = MetaRecord::new();
        let short = [0u8; META_RECORD_SIZE - 1];
        record.read_full(&short);
    }

    #[test]
    fn write_accepts_page_sized_buffer() {
        let record = sample_record();

        let mut page = vec![0u8; PAGE_SIZE];
        record.write_full(&mut page);

        let mut read_back = MetaRecord::new();
        read_back.read_full(&page);

        assert_eq!(read_back, record);
    }
}
