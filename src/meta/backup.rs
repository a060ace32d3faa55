//! # Backup Descriptor
//!
//! Bookkeeping for an embedded point-in-time backup segment inside the data
//! file. The descriptor is embedded in [`MetaRecord`](super::MetaRecord) and
//! has no independent lifecycle; backup/restore orchestration updates it via
//! `write_backup_info_only` without disturbing the rest of the record.

use zerocopy::little_endian::U32;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

/// Sentinel marking the descriptor as valid ("MMKV" in ASCII).
pub const BACKUP_MAGIC: u32 = 0x4D4D_4B56;

pub const BACKUP_INFO_SIZE: usize = 16;

/// Describes an embedded backup segment: where it starts, how long it is,
/// and the CRC the whole file must have after restoring from it.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct BackupInfo {
    magic: U32,
    restore_point: U32,
    backup_data_size: U32,
    restored_file_crc: U32,
}

const _: () = assert!(std::mem::size_of::<BackupInfo>() == BACKUP_INFO_SIZE);

impl BackupInfo {
    /// Whether a valid, non-empty backup is currently described. Both
    /// conditions are required: a stale magic with zero size is absent.
    pub fn has_data(&self) -> bool {
        self.magic.get() == BACKUP_MAGIC && self.backup_data_size.get() > 0
    }

    /// Zeroes every field, returning the descriptor to the "no backup"
    /// state. Used when a backup is consumed or invalidated.
    pub fn clear_data(&mut self) {
        *self = Self::default();
    }

    /// Marks the descriptor valid and records where the backup payload
    /// lives and what file CRC a restore from it must produce.
    pub fn update(&mut self, restore_point: u32, backup_data_size: u32, restored_file_crc: u32) {
        self.magic = U32::new(BACKUP_MAGIC);
        self.restore_point = U32::new(restore_point);
        self.backup_data_size = U32::new(backup_data_size);
        self.restored_file_crc = U32::new(restored_file_crc);
    }

    pub fn magic(&self) -> u32 {
        self.magic.get()
    }

    /// Byte offset within the data file where the backup payload begins.
    pub fn restore_point(&self) -> u32 {
        self.restore_point.get()
    }

    pub fn backup_data_size(&self) -> u32 {
        self.backup_data_size.get()
    }

    /// CRC the complete file is expected to have after a restore.
    pub fn restored_file_crc(&self) -> u32 {
        self.restored_file_crc.get()
    }
}

impl Default for BackupInfo {
    fn default() -> Self {
        Self {
            magic: U32::ZERO,
            restore_point: U32::ZERO,
            backup_data_size: U32::ZERO,
            restored_file_crc: U32::ZERO,
        }
    }
}
