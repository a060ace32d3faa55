//! # Record Format Versions
//!
//! Each version is strictly additive: a reader at a higher version must
//! still interpret correctly every field that existed at a lower version.
//! The version tag only ever increases over the lifetime of a data file.

/// Original layout with no write-back counting.
pub const VERSION_DEFAULT: u32 = 0;

/// Records the full write-back count in `sequence`.
pub const VERSION_SEQUENCE: u32 = 1;

/// Stores a random per-write IV for encryption.
pub const VERSION_RANDOM_IV: u32 = 2;

/// Stores the actual size together with the CRC digest to reduce the blast
/// radius of file corruption.
pub const VERSION_ACTUAL_SIZE: u32 = 3;

/// Adds the feature-flag bitset.
pub const VERSION_FLAGS: u32 = 4;

/// Reserved for the next format revision.
pub const VERSION_NEXT: u32 = 5;

/// Always larger than any defined version; placeholder for range checks.
pub const VERSION_HOLDER: u32 = VERSION_NEXT + 1;

/// Whether `version` names a format this build knows how to interpret.
pub fn is_known_version(version: u32) -> bool {
    version < VERSION_HOLDER
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versions_are_strictly_ordered() {
        assert!(VERSION_DEFAULT < VERSION_SEQUENCE);
        assert!(VERSION_SEQUENCE < VERSION_RANDOM_IV);
        assert!(VERSION_RANDOM_IV < VERSION_ACTUAL_SIZE);
        assert!(VERSION_ACTUAL_SIZE < VERSION_FLAGS);
        assert!(VERSION_FLAGS < VERSION_NEXT);
        assert!(VERSION_NEXT < VERSION_HOLDER);
    }

    #[test]
    fn known_version_range() {
        assert!(is_known_version(VERSION_DEFAULT));
        assert!(is_known_version(VERSION_NEXT));
        assert!(!is_known_version(VERSION_HOLDER));
        assert!(!is_known_version(u32::MAX));
    }
}
