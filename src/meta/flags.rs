//! # Feature Flags
//!
//! Named bits of the record's 64-bit flag word. Bits not defined here may
//! be defined by future versions and must be preserved when other flags
//! are toggled, so flag operations only ever touch their own bit.

/// Keys in the store may carry an expiry timestamp.
pub const FLAG_KEY_EXPIRE: u64 = 1 << 0;
