//! Cryptographic types and constants

/// Hash types for MPQ operations
///
/// Each value selects a 256-word partition of the encryption table, so the same
/// name yields independent hashes per type.
pub mod hash_type {
    /// Hash for table offset calculation
    pub const TABLE_OFFSET: u32 = 0;
    /// First part of filename hash
    pub const NAME_A: u32 = 1;
    /// Second part of filename hash
    pub const NAME_B: u32 = 2;
    /// Table and file encryption key generation
    pub const FILE_KEY: u32 = 3;
}
