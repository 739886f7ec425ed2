//! The MPQ string hash

use super::keys::ENCRYPTION_TABLE;
use super::types::hash_type;

/// Hash a file name with one of the [`hash_type`] variants.
///
/// Bytes are folded in after ASCII uppercasing, so lookups are case
/// insensitive. Path separators are hashed as given: `\` and `/` produce
/// different results.
///
/// `hash_type` must be below 5; the encryption table has no rows past that.
pub fn hash_string(filename: &str, hash_type: u32) -> u32 {
    debug_assert!(hash_type < 5, "hash type {hash_type} out of range");
    let mut seed1: u32 = 0x7FED_7FED;
    let mut seed2: u32 = 0xEEEE_EEEE;

    for &byte in filename.as_bytes() {
        let ch = u32::from(byte.to_ascii_uppercase());

        let table_idx = ((hash_type << 8) + ch) as usize;
        seed1 = ENCRYPTION_TABLE[table_idx] ^ seed1.wrapping_add(seed2);
        seed2 = ch
            .wrapping_add(seed1)
            .wrapping_add(seed2)
            .wrapping_add(seed2 << 5)
            .wrapping_add(3);
    }

    seed1
}

/// Decryption key for an internal table such as `"(hash table)"`
pub fn table_key(name: &str) -> u32 {
    hash_string(name, hash_type::FILE_KEY)
}
