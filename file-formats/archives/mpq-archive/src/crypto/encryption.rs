//! Encryption operations for MPQ tables
//!
//! Archives are never written by this crate; the cipher is kept so table
//! fixtures can be produced and the decryption path can be checked against its
//! inverse.

use super::keys::ENCRYPTION_TABLE;

/// Encrypt a block of words in place
pub fn encrypt_block(data: &mut [u32], mut key: u32) {
    let mut seed: u32 = 0xEEEE_EEEE;

    for value in data.iter_mut() {
        seed = seed.wrapping_add(ENCRYPTION_TABLE[0x400 + (key & 0xFF) as usize]);

        let ch = *value;
        *value = ch ^ key.wrapping_add(seed);

        key = (!key << 0x15).wrapping_add(0x1111_1111) | (key >> 0x0B);
        seed = ch
            .wrapping_add(seed)
            .wrapping_add(seed << 5)
            .wrapping_add(3);
    }
}

/// Encrypt a byte buffer in place; trailing partial words are left untouched
pub fn encrypt_bytes(data: &mut [u8], key: u32) {
    let mut words: Vec<u32> = data
        .chunks_exact(4)
        .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect();

    encrypt_block(&mut words, key);

    for (chunk, word) in data.chunks_exact_mut(4).zip(words) {
        chunk.copy_from_slice(&word.to_le_bytes());
    }
}
