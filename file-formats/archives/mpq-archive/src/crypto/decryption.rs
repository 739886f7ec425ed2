//! Decryption operations for MPQ tables

use super::keys::ENCRYPTION_TABLE;

/// Decrypt a block of words in place
pub fn decrypt_block(data: &mut [u32], mut key: u32) {
    let mut seed: u32 = 0xEEEE_EEEE;

    for value in data.iter_mut() {
        seed = seed.wrapping_add(ENCRYPTION_TABLE[0x400 + (key & 0xFF) as usize]);

        let ch = *value ^ key.wrapping_add(seed);
        *value = ch;

        key = (!key << 0x15).wrapping_add(0x1111_1111) | (key >> 0x0B);
        seed = ch
            .wrapping_add(seed)
            .wrapping_add(seed << 5)
            .wrapping_add(3);
    }
}

/// Decrypt a byte buffer in place, reading it as little-endian words.
///
/// Only whole words are processed. Callers pass buffers whose length is a
/// multiple of four (hash and block tables are multiples of 16 bytes); any
/// trailing bytes beyond the last full word are left as they are.
pub fn decrypt_bytes(data: &mut [u8], key: u32) {
    let mut words: Vec<u32> = data
        .chunks_exact(4)
        .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect();

    decrypt_block(&mut words, key);

    for (chunk, word) in data.chunks_exact_mut(4).zip(words) {
        chunk.copy_from_slice(&word.to_le_bytes());
    }
}
