//! The MPQ encryption table

/// Number of words in the encryption table
pub const ENCRYPTION_TABLE_SIZE: usize = 0x500;

/// Build the encryption table from the fixed seed `0x00100001`.
///
/// Every base index receives five words, one per 256-word partition. Each word
/// consumes two steps of the generator `seed = (seed * 125 + 3) % 0x2AAAAB`, the
/// first supplying the high half and the second the low half.
pub const fn generate_encryption_table() -> [u32; ENCRYPTION_TABLE_SIZE] {
    let mut table = [0u32; ENCRYPTION_TABLE_SIZE];
    let mut seed: u32 = 0x0010_0001;

    let mut base = 0;
    while base < 0x100 {
        let mut index = base;
        let mut round = 0;
        while round < 5 {
            seed = (seed * 125 + 3) % 0x2A_AAAB;
            let high = (seed & 0xFFFF) << 16;
            seed = (seed * 125 + 3) % 0x2A_AAAB;
            let low = seed & 0xFFFF;

            table[index] = high | low;
            index += 0x100;
            round += 1;
        }
        base += 1;
    }

    table
}

/// The process-wide encryption table, computed at compile time
pub static ENCRYPTION_TABLE: [u32; ENCRYPTION_TABLE_SIZE] = generate_encryption_table();
