//! Shared table reading

use super::TABLE_ENTRY_SIZE;
use crate::crypto::{decrypt_bytes, table_key};
use crate::{Error, Result};
use std::io::{Read, Seek, SeekFrom};

/// Read `entries` records at `offset` and decrypt them with the key for `name`.
///
/// The declared size is checked against `source_len` before any allocation, so
/// a corrupt entry count cannot request an absurd buffer.
pub(super) fn read_encrypted_table<R: Read + Seek>(
    reader: &mut R,
    offset: u64,
    entries: u32,
    source_len: u64,
    name: &str,
) -> Result<Vec<u8>> {
    let byte_size = u64::from(entries) * TABLE_ENTRY_SIZE as u64;
    let end = offset
        .checked_add(byte_size)
        .ok_or_else(|| Error::corrupt(format!("{name} offset overflows")))?;
    if end > source_len {
        return Err(Error::corrupt(format!(
            "{name} ends at 0x{end:X}, past end of archive (0x{source_len:X})"
        )));
    }

    reader.seek(SeekFrom::Start(offset))?;
    let mut raw_data = vec![0u8; byte_size as usize];
    reader
        .read_exact(&mut raw_data)
        .map_err(|e| Error::from_read(e, name))?;

    decrypt_table_data(&mut raw_data, name);
    Ok(raw_data)
}

/// Decrypt raw table bytes in place
pub(super) fn decrypt_table_data(data: &mut [u8], name: &str) {
    let key = table_key(name);
    log::debug!("Decrypting {name} ({} bytes) with key 0x{key:08X}", data.len());
    decrypt_bytes(data, key);
}
