//! Block table implementation for MPQ archives
//!
//! Each record is 16 bytes: file position, archived size, file size and
//! flags, all little-endian `u32` values in that order. The file position is
//! relative to the MPQ header.

use super::TABLE_ENTRY_SIZE;
use super::common::{decrypt_table_data, read_encrypted_table};
use crate::{Error, Result};
use byteorder::{ByteOrder, LittleEndian};
use std::io::{Read, Seek};

/// Block table entry (16 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlockEntry {
    /// Offset of the beginning of the file data, relative to the beginning of the archive
    pub file_pos: u32,
    /// Compressed file size
    pub compressed_size: u32,
    /// Size of uncompressed file
    pub file_size: u32,
    /// Flags for the file
    pub flags: u32,
}

impl BlockEntry {
    /// File is compressed using PKWARE Data compression library
    pub const FLAG_IMPLODE: u32 = 0x0000_0100;
    /// File is compressed using one or more compression methods
    pub const FLAG_COMPRESS: u32 = 0x0000_0200;
    /// File is encrypted
    pub const FLAG_ENCRYPTED: u32 = 0x0001_0000;
    /// The decryption key for the file is adjusted by the block position
    pub const FLAG_FIX_KEY: u32 = 0x0002_0000;
    /// File is stored as a single unit, not split into sectors
    pub const FLAG_SINGLE_UNIT: u32 = 0x0100_0000;
    /// File is a deletion marker
    pub const FLAG_DELETE_MARKER: u32 = 0x0200_0000;
    /// File has checksums for each sector
    pub const FLAG_SECTOR_CRC: u32 = 0x0400_0000;
    /// File exists in the archive
    pub const FLAG_EXISTS: u32 = 0x8000_0000;

    /// Flag names in display order
    pub const FLAG_NAMES: [(u32, &'static str); 8] = [
        (Self::FLAG_IMPLODE, "IMPLODE"),
        (Self::FLAG_COMPRESS, "COMPRESS"),
        (Self::FLAG_ENCRYPTED, "ENCRYPTED"),
        (Self::FLAG_FIX_KEY, "FIX_KEY"),
        (Self::FLAG_SINGLE_UNIT, "SINGLE"),
        (Self::FLAG_DELETE_MARKER, "DELETE"),
        (Self::FLAG_SECTOR_CRC, "CRC"),
        (Self::FLAG_EXISTS, "EXISTS"),
    ];

    /// Check if the file is compressed by any means
    pub fn is_compressed(&self) -> bool {
        (self.flags & (Self::FLAG_IMPLODE | Self::FLAG_COMPRESS)) != 0
    }

    /// Check if the file uses per-sector codec tags
    pub fn has_compress_flag(&self) -> bool {
        (self.flags & Self::FLAG_COMPRESS) != 0
    }

    /// Check if file uses PKWARE implode compression
    pub fn is_imploded(&self) -> bool {
        (self.flags & Self::FLAG_IMPLODE) != 0
    }

    /// Check if the file is encrypted
    pub fn is_encrypted(&self) -> bool {
        (self.flags & Self::FLAG_ENCRYPTED) != 0
    }

    /// Check if the file is stored as a single unit
    pub fn is_single_unit(&self) -> bool {
        (self.flags & Self::FLAG_SINGLE_UNIT) != 0
    }

    /// Check if the file has sector CRCs
    pub fn has_sector_crc(&self) -> bool {
        (self.flags & Self::FLAG_SECTOR_CRC) != 0
    }

    /// Check if the file exists
    pub fn exists(&self) -> bool {
        (self.flags & Self::FLAG_EXISTS) != 0
    }

    /// Check if the file is a deletion marker
    pub fn is_delete_marker(&self) -> bool {
        (self.flags & Self::FLAG_DELETE_MARKER) != 0
    }

    /// Check if the file uses fixed key encryption
    pub fn has_fix_key(&self) -> bool {
        (self.flags & Self::FLAG_FIX_KEY) != 0
    }

    /// Decode a block entry from its 16-byte record
    pub fn from_bytes(data: &[u8; TABLE_ENTRY_SIZE]) -> Self {
        Self {
            file_pos: LittleEndian::read_u32(&data[0x00..0x04]),
            compressed_size: LittleEndian::read_u32(&data[0x04..0x08]),
            file_size: LittleEndian::read_u32(&data[0x08..0x0C]),
            flags: LittleEndian::read_u32(&data[0x0C..0x10]),
        }
    }

    /// Encode into the 16-byte record layout
    pub fn to_bytes(&self) -> [u8; TABLE_ENTRY_SIZE] {
        let mut data = [0u8; TABLE_ENTRY_SIZE];
        LittleEndian::write_u32(&mut data[0x00..0x04], self.file_pos);
        LittleEndian::write_u32(&mut data[0x04..0x08], self.compressed_size);
        LittleEndian::write_u32(&mut data[0x08..0x0C], self.file_size);
        LittleEndian::write_u32(&mut data[0x0C..0x10], self.flags);
        data
    }
}

/// Block table
#[derive(Debug, Clone, Default)]
pub struct BlockTable {
    entries: Vec<BlockEntry>,
}

impl BlockTable {
    /// Build a table from already decoded entries
    pub fn from_entries(entries: Vec<BlockEntry>) -> Self {
        Self { entries }
    }

    /// Read and decrypt a block table from the archive
    pub fn read<R: Read + Seek>(
        reader: &mut R,
        offset: u64,
        size: u32,
        source_len: u64,
    ) -> Result<Self> {
        let raw_data = read_encrypted_table(reader, offset, size, source_len, "(block table)")?;
        Ok(Self::decode(&raw_data))
    }

    /// Create a block table from encrypted bytes
    pub fn from_bytes(data: &[u8], size: u32) -> Result<Self> {
        let expected_size = size as usize * TABLE_ENTRY_SIZE;
        if data.len() < expected_size {
            return Err(Error::corrupt("insufficient data for block table"));
        }

        let mut raw_data = data[..expected_size].to_vec();
        decrypt_table_data(&mut raw_data, "(block table)");
        Ok(Self::decode(&raw_data))
    }

    fn decode(raw_data: &[u8]) -> Self {
        let entries = raw_data
            .chunks_exact(TABLE_ENTRY_SIZE)
            .filter_map(|chunk| chunk.try_into().ok())
            .map(BlockEntry::from_bytes)
            .collect();
        Self { entries }
    }

    /// Get all entries
    pub fn entries(&self) -> &[BlockEntry] {
        &self.entries
    }

    /// Get a specific entry
    pub fn get(&self, index: usize) -> Option<&BlockEntry> {
        self.entries.get(index)
    }

    /// Get the size of the block table
    pub fn size(&self) -> usize {
        self.entries.len()
    }
}
