//! Hash table implementation for MPQ archives
//!
//! Each record is 16 bytes:
//!
//! | Offset | Size | Field       |
//! |--------|------|-------------|
//! | 0x00   | 4    | name hash A |
//! | 0x04   | 4    | name hash B |
//! | 0x08   | 2    | locale      |
//! | 0x0A   | 2    | platform    |
//! | 0x0C   | 4    | block index |

use super::TABLE_ENTRY_SIZE;
use super::common::{decrypt_table_data, read_encrypted_table};
use crate::crypto::{hash_string, hash_type};
use crate::{Error, Result};
use byteorder::{ByteOrder, LittleEndian};
use std::io::{Read, Seek};

/// Hash table entry (16 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashEntry {
    /// The hash of the full file name (part A)
    pub name_1: u32,
    /// The hash of the full file name (part B)
    pub name_2: u32,
    /// The language of the file (Windows LANGID)
    pub locale: u16,
    /// The platform the file is used for (vestigial - always 0 in practice)
    pub platform: u16,
    /// Block table index or special value
    pub block_index: u32,
}

impl HashEntry {
    /// Value indicating the hash entry has never been used
    pub const EMPTY_NEVER_USED: u32 = 0xFFFF_FFFF;

    /// Value indicating the hash entry was deleted
    pub const EMPTY_DELETED: u32 = 0xFFFF_FFFE;

    /// Create an empty hash entry
    pub fn empty() -> Self {
        Self {
            name_1: 0xFFFF_FFFF,
            name_2: 0xFFFF_FFFF,
            locale: 0xFFFF,
            platform: 0xFFFF,
            block_index: Self::EMPTY_NEVER_USED,
        }
    }

    /// Create an entry pointing `filename` at `block_index`
    pub fn for_file(filename: &str, locale: u16, block_index: u32) -> Self {
        Self {
            name_1: hash_string(filename, hash_type::NAME_A),
            name_2: hash_string(filename, hash_type::NAME_B),
            locale,
            platform: 0,
            block_index,
        }
    }

    /// Check if this entry has never been used
    pub fn is_empty(&self) -> bool {
        self.block_index == Self::EMPTY_NEVER_USED
    }

    /// Check if this entry was deleted
    pub fn is_deleted(&self) -> bool {
        self.block_index == Self::EMPTY_DELETED
    }

    /// Check if this entry contains valid file information
    pub fn is_valid(&self) -> bool {
        self.block_index < Self::EMPTY_DELETED
    }

    /// Decode a hash entry from its 16-byte record
    pub fn from_bytes(data: &[u8; TABLE_ENTRY_SIZE]) -> Self {
        Self {
            name_1: LittleEndian::read_u32(&data[0x00..0x04]),
            name_2: LittleEndian::read_u32(&data[0x04..0x08]),
            locale: LittleEndian::read_u16(&data[0x08..0x0A]),
            platform: LittleEndian::read_u16(&data[0x0A..0x0C]),
            block_index: LittleEndian::read_u32(&data[0x0C..0x10]),
        }
    }

    /// Encode into the 16-byte record layout
    pub fn to_bytes(&self) -> [u8; TABLE_ENTRY_SIZE] {
        let mut data = [0u8; TABLE_ENTRY_SIZE];
        LittleEndian::write_u32(&mut data[0x00..0x04], self.name_1);
        LittleEndian::write_u32(&mut data[0x04..0x08], self.name_2);
        LittleEndian::write_u16(&mut data[0x08..0x0A], self.locale);
        LittleEndian::write_u16(&mut data[0x0A..0x0C], self.platform);
        LittleEndian::write_u32(&mut data[0x0C..0x10], self.block_index);
        data
    }
}

/// How names are resolved against the hash table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LookupStrategy {
    /// Start at the table-offset hash and probe forward until a never-used slot
    #[default]
    Probe,
    /// Return the first matching entry anywhere in the table, ignoring locale
    Scan,
}

/// Hash table
#[derive(Debug, Clone, Default)]
pub struct HashTable {
    entries: Vec<HashEntry>,
}

impl HashTable {
    /// Build a table from already decoded entries
    pub fn from_entries(entries: Vec<HashEntry>) -> Self {
        Self { entries }
    }

    /// Read and decrypt a hash table from the archive
    pub fn read<R: Read + Seek>(
        reader: &mut R,
        offset: u64,
        size: u32,
        source_len: u64,
    ) -> Result<Self> {
        let raw_data = read_encrypted_table(reader, offset, size, source_len, "(hash table)")?;
        Ok(Self::decode(&raw_data))
    }

    /// Create a hash table from encrypted bytes
    pub fn from_bytes(data: &[u8], size: u32) -> Result<Self> {
        let expected_size = size as usize * TABLE_ENTRY_SIZE;
        if data.len() < expected_size {
            return Err(Error::corrupt("insufficient data for hash table"));
        }

        let mut raw_data = data[..expected_size].to_vec();
        decrypt_table_data(&mut raw_data, "(hash table)");
        Ok(Self::decode(&raw_data))
    }

    fn decode(raw_data: &[u8]) -> Self {
        let entries = raw_data
            .chunks_exact(TABLE_ENTRY_SIZE)
            .filter_map(|chunk| chunk.try_into().ok())
            .map(HashEntry::from_bytes)
            .collect();
        Self { entries }
    }

    /// Get all entries
    pub fn entries(&self) -> &[HashEntry] {
        &self.entries
    }

    /// Get a specific entry
    pub fn get(&self, index: usize) -> Option<&HashEntry> {
        self.entries.get(index)
    }

    /// Get the size of the hash table
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    /// Resolve a name with the given strategy
    pub fn lookup(
        &self,
        filename: &str,
        locale: u16,
        strategy: LookupStrategy,
    ) -> Option<(usize, &HashEntry)> {
        match strategy {
            LookupStrategy::Probe => self.find_file(filename, locale),
            LookupStrategy::Scan => self.find_file_scan(filename),
        }
    }

    /// Find a file by probing from its table-offset hash.
    ///
    /// Deleted slots are stepped over; a never-used slot ends the search. When
    /// several entries carry the same name hashes, the one for `locale` wins,
    /// then the neutral locale (0), then the first one seen. The table size is
    /// not required to be a power of two.
    pub fn find_file(&self, filename: &str, locale: u16) -> Option<(usize, &HashEntry)> {
        let len = self.entries.len();
        if len == 0 {
            return None;
        }

        let name_a = hash_string(filename, hash_type::NAME_A);
        let name_b = hash_string(filename, hash_type::NAME_B);
        let start = hash_string(filename, hash_type::TABLE_OFFSET) as usize % len;

        let mut neutral = None;
        let mut other = None;

        for step in 0..len {
            let index = (start + step) % len;
            let entry = &self.entries[index];

            if entry.is_empty() {
                break;
            }
            if !entry.is_valid() || entry.name_1 != name_a || entry.name_2 != name_b {
                continue;
            }

            if entry.locale == locale {
                return Some((index, entry));
            }
            if entry.locale == 0 && neutral.is_none() {
                neutral = Some(index);
            } else if other.is_none() {
                other = Some(index);
            }
        }

        neutral.or(other).map(|index| (index, &self.entries[index]))
    }

    /// Find a file by scanning every entry for matching name hashes
    pub fn find_file_scan(&self, filename: &str) -> Option<(usize, &HashEntry)> {
        let name_a = hash_string(filename, hash_type::NAME_A);
        let name_b = hash_string(filename, hash_type::NAME_B);

        self.entries
            .iter()
            .enumerate()
            .find(|(_, entry)| entry.is_valid() && entry.name_1 == name_a && entry.name_2 == name_b)
    }
}
