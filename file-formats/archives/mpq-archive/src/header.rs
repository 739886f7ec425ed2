//! MPQ header structures and parsing
//!
//! All multi-byte fields are little-endian regardless of host byte order.
//!
//! ## MPQ header (32 bytes, format version 0)
//!
//! | Offset | Size | Field             |
//! |--------|------|-------------------|
//! | 0x00   | 4    | magic `MPQ\x1A`   |
//! | 0x04   | 4    | header size       |
//! | 0x08   | 4    | archive size      |
//! | 0x0C   | 2    | format version    |
//! | 0x0E   | 2    | block size shift  |
//! | 0x10   | 4    | hash table offset |
//! | 0x14   | 4    | block table offset|
//! | 0x18   | 4    | hash table entries|
//! | 0x1C   | 4    | block table entries|
//!
//! ## User data header (16 bytes)
//!
//! | Offset | Size | Field                  |
//! |--------|------|------------------------|
//! | 0x00   | 4    | magic `MPQ\x1B`        |
//! | 0x04   | 4    | user data size         |
//! | 0x08   | 4    | MPQ header offset      |
//! | 0x0C   | 4    | user data header size  |
//!
//! Table offsets inside the MPQ header are relative to the MPQ header itself,
//! which sits at the user data header's declared offset when one is present.

use crate::debug::format_size;
use crate::{Error, Result};
use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use std::io::{Read, Seek, SeekFrom};

/// MPQ archive header signature ('MPQ\x1A')
pub const MPQ_HEADER_SIGNATURE: u32 = 0x1A51_504D;

/// MPQ user data header signature ('MPQ\x1B')
pub const MPQ_USERDATA_SIGNATURE: u32 = 0x1B51_504D;

/// Header alignment used when searching for an embedded archive
pub const HEADER_ALIGNMENT: u64 = 0x200;

/// Size of the decoded MPQ header
pub const MPQ_HEADER_SIZE: usize = 0x20;

/// Size of the user data header
pub const USER_DATA_HEADER_SIZE: usize = 0x10;

/// MPQ format version
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FormatVersion {
    /// Version 1 - Original format (32-byte header)
    V1 = 0,
    /// Version 2 - Burning Crusade (44-byte header)
    V2 = 1,
    /// Version 3 - Cataclysm Beta (68-byte header)
    V3 = 2,
    /// Version 4 - Cataclysm+ (208-byte header)
    V4 = 3,
}

impl FormatVersion {
    /// Create from raw version number
    pub fn from_raw(raw: u16) -> Option<Self> {
        match raw {
            0 => Some(FormatVersion::V1),
            1 => Some(FormatVersion::V2),
            2 => Some(FormatVersion::V3),
            3 => Some(FormatVersion::V4),
            _ => None,
        }
    }
}

/// MPQ user data header (optional, appears before main header)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDataHeader {
    /// Signature, always `MPQ_USERDATA_SIGNATURE` for decoded headers
    pub magic: u32,
    /// Maximum size of the user data
    pub user_data_size: u32,
    /// Offset of the MPQ header, relative to the beginning of this header
    pub header_offset: u32,
    /// Size of user data header
    pub user_data_header_size: u32,
}

impl UserDataHeader {
    /// Decode from the 16-byte on-disk record
    pub fn from_bytes(bytes: &[u8; USER_DATA_HEADER_SIZE]) -> Self {
        Self {
            magic: LittleEndian::read_u32(&bytes[0x00..0x04]),
            user_data_size: LittleEndian::read_u32(&bytes[0x04..0x08]),
            header_offset: LittleEndian::read_u32(&bytes[0x08..0x0C]),
            user_data_header_size: LittleEndian::read_u32(&bytes[0x0C..0x10]),
        }
    }

    /// Read the record at the reader's current position
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(Self {
            magic: reader.read_u32::<LittleEndian>()?,
            user_data_size: reader.read_u32::<LittleEndian>()?,
            header_offset: reader.read_u32::<LittleEndian>()?,
            user_data_header_size: reader.read_u32::<LittleEndian>()?,
        })
    }

    /// Debug dump the user data header
    pub fn debug_dump(&self) -> String {
        let mut output = String::new();
        output.push_str("MPQ User Data Header\n");
        output.push_str("====================\n");
        output.push_str(&format!("Magic: 0x{:08X}\n", self.magic));
        output.push_str(&format!(
            "User Data Size: {}\n",
            format_size(u64::from(self.user_data_size))
        ));
        output.push_str(&format!("MPQ Header Offset: 0x{:08X}\n", self.header_offset));
        output.push_str(&format!(
            "User Data Header Size: {}\n",
            self.user_data_header_size
        ));
        output
    }
}

/// Main MPQ header structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MpqHeader {
    /// Signature, always `MPQ_HEADER_SIGNATURE` for decoded headers
    pub magic: u32,
    /// Size of the archive header
    pub header_size: u32,
    /// Size of MPQ archive
    pub archive_size: u32,
    /// Raw format version
    pub format_version: u16,
    /// Block size (power of two exponent)
    pub block_size: u16,
    /// Offset to the hash table
    pub hash_table_pos: u32,
    /// Offset to the block table
    pub block_table_pos: u32,
    /// Number of entries in the hash table
    pub hash_table_size: u32,
    /// Number of entries in the block table
    pub block_table_size: u32,
}

impl MpqHeader {
    /// Decode from the leading 32 bytes of the on-disk header
    pub fn from_bytes(bytes: &[u8; MPQ_HEADER_SIZE]) -> Self {
        Self {
            magic: LittleEndian::read_u32(&bytes[0x00..0x04]),
            header_size: LittleEndian::read_u32(&bytes[0x04..0x08]),
            archive_size: LittleEndian::read_u32(&bytes[0x08..0x0C]),
            format_version: LittleEndian::read_u16(&bytes[0x0C..0x0E]),
            block_size: LittleEndian::read_u16(&bytes[0x0E..0x10]),
            hash_table_pos: LittleEndian::read_u32(&bytes[0x10..0x14]),
            block_table_pos: LittleEndian::read_u32(&bytes[0x14..0x18]),
            hash_table_size: LittleEndian::read_u32(&bytes[0x18..0x1C]),
            block_table_size: LittleEndian::read_u32(&bytes[0x1C..0x20]),
        }
    }

    /// Read an MPQ header from the reader's current position
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(Self {
            magic: reader.read_u32::<LittleEndian>()?,
            header_size: reader.read_u32::<LittleEndian>()?,
            archive_size: reader.read_u32::<LittleEndian>()?,
            format_version: reader.read_u16::<LittleEndian>()?,
            block_size: reader.read_u16::<LittleEndian>()?,
            hash_table_pos: reader.read_u32::<LittleEndian>()?,
            block_table_pos: reader.read_u32::<LittleEndian>()?,
            hash_table_size: reader.read_u32::<LittleEndian>()?,
            block_table_size: reader.read_u32::<LittleEndian>()?,
        })
    }

    /// Known format version, if any
    pub fn version(&self) -> Option<FormatVersion> {
        FormatVersion::from_raw(self.format_version)
    }

    /// Sector size from the block size exponent.
    ///
    /// Always `Some` for headers returned by [`find_header`], which rejects
    /// exponents above [`crate::MAX_BLOCK_SIZE`].
    pub fn sector_size(&self) -> Option<usize> {
        crate::calculate_sector_size(self.block_size)
    }

    /// Debug dump the MPQ header
    pub fn debug_dump(&self) -> String {
        let mut output = String::new();
        output.push_str("MPQ Header\n");
        output.push_str("==========\n");
        output.push_str(&format!("Magic: 0x{:08X}\n", self.magic));
        output.push_str(&format!("Header Size: {}\n", self.header_size));
        output.push_str(&format!(
            "Archive Size: {}\n",
            format_size(u64::from(self.archive_size))
        ));
        match self.version() {
            Some(version) => output.push_str(&format!(
                "Format Version: {version:?} (v{})\n",
                self.format_version + 1
            )),
            None => output.push_str(&format!("Format Version: unknown ({})\n", self.format_version)),
        }
        match self.sector_size() {
            Some(sector_size) => output.push_str(&format!(
                "Block Size: {} (sector size: {})\n",
                self.block_size,
                format_size(sector_size as u64)
            )),
            None => output.push_str(&format!("Block Size: {} (invalid)\n", self.block_size)),
        }
        output.push_str(&format!(
            "Hash Table: offset=0x{:08X}, size={} entries\n",
            self.hash_table_pos, self.hash_table_size
        ));
        output.push_str(&format!(
            "Block Table: offset=0x{:08X}, size={} entries\n",
            self.block_table_pos, self.block_table_size
        ));
        output
    }
}

/// Where the archive was found inside the byte source
#[derive(Debug, Clone)]
pub struct HeaderLocation {
    /// Absolute offset of the MPQ header; all table offsets are relative to it
    pub archive_offset: u64,
    /// User data header, when the source starts with one
    pub user_data: Option<UserDataHeader>,
    /// The MPQ header
    pub header: MpqHeader,
}

/// Locate and decode the archive headers.
///
/// Without `search`, the magic must sit at offset 0. With `search`, every
/// 512-byte boundary is tried in turn, which finds archives appended to
/// executables.
pub fn find_header<R: Read + Seek>(
    reader: &mut R,
    source_len: u64,
    search: bool,
) -> Result<HeaderLocation> {
    let mut offset = 0u64;
    let mut first_magic = None;

    loop {
        let magic = read_magic(reader, offset, source_len)?;
        let first = *first_magic.get_or_insert(magic.unwrap_or(0));

        match magic {
            Some(MPQ_HEADER_SIGNATURE) => {
                let header = read_header_at(reader, offset, source_len)?;
                return Ok(HeaderLocation {
                    archive_offset: offset,
                    user_data: None,
                    header,
                });
            }
            Some(MPQ_USERDATA_SIGNATURE) => {
                reader.seek(SeekFrom::Start(offset))?;
                let user_data = UserDataHeader::read(reader)
                    .map_err(|e| into_corrupt(e, "user data header"))?;

                let mpq_offset = offset + u64::from(user_data.header_offset);
                match read_magic(reader, mpq_offset, source_len)? {
                    Some(MPQ_HEADER_SIGNATURE) => {
                        let header = read_header_at(reader, mpq_offset, source_len)?;
                        return Ok(HeaderLocation {
                            archive_offset: mpq_offset,
                            user_data: Some(user_data),
                            header,
                        });
                    }
                    Some(other) if !search => return Err(Error::NotAnArchive { magic: other }),
                    None if !search => {
                        return Err(Error::corrupt(format!(
                            "user data header points past end of file (0x{mpq_offset:X})"
                        )));
                    }
                    _ => {}
                }
            }
            _ if !search => return Err(Error::NotAnArchive { magic: first }),
            _ => {}
        }

        offset += HEADER_ALIGNMENT;
        if offset >= source_len {
            return Err(Error::NotAnArchive { magic: first });
        }
    }
}

fn read_magic<R: Read + Seek>(reader: &mut R, offset: u64, source_len: u64) -> Result<Option<u32>> {
    if offset.saturating_add(4) > source_len {
        return Ok(None);
    }
    reader.seek(SeekFrom::Start(offset))?;
    Ok(Some(reader.read_u32::<LittleEndian>()?))
}

fn read_header_at<R: Read + Seek>(reader: &mut R, offset: u64, source_len: u64) -> Result<MpqHeader> {
    if offset.saturating_add(MPQ_HEADER_SIZE as u64) > source_len {
        return Err(Error::corrupt(format!("truncated MPQ header at 0x{offset:X}")));
    }
    reader.seek(SeekFrom::Start(offset))?;
    let header = MpqHeader::read(reader).map_err(|e| into_corrupt(e, "MPQ header"))?;
    let sector_size = header.sector_size().ok_or_else(|| {
        Error::corrupt(format!(
            "MPQ header at 0x{offset:X}: block size {} exceeds {}",
            header.block_size,
            crate::MAX_BLOCK_SIZE
        ))
    })?;
    log::debug!(
        "MPQ header at 0x{offset:X}: version {}, sector size {sector_size}, {} hash / {} block entries",
        header.format_version,
        header.hash_table_size,
        header.block_table_size
    );
    Ok(header)
}

fn into_corrupt(err: Error, what: &str) -> Error {
    match err {
        Error::Io(io) => Error::from_read(io, what),
        other => other,
    }
}
