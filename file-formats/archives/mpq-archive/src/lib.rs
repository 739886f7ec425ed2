//! # mpq_archive - MPQ archive reader
//!
//! Reads MPQ (Mo'PaQ) archives, the hash-indexed container format used by
//! Blizzard game data, and extracts their member files.
//!
//! ## Features
//!
//! - MPQ header discovery, including archives behind a user data header
//! - Hash and block table decryption with the MPQ stream cipher
//! - Probing and scanning name lookup with locale preference
//! - Stored, zlib and bzip2 files, single-unit or split into sectors
//! - Optional Adler-32 sector checksum verification
//! - Structured diagnostics through an observer interface
//!
//! Archive creation, patch archives, encrypted file payloads and signature
//! verification are not supported.
//!
//! ## Examples
//!
//! ```no_run
//! use mpq_archive::Archive;
//!
//! # fn main() -> Result<(), mpq_archive::Error> {
//! let mut archive = Archive::open("example.mpq")?;
//!
//! for entry in archive.list() {
//!     println!("{} ({} bytes)", entry.name, entry.size);
//! }
//!
//! let data = archive.read_file("war3map.j")?;
//! # Ok(())
//! # }
//! ```

#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod archive;
pub mod compression;
pub mod crypto;
pub mod diagnostics;
pub mod error;
pub mod extract;
pub mod header;
pub mod parallel;
pub mod special_files;
pub mod tables;

pub mod debug;

// Re-export commonly used types
pub use archive::{Archive, ArchiveTables, FileEntry, FileInfo, OpenOptions};
pub use compression::{Codec, decompress};
pub use diagnostics::{ArchiveObserver, Diagnostics, ExtractionReport, LogObserver};
pub use error::{Error, Result};
pub use extract::ChecksumPolicy;
pub use header::{FormatVersion, MpqHeader, UserDataHeader};
pub use parallel::{ParallelArchive, SharedArchive};
pub use tables::{BlockEntry, BlockTable, HashEntry, HashTable, LookupStrategy};

pub use crypto::{decrypt_block, encrypt_block, hash_string, hash_type};

/// MPQ signature constants
pub mod signatures {
    /// Standard MPQ archive signature ('MPQ\x1A')
    pub const MPQ_ARCHIVE: u32 = crate::header::MPQ_HEADER_SIGNATURE;

    /// MPQ user data signature ('MPQ\x1B')
    pub const MPQ_USERDATA: u32 = crate::header::MPQ_USERDATA_SIGNATURE;
}

/// Largest block size exponent a header may carry (2 GiB sectors)
pub const MAX_BLOCK_SIZE: u16 = 22;

/// Sector size for a header's block size exponent, or `None` when the
/// exponent is above [`MAX_BLOCK_SIZE`]
#[inline]
pub fn calculate_sector_size(block_size_shift: u16) -> Option<usize> {
    (block_size_shift <= MAX_BLOCK_SIZE).then(|| 512 << block_size_shift)
}
