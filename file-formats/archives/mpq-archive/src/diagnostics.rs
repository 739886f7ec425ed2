//! Diagnostics reporting for archive loading and extraction
//!
//! Which events are reported is decided by the [`Diagnostics`] flags set on
//! [`OpenOptions`](crate::OpenOptions); how they are reported is decided by the
//! [`ArchiveObserver`] installed next to them. The default observer writes to
//! the `log` facade.

use crate::archive::FileEntry;
use crate::debug::{format_block_table, format_flags, format_hash_table, format_size};
use crate::header::{MpqHeader, UserDataHeader};
use crate::tables::{BlockEntry, BlockTable, HashTable};
use crate::{Codec, Error};
use bitflags::bitflags;

bitflags! {
    /// Diagnostic events to report while loading and extracting
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Diagnostics: u32 {
        /// Decoded hash table
        const HASH_TABLE = 1 << 1;
        /// Decoded block table
        const BLOCK_TABLE = 1 << 2;
        /// User data header, when present
        const USER_DATA_HEADER = 1 << 3;
        /// MPQ header
        const HEADER = 1 << 4;
        /// Names found in the listfile, with sizes
        const FILE_LIST = 1 << 5;
        /// One report per extracted file
        const EXTRACTION = 1 << 6;
        /// Progress messages
        const DEBUG = 1 << 7;

        /// Both headers
        const HEADERS = Self::USER_DATA_HEADER.bits() | Self::HEADER.bits();
    }
}

/// Outcome of extracting one file
#[derive(Debug)]
pub struct ExtractionReport<'a> {
    /// Requested name
    pub name: &'a str,
    /// Block table entry the name resolved to
    pub entry: &'a BlockEntry,
    /// Codec tag of the first compressed unit, if any was decoded
    pub codec: Option<u8>,
    /// Number of bytes produced, or the failure
    pub result: Result<usize, &'a Error>,
}

/// Receives diagnostic events from an archive.
///
/// Every method has an empty default so implementors only override what they
/// display.
pub trait ArchiveObserver: Send + Sync {
    /// Free-form progress message
    fn debug(&self, _message: &str) {}

    /// User data header decoded
    fn user_data_header(&self, _header: &UserDataHeader) {}

    /// MPQ header decoded
    fn header(&self, _header: &MpqHeader) {}

    /// Hash table decrypted and decoded
    fn hash_table(&self, _table: &HashTable) {}

    /// Block table decrypted and decoded
    fn block_table(&self, _table: &BlockTable) {}

    /// Listfile loaded
    fn file_list(&self, _files: &[FileEntry]) {}

    /// A file extraction finished
    fn extraction(&self, _report: &ExtractionReport<'_>) {}

    /// A sector failed checksum verification under [`ChecksumPolicy::Report`](crate::ChecksumPolicy::Report).
    ///
    /// Called regardless of the diagnostic flags; the mismatch is also logged
    /// as a warning.
    fn checksum_mismatch(&self, _name: &str, _sector: usize, _expected: u32, _actual: u32) {}
}

/// Observer writing every event to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl ArchiveObserver for LogObserver {
    fn debug(&self, message: &str) {
        log::debug!("{message}");
    }

    fn user_data_header(&self, header: &UserDataHeader) {
        log::info!("\n{}", header.debug_dump());
    }

    fn header(&self, header: &MpqHeader) {
        log::info!("\n{}", header.debug_dump());
    }

    fn hash_table(&self, table: &HashTable) {
        log::info!("MPQ archive hash table\n{}", format_hash_table(table.entries()));
    }

    fn block_table(&self, table: &BlockTable) {
        log::info!("MPQ archive block table\n{}", format_block_table(table.entries()));
    }

    fn file_list(&self, files: &[FileEntry]) {
        let width = files.iter().map(|f| f.name.len()).max().unwrap_or(0);
        for file in files {
            log::info!("{:<width$} {:>12}", file.name, format_size(file.size));
        }
    }

    fn extraction(&self, report: &ExtractionReport<'_>) {
        let codec = report.codec.map_or("-", Codec::describe_tag);
        match report.result {
            Ok(size) => log::info!(
                "{:<25} {:>8} -> {:>8} bytes [{codec}] {}",
                report.name,
                report.entry.compressed_size,
                size,
                format_flags(report.entry.flags, &BlockEntry::FLAG_NAMES)
            ),
            Err(err) => log::info!(
                "{:<25} {:>8} bytes [{codec}] failed: {err}",
                report.name,
                report.entry.compressed_size
            ),
        }
    }
}
