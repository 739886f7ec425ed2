//! Console rendering of archive diagnostics

use crate::utils::{add_table_row, create_field_table, create_table, format_bytes, format_compression_ratio};
use mpq_archive::debug::{format_flags, hash_entry_status};
use mpq_archive::{
    ArchiveObserver, BlockEntry, BlockTable, Codec, ExtractionReport, FileEntry, HashTable,
    MpqHeader, UserDataHeader,
};

/// Prints diagnostic events as tables on stdout
#[derive(Debug, Default)]
pub struct ConsoleObserver;

impl ArchiveObserver for ConsoleObserver {
    fn debug(&self, message: &str) {
        log::debug!("{message}");
    }

    fn user_data_header(&self, header: &UserDataHeader) {
        println!("MPQ user data header");
        create_field_table(&[
            ("Magic", format!("0x{:08X}", header.magic)),
            ("User data size", format_bytes(u64::from(header.user_data_size))),
            ("Header offset", format!("0x{:08X}", header.header_offset)),
            ("User data header size", header.user_data_header_size.to_string()),
        ])
        .printstd();
    }

    fn header(&self, header: &MpqHeader) {
        println!("MPQ header");
        let version = header
            .version()
            .map_or_else(|| format!("unknown ({})", header.format_version), |v| format!("{v:?}"));
        create_field_table(&[
            ("Magic", format!("0x{:08X}", header.magic)),
            ("Header size", header.header_size.to_string()),
            ("Archive size", format_bytes(u64::from(header.archive_size))),
            ("Format version", version),
            (
                "Sector size",
                header.sector_size().map_or_else(
                    || format!("invalid ({})", header.block_size),
                    |size| format_bytes(size as u64),
                ),
            ),
            ("Hash table offset", format!("0x{:08X}", header.hash_table_pos)),
            ("Block table offset", format!("0x{:08X}", header.block_table_pos)),
            ("Hash table entries", header.hash_table_size.to_string()),
            ("Block table entries", header.block_table_size.to_string()),
        ])
        .printstd();
    }

    fn hash_table(&self, table: &HashTable) {
        println!("MPQ hash table");
        let mut out = create_table(&["Index", "Name A", "Name B", "Locale", "Platform", "Block", "Status"]);
        for (i, entry) in table.entries().iter().enumerate() {
            add_table_row(
                &mut out,
                vec![
                    i.to_string(),
                    format!("{:08X}", entry.name_1),
                    format!("{:08X}", entry.name_2),
                    format!("{:04X}", entry.locale),
                    entry.platform.to_string(),
                    format!("{:08X}", entry.block_index),
                    hash_entry_status(entry).to_string(),
                ],
            );
        }
        out.printstd();
    }

    fn block_table(&self, table: &BlockTable) {
        println!("MPQ block table");
        let mut out = create_table(&["Index", "Offset", "Archived", "Size", "Flags"]);
        for (i, entry) in table.entries().iter().enumerate() {
            add_table_row(
                &mut out,
                vec![
                    i.to_string(),
                    format!("0x{:08X}", entry.file_pos),
                    entry.compressed_size.to_string(),
                    entry.file_size.to_string(),
                    format_flags(entry.flags, &BlockEntry::FLAG_NAMES),
                ],
            );
        }
        out.printstd();
    }

    fn file_list(&self, files: &[FileEntry]) {
        println!("Files");
        let mut out = create_table(&["File", "Size", "Archived", "Saved"]);
        for file in files {
            add_table_row(
                &mut out,
                vec![
                    file.name.clone(),
                    format_bytes(file.size),
                    format_bytes(file.compressed_size),
                    format_compression_ratio(file.size, file.compressed_size),
                ],
            );
        }
        out.printstd();
    }

    fn extraction(&self, report: &ExtractionReport<'_>) {
        let codec = report.codec.map_or("-", Codec::describe_tag);
        match report.result {
            Ok(size) => println!(
                "{}: {} -> {} [{codec}]",
                report.name,
                format_bytes(u64::from(report.entry.compressed_size)),
                format_bytes(size as u64)
            ),
            Err(err) => println!("{}: failed [{codec}]: {err}", report.name),
        }
    }
}
