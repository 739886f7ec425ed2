//! File extraction
//!
//! Turns a resolved block table entry into file content. Three storage
//! layouts are handled:
//!
//! - **Single unit**: one blob, optionally prefixed by a codec tag.
//! - **Sectored**: a little-endian `u32` offset table (relative to the start of
//!   the file data) followed by independently compressed sectors. With the
//!   sector CRC flag the table carries one extra slot whose range holds the
//!   per-sector Adler-32 checksums.
//! - **Contiguous**: uncompressed files whose archived size equals their real
//!   size carry no offset table at all.
//!
//! A unit is only decompressed when it is shorter than its expected output;
//! units that did not shrink were stored verbatim without a codec tag.

use crate::archive::{ArchiveTables, OpenOptions};
use crate::compression::{self, flags};
use crate::diagnostics::{Diagnostics, ExtractionReport};
use crate::tables::BlockEntry;
use crate::{Error, Result};
use byteorder::{ByteOrder, LittleEndian};
use std::io::{Read, Seek, SeekFrom};

/// What to do with stored sector checksums
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChecksumPolicy {
    /// Do not look at stored checksums
    Ignore,
    /// Report mismatches to the observer and still return the content
    #[default]
    Report,
    /// Fail the extraction on the first mismatch
    Strict,
}

/// Reads one file at a time from a byte source using decoded tables
pub(crate) struct FileExtractor<'a, R> {
    reader: &'a mut R,
    tables: &'a ArchiveTables,
    options: &'a OpenOptions,
    codec: Option<u8>,
}

impl<'a, R: Read + Seek> FileExtractor<'a, R> {
    pub(crate) fn new(reader: &'a mut R, tables: &'a ArchiveTables, options: &'a OpenOptions) -> Self {
        Self {
            reader,
            tables,
            options,
            codec: None,
        }
    }

    /// Extract `name`, decompressing single-unit files even without size gain
    /// when `force_decompress` is set
    pub(crate) fn extract(&mut self, name: &str, force_decompress: bool) -> Result<Vec<u8>> {
        let info = self
            .tables
            .find_file(name, self.options.locale, self.options.lookup)?
            .ok_or_else(|| Error::FileNotFound(name.to_string()))?;

        self.codec = None;
        let result = self.extract_entry(name, &info.entry, force_decompress);

        if self.options.diagnostics.contains(Diagnostics::EXTRACTION) {
            self.options.observer.extraction(&ExtractionReport {
                name,
                entry: &info.entry,
                codec: self.codec,
                result: result.as_ref().map(Vec::len),
            });
        }

        result
    }

    fn extract_entry(
        &mut self,
        name: &str,
        entry: &BlockEntry,
        force_decompress: bool,
    ) -> Result<Vec<u8>> {
        if !entry.exists() || entry.compressed_size == 0 {
            return Ok(Vec::new());
        }

        if entry.is_encrypted() {
            return Err(Error::EncryptionUnsupported(name.to_string()));
        }

        let file_offset = self.tables.archive_offset() + u64::from(entry.file_pos);
        let raw = self.read_at(file_offset, entry.compressed_size as usize, name)?;

        if entry.is_single_unit() {
            self.read_single_unit(raw, entry, force_decompress)
        } else if !entry.is_compressed() && entry.compressed_size == entry.file_size {
            log::trace!("{name}: {} bytes stored contiguously", raw.len());
            Ok(raw)
        } else {
            self.read_sectored(name, &raw, entry)
        }
    }

    fn read_at(&mut self, offset: u64, len: usize, name: &str) -> Result<Vec<u8>> {
        let end = offset
            .checked_add(len as u64)
            .ok_or_else(|| Error::corrupt(format!("{name}: data range overflows")))?;
        if end > self.tables.source_len() {
            return Err(Error::corrupt(format!(
                "{name}: data ends at 0x{end:X}, past end of archive (0x{:X})",
                self.tables.source_len()
            )));
        }

        self.reader.seek(SeekFrom::Start(offset))?;
        let mut data = vec![0u8; len];
        self.reader
            .read_exact(&mut data)
            .map_err(|e| Error::from_read(e, name))?;
        Ok(data)
    }

    fn read_single_unit(
        &mut self,
        raw: Vec<u8>,
        entry: &BlockEntry,
        force_decompress: bool,
    ) -> Result<Vec<u8>> {
        let gained = entry.file_size > entry.compressed_size;
        if !(force_decompress || gained) {
            return Ok(raw);
        }
        if !entry.has_compress_flag() {
            if entry.is_imploded() {
                self.codec = Some(flags::PKWARE);
                return Err(Error::UnsupportedCodec(flags::PKWARE));
            }
            return Ok(raw);
        }

        let (&tag, payload) = raw
            .split_first()
            .ok_or_else(|| Error::corrupt("empty single-unit file"))?;
        self.codec = Some(tag);
        compression::decompress(payload, tag, entry.file_size as usize)
    }

    fn read_sectored(&mut self, name: &str, raw: &[u8], entry: &BlockEntry) -> Result<Vec<u8>> {
        let header = self.tables.header();
        let sector_size = header.sector_size().ok_or_else(|| {
            Error::corrupt(format!("{name}: invalid block size {}", header.block_size))
        })?;
        let file_size = entry.file_size as usize;
        let sector_count = file_size.div_ceil(sector_size);
        let has_crc = entry.has_sector_crc();

        let offsets = read_sector_offsets(raw, sector_count + 1 + usize::from(has_crc), name)?;
        log::debug!(
            "{name}: {sector_count} sectors of {sector_size} bytes, offsets {}..{}",
            offsets.first().copied().unwrap_or(0),
            offsets.last().copied().unwrap_or(0)
        );

        let verify = has_crc && self.options.checksum_policy != ChecksumPolicy::Ignore;
        let mut checksums = Vec::with_capacity(if verify { sector_count } else { 0 });
        let mut output = Vec::with_capacity(file_size);

        for i in 0..sector_count {
            let expected_len = if i + 1 == sector_count {
                match file_size % sector_size {
                    0 => sector_size,
                    remainder => remainder,
                }
            } else {
                sector_size
            };

            let stored = &raw[offsets[i]..offsets[i + 1]];
            let sector = self.decode_sector(name, i, stored, expected_len, entry)?;
            log::trace!("{name}: sector {i} {} -> {} bytes", stored.len(), sector.len());

            if verify {
                checksums.push(adler2::adler32_slice(&sector));
            }
            output.extend_from_slice(&sector);
        }

        if verify {
            let stored = &raw[offsets[sector_count]..offsets[sector_count + 1]];
            self.verify_checksums(name, stored, &checksums, entry)?;
        }

        Ok(output)
    }

    fn decode_sector(
        &mut self,
        name: &str,
        index: usize,
        stored: &[u8],
        expected_len: usize,
        entry: &BlockEntry,
    ) -> Result<Vec<u8>> {
        if stored.len() == expected_len {
            return Ok(stored.to_vec());
        }

        if stored.len() > expected_len {
            return Err(Error::corrupt(format!(
                "{name}: sector {index} stores {} bytes, expected at most {expected_len}",
                stored.len()
            )));
        }

        if entry.has_compress_flag() {
            let (&tag, payload) = stored
                .split_first()
                .ok_or_else(|| Error::corrupt(format!("{name}: sector {index} is empty")))?;
            self.codec.get_or_insert(tag);
            return compression::decompress(payload, tag, expected_len);
        }

        if entry.is_imploded() {
            return Err(Error::UnsupportedCodec(flags::PKWARE));
        }

        Err(Error::corrupt(format!(
            "{name}: uncompressed sector {index} holds {} of {expected_len} bytes",
            stored.len()
        )))
    }

    fn verify_checksums(
        &self,
        name: &str,
        stored: &[u8],
        actual: &[u32],
        entry: &BlockEntry,
    ) -> Result<()> {
        let strict = self.options.checksum_policy == ChecksumPolicy::Strict;

        let expected = match decode_checksum_table(stored, actual.len(), entry) {
            Ok(table) => table,
            Err(err) if strict => return Err(err),
            Err(err) => {
                log::warn!("{name}: sector checksum table unreadable: {err}");
                return Ok(());
            }
        };

        for (sector, (&want, &got)) in expected.iter().zip(actual).enumerate() {
            // Zero marks a sector without a stored checksum.
            if want == 0 || want == got {
                continue;
            }
            if strict {
                return Err(Error::ChecksumMismatch {
                    file: name.to_string(),
                    sector,
                    expected: want,
                    actual: got,
                });
            }
            log::warn!(
                "Sector checksum mismatch in {name} sector {sector}: expected {want:08X}, got {got:08X}"
            );
            self.options
                .observer
                .checksum_mismatch(name, sector, want, got);
        }

        Ok(())
    }
}

/// Parse `count` sector offsets from the start of the archived data.
///
/// Offsets must be non-decreasing and stay inside the archived data.
fn read_sector_offsets(raw: &[u8], count: usize, name: &str) -> Result<Vec<usize>> {
    let table_len = count
        .checked_mul(4)
        .ok_or_else(|| Error::corrupt(format!("{name}: sector table size overflows")))?;
    if table_len > raw.len() {
        return Err(Error::corrupt(format!(
            "{name}: sector offset table needs {table_len} bytes, file holds {}",
            raw.len()
        )));
    }

    let offsets: Vec<usize> = raw[..table_len]
        .chunks_exact(4)
        .map(|chunk| LittleEndian::read_u32(chunk) as usize)
        .collect();

    let mut previous = 0;
    for (i, &offset) in offsets.iter().enumerate() {
        if offset < previous || offset > raw.len() {
            return Err(Error::corrupt(format!(
                "{name}: sector offset {i} (0x{offset:X}) out of order or past 0x{:X}",
                raw.len()
            )));
        }
        previous = offset;
    }

    Ok(offsets)
}

fn decode_checksum_table(stored: &[u8], sectors: usize, entry: &BlockEntry) -> Result<Vec<u32>> {
    let expected_len = sectors * 4;

    let table = if stored.len() >= expected_len {
        stored[..expected_len].to_vec()
    } else if entry.has_compress_flag() {
        let (&tag, payload) = stored
            .split_first()
            .ok_or_else(|| Error::corrupt("sector checksum table is empty"))?;
        compression::decompress(payload, tag, expected_len)?
    } else {
        return Err(Error::corrupt(format!(
            "sector checksum table holds {} of {expected_len} bytes",
            stored.len()
        )));
    };

    Ok(table.chunks_exact(4).map(LittleEndian::read_u32).collect())
}
