//! Malformed archives fail with typed errors

use crate::common::{ArchiveBuilder, StoredFile, generate_repetitive_data};
use mpq_archive::{Archive, BlockEntry, Codec, Error, HashEntry, OpenOptions};
use std::io::Cursor;

fn open(bytes: Vec<u8>) -> mpq_archive::Result<Archive<Cursor<Vec<u8>>>> {
    Archive::from_reader(Cursor::new(bytes), OpenOptions::new())
}

#[test]
fn test_four_zero_bytes_are_not_an_archive() {
    assert!(matches!(open(vec![0; 4]), Err(Error::NotAnArchive { magic: 0 })));
}

#[test]
fn test_block_index_out_of_range() {
    let bytes = ArchiveBuilder::new()
        .file("ok.txt", StoredFile::single_unit(b"ok"))
        .hash_entry("ghost.txt", HashEntry::for_file("ghost.txt", 0, 7))
        .build();
    let mut archive = open(bytes).unwrap();

    assert!(archive.find_file("ghost.txt").unwrap_err().is_corruption());
    assert!(matches!(
        archive.read_file("ghost.txt"),
        Err(Error::CorruptArchive(_))
    ));
    assert_eq!(archive.read_file("ok.txt").unwrap(), b"ok");
}

#[test]
fn test_truncated_block_table() {
    let mut bytes = ArchiveBuilder::new()
        .file("ok.txt", StoredFile::single_unit(b"ok"))
        .build();
    bytes.truncate(bytes.len() - 8);
    assert!(matches!(open(bytes), Err(Error::CorruptArchive(_))));
}

#[test]
fn test_truncated_hash_table() {
    let image = ArchiveBuilder::new()
        .file("ok.txt", StoredFile::single_unit(b"ok"))
        .build_image();
    let mut bytes = image.bytes;
    bytes.truncate(image.hash_table_pos as usize + 40);
    assert!(matches!(open(bytes), Err(Error::CorruptArchive(_))));
}

#[test]
fn test_truncated_header() {
    let bytes = ArchiveBuilder::new().build();
    assert!(matches!(open(bytes[..24].to_vec()), Err(Error::CorruptArchive(_))));
}

#[test]
fn test_oversized_block_size_is_corrupt() {
    let data = generate_repetitive_data(b"sector", 1000);
    for block_size in [23, 55, 63, 64, u16::MAX] {
        let bytes = ArchiveBuilder::new()
            .block_size(block_size)
            .file("f.bin", StoredFile::sectored(&data, 512, Some(Codec::Zlib), false))
            .build();
        assert!(
            matches!(open(bytes), Err(Error::CorruptArchive(_))),
            "block size {block_size}"
        );
    }
}

#[test]
fn test_file_data_past_end() {
    let flags = BlockEntry::FLAG_EXISTS | BlockEntry::FLAG_SINGLE_UNIT;
    let image = ArchiveBuilder::new()
        .file("big.bin", StoredFile::raw(vec![1; 64], 64, flags))
        .build_image();

    // Patch the encrypted block table so the file claims far more bytes.
    let block_pos = image.block_table_pos as usize;
    let mut block = image.bytes[block_pos..block_pos + 16].to_vec();
    let key = mpq_archive::crypto::table_key("(block table)");
    mpq_archive::crypto::decrypt_bytes(&mut block, key);
    let mut entry = BlockEntry::from_bytes(&block.clone().try_into().unwrap());
    entry.compressed_size = 1 << 20;
    entry.file_size = 1 << 20;
    let mut patched = entry.to_bytes().to_vec();
    mpq_archive::crypto::encrypt_bytes(&mut patched, key);

    let mut bytes = image.bytes;
    bytes[block_pos..block_pos + 16].copy_from_slice(&patched);

    let mut archive = open(bytes).unwrap();
    assert!(matches!(archive.read_file("big.bin"), Err(Error::CorruptArchive(_))));
}

#[test]
fn test_bad_sector_offsets() {
    let data = generate_repetitive_data(b"abc", 1000);
    let mut stored = StoredFile::sectored(&data, 512, Some(Codec::Zlib), false);
    // Point the middle offset past the end of the data.
    stored.bytes[4..8].copy_from_slice(&u32::MAX.to_le_bytes());

    let mut archive = open(ArchiveBuilder::new().block_size(0).file("f.bin", stored).build()).unwrap();
    assert!(archive.read_file("f.bin").unwrap_err().is_corruption());
}

#[test]
fn test_damaged_zlib_sector() {
    let data = generate_repetitive_data(b"abc", 1000);
    let mut stored = StoredFile::sectored(&data, 512, Some(Codec::Zlib), false);
    let last = stored.bytes.len() - 1;
    stored.bytes[last] ^= 0xFF;

    let mut archive = open(ArchiveBuilder::new().block_size(0).file("f.bin", stored).build()).unwrap();
    assert!(matches!(
        archive.read_file("f.bin"),
        Err(Error::DecompressionFailed { codec: "zlib", .. })
    ));
}
