//! Storage layouts: single unit, sectored, contiguous and placeholders

use crate::common::{ArchiveBuilder, StoredFile, generate_repetitive_data, generate_test_data};
use mpq_archive::{Archive, BlockEntry, Codec, Error, OpenOptions};
use pretty_assertions::assert_eq;
use std::io::Cursor;

fn open(bytes: Vec<u8>) -> Archive<Cursor<Vec<u8>>> {
    Archive::from_reader(Cursor::new(bytes), OpenOptions::new()).unwrap()
}

#[test]
fn test_single_unit_hello() {
    let mut archive = open(
        ArchiveBuilder::new()
            .file("hello.txt", StoredFile::single_unit(b"hi"))
            .with_listfile()
            .build(),
    );
    assert_eq!(archive.file_names(), ["hello.txt"]);
    assert_eq!(archive.read_file("hello.txt").unwrap(), b"hi");
}

#[test]
fn test_compression_skipped_when_no_gain() {
    // "hi" deflates to more than two bytes, so it is stored verbatim under
    // the compress flag with equal sizes.
    let stored = StoredFile::single_unit_compressed(b"hi", Codec::Zlib);
    assert_eq!(stored.bytes, b"hi");
    assert_ne!(stored.flags & BlockEntry::FLAG_COMPRESS, 0);

    let mut archive = open(ArchiveBuilder::new().file("hello.txt", stored).build());
    assert_eq!(archive.read_file("hello.txt").unwrap(), b"hi");
}

#[test]
fn test_force_decompress_reads_tag() {
    // Equal sizes, but the content really is tagged zlib data.
    let mut unit = vec![Codec::Zlib.tag()];
    unit.extend(crate::common::compress(b"0123456789", Codec::Zlib));
    let file_size = unit.len() as u32;
    let flags = BlockEntry::FLAG_EXISTS | BlockEntry::FLAG_SINGLE_UNIT | BlockEntry::FLAG_COMPRESS;

    let mut archive = open(
        ArchiveBuilder::new()
            .file("tagged.bin", StoredFile::raw(unit.clone(), file_size, flags))
            .build(),
    );

    assert_eq!(archive.read_file("tagged.bin").unwrap(), unit);
    assert!(matches!(
        archive.read_file_with("tagged.bin", true),
        Err(Error::DecompressionFailed { codec: "zlib", .. })
    ));
}

#[test]
fn test_zlib_and_bzip2_single_unit() {
    let data = generate_repetitive_data(b"Footman\0", 2048);
    let mut archive = open(
        ArchiveBuilder::new()
            .file("z.bin", StoredFile::single_unit_compressed(&data, Codec::Zlib))
            .file("b.bin", StoredFile::single_unit_compressed(&data, Codec::BZip2))
            .build(),
    );
    assert_eq!(archive.read_file("z.bin").unwrap(), data);
    assert_eq!(archive.read_file("b.bin").unwrap(), data);
}

#[test]
fn test_thousand_bytes_in_two_sectors() {
    let data = generate_repetitive_data(b"sector ", 1000);
    let stored = StoredFile::sectored(&data, 512, Some(Codec::Zlib), false);
    let offsets: Vec<u32> = stored.bytes[..12]
        .chunks_exact(4)
        .map(|c| u32::from_le_bytes(c.try_into().unwrap()))
        .collect();
    assert_eq!(offsets[0], 12);
    assert_eq!(offsets[2] as usize, stored.bytes.len());

    let mut archive = open(ArchiveBuilder::new().block_size(0).file("f.txt", stored).build());
    let extracted = archive.read_file("f.txt").unwrap();
    assert_eq!(extracted.len(), 1000);
    assert_eq!(extracted, data);
}

#[test]
fn test_sectors_mixing_compressed_and_verbatim() {
    // The first sector compresses well, the second is pseudo-random.
    let mut data = vec![b'A'; 512];
    data.extend((0..300u32).map(|i| (i.wrapping_mul(2_654_435_761) >> 13) as u8));
    let mut archive = open(
        ArchiveBuilder::new()
            .block_size(0)
            .file("mixed.bin", StoredFile::sectored(&data, 512, Some(Codec::Zlib), false))
            .build(),
    );
    assert_eq!(archive.read_file("mixed.bin").unwrap(), data);
}

#[test]
fn test_bzip2_sectors_exact_multiple() {
    let data = generate_repetitive_data(b"grunt", 4096 * 2);
    let mut archive = open(
        ArchiveBuilder::new()
            .block_size(3)
            .file("g.bin", StoredFile::sectored(&data, 4096, Some(Codec::BZip2), false))
            .build(),
    );
    assert_eq!(archive.read_file("g.bin").unwrap(), data);
}

#[test]
fn test_uncompressed_layouts() {
    let data = generate_test_data(1500);
    let mut archive = open(
        ArchiveBuilder::new()
            .block_size(0)
            .file("plain.bin", StoredFile::contiguous(&data))
            .file("split.bin", StoredFile::sectored(&data, 512, None, false))
            .build(),
    );
    assert_eq!(archive.read_file("plain.bin").unwrap(), data);
    assert_eq!(archive.read_file("split.bin").unwrap(), data);
}

#[test]
fn test_placeholder_files_are_empty() {
    let mut archive = open(
        ArchiveBuilder::new()
            .file("empty.txt", StoredFile::raw(Vec::new(), 0, BlockEntry::FLAG_EXISTS))
            .file(
                "deleted.txt",
                StoredFile::raw(b"stale".to_vec(), 5, BlockEntry::FLAG_SINGLE_UNIT),
            )
            .build(),
    );
    assert!(archive.read_file("empty.txt").unwrap().is_empty());
    assert!(archive.read_file("deleted.txt").unwrap().is_empty());
}

#[test]
fn test_unsupported_codec_tag() {
    let flags = BlockEntry::FLAG_EXISTS | BlockEntry::FLAG_SINGLE_UNIT | BlockEntry::FLAG_COMPRESS;
    let mut archive = open(
        ArchiveBuilder::new()
            .file("huffman.wav", StoredFile::raw(vec![0x01, 0xAA, 0xBB], 10, flags))
            .build(),
    );
    assert!(matches!(
        archive.read_file("huffman.wav"),
        Err(Error::UnsupportedCodec(0x01))
    ));
}

#[test]
fn test_imploded_sector_unsupported() {
    let data = generate_repetitive_data(b"x", 600);
    let stored = StoredFile::sectored(&data, 512, Some(Codec::Zlib), false);
    let flags = (stored.flags & !BlockEntry::FLAG_COMPRESS) | BlockEntry::FLAG_IMPLODE;
    let stored = StoredFile::raw(stored.bytes, stored.file_size, flags);

    let mut archive = open(ArchiveBuilder::new().block_size(0).file("old.bin", stored).build());
    assert!(matches!(
        archive.read_file("old.bin"),
        Err(Error::UnsupportedCodec(0x08))
    ));
}

#[test]
fn test_imploded_single_unit_unsupported() {
    let flags = BlockEntry::FLAG_EXISTS | BlockEntry::FLAG_SINGLE_UNIT | BlockEntry::FLAG_IMPLODE;
    let mut archive = open(
        ArchiveBuilder::new()
            .file("old.txt", StoredFile::raw(vec![0x00, 0x06, 0xAA, 0xBB], 100, flags))
            .file("same.txt", StoredFile::raw(b"abcd".to_vec(), 4, flags))
            .build(),
    );

    assert!(matches!(
        archive.read_file("old.txt"),
        Err(Error::UnsupportedCodec(0x08))
    ));
    // No size gain: the unit was stored verbatim.
    assert_eq!(archive.read_file("same.txt").unwrap(), b"abcd");
    assert!(matches!(
        archive.read_file_with("same.txt", true),
        Err(Error::UnsupportedCodec(0x08))
    ));
}

#[test]
fn test_encrypted_payload_rejected() {
    let stored = StoredFile::single_unit(b"secret").with_flags(BlockEntry::FLAG_ENCRYPTED);
    let mut archive = open(
        ArchiveBuilder::new()
            .file("war3map.j", stored)
            .file("other.txt", StoredFile::single_unit(b"fine"))
            .build(),
    );

    let err = archive.read_file("war3map.j").unwrap_err();
    assert!(matches!(err, Error::EncryptionUnsupported(ref name) if name == "war3map.j"));
    assert!(err.is_recoverable());
    assert_eq!(archive.read_file("other.txt").unwrap(), b"fine");
}
