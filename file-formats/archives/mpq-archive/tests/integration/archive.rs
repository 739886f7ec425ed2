//! Opening archives and reading members through the public API

use crate::common::{ArchiveBuilder, StoredFile, generate_repetitive_data, temp_dir, write_archive};
use mpq_archive::{Archive, Codec, Error, FileEntry, LookupStrategy, OpenOptions};
use pretty_assertions::assert_eq;
use std::io::Cursor;

fn sample_archive() -> Vec<u8> {
    let script = generate_repetitive_data(b"function main takes nothing returns nothing\r\n", 5000);
    ArchiveBuilder::new()
        .block_size(0)
        .file("hello.txt", StoredFile::single_unit(b"hi"))
        .file("war3map.j", StoredFile::sectored(&script, 512, Some(Codec::Zlib), false))
        .file("units\\footman.mdx", StoredFile::single_unit_compressed(&script, Codec::BZip2))
        .with_listfile()
        .build()
}

#[test]
fn test_open_from_path_and_read() {
    let dir = temp_dir();
    let path = write_archive(dir.path(), "sample.mpq", &sample_archive());

    let mut archive = Archive::open(&path).unwrap();
    assert_eq!(archive.path(), Some(path.as_path()));
    assert_eq!(archive.archive_offset(), 0);
    assert_eq!(archive.header().sector_size(), Some(512));
    assert_eq!(
        archive.file_names(),
        ["hello.txt", "war3map.j", "units\\footman.mdx"]
    );

    assert_eq!(archive.read_file("hello.txt").unwrap(), b"hi");
    let script = archive.read_file("war3map.j").unwrap();
    assert_eq!(script.len(), 5000);
    assert_eq!(archive.read_file("UNITS\\FOOTMAN.MDX").unwrap(), script);
}

#[test]
fn test_list_reports_sizes() {
    let archive = Archive::from_reader(Cursor::new(sample_archive()), OpenOptions::new()).unwrap();
    let listing = archive.list();

    assert_eq!(listing.len(), 3);
    assert_eq!(
        listing[0],
        FileEntry {
            name: "hello.txt".into(),
            size: 2,
            compressed_size: 2,
            flags: mpq_archive::BlockEntry::FLAG_EXISTS | mpq_archive::BlockEntry::FLAG_SINGLE_UNIT,
        }
    );
    assert!(listing[1].is_compressed());
    assert!(listing[1].compressed_size < listing[1].size);
}

#[test]
fn test_find_file() {
    let archive = Archive::from_reader(Cursor::new(sample_archive()), OpenOptions::new()).unwrap();

    let info = archive.find_file("war3map.j").unwrap().unwrap();
    assert_eq!(info.block_index, 1);
    assert_eq!(info.entry.file_size, 5000);
    assert!(info.is_compressed());
    assert!(!info.is_single_unit());
    assert_eq!(info.file_pos, 32 + 2);

    assert!(archive.find_file("missing.txt").unwrap().is_none());
}

#[test]
fn test_missing_file_is_not_found() {
    let mut archive =
        Archive::from_reader(Cursor::new(sample_archive()), OpenOptions::new()).unwrap();
    assert!(matches!(
        archive.read_file("war3map.w3e"),
        Err(Error::FileNotFound(name)) if name == "war3map.w3e"
    ));
}

#[test]
fn test_extract_all_pairs_names_with_results() {
    let mut archive =
        Archive::from_reader(Cursor::new(sample_archive()), OpenOptions::new()).unwrap();
    let results = archive.extract_all();

    let names: Vec<&str> = results.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, ["hello.txt", "war3map.j", "units\\footman.mdx"]);
    assert!(results.iter().all(|(_, result)| result.is_ok()));
}

#[test]
fn test_archive_without_listfile() {
    let bytes = ArchiveBuilder::new()
        .file("hello.txt", StoredFile::single_unit(b"hi"))
        .build();
    let mut archive = Archive::from_reader(Cursor::new(bytes), OpenOptions::new()).unwrap();

    assert!(archive.file_names().is_empty());
    assert!(archive.list().is_empty());
    assert!(archive.extract_all().is_empty());
    assert_eq!(archive.read_file("hello.txt").unwrap(), b"hi");
}

#[test]
fn test_listfile_loading_can_be_skipped() {
    let options = OpenOptions::new().load_listfile(false);
    let archive = Archive::from_reader(Cursor::new(sample_archive()), options).unwrap();
    assert!(archive.file_names().is_empty());
}

#[test]
fn test_user_data_header() {
    let bytes = ArchiveBuilder::new()
        .user_data(0x100, 0x200)
        .file("hello.txt", StoredFile::single_unit(b"hi"))
        .with_listfile()
        .build();

    let mut archive = Archive::from_reader(Cursor::new(bytes), OpenOptions::new()).unwrap();
    let user_data = archive.user_data().unwrap();
    assert_eq!(user_data.user_data_size, 0x100);
    assert_eq!(user_data.header_offset, 0x200);
    assert_eq!(archive.archive_offset(), 0x200);
    assert_eq!(archive.read_file("hello.txt").unwrap(), b"hi");
}

#[test]
fn test_search_header_behind_stub() {
    let bytes = ArchiveBuilder::new()
        .prefix(vec![0x90; 0x600])
        .file("hello.txt", StoredFile::single_unit(b"hi"))
        .build();

    let err = Archive::from_reader(Cursor::new(bytes.clone()), OpenOptions::new()).unwrap_err();
    assert!(matches!(err, Error::NotAnArchive { magic: 0x9090_9090 }));

    let options = OpenOptions::new().search_header(true);
    let mut archive = Archive::from_reader(Cursor::new(bytes), options).unwrap();
    assert_eq!(archive.archive_offset(), 0x600);
    assert_eq!(archive.read_file("hello.txt").unwrap(), b"hi");
}

#[test]
fn test_locale_preference() {
    let bytes = ArchiveBuilder::new()
        .file_with_locale("readme.txt", 0, StoredFile::single_unit(b"neutral"))
        .file_with_locale("readme.txt", 0x407, StoredFile::single_unit(b"german"))
        .build();

    let mut neutral = Archive::from_reader(Cursor::new(bytes.clone()), OpenOptions::new()).unwrap();
    assert_eq!(neutral.read_file("readme.txt").unwrap(), b"neutral");

    let mut german =
        Archive::from_reader(Cursor::new(bytes.clone()), OpenOptions::new().locale(0x407)).unwrap();
    assert_eq!(german.read_file("readme.txt").unwrap(), b"german");

    let mut french =
        Archive::from_reader(Cursor::new(bytes), OpenOptions::new().locale(0x40C)).unwrap();
    assert_eq!(french.read_file("readme.txt").unwrap(), b"neutral");
}

#[test]
fn test_scan_lookup() {
    let options = OpenOptions::new().lookup(LookupStrategy::Scan);
    let mut archive = Archive::from_reader(Cursor::new(sample_archive()), options).unwrap();
    assert_eq!(archive.read_file("hello.txt").unwrap(), b"hi");
    assert_eq!(archive.file_names().len(), 3);
}

#[test]
fn test_close_and_reopen_per_call() {
    let dir = temp_dir();
    let path = write_archive(dir.path(), "closable.mpq", &sample_archive());

    let mut archive = Archive::open(&path).unwrap();
    archive.close();
    assert!(!archive.is_open());

    assert_eq!(archive.read_file("hello.txt").unwrap(), b"hi");
    assert!(!archive.is_open());
    assert_eq!(archive.file_names().len(), 3);
}

#[test]
fn test_closed_reader_archive_cannot_reopen() {
    let mut archive =
        Archive::from_reader(Cursor::new(sample_archive()), OpenOptions::new()).unwrap();
    archive.close();

    assert!(matches!(
        archive.read_file("hello.txt"),
        Err(Error::UnableToOpen { .. })
    ));
}

#[test]
fn test_closed_archive_whose_file_vanished() {
    let dir = temp_dir();
    let path = write_archive(dir.path(), "vanishing.mpq", &sample_archive());

    let mut archive = Archive::open(&path).unwrap();
    archive.close();
    std::fs::remove_file(&path).unwrap();

    match archive.read_file("hello.txt") {
        Err(Error::UnableToOpen { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected UnableToOpen, got {other:?}"),
    }
}
