//! Hash and block tables decoded from encrypted bytes

use mpq_archive::crypto::{encrypt_bytes, hash_string, hash_type, table_key};
use mpq_archive::{BlockEntry, BlockTable, HashEntry, HashTable, LookupStrategy};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::collections::BTreeSet;

fn insert(entries: &mut [HashEntry], name: &str, block_index: u32) {
    let size = entries.len();
    let mut index = hash_string(name, hash_type::TABLE_OFFSET) as usize % size;
    while !entries[index].is_empty() {
        index = (index + 1) % size;
    }
    entries[index] = HashEntry::for_file(name, 0, block_index);
}

fn encrypted(entries: &[[u8; 16]], key_name: &str) -> Vec<u8> {
    let mut bytes: Vec<u8> = entries.iter().flatten().copied().collect();
    encrypt_bytes(&mut bytes, table_key(key_name));
    bytes
}

#[test]
fn test_hash_table_from_encrypted_bytes() {
    let mut entries = vec![HashEntry::empty(); 8];
    insert(&mut entries, "war3map.j", 0);
    insert(&mut entries, "(listfile)", 1);

    let raw: Vec<[u8; 16]> = entries.iter().map(HashEntry::to_bytes).collect();
    let table = HashTable::from_bytes(&encrypted(&raw, "(hash table)"), 8).unwrap();

    assert_eq!(table.entries(), entries.as_slice());
    assert_eq!(table.find_file("war3map.j", 0).unwrap().1.block_index, 0);
    assert_eq!(table.find_file("WAR3MAP.J", 0).unwrap().1.block_index, 0);
    assert!(table.find_file("war3map.w3e", 0).is_none());
}

#[test]
fn test_block_table_from_encrypted_bytes() {
    let entries = vec![
        BlockEntry {
            file_pos: 0x20,
            compressed_size: 2,
            file_size: 2,
            flags: BlockEntry::FLAG_EXISTS | BlockEntry::FLAG_SINGLE_UNIT,
        },
        BlockEntry {
            file_pos: 0x22,
            compressed_size: 100,
            file_size: 1000,
            flags: BlockEntry::FLAG_EXISTS | BlockEntry::FLAG_COMPRESS,
        },
    ];

    let raw: Vec<[u8; 16]> = entries.iter().map(BlockEntry::to_bytes).collect();
    let table = BlockTable::from_bytes(&encrypted(&raw, "(block table)"), 2).unwrap();
    assert_eq!(table.entries(), entries.as_slice());
}

#[test]
fn test_short_table_data() {
    assert!(HashTable::from_bytes(&[0u8; 20], 2).unwrap_err().is_corruption());
    assert!(BlockTable::from_bytes(&[0u8; 15], 1).unwrap_err().is_corruption());
}

#[test]
fn test_probe_stops_at_never_used_slot() {
    let mut entries = vec![HashEntry::empty(); 4];
    insert(&mut entries, "a.txt", 0);
    let table = HashTable::from_entries(entries.clone());

    let start = hash_string("a.txt", hash_type::TABLE_OFFSET) as usize % 4;
    let mut moved = vec![HashEntry::empty(); 4];
    moved[(start + 2) % 4] = HashEntry::for_file("a.txt", 0, 0);
    let gapped = HashTable::from_entries(moved);

    assert!(table.lookup("a.txt", 0, LookupStrategy::Probe).is_some());
    assert!(gapped.lookup("a.txt", 0, LookupStrategy::Probe).is_none());
    assert!(gapped.lookup("a.txt", 0, LookupStrategy::Scan).is_some());
}

proptest! {
    #[test]
    fn prop_every_inserted_name_is_found(
        names in proptest::collection::btree_set("[a-z0-9\\\\]{1,16}\\.[a-z]{3}", 1..40),
        absent in "[A-Z]{20}\\.bin",
    ) {
        let names: BTreeSet<String> = names;
        let size = (names.len() * 2).next_power_of_two();
        let mut entries = vec![HashEntry::empty(); size];
        for (i, name) in names.iter().enumerate() {
            insert(&mut entries, name, i as u32);
        }
        let table = HashTable::from_entries(entries);

        for (i, name) in names.iter().enumerate() {
            for strategy in [LookupStrategy::Probe, LookupStrategy::Scan] {
                let (_, entry) = table.lookup(name, 0, strategy).unwrap();
                prop_assert_eq!(entry.block_index, i as u32);
            }
        }
        prop_assert!(table.lookup(&absent, 0, LookupStrategy::Probe).is_none());
        prop_assert!(table.lookup(&absent, 0, LookupStrategy::Scan).is_none());
    }
}
