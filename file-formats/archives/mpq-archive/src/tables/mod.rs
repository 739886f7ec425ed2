//! MPQ table structures (hash and block)

mod block;
mod common;
mod hash;

pub use block::{BlockEntry, BlockTable};
pub use hash::{HashEntry, HashTable, LookupStrategy};

/// Size in bytes of one hash or block table record
pub const TABLE_ENTRY_SIZE: usize = 16;
