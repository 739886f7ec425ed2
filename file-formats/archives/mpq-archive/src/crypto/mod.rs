//! Cryptographic primitives for MPQ archives
//!
//! MPQ uses one precomputed 1280-word table for two jobs:
//!
//! - **Hashing**: [`hash_string`] derives the table-offset hash, the two name
//!   hashes stored in every hash table entry, and the keys used to decrypt the
//!   hash and block tables.
//! - **Decryption**: [`decrypt_block`] reverses the stream cipher applied to the
//!   hash and block tables.
//!
//! ```
//! use mpq_archive::crypto::{hash_string, hash_type};
//!
//! let key = hash_string("(hash table)", hash_type::FILE_KEY);
//! assert_eq!(key, 0xC3AF3770);
//! ```

mod decryption;
mod encryption;
mod hash;
mod keys;
mod types;

pub use decryption::{decrypt_block, decrypt_bytes};
pub use encryption::{encrypt_block, encrypt_bytes};
pub use hash::{hash_string, table_key};
pub use keys::{ENCRYPTION_TABLE, generate_encryption_table};
pub use types::hash_type;
