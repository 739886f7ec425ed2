//! Decompression for MPQ file data
//!
//! A compressed sector or single-unit file starts with a one-byte codec tag.
//! This reader supports the store (0), zlib (0x02) and bzip2 (0x10) tags; any
//! other tag is rejected with [`Error::UnsupportedCodec`](crate::Error).

pub mod algorithms;
mod decompress;
mod methods;

pub use decompress::decompress;
pub use methods::{Codec, flags};
