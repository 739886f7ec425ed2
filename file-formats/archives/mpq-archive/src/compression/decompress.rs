//! Codec dispatch

use super::algorithms;
use super::methods::Codec;
use crate::{Error, Result};

/// Decompress `data` encoded with the codec named by `tag`.
///
/// The result is always exactly `expected_size` bytes; anything else is a
/// [`Error::DecompressionFailed`].
pub fn decompress(data: &[u8], tag: u8, expected_size: usize) -> Result<Vec<u8>> {
    let codec = Codec::from_tag(tag)?;

    log::debug!(
        "Decompressing {} bytes to {} bytes with {} (tag 0x{tag:02X})",
        data.len(),
        expected_size,
        codec.name()
    );

    match codec {
        Codec::Store => {
            if data.len() != expected_size {
                return Err(Error::decompression(
                    codec.name(),
                    format!("stored {} bytes, expected {expected_size}", data.len()),
                ));
            }
            Ok(data.to_vec())
        }
        Codec::Zlib => algorithms::zlib::decompress(data, expected_size),
        Codec::BZip2 => algorithms::bzip2::decompress(data, expected_size),
    }
}
