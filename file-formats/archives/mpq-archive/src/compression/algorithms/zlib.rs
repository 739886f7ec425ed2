//! Zlib decompression

use crate::debug::hex_string;
use crate::{Error, Result};
use flate2::read::ZlibDecoder;
use std::io::Read;

/// Decompress a zlib stream into exactly `expected_size` bytes.
///
/// Output is capped one byte past `expected_size`, so an oversized stream
/// fails without being inflated in full.
pub fn decompress(data: &[u8], expected_size: usize) -> Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(data).take(expected_size as u64 + 1);
    let mut decompressed = Vec::with_capacity(expected_size);

    if let Err(e) = decoder.read_to_end(&mut decompressed) {
        log::debug!("Zlib decompression failed: {e}");
        log::trace!("Input starts with {}", hex_string(data, 16));
        return Err(Error::decompression("zlib", e.to_string()));
    }

    if decompressed.len() != expected_size {
        return Err(Error::decompression(
            "zlib",
            format!(
                "size mismatch: expected {expected_size}, got {}",
                decompressed.len()
            ),
        ));
    }

    Ok(decompressed)
}
