//! BZip2 decompression

use crate::{Error, Result};
use bzip2::read::BzDecoder;
use std::io::Read;

/// Decompress a bzip2 stream into exactly `expected_size` bytes, reading at
/// most one byte past it
pub fn decompress(data: &[u8], expected_size: usize) -> Result<Vec<u8>> {
    let mut decoder = BzDecoder::new(data).take(expected_size as u64 + 1);
    let mut decompressed = Vec::with_capacity(expected_size);

    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| Error::decompression("bzip2", e.to_string()))?;

    if decompressed.len() != expected_size {
        return Err(Error::decompression(
            "bzip2",
            format!(
                "size mismatch: expected {expected_size}, got {}",
                decompressed.len()
            ),
        ));
    }

    Ok(decompressed)
}
