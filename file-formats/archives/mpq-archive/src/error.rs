//! Error types for the MPQ reader

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for MPQ operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for MPQ operations
#[derive(Error, Debug)]
pub enum Error {
    /// The backing file could not be opened
    #[error("Unable to open {}: {source}", path.display())]
    UnableToOpen {
        /// Path that was requested
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: io::Error,
    },

    /// The leading magic is not a recognized MPQ signature
    #[error("Not an MPQ archive (magic {magic:08X})")]
    NotAnArchive {
        /// The magic value that was found
        magic: u32,
    },

    /// Size, offset or index fields are inconsistent with the archive contents
    #[error("Corrupt archive: {0}")]
    CorruptArchive(String),

    /// File not found in archive
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Compression tag without a decoder
    #[error("Unsupported compression codec: 0x{0:02X}")]
    UnsupportedCodec(u8),

    /// A codec rejected its input or produced the wrong amount of output
    #[error("{codec} decompression failed: {reason}")]
    DecompressionFailed {
        /// Codec name
        codec: &'static str,
        /// Status reported by the codec
        reason: String,
    },

    /// The file payload is encrypted
    #[error("Encrypted file payloads are not supported: {0}")]
    EncryptionUnsupported(String),

    /// Sector checksum mismatch under strict verification
    #[error("Checksum mismatch for {file} sector {sector}: expected {expected:08x}, got {actual:08x}")]
    ChecksumMismatch {
        /// File name
        file: String,
        /// Sector index
        sector: usize,
        /// Stored checksum
        expected: u32,
        /// Computed checksum
        actual: u32,
    },

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Create a new CorruptArchive error
    pub fn corrupt<S: Into<String>>(msg: S) -> Self {
        Error::CorruptArchive(msg.into())
    }

    /// Create a new DecompressionFailed error
    pub fn decompression<S: Into<String>>(codec: &'static str, reason: S) -> Self {
        Error::DecompressionFailed {
            codec,
            reason: reason.into(),
        }
    }

    /// Map an I/O error raised while reading archive structures.
    ///
    /// Running out of bytes means the archive declares more data than it has,
    /// which is reported as corruption rather than a transport failure.
    pub fn from_read(err: io::Error, what: &str) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            Error::CorruptArchive(format!("truncated {what}"))
        } else {
            Error::Io(err)
        }
    }

    /// Check if this error indicates the archive is corrupted
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Error::CorruptArchive(_)
                | Error::ChecksumMismatch { .. }
                | Error::DecompressionFailed { .. }
        )
    }

    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::FileNotFound(_) | Error::UnsupportedCodec(_) | Error::EncryptionUnsupported(_)
        )
    }
}
