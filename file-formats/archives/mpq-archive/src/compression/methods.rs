//! Compression method definitions and flags

use crate::{Error, Result};

/// Compression method flags as stored in the codec tag byte
pub mod flags {
    /// Data stored without compression
    pub const NONE: u8 = 0x00;
    /// Huffman encoding (WAVE files only)
    pub const HUFFMAN: u8 = 0x01;
    /// Deflate/zlib compression
    pub const ZLIB: u8 = 0x02;
    /// PKWare DCL compression
    pub const PKWARE: u8 = 0x08;
    /// BZip2 compression
    pub const BZIP2: u8 = 0x10;
    /// LZMA compression (not a flag combination)
    pub const LZMA: u8 = 0x12;
    /// Sparse/RLE compression
    pub const SPARSE: u8 = 0x20;
    /// IMA ADPCM mono
    pub const ADPCM_MONO: u8 = 0x40;
    /// IMA ADPCM stereo
    pub const ADPCM_STEREO: u8 = 0x80;
}

/// Codecs this reader can decode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    /// Payload stored verbatim
    Store,
    /// Deflate/zlib compression
    Zlib,
    /// BZip2 compression
    BZip2,
}

impl Codec {
    /// Resolve a codec tag byte
    pub fn from_tag(tag: u8) -> Result<Self> {
        match tag {
            flags::NONE => Ok(Codec::Store),
            flags::ZLIB => Ok(Codec::Zlib),
            flags::BZIP2 => Ok(Codec::BZip2),
            other => Err(Error::UnsupportedCodec(other)),
        }
    }

    /// The tag byte for this codec
    pub fn tag(self) -> u8 {
        match self {
            Codec::Store => flags::NONE,
            Codec::Zlib => flags::ZLIB,
            Codec::BZip2 => flags::BZIP2,
        }
    }

    /// Short display name
    pub fn name(self) -> &'static str {
        match self {
            Codec::Store => "none",
            Codec::Zlib => "zlib",
            Codec::BZip2 => "bzip2",
        }
    }

    /// Describe any tag byte, including the ones this reader cannot decode
    pub fn describe_tag(tag: u8) -> &'static str {
        match tag {
            flags::NONE => "none",
            flags::HUFFMAN => "huffman",
            flags::ZLIB => "zlib",
            flags::PKWARE => "pkware",
            flags::BZIP2 => "bzip2",
            flags::LZMA => "lzma",
            flags::SPARSE => "sparse",
            flags::ADPCM_MONO => "adpcm-mono",
            flags::ADPCM_STEREO => "adpcm-stereo",
            _ => "multiple",
        }
    }
}
