//! Codec implementations
//!
//! Each codec is a pure function from compressed bytes and the expected
//! output length to the decoded bytes.

pub mod bzip2;
pub mod zlib;
