//! the cbf wire codec
//!
//! a file is a 3-byte magic, one recursive metadata block, then the binary
//! section: every blob payload concatenated in encode traversal order.
//! encoding runs three passes over the same tree (size, metadata, payloads);
//! decoding is a single pass that leaves blob payloads unread.

mod decode;
mod encode;
mod size;

pub use decode::{decode, decode_shared};
pub use encode::encode;
pub use size::block_size;

use crate::error::{Error, Result};

/// format version byte, the third byte of the magic
pub const FORMAT_VERSION: u8 = b'A';

/// file magic: "CB" plus the version byte
pub const MAGIC: [u8; 3] = [b'C', b'B', FORMAT_VERSION];

/// maximum encoded key length in bytes
pub const MAX_KEY_LEN: usize = 65535;

/// wire type tags
///
/// the decoder accepts the full set; the encoder never emits `UInt`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub(crate) enum Tag {
    Null = 0x00,
    Blob = 0x01,
    Dataset = 0x02,
    String = 0x03,
    Int = 0x04,
    UInt = 0x05,
    Float = 0x06,
    Bytes = 0x07,
    Bool = 0x08,
}

impl Tag {
    pub(crate) fn from_u8(byte: u8) -> Option<Tag> {
        match byte {
            0x00 => Some(Tag::Null),
            0x01 => Some(Tag::Blob),
            0x02 => Some(Tag::Dataset),
            0x03 => Some(Tag::String),
            0x04 => Some(Tag::Int),
            0x05 => Some(Tag::UInt),
            0x06 => Some(Tag::Float),
            0x07 => Some(Tag::Bytes),
            0x08 => Some(Tag::Bool),
            _ => None,
        }
    }
}

/// validate a key for encoding: ascii only, length within the 16-bit frame
pub(crate) fn validate_key(key: &str) -> Result<()> {
    if !key.is_ascii() {
        return Err(Error::KeyNotAscii(key.to_string()));
    }
    if key.len() > MAX_KEY_LEN {
        return Err(Error::KeyTooLong(key.len()));
    }
    Ok(())
}
