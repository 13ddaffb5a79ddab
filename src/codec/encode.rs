use std::io::Write;

use byteorder::{WriteBytesExt, LE};

use crate::codec::{block_size, Tag, MAGIC};
use crate::dataset::{Dataset, Value};
use crate::error::{Error, Result};

/// encode a dataset to an output stream
///
/// three passes over the same tree: size calculation, metadata block with
/// predicted blob offsets, then the binary section with the payload bytes.
/// the tree (including every blob's declared length) must not change for
/// the duration of the call; offsets are predicted from the size pass and
/// mutation between passes silently corrupts them.
///
/// partial output on failure is not rolled back; the caller owns cleanup.
pub fn encode<W: Write>(dataset: &Dataset, writer: &mut W) -> Result<()> {
    // the binary section starts right after the magic and the root block
    let binary_start = MAGIC.len() as u64 + block_size(dataset)?;

    writer.write_all(&MAGIC)?;
    encode_block(dataset, writer, binary_start)?;
    write_binary_section(dataset, writer)?;

    Ok(())
}

/// write one metadata block, threading the running binary-section offset
///
/// for each blob the current offset becomes the blob's recorded location
/// and the offset advances by its declared length. returns the offset after
/// all blobs in this subtree, so sibling entries continue from it.
fn encode_block<W: Write>(
    dataset: &Dataset,
    writer: &mut W,
    mut binary_offset: u64,
) -> Result<u64> {
    writer.write_u64::<LE>(dataset.len() as u64)?;

    for (key, value) in dataset.iter() {
        // keys were validated by the size pass, so the cast cannot truncate
        writer.write_u16::<LE>(key.len() as u16)?;
        writer.write_all(key.as_bytes())?;

        match value {
            Value::Null => {
                writer.write_u8(Tag::Null as u8)?;
            }
            Value::Blob(blob) => {
                writer.write_u8(Tag::Blob as u8)?;
                writer.write_u64::<LE>(binary_offset)?;
                let len = blob.len();
                writer.write_u64::<LE>(len)?;
                binary_offset += len;
            }
            Value::Dataset(nested) => {
                writer.write_u8(Tag::Dataset as u8)?;
                binary_offset = encode_block(nested, writer, binary_offset)?;
            }
            Value::String(s) => {
                writer.write_u8(Tag::String as u8)?;
                writer.write_u64::<LE>(s.len() as u64)?;
                writer.write_all(s.as_bytes())?;
            }
            Value::Int(v) => {
                writer.write_u8(Tag::Int as u8)?;
                writer.write_i64::<LE>(*v)?;
            }
            Value::UInt(_) => {
                return Err(Error::UnsupportedValue("uint64 values are decode-only"))
            }
            Value::Float(v) => {
                writer.write_u8(Tag::Float as u8)?;
                writer.write_f64::<LE>(*v)?;
            }
            Value::Bytes(b) => {
                writer.write_u8(Tag::Bytes as u8)?;
                writer.write_u64::<LE>(b.len() as u64)?;
                writer.write_all(b)?;
            }
            Value::Bool(v) => {
                writer.write_u8(Tag::Bool as u8)?;
                writer.write_u8(if *v { 0xff } else { 0x00 })?;
            }
        }
    }

    Ok(binary_offset)
}

/// stream every blob payload, in the same depth-first entry order the
/// metadata pass assigned offsets in
fn write_binary_section<W: Write>(dataset: &Dataset, writer: &mut W) -> Result<()> {
    for (_, value) in dataset.iter() {
        match value {
            Value::Blob(blob) => {
                blob.write_to(writer)?;
            }
            Value::Dataset(nested) => {
                write_binary_section(nested, writer)?;
            }
            _ => {}
        }
    }
    Ok(())
}
