use std::cell::RefCell;
use std::io::{Read, Seek};
use std::rc::Rc;

use byteorder::{ReadBytesExt, LE};

use crate::blob::{Blob, BlobHandle, ReadSeek, SharedStream};
use crate::codec::{Tag, MAGIC};
use crate::dataset::{Dataset, Value};
use crate::error::{Error, Result};

/// decode a cbf stream into a dataset
///
/// takes ownership of the reader and shares it with every blob handle in
/// the result; blob payloads stay unread until a handle is asked for them.
pub fn decode<R>(reader: R) -> Result<Dataset>
where
    R: Read + Seek + 'static,
{
    let stream: SharedStream = Rc::new(RefCell::new(reader));
    decode_shared(&stream)
}

/// decode from an already-shared stream positioned at the file magic
///
/// useful for decoding the same stream more than once (seek back to the
/// start between calls) while existing blob handles stay valid.
pub fn decode_shared(stream: &SharedStream) -> Result<Dataset> {
    let mut reader = stream.borrow_mut();

    let mut magic = [0u8; 3];
    reader.read_exact(&mut magic)?;
    if magic != MAGIC {
        return Err(Error::InvalidFormat(format!(
            "bad magic {:02x?}, expected {:02x?}",
            magic, MAGIC
        )));
    }

    decode_block(&mut *reader, stream)
}

/// decode one metadata block, producing lazy handles for blob entries
fn decode_block(reader: &mut dyn ReadSeek, stream: &SharedStream) -> Result<Dataset> {
    let count = reader.read_u64::<LE>()?;
    let mut dataset = Dataset::new();

    for _ in 0..count {
        let key_len = reader.read_u16::<LE>()? as usize;
        let mut key_buf = vec![0u8; key_len];
        reader.read_exact(&mut key_buf)?;
        let key = match String::from_utf8(key_buf) {
            Ok(key) if key.is_ascii() => key,
            _ => return Err(Error::InvalidFormat("key is not ascii".to_string())),
        };

        let tag_byte = reader.read_u8()?;
        let tag = Tag::from_u8(tag_byte).ok_or_else(|| {
            Error::InvalidFormat(format!("unrecognized type tag {tag_byte:#04x}"))
        })?;

        let value = match tag {
            Tag::Null => Value::Null,
            Tag::Blob => {
                let location = reader.read_u64::<LE>()?;
                let size = reader.read_u64::<LE>()?;
                Value::Blob(Blob::Handle(BlobHandle::new(
                    Rc::clone(stream),
                    location,
                    size,
                )))
            }
            Tag::Dataset => Value::Dataset(decode_block(reader, stream)?),
            Tag::String => {
                let len = reader.read_u64::<LE>()? as usize;
                let mut buf = vec![0u8; len];
                reader.read_exact(&mut buf)?;
                let s = String::from_utf8(buf).map_err(|e| {
                    Error::InvalidFormat(format!("invalid utf-8 in string value: {e}"))
                })?;
                Value::String(s)
            }
            Tag::Int => Value::Int(reader.read_i64::<LE>()?),
            Tag::UInt => Value::UInt(reader.read_u64::<LE>()?),
            Tag::Float => Value::Float(reader.read_f64::<LE>()?),
            Tag::Bytes => {
                let len = reader.read_u64::<LE>()? as usize;
                let mut buf = vec![0u8; len];
                reader.read_exact(&mut buf)?;
                Value::Bytes(buf)
            }
            Tag::Bool => match reader.read_u8()? {
                0x00 => Value::Bool(false),
                0xff => Value::Bool(true),
                byte => {
                    return Err(Error::InvalidFormat(format!(
                        "invalid bool byte {byte:#04x}"
                    )))
                }
            },
        };

        dataset.insert(key, value);
    }

    Ok(dataset)
}
