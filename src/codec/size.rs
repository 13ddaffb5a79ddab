use crate::codec::validate_key;
use crate::dataset::{Dataset, Value};
use crate::error::{Error, Result};

/// compute the exact encoded size of a dataset's metadata block
///
/// excludes blob payload bytes, which live in the trailing binary section.
/// the encoder uses this to predict where the binary section starts before
/// writing anything.
pub fn block_size(dataset: &Dataset) -> Result<u64> {
    // entry count field
    let mut size = 8u64;

    for (key, value) in dataset.iter() {
        validate_key(key)?;

        // type tag plus key framing
        size += 1 + 2 + key.len() as u64;

        size += match value {
            Value::Null => 0,
            Value::Blob(_) => 16,
            Value::Dataset(nested) => block_size(nested)?,
            Value::String(s) => 8 + s.len() as u64,
            Value::Int(_) => 8,
            Value::UInt(_) => {
                return Err(Error::UnsupportedValue("uint64 values are decode-only"))
            }
            Value::Float(_) => 8,
            Value::Bytes(b) => 8 + b.len() as u64,
            Value::Bool(_) => 1,
        };
    }

    Ok(size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob::{Blob, BytesSource};
    use crate::codec::MAX_KEY_LEN;

    #[test]
    fn test_empty_dataset() {
        assert_eq!(block_size(&Dataset::new()).unwrap(), 8);
    }

    #[test]
    fn test_per_type_sizes() {
        // each entry adds 1 (tag) + 2 + key_len (framing) + payload
        let cases: [(Value, u64); 7] = [
            (Value::Null, 0),
            (Value::Blob(Blob::from(BytesSource::from(&b"xxxx"[..]))), 16),
            (Value::String("hi".into()), 8 + 2),
            (Value::Int(-5), 8),
            (Value::Float(2.5), 8),
            (Value::Bytes(vec![0; 5]), 8 + 5),
            (Value::Bool(true), 1),
        ];

        for (value, payload) in cases {
            let mut d = Dataset::new();
            d.insert("k", value);
            assert_eq!(block_size(&d).unwrap(), 8 + 1 + 2 + 1 + payload);
        }
    }

    #[test]
    fn test_nested_dataset_size() {
        let mut inner = Dataset::new();
        inner.insert("flag", true);

        let mut outer = Dataset::new();
        outer.insert("sub", inner);

        // inner block: 8 + (1 + 2 + 4 + 1) = 16
        // outer: 8 + (1 + 2 + 3) + 16 = 30
        assert_eq!(block_size(&outer).unwrap(), 30);
    }

    #[test]
    fn test_key_length_boundary() {
        let mut d = Dataset::new();
        d.insert("k".repeat(MAX_KEY_LEN), Value::Null);
        assert_eq!(
            block_size(&d).unwrap(),
            8 + 1 + 2 + MAX_KEY_LEN as u64
        );

        let mut d = Dataset::new();
        d.insert("k".repeat(MAX_KEY_LEN + 1), Value::Null);
        assert!(matches!(block_size(&d), Err(Error::KeyTooLong(_))));
    }

    #[test]
    fn test_uint_rejected() {
        let mut d = Dataset::new();
        d.insert("u", Value::UInt(1));
        assert!(matches!(block_size(&d), Err(Error::UnsupportedValue(_))));
    }

    #[test]
    fn test_non_ascii_key_rejected() {
        let mut d = Dataset::new();
        d.insert("clé", Value::Null);
        assert!(matches!(block_size(&d), Err(Error::KeyNotAscii(_))));
    }

    #[test]
    fn test_utf8_string_counts_bytes() {
        let mut d = Dataset::new();
        // 2 chars, 4 utf-8 bytes
        d.insert("s", "é€".to_string());
        let s_bytes = "é€".len() as u64;
        assert_eq!(block_size(&d).unwrap(), 8 + 1 + 2 + 1 + 8 + s_bytes);
    }
}
