use crate::blob::{Blob, BlobHandle};

/// a typed value held by a dataset entry
///
/// closed over exactly the nine wire cases; codec code matches it
/// exhaustively so a new kind is a compile-time-visible change.
#[derive(Debug)]
pub enum Value {
    Null,
    Blob(Blob),
    Dataset(Dataset),
    String(String),
    Int(i64),
    /// decode-only: the decoder accepts tag 0x05, the encoder never emits it
    UInt(u64),
    Float(f64),
    Bytes(Vec<u8>),
    Bool(bool),
}

impl Value {
    /// get the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Blob(_) => "blob",
            Value::Dataset(_) => "dataset",
            Value::String(_) => "string",
            Value::Int(_) => "int64",
            Value::UInt(_) => "uint64",
            Value::Float(_) => "float64",
            Value::Bytes(_) => "bytes",
            Value::Bool(_) => "bool",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_blob(&self) -> Option<&Blob> {
        match self {
            Value::Blob(blob) => Some(blob),
            _ => None,
        }
    }

    pub fn as_dataset(&self) -> Option<&Dataset> {
        match self {
            Value::Dataset(dataset) => Some(dataset),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::UInt(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<Dataset> for Value {
    fn from(v: Dataset) -> Self {
        Value::Dataset(v)
    }
}

impl From<Blob> for Value {
    fn from(v: Blob) -> Self {
        Value::Blob(v)
    }
}

impl From<BlobHandle> for Value {
    fn from(v: BlobHandle) -> Self {
        Value::Blob(Blob::Handle(v))
    }
}

/// an ordered key-value mapping, the format's container type
///
/// keys are unique; insertion order is preserved and fixes the on-disk
/// traversal order. re-inserting an existing key replaces its value in
/// place without moving the entry.
#[derive(Debug, Default)]
pub struct Dataset {
    entries: Vec<(String, Value)>,
}

impl Dataset {
    /// create an empty dataset
    pub fn new() -> Self {
        Self::default()
    }

    /// insert or replace an entry
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// look up an entry by key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// is the dataset empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// iterate over entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob::BytesSource;

    #[test]
    fn test_insertion_order_preserved() {
        let mut d = Dataset::new();
        d.insert("zebra", 1i64);
        d.insert("alpha", 2i64);
        d.insert("mango", 3i64);

        let keys: Vec<_> = d.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["zebra", "alpha", "mango"]);
    }

    #[test]
    fn test_reinsert_replaces_in_place() {
        let mut d = Dataset::new();
        d.insert("a", 1i64);
        d.insert("b", 2i64);
        d.insert("a", 10i64);

        assert_eq!(d.len(), 2);
        assert_eq!(d.get("a").and_then(Value::as_i64), Some(10));

        let keys: Vec<_> = d.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn test_get_missing() {
        let d = Dataset::new();
        assert!(d.get("nothing").is_none());
        assert!(d.is_empty());
    }

    #[test]
    fn test_value_conversions() {
        let mut d = Dataset::new();
        d.insert("int", 42i64);
        d.insert("float", 1.5f64);
        d.insert("flag", true);
        d.insert("name", "cbf");
        d.insert("raw", vec![1u8, 2, 3]);
        d.insert("nothing", Value::Null);
        d.insert("blob", Blob::from(BytesSource::from(&b"xy"[..])));

        assert_eq!(d.get("int").and_then(Value::as_i64), Some(42));
        assert_eq!(d.get("float").and_then(Value::as_f64), Some(1.5));
        assert_eq!(d.get("flag").and_then(Value::as_bool), Some(true));
        assert_eq!(d.get("name").and_then(Value::as_str), Some("cbf"));
        assert_eq!(d.get("raw").and_then(Value::as_bytes), Some(&[1u8, 2, 3][..]));
        assert!(d.get("nothing").is_some_and(Value::is_null));
        assert_eq!(d.get("blob").and_then(Value::as_blob).map(Blob::len), Some(2));
    }

    #[test]
    fn test_nested_dataset() {
        let mut inner = Dataset::new();
        inner.insert("flag", false);

        let mut outer = Dataset::new();
        outer.insert("sub", inner);

        let sub = outer.get("sub").and_then(Value::as_dataset).unwrap();
        assert_eq!(sub.get("flag").and_then(Value::as_bool), Some(false));
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Value::Null.type_name(), "null");
        assert_eq!(Value::Int(0).type_name(), "int64");
        assert_eq!(Value::UInt(0).type_name(), "uint64");
        assert_eq!(Value::from("x").type_name(), "string");
        assert_eq!(Value::from(Dataset::new()).type_name(), "dataset");
    }
}
