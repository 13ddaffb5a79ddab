//! cbf - binary container format
//!
//! serializes a hierarchical, typed key-value structure ("datasets") into a
//! single file. large binary payloads ("blobs") live in a contiguous
//! trailing section instead of inline, so encoding streams them by copy and
//! decoding hands back lazy byte-range handles instead of materialized
//! bytes.
//!
//! # Core concepts
//!
//! - **Dataset**: ordered key-value mapping, the container type
//! - **Value**: closed variant over the nine wire types
//! - **Blob**: out-of-line payload; a write-source before encoding, a lazy
//!   read-handle after decoding
//! - **Binary section**: trailing region holding concatenated blob payloads
//!   in encode traversal order
//!
//! # File layout
//!
//! magic `"CB" + version` | recursive metadata block | binary section
//!
//! all integers little-endian; blobs are referenced from the metadata block
//! by absolute offset and size.
//!
//! # Example usage
//!
//! ```no_run
//! use cbf::{Blob, BytesSource, Dataset, Value};
//!
//! // build and encode a dataset
//! let mut dataset = Dataset::new();
//! dataset.insert("answer", 42i64);
//! dataset.insert("payload", Blob::from(BytesSource::from(&b"abcd"[..])));
//!
//! let mut out = std::fs::File::create("data.cbf").unwrap();
//! cbf::encode(&dataset, &mut out).unwrap();
//!
//! // decode it back; blob bytes are read lazily, by range
//! let decoded = cbf::decode(std::fs::File::open("data.cbf").unwrap()).unwrap();
//! let blob = decoded.get("payload").and_then(Value::as_blob).unwrap();
//! let head = blob.as_handle().unwrap().read(2, 0).unwrap();
//! assert_eq!(head, b"ab");
//! ```

mod blob;
mod dataset;
mod error;

pub mod archive;
pub mod codec;

pub use blob::{Blob, BlobHandle, BlobSource, BytesSource, FileSource, ReadSeek, SharedStream};
pub use codec::{block_size, decode, decode_shared, encode, FORMAT_VERSION, MAGIC, MAX_KEY_LEN};
pub use dataset::{Dataset, Value};
pub use error::{Error, Result};
