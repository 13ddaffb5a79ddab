use std::cell::RefCell;
use std::fmt;
use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::error::{Error, IoResultExt, Result};

/// buffer size for chunked blob copies
pub(crate) const COPY_CHUNK: u64 = 64 * 1024;

/// readable + seekable stream, the backing for decoded blobs
pub trait ReadSeek: Read + Seek {}

impl<T: Read + Seek> ReadSeek for T {}

/// a stream shared between all blob handles produced by one decode call
///
/// the stream carries a single seek cursor, so handles must not be read
/// concurrently. `Rc<RefCell<_>>` makes this structural: handles are not
/// `Send`, and reentrant reads panic instead of returning interleaved bytes.
/// callers that need parallel readers open one stream per reader.
pub type SharedStream = Rc<RefCell<dyn ReadSeek>>;

/// a write-source blob: knows its byte length and can stream its bytes once
///
/// the reported length must stay accurate for the duration of an encode
/// call; the encoder predicts blob offsets from it before any payload byte
/// is written.
pub trait BlobSource {
    /// declared payload length in bytes
    fn len(&self) -> u64;

    /// stream the payload bytes into the sink, returning the count written
    fn copy_to(&self, sink: &mut dyn Write) -> Result<u64>;
}

/// a write-source blob backed by a file on disk
///
/// the length is captured from metadata at construction; the file must not
/// change between construction and encoding, or blob offsets in the output
/// will not match the payload bytes.
pub struct FileSource {
    path: PathBuf,
    len: u64,
}

impl FileSource {
    /// create a file source, capturing the file's current length
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let meta = fs::metadata(&path).with_path(&path)?;
        Ok(Self {
            len: meta.len(),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BlobSource for FileSource {
    fn len(&self) -> u64 {
        self.len
    }

    fn copy_to(&self, sink: &mut dyn Write) -> Result<u64> {
        let mut file = File::open(&self.path).with_path(&self.path)?;
        let written = io::copy(&mut file, sink).with_path(&self.path)?;
        Ok(written)
    }
}

/// a write-source blob over an in-memory byte buffer
pub struct BytesSource(Vec<u8>);

impl BytesSource {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }
}

impl From<Vec<u8>> for BytesSource {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for BytesSource {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl BlobSource for BytesSource {
    fn len(&self) -> u64 {
        self.0.len() as u64
    }

    fn copy_to(&self, sink: &mut dyn Write) -> Result<u64> {
        sink.write_all(&self.0)?;
        Ok(self.0.len() as u64)
    }
}

/// a read-handle blob produced by decoding
///
/// references a shared stream plus an absolute offset and size; payload
/// bytes are only read when explicitly requested. the handle keeps the
/// stream alive but never owns it exclusively.
#[derive(Clone)]
pub struct BlobHandle {
    stream: SharedStream,
    location: u64,
    size: u64,
}

impl BlobHandle {
    pub(crate) fn new(stream: SharedStream, location: u64, size: u64) -> Self {
        Self {
            stream,
            location,
            size,
        }
    }

    /// declared payload size in bytes
    pub fn size(&self) -> u64 {
        self.size
    }

    /// absolute file offset of the payload
    pub fn location(&self) -> u64 {
        self.location
    }

    /// read `length` bytes starting at `offset` within the blob
    pub fn read(&self, length: u64, offset: u64) -> Result<Vec<u8>> {
        let end = offset.checked_add(length).ok_or(Error::OutOfRange {
            offset,
            length,
            size: self.size,
        })?;
        if end > self.size {
            return Err(Error::OutOfRange {
                offset,
                length,
                size: self.size,
            });
        }

        let mut stream = self.stream.borrow_mut();
        stream.seek(SeekFrom::Start(self.location + offset))?;
        let mut buf = vec![0u8; length as usize];
        stream.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// read the entire blob
    pub fn read_all(&self) -> Result<Vec<u8>> {
        self.read(self.size, 0)
    }

    /// stream the blob into a sink with chunked ranged reads
    pub fn copy_to(&self, sink: &mut dyn Write) -> Result<u64> {
        let mut written = 0u64;
        while written < self.size {
            let chunk = COPY_CHUNK.min(self.size - written);
            let buf = self.read(chunk, written)?;
            sink.write_all(&buf)?;
            written += chunk;
        }
        Ok(written)
    }
}

impl fmt::Debug for BlobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlobHandle")
            .field("location", &self.location)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

/// a blob value: a write-source before encoding, a read-handle after decoding
pub enum Blob {
    Source(Box<dyn BlobSource>),
    Handle(BlobHandle),
}

impl Blob {
    /// wrap a write-source
    pub fn from_source(source: impl BlobSource + 'static) -> Self {
        Blob::Source(Box::new(source))
    }

    /// payload length in bytes
    pub fn len(&self) -> u64 {
        match self {
            Blob::Source(source) => source.len(),
            Blob::Handle(handle) => handle.size(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// stream the payload bytes into the sink
    pub fn write_to(&self, sink: &mut dyn Write) -> Result<u64> {
        match self {
            Blob::Source(source) => source.copy_to(sink),
            Blob::Handle(handle) => handle.copy_to(sink),
        }
    }

    /// the read-handle, if this blob came from a decode
    pub fn as_handle(&self) -> Option<&BlobHandle> {
        match self {
            Blob::Handle(handle) => Some(handle),
            Blob::Source(_) => None,
        }
    }
}

impl From<BlobHandle> for Blob {
    fn from(handle: BlobHandle) -> Self {
        Blob::Handle(handle)
    }
}

impl From<BytesSource> for Blob {
    fn from(source: BytesSource) -> Self {
        Blob::from_source(source)
    }
}

impl From<FileSource> for Blob {
    fn from(source: FileSource) -> Self {
        Blob::from_source(source)
    }
}

impl fmt::Debug for Blob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Blob::Source(source) => f
                .debug_struct("Blob::Source")
                .field("len", &source.len())
                .finish_non_exhaustive(),
            Blob::Handle(handle) => handle.fmt(f),
        }
    }
}
