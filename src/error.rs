use std::path::PathBuf;

/// error type for cbf operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("key length {0} exceeds maximum of 65535 bytes")]
    KeyTooLong(usize),

    #[error("key contains non-ascii characters: {0:?}")]
    KeyNotAscii(String),

    #[error("unsupported value type: {0}")]
    UnsupportedValue(&'static str),

    #[error("invalid cbf data: {0}")]
    InvalidFormat(String),

    #[error("blob read out of range: offset {offset} + length {length} exceeds blob size {size}")]
    OutOfRange { offset: u64, length: u64, size: u64 },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("io error at {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

/// helper to wrap io errors with path context
pub trait IoResultExt<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|source| Error::File {
            path: path.into(),
            source,
        })
    }
}
