//! Error types returned by the stream and directory layers.

use thiserror::Error;

/// Errors `FileStream::seek` can return.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SeekError {
    #[error("seek origin out of range: offset {offset} from {whence:?} underflows position 0")]
    BadOrigin { whence: crate::stream::Whence, offset: i64 },
}

/// Errors the directory layer can return.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DirError {
    #[error("no entry named {0:?}")]
    NotFound(String),
    #[error("entry {0:?} is a system entry and cannot be removed")]
    Protected(String),
    #[error("entry {0:?} is not a directory")]
    NotADirectory(String),
}
