//! In-memory simulation of a FAT32-style cluster-chain filesystem: a
//! fixed-size virtual disk split into a File Allocation Table and a data
//! region of clusters, with a directory layer storing 8.3 short-name
//! entries atop stream I/O over cluster chains.

pub mod clock;
pub mod disk;
pub mod dir;
pub mod engine;
pub mod entry;
pub mod error;
pub mod name;
pub mod stream;

pub use disk::ClusterAddress;
pub use engine::Engine;
pub use entry::{Attributes, DirEntry};
pub use error::{DirError, SeekError};
pub use stream::{FileStream, Whence};
