//! Error types for PAK operations

use crate::bytes::ByteTableError;
use std::path::PathBuf;
use thiserror::Error;

/// PAK operation result type
pub type PakResult<T> = Result<T, PakError>;

/// Errors that abort reading or unpacking a PAK archive
#[derive(Debug, Error)]
pub enum PakError {
    /// The archive file could not be loaded
    #[error(transparent)]
    Load(#[from] ByteTableError),

    /// Archive is shorter than the fixed header
    #[error("Truncated header: expected {expected} bytes, got {actual} bytes")]
    TruncatedHeader {
        /// Header size in bytes
        expected: usize,
        /// Bytes available
        actual: usize,
    },

    /// Archive declares no entries, so the entry layout can't be detected
    #[error("Archive has no entries")]
    NoEntries,

    /// Neither entry layout fits in the archive
    #[error("Truncated entry table: {entry_count} entries don't fit in {available} bytes")]
    TruncatedTable {
        /// Declared entry count
        entry_count: u32,
        /// Bytes available after the header
        available: usize,
    },

    /// Entry payload lies outside the archive
    #[error("Can't read payload of '{name}': {length} bytes at offset {offset:#x} exceed archive size {archive_size:#x}")]
    TruncatedPayload {
        /// Decoded entry name
        name: String,
        /// Absolute payload offset
        offset: u64,
        /// Payload length
        length: u32,
        /// Archive size in bytes
        archive_size: usize,
    },

    /// Decoded entry name doesn't map to a path below the output directory
    #[error("Unsafe entry path: '{0}'")]
    UnsafePath(String),

    /// An existing path is in the way of an output directory
    #[error("'{0}' exists but isn't a directory")]
    NotADirectory(PathBuf),

    /// Binary parsing error
    #[error("Binary parsing error: {0}")]
    BinRead(String),

    /// Manifest serialization error
    #[error("Manifest error: {0}")]
    Manifest(#[from] serde_json::Error),

    /// IO error while writing extracted files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<binrw::Error> for PakError {
    fn from(e: binrw::Error) -> Self {
        Self::BinRead(e.to_string())
    }
}
