//! In-memory byte table with little-endian word access
//!
//! Both container formats are small enough to be loaded whole. Offsets handed
//! to [`u32_at`] are derived from counts that were validated
//! against the table length beforehand, so an out-of-range read is a bug in
//! the caller and panics like any slice index.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur when loading a byte table
#[derive(Debug, Error)]
pub enum ByteTableError {
    /// The file could not be read
    #[error("Can't read '{path}': {source}")]
    Io {
        /// Path that failed to load
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The file exists but holds no data
    #[error("File '{0}' is empty")]
    Empty(PathBuf),
}

/// Read a little-endian `u32` at `offset`.
pub fn u32_at(bytes: &[u8], offset: usize) -> u32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(&bytes[offset..offset + 4]);
    u32::from_le_bytes(word)
}

/// Read a little-endian `i32` at `offset`.
pub fn i32_at(bytes: &[u8], offset: usize) -> i32 {
    u32_at(bytes, offset) as i32
}

/// Read a little-endian `u64` at `offset`.
pub fn u64_at(bytes: &[u8], offset: usize) -> u64 {
    let mut word = [0u8; 8];
    word.copy_from_slice(&bytes[offset..offset + 8]);
    u64::from_le_bytes(word)
}

/// A whole file held in memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteTable {
    data: Vec<u8>,
}

impl ByteTable {
    /// Load the file at `path`, failing if it can't be read or is empty
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ByteTableError> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|source| ByteTableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if data.is_empty() {
            return Err(ByteTableError::Empty(path.to_path_buf()));
        }
        tracing::debug!("Loaded {} bytes from {}", data.len(), path.display());
        Ok(Self { data })
    }

    /// Wrap bytes that are already in memory
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Checked sub-slice, `None` when `offset + len` runs past the end
    pub fn slice(&self, offset: u64, len: u64) -> Option<&[u8]> {
        let start = usize::try_from(offset).ok()?;
        let len = usize::try_from(len).ok()?;
        let end = start.checked_add(len)?;
        self.data.get(start..end)
    }

    /// Number of bytes held
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the table holds no bytes
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// All bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}
