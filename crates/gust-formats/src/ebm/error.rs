//! Error types for the EBM message table format

use thiserror::Error;

/// Errors that can occur when parsing or building EBM tables
#[derive(Debug, Error)]
pub enum EbmError {
    /// Declared message count can't fit in the data
    #[error("Invalid number of entries: {count} messages need at least {required} bytes, got {actual}")]
    InvalidMessageCount {
        /// Declared message count
        count: i32,
        /// Minimum size for that many messages
        required: usize,
        /// Actual data size
        actual: usize,
    },

    /// Data ended inside a record
    #[error("Truncated data in message {index}: need {needed} bytes at offset {offset:#x}")]
    Truncated {
        /// Record index
        index: usize,
        /// Offset of the failed read
        offset: usize,
        /// Bytes needed
        needed: usize,
    },

    /// Record type above the range seen in tables without extension words
    #[error("Unexpected header type {kind:#010x} in message {index}")]
    UnexpectedType {
        /// Record index
        index: usize,
        /// Type found
        kind: u32,
    },

    /// String length field is zero or above the maximum
    #[error("Unexpected string size {length} in message {index}")]
    InvalidStringLength {
        /// Record index
        index: usize,
        /// Length found
        length: u32,
    },

    /// A record disagrees with the header size established by earlier ones
    #[error("Unexpected header size in message {index} (got {found}, expected {expected})")]
    HeaderSizeMismatch {
        /// Record index
        index: usize,
        /// Header size established by the first record
        expected: u32,
        /// Header size implied by this record
        found: u32,
    },

    /// One unread word is left over per record, as in a table with
    /// extension words
    #[error("{trailing} trailing bytes after {count} messages")]
    UnreadExtensions {
        /// Number of records read
        count: usize,
        /// Bytes left after the last record
        trailing: usize,
    },

    /// Message text is not valid UTF-8
    #[error("Message {index} is not valid UTF-8: {source}")]
    InvalidUtf8 {
        /// Record index
        index: usize,
        /// Underlying conversion error
        #[source]
        source: std::string::FromUtf8Error,
    },

    /// Declared message count doesn't match the number of messages
    #[error("Number of messages doesn't match the array size: declared {declared}, found {actual}")]
    CountMismatch {
        /// Declared count (sign stripped)
        declared: u32,
        /// Number of messages present
        actual: usize,
    },

    /// Message text can't be encoded within the length limit
    #[error("Message {index} is too long: {length} bytes (maximum {max})")]
    StringTooLong {
        /// Record index
        index: usize,
        /// Encoded length including the terminator
        length: usize,
        /// Maximum encoded length
        max: u32,
    },

    /// Message text contains a NUL byte
    #[error("Message {index} contains a NUL character")]
    EmbeddedNul {
        /// Record index
        index: usize,
    },

    /// Unsupported header size value in a manifest
    #[error("Unsupported header size {0} (expected 9 or 11)")]
    UnsupportedHeaderSize(u32),

    /// Manifest (de)serialization error
    #[error("Manifest error: {0}")]
    Manifest(#[from] serde_json::Error),

    /// Binary write error
    #[error("Binary write error: {0}")]
    BinWrite(String),

    /// IO error during parsing or building
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<binrw::Error> for EbmError {
    fn from(e: binrw::Error) -> Self {
        Self::BinWrite(e.to_string())
    }
}

impl EbmError {
    /// Whether this error may come from guessing the wrong variant, and so
    /// justifies a restart with extension words enabled
    pub fn is_layout_anomaly(&self) -> bool {
        matches!(
            self,
            Self::Truncated { .. }
                | Self::UnexpectedType { .. }
                | Self::InvalidStringLength { .. }
                | Self::HeaderSizeMismatch { .. }
                | Self::UnreadExtensions { .. }
        )
    }
}

/// Result type alias for EBM operations
pub type Result<T> = std::result::Result<T, EbmError>;
