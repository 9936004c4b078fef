//! PAK archive header
//!
//! The header is a 16-byte little-endian structure:
//! - u32 version (0x20000)
//! - u32 entry count
//! - u32 header size in bytes (16)
//! - u32 flags (0x0D)
//!
//! None of these values are enforced. Archives with unexpected values are
//! still unpacked on a best-effort basis after a warning.

use binrw::{BinRead, BinWrite};
use std::fmt;

/// Expected archive version
pub const PAK_VERSION: u32 = 0x20000;

/// Expected archive flags
pub const PAK_FLAGS: u32 = 0x0D;

/// Serialized header size in bytes
pub const PAK_HEADER_SIZE: usize = 16;

/// Entry counts above this are suspicious
pub const MAX_SANE_ENTRIES: u32 = 16384;

/// PAK archive header (16 bytes, little-endian)
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead, BinWrite)]
#[br(little)]
#[bw(little)]
pub struct PakHeader {
    /// Archive version
    pub version: u32,
    /// Number of entries in the table that follows
    pub entry_count: u32,
    /// Declared header size
    pub header_size: u32,
    /// Archive flags
    pub flags: u32,
}

/// Non-fatal oddities found in a header
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PakWarning {
    /// Version, header size or flags differ from the known values
    SignatureMismatch {
        /// Version found
        version: u32,
        /// Declared header size found
        header_size: u32,
        /// Flags found
        flags: u32,
    },
    /// More entries than any known archive holds
    TooManyEntries(u32),
}

impl fmt::Display for PakWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SignatureMismatch {
                version,
                header_size,
                flags,
            } => write!(
                f,
                "Signature doesn't match expected PAK file format \
                 (version {version:#x}, header size {header_size}, flags {flags:#x})"
            ),
            Self::TooManyEntries(count) => write!(
                f,
                "More than {MAX_SANE_ENTRIES} entries ({count}), is this a supported archive?"
            ),
        }
    }
}

impl PakHeader {
    /// Create a header with the expected signature values
    pub fn new(entry_count: u32) -> Self {
        Self {
            version: PAK_VERSION,
            entry_count,
            header_size: PAK_HEADER_SIZE as u32,
            flags: PAK_FLAGS,
        }
    }

    /// Whether version, declared size and flags all match the known values
    pub fn has_expected_signature(&self) -> bool {
        self.version == PAK_VERSION
            && self.header_size == PAK_HEADER_SIZE as u32
            && self.flags == PAK_FLAGS
    }

    /// Collect the warnings this header deserves
    pub fn check(&self) -> Vec<PakWarning> {
        let mut warnings = Vec::new();
        if !self.has_expected_signature() {
            warnings.push(PakWarning::SignatureMismatch {
                version: self.version,
                header_size: self.header_size,
                flags: self.flags,
            });
        }
        if self.entry_count > MAX_SANE_ENTRIES {
            warnings.push(PakWarning::TooManyEntries(self.entry_count));
        }
        warnings
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use binrw::BinReaderExt;
    use std::io::Cursor;

    #[test]
    fn test_parse_header() {
        let data = [
            0x00, 0x00, 0x02, 0x00, // version
            0x03, 0x00, 0x00, 0x00, // entry count
            0x10, 0x00, 0x00, 0x00, // header size
            0x0d, 0x00, 0x00, 0x00, // flags
        ];
        let header: PakHeader = Cursor::new(&data).read_le().expect("header");
        assert_eq!(header, PakHeader::new(3));
        assert!(header.check().is_empty());
    }

    #[test]
    fn test_write_header() {
        let mut out = Cursor::new(Vec::new());
        PakHeader::new(1).write(&mut out).expect("write");
        let bytes = out.into_inner();
        assert_eq!(bytes.len(), PAK_HEADER_SIZE);
        assert_eq!(&bytes[..4], &[0x00, 0x00, 0x02, 0x00]);
    }

    #[test]
    fn test_signature_mismatch_is_warning() {
        let header = PakHeader {
            version: 0x10000,
            entry_count: 1,
            header_size: 16,
            flags: 0x0D,
        };
        let warnings = header.check();
        assert_eq!(warnings.len(), 1);
        assert!(matches!(
            warnings[0],
            PakWarning::SignatureMismatch { version: 0x10000, .. }
        ));
        assert!(warnings[0].to_string().contains("0x10000"));
    }

    #[test]
    fn test_entry_ceiling() {
        assert!(PakHeader::new(MAX_SANE_ENTRIES).check().is_empty());
        let warnings = PakHeader::new(MAX_SANE_ENTRIES + 1).check();
        assert_eq!(warnings, vec![PakWarning::TooManyEntries(MAX_SANE_ENTRIES + 1)]);
    }
}
