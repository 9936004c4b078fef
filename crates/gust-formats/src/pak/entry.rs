//! PAK entry records
//!
//! An entry record holds an obfuscated 128-byte file name, the payload
//! length, the 20-byte key and the payload offset relative to the end of the
//! entry table. Two layouts exist:
//!
//! ```text
//! Narrow (160 bytes)                    Wide (168 bytes)
//! [u8; 128] name                        [u8; 128] name
//! u32       length                      u32       length
//! [u8; 20]  key                         [u8; 20]  key
//! u32       data offset                 u64       data offset
//! u32       reserved                    u64       reserved
//! ```
//!
//! Both parse into the same [`PakEntry`].

use binrw::{BinRead, BinReaderExt, BinWrite};
use gust_crypto::{KEY_SIZE, XorKey};
use std::io::Cursor;
use std::path::{Component, MAIN_SEPARATOR, Path, PathBuf};

use crate::pak::error::{PakError, PakResult};

/// Size of the name field in bytes
pub const NAME_SIZE: usize = 128;

/// Entry record layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryLayout {
    /// 32-bit data offsets (A17 and earlier)
    Narrow,
    /// 64-bit data offsets (A18 and later)
    Wide,
}

impl EntryLayout {
    /// Serialized record size in bytes
    pub const fn record_size(self) -> usize {
        match self {
            Self::Narrow => 160,
            Self::Wide => 168,
        }
    }

    /// Whether data offsets are 64-bit
    pub const fn is_64bit(self) -> bool {
        matches!(self, Self::Wide)
    }

    /// Human-readable layout name
    pub const fn label(self) -> &'static str {
        match self {
            Self::Narrow => "A17/32-bit",
            Self::Wide => "A18/64-bit",
        }
    }
}

#[derive(Debug, BinRead, BinWrite)]
#[br(little)]
#[bw(little)]
struct NarrowRecord {
    name: [u8; NAME_SIZE],
    length: u32,
    key: [u8; KEY_SIZE],
    data_offset: u32,
    reserved: u32,
}

#[derive(Debug, BinRead, BinWrite)]
#[br(little)]
#[bw(little)]
struct WideRecord {
    name: [u8; NAME_SIZE],
    length: u32,
    key: [u8; KEY_SIZE],
    data_offset: u64,
    reserved: u64,
}

/// A raw entry as stored in the table, name still obfuscated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PakEntry {
    /// Obfuscated, NUL-padded file name
    pub raw_name: [u8; NAME_SIZE],
    /// Payload length in bytes
    pub length: u32,
    /// Obfuscation key
    pub key: XorKey,
    /// Payload offset relative to the end of the entry table
    pub data_offset: u64,
    /// Unused trailing field
    pub reserved: u64,
}

impl PakEntry {
    /// Parse one record with the narrow layout
    pub fn parse_narrow(record: &[u8]) -> PakResult<Self> {
        let raw: NarrowRecord = Cursor::new(record).read_le()?;
        Ok(Self {
            raw_name: raw.name,
            length: raw.length,
            key: XorKey::new(raw.key),
            data_offset: u64::from(raw.data_offset),
            reserved: u64::from(raw.reserved),
        })
    }

    /// Parse one record with the wide layout
    pub fn parse_wide(record: &[u8]) -> PakResult<Self> {
        let raw: WideRecord = Cursor::new(record).read_le()?;
        Ok(Self {
            raw_name: raw.name,
            length: raw.length,
            key: XorKey::new(raw.key),
            data_offset: raw.data_offset,
            reserved: raw.reserved,
        })
    }

    /// Parse one record with the given layout
    pub fn parse(record: &[u8], layout: EntryLayout) -> PakResult<Self> {
        match layout {
            EntryLayout::Narrow => Self::parse_narrow(record),
            EntryLayout::Wide => Self::parse_wide(record),
        }
    }

    /// Serialize with the given layout. Narrow records keep only the low
    /// 32 bits of the offset and reserved fields.
    pub fn to_bytes(&self, layout: EntryLayout) -> PakResult<Vec<u8>> {
        let mut out = Cursor::new(Vec::with_capacity(layout.record_size()));
        match layout {
            EntryLayout::Narrow => NarrowRecord {
                name: self.raw_name,
                length: self.length,
                key: *self.key.as_bytes(),
                data_offset: self.data_offset as u32,
                reserved: self.reserved as u32,
            }
            .write(&mut out)?,
            EntryLayout::Wide => WideRecord {
                name: self.raw_name,
                length: self.length,
                key: *self.key.as_bytes(),
                data_offset: self.data_offset,
                reserved: self.reserved,
            }
            .write(&mut out)?,
        }
        Ok(out.into_inner())
    }

    /// Entries with an all-zero key are stored in clear
    pub fn skip_decode(&self) -> bool {
        self.key.is_zero()
    }

    /// Reverse the name obfuscation and normalize separators
    pub fn decode(&self) -> DecodedEntry {
        let skip_decode = self.skip_decode();
        let mut name_bytes = self.raw_name;
        if !skip_decode {
            self.key.apply_in_place(&mut name_bytes);
        }
        let end = name_bytes
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(NAME_SIZE);
        let name = &name_bytes[..end];

        DecodedEntry {
            entry: self.clone(),
            name: host_name(name),
            skip_decode,
            relative: host_name(name.get(1..).unwrap_or_default()),
        }
    }
}

/// Lossy UTF-8 with `\` turned into the host separator
fn host_name(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).replace('\\', &MAIN_SEPARATOR.to_string())
}

/// An entry whose name has been decoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedEntry {
    /// The raw entry
    pub entry: PakEntry,
    /// Decoded name with host path separators
    pub name: String,
    /// Whether the payload is stored in clear
    pub skip_decode: bool,
    relative: String,
}

impl DecodedEntry {
    /// Name without its one-byte prefix, relative to the output directory
    ///
    /// The prefix byte is removed before the UTF-8 conversion.
    pub fn relative_name(&self) -> &str {
        &self.relative
    }

    /// Validated relative output path
    pub fn relative_path(&self) -> PakResult<PathBuf> {
        let rel = Path::new(self.relative_name());
        let mut out = PathBuf::new();
        for component in rel.components() {
            match component {
                Component::Normal(part) => out.push(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(PakError::UnsafePath(self.name.clone()));
                }
            }
        }
        if out.as_os_str().is_empty() {
            return Err(PakError::UnsafePath(self.name.clone()));
        }
        Ok(out)
    }

    /// Reverse the payload obfuscation, returning a new buffer
    pub fn decode_payload(&self, payload: &[u8]) -> Vec<u8> {
        if self.skip_decode {
            payload.to_vec()
        } else {
            self.entry.key.apply(payload)
        }
    }
}
