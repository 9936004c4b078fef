//! Archive reading and unpacking

use binrw::BinReaderExt;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::bytes::ByteTable;
use crate::pak::entry::{DecodedEntry, EntryLayout, PakEntry};
use crate::pak::error::{PakError, PakResult};
use crate::pak::header::{PAK_HEADER_SIZE, PakHeader, PakWarning};
use crate::pak::layout::detect_layout;
use crate::pak::manifest::{PakFileRecord, PakManifest};

/// A file written during extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedEntry {
    /// Absolute payload offset in the archive
    pub offset: u64,
    /// Payload length
    pub length: u32,
    /// Decoded entry name
    pub name: String,
    /// Whether the payload was stored in clear
    pub skip_decode: bool,
    /// Destination path
    pub path: PathBuf,
}

/// A PAK archive loaded in memory with its entry table parsed
#[derive(Debug, Clone)]
pub struct PakArchive {
    header: PakHeader,
    layout: EntryLayout,
    entries: Vec<PakEntry>,
    warnings: Vec<PakWarning>,
    data: ByteTable,
}

impl PakArchive {
    /// Load and parse an archive file
    pub fn open<P: AsRef<Path>>(path: P) -> PakResult<Self> {
        Self::from_table(ByteTable::load(path)?)
    }

    /// Parse an archive held in memory
    pub fn parse(data: Vec<u8>) -> PakResult<Self> {
        Self::from_table(ByteTable::from_vec(data))
    }

    fn from_table(data: ByteTable) -> PakResult<Self> {
        let bytes = data.as_bytes();
        if bytes.len() < PAK_HEADER_SIZE {
            return Err(PakError::TruncatedHeader {
                expected: PAK_HEADER_SIZE,
                actual: bytes.len(),
            });
        }

        let header: PakHeader = Cursor::new(&bytes[..PAK_HEADER_SIZE]).read_le()?;
        let warnings = header.check();
        for warning in &warnings {
            warn!("{warning}");
        }

        let table = &bytes[PAK_HEADER_SIZE..];
        let layout = detect_layout(table, header.entry_count)?;
        info!("Detected {} PAK format", layout.label());

        let entries = table
            .chunks_exact(layout.record_size())
            .take(header.entry_count as usize)
            .map(|record| PakEntry::parse(record, layout))
            .collect::<PakResult<Vec<_>>>()?;

        Ok(Self {
            header,
            layout,
            entries,
            warnings,
            data,
        })
    }

    /// Archive header
    pub fn header(&self) -> &PakHeader {
        &self.header
    }

    /// Detected entry layout
    pub fn layout(&self) -> EntryLayout {
        self.layout
    }

    /// Raw entries in table order
    pub fn entries(&self) -> &[PakEntry] {
        &self.entries
    }

    /// Header warnings raised while parsing
    pub fn warnings(&self) -> &[PakWarning] {
        &self.warnings
    }

    /// Offset of the first payload byte: header plus entry table
    pub fn payload_base(&self) -> u64 {
        PAK_HEADER_SIZE as u64 + u64::from(self.header.entry_count) * self.layout.record_size() as u64
    }

    /// Absolute archive offset of an entry's payload
    pub fn absolute_offset(&self, entry: &PakEntry) -> u64 {
        entry.data_offset.saturating_add(self.payload_base())
    }

    /// Entries with decoded names, in table order
    pub fn decoded_entries(&self) -> impl Iterator<Item = DecodedEntry> + '_ {
        self.entries.iter().map(PakEntry::decode)
    }

    /// Read and decode one entry's payload
    pub fn read_payload(&self, entry: &DecodedEntry) -> PakResult<Vec<u8>> {
        let offset = self.absolute_offset(&entry.entry);
        let stored = self
            .data
            .slice(offset, u64::from(entry.entry.length))
            .ok_or_else(|| PakError::TruncatedPayload {
                name: entry.name.clone(),
                offset,
                length: entry.entry.length,
                archive_size: self.data.len(),
            })?;
        Ok(entry.decode_payload(stored))
    }

    /// Build the manifest without extracting anything
    pub fn manifest(&self, source_name: &str) -> PakManifest {
        PakManifest {
            files: self
                .decoded_entries()
                .map(|entry| PakFileRecord {
                    name: entry.name,
                    skip_decode: entry.skip_decode,
                })
                .collect(),
            ..self.manifest_header(source_name)
        }
    }

    /// Extract every entry below `out_dir`, in table order.
    ///
    /// `on_entry` is called for each entry before its payload is written.
    /// The first failure stops extraction; files already written stay on
    /// disk.
    pub fn extract_to<F>(
        &self,
        out_dir: &Path,
        source_name: &str,
        mut on_entry: F,
    ) -> PakResult<PakManifest>
    where
        F: FnMut(&ExtractedEntry),
    {
        let mut files = Vec::with_capacity(self.entries.len());

        for entry in self.decoded_entries() {
            let path = out_dir.join(entry.relative_path()?);
            let extracted = ExtractedEntry {
                offset: self.absolute_offset(&entry.entry),
                length: entry.entry.length,
                name: entry.name.clone(),
                skip_decode: entry.skip_decode,
                path,
            };
            on_entry(&extracted);

            if let Some(parent) = extracted.path.parent() {
                create_path(parent)?;
            }
            let payload = self.read_payload(&entry)?;
            fs::write(&extracted.path, &payload)?;
            debug!(
                "Wrote {} bytes to {} (key {})",
                payload.len(),
                extracted.path.display(),
                entry.entry.key
            );

            files.push(PakFileRecord {
                name: entry.name,
                skip_decode: entry.skip_decode,
            });
        }

        Ok(PakManifest {
            files,
            ..self.manifest_header(source_name)
        })
    }

    fn manifest_header(&self, source_name: &str) -> PakManifest {
        PakManifest {
            name: source_name.to_string(),
            version: self.header.version,
            flags: self.header.flags,
            nb_entries: self.header.entry_count,
            is_64bit: self.layout.is_64bit(),
            files: Vec::new(),
        }
    }
}

fn create_path(dir: &Path) -> PakResult<()> {
    if dir.exists() && !dir.is_dir() {
        return Err(PakError::NotADirectory(dir.to_path_buf()));
    }
    fs::create_dir_all(dir)?;
    Ok(())
}
