//! PAK archive containers
//!
//! # Binary Layout
//!
//! ```text
//! +-------------------------+
//! | Header (16 bytes)       |  version, entry count, header size, flags
//! +-------------------------+
//! | Entry table             |  entry count × 160 bytes (narrow)
//! |                         |           or × 168 bytes (wide)
//! +-------------------------+
//! | Payloads                |  offsets relative to the end of the table
//! +-------------------------+
//! ```
//!
//! Each entry's name and payload are XOR-obfuscated with the entry's 20-byte
//! key unless the key is all zeros. The entry layout is detected from the
//! table contents, see [`layout`].
//!
//! # Usage
//!
//! ```rust,no_run
//! use gust_formats::pak::{PakArchive, manifest_path_for};
//! use std::path::Path;
//!
//! let archive = PakArchive::open("PACK00_00.pak")?;
//! let manifest = archive.extract_to(Path::new("."), "PACK00_00.pak", |entry| {
//!     println!("{:09x} {:08x} {}", entry.offset, entry.length, entry.name);
//! })?;
//! manifest.write_to(manifest_path_for("PACK00_00.pak"))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Rebuilding an archive from a manifest is not supported.

mod archive;
mod entry;
mod error;
mod header;
pub mod layout;
mod manifest;

pub use archive::{ExtractedEntry, PakArchive};
pub use entry::{DecodedEntry, EntryLayout, NAME_SIZE, PakEntry};
pub use error::{PakError, PakResult};
pub use header::{MAX_SANE_ENTRIES, PAK_FLAGS, PAK_HEADER_SIZE, PAK_VERSION, PakHeader, PakWarning};
pub use layout::{LayoutScores, SAMPLE_LIMIT, detect_layout, score_layouts};
pub use manifest::{PakFileRecord, PakManifest, manifest_path_for};
