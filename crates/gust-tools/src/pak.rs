//! `gust-pak` command implementation

use anyhow::{Context, Result};
use gust_formats::pak::{ExtractedEntry, PakArchive, PakManifest, manifest_path_for};
use std::io::Write;
use std::path::Path;
use tracing::info;

use crate::config::PakConfig;
use crate::error::ToolError;

/// Heading of the entry listing
pub const LISTING_HEADER: &str = "OFFSET    SIZE     NAME";

/// One listing line: absolute offset, size, name, and `*` when the entry
/// was stored without obfuscation
pub fn listing_line(entry: &ExtractedEntry) -> String {
    format!(
        "{:09x} {:08x} {}{}",
        entry.offset,
        entry.length,
        entry.name,
        if entry.skip_decode { "*" } else { "" }
    )
}

/// Unpack the archive named by `config`, printing the listing to `out`.
///
/// The manifest is written next to the archive and returned.
pub fn run<W: Write>(config: &PakConfig, out: &mut W) -> Result<PakManifest> {
    let path = &config.path;
    if path.is_dir() {
        return Err(ToolError::DirectoryPacking(path.clone()).into());
    }
    if has_extension(path, "json") {
        return Err(ToolError::JsonRepacking(path.clone()).into());
    }

    let archive = PakArchive::open(path)
        .with_context(|| format!("Failed to read archive {}", path.display()))?;
    let source_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| ToolError::InvalidFileName(path.clone()))?;

    let out_dir = config.output_dir();
    writeln!(out, "{LISTING_HEADER}")?;
    let mut listing = Ok(());
    let manifest = archive
        .extract_to(&out_dir, &source_name, |entry| {
            if listing.is_ok() {
                listing = writeln!(out, "{}", listing_line(entry));
            }
        })
        .with_context(|| format!("Failed to extract {}", path.display()))?;
    listing?;

    let manifest_path = manifest_path_for(path);
    manifest
        .write_to(&manifest_path)
        .with_context(|| format!("Failed to write manifest {}", manifest_path.display()))?;
    info!(
        "Extracted {} files to {}, manifest {}",
        manifest.files.len(),
        out_dir.display(),
        manifest_path.display()
    );

    Ok(manifest)
}

pub(crate) fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}
