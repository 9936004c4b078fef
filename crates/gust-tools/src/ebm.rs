//! `gust-ebm` command implementation

use anyhow::{Context, Result};
use gust_formats::ebm::{EbmParser, EbmTable};
use gust_formats::{ByteTable, GustFormat};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::{EbmConfig, parent_dir};
use crate::error::ToolError;
use crate::pak::has_extension;

/// Convert the file named by `config` and return the path written.
///
/// `.ebm` tables decode to `<stem>.json` beside them. `.json` manifests
/// encode to the table named inside them, relative to the manifest.
pub fn run(config: &EbmConfig) -> Result<PathBuf> {
    let path = &config.path;
    if has_extension(path, "json") {
        encode(path, config.backup())
    } else if has_extension(path, EbmTable::EXTENSION) {
        decode(path, EbmParser::with_extensions(config.extensions.into()))
    } else {
        Err(ToolError::UnsupportedInput(path.clone()).into())
    }
}

/// Decode a table and write its manifest
pub fn decode(path: &Path, parser: EbmParser) -> Result<PathBuf> {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| ToolError::InvalidFileName(path.to_path_buf()))?;
    let data = ByteTable::load(path).with_context(|| format!("Failed to read {}", path.display()))?;

    let table = parser
        .parse(&name, data.as_bytes())
        .with_context(|| format!("Failed to decode {}", path.display()))?;

    let target = path.with_extension("json");
    table
        .write_json(&target)
        .with_context(|| format!("Failed to write {}", target.display()))?;
    info!(
        "Decoded {} messages from {} to {}",
        table.messages.len(),
        path.display(),
        target.display()
    );
    Ok(target)
}

/// Encode a manifest back to its table
pub fn encode(path: &Path, backup: bool) -> Result<PathBuf> {
    let table = EbmTable::load_json(path).with_context(|| format!("Failed to load {}", path.display()))?;
    if table.name.is_empty() {
        return Err(ToolError::InvalidFileName(path.to_path_buf()).into());
    }
    let data = table
        .build()
        .with_context(|| format!("Failed to encode {}", path.display()))?;

    let target = parent_dir(path).join(&table.name);
    if backup {
        backup_existing(&target);
    }
    fs::write(&target, data).with_context(|| format!("Failed to write {}", target.display()))?;
    info!(
        "Encoded {} messages from {} to {}",
        table.messages.len(),
        path.display(),
        target.display()
    );
    Ok(target)
}

/// `<path>.bak`
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".bak");
    PathBuf::from(name)
}

/// Rename an existing `target` to its backup name, unless a backup is
/// already there.
fn backup_existing(target: &Path) {
    let backup = backup_path(target);
    if !target.exists() || backup.exists() {
        return;
    }
    if let Err(e) = fs::rename(target, &backup) {
        warn!("Failed to create backup {}: {e}", backup.display());
    }
}
