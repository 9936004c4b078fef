//! JSON manifest describing an unpacked archive
//!
//! ```json
//! {
//!   "name": "PACK00_00.pak",
//!   "version": 131072,
//!   "flags": 13,
//!   "nb_entries": 2,
//!   "64-bit": true,
//!   "files": [
//!     { "name": "/data/a.g1t", "skip_decode": false },
//!     { "name": "/data/b.txt", "skip_decode": true }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::pak::error::PakResult;

/// One file of the archive, in table order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PakFileRecord {
    /// Decoded name with host path separators
    pub name: String,
    /// Whether the entry was stored in clear
    pub skip_decode: bool,
}

/// Everything needed to describe an archive once its payloads are on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PakManifest {
    /// Source archive name
    pub name: String,
    /// Header version
    pub version: u32,
    /// Header flags
    pub flags: u32,
    /// Number of entries
    pub nb_entries: u32,
    /// Whether the archive uses the wide entry layout
    #[serde(rename = "64-bit")]
    pub is_64bit: bool,
    /// Files in table order
    pub files: Vec<PakFileRecord>,
}

impl PakManifest {
    /// Pretty-printed JSON
    pub fn to_json_pretty(&self) -> PakResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a manifest from JSON text
    pub fn from_json(text: &str) -> PakResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Write the manifest as pretty JSON
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> PakResult<()> {
        fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }
}

/// Manifest location for an archive: same directory and stem, `.json` extension
pub fn manifest_path_for<P: AsRef<Path>>(archive: P) -> PathBuf {
    archive.as_ref().with_extension("json")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> PakManifest {
        PakManifest {
            name: "PACK00.pak".to_string(),
            version: 0x20000,
            flags: 0x0D,
            nb_entries: 1,
            is_64bit: false,
            files: vec![PakFileRecord {
                name: "/data/a.txt".to_string(),
                skip_decode: true,
            }],
        }
    }

    #[test]
    fn test_json_keys() {
        let value: serde_json::Value =
            serde_json::from_str(&sample().to_json_pretty().unwrap()).unwrap();
        assert_eq!(value["name"], "PACK00.pak");
        assert_eq!(value["version"], 0x20000);
        assert_eq!(value["flags"], 13);
        assert_eq!(value["nb_entries"], 1);
        assert_eq!(value["64-bit"], false);
        assert_eq!(value["files"][0]["skip_decode"], true);
    }

    #[test]
    fn test_key_order_is_stable() {
        let text = sample().to_json_pretty().unwrap();
        let positions: Vec<usize> = ["\"name\"", "\"version\"", "\"flags\"", "\"nb_entries\"", "\"64-bit\"", "\"files\""]
            .iter()
            .map(|key| text.find(key).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_from_json() {
        let text = sample().to_json_pretty().unwrap();
        assert_eq!(PakManifest::from_json(&text).unwrap(), sample());
    }

    #[test]
    fn test_manifest_path() {
        assert_eq!(
            manifest_path_for("/games/ryza/PACK00_00.pak"),
            PathBuf::from("/games/ryza/PACK00_00.json")
        );
    }
}
