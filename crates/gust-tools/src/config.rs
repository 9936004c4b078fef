//! Command-line configuration for the Gust tools.
//!
//! Each binary has its own `clap` derive struct. Options can also come from
//! environment variables:
//!
//! - `GUST_PAK_OUTPUT_DIR`: extraction directory for `gust-pak`
//! - `GUST_EBM_EXTENSIONS`: extension word handling for `gust-ebm`
//! - `GUST_LOG`: log level for both, used when `RUST_LOG` is unset
//!
//! # Example
//!
//! ```
//! use clap::Parser;
//! use gust_tools::{EbmConfig, ExtensionsArg};
//!
//! let config = EbmConfig::parse_from(["gust-ebm", "event.ebm", "--extensions", "on"]);
//! assert_eq!(config.extensions, ExtensionsArg::On);
//! assert!(config.backup());
//! ```

use clap::{Parser, ValueEnum};
use gust_formats::ebm::ExtensionsMode;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Configuration for the PAK unpacker.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "gust-pak",
    about = "Gust PAK archive unpacker",
    long_about = "Unpacks a Gust .pak archive, listing its entries and writing a JSON manifest next to it.",
    version
)]
pub struct PakConfig {
    /// Archive to unpack
    pub path: PathBuf,

    /// Extraction directory (defaults to the archive's directory)
    #[arg(short, long, env = "GUST_PAK_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, env = "GUST_LOG", default_value = "info")]
    pub log_level: String,
}

impl PakConfig {
    /// Parse configuration from command-line arguments.
    #[must_use]
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Directory entries are extracted under.
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| parent_dir(&self.path))
    }
}

/// Extension word handling requested on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ExtensionsArg {
    /// Detect from the data
    #[default]
    Auto,
    /// Every record carries an extension word
    On,
    /// No record carries an extension word
    Off,
}

impl From<ExtensionsArg> for ExtensionsMode {
    fn from(arg: ExtensionsArg) -> Self {
        match arg {
            ExtensionsArg::Auto => Self::Unknown,
            ExtensionsArg::On => Self::On,
            ExtensionsArg::Off => Self::Off,
        }
    }
}

/// Configuration for the EBM converter.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "gust-ebm",
    about = "Gust EBM message table converter",
    long_about = "Converts a Gust .ebm message table to an editable JSON manifest, or a JSON manifest back to .ebm.",
    version
)]
pub struct EbmConfig {
    /// .ebm table to decode, or .json manifest to encode
    pub path: PathBuf,

    /// Extension word handling when decoding
    #[arg(long, env = "GUST_EBM_EXTENSIONS", value_enum, default_value_t = ExtensionsArg::Auto)]
    pub extensions: ExtensionsArg,

    /// Overwrite an existing .ebm without keeping a .bak copy
    #[arg(long)]
    pub no_backup: bool,

    /// Log level used when RUST_LOG is not set
    #[arg(long, env = "GUST_LOG", default_value = "info")]
    pub log_level: String,
}

impl EbmConfig {
    /// Parse configuration from command-line arguments.
    #[must_use]
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Whether an existing target is kept as `<target>.bak`.
    pub const fn backup(&self) -> bool {
        !self.no_backup
    }
}

/// Directory holding `path`, or the current directory for bare file names.
pub fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `level`.
pub fn init_tracing(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pak_output_dir_defaults_to_archive_dir() {
        let config = PakConfig::parse_from(["gust-pak", "data/PACK00.pak"]);
        assert_eq!(config.output_dir(), PathBuf::from("data"));

        let config = PakConfig::parse_from(["gust-pak", "PACK00.pak"]);
        assert_eq!(config.output_dir(), PathBuf::from("."));

        let config = PakConfig::parse_from(["gust-pak", "PACK00.pak", "--output-dir", "out"]);
        assert_eq!(config.output_dir(), PathBuf::from("out"));
    }

    #[test]
    fn test_ebm_defaults() {
        let config = EbmConfig::parse_from(["gust-ebm", "event.ebm"]);
        assert_eq!(config.extensions, ExtensionsArg::Auto);
        assert!(config.backup());
        assert_eq!(ExtensionsMode::from(config.extensions), ExtensionsMode::Unknown);

        let config = EbmConfig::parse_from(["gust-ebm", "event.json", "--no-backup", "--extensions", "off"]);
        assert!(!config.backup());
        assert_eq!(ExtensionsMode::from(config.extensions), ExtensionsMode::Off);
    }

    #[test]
    fn test_invalid_extensions_value() {
        assert!(EbmConfig::try_parse_from(["gust-ebm", "event.ebm", "--extensions", "maybe"]).is_err());
    }
}
