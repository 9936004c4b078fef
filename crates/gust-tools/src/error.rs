//! Errors for inputs the tools refuse to handle

use std::path::PathBuf;
use thiserror::Error;

/// Unsupported command-line inputs
#[derive(Debug, Error)]
pub enum ToolError {
    /// Packing a directory into an archive
    #[error("directory packing is not supported: {}", .0.display())]
    DirectoryPacking(PathBuf),

    /// Rebuilding an archive from its manifest
    #[error("JSON repacking is not supported: {}", .0.display())]
    JsonRepacking(PathBuf),

    /// Input that is neither a table nor a manifest
    #[error("expected a .ebm or .json file: {}", .0.display())]
    UnsupportedInput(PathBuf),

    /// File name can't be turned into a table name
    #[error("invalid file name: {}", .0.display())]
    InvalidFileName(PathBuf),
}
