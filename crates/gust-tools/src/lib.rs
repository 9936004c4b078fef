//! Command-line front ends for the Gust formats
//!
//! Two binaries are built from this crate:
//!
//! - `gust-pak`: unpacks a `.pak` archive, prints its entry listing and
//!   writes a JSON manifest next to it
//! - `gust-ebm`: converts a `.ebm` message table to a JSON manifest and
//!   back
//!
//! The binaries are thin wrappers around [`pak::run`] and [`ebm::run`], so
//! the same operations can be driven from other programs or tests.

pub mod config;
pub mod ebm;
pub mod error;
pub mod pak;

pub use config::{EbmConfig, ExtensionsArg, PakConfig, init_tracing};
pub use error::ToolError;
