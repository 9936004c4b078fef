//! Gust EBM converter binary entry point.
//!
//! Parses the command line, initializes logging and converts the file.
//! See [`gust_tools::ebm::run`] for the conversion rules.

use anyhow::Result;
use gust_tools::{EbmConfig, init_tracing};

fn main() -> Result<()> {
    let config = EbmConfig::from_args();
    init_tracing(&config.log_level);

    let written = gust_tools::ebm::run(&config)?;
    tracing::debug!("Wrote {}", written.display());

    Ok(())
}
