//! Gust PAK unpacker binary entry point.
//!
//! Parses the command line, initializes logging and unpacks the archive.
//! See [`gust_tools::pak::run`] for the unpacking itself.

use anyhow::Result;
use gust_tools::{PakConfig, init_tracing};
use std::io;

fn main() -> Result<()> {
    let config = PakConfig::from_args();
    init_tracing(&config.log_level);

    let stdout = io::stdout();
    gust_tools::pak::run(&config, &mut stdout.lock())?;

    Ok(())
}
