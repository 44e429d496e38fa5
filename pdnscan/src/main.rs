//! pdnscan binary.
//!
//! Connects to a database, classifies every column of every table and view,
//! and writes one report row per finding.
//!
//! # Security Guarantees
//! - Read-only database operations only
//! - No credentials stored or logged
//! - Report rows carry a masked copy of each sample value

use clap::Parser;
use pdnscan::Cli;
use pdnscan_core::logging::init_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.global.verbose, cli.global.quiet)?;

    if let Err(e) = pdnscan::scan::run(&cli).await {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
