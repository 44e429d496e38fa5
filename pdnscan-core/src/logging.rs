//! Logging setup for the pdnscan binary.
//!
//! Log lines go to stderr so that stdout only carries the scan summary.
//! `RUST_LOG` directives, when set, refine the level picked from the flags.

use crate::Result;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

/// Maps `-q` / `-v` flags to a maximum log level.
///
/// `quiet` wins over any verbosity: ERROR. Otherwise 0 is INFO, 1 is DEBUG
/// and anything higher is TRACE.
pub fn level_for(verbose: u8, quiet: bool) -> tracing::Level {
    match (quiet, verbose) {
        (true, _) => tracing::Level::ERROR,
        (false, 0) => tracing::Level::INFO,
        (false, 1) => tracing::Level::DEBUG,
        (false, _) => tracing::Level::TRACE,
    }
}

/// Initializes structured logging based on verbosity level.
///
/// # Errors
/// Returns a configuration error if a global subscriber is already set.
///
/// # Example
/// ```rust,no_run
/// use pdnscan_core::logging::init_logging;
///
/// // Initialize at DEBUG level
/// init_logging(1, false).expect("Failed to initialize logging");
/// ```
pub fn init_logging(verbose: u8, quiet: bool) -> Result<()> {
    let level = level_for(verbose, quiet);
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init()
        .map_err(|e| {
            crate::error::PdnScanError::configuration(format!(
                "Failed to initialize logging: {e}"
            ))
        })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // A global subscriber can only be installed once per test process, so
    // only the level mapping is exercised here.
    #[test]
    fn test_verbosity_levels() {
        let test_cases = [
            ((0, true), tracing::Level::ERROR),
            ((5, true), tracing::Level::ERROR),
            ((0, false), tracing::Level::INFO),
            ((1, false), tracing::Level::DEBUG),
            ((2, false), tracing::Level::TRACE),
            ((10, false), tracing::Level::TRACE),
        ];

        for ((verbose, quiet), expected) in test_cases {
            assert_eq!(
                level_for(verbose, quiet),
                expected,
                "Failed for quiet={quiet}, verbose={verbose}"
            );
        }
    }
}
