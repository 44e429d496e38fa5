//! Scan driver: connect, stream results into the report, summarize.

use crate::output::{ReportFormat, create_report, spawn_report_writer};
use crate::prompt::{NoPrompt, Prompt, Target, TerminalPrompt, resolve_target};
use crate::{Cli, Command};
use anyhow::Context;
use pdnscan_core::{ChannelSink, ConnectionConfig, ScanConfig, ScanSource, ScanSummary, Scanner};
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Records buffered between the scanner and the report writer.
const REPORT_CHANNEL_CAPACITY: usize = 256;

/// Runs the command selected on the command line.
///
/// # Errors
/// Returns error on any fatal condition: invalid settings, unreachable
/// database, failed table enumeration, or an unwritable report
pub async fn run(cli: &Cli) -> anyhow::Result<()> {
    if let Some(Command::List) = cli.command {
        list_supported_databases();
        return Ok(());
    }

    let base = cli.connection_config();
    let mut prompt: Box<dyn Prompt> = if cli.connection.no_prompt {
        Box::new(NoPrompt)
    } else {
        Box::new(TerminalPrompt)
    };
    let target = resolve_target(&cli.connection, &base, prompt.as_mut())?;

    match cli.command {
        Some(Command::Test) => test_connection(&target, &base).await,
        _ => scan(cli, &target, &base).await,
    }
}

/// Connects and pings without touching the catalog.
async fn test_connection(target: &Target, base: &ConnectionConfig) -> anyhow::Result<()> {
    info!("Testing database connection...");
    info!("Target: {}", target.describe());

    let source = connect(target, base).await?;
    source
        .test_connection()
        .await
        .context("Connection test failed")?;

    info!("✓ Connection test successful");
    println!(
        "Connection to {} database {} successful",
        source.database_type(),
        source.database_name()
    );
    Ok(())
}

async fn scan(cli: &Cli, target: &Target, base: &ConnectionConfig) -> anyhow::Result<()> {
    let config = cli.scan.scan_config();
    config.validate().context("Invalid scan settings")?;

    info!("Starting personal data scan...");
    info!("Target: {}", target.describe());
    info!("Output: {}", cli.scan.output.display());

    let source = connect(target, base).await?;
    info!(
        "✓ Connected to {} database {}",
        source.database_type(),
        source.database_name()
    );

    let shutdown = CancellationToken::new();
    let interrupt = tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received; finishing the current table");
                shutdown.cancel();
            }
        }
    });

    let outcome = scan_to_report(
        source,
        config,
        &cli.scan.output,
        cli.scan.format,
        shutdown,
    )
    .await;
    interrupt.abort();
    let (summary, rows) = outcome?;

    info!("✓ Report saved to {} ({} rows)", cli.scan.output.display(), rows);
    println!("{summary}");
    println!("Report: {} ({} rows)", cli.scan.output.display(), rows);
    Ok(())
}

async fn connect(
    target: &Target,
    base: &ConnectionConfig,
) -> anyhow::Result<Arc<dyn ScanSource>> {
    target
        .connect(base)
        .await
        .with_context(|| format!("Failed to connect to {}", target.describe()))
}

/// Scans `source` and writes every record to a report at `output`.
///
/// The report file is created before the scan starts, so an unwritable path
/// fails fast. Returns the summary and the number of report rows.
///
/// # Errors
/// Returns error if the report cannot be written or the scan fails fatally
pub async fn scan_to_report(
    source: Arc<dyn ScanSource>,
    config: ScanConfig,
    output: &Path,
    format: ReportFormat,
    shutdown: CancellationToken,
) -> anyhow::Result<(ScanSummary, usize)> {
    let server = source.connection_config().host;
    let writer = create_report(output, format, &server)?;
    let (sink, receiver) = ChannelSink::channel(REPORT_CHANNEL_CAPACITY);
    let writer = spawn_report_writer(receiver, writer);

    let scanner = Scanner::new(source, config);
    let scanned = scanner.run(&sink, shutdown).await;
    drop(sink);

    // A writer failure closes the channel, so it is the root cause of any
    // sink error the scanner reports.
    let rows = writer
        .await
        .context("Report writer task failed")?
        .with_context(|| format!("Failed to write report {}", output.display()))?;
    let summary = scanned.context("Scan failed")?;

    info!("{}", summary);
    Ok((summary, rows))
}

fn list_supported_databases() {
    println!("Supported database types:");
    println!(
        "  SQL Server  mssql:// sqlserver://  {}",
        availability(cfg!(feature = "mssql"))
    );
    println!(
        "  PostgreSQL  postgres://            {}",
        availability(cfg!(feature = "postgresql"))
    );
    println!(
        "  SQLite      sqlite:// *.db         {}",
        availability(cfg!(feature = "sqlite"))
    );
}

fn availability(enabled: bool) -> &'static str {
    if enabled { "available" } else { "not compiled in" }
}
