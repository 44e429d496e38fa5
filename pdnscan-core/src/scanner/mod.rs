//! Scan orchestration: tables in sequence, columns in parallel.
//!
//! # Time budgets
//! - `catalog_timeout` bounds table enumeration
//! - `table_budget` bounds column listing plus every column analysis of a table
//! - `column_budget` bounds one analysis once the column holds a concurrency slot
//!
//! When the table budget expires (or the shutdown token fires) the table's
//! child token is cancelled, outstanding workers are shut down, and every
//! column without an observed completion gets exactly one `TIMEOUT` record.
//! The processed set lives in the aggregating loop only, so a late worker can
//! never add a second disposition for a column.
//!
//! # Module Structure
//! - `suppression`: Table-level address suppression post-pass
//! - `summary`: End-of-run counters

mod summary;
mod suppression;

pub use summary::ScanSummary;
pub use suppression::apply_address_suppression;

use crate::adapters::{ScanConfig, ScanSource};
use crate::analyzer::ColumnAnalyzer;
use crate::models::{ColumnInfo, NOT_AVAILABLE, PdnResult, TableInfo};
use crate::sink::ResultSink;
use crate::{PdnScanError, Result};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::{Instant, sleep_until, timeout, timeout_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Records and status of one scanned table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableReport {
    pub table: TableInfo,
    /// Final records, suppression applied, in completion order
    pub results: Vec<PdnResult>,
    /// Column listing failed or ran out of time
    pub listing_failed: bool,
    /// The table budget expired or a shutdown curtailed the table
    pub curtailed: bool,
}

/// How a column worker ended.
enum ColumnOutcome {
    Analyzed(Vec<PdnResult>),
    TimedOut,
    Cancelled,
}

/// Walks every table of a source and streams classification records.
pub struct Scanner {
    source: Arc<dyn ScanSource>,
    config: ScanConfig,
    analyzer: ColumnAnalyzer,
    database: String,
}

impl std::fmt::Debug for Scanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scanner")
            .field("database", &self.database)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Scanner {
    /// Creates a scanner; the database name is taken from the source.
    pub fn new(source: Arc<dyn ScanSource>, config: ScanConfig) -> Self {
        let database = source.database_name();
        let analyzer =
            ColumnAnalyzer::new(source.clone(), database.clone(), config.sampling.clone());
        Self {
            source,
            config,
            analyzer,
            database,
        }
    }

    /// Scans every table and pushes each record to `sink`.
    ///
    /// Tables run strictly one after another; all records of a table are
    /// emitted before the next table starts. When `shutdown` fires, the
    /// current table is curtailed, its records are still emitted, and no
    /// further table is started.
    ///
    /// # Errors
    /// Returns error if tables cannot be enumerated within the catalog
    /// timeout or the sink stops accepting records.
    pub async fn run(
        &self,
        sink: &dyn ResultSink,
        shutdown: CancellationToken,
    ) -> Result<ScanSummary> {
        let started = Instant::now();
        let mut summary = ScanSummary::start(&self.database);

        let listed = tokio::select! {
            listed = timeout(self.config.catalog_timeout, self.source.list_tables()) => listed,
            () = shutdown.cancelled() => {
                warn!("Scan interrupted before tables were listed");
                summary.interrupted = true;
                summary.elapsed = started.elapsed();
                return Ok(summary);
            }
        };

        let tables = listed
            .map_err(|_| PdnScanError::timeout("Table enumeration", self.config.catalog_timeout))?
            .map_err(|e| {
                tracing::error!("Failed to list tables: {}", e);
                e
            })?;

        summary.tables_total = tables.len();
        info!(
            "Found {} tables and views in {}",
            tables.len(),
            self.database
        );

        for (index, table) in tables.iter().enumerate() {
            if shutdown.is_cancelled() {
                warn!(
                    "Scan interrupted; {} tables not scanned",
                    tables.len() - index
                );
                summary.interrupted = true;
                break;
            }

            info!(
                "[{}/{}] Scanning {} ({})",
                index + 1,
                tables.len(),
                table.qualified_name(),
                table.kind
            );

            let report = self.scan_table(table, &shutdown).await;
            summary.record_table(report.listing_failed, report.curtailed, &report.results);

            for result in report.results {
                sink.emit(result).await?;
            }
        }

        if shutdown.is_cancelled() {
            summary.interrupted = true;
        }
        summary.elapsed = started.elapsed();
        info!(
            "Scan finished: {} tables, {} columns, {} flagged",
            summary.tables_scanned, summary.columns_scanned, summary.flagged_columns
        );
        Ok(summary)
    }

    /// Scans one table under its own budget and child cancellation token.
    pub async fn scan_table(&self, table: &TableInfo, shutdown: &CancellationToken) -> TableReport {
        let token = shutdown.child_token();
        let deadline = Instant::now() + self.config.table_budget;

        let listed = tokio::select! {
            listed = timeout_at(deadline, self.source.list_columns(table)) => listed,
            () = token.cancelled() => {
                warn!("{}: interrupted while listing columns", table.qualified_name());
                let record = PdnResult::timeout(&self.database, table, NOT_AVAILABLE);
                return self.listing_failed(table, record);
            }
        };

        let columns = match listed {
            Ok(Ok(columns)) => columns,
            Ok(Err(e)) => {
                warn!("{}: failed to list columns: {}", table.qualified_name(), e);
                let record = PdnResult::error(&self.database, table, NOT_AVAILABLE);
                return self.listing_failed(table, record);
            }
            Err(_) => {
                warn!(
                    "{}: column listing exceeded the table budget",
                    table.qualified_name()
                );
                let record = PdnResult::timeout(&self.database, table, NOT_AVAILABLE);
                return self.listing_failed(table, record);
            }
        };

        debug!("{}: {} columns", table.qualified_name(), columns.len());

        let (mut results, curtailed) = self
            .analyze_columns(table, &columns, &token, deadline)
            .await;
        apply_address_suppression(&mut results);

        TableReport {
            table: table.clone(),
            results,
            listing_failed: false,
            curtailed,
        }
    }

    /// Fans out one worker per column and aggregates until every column has
    /// a disposition or the table deadline passes.
    async fn analyze_columns(
        &self,
        table: &TableInfo,
        columns: &[ColumnInfo],
        token: &CancellationToken,
        deadline: Instant,
    ) -> (Vec<PdnResult>, bool) {
        let slots = Arc::new(Semaphore::new(self.config.max_concurrent_columns));
        let mut workers = JoinSet::new();
        let mut pending = HashMap::with_capacity(columns.len());

        for column in columns {
            let analyzer = self.analyzer.clone();
            let table = table.clone();
            let column = column.clone();
            let column_name = column.name.clone();
            let slots = Arc::clone(&slots);
            let token = token.clone();
            let budget = self.config.column_budget;

            let handle = workers.spawn(async move {
                let Ok(_slot) = slots.acquire_owned().await else {
                    return ColumnOutcome::Cancelled;
                };
                tokio::select! {
                    analyzed = timeout(budget, analyzer.analyze(&table, &column)) => match analyzed {
                        Ok(results) => ColumnOutcome::Analyzed(results),
                        Err(_) => ColumnOutcome::TimedOut,
                    },
                    () = token.cancelled() => ColumnOutcome::Cancelled,
                }
            });
            pending.insert(handle.id(), column_name);
        }

        let mut results = Vec::new();
        let mut processed: HashSet<String> = HashSet::with_capacity(columns.len());
        let mut curtailed = false;
        let expiry = sleep_until(deadline);
        tokio::pin!(expiry);

        loop {
            tokio::select! {
                joined = workers.join_next_with_id() => {
                    let Some(joined) = joined else { break };
                    let (id, outcome) = match joined {
                        Ok((id, outcome)) => (id, Some(outcome)),
                        Err(e) => (e.id(), None),
                    };
                    let Some(column) = pending.remove(&id) else { continue };
                    if !processed.insert(column.clone()) {
                        continue;
                    }

                    match outcome {
                        Some(ColumnOutcome::Analyzed(column_results)) => {
                            results.extend(column_results);
                        }
                        Some(ColumnOutcome::TimedOut) => {
                            warn!("{}.{}: column budget expired", table.qualified_name(), column);
                            results.push(PdnResult::timeout(&self.database, table, &column));
                        }
                        Some(ColumnOutcome::Cancelled) => {
                            results.push(PdnResult::timeout(&self.database, table, &column));
                        }
                        None => {
                            warn!("{}.{}: column worker failed", table.qualified_name(), column);
                            results.push(PdnResult::error(&self.database, table, &column));
                        }
                    }
                }
                () = &mut expiry => {
                    warn!("{}: table budget expired", table.qualified_name());
                    curtailed = true;
                    break;
                }
                () = token.cancelled() => {
                    warn!("{}: scan interrupted", table.qualified_name());
                    curtailed = true;
                    break;
                }
            }
        }

        if curtailed {
            token.cancel();
            workers.shutdown().await;

            for column in columns {
                if processed.insert(column.name.clone()) {
                    results.push(PdnResult::timeout(&self.database, table, &column.name));
                }
            }
        }

        (results, curtailed)
    }

    fn listing_failed(&self, table: &TableInfo, record: PdnResult) -> TableReport {
        TableReport {
            table: table.clone(),
            results: vec![record],
            listing_failed: true,
            curtailed: false,
        }
    }
}
