//! End-of-run counters.

use crate::models::{EvidenceSource, NOT_AVAILABLE, PdnResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Totals for one scan run.
///
/// A column is counted once however many records it produced; it counts as
/// flagged when any of its records carries a personal data category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub scan_id: uuid::Uuid,
    pub database: String,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub tables_total: usize,
    pub tables_scanned: usize,
    pub tables_failed: usize,
    pub tables_curtailed: usize,
    pub columns_scanned: usize,
    pub flagged_columns: usize,
    pub timed_out_columns: usize,
    pub errored_columns: usize,
    pub records_emitted: usize,
    pub elapsed: Duration,
    /// The scan was stopped by a shutdown request before all tables ran
    pub interrupted: bool,
}

impl ScanSummary {
    /// Starts an empty summary stamped with a fresh scan id.
    pub fn start(database: impl Into<String>) -> Self {
        Self {
            scan_id: uuid::Uuid::new_v4(),
            database: database.into(),
            started_at: chrono::Utc::now(),
            tables_total: 0,
            tables_scanned: 0,
            tables_failed: 0,
            tables_curtailed: 0,
            columns_scanned: 0,
            flagged_columns: 0,
            timed_out_columns: 0,
            errored_columns: 0,
            records_emitted: 0,
            elapsed: Duration::ZERO,
            interrupted: false,
        }
    }

    /// Folds one finished table into the totals.
    pub fn record_table(&mut self, listing_failed: bool, curtailed: bool, results: &[PdnResult]) {
        self.records_emitted += results.len();

        if listing_failed {
            self.tables_failed += 1;
            return;
        }

        self.tables_scanned += 1;
        if curtailed {
            self.tables_curtailed += 1;
        }

        let mut columns: BTreeMap<&str, ColumnTally> = BTreeMap::new();
        for result in results.iter().filter(|r| r.column != NOT_AVAILABLE) {
            let tally = columns.entry(result.column.as_str()).or_default();
            tally.flagged |= result.is_flagged();
            tally.timed_out |= result.evidence == EvidenceSource::Timeout;
            tally.errored |= result.evidence == EvidenceSource::Error;
        }

        self.columns_scanned += columns.len();
        for tally in columns.values() {
            self.flagged_columns += usize::from(tally.flagged);
            self.timed_out_columns += usize::from(tally.timed_out);
            self.errored_columns += usize::from(tally.errored);
        }
    }
}

impl std::fmt::Display for ScanSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Scan {} of {}", self.scan_id, self.database)?;
        writeln!(
            f,
            "  Tables:  {} scanned, {} failed, {} curtailed (of {})",
            self.tables_scanned, self.tables_failed, self.tables_curtailed, self.tables_total
        )?;
        writeln!(
            f,
            "  Columns: {} scanned, {} flagged, {} timed out, {} errored",
            self.columns_scanned, self.flagged_columns, self.timed_out_columns, self.errored_columns
        )?;
        write!(
            f,
            "  Records: {} in {:.1}s{}",
            self.records_emitted,
            self.elapsed.as_secs_f64(),
            if self.interrupted { " (interrupted)" } else { "" }
        )
    }
}

#[derive(Debug, Default)]
struct ColumnTally {
    flagged: bool,
    timed_out: bool,
    errored: bool,
}
