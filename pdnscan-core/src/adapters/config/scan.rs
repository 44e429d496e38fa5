//! Scan engine configuration: time budgets and column concurrency.

use super::SamplingConfig;
use crate::error::PdnScanError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for one scan run.
///
/// The column budget is nested inside the table budget: a column can never
/// outlive the table that dispatched it.
///
/// # Example
/// ```rust
/// use pdnscan_core::adapters::ScanConfig;
/// use std::time::Duration;
///
/// let config = ScanConfig::new()
///     .with_table_budget(Duration::from_secs(60))
///     .with_column_budget(Duration::from_secs(10))
///     .with_sample_size(30);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Bounds column listing plus every column analysis of one table
    pub table_budget: Duration,
    /// Bounds one column analysis, started once the column holds a slot
    pub column_budget: Duration,
    /// Bounds table enumeration
    pub catalog_timeout: Duration,
    /// Maximum number of columns analyzed at once
    pub max_concurrent_columns: usize,
    /// Sampling settings
    pub sampling: SamplingConfig,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            table_budget: Duration::from_secs(180),
            column_budget: Duration::from_secs(45),
            catalog_timeout: Duration::from_secs(120),
            max_concurrent_columns: 5,
            sampling: SamplingConfig::default(),
        }
    }
}

impl ScanConfig {
    /// Creates a scan config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table_budget(mut self, budget: Duration) -> Self {
        self.table_budget = budget;
        self
    }

    pub fn with_column_budget(mut self, budget: Duration) -> Self {
        self.column_budget = budget;
        self
    }

    pub fn with_catalog_timeout(mut self, timeout: Duration) -> Self {
        self.catalog_timeout = timeout;
        self
    }

    pub fn with_max_concurrent_columns(mut self, max: usize) -> Self {
        self.max_concurrent_columns = max;
        self
    }

    pub fn with_sample_size(mut self, size: u32) -> Self {
        self.sampling.sample_size = size;
        self
    }

    /// Validates budgets, concurrency and sampling.
    ///
    /// # Errors
    /// Returns a configuration error describing the first invalid setting.
    pub fn validate(&self) -> crate::Result<()> {
        if self.table_budget.is_zero() {
            return Err(PdnScanError::configuration(
                "table_budget must be greater than 0",
            ));
        }

        if self.column_budget.is_zero() {
            return Err(PdnScanError::configuration(
                "column_budget must be greater than 0",
            ));
        }

        if self.column_budget > self.table_budget {
            return Err(PdnScanError::configuration(
                "column_budget cannot exceed table_budget",
            ));
        }

        if self.catalog_timeout.is_zero() {
            return Err(PdnScanError::configuration(
                "catalog_timeout must be greater than 0",
            ));
        }

        if self.max_concurrent_columns == 0 {
            return Err(PdnScanError::configuration(
                "max_concurrent_columns must be greater than 0",
            ));
        }

        self.sampling.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_config_defaults() {
        let config = ScanConfig::default();
        assert_eq!(config.table_budget, Duration::from_secs(180));
        assert_eq!(config.column_budget, Duration::from_secs(45));
        assert_eq!(config.catalog_timeout, Duration::from_secs(120));
        assert_eq!(config.max_concurrent_columns, 5);
        assert_eq!(config.sampling.sample_size, 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_column_budget_nested_in_table_budget() {
        let config = ScanConfig::new()
            .with_table_budget(Duration::from_secs(10))
            .with_column_budget(Duration::from_secs(20));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_values() {
        assert!(
            ScanConfig::new()
                .with_max_concurrent_columns(0)
                .validate()
                .is_err()
        );
        assert!(
            ScanConfig::new()
                .with_catalog_timeout(Duration::ZERO)
                .validate()
                .is_err()
        );
        assert!(ScanConfig::new().with_sample_size(0).validate().is_err());
    }
}
