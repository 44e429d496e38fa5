//! Per-column sampling configuration.

use crate::error::PdnScanError;
use serde::{Deserialize, Serialize};

/// Configuration for column sampling.
///
/// Controls how many non-null, non-empty values are fetched for each column
/// before abstraction and classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Number of values to sample per column
    pub sample_size: u32,
}

impl SamplingConfig {
    /// Smallest accepted sample size.
    pub const MIN_SAMPLE_SIZE: u32 = 5;
    /// Largest accepted sample size.
    pub const MAX_SAMPLE_SIZE: u32 = 50;

    /// Creates a new sampling config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set sample size.
    pub fn with_sample_size(mut self, size: u32) -> Self {
        self.sample_size = size;
        self
    }

    /// Validates the sample size range.
    ///
    /// # Errors
    /// Returns a configuration error when `sample_size` is outside 5..=50.
    pub fn validate(&self) -> crate::Result<()> {
        if !(Self::MIN_SAMPLE_SIZE..=Self::MAX_SAMPLE_SIZE).contains(&self.sample_size) {
            return Err(PdnScanError::configuration(format!(
                "sample_size must be between {} and {}, got {}",
                Self::MIN_SAMPLE_SIZE,
                Self::MAX_SAMPLE_SIZE,
                self.sample_size
            )));
        }
        Ok(())
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self { sample_size: 20 }
    }
}
