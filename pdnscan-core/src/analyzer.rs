//! Per-column analysis: sample, abstract, classify.
//!
//! [`ColumnAnalyzer::analyze`] never fails. Collaborator errors become an
//! `ERROR` record so that every attempted column yields at least one record.

use crate::abstraction::dedup_samples;
use crate::adapters::{SamplingConfig, ScanSource};
use crate::classifier::classify;
use crate::models::{ColumnInfo, EvidenceSource, PdnCategory, PdnResult, TableInfo};
use std::sync::Arc;

/// Analyzes single columns of one database.
#[derive(Clone)]
pub struct ColumnAnalyzer {
    source: Arc<dyn ScanSource>,
    database: String,
    sampling: SamplingConfig,
}

impl std::fmt::Debug for ColumnAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColumnAnalyzer")
            .field("database", &self.database)
            .field("sampling", &self.sampling)
            .finish_non_exhaustive()
    }
}

impl ColumnAnalyzer {
    pub fn new(source: Arc<dyn ScanSource>, database: String, sampling: SamplingConfig) -> Self {
        Self {
            source,
            database,
            sampling,
        }
    }

    /// Produces every record for one column.
    ///
    /// Records come out in this order: `HEADER` records for categories found
    /// in the column name, then `VALUE` records per distinct sample and
    /// category, then either a single `NONE` record (nothing matched) or a
    /// single `ERROR` record (sampling failed).
    pub async fn analyze(&self, table: &TableInfo, column: &ColumnInfo) -> Vec<PdnResult> {
        let sampled = self
            .source
            .sample_values(table, column, self.sampling.sample_size)
            .await;

        let (samples, sampling_failed) = match sampled {
            Ok(values) => (dedup_samples(values), false),
            Err(e) => {
                tracing::warn!(
                    "Sampling {}.{} failed: {}",
                    table.qualified_name(),
                    column.name,
                    e
                );
                (Vec::new(), true)
            }
        };

        let mut results = Vec::new();

        for category in classify(&column.name) {
            let record = PdnResult::new(
                &self.database,
                table,
                &column.name,
                EvidenceSource::Header,
                category,
            );
            results.push(match samples.first() {
                Some(sample) => record.with_sample(sample),
                None => record,
            });
        }

        for sample in &samples {
            for category in classify(&sample.value) {
                results.push(
                    PdnResult::new(
                        &self.database,
                        table,
                        &column.name,
                        EvidenceSource::Value,
                        category,
                    )
                    .with_sample(sample),
                );
            }
        }

        if sampling_failed {
            results.push(PdnResult::error(&self.database, table, &column.name));
        } else if results.is_empty() {
            let record = PdnResult::new(
                &self.database,
                table,
                &column.name,
                EvidenceSource::None,
                PdnCategory::None,
            );
            results.push(match samples.first() {
                Some(sample) => record.with_sample(sample),
                None => record,
            });
        }

        tracing::debug!(
            "{}.{}: {} samples, {} records",
            table.qualified_name(),
            column.name,
            samples.len(),
            results.len()
        );

        results
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::adapters::ConnectionConfig;
    use crate::models::{DatabaseType, NOT_AVAILABLE, TableKind};
    use crate::{PdnScanError, Result};
    use async_trait::async_trait;

    /// Returns fixed values for every column, or fails when `values` is None.
    struct FixedSource {
        values: Option<Vec<&'static str>>,
    }

    #[async_trait]
    impl ScanSource for FixedSource {
        async fn test_connection(&self) -> Result<()> {
            Ok(())
        }

        async fn list_tables(&self) -> Result<Vec<TableInfo>> {
            Ok(Vec::new())
        }

        async fn list_columns(&self, _table: &TableInfo) -> Result<Vec<ColumnInfo>> {
            Ok(Vec::new())
        }

        async fn sample_values(
            &self,
            _table: &TableInfo,
            _column: &ColumnInfo,
            limit: u32,
        ) -> Result<Vec<String>> {
            match &self.values {
                Some(values) => Ok(values
                    .iter()
                    .take(limit as usize)
                    .map(|v| v.to_string())
                    .collect()),
                None => Err(PdnScanError::query_failed("permission denied")),
            }
        }

        fn database_type(&self) -> DatabaseType {
            DatabaseType::SQLite
        }

        fn database_name(&self) -> String {
            "hr".to_string()
        }

        fn connection_config(&self) -> ConnectionConfig {
            ConnectionConfig::default()
        }
    }

    fn analyzer(values: Option<Vec<&'static str>>) -> ColumnAnalyzer {
        ColumnAnalyzer::new(
            Arc::new(FixedSource { values }),
            "hr".to_string(),
            SamplingConfig::default(),
        )
    }

    fn clients() -> TableInfo {
        TableInfo::new("dbo", "clients", TableKind::Table)
    }

    #[tokio::test]
    async fn test_header_only_match_without_data() {
        let results = analyzer(Some(vec![]))
            .analyze(&clients(), &ColumnInfo::new("email_address", "nvarchar"))
            .await;

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.evidence == EvidenceSource::Header));
        assert!(results.iter().all(|r| r.sample_value == NOT_AVAILABLE));
        assert!(results.iter().all(|r| r.matched_pattern.is_empty()));
        let categories: Vec<PdnCategory> = results.iter().map(|r| r.category).collect();
        assert!(categories.contains(&PdnCategory::Email));
        assert!(categories.contains(&PdnCategory::Address));
    }

    #[tokio::test]
    async fn test_value_match_on_neutral_header() {
        let results = analyzer(Some(vec!["ivanov@mail.ru"]))
            .analyze(&clients(), &ColumnInfo::new("col1", "nvarchar"))
            .await;

        assert_eq!(results.len(), 1);
        let record = &results[0];
        assert_eq!(record.evidence, EvidenceSource::Value);
        assert_eq!(record.category, PdnCategory::Email);
        assert_eq!(record.sample_value, "ivanov@mail.ru");
        assert_eq!(record.matched_pattern, "AAAAAA#AAAA#AA");
    }

    #[tokio::test]
    async fn test_header_records_carry_first_sample() {
        let results = analyzer(Some(vec!["12", "34", "abc"]))
            .analyze(&clients(), &ColumnInfo::new("phone", "int"))
            .await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].evidence, EvidenceSource::Header);
        assert_eq!(results[0].category, PdnCategory::PhoneRu);
        assert_eq!(results[0].sample_value, "12");
        assert_eq!(results[0].matched_pattern, "99");
    }

    #[tokio::test]
    async fn test_no_match_yields_single_none_record() {
        let results = analyzer(Some(vec!["42", "17"]))
            .analyze(&clients(), &ColumnInfo::new("quantity", "int"))
            .await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].evidence, EvidenceSource::None);
        assert_eq!(results[0].category, PdnCategory::None);
        assert_eq!(results[0].sample_value, "42");
    }

    #[tokio::test]
    async fn test_no_match_and_no_samples_uses_not_available() {
        let results = analyzer(Some(vec![]))
            .analyze(&clients(), &ColumnInfo::new("quantity", "int"))
            .await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].sample_value, NOT_AVAILABLE);
    }

    #[tokio::test]
    async fn test_sampling_failure_keeps_header_and_adds_error() {
        let results = analyzer(None)
            .analyze(&clients(), &ColumnInfo::new("email", "nvarchar"))
            .await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].evidence, EvidenceSource::Header);
        assert_eq!(results[0].sample_value, NOT_AVAILABLE);
        assert_eq!(results[1].evidence, EvidenceSource::Error);
        assert_eq!(results[1].category, PdnCategory::Unprocessed);
    }

    #[tokio::test]
    async fn test_sampling_failure_on_neutral_column_has_no_none_record() {
        let results = analyzer(None)
            .analyze(&clients(), &ColumnInfo::new("quantity", "int"))
            .await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].evidence, EvidenceSource::Error);
    }

    #[tokio::test]
    async fn test_duplicate_shapes_classified_once() {
        let results = analyzer(Some(vec!["anna@mail.ru", "olga@mail.ru"]))
            .analyze(&clients(), &ColumnInfo::new("contact", "nvarchar"))
            .await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].sample_value, "anna@mail.ru");
    }
}
