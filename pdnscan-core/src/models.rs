//! Core data models for a personal-data scan.
//!
//! Everything here lives for a single scan run: catalog entries come from
//! the database collaborator, `PdnResult` records flow out to the report
//! sink, and nothing is persisted between runs.

use serde::{Deserialize, Serialize};

/// Supported database types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DatabaseType {
    PostgreSQL,
    SQLite,
    SqlServer,
}

impl std::fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatabaseType::PostgreSQL => write!(f, "PostgreSQL"),
            DatabaseType::SQLite => write!(f, "SQLite"),
            DatabaseType::SqlServer => write!(f, "SQL Server"),
        }
    }
}

/// Kind of catalog object being scanned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TableKind {
    Table,
    View,
}

impl TableKind {
    /// Maps a catalog type descriptor (`USER_TABLE`, `BASE TABLE`, `view`, ...)
    /// onto a table kind. Anything that is not a view is treated as a table.
    pub fn from_catalog(descriptor: &str) -> Self {
        if descriptor.trim().eq_ignore_ascii_case("view") {
            Self::View
        } else {
            Self::Table
        }
    }
}

impl std::fmt::Display for TableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableKind::Table => write!(f, "TABLE"),
            TableKind::View => write!(f, "VIEW"),
        }
    }
}

/// A table or view discovered during catalog enumeration.
///
/// Identity is `(schema, name)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableInfo {
    pub schema: String,
    pub name: String,
    pub kind: TableKind,
}

impl TableInfo {
    /// Creates a new table descriptor.
    pub fn new(schema: impl Into<String>, name: impl Into<String>, kind: TableKind) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
            kind,
        }
    }

    /// Returns `schema.name` for log output.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }
}

/// A column of a table. Identity is the name within its owning table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub declared_type: String,
}

impl ColumnInfo {
    /// Creates a new column descriptor.
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
        }
    }
}

/// A sampled value together with its abstraction pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleValue {
    pub value: String,
    pub pattern: String,
}

/// Where the evidence for a result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EvidenceSource {
    /// Matched on the column name
    Header,
    /// Matched on a sampled value
    Value,
    /// Nothing matched
    None,
    /// Sampling or catalog lookup failed
    Error,
    /// Analysis did not finish within its budget
    Timeout,
}

impl std::fmt::Display for EvidenceSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            EvidenceSource::Header => "HEADER",
            EvidenceSource::Value => "VALUE",
            EvidenceSource::None => "NONE",
            EvidenceSource::Error => "ERROR",
            EvidenceSource::Timeout => "TIMEOUT",
        };
        f.write_str(label)
    }
}

/// Personal data category assigned to a column.
///
/// Variant order is the order categories are reported in when a single
/// input matches several of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PdnCategory {
    #[serde(rename = "Email")]
    Email,
    #[serde(rename = "Phone (RU)")]
    PhoneRu,
    #[serde(rename = "Passport (RU)")]
    PassportRu,
    #[serde(rename = "SNILS")]
    Snils,
    #[serde(rename = "Individual Tax ID")]
    IndividualTaxId,
    #[serde(rename = "Credit card")]
    CreditCard,
    #[serde(rename = "Full name")]
    FullName,
    #[serde(rename = "Personal data")]
    PersonalData,
    #[serde(rename = "Address")]
    Address,
    #[serde(rename = "Passport")]
    Passport,
    #[serde(rename = "SNILS/Tax ID")]
    SnilsOrTaxId,
    #[serde(rename = "Birth date")]
    BirthDate,
    #[serde(rename = "Personnel number")]
    PersonnelNumber,
    #[serde(rename = "Photo")]
    Photo,
    /// No personal data found
    #[serde(rename = "None")]
    None,
    /// The column could not be classified (error or timeout)
    #[serde(rename = "Unprocessed")]
    Unprocessed,
}

impl PdnCategory {
    /// Human readable label used in reports.
    pub fn label(self) -> &'static str {
        match self {
            PdnCategory::Email => "Email",
            PdnCategory::PhoneRu => "Phone (RU)",
            PdnCategory::PassportRu => "Passport (RU)",
            PdnCategory::Snils => "SNILS",
            PdnCategory::IndividualTaxId => "Individual Tax ID",
            PdnCategory::CreditCard => "Credit card",
            PdnCategory::FullName => "Full name",
            PdnCategory::PersonalData => "Personal data",
            PdnCategory::Address => "Address",
            PdnCategory::Passport => "Passport",
            PdnCategory::SnilsOrTaxId => "SNILS/Tax ID",
            PdnCategory::BirthDate => "Birth date",
            PdnCategory::PersonnelNumber => "Personnel number",
            PdnCategory::Photo => "Photo",
            PdnCategory::None => "None",
            PdnCategory::Unprocessed => "Unprocessed",
        }
    }

    /// True for the sentinel categories that do not denote personal data.
    pub fn is_sentinel(self) -> bool {
        matches!(self, PdnCategory::None | PdnCategory::Unprocessed)
    }
}

impl std::fmt::Display for PdnCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Sentinel used where no sample value is available.
pub const NOT_AVAILABLE: &str = "N/A";

/// One classification record for a (table, column, evidence) triple.
///
/// `sample_value` is the raw value; masking happens when the record is
/// written to a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdnResult {
    pub database: String,
    pub schema: String,
    pub table: String,
    pub table_kind: TableKind,
    pub column: String,
    pub evidence: EvidenceSource,
    pub sample_value: String,
    pub matched_pattern: String,
    pub category: PdnCategory,
}

impl PdnResult {
    /// Starts a record for `column` of `table` with no sample attached.
    pub fn new(
        database: &str,
        table: &TableInfo,
        column: &str,
        evidence: EvidenceSource,
        category: PdnCategory,
    ) -> Self {
        Self {
            database: database.to_string(),
            schema: table.schema.clone(),
            table: table.name.clone(),
            table_kind: table.kind,
            column: column.to_string(),
            evidence,
            sample_value: NOT_AVAILABLE.to_string(),
            matched_pattern: String::new(),
            category,
        }
    }

    /// Attaches an illustrative sample and its pattern.
    pub fn with_sample(mut self, sample: &SampleValue) -> Self {
        self.sample_value = sample.value.clone();
        self.matched_pattern = sample.pattern.clone();
        self
    }

    /// Record for a column whose analysis did not finish within its budget.
    pub fn timeout(database: &str, table: &TableInfo, column: &str) -> Self {
        Self::new(
            database,
            table,
            column,
            EvidenceSource::Timeout,
            PdnCategory::Unprocessed,
        )
    }

    /// Record for a column (or table) whose collaborator call failed.
    pub fn error(database: &str, table: &TableInfo, column: &str) -> Self {
        Self::new(
            database,
            table,
            column,
            EvidenceSource::Error,
            PdnCategory::Unprocessed,
        )
    }

    /// True when this record reports an actual personal-data category.
    pub fn is_flagged(&self) -> bool {
        !self.category.is_sentinel()
    }
}
