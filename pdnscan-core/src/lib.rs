//! Core engine of pdnscan, a personal data (PDN) scanner for relational
//! databases.
//!
//! The engine walks every table and view of a database, samples each column,
//! and classifies both the column name and the sampled values against a rule
//! table of personal data categories (e-mail, phone, passport, SNILS, tax id,
//! names, addresses and more). Each (table, column, evidence) triple becomes
//! one [`PdnResult`].
//!
//! # Security Guarantees
//! - All database operations are read-only
//! - Credentials are held in zeroizing containers and never logged
//! - Report rows carry a masked copy of every sampled value
//!
//! # Architecture
//! - [`abstraction`]: value shapes used to deduplicate samples
//! - [`classifier`]: pure, rule-based classification
//! - [`analyzer`]: sampling plus classification for one column
//! - [`scanner`]: timeout hierarchy, fan-out and table-level policy
//! - [`adapters`]: the [`ScanSource`] trait and engine implementations
//! - [`sink`]: where finished records are pushed

pub mod abstraction;
pub mod adapters;
pub mod analyzer;
pub mod classifier;
pub mod error;
pub mod logging;
pub mod models;
pub mod scanner;
pub mod security;
pub mod sink;

// Re-export commonly used types
pub use adapters::{
    ConnectionConfig, SamplingConfig, ScanConfig, ScanSource, connect_source, create_source,
    detect_database_type,
};
pub use error::{PdnScanError, Result};
pub use models::{
    ColumnInfo, DatabaseType, EvidenceSource, PdnCategory, PdnResult, SampleValue, TableInfo,
    TableKind,
};
pub use scanner::{ScanSummary, Scanner, TableReport};
pub use sink::{ChannelSink, MemorySink, ResultSink};
