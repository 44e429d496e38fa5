//! Configuration types for scan sources and the scan engine.
//!
//! - `ConnectionConfig`: Database connection settings
//! - `SamplingConfig`: Per-column sampling settings
//! - `ScanConfig`: Time budgets and concurrency of a scan
//!
//! # Security
//! These configuration structs intentionally do NOT store passwords or credentials.
//! Credentials must be handled separately through the security module.

mod connection;
mod sampling;
mod scan;

pub use connection::ConnectionConfig;
pub use sampling::SamplingConfig;
pub use scan::ScanConfig;
