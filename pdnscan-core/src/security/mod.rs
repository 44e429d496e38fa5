//! Credential protection and sample masking.
//!
//! # Security Guarantees
//! - Credentials are stored in `Zeroizing` containers for automatic memory clearing
//! - Connection strings are parsed to extract credentials safely
//! - Report rows get a masked copy of each sampled value
//!
//! # Module Structure
//! - `credentials`: Secure credential container with automatic memory zeroing
//! - `connection`: Connection string parsing and info extraction
//! - `masking`: Partial masking of sampled values

mod connection;
mod credentials;
mod masking;

pub use connection::{ConnectionInfo, parse_connection_string};
pub use credentials::Credentials;
pub use masking::mask_sample_value;
