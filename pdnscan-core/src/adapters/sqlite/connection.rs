//! SQLite connection handling.
//!
//! SQLite uses file-based databases; `ConnectionConfig::database` holds the
//! file path. Files are opened read-only by default and never created.

use super::super::ConnectionConfig;
use crate::{PdnScanError, Result};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::Path;

/// Opens a pool over the database file named in `config.database`.
///
/// # Errors
/// Returns error if no path is configured or the file cannot be opened
pub(crate) async fn create_pool(config: &ConnectionConfig) -> Result<SqlitePool> {
    let path = config
        .database
        .as_deref()
        .filter(|path| !path.is_empty())
        .ok_or_else(|| PdnScanError::configuration("SQLite database path is required"))?;

    let options = SqliteConnectOptions::new()
        .filename(path)
        .read_only(config.read_only)
        .create_if_missing(false);

    SqlitePoolOptions::new()
        .max_connections(config.max_connections.max(1))
        .acquire_timeout(config.connect_timeout)
        .connect_with(options)
        .await
        .map_err(PdnScanError::connection_failed)
}

/// Name used in reports for a database file: its file name, or the path
/// itself when it has none.
pub(crate) fn database_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .map_or_else(|| path.to_string(), str::to_string)
}
