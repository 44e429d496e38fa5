//! PostgreSQL connection pool setup.
//!
//! # Security Features
//! - Credentials go straight into `PgConnectOptions`, never into a URL string
//! - Sessions are read-only by default (`default_transaction_read_only`)
//! - Pool size and acquire timeout come from `ConnectionConfig`

use super::super::ConnectionConfig;
use crate::security::Credentials;
use crate::{PdnScanError, Result};
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

const DEFAULT_PORT: u16 = 5432;

/// Builds connect options from separated connection parameters.
pub(crate) fn connect_options(config: &ConnectionConfig, credentials: &Credentials) -> PgConnectOptions {
    let mut options = PgConnectOptions::new()
        .host(&config.host)
        .port(config.port.unwrap_or(DEFAULT_PORT))
        .application_name("pdnscan");

    if let Some(database) = &config.database {
        options = options.database(database);
    }

    if !credentials.username().is_empty() {
        options = options.username(credentials.username());
    }

    if let Some(password) = credentials.password() {
        options = options.password(password);
    }

    options
}

/// Opens a connection pool and applies session settings to every connection.
///
/// # Errors
/// Returns a connection error if the first connection cannot be established
/// within the connect timeout.
pub(crate) async fn create_pool(
    config: &ConnectionConfig,
    credentials: &Credentials,
) -> Result<PgPool> {
    use sqlx::Executor;

    let read_only = config.read_only;

    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.connect_timeout)
        .after_connect(move |conn, _meta| {
            Box::pin(async move {
                if read_only {
                    conn.execute("SET default_transaction_read_only = on")
                        .await?;
                }
                Ok(())
            })
        })
        .connect_with(connect_options(config, credentials))
        .await
        .map_err(PdnScanError::connection_failed)
}
