//! PostgreSQL scan source.
//!
//! # Module Structure
//! - `connection`: Pool setup with read-only sessions
//!
//! The catalog comes from `information_schema`; system schemas are skipped.
//! Every sampled value is cast to `TEXT` on the server.

mod connection;

use super::helpers::{quote_ansi_identifier, retain_sample_values};
use super::{ConnectionConfig, ScanSource};
use crate::models::{ColumnInfo, DatabaseType, TableInfo, TableKind};
use crate::security::Credentials;
use crate::{PdnScanError, Result};
use async_trait::async_trait;
use sqlx::PgPool;

const LIST_TABLES_QUERY: &str = "
    SELECT table_schema::text, table_name::text, table_type::text
    FROM information_schema.tables
    WHERE table_schema NOT IN ('pg_catalog', 'information_schema')
      AND table_schema NOT LIKE 'pg_toast%'
      AND table_type IN ('BASE TABLE', 'VIEW')
    ORDER BY table_schema, table_name";

const LIST_COLUMNS_QUERY: &str = "
    SELECT column_name::text, data_type::text
    FROM information_schema.columns
    WHERE table_schema = $1 AND table_name = $2
    ORDER BY ordinal_position";

/// PostgreSQL source backed by a `sqlx` pool.
pub struct PostgresSource {
    pool: PgPool,
    config: ConnectionConfig,
    database_name: String,
}

impl std::fmt::Debug for PostgresSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresSource")
            .field("config", &self.config)
            .field("database_name", &self.database_name)
            .field("pool_size", &self.pool.size())
            .finish()
    }
}

impl PostgresSource {
    /// Connects and resolves the current database name.
    ///
    /// # Errors
    /// Returns error if the pool cannot be created or the server is unreachable
    pub async fn connect(config: &ConnectionConfig, credentials: &Credentials) -> Result<Self> {
        let pool = connection::create_pool(config, credentials).await?;

        let database_name: String = sqlx::query_scalar("SELECT current_database()::text")
            .fetch_one(&pool)
            .await
            .map_err(PdnScanError::connection_failed)?;

        tracing::debug!(
            "Connected to PostgreSQL {} (database {})",
            config,
            database_name
        );

        Ok(Self {
            pool,
            config: config.clone(),
            database_name,
        })
    }
}

fn sample_query(table: &TableInfo, column: &ColumnInfo) -> String {
    let column = quote_ansi_identifier(&column.name);
    format!(
        "SELECT CAST({column} AS TEXT) FROM {}.{} \
         WHERE {column} IS NOT NULL AND CAST({column} AS TEXT) <> '' LIMIT $1",
        quote_ansi_identifier(&table.schema),
        quote_ansi_identifier(&table.name),
    )
}

#[async_trait]
impl ScanSource for PostgresSource {
    async fn test_connection(&self) -> Result<()> {
        let probe: i32 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(PdnScanError::connection_failed)?;

        if probe != 1 {
            return Err(PdnScanError::query_failed(
                "Basic connectivity test failed: unexpected result",
            ));
        }
        Ok(())
    }

    async fn list_tables(&self) -> Result<Vec<TableInfo>> {
        let rows: Vec<(String, String, String)> = sqlx::query_as(LIST_TABLES_QUERY)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| PdnScanError::collection_failed("Failed to list PostgreSQL tables", e))?;

        Ok(rows
            .into_iter()
            .map(|(schema, name, kind)| TableInfo::new(schema, name, TableKind::from_catalog(&kind)))
            .collect())
    }

    async fn list_columns(&self, table: &TableInfo) -> Result<Vec<ColumnInfo>> {
        let rows: Vec<(String, String)> = sqlx::query_as(LIST_COLUMNS_QUERY)
            .bind(&table.schema)
            .bind(&table.name)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                PdnScanError::collection_failed(
                    format!("Failed to list columns of {}", table.qualified_name()),
                    e,
                )
            })?;

        Ok(rows
            .into_iter()
            .map(|(name, declared_type)| ColumnInfo::new(name, declared_type))
            .collect())
    }

    async fn sample_values(
        &self,
        table: &TableInfo,
        column: &ColumnInfo,
        limit: u32,
    ) -> Result<Vec<String>> {
        let values: Vec<Option<String>> = sqlx::query_scalar(&sample_query(table, column))
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                PdnScanError::collection_failed(
                    format!("Failed to sample {}.{}", table.qualified_name(), column.name),
                    e,
                )
            })?;

        Ok(retain_sample_values(values, limit))
    }

    fn database_type(&self) -> DatabaseType {
        DatabaseType::PostgreSQL
    }

    fn database_name(&self) -> String {
        self.database_name.clone()
    }

    fn connection_config(&self) -> ConnectionConfig {
        self.config.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_query_quotes_identifiers() {
        let table = TableInfo::new("public", "clients", TableKind::Table);
        let column = ColumnInfo::new("e\"mail", "text");
        assert_eq!(
            sample_query(&table, &column),
            "SELECT CAST(\"e\"\"mail\" AS TEXT) FROM \"public\".\"clients\" \
             WHERE \"e\"\"mail\" IS NOT NULL AND CAST(\"e\"\"mail\" AS TEXT) <> '' LIMIT $1"
        );
    }
}
