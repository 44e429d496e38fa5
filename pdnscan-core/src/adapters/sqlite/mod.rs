//! SQLite scan source.
//!
//! # SQLite Catalog
//! - `sqlite_master`: tables and views (internal `sqlite_%` objects skipped)
//! - `pragma_table_info()`: columns with their declared types
//!
//! SQLite has no schemas in the SQL Server sense; every object is reported
//! under `main`.

mod connection;

use super::helpers::{quote_ansi_identifier, retain_sample_values};
use super::{ConnectionConfig, ScanSource};
use crate::models::{ColumnInfo, DatabaseType, TableInfo, TableKind};
use crate::{PdnScanError, Result};
use async_trait::async_trait;
use sqlx::SqlitePool;

const MAIN_SCHEMA: &str = "main";

const LIST_TABLES_QUERY: &str = "
    SELECT name, type FROM sqlite_master
    WHERE type IN ('table', 'view') AND name NOT LIKE 'sqlite_%'
    ORDER BY name";

const LIST_COLUMNS_QUERY: &str = "SELECT name, type FROM pragma_table_info(?1) ORDER BY cid";

/// SQLite source over a read-only file pool.
pub struct SqliteSource {
    pool: SqlitePool,
    config: ConnectionConfig,
    database_name: String,
}

impl std::fmt::Debug for SqliteSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteSource")
            .field("config", &self.config)
            .field("database_name", &self.database_name)
            .finish_non_exhaustive()
    }
}

impl SqliteSource {
    /// Opens the database file named by `config.database`.
    ///
    /// # Errors
    /// Returns error if the path is missing or the file cannot be opened
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let pool = connection::create_pool(config).await?;
        let database_name =
            connection::database_name(config.database.as_deref().unwrap_or_default());

        tracing::debug!("Opened SQLite database {}", database_name);

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
         WHERE {column} IS NOT NULL AND CAST({column} AS TEXT) <> '' LIMIT ?1",
        quote_ansi_identifier(&table.schema),
        quote_ansi_identifier(&table.name),
    )
}

#[async_trait]
impl ScanSource for SqliteSource {
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
        let rows: Vec<(String, String)> = sqlx::query_as(LIST_TABLES_QUERY)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| PdnScanError::collection_failed("Failed to read sqlite_master", e))?;

        Ok(rows
            .into_iter()
            .map(|(name, kind)| TableInfo::new(MAIN_SCHEMA, name, TableKind::from_catalog(&kind)))
            .collect())
    }

    async fn list_columns(&self, table: &TableInfo) -> Result<Vec<ColumnInfo>> {
        let rows: Vec<(String, String)> = sqlx::query_as(LIST_COLUMNS_QUERY)
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
        DatabaseType::SQLite
    }

    fn database_name(&self) -> String {
        self.database_name.clone()
    }

    fn connection_config(&self) -> ConnectionConfig {
        self.config.clone()
    }
}
