//! SQL Server scan source over TDS (`tiberius`).
//!
//! # Catalog
//! - Tables and views come from `sys.tables` and `sys.views`
//! - Columns come from `sys.columns` joined with `sys.types`
//!
//! # Connections
//! `tiberius` clients are not shareable, so the source keeps a small stack of
//! idle clients guarded by a semaphore of `max_connections` permits. A client
//! is only returned to the stack after a query completes; clients dropped by a
//! cancelled or failed query are discarded.

use super::helpers::{quote_mssql_identifier, retain_sample_values};
use super::{ConnectionConfig, ScanSource};
use crate::models::{ColumnInfo, DatabaseType, TableInfo, TableKind};
use crate::security::Credentials;
use crate::{PdnScanError, Result};
use async_trait::async_trait;
use std::sync::Mutex;
use tiberius::{AuthMethod, Client, Config, Row, ToSql};
use tokio::net::TcpStream;
use tokio::sync::Semaphore;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};

type SqlClient = Client<Compat<TcpStream>>;

const DEFAULT_PORT: u16 = 1433;

const LIST_TABLES_QUERY: &str = "
    SELECT s.name AS schema_name, t.name AS table_name, t.type_desc AS table_type
    FROM sys.tables t
    INNER JOIN sys.schemas s ON t.schema_id = s.schema_id
    UNION ALL
    SELECT s.name AS schema_name, v.name AS table_name, 'VIEW' AS table_type
    FROM sys.views v
    INNER JOIN sys.schemas s ON v.schema_id = s.schema_id
    ORDER BY schema_name, table_name";

const LIST_COLUMNS_QUERY: &str = "
    SELECT c.name AS column_name, tp.name AS data_type
    FROM sys.columns c
    JOIN sys.objects o ON c.object_id = o.object_id
    JOIN sys.schemas s ON o.schema_id = s.schema_id
    JOIN sys.types tp ON c.user_type_id = tp.user_type_id
    WHERE s.name = @P1 AND o.name = @P2
    ORDER BY c.column_id";

/// SQL Server source with a bounded set of reusable connections.
pub struct SqlServerSource {
    config: ConnectionConfig,
    tds_config: Config,
    database_name: String,
    permits: Semaphore,
    idle: Mutex<Vec<SqlClient>>,
}

impl std::fmt::Debug for SqlServerSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlServerSource")
            .field("config", &self.config)
            .field("database_name", &self.database_name)
            // tds_config carries the password
            .finish_non_exhaustive()
    }
}

impl SqlServerSource {
    /// Connects to SQL Server and resolves the current database name.
    ///
    /// # Security
    /// - Credentials are copied into the driver config only
    /// - Connection failures never include the password
    ///
    /// # Errors
    /// Returns error if the server is unreachable, the login fails, or the
    /// connect timeout expires.
    pub async fn connect(config: &ConnectionConfig, credentials: &Credentials) -> Result<Self> {
        let tds_config = build_tds_config(config, credentials);
        let mut source = Self {
            config: config.clone(),
            tds_config,
            database_name: config.database.clone().unwrap_or_default(),
            permits: Semaphore::new(config.max_connections as usize),
            idle: Mutex::new(Vec::new()),
        };

        let rows = source.query_rows("SELECT DB_NAME()", &[], "current database").await?;
        if let Some(name) = rows
            .first()
            .and_then(|row| row.try_get::<&str, _>(0).ok().flatten())
        {
            source.database_name = name.to_string();
        }

        tracing::debug!(
            "Connected to SQL Server {} (database {})",
            source.config,
            source.database_name
        );
        Ok(source)
    }

    async fn open(&self) -> Result<SqlClient> {
        let connect = async {
            let tcp = TcpStream::connect(self.tds_config.get_addr())
                .await
                .map_err(PdnScanError::connection_failed)?;
            tcp.set_nodelay(true)
                .map_err(PdnScanError::connection_failed)?;
            Client::connect(self.tds_config.clone(), tcp.compat_write())
                .await
                .map_err(PdnScanError::connection_failed)
        };

        tokio::time::timeout(self.config.connect_timeout, connect)
            .await
            .map_err(|_| PdnScanError::timeout("SQL Server connect", self.config.connect_timeout))?
    }

    /// Runs one query on a pooled client and returns its first result set.
    async fn query_rows(
        &self,
        sql: &str,
        params: &[&dyn ToSql],
        context: &str,
    ) -> Result<Vec<Row>> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| PdnScanError::query_failed("SQL Server connection limiter closed"))?;

        let idle_client = self.idle.lock().ok().and_then(|mut idle| idle.pop());
        let mut client = match idle_client {
            Some(client) => client,
            None => self.open().await?,
        };

        let result = match client.query(sql, params).await {
            Ok(stream) => stream.into_first_result().await,
            Err(e) => Err(e),
        };

        match result {
            Ok(rows) => {
                if let Ok(mut idle) = self.idle.lock() {
                    idle.push(client);
                }
                Ok(rows)
            }
            Err(e) => Err(PdnScanError::collection_failed(
                format!("SQL Server query failed: {context}"),
                e,
            )),
        }
    }
}

fn build_tds_config(config: &ConnectionConfig, credentials: &Credentials) -> Config {
    let mut tds_config = Config::new();
    tds_config.host(&config.host);
    tds_config.port(config.port.unwrap_or(DEFAULT_PORT));
    tds_config.application_name("pdnscan");
    tds_config.authentication(AuthMethod::sql_server(
        credentials.username(),
        credentials.password().unwrap_or_default(),
    ));

    if let Some(database) = &config.database {
        tds_config.database(database);
    }

    if config.trust_server_certificate {
        tds_config.trust_cert();
    }

    tds_config
}

/// Builds the sampling statement; `@P1` binds the row limit.
fn sample_query(table: &TableInfo, column: &ColumnInfo) -> String {
    let column = quote_mssql_identifier(&column.name);
    format!(
        "SELECT TOP (@P1) CAST({column} AS NVARCHAR(MAX)) AS sample_value \
         FROM {}.{} WITH (NOLOCK) \
         WHERE {column} IS NOT NULL AND CAST({column} AS NVARCHAR(MAX)) <> N''",
        quote_mssql_identifier(&table.schema),
        quote_mssql_identifier(&table.name),
    )
}

fn text_at(row: &Row, index: usize) -> Option<String> {
    row.try_get::<&str, _>(index)
        .ok()
        .flatten()
        .map(str::to_string)
}

#[async_trait]
impl ScanSource for SqlServerSource {
    async fn test_connection(&self) -> Result<()> {
        self.query_rows("SELECT 1", &[], "connectivity check")
            .await
            .map(|_| ())
    }

    async fn list_tables(&self) -> Result<Vec<TableInfo>> {
        let rows = self
            .query_rows(LIST_TABLES_QUERY, &[], "list tables")
            .await?;

        let tables: Vec<TableInfo> = rows
            .iter()
            .filter_map(|row| {
                let schema = text_at(row, 0)?;
                let name = text_at(row, 1)?;
                let kind = text_at(row, 2).unwrap_or_default();
                Some(TableInfo::new(schema, name, TableKind::from_catalog(&kind)))
            })
            .collect();

        tracing::debug!("SQL Server catalog lists {} tables and views", tables.len());
        Ok(tables)
    }

    async fn list_columns(&self, table: &TableInfo) -> Result<Vec<ColumnInfo>> {
        let params: [&dyn ToSql; 2] = [&table.schema, &table.name];
        let rows = self
            .query_rows(LIST_COLUMNS_QUERY, &params, "list columns")
            .await?;

        Ok(rows
            .iter()
            .filter_map(|row| {
                let name = text_at(row, 0)?;
                let declared_type = text_at(row, 1).unwrap_or_default();
                Some(ColumnInfo::new(name, declared_type))
            })
            .collect())
    }

    async fn sample_values(
        &self,
        table: &TableInfo,
        column: &ColumnInfo,
        limit: u32,
    ) -> Result<Vec<String>> {
        let sql = sample_query(table, column);
        let limit_param = i64::from(limit);
        let rows = self
            .query_rows(&sql, &[&limit_param], "sample values")
            .await?;

        Ok(retain_sample_values(
            rows.iter().map(|row| text_at(row, 0)),
            limit,
        ))
    }

    fn database_type(&self) -> DatabaseType {
        DatabaseType::SqlServer
    }

    fn database_name(&self) -> String {
        self.database_name.clone()
    }

    fn connection_config(&self) -> ConnectionConfig {
        self.config.clone()
    }
}
