//! Command line front end for pdnscan.
//!
//! The binary lives in `main.rs`; argument definitions, connection
//! resolution, report writing and the scan driver are exposed here so they
//! can be tested without a terminal.
//!
//! # Module Structure
//! - `output`: CSV / JSON Lines report writer
//! - `prompt`: Interactive resolution of missing connection parameters
//! - `scan`: Connects, runs the scanner and wires the report writer

pub mod output;
pub mod prompt;
pub mod scan;

use clap::{Args, Parser, Subcommand, ValueEnum};
use pdnscan_core::{ConnectionConfig, DatabaseType, ScanConfig};
use std::path::PathBuf;
use std::time::Duration;

pub use output::ReportFormat;

/// CLI argument structure
#[derive(Debug, Parser)]
#[command(name = "pdnscan")]
#[command(about = "Personal data scanner for relational databases")]
#[command(version)]
#[command(long_about = "
pdnscan - locate personal data (PDN) in relational databases

Every table and view is walked; each column is classified by its name and by
a small sample of its values. One report row is written per finding.

SECURITY FEATURES:
- Read-only catalog and sample queries only
- Passwords are never logged or written to the report
- Every report row carries a masked copy of its sample value

SUPPORTED DATABASES:
- SQL Server (mssql:// or sqlserver://)
- PostgreSQL (postgres://) [if compiled with --features postgresql]
- SQLite (sqlite:// or .db/.sqlite files)

EXAMPLES:
  pdnscan --server db01 --database hr --username auditor
  PDNSCAN_PASSWORD=... pdnscan --server db01 --database hr --username auditor -o hr.csv
  pdnscan --database-url sqlite:///var/data/app.db --format jsonl -o app.jsonl
")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(flatten)]
    pub scan: ScanArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands; without one, a full scan runs.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Test database connection
    Test,
    /// List supported database types
    List,
}

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Increase verbosity
    #[arg(
        short,
        long,
        global = true,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv)"
    )]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true, help = "Suppress all output except errors")]
    pub quiet: bool,
}

/// Database engines selectable with `--engine`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Engine {
    #[default]
    Mssql,
    Postgres,
    Sqlite,
}

impl Engine {
    pub fn database_type(self) -> DatabaseType {
        match self {
            Engine::Mssql => DatabaseType::SqlServer,
            Engine::Postgres => DatabaseType::PostgreSQL,
            Engine::Sqlite => DatabaseType::SQLite,
        }
    }

    /// Port used when the operator leaves the port empty.
    pub fn default_port(self) -> Option<u16> {
        match self {
            Engine::Mssql => Some(1433),
            Engine::Postgres => Some(5432),
            Engine::Sqlite => None,
        }
    }
}

/// Where to connect. Either a URL or separate parameters; parameters that
/// are missing are prompted for.
#[derive(Debug, Args)]
pub struct ConnectionArgs {
    /// Database connection URL
    #[arg(
        long,
        env = "DATABASE_URL",
        hide_env_values = true,
        conflicts_with_all = ["server", "database_url_file"],
        help = "Database connection string (credentials will be sanitized in logs)"
    )]
    pub database_url: Option<String>,

    /// File holding the database connection URL
    #[arg(long, value_name = "FILE", help = "Read the connection string from a file")]
    pub database_url_file: Option<PathBuf>,

    #[arg(long, value_enum, env = "PDNSCAN_ENGINE", default_value_t = Engine::Mssql)]
    pub engine: Engine,

    /// Database server host name or address
    #[arg(long, env = "PDNSCAN_SERVER")]
    pub server: Option<String>,

    #[arg(long, env = "PDNSCAN_PORT")]
    pub port: Option<u16>,

    /// Database name, or the file path for SQLite
    #[arg(long, env = "PDNSCAN_DATABASE")]
    pub database: Option<String>,

    #[arg(long, env = "PDNSCAN_USERNAME")]
    pub username: Option<String>,

    /// Login password; prefer the environment variable over the flag
    #[arg(long, env = "PDNSCAN_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Accept the server's TLS certificate without validation
    #[arg(long, env = "PDNSCAN_TRUST_SERVER_CERTIFICATE")]
    pub trust_server_certificate: bool,

    /// Fail instead of prompting for missing parameters
    #[arg(long)]
    pub no_prompt: bool,

    #[arg(
        long,
        env = "PDNSCAN_CONNECT_TIMEOUT",
        default_value_t = 15,
        value_name = "SECONDS"
    )]
    pub connect_timeout: u64,
}

/// Report and budget settings.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Report file path
    #[arg(short, long, env = "PDNSCAN_OUTPUT", default_value = "report.csv")]
    pub output: PathBuf,

    #[arg(long, value_enum, env = "PDNSCAN_FORMAT", default_value_t = ReportFormat::Csv)]
    pub format: ReportFormat,

    /// Values sampled per column (5-50)
    #[arg(long, env = "PDNSCAN_SAMPLE_SIZE", default_value_t = 20)]
    pub sample_size: u32,

    /// Budget for one table: column listing plus every column analysis
    #[arg(
        long,
        env = "PDNSCAN_TABLE_TIMEOUT",
        default_value_t = 180,
        value_name = "SECONDS"
    )]
    pub table_timeout: u64,

    /// Budget for one column analysis
    #[arg(
        long,
        env = "PDNSCAN_COLUMN_TIMEOUT",
        default_value_t = 45,
        value_name = "SECONDS"
    )]
    pub column_timeout: u64,

    /// Budget for listing tables and views
    #[arg(
        long,
        env = "PDNSCAN_CATALOG_TIMEOUT",
        default_value_t = 120,
        value_name = "SECONDS"
    )]
    pub catalog_timeout: u64,

    /// Columns of one table analyzed at the same time
    #[arg(long, env = "PDNSCAN_MAX_CONCURRENCY", default_value_t = 5)]
    pub max_concurrency: usize,
}

impl ScanArgs {
    /// Builds the scanner settings; validation happens in the scan driver.
    pub fn scan_config(&self) -> ScanConfig {
        ScanConfig::new()
            .with_table_budget(Duration::from_secs(self.table_timeout))
            .with_column_budget(Duration::from_secs(self.column_timeout))
            .with_catalog_timeout(Duration::from_secs(self.catalog_timeout))
            .with_max_concurrent_columns(self.max_concurrency)
            .with_sample_size(self.sample_size)
    }
}

impl Cli {
    /// Connection settings shared by every engine. The pool is sized to the
    /// column concurrency so that every worker can hold a connection.
    pub fn connection_config(&self) -> ConnectionConfig {
        ConnectionConfig::default()
            .with_connect_timeout(Duration::from_secs(self.connection.connect_timeout))
            .with_max_connections(u32::try_from(self.scan.max_concurrency).unwrap_or(u32::MAX))
            .with_trust_server_certificate(self.connection.trust_server_certificate)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const ENV_VARS: [&str; 16] = [
        "DATABASE_URL",
        "PDNSCAN_ENGINE",
        "PDNSCAN_SERVER",
        "PDNSCAN_PORT",
        "PDNSCAN_DATABASE",
        "PDNSCAN_USERNAME",
        "PDNSCAN_PASSWORD",
        "PDNSCAN_TRUST_SERVER_CERTIFICATE",
        "PDNSCAN_CONNECT_TIMEOUT",
        "PDNSCAN_OUTPUT",
        "PDNSCAN_FORMAT",
        "PDNSCAN_SAMPLE_SIZE",
        "PDNSCAN_TABLE_TIMEOUT",
        "PDNSCAN_COLUMN_TIMEOUT",
        "PDNSCAN_CATALOG_TIMEOUT",
        "PDNSCAN_MAX_CONCURRENCY",
    ];

    /// Parses `args` with every pdnscan variable cleared, plus `vars`.
    fn parse_with_env(args: &[&str], vars: &[(&str, &str)]) -> Cli {
        let mut env: Vec<(&str, Option<&str>)> =
            ENV_VARS.iter().map(|name| (*name, None)).collect();
        env.extend(vars.iter().map(|(name, value)| (*name, Some(*value))));
        temp_env::with_vars(env, || Cli::try_parse_from(args).unwrap())
    }

    #[test]
    fn test_defaults() {
        let cli = parse_with_env(&["pdnscan"], &[]);

        assert!(cli.command.is_none());
        assert_eq!(cli.connection.engine, Engine::Mssql);
        assert_eq!(cli.scan.output, PathBuf::from("report.csv"));
        assert_eq!(cli.scan.format, ReportFormat::Csv);

        let config = cli.scan.scan_config();
        assert_eq!(config, ScanConfig::default());
        assert_eq!(cli.connection_config().max_connections, 5);
    }

    #[test]
    fn test_env_supplies_connection_parameters() {
        let cli = parse_with_env(
            &["pdnscan"],
            &[
                ("PDNSCAN_SERVER", "db01"),
                ("PDNSCAN_PORT", "14330"),
                ("PDNSCAN_DATABASE", "hr"),
                ("PDNSCAN_USERNAME", "auditor"),
                ("PDNSCAN_PASSWORD", "secret"),
            ],
        );

        assert_eq!(cli.connection.server.as_deref(), Some("db01"));
        assert_eq!(cli.connection.port, Some(14330));
        assert_eq!(cli.connection.database.as_deref(), Some("hr"));
        assert_eq!(cli.connection.username.as_deref(), Some("auditor"));
        assert_eq!(cli.connection.password.as_deref(), Some("secret"));
    }

    #[test]
    fn test_env_password_hidden_from_help() {
        let help = temp_env::with_var("PDNSCAN_PASSWORD", Some("secret"), || {
            use clap::CommandFactory;
            Cli::command().render_long_help().to_string()
        });
        assert!(!help.contains("secret"));
    }

    #[test]
    fn test_flags_override_env() {
        let cli = parse_with_env(
            &["pdnscan", "--sample-size", "10", "--format", "jsonl"],
            &[("PDNSCAN_SAMPLE_SIZE", "30"), ("PDNSCAN_FORMAT", "csv")],
        );

        assert_eq!(cli.scan.sample_size, 10);
        assert_eq!(cli.scan.format, ReportFormat::Jsonl);
    }

    #[test]
    fn test_budget_flags() {
        let cli = parse_with_env(
            &[
                "pdnscan",
                "--table-timeout",
                "60",
                "--column-timeout",
                "20",
                "--catalog-timeout",
                "30",
                "--max-concurrency",
                "2",
            ],
            &[],
        );
        let config = cli.scan.scan_config();

        assert_eq!(config.table_budget, Duration::from_secs(60));
        assert_eq!(config.column_budget, Duration::from_secs(20));
        assert_eq!(config.catalog_timeout, Duration::from_secs(30));
        assert_eq!(config.max_concurrent_columns, 2);
        assert_eq!(cli.connection_config().max_connections, 2);
    }

    #[test]
    fn test_database_url_conflicts_with_server() {
        let result = temp_env::with_vars(
            ENV_VARS.iter().map(|name| (*name, None::<&str>)).collect::<Vec<_>>(),
            || {
                Cli::try_parse_from([
                    "pdnscan",
                    "--database-url",
                    "mssql://db01/hr",
                    "--server",
                    "db02",
                ])
            },
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_subcommands() {
        let cli = parse_with_env(&["pdnscan", "test", "-v"], &[]);
        assert!(matches!(cli.command, Some(Command::Test)));
        assert_eq!(cli.global.verbose, 1);

        let cli = parse_with_env(&["pdnscan", "list"], &[]);
        assert!(matches!(cli.command, Some(Command::List)));
    }

    #[test]
    fn test_engine_defaults() {
        assert_eq!(Engine::Mssql.default_port(), Some(1433));
        assert_eq!(Engine::Postgres.database_type(), DatabaseType::PostgreSQL);
        assert_eq!(Engine::Sqlite.default_port(), None);
    }
}
