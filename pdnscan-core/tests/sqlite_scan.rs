//! SQLite source and full scan tests against real database files.

#![cfg(feature = "sqlite")]
#![allow(clippy::unwrap_used)]

use pdnscan_core::{
    ConnectionConfig, DatabaseType, EvidenceSource, MemorySink, PdnCategory, ScanConfig, Scanner,
    TableKind, create_source,
};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use std::path::Path;
use tokio_util::sync::CancellationToken;

/// Creates a database file with a clients table, a view and a stock table.
async fn seed_database(path: &Path) {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .journal_mode(SqliteJournalMode::Delete)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .unwrap();

    for statement in [
        "CREATE TABLE clients (id INTEGER PRIMARY KEY, email_address TEXT, contact TEXT, quantity INTEGER)",
        "INSERT INTO clients (email_address, contact, quantity) VALUES (NULL, 'ivanov@mail.ru', 3)",
        "INSERT INTO clients (email_address, contact, quantity) VALUES ('', 'petrov@mail.ru', 4)",
        "CREATE TABLE stock (sku TEXT, location TEXT)",
        "INSERT INTO stock VALUES ('A-1', 'ул. Ленина, дом 5')",
        "CREATE VIEW v_contacts AS SELECT contact FROM clients",
    ] {
        sqlx::query(statement).execute(&pool).await.unwrap();
    }

    pool.close().await;
}

#[tokio::test]
async fn test_sqlite_catalog_and_samples() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("people.db");
    seed_database(&path).await;

    let source = create_source(
        &format!("sqlite://{}", path.display()),
        &ConnectionConfig::default(),
    )
    .await
    .unwrap();

    assert_eq!(source.database_type(), DatabaseType::SQLite);
    assert_eq!(source.database_name(), "people.db");
    source.test_connection().await.unwrap();

    let tables = source.list_tables().await.unwrap();
    let names: Vec<(&str, TableKind)> = tables.iter().map(|t| (t.name.as_str(), t.kind)).collect();
    assert_eq!(
        names,
        vec![
            ("clients", TableKind::Table),
            ("stock", TableKind::Table),
            ("v_contacts", TableKind::View),
        ]
    );

    let columns = source.list_columns(&tables[0]).await.unwrap();
    let column_names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(column_names, vec!["id", "email_address", "contact", "quantity"]);

    // NULL and empty strings are never sampled
    let emails = source
        .sample_values(&tables[0], &columns[1], 20)
        .await
        .unwrap();
    assert!(emails.is_empty());

    let contacts = source
        .sample_values(&tables[0], &columns[2], 1)
        .await
        .unwrap();
    assert_eq!(contacts.len(), 1);

    // Integers come back as text
    let quantities = source
        .sample_values(&tables[0], &columns[3], 20)
        .await
        .unwrap();
    assert_eq!(quantities.len(), 2);
    assert!(quantities.iter().all(|q| q.parse::<i64>().is_ok()));
}

#[tokio::test]
async fn test_sqlite_full_scan() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("people.db");
    seed_database(&path).await;

    let source = create_source(&path.display().to_string(), &ConnectionConfig::default())
        .await
        .unwrap();
    let scanner = Scanner::new(source, ScanConfig::default());
    let sink = MemorySink::new();

    let summary = scanner.run(&sink, CancellationToken::new()).await.unwrap();
    let results = sink.into_results();

    assert_eq!(summary.tables_total, 3);
    assert_eq!(summary.tables_scanned, 3);
    assert!(!summary.interrupted);

    let email_header = results
        .iter()
        .find(|r| r.table == "clients" && r.column == "email_address")
        .unwrap();
    assert_eq!(email_header.evidence, EvidenceSource::Header);

    let contact_values: Vec<_> = results
        .iter()
        .filter(|r| r.table == "clients" && r.column == "contact")
        .collect();
    // Both addresses share one shape, so only the first is reported
    assert_eq!(contact_values.len(), 1);
    assert_eq!(contact_values[0].evidence, EvidenceSource::Value);
    assert_eq!(contact_values[0].category, PdnCategory::Email);

    // stock holds nothing but an address, which is suppressed
    assert!(
        results
            .iter()
            .filter(|r| r.table == "stock")
            .all(|r| r.category != PdnCategory::Address)
    );

    let view: Vec<_> = results.iter().filter(|r| r.table == "v_contacts").collect();
    assert!(!view.is_empty());
    assert!(view.iter().all(|r| r.table_kind == TableKind::View));
}
