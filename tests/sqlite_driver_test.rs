//! End-to-end tests for the bundled SQLite binding.

#![cfg(feature = "sqlite")]

use serde_json::Value as JsonValue;
use sqlbridge::{
    CompiledStatement, Driver, DriverConfig, DriverError, SqlParam, SqliteConnectionPool,
};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

async fn sqlite_driver(dir: &TempDir) -> Driver {
    let url = format!("sqlite:{}", dir.path().join("test.db").display());
    let pool = SqliteConnectionPool::connect(&url).await.unwrap();
    Driver::new(DriverConfig::new(Arc::new(pool)))
}

#[tokio::test]
async fn test_execute_and_read_back() {
    let dir = TempDir::new().unwrap();
    let driver = sqlite_driver(&dir).await;

    let conn = driver.acquire_connection().await.unwrap();
    conn.execute(&CompiledStatement::raw(
        "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT, score REAL)",
    ))
    .await
    .unwrap();

    let insert = conn
        .execute(&CompiledStatement::with_params(
            "INSERT INTO users (id, name, score) VALUES (?, ?, ?)",
            vec![
                SqlParam::Int(1),
                SqlParam::Text("alice".to_string()),
                SqlParam::Float(9.5),
            ],
        ))
        .await
        .unwrap();
    assert_eq!(insert.rows_affected, 1);

    let result = conn
        .execute(&CompiledStatement::raw("SELECT id, name, score FROM users"))
        .await
        .unwrap();
    assert_eq!(result.rows.len(), 1);
    let row = &result.rows[0];
    assert_eq!(row["id"], JsonValue::from(1));
    assert_eq!(row["name"], JsonValue::from("alice"));
    assert_eq!(row["score"], JsonValue::from(9.5));

    driver.release_connection(&conn).await;
    driver.destroy().await.unwrap();
}

#[tokio::test]
async fn test_transaction_commit_and_rollback() {
    let dir = TempDir::new().unwrap();
    let driver = sqlite_driver(&dir).await;

    let conn = driver.acquire_connection().await.unwrap();
    conn.execute(&CompiledStatement::raw("CREATE TABLE t (a INTEGER)"))
        .await
        .unwrap();

    // SQLite sessions are autocommit; demarcation is an explicit BEGIN
    // through the execute path, begin_transaction is the contract hook.
    driver.begin_transaction(&conn).await.unwrap();
    conn.execute(&CompiledStatement::raw("BEGIN")).await.unwrap();
    conn.execute(&CompiledStatement::raw("INSERT INTO t VALUES (1)"))
        .await
        .unwrap();
    driver.commit_transaction(&conn).await.unwrap();

    conn.execute(&CompiledStatement::raw("BEGIN")).await.unwrap();
    conn.execute(&CompiledStatement::raw("INSERT INTO t VALUES (2)"))
        .await
        .unwrap();
    driver.rollback_transaction(&conn).await.unwrap();

    let result = conn
        .execute(&CompiledStatement::raw("SELECT a FROM t ORDER BY a"))
        .await
        .unwrap();
    assert_eq!(result.rows.len(), 1);
    assert_eq!(result.rows[0]["a"], JsonValue::from(1));

    driver.release_connection(&conn).await;
    driver.destroy().await.unwrap();
}

#[tokio::test]
async fn test_release_mid_transaction_returns_clean_session() {
    let dir = TempDir::new().unwrap();
    let url = format!("sqlite:{}", dir.path().join("test.db").display());
    // A single-connection pool so the second acquire reuses the session
    // the first checkout handed back.
    let pool = SqliteConnectionPool::connect_with(&url, 1, Duration::from_secs(5))
        .await
        .unwrap();
    let driver = Driver::new(DriverConfig::new(Arc::new(pool)));

    let conn = driver.acquire_connection().await.unwrap();
    conn.execute(&CompiledStatement::raw("CREATE TABLE t (a INTEGER)"))
        .await
        .unwrap();
    conn.execute(&CompiledStatement::raw("BEGIN")).await.unwrap();
    conn.execute(&CompiledStatement::raw("INSERT INTO t VALUES (1)"))
        .await
        .unwrap();
    // Released with the transaction still open.
    driver.release_connection(&conn).await;

    let conn = driver.acquire_connection().await.unwrap();
    // A fresh checkout must be in autocommit, so BEGIN succeeds.
    conn.execute(&CompiledStatement::raw("BEGIN")).await.unwrap();
    let result = conn
        .execute(&CompiledStatement::raw("SELECT a FROM t"))
        .await
        .unwrap();
    // The abandoned insert was rolled back at release time.
    assert!(result.rows.is_empty());
    driver.rollback_transaction(&conn).await.unwrap();

    driver.destroy().await.unwrap();
}

#[tokio::test]
async fn test_blob_round_trip() {
    let dir = TempDir::new().unwrap();
    let driver = sqlite_driver(&dir).await;

    let conn = driver.acquire_connection().await.unwrap();
    conn.execute(&CompiledStatement::raw(
        "CREATE TABLE files (id INTEGER PRIMARY KEY, data BLOB)",
    ))
    .await
    .unwrap();

    conn.execute(&CompiledStatement::with_params(
        "INSERT INTO files (id, data) VALUES (?, ?)",
        vec![
            SqlParam::Int(1),
            SqlParam::Bytes(vec![0xde, 0xad, 0xbe, 0xef]),
        ],
    ))
    .await
    .unwrap();

    let result = conn
        .execute(&CompiledStatement::raw("SELECT data FROM files"))
        .await
        .unwrap();
    assert_eq!(result.rows.len(), 1);
    // Blob columns come back base64 encoded.
    assert_eq!(result.rows[0]["data"], JsonValue::from("3q2+7w=="));

    driver.destroy().await.unwrap();
}

#[tokio::test]
async fn test_savepoint_round_trip() {
    let dir = TempDir::new().unwrap();
    let driver = sqlite_driver(&dir).await;

    let conn = driver.acquire_connection().await.unwrap();
    conn.execute(&CompiledStatement::raw("CREATE TABLE t (a INTEGER)"))
        .await
        .unwrap();

    conn.execute(&CompiledStatement::raw("BEGIN")).await.unwrap();
    conn.execute(&CompiledStatement::raw("INSERT INTO t VALUES (1)"))
        .await
        .unwrap();

    driver.savepoint(&conn, "sp1").await.unwrap();
    conn.execute(&CompiledStatement::raw("INSERT INTO t VALUES (2)"))
        .await
        .unwrap();
    driver.rollback_to_savepoint(&conn, "sp1").await.unwrap();
    driver.release_savepoint(&conn, "sp1").await.unwrap();

    driver.commit_transaction(&conn).await.unwrap();

    let result = conn
        .execute(&CompiledStatement::raw("SELECT a FROM t"))
        .await
        .unwrap();
    assert_eq!(result.rows.len(), 1);
    assert_eq!(result.rows[0]["a"], JsonValue::from(1));

    driver.destroy().await.unwrap();
}

#[tokio::test]
async fn test_unknown_savepoint_is_an_engine_error() {
    let dir = TempDir::new().unwrap();
    let driver = sqlite_driver(&dir).await;

    let conn = driver.acquire_connection().await.unwrap();
    let result = driver.rollback_to_savepoint(&conn, "never_created").await;
    assert!(matches!(result, Err(DriverError::Engine { .. })));

    driver.destroy().await.unwrap();
}

#[tokio::test]
async fn test_commit_without_transaction_is_an_engine_error() {
    let dir = TempDir::new().unwrap();
    let driver = sqlite_driver(&dir).await;

    let conn = driver.acquire_connection().await.unwrap();
    let err = driver.commit_transaction(&conn).await.unwrap_err();
    assert!(matches!(err, DriverError::Engine { .. }));

    driver.destroy().await.unwrap();
}

#[tokio::test]
async fn test_released_connection_rejects_statements() {
    let dir = TempDir::new().unwrap();
    let driver = sqlite_driver(&dir).await;

    let conn = driver.acquire_connection().await.unwrap();
    driver.release_connection(&conn).await;

    // The wrapper is still held here, but its raw session is gone.
    let result = conn.execute(&CompiledStatement::raw("SELECT 1")).await;
    assert!(matches!(result, Err(DriverError::Closed)));

    driver.destroy().await.unwrap();
}

#[tokio::test]
async fn test_two_connections_have_isolated_sessions() {
    let dir = TempDir::new().unwrap();
    let driver = sqlite_driver(&dir).await;

    let a = driver.acquire_connection().await.unwrap();
    let b = driver.acquire_connection().await.unwrap();
    assert_ne!(a.identifier(), b.identifier());

    a.execute(&CompiledStatement::raw("CREATE TABLE t (a INTEGER)"))
        .await
        .unwrap();
    a.execute(&CompiledStatement::raw("INSERT INTO t VALUES (1)"))
        .await
        .unwrap();

    // Autocommitted work on one session is visible to the other.
    let result = b
        .execute(&CompiledStatement::raw("SELECT a FROM t"))
        .await
        .unwrap();
    assert_eq!(result.rows.len(), 1);

    driver.destroy().await.unwrap();
    assert_eq!(driver.connection_count().await, 0);
}
