//! SQLite reference binding for the pool and raw-connection ports.
//!
//! The driver core is engine-agnostic; this module binds it to one concrete
//! engine via `sqlx`. Each raw connection wraps a dedicated
//! `PoolConnection<Sqlite>` so transaction control stays on a single session.
//!
//! SQLite runs in autocommit mode, so `begin_transaction` (a no-op at the
//! driver layer) does not open a transaction; callers demarcate with an
//! explicit `BEGIN` statement through the normal execute path.
//! [`RawConnection::commit`] and [`RawConnection::rollback`] issue the
//! literal `COMMIT` / `ROLLBACK` statements and surface engine errors
//! unchanged, including "cannot commit - no transaction is active".

use crate::config::ExecuteOptions;
use crate::error::{DriverError, DriverResult};
use crate::pool::{ConnectionPool, RawConnection};
use crate::statement::{CompiledStatement, QueryResult, SqlParam};
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteArguments, SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Row, Sqlite, SqlitePool, TypeInfo};
use std::str::FromStr;
use std::time::Duration;
use tokio::sync::Mutex;

/// [`ConnectionPool`] implementation over `sqlx::SqlitePool`.
pub struct SqliteConnectionPool {
    pool: SqlitePool,
}

impl SqliteConnectionPool {
    /// Connect to a SQLite database by URL (e.g. `sqlite:data.db`).
    pub async fn connect(url: &str) -> DriverResult<Self> {
        Self::connect_with(url, 10, Duration::from_secs(30)).await
    }

    /// Connect with explicit pool sizing and acquire timeout.
    pub async fn connect_with(
        url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> DriverResult<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| DriverError::pool_acquire(format!("invalid SQLite URL: {e}")))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    /// Wrap an existing sqlx pool.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConnectionPool for SqliteConnectionPool {
    async fn get_connection(&self) -> DriverResult<Box<dyn RawConnection>> {
        let conn = self.pool.acquire().await?;
        Ok(Box::new(SqliteRawConnection {
            conn: Mutex::new(Some(conn)),
        }))
    }

    async fn close(&self) -> DriverResult<()> {
        self.pool.close().await;
        Ok(())
    }
}

/// A dedicated SQLite session checked out of the sqlx pool.
struct SqliteRawConnection {
    /// `None` once closed; dropping the inner handle returns it to the pool.
    conn: Mutex<Option<PoolConnection<Sqlite>>>,
}

#[async_trait]
impl RawConnection for SqliteRawConnection {
    async fn execute(
        &self,
        statement: &CompiledStatement,
        options: &ExecuteOptions,
    ) -> DriverResult<QueryResult> {
        let mut guard = self.conn.lock().await;
        let conn = guard.as_mut().ok_or(DriverError::Closed)?;

        let fut = run_statement(conn, statement);
        match options.statement_timeout {
            Some(timeout) => tokio::time::timeout(timeout, fut).await.map_err(|_| {
                DriverError::engine(format!(
                    "statement timed out after {}s",
                    timeout.as_secs_f64()
                ))
            })?,
            None => fut.await,
        }
    }

    async fn commit(&self) -> DriverResult<()> {
        self.control("COMMIT").await
    }

    async fn rollback(&self) -> DriverResult<()> {
        self.control("ROLLBACK").await
    }

    async fn close(&self) -> DriverResult<()> {
        let mut guard = self.conn.lock().await;
        let conn = guard.as_mut().ok_or(DriverError::Closed)?;
        // A transaction opened through the execute path ("BEGIN") is
        // invisible to sqlx, so the session must be rolled back by hand or
        // it goes back to the pool dirty. "no transaction is active" is the
        // normal case here and is ignored.
        let _ = sqlx::query("ROLLBACK").execute(&mut **conn).await;
        // Dropping the PoolConnection hands it back to the sqlx pool.
        guard.take();
        Ok(())
    }
}

impl SqliteRawConnection {
    async fn control(&self, sql: &str) -> DriverResult<()> {
        let mut guard = self.conn.lock().await;
        let conn = guard.as_mut().ok_or(DriverError::Closed)?;
        sqlx::query(sql).execute(&mut **conn).await?;
        Ok(())
    }
}

async fn run_statement(
    conn: &mut PoolConnection<Sqlite>,
    statement: &CompiledStatement,
) -> DriverResult<QueryResult> {
    let mut query = sqlx::query(&statement.sql);
    for param in &statement.params {
        query = bind_param(query, param);
    }

    if returns_rows(&statement.sql) {
        let rows: Vec<SqliteRow> = query.fetch_all(&mut **conn).await?;
        Ok(QueryResult {
            rows: rows.iter().map(row_to_json).collect(),
            rows_affected: 0,
        })
    } else {
        let result = query.execute(&mut **conn).await?;
        Ok(QueryResult::affected(result.rows_affected()))
    }
}

/// Statements whose results we fetch as rows rather than an affected count.
fn returns_rows(sql: &str) -> bool {
    let head = sql
        .trim_start()
        .split_whitespace()
        .next()
        .unwrap_or("")
        .to_ascii_uppercase();
    matches!(head.as_str(), "SELECT" | "WITH" | "PRAGMA" | "EXPLAIN" | "VALUES")
}

/// Bind a parameter to a SQLite query.
fn bind_param<'q>(
    query: sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>,
    param: &'q SqlParam,
) -> sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>> {
    match param {
        SqlParam::Null => query.bind(None::<String>),
        SqlParam::Bool(v) => query.bind(*v),
        SqlParam::Int(v) => query.bind(*v),
        SqlParam::Float(v) => query.bind(*v),
        SqlParam::Text(v) => query.bind(v.as_str()),
        SqlParam::Bytes(v) => query.bind(v.as_slice()),
        // SQLite has no native JSON type, store as string
        SqlParam::Json(v) => query.bind(v.to_string()),
    }
}

fn row_to_json(row: &SqliteRow) -> serde_json::Map<String, JsonValue> {
    row.columns()
        .iter()
        .enumerate()
        .map(|(idx, col)| {
            let value = decode_column(row, idx, col.type_info().name());
            (col.name().to_string(), value)
        })
        .collect()
}

fn decode_column(row: &SqliteRow, idx: usize, type_name: &str) -> JsonValue {
    let lower = type_name.to_lowercase();

    if lower == "boolean" || lower == "bool" {
        return row
            .try_get::<Option<bool>, _>(idx)
            .ok()
            .flatten()
            .map(JsonValue::Bool)
            .unwrap_or(JsonValue::Null);
    }

    if lower.contains("int") {
        return row
            .try_get::<Option<i64>, _>(idx)
            .ok()
            .flatten()
            .map(|v| JsonValue::Number(v.into()))
            .unwrap_or(JsonValue::Null);
    }

    if lower == "real" || lower.contains("float") || lower.contains("double") || lower == "numeric"
    {
        if let Ok(Some(v)) = row.try_get::<Option<f64>, _>(idx) {
            return serde_json::Number::from_f64(v)
                .map(JsonValue::Number)
                .unwrap_or_else(|| JsonValue::String(v.to_string()));
        }
        return JsonValue::Null;
    }

    if lower.contains("blob") || lower.contains("binary") {
        use base64::{Engine as _, engine::general_purpose::STANDARD};
        return row
            .try_get::<Option<Vec<u8>>, _>(idx)
            .ok()
            .flatten()
            .map(|v| JsonValue::String(STANDARD.encode(v)))
            .unwrap_or(JsonValue::Null);
    }

    // Everything else (text, date/time, json-as-text) comes back as a string
    if let Ok(Some(v)) = row.try_get::<Option<String>, _>(idx) {
        if lower.contains("json") {
            if let Ok(json) = serde_json::from_str::<JsonValue>(&v) {
                return json;
            }
        }
        return JsonValue::String(v);
    }
    JsonValue::Null
}
