//! Pooled-connection and transaction lifecycle driver.
//!
//! This library sits between a query-building layer (which produces compiled
//! SQL and parameters) and a connection pool (which owns raw engine
//! sessions). It tracks checked-out connections by identifier, sequences
//! transaction boundaries and nested savepoints, and guarantees best-effort
//! release even under partial failure.
//!
//! The engine-specific pieces live behind the [`pool::ConnectionPool`] and
//! [`pool::RawConnection`] traits; the `sqlite` feature (on by default)
//! bundles a reference binding over `sqlx`.

pub mod config;
pub mod driver;
pub mod error;
pub mod log;
pub mod pool;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod statement;

pub use config::{DriverConfig, ExecuteOptions};
pub use driver::{ConnectionRegistry, Driver, PooledConnection};
pub use error::{DriverError, DriverResult};
pub use log::{DriverLog, LogFields, NullLog, TracingLog};
pub use pool::{ConnectionPool, RawConnection};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteConnectionPool;
pub use statement::{CompiledStatement, QueryResult, SqlParam};
