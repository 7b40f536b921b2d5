//! Downstream ports: the connection pool and the raw engine connection.
//!
//! The driver is engine-agnostic; everything engine-specific sits behind
//! these two traits. The pool owns connection creation, health checking and
//! backpressure; the driver neither limits in-flight acquisitions nor
//! retries on its own. The bundled [`sqlite`](crate::sqlite) module provides
//! the reference implementation.

use crate::config::ExecuteOptions;
use crate::error::DriverResult;
use crate::statement::{CompiledStatement, QueryResult};
use async_trait::async_trait;

/// A raw engine session handle.
///
/// Every method may suspend on I/O and reject with an engine-specific error.
/// The driver holds exactly one `RawConnection` per registered identifier;
/// serializing concurrent use of a single handle is the caller's job.
#[async_trait]
pub trait RawConnection: Send + Sync {
    /// Execute a compiled statement with the given execution options.
    async fn execute(
        &self,
        statement: &CompiledStatement,
        options: &ExecuteOptions,
    ) -> DriverResult<QueryResult>;

    /// Commit pending work on this session.
    async fn commit(&self) -> DriverResult<()>;

    /// Roll back pending work on this session.
    async fn rollback(&self) -> DriverResult<()>;

    /// Close the session, returning the underlying resources to the pool.
    async fn close(&self) -> DriverResult<()>;
}

/// Provider of raw engine connections.
///
/// Assumed initialized before the driver sees it; acquisition timeouts,
/// sizing and health policy all live here.
#[async_trait]
pub trait ConnectionPool: Send + Sync {
    /// Obtain a raw connection. Rejects on exhaustion or timeout.
    async fn get_connection(&self) -> DriverResult<Box<dyn RawConnection>>;

    /// Release all pooled resources.
    async fn close(&self) -> DriverResult<()>;
}
