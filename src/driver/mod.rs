//! The lifecycle orchestrator.
//!
//! [`Driver`] implements the contract consumed by the query layer: acquire a
//! connection from the pool, sequence transaction boundaries and savepoints
//! on it, and guarantee best-effort release. It keeps no client-side
//! transaction state; the engine session is the source of truth, and
//! out-of-order calls (commit without pending work, operations on a released
//! connection) are forwarded to the engine unchecked.

pub mod connection;
pub mod registry;

pub use connection::PooledConnection;
pub use registry::ConnectionRegistry;

use crate::config::{DriverConfig, ExecuteOptions};
use crate::error::DriverResult;
use crate::log::{DriverLog, LogFields, default_log};
use crate::pool::ConnectionPool;
use crate::statement::CompiledStatement;
use std::sync::Arc;

pub struct Driver {
    pool: Arc<dyn ConnectionPool>,
    registry: ConnectionRegistry,
    log: Arc<dyn DriverLog>,
    execute_options: ExecuteOptions,
}

impl Driver {
    /// Create a driver over an already-initialized pool.
    pub fn new(config: DriverConfig) -> Self {
        let DriverConfig {
            pool,
            log,
            execute_options,
        } = config;
        Self {
            pool,
            registry: ConnectionRegistry::new(),
            log: log.unwrap_or_else(default_log),
            execute_options,
        }
    }

    /// Contract hook; the pool is initialized externally, so there is
    /// nothing to do here.
    pub async fn init(&self) -> DriverResult<()> {
        Ok(())
    }

    /// Obtain a raw connection from the pool, wrap it and register it.
    ///
    /// Pool errors (exhaustion, timeout) propagate unchanged and nothing is
    /// registered in that case.
    pub async fn acquire_connection(&self) -> DriverResult<Arc<PooledConnection>> {
        self.log
            .debug(&LogFields::default(), "Acquiring connection");
        let raw = self.pool.get_connection().await?;
        let connection = Arc::new(PooledConnection::new(
            raw,
            Arc::clone(&self.log),
            self.execute_options.clone(),
        ));
        self.registry.insert(Arc::clone(&connection)).await;
        self.log.debug(
            &LogFields::id(connection.identifier()),
            "Connection acquired",
        );
        Ok(connection)
    }

    /// Mark the session as inside a transaction.
    ///
    /// A semantic no-op at this layer: the engine session tracks transaction
    /// state itself, so this only emits a log event. Engine errors, if any,
    /// surface on the first statement.
    pub async fn begin_transaction(&self, connection: &PooledConnection) -> DriverResult<()> {
        self.log.debug(
            &LogFields::id(connection.identifier()),
            "Beginning transaction",
        );
        Ok(())
    }

    /// Commit pending work on the connection.
    pub async fn commit_transaction(&self, connection: &PooledConnection) -> DriverResult<()> {
        connection.raw().commit().await?;
        self.log.debug(
            &LogFields::id(connection.identifier()),
            "Transaction committed",
        );
        Ok(())
    }

    /// Roll back pending work on the connection.
    ///
    /// If rollback itself fails the caller must treat the connection as
    /// possibly unusable.
    pub async fn rollback_transaction(&self, connection: &PooledConnection) -> DriverResult<()> {
        connection.raw().rollback().await?;
        self.log.debug(
            &LogFields::id(connection.identifier()),
            "Transaction rolled back",
        );
        Ok(())
    }

    /// Issue `SAVEPOINT <name>` on the connection.
    ///
    /// The name is interpolated into the statement verbatim; no escaping or
    /// validation happens here. The query-compiler layer above owns
    /// identifier safety.
    pub async fn savepoint(
        &self,
        connection: &PooledConnection,
        savepoint: &str,
    ) -> DriverResult<()> {
        self.log.debug(
            &LogFields::id(connection.identifier()).savepoint(savepoint),
            "Creating savepoint",
        );
        self.exec_control(connection, format!("SAVEPOINT {savepoint}"))
            .await?;
        self.log.debug(
            &LogFields::id(connection.identifier()).savepoint(savepoint),
            "Savepoint created",
        );
        Ok(())
    }

    /// Issue `ROLLBACK TO SAVEPOINT <name>` on the connection.
    pub async fn rollback_to_savepoint(
        &self,
        connection: &PooledConnection,
        savepoint: &str,
    ) -> DriverResult<()> {
        self.log.debug(
            &LogFields::id(connection.identifier()).savepoint(savepoint),
            "Rolling back to savepoint",
        );
        self.exec_control(connection, format!("ROLLBACK TO SAVEPOINT {savepoint}"))
            .await?;
        self.log.debug(
            &LogFields::id(connection.identifier()).savepoint(savepoint),
            "Rolled back to savepoint",
        );
        Ok(())
    }

    /// Issue `RELEASE SAVEPOINT <name>` on the connection.
    pub async fn release_savepoint(
        &self,
        connection: &PooledConnection,
        savepoint: &str,
    ) -> DriverResult<()> {
        self.log.debug(
            &LogFields::id(connection.identifier()).savepoint(savepoint),
            "Releasing savepoint",
        );
        self.exec_control(connection, format!("RELEASE SAVEPOINT {savepoint}"))
            .await?;
        self.log.debug(
            &LogFields::id(connection.identifier()).savepoint(savepoint),
            "Savepoint released",
        );
        Ok(())
    }

    /// Evict the connection from the registry and close its raw handle.
    ///
    /// Never fails: the connection is being discarded regardless of close
    /// success, so close errors are logged at error level and swallowed.
    /// Releasing an identifier that is unknown or already released is a
    /// silent no-op.
    pub async fn release_connection(&self, connection: &PooledConnection) {
        self.release_by_id(connection.identifier()).await;
    }

    async fn release_by_id(&self, identifier: &str) {
        let Some(connection) = self.registry.remove(identifier).await else {
            return;
        };
        self.log
            .debug(&LogFields::id(identifier), "Releasing connection");
        match connection.raw().close().await {
            Ok(()) => {
                self.log
                    .debug(&LogFields::id(identifier), "Connection released");
            }
            Err(err) => {
                self.log.error(
                    &LogFields::id(identifier).error(&err),
                    "Error closing connection",
                );
            }
        }
    }

    /// Release every registered connection, then close the pool.
    ///
    /// Teardown is fail-open: a close failure on one connection never stops
    /// the release of the rest. Only a pool-close error propagates.
    pub async fn destroy(&self) -> DriverResult<()> {
        for identifier in self.registry.identifiers().await {
            self.release_by_id(&identifier).await;
        }
        self.pool.close().await
    }

    /// Look up a previously acquired, still-registered connection.
    pub async fn get_connection(&self, identifier: &str) -> Option<Arc<PooledConnection>> {
        self.registry.get(identifier).await
    }

    /// Number of currently registered connections.
    pub async fn connection_count(&self) -> usize {
        self.registry.count().await
    }

    /// Run a transaction-control statement on the raw connection.
    async fn exec_control(&self, connection: &PooledConnection, sql: String) -> DriverResult<()> {
        connection
            .raw()
            .execute(&CompiledStatement::raw(sql), connection.execute_options())
            .await?;
        Ok(())
    }
}

impl std::fmt::Debug for Driver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Driver")
            .field("registry", &self.registry)
            .field("execute_options", &self.execute_options)
            .finish_non_exhaustive()
    }
}
