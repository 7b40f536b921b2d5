//! The pooled connection wrapper.

use crate::config::ExecuteOptions;
use crate::error::DriverResult;
use crate::log::{DriverLog, LogFields};
use crate::pool::RawConnection;
use crate::statement::{CompiledStatement, QueryResult};
use std::sync::Arc;

/// A raw pooled connection tagged with a stable identifier.
///
/// The identifier is assigned at acquisition time, never reused within a
/// driver instance, and keys the driver's registry. Construction is pure
/// bookkeeping; no I/O happens until a statement is executed.
pub struct PooledConnection {
    identifier: String,
    raw: Box<dyn RawConnection>,
    log: Arc<dyn DriverLog>,
    execute_options: ExecuteOptions,
}

impl PooledConnection {
    pub(crate) fn new(
        raw: Box<dyn RawConnection>,
        log: Arc<dyn DriverLog>,
        execute_options: ExecuteOptions,
    ) -> Self {
        Self {
            identifier: generate_connection_id(),
            raw,
            log,
            execute_options,
        }
    }

    /// The registry key and log correlation token for this connection.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// The execution options snapshot applied to every statement.
    pub fn execute_options(&self) -> &ExecuteOptions {
        &self.execute_options
    }

    /// Execute a compiled statement on this connection.
    pub async fn execute(&self, statement: &CompiledStatement) -> DriverResult<QueryResult> {
        self.log
            .debug(&LogFields::id(&self.identifier), "Executing statement");
        let result = self.raw.execute(statement, &self.execute_options).await?;
        self.log
            .debug(&LogFields::id(&self.identifier), "Statement executed");
        Ok(result)
    }

    /// Access to the raw handle for transaction control issued by the driver.
    pub(crate) fn raw(&self) -> &dyn RawConnection {
        self.raw.as_ref()
    }
}

impl std::fmt::Debug for PooledConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledConnection")
            .field("identifier", &self.identifier)
            .field("execute_options", &self.execute_options)
            .finish_non_exhaustive()
    }
}

/// Generate a unique connection ID.
fn generate_connection_id() -> String {
    format!("conn_{}", uuid::Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_format() {
        let id = generate_connection_id();
        assert!(id.starts_with("conn_"));
        assert_eq!(id.len(), 5 + 32); // "conn_" + 32 hex chars
    }

    #[test]
    fn test_connection_ids_are_unique() {
        let a = generate_connection_id();
        let b = generate_connection_id();
        assert_ne!(a, b);
    }
}
