//! Driver configuration.
//!
//! [`ExecuteOptions`] is the immutable per-connection execution snapshot;
//! [`DriverConfig`] bundles everything the driver needs at construction time.

use crate::log::DriverLog;
use crate::pool::ConnectionPool;
use std::sync::Arc;
use std::time::Duration;

/// Execution options applied to every statement issued through a connection.
///
/// Captured once at acquisition time; a connection never observes later
/// changes to the driver configuration.
#[derive(Debug, Clone, Default)]
pub struct ExecuteOptions {
    /// Per-statement timeout. `None` disables the timeout entirely.
    pub statement_timeout: Option<Duration>,
    /// Rows fetched per round trip. A hint for engine bindings that support
    /// batched fetches; the bundled SQLite binding ignores it.
    pub fetch_size: Option<u32>,
}

/// Configuration for a [`Driver`](crate::Driver) instance.
///
/// The pool is the only required piece; the logger defaults to the
/// tracing-backed implementation and the execution options to their
/// defaults.
#[derive(Clone)]
pub struct DriverConfig {
    /// Provider of raw engine connections. Assumed already initialized.
    pub pool: Arc<dyn ConnectionPool>,
    /// Log sink for lifecycle events. `None` selects [`TracingLog`](crate::log::TracingLog).
    pub log: Option<Arc<dyn DriverLog>>,
    /// Execution options snapshot handed to every acquired connection.
    pub execute_options: ExecuteOptions,
}

impl DriverConfig {
    /// Create a configuration with default logging and execution options.
    pub fn new(pool: Arc<dyn ConnectionPool>) -> Self {
        Self {
            pool,
            log: None,
            execute_options: ExecuteOptions::default(),
        }
    }

    /// Replace the logger.
    pub fn with_log(mut self, log: Arc<dyn DriverLog>) -> Self {
        self.log = Some(log);
        self
    }

    /// Replace the execution options.
    pub fn with_execute_options(mut self, options: ExecuteOptions) -> Self {
        self.execute_options = options;
        self
    }
}

impl std::fmt::Debug for DriverConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriverConfig")
            .field("has_log", &self.log.is_some())
            .field("execute_options", &self.execute_options)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execute_options_defaults() {
        let opts = ExecuteOptions::default();
        assert!(opts.statement_timeout.is_none());
        assert!(opts.fetch_size.is_none());
    }

    #[test]
    fn test_execute_options_custom_values() {
        let opts = ExecuteOptions {
            statement_timeout: Some(Duration::from_secs(30)),
            fetch_size: Some(500),
        };
        assert_eq!(opts.statement_timeout, Some(Duration::from_secs(30)));
        assert_eq!(opts.fetch_size, Some(500));
    }
}
