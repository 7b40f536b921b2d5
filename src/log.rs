//! Injected logging capability for the driver.
//!
//! The driver never logs through a global directly; it calls a
//! constructor-supplied [`DriverLog`] so embedding applications can route
//! lifecycle events wherever they want. The default implementation forwards
//! to the `tracing` macros. Implementations must not panic; a panicking
//! logger would corrupt the lifecycle flow.

use std::sync::Arc;
use tracing::{debug, error};

/// Structured fields attached to a log event.
///
/// At minimum events carry the connection `id`; savepoint operations add the
/// savepoint name, and teardown failures add the error text.
#[derive(Debug, Clone, Default)]
pub struct LogFields {
    pub id: Option<String>,
    pub savepoint: Option<String>,
    pub error: Option<String>,
}

impl LogFields {
    /// Fields carrying only a connection identifier.
    pub fn id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Add a savepoint name.
    pub fn savepoint(mut self, name: impl Into<String>) -> Self {
        self.savepoint = Some(name.into());
        self
    }

    /// Add an error description.
    pub fn error(mut self, err: impl ToString) -> Self {
        self.error = Some(err.to_string());
        self
    }
}

/// Leveled, structured log sink consumed by the driver.
pub trait DriverLog: Send + Sync {
    fn debug(&self, fields: &LogFields, message: &str);
    fn error(&self, fields: &LogFields, message: &str);
}

/// Default logger: forwards events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLog;

impl DriverLog for TracingLog {
    fn debug(&self, fields: &LogFields, message: &str) {
        debug!(
            id = fields.id.as_deref(),
            savepoint = fields.savepoint.as_deref(),
            error = fields.error.as_deref(),
            "{message}"
        );
    }

    fn error(&self, fields: &LogFields, message: &str) {
        error!(
            id = fields.id.as_deref(),
            savepoint = fields.savepoint.as_deref(),
            error = fields.error.as_deref(),
            "{message}"
        );
    }
}

/// Logger that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLog;

impl DriverLog for NullLog {
    fn debug(&self, _fields: &LogFields, _message: &str) {}
    fn error(&self, _fields: &LogFields, _message: &str) {}
}

/// The logger used when the configuration supplies none.
pub fn default_log() -> Arc<dyn DriverLog> {
    Arc::new(TracingLog)
}
