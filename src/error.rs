//! Error types for the driver layer.
//!
//! This module defines all error types using `thiserror`. The taxonomy follows
//! the propagation policy of the driver: errors affecting in-flight work (pool
//! acquisition, engine execution) surface to the caller; best-effort teardown
//! errors are absorbed and only observable via the logger.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DriverError {
    /// The pool could not hand out a connection (exhaustion, timeout, or a
    /// closed pool). Raised during acquisition and propagated unchanged.
    #[error("Failed to acquire connection: {message}")]
    PoolAcquire { message: String },

    /// The engine rejected an operation (syntax error, constraint violation,
    /// unknown savepoint, commit failure, ...). The connection stays
    /// registered; releasing it is the caller's responsibility.
    #[error("Engine error: {message}")]
    Engine {
        message: String,
        /// Engine-specific error code, e.g. a SQLSTATE value
        code: Option<String>,
    },

    /// The pool failed to shut down. Raised by `destroy` after all
    /// registered connections have been released best-effort.
    #[error("Failed to close pool: {message}")]
    PoolClose { message: String },

    /// An operation was issued against a raw handle that is no longer open.
    #[error("Connection is closed")]
    Closed,
}

impl DriverError {
    /// Create a pool acquisition error.
    pub fn pool_acquire(message: impl Into<String>) -> Self {
        Self::PoolAcquire {
            message: message.into(),
        }
    }

    /// Create an engine error without a code.
    pub fn engine(message: impl Into<String>) -> Self {
        Self::Engine {
            message: message.into(),
            code: None,
        }
    }

    /// Create an engine error carrying an engine-specific code.
    pub fn engine_with_code(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self::Engine {
            message: message.into(),
            code: Some(code.into()),
        }
    }

    /// Create a pool close error.
    pub fn pool_close(message: impl Into<String>) -> Self {
        Self::PoolClose {
            message: message.into(),
        }
    }

    /// Get the engine error code, if any.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Engine { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// Check if this error came from the pool rather than the engine.
    pub fn is_pool_error(&self) -> bool {
        matches!(self, Self::PoolAcquire { .. } | Self::PoolClose { .. })
    }
}

/// Convert sqlx errors to DriverError for the bundled SQLite binding.
#[cfg(feature = "sqlite")]
impl From<sqlx::Error> for DriverError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => {
                DriverError::pool_acquire("connection pool acquire timed out")
            }
            sqlx::Error::PoolClosed => DriverError::pool_acquire("connection pool is closed"),
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().map(|c| c.to_string());
                DriverError::Engine {
                    message: db_err.message().to_string(),
                    code,
                }
            }
            sqlx::Error::Io(io_err) => DriverError::engine(format!("I/O error: {}", io_err)),
            sqlx::Error::Protocol(msg) => DriverError::engine(format!("protocol error: {}", msg)),
            other => DriverError::engine(other.to_string()),
        }
    }
}

/// Result type alias for driver operations.
pub type DriverResult<T> = Result<T, DriverError>;
