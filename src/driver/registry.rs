//! Registry of currently checked-out connections.
//!
//! The registry is the driver's source of truth for what is outstanding: a
//! connection appears here if and only if it has been acquired and not yet
//! released. Keys are the connection identifiers, which are freshly generated
//! on every acquisition, so concurrent inserts never collide.

use crate::driver::connection::PooledConnection;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone, Default)]
pub struct ConnectionRegistry {
    connections: Arc<RwLock<HashMap<String, Arc<PooledConnection>>>>,
}

impl ConnectionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection under its identifier.
    pub async fn insert(&self, connection: Arc<PooledConnection>) {
        let mut connections = self.connections.write().await;
        connections.insert(connection.identifier().to_string(), connection);
    }

    /// Evict a connection, returning it if it was still registered.
    pub async fn remove(&self, identifier: &str) -> Option<Arc<PooledConnection>> {
        let mut connections = self.connections.write().await;
        connections.remove(identifier)
    }

    /// Look up a registered connection.
    pub async fn get(&self, identifier: &str) -> Option<Arc<PooledConnection>> {
        let connections = self.connections.read().await;
        connections.get(identifier).cloned()
    }

    /// Snapshot of all registered identifiers.
    pub async fn identifiers(&self) -> Vec<String> {
        let connections = self.connections.read().await;
        connections.keys().cloned().collect()
    }

    /// Number of registered connections.
    pub async fn count(&self) -> usize {
        let connections = self.connections.read().await;
        connections.len()
    }
}

impl std::fmt::Debug for ConnectionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionRegistry").finish_non_exhaustive()
    }
}
