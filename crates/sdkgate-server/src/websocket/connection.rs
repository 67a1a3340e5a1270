//! Per-connection liveness and the registry of open connections.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use parking_lot::Mutex;
use sdkgate_core::SessionId;

/// A connected `WebSocket` client.
#[derive(Debug)]
pub struct ClientConnection {
    id: SessionId,
    connected_at: Instant,
    is_alive: AtomicBool,
    last_seen: Mutex<Instant>,
}

impl ClientConnection {
    /// Track a new connection for `id`.
    pub fn new(id: SessionId) -> Self {
        let now = Instant::now();
        Self {
            id,
            connected_at: now,
            is_alive: AtomicBool::new(true),
            last_seen: Mutex::new(now),
        }
    }

    /// Session id bound to this connection.
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Record inbound activity (pong, ping or any frame).
    pub fn mark_alive(&self) {
        self.is_alive.store(true, Ordering::Relaxed);
        *self.last_seen.lock() = Instant::now();
    }

    /// Read and clear the alive flag.
    pub fn check_alive(&self) -> bool {
        self.is_alive.swap(false, Ordering::Relaxed)
    }

    /// Time since the last inbound activity.
    pub fn idle_for(&self) -> Duration {
        self.last_seen.lock().elapsed()
    }

    /// Whether the client missed the last ping and has been idle past `timeout`.
    pub fn is_unresponsive(&self, timeout: Duration) -> bool {
        !self.check_alive() && self.idle_for() > timeout
    }

    /// Connection age.
    pub fn age(&self) -> Duration {
        self.connected_at.elapsed()
    }
}

/// Open connections keyed by session id.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: DashMap<String, Arc<ClientConnection>>,
}

impl ConnectionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a connection.
    pub fn add(&self, connection: Arc<ClientConnection>) {
        let _ = self
            .connections
            .insert(connection.id().as_str().to_owned(), connection);
    }

    /// Stop tracking a connection.
    pub fn remove(&self, id: &SessionId) -> Option<Arc<ClientConnection>> {
        self.connections.remove(id.as_str()).map(|(_, c)| c)
    }

    /// Look up an open connection.
    pub fn get(&self, id: &SessionId) -> Option<Arc<ClientConnection>> {
        self.connections.get(id.as_str()).map(|c| Arc::clone(c.value()))
    }

    /// Number of open connections.
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// Whether no connections are open.
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Whether another connection would exceed `max`.
    pub fn is_full(&self, max: usize) -> bool {
        self.len() >= max
    }
}
