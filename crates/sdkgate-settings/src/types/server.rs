//! Listener and transport settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// WebSocket listener and per-session transport settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    /// Bind address.
    pub host: String,
    /// WebSocket listener port.
    pub ws_port: u16,
    /// Maximum concurrent WebSocket connections.
    pub max_connections: usize,
    /// Maximum inbound frame size in bytes.
    pub max_message_bytes: usize,
    /// Capacity of each session's bounded output queue.
    pub writer_queue_len: usize,
    /// Interval between server pings.
    pub heartbeat_interval_ms: u64,
    /// Disconnect a client that has not answered a ping for this long.
    pub heartbeat_timeout_ms: u64,
    /// Grace period for in-flight tasks on shutdown.
    pub shutdown_timeout_ms: u64,
}

impl ServerSettings {
    /// Heartbeat interval as a [`Duration`].
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms)
    }

    /// Heartbeat timeout as a [`Duration`].
    pub fn heartbeat_timeout(&self) -> Duration {
        Duration::from_millis(self.heartbeat_timeout_ms)
    }

    /// Shutdown grace period as a [`Duration`].
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            ws_port: 10003,
            max_connections: 100_000,
            max_message_bytes: 10 * 1024 * 1024,
            writer_queue_len: 1000,
            heartbeat_interval_ms: 30_000,
            heartbeat_timeout_ms: 60_000,
            shutdown_timeout_ms: 5_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let s = ServerSettings::default();
        assert_eq!(s.ws_port, 10003);
        assert_eq!(s.max_connections, 100_000);
        assert_eq!(s.max_message_bytes, 10 * 1024 * 1024);
        assert_eq!(s.writer_queue_len, 1000);
    }

    #[test]
    fn durations() {
        let s = ServerSettings::default();
        assert_eq!(s.heartbeat_interval(), Duration::from_secs(30));
        assert_eq!(s.heartbeat_timeout(), Duration::from_secs(60));
        assert_eq!(s.shutdown_timeout(), Duration::from_secs(5));
    }
}
