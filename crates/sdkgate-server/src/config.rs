//! Server configuration.

use std::time::Duration;

use sdkgate_settings::types::ServerSettings;
use serde::{Deserialize, Serialize};

/// Runtime configuration for [`GatewayServer`](crate::GatewayServer).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind (default `"127.0.0.1"`).
    pub host: String,
    /// Port to bind (default `0` for auto-assign).
    pub port: u16,
    /// Maximum concurrent `WebSocket` connections.
    pub max_connections: usize,
    /// Max `WebSocket` message size in bytes.
    pub max_message_size: usize,
    /// Capacity of each session's outbound event queue.
    pub writer_queue_len: usize,
    /// Interval between server pings.
    pub heartbeat_interval: Duration,
    /// Disconnect after this long without a pong.
    pub heartbeat_timeout: Duration,
    /// How long shutdown waits for tasks before giving up.
    pub shutdown_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 0,
            ..Self::from(&ServerSettings::default())
        }
    }
}

impl From<&ServerSettings> for ServerConfig {
    fn from(s: &ServerSettings) -> Self {
        Self {
            host: s.host.clone(),
            port: s.ws_port,
            max_connections: s.max_connections,
            max_message_size: s.max_message_bytes,
            writer_queue_len: s.writer_queue_len,
            heartbeat_interval: s.heartbeat_interval(),
            heartbeat_timeout: s.heartbeat_timeout(),
            shutdown_timeout: s.shutdown_timeout(),
        }
    }
}

impl ServerConfig {
    /// `host:port` string for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_binds_loopback_on_any_port() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.host, "127.0.0.1");
        assert_eq!(cfg.port, 0);
        assert_eq!(cfg.bind_addr(), "127.0.0.1:0");
    }

    #[test]
    fn default_limits_follow_settings() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.max_connections, 100_000);
        assert_eq!(cfg.writer_queue_len, 1000);
        assert_eq!(cfg.max_message_size, 10 * 1024 * 1024);
    }

    #[test]
    fn from_settings() {
        let settings = ServerSettings {
            host: "0.0.0.0".into(),
            ws_port: 10003,
            heartbeat_interval_ms: 1500,
            ..ServerSettings::default()
        };
        let cfg = ServerConfig::from(&settings);
        assert_eq!(cfg.bind_addr(), "0.0.0.0:10003");
        assert_eq!(cfg.heartbeat_interval, Duration::from_millis(1500));
        assert_eq!(cfg.shutdown_timeout, Duration::from_secs(5));
    }
}
