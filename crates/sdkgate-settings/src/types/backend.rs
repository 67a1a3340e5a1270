//! Upstream backend settings.

use serde::{Deserialize, Serialize};

/// Addresses of the IM backend the SDK talks to, and local storage.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BackendSettings {
    /// HTTP API base address.
    pub api_address: String,
    /// Long-connection WebSocket address.
    pub ws_address: String,
    /// Directory for the SDK's local databases.
    pub data_dir: String,
    /// HTTP request timeout in milliseconds.
    pub http_timeout_ms: u64,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            api_address: "http://127.0.0.1:10002".to_string(),
            ws_address: "ws://127.0.0.1:10001".to_string(),
            data_dir: "./db".to_string(),
            http_timeout_ms: 10_000,
        }
    }
}
