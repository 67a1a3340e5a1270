//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase", default)]` so partial
//! JSON files are accepted and missing fields keep their defaults.

mod backend;
mod server;

pub use backend::*;
pub use server::*;

use sdkgate_core::logging::{LogFormat, LogLevel};
use serde::{Deserialize, Serialize};

/// Root settings type for the gateway.
///
/// ```json
/// {
///   "server": { "wsPort": 10003 },
///   "backend": { "apiAddress": "http://127.0.0.1:10002" },
///   "logging": { "level": "debug" }
/// }
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GatewaySettings {
    /// Listener and per-session transport settings.
    pub server: ServerSettings,
    /// Upstream IM backend addresses and local storage.
    pub backend: BackendSettings,
    /// Logging configuration.
    pub logging: LoggingSettings,
}

/// Logging configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Minimum level written to stderr.
    pub level: LogLevel,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Compact,
        }
    }
}
