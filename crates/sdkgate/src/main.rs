//! # sdkgate
//!
//! SDK gateway binary: loads settings, registers the built-in operations and
//! serves them over `WebSocket` until ctrl-c or SIGTERM.

#![deny(unsafe_code)]

mod ops;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use sdkgate_core::logging::{LogFormat, LogLevel, init_subscriber};
use sdkgate_server::{GatewayServer, ServerConfig};
use sdkgate_settings::{GatewaySettings, get_settings, init_settings, load_settings_from_path};
use tracing::{info, warn};

/// SDK `WebSocket` gateway.
#[derive(Parser, Debug)]
#[command(name = "sdkgate", version, about = "SDK WebSocket gateway")]
struct Cli {
    /// `WebSocket` listen port.
    #[arg(long = "sdk-ws-port", alias = "sdk_ws_port")]
    sdk_ws_port: Option<u16>,

    /// Backend HTTP API address.
    #[arg(long)]
    api_address: Option<String>,

    /// Backend `WebSocket` address.
    #[arg(long)]
    ws_address: Option<String>,

    /// Log level: `0..=6` (6 most verbose) or a level name.
    #[arg(long)]
    log_level: Option<String>,

    /// Local data directory.
    #[arg(long)]
    data_dir: Option<String>,

    /// Settings file (defaults to `~/.sdkgate/settings.json`).
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long)]
    json_logs: bool,
}

impl Cli {
    /// Apply flags over file and environment settings.
    fn apply(&self, settings: &mut GatewaySettings) {
        if let Some(port) = self.sdk_ws_port {
            settings.server.ws_port = port;
        }
        if let Some(ref addr) = self.api_address {
            settings.backend.api_address.clone_from(addr);
        }
        if let Some(ref addr) = self.ws_address {
            settings.backend.ws_address.clone_from(addr);
        }
        if let Some(ref dir) = self.data_dir {
            settings.backend.data_dir.clone_from(dir);
        }
        if let Some(ref level) = self.log_level {
            settings.logging.level = LogLevel::from_str_lossy(level);
        }
        if self.json_logs {
            settings.logging.format = LogFormat::Json;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // An explicit --settings file must load; the default path may be absent or broken.
    let (mut settings, load_error) = match cli.settings {
        Some(ref path) => (
            load_settings_from_path(path)
                .with_context(|| format!("failed to load settings from {}", path.display()))?,
            None,
        ),
        None => match sdkgate_settings::load_settings() {
            Ok(s) => (s, None),
            Err(e) => (GatewaySettings::default(), Some(e)),
        },
    };
    cli.apply(&mut settings);

    init_subscriber(settings.logging.level, settings.logging.format);
    if let Some(e) = load_error {
        warn!(error = %e, "failed to load settings, using defaults");
    }

    if init_settings(settings).is_err() {
        warn!("settings already initialised");
    }
    let settings = get_settings();

    let metrics = sdkgate_server::metrics::install_recorder()
        .context("failed to install metrics recorder")?;

    let config = ServerConfig::from(&settings.server);
    let shutdown_timeout = config.shutdown_timeout;
    let server = GatewayServer::new(config, ops::catalog()).with_metrics(metrics);

    let (addr, handle) = server.listen().await.context("failed to bind server")?;
    info!(
        %addr,
        api_address = settings.backend.api_address,
        ws_address = settings.backend.ws_address,
        data_dir = settings.backend.data_dir,
        version = ops::SDK_VERSION,
        "sdkgate listening"
    );

    sdkgate_server::shutdown::wait_for_signal().await;
    info!("shutting down");
    server
        .shutdown()
        .graceful_shutdown(vec![handle], shutdown_timeout)
        .await;

    info!("shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults_leave_settings_alone() {
        let cli = Cli::parse_from(["sdkgate"]);
        let mut settings = GatewaySettings::default();
        cli.apply(&mut settings);
        assert_eq!(settings.server.ws_port, GatewaySettings::default().server.ws_port);
        assert_eq!(settings.logging.format, LogFormat::Compact);
    }

    #[test]
    fn cli_port_and_alias() {
        let cli = Cli::parse_from(["sdkgate", "--sdk-ws-port", "20003"]);
        assert_eq!(cli.sdk_ws_port, Some(20003));
        let cli = Cli::parse_from(["sdkgate", "--sdk_ws_port", "20004"]);
        assert_eq!(cli.sdk_ws_port, Some(20004));
    }

    #[test]
    fn cli_numeric_log_level() {
        let cli = Cli::parse_from(["sdkgate", "--log-level", "5"]);
        let mut settings = GatewaySettings::default();
        cli.apply(&mut settings);
        assert_eq!(settings.logging.level, LogLevel::Debug);
    }

    #[test]
    fn cli_named_log_level() {
        let cli = Cli::parse_from(["sdkgate", "--log-level", "warn"]);
        let mut settings = GatewaySettings::default();
        cli.apply(&mut settings);
        assert_eq!(settings.logging.level, LogLevel::Warn);
    }

    #[test]
    fn cli_backend_overrides() {
        let cli = Cli::parse_from([
            "sdkgate",
            "--api-address",
            "http://10.0.0.1:10002",
            "--ws-address",
            "ws://10.0.0.1:10001",
            "--data-dir",
            "/var/lib/sdkgate",
            "--json-logs",
        ]);
        let mut settings = GatewaySettings::default();
        cli.apply(&mut settings);
        assert_eq!(settings.backend.api_address, "http://10.0.0.1:10002");
        assert_eq!(settings.backend.ws_address, "ws://10.0.0.1:10001");
        assert_eq!(settings.backend.data_dir, "/var/lib/sdkgate");
        assert_eq!(settings.logging.format, LogFormat::Json);
    }

    #[test]
    fn cli_settings_path() {
        let cli = Cli::parse_from(["sdkgate", "--settings", "/etc/sdkgate.json"]);
        assert_eq!(cli.settings, Some(PathBuf::from("/etc/sdkgate.json")));
    }
}
