//! # sdkgate-server
//!
//! Axum HTTP + `WebSocket` transport for the SDK command dispatcher.
//!
//! - `GET /` and `GET /ws`: `WebSocket` upgrade, one dispatcher session per connection
//! - `GET /health`: liveness and connection count
//! - `GET /metrics`: Prometheus text
//! - Heartbeat pings, connection limit, graceful shutdown via `CancellationToken`

#![deny(unsafe_code)]

pub mod config;
pub mod health;
pub mod metrics;
pub mod server;
pub mod shutdown;
pub mod websocket;

pub use config::ServerConfig;
pub use server::GatewayServer;
pub use shutdown::ShutdownCoordinator;
