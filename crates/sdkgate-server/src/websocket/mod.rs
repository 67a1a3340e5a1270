//! `WebSocket` connection tracking, inbound frame handling and the session loop.

pub mod connection;
pub mod frame;
pub mod session;
