//! `WebSocket` session lifecycle: one connected client from upgrade through
//! disconnect.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::ws::{Message, WebSocket};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use metrics::{counter, gauge, histogram};
use sdkgate_core::EventData;
use sdkgate_dispatch::{FuncRouter, OperationCatalog, Responder, SessionState};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use super::connection::{ClientConnection, ConnectionRegistry};
use super::frame::handle_text;

/// First event on every connection; `data` is the session id.
pub const CONNECTED_EVENT: &str = "Connected";

/// Per-session knobs taken from the server config.
#[derive(Clone, Copy, Debug)]
pub struct SessionLimits {
    /// Outbound queue capacity.
    pub writer_queue_len: usize,
    /// Ping cadence.
    pub heartbeat_interval: Duration,
    /// Idle time after which a client that misses a ping is dropped.
    pub heartbeat_timeout: Duration,
}

/// Run a session for a connected client.
///
/// 1. Creates the session state, its outbound queue and router
/// 2. Sends `Connected` with the session id
/// 3. Routes inbound text (or UTF-8 binary) frames through the catalog
/// 4. Writes queued events and periodic pings; drops unresponsive clients
/// 5. Cleans up on disconnect or shutdown
#[instrument(skip_all, fields(session_id))]
pub async fn run_ws_session(
    ws: WebSocket,
    catalog: Arc<OperationCatalog>,
    connections: Arc<ConnectionRegistry>,
    limits: SessionLimits,
    cancel: CancellationToken,
) {
    let session = Arc::new(SessionState::default());
    let session_id = session.id().clone();
    let _ = tracing::Span::current().record("session_id", session_id.as_str());

    let (responder, events) = Responder::channel(limits.writer_queue_len);
    let router = FuncRouter::new(responder.clone(), Arc::clone(&session));
    let connection = Arc::new(ClientConnection::new(session_id.clone()));

    let started = Instant::now();
    info!("client connected");
    counter!("ws_connections_total").increment(1);
    gauge!("ws_connections_active").increment(1.0);
    connections.add(Arc::clone(&connection));

    let (ws_tx, mut ws_rx) = ws.split();
    let writer = tokio::spawn(write_loop(
        ws_tx,
        events,
        Arc::clone(&connection),
        limits,
        cancel.clone(),
    ));

    if responder
        .post_success_with_payload(CONNECTED_EVENT, session_id.as_str())
        .await
        .is_err()
    {
        warn!("queue closed before Connected was sent");
    }

    loop {
        let msg = tokio::select! {
            msg = ws_rx.next() => msg,
            () = cancel.cancelled() => {
                debug!("session cancelled");
                break;
            }
        };

        let text = match msg {
            Some(Ok(Message::Text(t))) => t.to_string(),
            Some(Ok(Message::Binary(data))) => match String::from_utf8(data.to_vec()) {
                Ok(s) => s,
                Err(_) => {
                    info!(len = data.len(), "received non-UTF8 binary frame");
                    connection.mark_alive();
                    continue;
                }
            },
            Some(Ok(Message::Ping(_) | Message::Pong(_))) => {
                connection.mark_alive();
                continue;
            }
            Some(Ok(Message::Close(_))) => {
                info!("client sent close frame");
                break;
            }
            Some(Err(e)) => {
                debug!(error = %e, "websocket read error");
                break;
            }
            None => break,
        };

        connection.mark_alive();
        if handle_text(&text, &catalog, &router).await.is_err() {
            warn!("session queue closed, dropping connection");
            break;
        }
    }

    cancel.cancel();
    if let Err(e) = writer.await {
        error!(error = %e, "writer task failed");
    }

    session.clear();
    let _ = connections.remove(&session_id);
    info!(duration_secs = started.elapsed().as_secs(), "client disconnected");
    counter!("ws_disconnections_total").increment(1);
    gauge!("ws_connections_active").decrement(1.0);
    histogram!("ws_connection_duration_seconds").record(started.elapsed().as_secs_f64());
}

/// Drain the session queue into the socket and keep the client honest with
/// pings. Ends on socket error, queue close, heartbeat timeout or `cancel`.
async fn write_loop(
    mut ws_tx: SplitSink<WebSocket, Message>,
    mut events: mpsc::Receiver<EventData>,
    connection: Arc<ClientConnection>,
    limits: SessionLimits,
    cancel: CancellationToken,
) {
    let mut ping = tokio::time::interval(limits.heartbeat_interval);
    let _ = ping.tick().await;

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                let text = match serde_json::to_string(&event) {
                    Ok(t) => t,
                    Err(e) => {
                        error!(error = %e, event = event.event, "failed to serialize event");
                        continue;
                    }
                };
                if ws_tx.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
            _ = ping.tick() => {
                if connection.is_unresponsive(limits.heartbeat_timeout) {
                    warn!(
                        idle_ms = connection.idle_for().as_millis(),
                        "client unresponsive, disconnecting"
                    );
                    break;
                }
                if ws_tx.send(Message::Ping(Vec::new().into())).await.is_err() {
                    break;
                }
            }
            () = cancel.cancelled() => break,
        }
    }

    cancel.cancel();
    let _ = ws_tx.send(Message::Close(None)).await;
}
