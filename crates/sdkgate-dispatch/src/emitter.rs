//! Outcome event construction and posting.
//!
//! Posting awaits space on the bounded per-session queue. A full queue
//! therefore throttles dispatch completions for that session; events are
//! never dropped. The only error is the queue being gone for good.

use sdkgate_core::EventData;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::debug;

use crate::error::DispatchError;

/// The session's output queue has been closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EmitError {
    /// The consumer side (transport writer) is gone.
    #[error("session output queue closed")]
    QueueClosed,
}

/// Posts outcome events onto one session's output queue.
#[derive(Clone, Debug)]
pub struct Responder {
    tx: mpsc::Sender<EventData>,
}

impl Responder {
    /// Wrap the sending half of a session queue.
    pub fn new(tx: mpsc::Sender<EventData>) -> Self {
        Self { tx }
    }

    /// Create a queue of `capacity` and its responder.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<EventData>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }

    /// Whether the consumer has gone away.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    async fn post(&self, event: EventData) -> Result<(), EmitError> {
        self.tx.send(event).await.map_err(|_| EmitError::QueueClosed)
    }

    /// Successful terminal event carrying a serialized payload.
    pub async fn post_success(
        &self,
        correlation_id: &str,
        event: &str,
        payload: impl Into<String>,
    ) -> Result<(), EmitError> {
        self.post(EventData::success(correlation_id, event, payload))
            .await
    }

    /// Failed terminal event.
    ///
    /// Code and message are copied only when the error exposes a structured
    /// shape; otherwise both stay at zero values.
    pub async fn post_failure(
        &self,
        correlation_id: &str,
        event: &str,
        error: &DispatchError,
    ) -> Result<(), EmitError> {
        debug!(operation_id = correlation_id, event, %error, "posting failure");
        let (code, message) = error
            .to_sdk_error()
            .map_or((0, String::new()), |e| (e.code, e.message));
        self.post(EventData::failure(correlation_id, event, code, message))
            .await
    }

    /// Failure with no correlation id, code or message.
    pub async fn post_failure_no_error(&self, event: &str) -> Result<(), EmitError> {
        self.post(EventData {
            event: event.to_owned(),
            ..EventData::default()
        })
        .await
    }

    /// Success with no correlation id or payload.
    pub async fn post_success_no_payload(&self, event: &str) -> Result<(), EmitError> {
        self.post(EventData {
            event: event.to_owned(),
            ..EventData::default()
        })
        .await
    }

    /// Success with a payload but no correlation id.
    pub async fn post_success_with_payload(
        &self,
        event: &str,
        payload: impl Into<String>,
    ) -> Result<(), EmitError> {
        self.post(EventData::success("", event, payload)).await
    }

    /// Failure with an explicit code and message but no correlation id.
    pub async fn post_failure_no_payload(
        &self,
        event: &str,
        code: i32,
        message: impl Into<String>,
    ) -> Result<(), EmitError> {
        self.post(EventData::failure("", event, code, message)).await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use assert_matches::assert_matches;
    use sdkgate_core::SdkError;

    use super::*;
    use crate::coerce::CoerceError;

    // ── Shapes ──────────────────────────────────────────────────────

    #[tokio::test]
    async fn success_event_fields() {
        let (r, mut rx) = Responder::channel(4);
        r.post_success("op1", "GetUser", "{\"id\":1}").await.unwrap();
        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.event, "GetUser");
        assert_eq!(ev.operation_id, "op1");
        assert_eq!(ev.data, "{\"id\":1}");
        assert_eq!(ev.err_code, 0);
    }

    #[tokio::test]
    async fn failure_with_structured_error() {
        let (r, mut rx) = Responder::channel(4);
        let err = DispatchError::from(SdkError::new(1301, "group dismissed"));
        r.post_failure("op2", "JoinGroup", &err).await.unwrap();
        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.err_code, 1301);
        assert_eq!(ev.err_msg, "group dismissed");
        assert_eq!(ev.operation_id, "op2");
        assert!(ev.data.is_empty());
    }

    #[tokio::test]
    async fn failure_without_structured_error_has_zero_values() {
        let (r, mut rx) = Responder::channel(4);
        let err = DispatchError::Target(std::io::Error::other("io").into());
        r.post_failure("op3", "Upload", &err).await.unwrap();
        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.err_code, 0);
        assert!(ev.err_msg.is_empty());
    }

    #[tokio::test]
    async fn failure_for_shape_mismatch_is_internal() {
        let (r, mut rx) = Responder::channel(4);
        let err = DispatchError::ShapeMismatch(CoerceError::ArityMismatch {
            expected: 2,
            found: 1,
        });
        r.post_failure("op4", "Add", &err).await.unwrap();
        assert_eq!(rx.recv().await.unwrap().err_code, 10006);
    }

    #[tokio::test]
    async fn connection_level_shapes() {
        let (r, mut rx) = Responder::channel(8);
        r.post_failure_no_error("Close").await.unwrap();
        r.post_success_no_payload("Heartbeat").await.unwrap();
        r.post_success_with_payload("Connected", "sid").await.unwrap();
        r.post_failure_no_payload("Error", 10002, "bad frame")
            .await
            .unwrap();

        let ev = rx.recv().await.unwrap();
        assert_eq!((ev.event.as_str(), ev.err_code), ("Close", 0));
        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.event, "Heartbeat");
        let ev = rx.recv().await.unwrap();
        assert_eq!((ev.event.as_str(), ev.data.as_str()), ("Connected", "sid"));
        assert!(ev.operation_id.is_empty());
        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.err_code, 10002);
        assert_eq!(ev.err_msg, "bad frame");
    }

    // ── Backpressure ────────────────────────────────────────────────

    #[tokio::test]
    async fn full_queue_blocks_until_drained() {
        let (r, mut rx) = Responder::channel(1);
        r.post_success_no_payload("first").await.unwrap();

        let r2 = r.clone();
        let pending = tokio::spawn(async move { r2.post_success_no_payload("second").await });

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!pending.is_finished());

        assert_eq!(rx.recv().await.unwrap().event, "first");
        pending.await.unwrap().unwrap();
        assert_eq!(rx.recv().await.unwrap().event, "second");
    }

    #[tokio::test]
    async fn closed_queue_is_error() {
        let (r, rx) = Responder::channel(1);
        drop(rx);
        assert!(r.is_closed());
        assert_matches!(
            r.post_success_no_payload("x").await,
            Err(EmitError::QueueClosed)
        );
    }

    #[tokio::test]
    async fn blocked_post_fails_when_session_torn_down() {
        let (r, mut rx) = Responder::channel(1);
        r.post_success_no_payload("fill").await.unwrap();
        let r2 = r.clone();
        let pending = tokio::spawn(async move { r2.post_success_no_payload("late").await });
        tokio::time::sleep(Duration::from_millis(20)).await;
        rx.close();
        assert_matches!(pending.await.unwrap(), Err(EmitError::QueueClosed));
    }
}
