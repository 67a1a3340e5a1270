//! Progress callbacks for long-running operations.

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::emitter::{EmitError, Responder};

/// Sub-event name used by [`ProgressCallback::progress`].
pub const PROGRESS_SUB_EVENT: &str = "Progress";

/// Capability handed to progress-capable operations.
///
/// Each call produces one non-terminal event immediately, independent of the
/// eventual terminal event.
#[async_trait]
pub trait ProgressCallback: Send + Sync {
    /// Emit an intermediate event named by `sub_event`.
    async fn on_progress(&self, sub_event: &str, payload: Value) -> Result<(), EmitError>;

    /// Emit `{"progress": percent}` under the `Progress` sub-event.
    async fn progress(&self, percent: u32) -> Result<(), EmitError> {
        self.on_progress(PROGRESS_SUB_EVENT, json!({ "progress": percent }))
            .await
    }
}

/// Progress callback bound to an operation name and a session responder.
///
/// Events are tagged `<Operation><SubEvent>`, e.g. `SendMessageProgress`,
/// and carry the invocation's correlation id.
#[derive(Clone, Debug)]
pub struct EmitterProgress {
    responder: Responder,
    operation: String,
    correlation_id: String,
}

impl EmitterProgress {
    /// Bind to `operation` and `correlation_id`.
    pub fn new(
        responder: Responder,
        operation: impl Into<String>,
        correlation_id: impl Into<String>,
    ) -> Self {
        Self {
            responder,
            operation: operation.into(),
            correlation_id: correlation_id.into(),
        }
    }

    /// Full event tag for a sub-event.
    pub fn event_name(&self, sub_event: &str) -> String {
        format!("{}{sub_event}", self.operation)
    }
}

#[async_trait]
impl ProgressCallback for EmitterProgress {
    async fn on_progress(&self, sub_event: &str, payload: Value) -> Result<(), EmitError> {
        let event = self.event_name(sub_event);
        self.responder
            .post_success(&self.correlation_id, &event, payload.to_string())
            .await
    }
}
