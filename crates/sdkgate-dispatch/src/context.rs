//! Execution context passed as the first argument of every operation.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::emitter::EmitError;
use crate::progress::ProgressCallback;
use crate::session::SessionState;

/// Per-invocation context.
#[derive(Clone)]
pub struct InvocationContext {
    correlation_id: String,
    operation: String,
    session: Arc<SessionState>,
    progress: Option<Arc<dyn ProgressCallback>>,
}

impl InvocationContext {
    /// Build a context for one invocation.
    pub fn new(
        correlation_id: impl Into<String>,
        operation: impl Into<String>,
        session: Arc<SessionState>,
        progress: Option<Arc<dyn ProgressCallback>>,
    ) -> Self {
        Self {
            correlation_id: correlation_id.into(),
            operation: operation.into(),
            session,
            progress,
        }
    }

    /// Caller-supplied correlation id.
    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    /// Derived operation name.
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// The session this invocation belongs to.
    pub fn session(&self) -> &Arc<SessionState> {
        &self.session
    }

    /// Progress callback, present for progress-capable invocations.
    pub fn progress(&self) -> Option<&Arc<dyn ProgressCallback>> {
        self.progress.as_ref()
    }

    /// Emit an intermediate event if a progress callback is attached.
    ///
    /// Without one this is a no-op.
    pub async fn emit_progress(&self, sub_event: &str, payload: Value) -> Result<(), EmitError> {
        match &self.progress {
            Some(cb) => cb.on_progress(sub_event, payload).await,
            None => Ok(()),
        }
    }

    /// Report a completion percentage if a progress callback is attached.
    pub async fn report_percent(&self, percent: u32) -> Result<(), EmitError> {
        match &self.progress {
            Some(cb) => cb.progress(percent).await,
            None => Ok(()),
        }
    }
}

impl fmt::Debug for InvocationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvocationContext")
            .field("correlation_id", &self.correlation_id)
            .field("operation", &self.operation)
            .field("session", self.session.id())
            .field("progress", &self.progress.is_some())
            .finish()
    }
}
