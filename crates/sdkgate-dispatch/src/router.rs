//! Per-session entry point.
//!
//! Every call returns immediately; the dispatch runs on its own task and
//! reports through exactly one terminal event on the session queue.
//! Concurrent calls on one session do not wait for each other, so terminal
//! events can arrive in any order.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{Instrument, info_span, warn};

use crate::catalog::CatalogEntry;
use crate::context::InvocationContext;
use crate::emitter::{EmitError, Responder};
use crate::error::DispatchError;
use crate::invoke::dispatch;
use crate::name::{FUNC_ERROR_EVENT, derive_operation_name};
use crate::operation::Operation;
use crate::progress::{EmitterProgress, ProgressCallback};
use crate::session::{ResourceModule, SessionState};
use crate::wire::WireArg;

/// The one operation allowed through the readiness gate before login.
pub const LOGIN_OPERATION: &str = "Login";

/// Dispatch front end bound to one session.
#[derive(Clone, Debug)]
pub struct FuncRouter {
    responder: Responder,
    session: Arc<SessionState>,
}

impl FuncRouter {
    /// Bind a router to a session and its output queue.
    pub fn new(responder: Responder, session: Arc<SessionState>) -> Self {
        Self { responder, session }
    }

    /// Outcome poster for this session.
    pub fn responder(&self) -> &Responder {
        &self.responder
    }

    /// Session this router serves.
    pub fn session(&self) -> &Arc<SessionState> {
        &self.session
    }

    /// Gate on session readiness. `Login` always passes.
    pub fn check_readiness(&self, operation: &str) -> Result<(), DispatchError> {
        let readiness = self.session.readiness();
        if operation == LOGIN_OPERATION || readiness.is_loaded() {
            return Ok(());
        }
        let missing: Vec<&str> = readiness
            .missing()
            .into_iter()
            .map(ResourceModule::as_str)
            .collect();
        Err(DispatchError::ResourceNotReady(missing.join(",")))
    }

    /// Invoke `op` without a progress callback.
    pub fn call(
        &self,
        correlation_id: impl Into<String>,
        op: Arc<dyn Operation>,
        args: Vec<WireArg>,
    ) -> JoinHandle<Result<(), EmitError>> {
        self.spawn(correlation_id.into(), op, args, false)
    }

    /// Invoke `op` with a progress callback bound to its name.
    pub fn call_with_progress(
        &self,
        correlation_id: impl Into<String>,
        op: Arc<dyn Operation>,
        args: Vec<WireArg>,
    ) -> JoinHandle<Result<(), EmitError>> {
        self.spawn(correlation_id.into(), op, args, true)
    }

    /// Invoke a catalog entry the way it was registered.
    pub fn call_entry(
        &self,
        correlation_id: impl Into<String>,
        entry: &CatalogEntry,
        args: Vec<WireArg>,
    ) -> JoinHandle<Result<(), EmitError>> {
        self.spawn(
            correlation_id.into(),
            Arc::clone(&entry.operation),
            args,
            entry.progress,
        )
    }

    fn spawn(
        &self,
        correlation_id: String,
        op: Arc<dyn Operation>,
        args: Vec<WireArg>,
        progress: bool,
    ) -> JoinHandle<Result<(), EmitError>> {
        let router = self.clone();
        let span = info_span!("func", session_id = %self.session.id());
        tokio::spawn(
            async move { router.execute(correlation_id, op, args, progress).await }
                .instrument(span),
        )
    }

    async fn execute(
        self,
        correlation_id: String,
        op: Arc<dyn Operation>,
        args: Vec<WireArg>,
        progress: bool,
    ) -> Result<(), EmitError> {
        let Some(name) = derive_operation_name(op.identity()) else {
            warn!(identity = op.identity(), "cannot derive operation name");
            let err = DispatchError::Argument(format!(
                "cannot derive operation name from `{}`",
                op.identity()
            ));
            return self
                .responder
                .post_failure(&correlation_id, FUNC_ERROR_EVENT, &err)
                .await;
        };

        if let Err(err) = self.check_readiness(&name) {
            return self
                .responder
                .post_failure(&correlation_id, &name, &err)
                .await;
        }

        let callback = progress.then(|| {
            Arc::new(EmitterProgress::new(
                self.responder.clone(),
                name.clone(),
                correlation_id.clone(),
            )) as Arc<dyn ProgressCallback>
        });
        let ctx = InvocationContext::new(
            correlation_id.clone(),
            name.clone(),
            Arc::clone(&self.session),
            callback,
        );

        let outcome = dispatch(op.as_ref(), ctx, args)
            .await
            .and_then(|payload| payload.to_wire().map_err(DispatchError::from));

        match outcome {
            Ok(data) => {
                self.responder
                    .post_success(&correlation_id, &name, data)
                    .await
            }
            Err(err) => {
                self.responder
                    .post_failure(&correlation_id, &name, &err)
                    .await
            }
        }
    }
}
