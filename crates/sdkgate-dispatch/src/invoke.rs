//! Invocation core: one dispatch from wire arguments to payload.
//!
//! Steps, in order:
//! 1. reject an empty correlation id
//! 2. check the argument count against the declared parameters
//! 3. coerce arguments and start the call (panics contained)
//! 4. await the call (panics contained)
//! 5. take the error slot as the failure, or normalize the value slots
//!
//! No timeout and no retry: a dispatch runs to completion or failure.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::{Duration, Instant};

use futures::FutureExt;
use metrics::{counter, histogram};
use serde::{Serialize, Serializer};
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use crate::coerce::CoerceError;
use crate::context::InvocationContext;
use crate::error::DispatchError;
use crate::operation::Operation;
use crate::returns::ReturnSlot;
use crate::wire::WireArg;

/// Dispatches slower than this are logged.
const SLOW_DISPATCH: Duration = Duration::from_secs(5);

/// Lifecycle of one dispatch. `Succeeded` and `Failed` are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchPhase {
    /// Accepted, preconditions not yet checked.
    Pending,
    /// Binding wire arguments to parameters.
    Coercing,
    /// The operation is running.
    Invoking,
    /// Finished with a payload.
    Succeeded,
    /// Finished with an error.
    Failed,
}

impl DispatchPhase {
    /// Lowercase name for logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Coercing => "coercing",
            Self::Invoking => "invoking",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }

    /// Whether no further transition can happen.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

/// Normalized success payload.
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    /// The operation returned no values. Serializes as `""`.
    Empty,
    /// Exactly one value.
    Single(Value),
    /// Several values, in declaration order.
    Many(Vec<Value>),
}

impl Payload {
    /// Build from normalized values.
    pub fn from_values(mut values: Vec<Value>) -> Self {
        match values.len() {
            0 => Self::Empty,
            1 => values.pop().map_or(Self::Empty, Self::Single),
            _ => Self::Many(values),
        }
    }

    /// Serialize for the `data` field of an outcome event.
    pub fn to_wire(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl Serialize for Payload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Empty => serializer.serialize_str(""),
            Self::Single(value) => value.serialize(serializer),
            Self::Many(values) => values.serialize(serializer),
        }
    }
}

fn enter_phase(phase: DispatchPhase) {
    let _ = tracing::Span::current().record("phase", phase.as_str());
    debug!(phase = phase.as_str(), "dispatch phase");
}

/// Run one dispatch and return its payload or failure.
///
/// Panics raised while preparing or running the operation become
/// [`DispatchError::Panic`]; they never reach the caller.
#[instrument(
    skip_all,
    fields(
        operation = %ctx.operation(),
        operation_id = %ctx.correlation_id(),
        phase = tracing::field::Empty,
    )
)]
pub async fn dispatch(
    op: &dyn Operation,
    ctx: InvocationContext,
    args: Vec<WireArg>,
) -> Result<Payload, DispatchError> {
    let operation = ctx.operation().to_owned();
    counter!("dispatch_requests_total", "operation" => operation.clone()).increment(1);

    let start = Instant::now();
    let result = run(op, ctx, args).await;
    let elapsed = start.elapsed();

    histogram!("dispatch_duration_seconds", "operation" => operation.clone())
        .record(elapsed.as_secs_f64());

    match &result {
        Ok(payload) => {
            enter_phase(DispatchPhase::Succeeded);
            info!(cost_ms = elapsed.as_millis(), resp = ?payload, "output resp");
        }
        Err(err) => {
            enter_phase(DispatchPhase::Failed);
            counter!(
                "dispatch_errors_total",
                "operation" => operation.clone(),
                "error_type" => err.error_type()
            )
            .increment(1);
            if matches!(err, DispatchError::Panic(_)) {
                counter!("dispatch_panics_total", "operation" => operation.clone()).increment(1);
            }
            warn!(cost_ms = elapsed.as_millis(), error = %err, "fn call error");
        }
    }

    if elapsed >= SLOW_DISPATCH {
        warn!(
            duration_secs = elapsed.as_secs_f64(),
            "slow dispatch"
        );
    }

    result
}

async fn run(
    op: &dyn Operation,
    ctx: InvocationContext,
    args: Vec<WireArg>,
) -> Result<Payload, DispatchError> {
    enter_phase(DispatchPhase::Pending);
    if ctx.correlation_id().is_empty() {
        return Err(DispatchError::Argument("operation id is empty".into()));
    }

    let expected = op.params().len();
    if args.len() != expected {
        return Err(CoerceError::ArityMismatch {
            expected,
            found: args.len(),
        }
        .into());
    }

    info!(args = ?args, "input req");

    enter_phase(DispatchPhase::Coercing);
    let call = std::panic::catch_unwind(AssertUnwindSafe(|| op.prepare(ctx, args)))
        .map_err(|payload| contain_panic(payload.as_ref()))??;

    enter_phase(DispatchPhase::Invoking);
    let slots = AssertUnwindSafe(call)
        .catch_unwind()
        .await
        .map_err(|payload| contain_panic(payload.as_ref()))??;

    let values = slots.into_iter().map(ReturnSlot::normalized).collect();
    Ok(Payload::from_values(values))
}

fn contain_panic(payload: &(dyn Any + Send)) -> DispatchError {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_owned());
    error!(panic = %message, "operation panicked");
    DispatchError::Panic(message)
}
