//! Inbound request frames.
//!
//! A frame names a catalog method, carries the caller's correlation id and a
//! positional argument list:
//!
//! ```json
//! {"reqFuncName": "GetUsersInfo", "operationID": "op-17", "data": [["u1", "u2"]]}
//! ```

use metrics::counter;
use sdkgate_core::codes;
use sdkgate_dispatch::wire::args_from_value;
use sdkgate_dispatch::{DispatchError, EmitError, FuncRouter, OperationCatalog};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

/// Event tag for frames that could not be parsed.
pub const ERROR_EVENT: &str = "Error";

/// Keep-alive method answered by the transport itself.
pub const HEARTBEAT_METHOD: &str = "Heartbeat";

/// One client request.
#[derive(Clone, Debug, Deserialize)]
pub struct RequestFrame {
    /// Catalog method name.
    #[serde(rename = "reqFuncName")]
    pub req_func_name: String,
    /// Caller-supplied correlation id.
    #[serde(rename = "operationID", default)]
    pub operation_id: String,
    /// Positional arguments; a non-array value is a single argument.
    #[serde(default)]
    pub data: Option<Value>,
}

/// Parse and route one inbound text frame.
///
/// Returns once the request has been handed to the router; the outcome
/// arrives later on the session queue. Only a closed queue is an error.
#[instrument(skip_all, fields(method))]
pub async fn handle_text(
    text: &str,
    catalog: &OperationCatalog,
    router: &FuncRouter,
) -> Result<(), EmitError> {
    let responder = router.responder();

    let frame: RequestFrame = match serde_json::from_str(text) {
        Ok(f) => f,
        Err(e) => {
            warn!(error = %e, "invalid request frame");
            return responder
                .post_failure_no_payload(
                    ERROR_EVENT,
                    codes::ARGS_ERROR,
                    format!("invalid request frame: {e}"),
                )
                .await;
        }
    };

    let method = frame.req_func_name;
    let _ = tracing::Span::current().record("method", method.as_str());

    if method == HEARTBEAT_METHOD {
        return responder.post_success_no_payload(HEARTBEAT_METHOD).await;
    }

    let Some(entry) = catalog.get(&method) else {
        counter!("ws_unknown_method_total").increment(1);
        warn!(method, operation_id = frame.operation_id, "unknown method");
        let err = DispatchError::Argument(format!("unknown method {method}"));
        return responder
            .post_failure(&frame.operation_id, &method, &err)
            .await;
    };

    debug!(method, operation_id = frame.operation_id, "routing request");
    let _detached = router.call_entry(frame.operation_id, entry, args_from_value(frame.data));
    Ok(())
}
