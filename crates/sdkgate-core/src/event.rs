//! Outbound event envelope.

use serde::{Deserialize, Serialize};

/// The unit written to a session's socket.
///
/// Every field is always present on the wire: absent codes are `0` and
/// absent strings are empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventData {
    /// Event tag, normally the operation name.
    pub event: String,
    /// Error code, `0` on success.
    #[serde(rename = "errCode", default)]
    pub err_code: i32,
    /// Error message, empty on success.
    #[serde(rename = "errMsg", default)]
    pub err_msg: String,
    /// Pre-serialized JSON payload.
    #[serde(default)]
    pub data: String,
    /// Correlation id, empty for connection-level events.
    #[serde(rename = "operationID", default)]
    pub operation_id: String,
}

impl EventData {
    /// Successful terminal event with a payload.
    pub fn success(
        operation_id: impl Into<String>,
        event: impl Into<String>,
        data: impl Into<String>,
    ) -> Self {
        Self {
            event: event.into(),
            data: data.into(),
            operation_id: operation_id.into(),
            ..Self::default()
        }
    }

    /// Failed terminal event.
    pub fn failure(
        operation_id: impl Into<String>,
        event: impl Into<String>,
        err_code: i32,
        err_msg: impl Into<String>,
    ) -> Self {
        Self {
            event: event.into(),
            err_code,
            err_msg: err_msg.into(),
            operation_id: operation_id.into(),
            ..Self::default()
        }
    }

    /// Whether this event reports a failure code.
    pub fn is_error(&self) -> bool {
        self.err_code != 0
    }
}
