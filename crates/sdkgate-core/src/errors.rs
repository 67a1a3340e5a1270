//! Structured SDK error codes.
//!
//! [`SdkError`] is the one error shape whose code and message travel to the
//! client. Any other error reaching the wire is reported with a zero code and
//! an empty message.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Numeric error codes carried in `EventData::err_code`.
pub mod codes {
    /// Malformed or missing arguments (including an empty correlation id).
    pub const ARGS_ERROR: i32 = 10002;
    /// Session resources are not initialised yet.
    pub const RESOURCE_LOAD_NOT_COMPLETE: i32 = 10004;
    /// Fault with no better classification (panics).
    pub const UNKNOWN_CODE: i32 = 10005;
    /// Internal contract violation inside the gateway.
    pub const SDK_INTERNAL: i32 = 10006;
}

/// An error carrying a numeric code and a human-readable message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{message}")]
pub struct SdkError {
    /// Numeric error code (see [`codes`]).
    pub code: i32,
    /// Human-readable message.
    pub message: String,
}

impl SdkError {
    /// Create an error with an explicit code.
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// [`codes::ARGS_ERROR`].
    pub fn args(message: impl Into<String>) -> Self {
        Self::new(codes::ARGS_ERROR, message)
    }

    /// [`codes::RESOURCE_LOAD_NOT_COMPLETE`].
    pub fn resource_not_loaded(message: impl Into<String>) -> Self {
        Self::new(codes::RESOURCE_LOAD_NOT_COMPLETE, message)
    }

    /// [`codes::SDK_INTERNAL`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(codes::SDK_INTERNAL, message)
    }

    /// [`codes::UNKNOWN_CODE`].
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(codes::UNKNOWN_CODE, message)
    }

    /// Prefix the message with additional context, keeping the code.
    #[must_use]
    pub fn wrap(self, context: impl AsRef<str>) -> Self {
        Self {
            code: self.code,
            message: format!("{}: {}", context.as_ref(), self.message),
        }
    }

    /// Find an `SdkError` anywhere in an error's source chain.
    pub fn find_in<'a>(err: &'a (dyn std::error::Error + 'static)) -> Option<&'a SdkError> {
        let mut current: Option<&(dyn std::error::Error + 'static)> = Some(err);
        while let Some(e) = current {
            if let Some(sdk) = e.downcast_ref::<SdkError>() {
                return Some(sdk);
            }
            current = e.source();
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("outer failure")]
    struct Outer {
        #[source]
        inner: SdkError,
    }

    #[test]
    fn constructors_set_codes() {
        assert_eq!(SdkError::args("x").code, 10002);
        assert_eq!(SdkError::resource_not_loaded("x").code, 10004);
        assert_eq!(SdkError::unknown("x").code, 10005);
        assert_eq!(SdkError::internal("x").code, 10006);
    }

    #[test]
    fn display_is_message() {
        let err = SdkError::args("operation id is empty");
        assert_eq!(err.to_string(), "operation id is empty");
    }

    #[test]
    fn wrap_prefixes_message() {
        let err = SdkError::internal("bad json").wrap("argument 1");
        assert_eq!(err.code, codes::SDK_INTERNAL);
        assert_eq!(err.message, "argument 1: bad json");
    }

    #[test]
    fn find_in_direct() {
        let err = SdkError::args("direct");
        let found = SdkError::find_in(&err).unwrap();
        assert_eq!(found.message, "direct");
    }

    #[test]
    fn find_in_source_chain() {
        let err = Outer {
            inner: SdkError::new(42, "nested"),
        };
        let found = SdkError::find_in(&err).unwrap();
        assert_eq!(found.code, 42);
    }

    #[test]
    fn find_in_absent() {
        let err = std::io::Error::other("plain");
        assert!(SdkError::find_in(&err).is_none());
    }

    #[test]
    fn serde_roundtrip() {
        let err = SdkError::args("x");
        let json = serde_json::to_string(&err).unwrap();
        let back: SdkError = serde_json::from_str(&json).unwrap();
        assert_eq!(back, err);
    }
}
