//! Dispatch failure taxonomy.

use std::fmt;

use sdkgate_core::{SdkError, codes};
use thiserror::Error;

use crate::coerce::CoerceError;

/// Error returned by an operation through its error slot.
///
/// Wraps any `std::error::Error`. If the error (or anything in its source
/// chain) is an [`SdkError`], its code and message are reported to the client.
pub struct OperationError(Box<dyn std::error::Error + Send + Sync>);

impl OperationError {
    /// Create from a plain message with no structured code.
    pub fn msg(message: impl Into<String>) -> Self {
        let message: String = message.into();
        Self(message.into())
    }

    /// The structured error in the chain, if any.
    pub fn sdk_error(&self) -> Option<&SdkError> {
        SdkError::find_in(&*self.0)
    }

    /// Borrow the wrapped error.
    pub fn inner(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        &*self.0
    }
}

impl<E> From<E> for OperationError
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn from(err: E) -> Self {
        Self(Box::new(err))
    }
}

impl fmt::Display for OperationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Debug for OperationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

/// Why a dispatch failed. Every variant becomes a failure outcome event.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Missing correlation id or malformed operation reference.
    #[error("argument error: {0}")]
    Argument(String),
    /// The session's resources are not initialised.
    #[error("resource not loaded: {0}")]
    ResourceNotReady(String),
    /// Arguments could not be bound to the declared parameters.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(#[from] CoerceError),
    /// The operation returned an error.
    #[error("{0}")]
    Target(OperationError),
    /// The operation panicked.
    #[error("call panic: {0}")]
    Panic(String),
    /// The result could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DispatchError {
    /// Code reported on the wire, or `None` for a target error without one.
    pub fn code(&self) -> Option<i32> {
        match self {
            Self::Argument(_) => Some(codes::ARGS_ERROR),
            Self::ResourceNotReady(_) => Some(codes::RESOURCE_LOAD_NOT_COMPLETE),
            Self::ShapeMismatch(_) | Self::Serialization(_) => Some(codes::SDK_INTERNAL),
            Self::Panic(_) => Some(codes::UNKNOWN_CODE),
            Self::Target(err) => err.sdk_error().map(|e| e.code),
        }
    }

    /// Structured code + message, when this failure exposes one.
    pub fn to_sdk_error(&self) -> Option<SdkError> {
        match self {
            Self::Target(err) => err.sdk_error().cloned(),
            other => other.code().map(|code| SdkError::new(code, other.to_string())),
        }
    }

    /// Short label used in metrics.
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Argument(_) => "argument",
            Self::ResourceNotReady(_) => "resource_not_ready",
            Self::ShapeMismatch(_) => "shape_mismatch",
            Self::Target(_) => "target",
            Self::Panic(_) => "panic",
            Self::Serialization(_) => "serialization",
        }
    }
}

impl From<SdkError> for DispatchError {
    fn from(err: SdkError) -> Self {
        Self::Target(err.into())
    }
}
