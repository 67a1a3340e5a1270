//! # sdkgate-core
//!
//! Foundation types shared by every gateway crate:
//!
//! - **Errors**: [`SdkError`], the structured code + message shape reported to clients
//! - **Wire envelope**: [`EventData`], the outbound event written to a session
//! - **IDs**: [`SessionId`] newtype (UUID v7)
//! - **Logging**: [`logging::init_subscriber`] and the numeric [`logging::LogLevel`] scale

#![deny(unsafe_code)]

pub mod errors;
pub mod event;
pub mod ids;
pub mod logging;

pub use errors::{SdkError, codes};
pub use event::EventData;
pub use ids::SessionId;
