//! # sdkgate-dispatch
//!
//! Generic command dispatcher for SDK operations exposed over a session
//! transport.
//!
//! - [`FuncRouter`]: per-session entry point, readiness gate, task spawning
//! - [`invoke::dispatch`]: one dispatch end to end (coerce, call, contain panics, normalize)
//! - [`coerce`]: wire argument to declared parameter conversion
//! - [`Responder`]: outcome events onto the bounded per-session queue
//! - [`OperationCatalog`]: method name to operation lookup for the transport
//!
//! Operations are plain async functions taking an [`InvocationContext`]
//! followed by up to six typed parameters:
//!
//! ```ignore
//! async fn get_user(ctx: InvocationContext, user_id: String) -> Result<UserInfo, SdkError> { .. }
//!
//! let mut catalog = OperationCatalog::new();
//! catalog.register("GetUser", operation(get_user));
//! ```

#![deny(unsafe_code)]

pub mod catalog;
pub mod coerce;
pub mod context;
pub mod emitter;
pub mod error;
pub mod invoke;
pub mod name;
pub mod operation;
pub mod progress;
pub mod returns;
pub mod router;
pub mod session;
pub mod shape;
pub mod wire;

pub use catalog::{CatalogEntry, OperationCatalog};
pub use coerce::{CoerceError, FromWire, Json};
pub use context::InvocationContext;
pub use emitter::{EmitError, Responder};
pub use error::{DispatchError, OperationError};
pub use invoke::{DispatchPhase, Payload};
pub use name::derive_operation_name;
pub use operation::{FnOperation, Handler, Operation, operation};
pub use progress::{EmitterProgress, ProgressCallback};
pub use returns::{IntoReturns, ReturnSlot};
pub use router::FuncRouter;
pub use session::{Readiness, ResourceModule, SessionState};
pub use shape::{IntKind, Shape, StructKind, UintKind, WireShape};
pub use wire::WireArg;
