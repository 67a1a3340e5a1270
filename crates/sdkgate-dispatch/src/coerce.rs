//! Wire argument coercion.
//!
//! Rules, applied per declared parameter:
//! - an argument whose runtime kind already matches passes through, as does
//!   anything bound to an [`Shape::Any`] slot;
//! - a number bound to an integer parameter is narrowed with truncation toward
//!   zero, saturating at the type bounds (`NaN` becomes `0`);
//! - a string bound to a structured parameter is decoded as JSON into a fresh
//!   value, then wrapped in as many `Box`/`Arc` layers as the parameter declares;
//! - anything else is a [`CoerceError::TypeMismatch`].

use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::shape::{Shape, StructKind, WireShape};
use crate::wire::WireArg;

/// Failure to bind wire arguments to declared parameters.
#[derive(Debug, Error)]
pub enum CoerceError {
    /// The argument's kind cannot be converted to the declared shape.
    #[error("argument {index}: expected {expected}, found {found}")]
    TypeMismatch {
        /// Zero-based argument position.
        index: usize,
        /// Declared shape.
        expected: Shape,
        /// Runtime kind of the wire argument.
        found: &'static str,
    },
    /// A JSON string could not be decoded into the declared structure.
    #[error("argument {index}: invalid JSON for {expected}: {source}")]
    Json {
        /// Zero-based argument position.
        index: usize,
        /// Declared shape.
        expected: Shape,
        /// Decoder error.
        #[source]
        source: serde_json::Error,
    },
    /// Argument count differs from the declared parameter count.
    #[error("expected {expected} arguments, found {found}")]
    ArityMismatch {
        /// Declared parameter count.
        expected: usize,
        /// Supplied argument count.
        found: usize,
    },
}

impl CoerceError {
    /// Mismatch for parameter type `T`.
    pub fn mismatch<T: WireShape>(index: usize, arg: &WireArg) -> Self {
        Self::TypeMismatch {
            index,
            expected: T::shape(),
            found: arg.kind_name(),
        }
    }
}

/// Types constructible from a single wire argument.
pub trait FromWire: WireShape + Sized {
    /// Coerce `arg`, the argument at position `index`.
    fn from_wire(arg: WireArg, index: usize) -> Result<Self, CoerceError>;
}

/// Decode a structured value from a JSON string, or from an inline JSON
/// container of the matching kind.
pub fn decode_structured<T: DeserializeOwned>(
    arg: WireArg,
    index: usize,
    kind: StructKind,
) -> Result<T, CoerceError> {
    let expected = Shape::structured(kind);
    let decoded = match arg {
        WireArg::String(text) => serde_json::from_str(&text),
        WireArg::Other(value @ Value::Array(_)) if kind == StructKind::Sequence => {
            serde_json::from_value(value)
        }
        WireArg::Other(value @ Value::Object(_)) if kind != StructKind::Sequence => {
            serde_json::from_value(value)
        }
        other => {
            return Err(CoerceError::TypeMismatch {
                index,
                expected,
                found: other.kind_name(),
            });
        }
    };
    decoded.map_err(|source| CoerceError::Json {
        index,
        expected,
        source,
    })
}

// ── Integers ────────────────────────────────────────────────────────────────

macro_rules! narrow_from_number {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FromWire for $ty {
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss,
                    clippy::unnecessary_cast
                )]
                fn from_wire(arg: WireArg, index: usize) -> Result<Self, CoerceError> {
                    match arg {
                        WireArg::Number(n) => Ok(n as $ty),
                        other => Err(CoerceError::mismatch::<Self>(index, &other)),
                    }
                }
            }
        )*
    };
}

narrow_from_number!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

// ── Scalars ─────────────────────────────────────────────────────────────────

impl FromWire for bool {
    fn from_wire(arg: WireArg, index: usize) -> Result<Self, CoerceError> {
        match arg {
            WireArg::Bool(b) => Ok(b),
            other => Err(CoerceError::mismatch::<Self>(index, &other)),
        }
    }
}

impl FromWire for String {
    fn from_wire(arg: WireArg, index: usize) -> Result<Self, CoerceError> {
        match arg {
            WireArg::String(s) => Ok(s),
            other => Err(CoerceError::mismatch::<Self>(index, &other)),
        }
    }
}

impl FromWire for Value {
    fn from_wire(arg: WireArg, _index: usize) -> Result<Self, CoerceError> {
        Ok(arg.into_value())
    }
}

impl FromWire for WireArg {
    fn from_wire(arg: WireArg, _index: usize) -> Result<Self, CoerceError> {
        Ok(arg)
    }
}

// ── Collections ─────────────────────────────────────────────────────────────

impl<T: DeserializeOwned> FromWire for Vec<T> {
    fn from_wire(arg: WireArg, index: usize) -> Result<Self, CoerceError> {
        decode_structured(arg, index, StructKind::Sequence)
    }
}

impl<K, V, S> FromWire for HashMap<K, V, S>
where
    K: DeserializeOwned + Eq + Hash,
    V: DeserializeOwned,
    S: BuildHasher + Default,
{
    fn from_wire(arg: WireArg, index: usize) -> Result<Self, CoerceError> {
        decode_structured(arg, index, StructKind::Mapping)
    }
}

impl<K, V> FromWire for BTreeMap<K, V>
where
    K: DeserializeOwned + Ord,
    V: DeserializeOwned,
{
    fn from_wire(arg: WireArg, index: usize) -> Result<Self, CoerceError> {
        decode_structured(arg, index, StructKind::Mapping)
    }
}

// ── Indirection ─────────────────────────────────────────────────────────────

impl<T: FromWire> FromWire for Box<T> {
    fn from_wire(arg: WireArg, index: usize) -> Result<Self, CoerceError> {
        T::from_wire(arg, index).map(Box::new)
    }
}

impl<T: FromWire> FromWire for Arc<T> {
    fn from_wire(arg: WireArg, index: usize) -> Result<Self, CoerceError> {
        T::from_wire(arg, index).map(Arc::new)
    }
}

/// `null` binds to `None`; anything else is coerced as `T`.
impl<T: FromWire> FromWire for Option<T> {
    fn from_wire(arg: WireArg, index: usize) -> Result<Self, CoerceError> {
        match arg {
            WireArg::Other(Value::Null) => Ok(None),
            other => T::from_wire(other, index).map(Some),
        }
    }
}

// ── Records ─────────────────────────────────────────────────────────────────

/// Wrapper binding any serde record type as a structured parameter or return.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    /// Unwrap the inner value.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> std::ops::Deref for Json<T> {
    type Target = T;
    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> WireShape for Json<T> {
    fn shape() -> Shape {
        Shape::structured(StructKind::Object)
    }
}

impl<T: DeserializeOwned> FromWire for Json<T> {
    fn from_wire(arg: WireArg, index: usize) -> Result<Self, CoerceError> {
        decode_structured(arg, index, StructKind::Object).map(Json)
    }
}

/// Declare serde record types as structured parameters and return values.
///
/// ```ignore
/// #[derive(Serialize, Deserialize)]
/// struct SendMsgReq { recv_id: String, content: String }
///
/// wire_struct!(SendMsgReq);
/// ```
#[macro_export]
macro_rules! wire_struct {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::shape::WireShape for $ty {
                fn shape() -> $crate::shape::Shape {
                    $crate::shape::Shape::structured($crate::shape::StructKind::Object)
                }
            }

            impl $crate::coerce::FromWire for $ty {
                fn from_wire(
                    arg: $crate::wire::WireArg,
                    index: usize,
                ) -> ::std::result::Result<Self, $crate::coerce::CoerceError> {
                    $crate::coerce::decode_structured(
                        arg,
                        index,
                        $crate::shape::StructKind::Object,
                    )
                }
            }

            impl $crate::returns::IntoReturns for $ty {
                fn into_returns(
                    self,
                ) -> ::std::result::Result<
                    ::std::vec::Vec<$crate::returns::ReturnSlot>,
                    $crate::error::DispatchError,
                > {
                    ::std::result::Result::Ok(::std::vec![$crate::returns::ReturnSlot::of(&self)?])
                }
            }
        )+
    };
}
