//! Declared parameter and return shapes.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::wire::WireArg;

/// Signed integer widths.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IntKind {
    /// `i8`
    I8,
    /// `i16`
    I16,
    /// `i32`
    I32,
    /// `i64`
    I64,
    /// `isize`
    Isize,
}

/// Unsigned integer widths.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UintKind {
    /// `u8`
    U8,
    /// `u16`
    U16,
    /// `u32`
    U32,
    /// `u64`
    U64,
    /// `usize`
    Usize,
}

/// Kind of a structured (JSON-decoded) value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StructKind {
    /// A record type.
    Object,
    /// A list.
    Sequence,
    /// A string-keyed map.
    Mapping,
}

/// The declared shape of one parameter or return slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Shape {
    /// Signed integer.
    Int(IntKind),
    /// Unsigned integer.
    Uint(UintKind),
    /// Floating point.
    Float,
    /// Boolean.
    Bool,
    /// String.
    Text,
    /// Structured value behind `depth` ownership indirections.
    Structured {
        /// What the innermost value is.
        kind: StructKind,
        /// Number of `Box`/`Arc` layers around it.
        depth: usize,
    },
    /// Accepts any wire value unchanged.
    Any,
}

impl Shape {
    /// Structured shape with no indirection.
    pub const fn structured(kind: StructKind) -> Self {
        Self::Structured { kind, depth: 0 }
    }

    /// Whether a JSON string argument is decoded for this shape.
    pub fn is_structured(self) -> bool {
        matches!(self, Self::Structured { .. })
    }

    /// Whether float narrowing applies to this shape.
    pub fn is_integer(self) -> bool {
        matches!(self, Self::Int(_) | Self::Uint(_))
    }

    /// Add one indirection layer; non-structured shapes are unchanged.
    #[must_use]
    pub fn indirect(self) -> Self {
        match self {
            Self::Structured { kind, depth } => Self::Structured {
                kind,
                depth: depth + 1,
            },
            other => other,
        }
    }

    /// The present-but-empty value used in place of a null collection.
    pub fn empty_value(self) -> Option<Value> {
        match self {
            Self::Structured {
                kind: StructKind::Sequence,
                ..
            } => Some(Value::Array(Vec::new())),
            Self::Structured {
                kind: StructKind::Mapping,
                ..
            } => Some(Value::Object(serde_json::Map::new())),
            _ => None,
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(k) => write!(f, "{}", format!("{k:?}").to_lowercase()),
            Self::Uint(k) => write!(f, "{}", format!("{k:?}").to_lowercase()),
            Self::Float => f.write_str("float"),
            Self::Bool => f.write_str("bool"),
            Self::Text => f.write_str("string"),
            Self::Structured { kind, depth } => {
                let inner = match kind {
                    StructKind::Object => "object",
                    StructKind::Sequence => "sequence",
                    StructKind::Mapping => "mapping",
                };
                for _ in 0..*depth {
                    f.write_str("&")?;
                }
                f.write_str(inner)
            }
            Self::Any => f.write_str("any"),
        }
    }
}

/// Types with a declared wire shape.
pub trait WireShape {
    /// The shape this type declares.
    fn shape() -> Shape;
}

macro_rules! declare_shape {
    ($($ty:ty => $shape:expr),* $(,)?) => {
        $(
            impl WireShape for $ty {
                fn shape() -> Shape {
                    $shape
                }
            }
        )*
    };
}

declare_shape! {
    i8 => Shape::Int(IntKind::I8),
    i16 => Shape::Int(IntKind::I16),
    i32 => Shape::Int(IntKind::I32),
    i64 => Shape::Int(IntKind::I64),
    isize => Shape::Int(IntKind::Isize),
    u8 => Shape::Uint(UintKind::U8),
    u16 => Shape::Uint(UintKind::U16),
    u32 => Shape::Uint(UintKind::U32),
    u64 => Shape::Uint(UintKind::U64),
    usize => Shape::Uint(UintKind::Usize),
    f32 => Shape::Float,
    f64 => Shape::Float,
    bool => Shape::Bool,
    String => Shape::Text,
    Value => Shape::Any,
    WireArg => Shape::Any,
}

impl<T> WireShape for Vec<T> {
    fn shape() -> Shape {
        Shape::structured(StructKind::Sequence)
    }
}

impl<K, V, S> WireShape for HashMap<K, V, S> {
    fn shape() -> Shape {
        Shape::structured(StructKind::Mapping)
    }
}

impl<K, V> WireShape for BTreeMap<K, V> {
    fn shape() -> Shape {
        Shape::structured(StructKind::Mapping)
    }
}

impl<T: WireShape> WireShape for Box<T> {
    fn shape() -> Shape {
        T::shape().indirect()
    }
}

impl<T: WireShape> WireShape for Arc<T> {
    fn shape() -> Shape {
        T::shape().indirect()
    }
}

impl<T: WireShape> WireShape for Option<T> {
    fn shape() -> Shape {
        T::shape()
    }
}
