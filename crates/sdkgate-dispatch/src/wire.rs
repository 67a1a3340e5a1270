//! Loosely-typed arguments as they arrive from the transport.

use serde_json::Value;

/// One positional argument decoded from an inbound frame.
///
/// The transport has a single numeric format, so every JSON number arrives
/// as [`WireArg::Number`] regardless of whether the caller meant an integer.
#[derive(Clone, Debug, PartialEq)]
pub enum WireArg {
    /// Any JSON number.
    Number(f64),
    /// A JSON string (possibly itself JSON-encoded structured data).
    String(String),
    /// A JSON boolean.
    Bool(bool),
    /// Null, arrays and objects sent inline.
    Other(Value),
}

impl WireArg {
    /// Short name of the runtime kind, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Bool(_) => "bool",
            Self::Other(Value::Null) => "null",
            Self::Other(Value::Array(_)) => "array",
            Self::Other(Value::Object(_)) => "object",
            Self::Other(_) => "value",
        }
    }

    /// Convert back into a JSON value.
    ///
    /// Integral numbers inside the exactly-representable range are emitted
    /// as JSON integers.
    #[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
    pub fn into_value(self) -> Value {
        const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
        match self {
            Self::Number(n) if n.fract() == 0.0 && n.abs() <= MAX_EXACT => Value::from(n as i64),
            Self::Number(n) => serde_json::Number::from_f64(n).map_or(Value::Null, Value::Number),
            Self::String(s) => Value::String(s),
            Self::Bool(b) => Value::Bool(b),
            Self::Other(v) => v,
        }
    }
}

impl From<Value> for WireArg {
    fn from(value: Value) -> Self {
        match value {
            Value::Number(n) => match n.as_f64() {
                Some(f) => Self::Number(f),
                None => Self::Other(Value::Number(n)),
            },
            Value::String(s) => Self::String(s),
            Value::Bool(b) => Self::Bool(b),
            other => Self::Other(other),
        }
    }
}

impl From<f64> for WireArg {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for WireArg {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for WireArg {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for WireArg {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// Split a frame's `data` field into positional arguments.
///
/// An array is spread, `null` or an absent field means no arguments, and any
/// other value is a single argument.
pub fn args_from_value(data: Option<Value>) -> Vec<WireArg> {
    match data {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.into_iter().map(WireArg::from).collect(),
        Some(other) => vec![WireArg::from(other)],
    }
}
