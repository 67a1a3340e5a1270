//! Operation return values.
//!
//! An operation returns zero or more value slots, optionally followed by an
//! error slot (`Result<_, E>`). Each value slot remembers its declared shape
//! so that a null collection can be replaced by an empty one.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::coerce::Json;
use crate::error::{DispatchError, OperationError};
use crate::shape::{Shape, WireShape};

/// One returned value with its declared shape.
#[derive(Clone, Debug, PartialEq)]
pub struct ReturnSlot {
    /// Declared shape of the slot.
    pub shape: Shape,
    /// Serialized value.
    pub value: Value,
}

impl ReturnSlot {
    /// Serialize `value` into a slot declared as `T`.
    pub fn of<T: Serialize + WireShape>(value: &T) -> Result<Self, DispatchError> {
        Ok(Self {
            shape: T::shape(),
            value: serde_json::to_value(value)?,
        })
    }

    /// The value with null collections replaced by empty ones.
    pub fn normalized(self) -> Value {
        match (self.value, self.shape.empty_value()) {
            (Value::Null, Some(empty)) => empty,
            (value, _) => value,
        }
    }
}

/// Types an operation may return.
pub trait IntoReturns {
    /// Split into value slots, or the error-slot failure.
    fn into_returns(self) -> Result<Vec<ReturnSlot>, DispatchError>;
}

impl IntoReturns for () {
    fn into_returns(self) -> Result<Vec<ReturnSlot>, DispatchError> {
        Ok(Vec::new())
    }
}

impl<R, E> IntoReturns for Result<R, E>
where
    R: IntoReturns,
    E: Into<OperationError>,
{
    fn into_returns(self) -> Result<Vec<ReturnSlot>, DispatchError> {
        match self {
            Ok(values) => values.into_returns(),
            Err(err) => Err(DispatchError::Target(err.into())),
        }
    }
}

macro_rules! single_return {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoReturns for $ty {
                fn into_returns(self) -> Result<Vec<ReturnSlot>, DispatchError> {
                    Ok(vec![ReturnSlot::of(&self)?])
                }
            }
        )*
    };
}

single_return!(
    i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, bool, String, Value,
);

impl<T: Serialize> IntoReturns for Vec<T> {
    fn into_returns(self) -> Result<Vec<ReturnSlot>, DispatchError> {
        Ok(vec![ReturnSlot::of(&self)?])
    }
}

impl<K: Serialize, V: Serialize, S> IntoReturns for HashMap<K, V, S> {
    fn into_returns(self) -> Result<Vec<ReturnSlot>, DispatchError> {
        Ok(vec![ReturnSlot::of(&self)?])
    }
}

impl<K: Serialize, V: Serialize> IntoReturns for BTreeMap<K, V> {
    fn into_returns(self) -> Result<Vec<ReturnSlot>, DispatchError> {
        Ok(vec![ReturnSlot::of(&self)?])
    }
}

impl<T: Serialize + WireShape> IntoReturns for Option<T> {
    fn into_returns(self) -> Result<Vec<ReturnSlot>, DispatchError> {
        Ok(vec![ReturnSlot::of(&self)?])
    }
}

impl<T: Serialize + WireShape> IntoReturns for Box<T> {
    fn into_returns(self) -> Result<Vec<ReturnSlot>, DispatchError> {
        Ok(vec![ReturnSlot::of(&self)?])
    }
}

impl<T: Serialize + WireShape> IntoReturns for Arc<T> {
    fn into_returns(self) -> Result<Vec<ReturnSlot>, DispatchError> {
        Ok(vec![ReturnSlot {
            shape: <Arc<T>>::shape(),
            value: serde_json::to_value(&*self)?,
        }])
    }
}

impl<T: Serialize> IntoReturns for Json<T> {
    fn into_returns(self) -> Result<Vec<ReturnSlot>, DispatchError> {
        Ok(vec![ReturnSlot::of(&self)?])
    }
}

macro_rules! tuple_return {
    ($($name:ident),+) => {
        #[allow(non_snake_case)]
        impl<$($name: Serialize + WireShape),+> IntoReturns for ($($name,)+) {
            fn into_returns(self) -> Result<Vec<ReturnSlot>, DispatchError> {
                let ($($name,)+) = self;
                Ok(vec![$(ReturnSlot::of(&$name)?),+])
            }
        }
    };
}

tuple_return!(A, B);
tuple_return!(A, B, C);
tuple_return!(A, B, C, D);

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use sdkgate_core::SdkError;
    use serde_json::json;

    use super::*;

    #[test]
    fn unit_has_no_slots() {
        assert!(().into_returns().unwrap().is_empty());
    }

    #[test]
    fn single_value() {
        let slots = 5_i32.into_returns().unwrap();
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].value, json!(5));
    }

    #[test]
    fn tuple_values_keep_order() {
        let slots = ("a".to_string(), 2_u8, vec![1_i32]).into_returns().unwrap();
        let values: Vec<Value> = slots.into_iter().map(ReturnSlot::normalized).collect();
        assert_eq!(values, vec![json!("a"), json!(2), json!([1])]);
    }

    #[test]
    fn ok_result_unwraps_values() {
        let r: Result<String, SdkError> = Ok("done".into());
        assert_eq!(r.into_returns().unwrap()[0].value, json!("done"));
    }

    #[test]
    fn ok_unit_result_has_no_slots() {
        let r: Result<(), SdkError> = Ok(());
        assert!(r.into_returns().unwrap().is_empty());
    }

    #[test]
    fn err_result_discards_values() {
        let r: Result<(String, i32), SdkError> = Err(SdkError::new(7, "nope"));
        let err = r.into_returns().unwrap_err();
        assert_matches!(err, DispatchError::Target(_));
        assert_eq!(err.code(), Some(7));
    }

    #[test]
    fn null_sequence_normalizes_to_empty() {
        let slots = Option::<Vec<i32>>::None.into_returns().unwrap();
        assert_eq!(slots[0].value, Value::Null);
        assert_eq!(slots[0].clone().normalized(), json!([]));
    }

    #[test]
    fn null_mapping_normalizes_to_empty() {
        let slots = Option::<HashMap<String, i32>>::None.into_returns().unwrap();
        assert_eq!(slots[0].clone().normalized(), json!({}));
    }

    #[test]
    fn null_scalar_stays_null() {
        let slots = Option::<i32>::None.into_returns().unwrap();
        assert_eq!(slots[0].clone().normalized(), Value::Null);
    }

    #[test]
    fn shared_sequence_serializes_inner_value() {
        let slots = Arc::new(vec![1_i32, 2]).into_returns().unwrap();
        assert_eq!(slots[0].value, json!([1, 2]));
        assert_eq!(slots[0].shape, <Arc<Vec<i32>>>::shape());
    }

    #[test]
    fn unserializable_map_key_is_serialization_error() {
        let mut m: HashMap<(i32, i32), i32> = HashMap::new();
        let _ = m.insert((1, 2), 3);
        assert_matches!(m.into_returns(), Err(DispatchError::Serialization(_)));
    }
}
