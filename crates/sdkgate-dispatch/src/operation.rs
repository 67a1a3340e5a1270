//! Operation references.
//!
//! An [`Operation`] is an opaque callable with a declared parameter list.
//! Plain async functions become operations through [`operation`]:
//!
//! ```ignore
//! async fn add(_ctx: InvocationContext, a: i32, b: i32) -> i32 { a + b }
//! let op = operation(add);
//! ```

use std::future::Future;
use std::marker::PhantomData;

use futures::future::BoxFuture;

use crate::coerce::{CoerceError, FromWire};
use crate::context::InvocationContext;
use crate::error::DispatchError;
use crate::returns::{IntoReturns, ReturnSlot};
use crate::shape::{Shape, WireShape};
use crate::wire::WireArg;

/// A pending invocation, resolved once the operation finishes.
pub type InvocationFuture = BoxFuture<'static, Result<Vec<ReturnSlot>, DispatchError>>;

/// An opaque callable unit with a declared shape.
pub trait Operation: Send + Sync + 'static {
    /// Implementation-level identity the event tag is derived from.
    fn identity(&self) -> &str;

    /// Declared parameter shapes, excluding the leading context.
    fn params(&self) -> &[Shape];

    /// Coerce `args` and start the call.
    ///
    /// The returned future has not been polled; nothing in the operation body
    /// has run yet when this returns.
    fn prepare(
        &self,
        ctx: InvocationContext,
        args: Vec<WireArg>,
    ) -> Result<InvocationFuture, CoerceError>;
}

/// Async functions usable as operations, keyed by their argument tuple.
pub trait Handler<Args>: Clone + Send + Sync + 'static {
    /// Declared parameter shapes.
    fn param_shapes() -> Vec<Shape>;

    /// Coerce `args` and call the function.
    fn call_with(
        &self,
        ctx: InvocationContext,
        args: Vec<WireArg>,
    ) -> Result<InvocationFuture, CoerceError>;
}

macro_rules! count {
    () => { 0_usize };
    ($head:ident $($tail:ident)*) => { 1_usize + count!($($tail)*) };
}

macro_rules! impl_handler {
    ($($ty:ident),*) => {
        #[allow(non_snake_case, unused_mut, unused_variables)]
        impl<F, Fut, R, $($ty,)*> Handler<($($ty,)*)> for F
        where
            F: Fn(InvocationContext, $($ty,)*) -> Fut + Clone + Send + Sync + 'static,
            Fut: Future<Output = R> + Send + 'static,
            R: IntoReturns,
            $($ty: FromWire + Send + 'static,)*
        {
            fn param_shapes() -> Vec<Shape> {
                vec![$(<$ty as WireShape>::shape(),)*]
            }

            fn call_with(
                &self,
                ctx: InvocationContext,
                args: Vec<WireArg>,
            ) -> Result<InvocationFuture, CoerceError> {
                let expected = count!($($ty)*);
                let found = args.len();
                if found != expected {
                    return Err(CoerceError::ArityMismatch { expected, found });
                }
                let mut args = args.into_iter().enumerate();
                $(
                    let $ty = {
                        let (index, arg) = args
                            .next()
                            .ok_or(CoerceError::ArityMismatch { expected, found })?;
                        <$ty as FromWire>::from_wire(arg, index)?
                    };
                )*
                let fut = (self)(ctx, $($ty,)*);
                Ok(Box::pin(async move { fut.await.into_returns() }))
            }
        }
    };
}

impl_handler!();
impl_handler!(A1);
impl_handler!(A1, A2);
impl_handler!(A1, A2, A3);
impl_handler!(A1, A2, A3, A4);
impl_handler!(A1, A2, A3, A4, A5);
impl_handler!(A1, A2, A3, A4, A5, A6);

/// An [`Operation`] backed by an async function.
pub struct FnOperation<F, Args> {
    handler: F,
    identity: String,
    params: Vec<Shape>,
    _args: PhantomData<fn() -> Args>,
}

impl<F, Args> FnOperation<F, Args> {
    /// Override the identity (and therefore the derived event tag).
    #[must_use]
    pub fn named(mut self, identity: impl Into<String>) -> Self {
        self.identity = identity.into();
        self
    }
}

impl<F, Args> Operation for FnOperation<F, Args>
where
    F: Handler<Args>,
    Args: 'static,
{
    fn identity(&self) -> &str {
        &self.identity
    }

    fn params(&self) -> &[Shape] {
        &self.params
    }

    fn prepare(
        &self,
        ctx: InvocationContext,
        args: Vec<WireArg>,
    ) -> Result<InvocationFuture, CoerceError> {
        self.handler.call_with(ctx, args)
    }
}

/// Wrap an async function as an operation.
///
/// The identity defaults to the function's type path.
pub fn operation<F, Args>(handler: F) -> FnOperation<F, Args>
where
    F: Handler<Args>,
{
    FnOperation {
        identity: std::any::type_name::<F>().to_owned(),
        params: F::param_shapes(),
        handler,
        _args: PhantomData,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;
    use crate::session::SessionState;
    use crate::shape::IntKind;

    fn make_test_context() -> InvocationContext {
        InvocationContext::new("op1", "Test", Arc::new(SessionState::default()), None)
    }

    async fn add(_ctx: InvocationContext, a: i32, b: i32) -> i32 {
        a + b
    }

    async fn no_args(_ctx: InvocationContext) {}

    async fn echo_ctx(ctx: InvocationContext) -> String {
        ctx.correlation_id().to_owned()
    }

    #[test]
    fn identity_is_function_path() {
        let op = operation(add);
        assert!(op.identity().ends_with("::add"), "{}", op.identity());
    }

    #[test]
    fn named_overrides_identity() {
        let op = operation(add).named("Sum");
        assert_eq!(op.identity(), "Sum");
    }

    #[test]
    fn params_are_declared() {
        let op = operation(add);
        assert_eq!(
            op.params(),
            &[Shape::Int(IntKind::I32), Shape::Int(IntKind::I32)]
        );
        assert!(operation(no_args).params().is_empty());
    }

    #[tokio::test]
    async fn prepare_and_run() {
        let op = operation(add);
        let fut = op
            .prepare(make_test_context(), vec![WireArg::Number(2.0), WireArg::Number(3.9)])
            .unwrap();
        let slots = fut.await.unwrap();
        assert_eq!(slots[0].value, json!(5));
    }

    #[tokio::test]
    async fn context_is_first_argument() {
        let op = operation(echo_ctx);
        let slots = op.prepare(make_test_context(), vec![]).unwrap().await.unwrap();
        assert_eq!(slots[0].value, json!("op1"));
    }

    #[test]
    fn arity_mismatch() {
        let op = operation(add);
        assert_matches!(
            op.prepare(make_test_context(), vec![WireArg::Number(1.0)]).err(),
            Some(CoerceError::ArityMismatch {
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn type_mismatch_stops_before_call() {
        let op = operation(add);
        assert_matches!(
            op.prepare(
                make_test_context(),
                vec![WireArg::Number(1.0), WireArg::from("x")]
            )
            .err(),
            Some(CoerceError::TypeMismatch { index: 1, .. })
        );
    }

    #[test]
    fn boxed_as_trait_object() {
        let op: Arc<dyn Operation> = Arc::new(operation(add));
        assert_eq!(op.params().len(), 2);
    }
}
