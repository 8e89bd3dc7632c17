//! Handler Adapters
//!
//! Turns plain async functions into type-erased invokers the registry can
//! store. Two calling shapes are accepted:
//!
//! - `async fn(CallContext) -> Result<R, E>`
//! - `async fn(CallContext, P) -> Result<R, E>`
//!
//! where `P: DeserializeOwned + Serialize`, `R: Serialize` and
//! `E: Into<anyhow::Error>`. Params are judged zero or not after decoding,
//! which is why `P` must also serialize.
//! Anything else does not implement [`Handler`] and is refused by the
//! compiler. Handlers described only at runtime go through
//! [`dynamic`] instead.

use std::future::Future;

use futures::future::BoxFuture;
use jrpc_common::{CallContext, Payload};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::config::ParamsPolicy;
use crate::shape::{Shape, Signature};
use crate::zero;

/// Future produced by one handler invocation.
pub type HandlerFuture = BoxFuture<'static, Result<Payload, HandlerFailure>>;

/// Type-erased handler: decodes params, applies the policy, then starts the call.
pub type Invoker = Box<
    dyn Fn(CallContext, Option<&Payload>, ParamsPolicy) -> Result<HandlerFuture, ParamsError> + Send + Sync,
>;

/// The params payload does not fit the handler.
#[derive(Error, Debug)]
#[error("invalid params: {0}")]
pub struct ParamsError(pub String);

/// How a started handler call can fail.
#[derive(Error, Debug)]
pub enum HandlerFailure {
    /// The handler returned an error.
    #[error(transparent)]
    Handler(anyhow::Error),

    /// The handler succeeded but its result could not be encoded.
    #[error("failed to encode result: {0}")]
    Encode(String),
}

/// A function usable as an RPC method.
///
/// `Args` only disambiguates the two calling shapes.
pub trait Handler<Args>: Send + Sync + 'static {
    /// The calling shape, for registration checks and diagnostics.
    fn signature() -> Signature;

    fn into_invoker(self) -> Invoker;
}

impl<F, Fut, R, E> Handler<(CallContext,)> for F
where
    F: Fn(CallContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, E>> + Send + 'static,
    R: Serialize + Send + 'static,
    E: Into<anyhow::Error> + Send + 'static,
{
    fn signature() -> Signature {
        Signature::new(vec![Shape::Context], vec![Shape::typed::<R>(), Shape::Error])
    }

    fn into_invoker(self) -> Invoker {
        Box::new(move |ctx, _params, _policy| {
            let call = (self)(ctx);
            let future: HandlerFuture = Box::pin(async move { finish(call.await) });
            Ok(future)
        })
    }
}

impl<F, Fut, P, R, E> Handler<(CallContext, P)> for F
where
    F: Fn(CallContext, P) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, E>> + Send + 'static,
    P: DeserializeOwned + Serialize + 'static,
    R: Serialize + Send + 'static,
    E: Into<anyhow::Error> + Send + 'static,
{
    fn signature() -> Signature {
        Signature::new(
            vec![Shape::Context, Shape::typed::<P>()],
            vec![Shape::typed::<R>(), Shape::Error],
        )
    }

    fn into_invoker(self) -> Invoker {
        Box::new(move |ctx, params, policy| {
            let params = params.ok_or_else(|| ParamsError("missing params".into()))?;
            let value: P = params.decode().map_err(|e| ParamsError(e.to_string()))?;
            if policy == ParamsPolicy::RejectZero && zero::is_zero(&value) {
                return Err(ParamsError(format!("zero value from {}", params)));
            }
            let call = (self)(ctx, value);
            let future: HandlerFuture = Box::pin(async move { finish(call.await) });
            Ok(future)
        })
    }
}

fn finish<R, E>(outcome: Result<R, E>) -> Result<Payload, HandlerFailure>
where
    R: Serialize,
    E: Into<anyhow::Error>,
{
    let result = outcome.map_err(|e| HandlerFailure::Handler(e.into()))?;
    Payload::encode(&result).map_err(|e| HandlerFailure::Encode(e.to_string()))
}

/// Builds an invoker for a handler described by an explicit [`Signature`].
///
/// Params are checked against the signature's param shape before the call,
/// and the returned value against its result shape after it.
pub fn dynamic<F, Fut>(signature: &Signature, handler: F) -> Invoker
where
    F: Fn(CallContext, Option<Value>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
{
    let param_shape = signature.param_shape().cloned();
    let result_shape = signature.result_shape().cloned().unwrap_or(Shape::Any);

    Box::new(move |ctx, params, policy| {
        let value = match &param_shape {
            Some(shape) => {
                let payload = params.ok_or_else(|| ParamsError("missing params".into()))?;
                let value: Value = payload.decode().map_err(|e| ParamsError(e.to_string()))?;
                if !shape.accepts(&value) {
                    return Err(ParamsError(format!("expected {}, got {}", shape, value)));
                }
                if policy == ParamsPolicy::RejectZero && shape.is_zero(&value) {
                    return Err(ParamsError(format!("zero value {}", value)));
                }
                Some(value)
            }
            None => None,
        };

        let call = handler(ctx, value);
        let result_shape = result_shape.clone();
        let future: HandlerFuture = Box::pin(async move {
            let result = call.await.map_err(HandlerFailure::Handler)?;
            if !result_shape.accepts(&result) {
                return Err(HandlerFailure::Encode(format!(
                    "result {} does not match {}",
                    result, result_shape
                )));
            }
            Payload::encode(&result).map_err(|e| HandlerFailure::Encode(e.to_string()))
        });
        Ok(future)
    })
}
