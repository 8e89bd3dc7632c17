//! Request Dispatcher
//!
//! Turns one request body into at most one response body.
//!
//! # Architecture
//!
//! Each request passes through the same stages exactly once:
//!
//! 1. **Decode**: not JSON gives `Parse error` with a `null` id
//! 2. **Validate**: version tag, method and id type; failures give
//!    `Invalid Request` with whatever id could be recovered
//! 3. **Resolve**: unknown methods give `Method not found`
//! 4. **Decode params**: missing, undecodable or (under
//!    [`ParamsPolicy::RejectZero`]) zero-valued params give `Invalid params`
//! 5. **Invoke**: handler errors that are [`ErrorObject`]s are forwarded as
//!    they are; any other error becomes code `-32000` with its message
//! 6. **Encode result**: failure gives `Internal error`
//!
//! Notifications run all stages for their side effects but produce nothing.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use jrpc_server::{Dispatcher, Registry};
//! use jrpc_common::CallContext;
//!
//! # async fn demo() {
//! async fn add(_ctx: CallContext, (a, b): (i64, i64)) -> anyhow::Result<i64> {
//!     Ok(a + b)
//! }
//!
//! let registry = Arc::new(Registry::new());
//! registry.register("add", add).unwrap();
//!
//! let dispatcher = Dispatcher::new(registry);
//! let reply = dispatcher.handle(br#"{"jsonrpc":"2.0","id":1,"method":"add","params":[1,2]}"#).await;
//! assert_eq!(reply.unwrap(), br#"{"jsonrpc":"2.0","id":1,"result":3}"#);
//! # }
//! ```

use std::sync::Arc;

use jrpc_common::protocol::error::DecodeError;
use jrpc_common::protocol::VERSION;
use jrpc_common::{CallContext, Envelope, ErrorObject, Id, JsonCodec, Payload, Request, Response};
use tokio_util::sync::CancellationToken;

use crate::config::ServerConfig;
use crate::handler::HandlerFailure;
use crate::registry::Registry;

/// Reply used when a response itself cannot be encoded.
const ENCODE_FAILURE_BODY: &[u8] =
    br#"{"jsonrpc":"2.0","id":null,"error":{"code":-32603,"message":"Internal error"}}"#;

/// Server-side request processor.
///
/// Cheap to share behind an `Arc`; every call is independent.
#[derive(Debug)]
pub struct Dispatcher {
    registry: Arc<Registry>,
    config: ServerConfig,
    shutdown: CancellationToken,
}

impl Dispatcher {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self::with_config(registry, ServerConfig::default())
    }

    pub fn with_config(registry: Arc<Registry>, config: ServerConfig) -> Self {
        Self {
            registry,
            config,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Token whose cancellation stops the server; handler contexts derive from it.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Cancels every in-flight handler context and stops any server built on
    /// this dispatcher.
    pub fn shutdown(&self) {
        tracing::info!("Dispatcher shutting down");
        self.shutdown.cancel();
    }

    /// Handles one raw request body
    ///
    /// # Arguments
    ///
    /// * `body` - The raw request bytes
    ///
    /// # Returns
    ///
    /// The encoded response, or `None` for a notification
    pub async fn handle(&self, body: &[u8]) -> Option<Vec<u8>> {
        let response = self.dispatch(body).await?;
        Some(encode_response(response))
    }

    /// Like [`handle`](Self::handle) but returns the typed response.
    pub async fn dispatch(&self, body: &[u8]) -> Option<Response> {
        let envelope = match JsonCodec::decode(body) {
            Ok(envelope) => envelope,
            Err(DecodeError::Parse(e)) => {
                tracing::warn!("Failed to parse request: {}", e);
                return Some(Response::failure(Id::Null, ErrorObject::parse_error()));
            }
            Err(DecodeError::Invalid { id, source }) => {
                tracing::warn!("Invalid request envelope: {}", source);
                return Some(Response::failure(id.unwrap_or(Id::Null), ErrorObject::invalid_request()));
            }
        };

        match validate(envelope) {
            Ok(request) => self.handle_request(request).await,
            Err(id) => Some(Response::failure(id, ErrorObject::invalid_request())),
        }
    }

    /// Runs an already validated request
    ///
    /// # Returns
    ///
    /// The response, or `None` if the request is a notification
    pub async fn handle_request(&self, request: Request) -> Option<Response> {
        let (id, method, params) = request.into_parts();
        let outcome = self.invoke(&method, params.as_ref()).await;

        match id {
            Some(id) => Some(match outcome {
                Ok(result) => Response::success(id, result),
                Err(error) => Response::failure(id, error),
            }),
            None => {
                if let Err(error) = outcome {
                    tracing::debug!("Notification {} failed: {}", method, error);
                }
                None
            }
        }
    }

    async fn invoke(&self, method: &str, params: Option<&Payload>) -> Result<Payload, ErrorObject> {
        let Some(descriptor) = self.registry.lookup(method) else {
            tracing::warn!("Method {} not found", method);
            return Err(ErrorObject::method_not_found());
        };

        if descriptor.takes_params() && params.is_none() {
            tracing::debug!("Missing params for {}", method);
            return Err(ErrorObject::invalid_params());
        }

        let ctx = CallContext::with_cancellation(self.shutdown.child_token());
        let call = descriptor.invoke(ctx, params, self.config.params_policy).map_err(|e| {
            tracing::debug!("Rejected params for {}: {}", method, e);
            ErrorObject::invalid_params()
        })?;

        tracing::debug!("Invoking {}", method);
        match call.await {
            Ok(result) => Ok(result),
            Err(HandlerFailure::Handler(err)) => Err(match err.downcast::<ErrorObject>() {
                Ok(error) => error,
                Err(err) => ErrorObject::server_error(err.to_string()),
            }),
            Err(HandlerFailure::Encode(reason)) => {
                tracing::error!("Failed to encode result of {}: {}", method, reason);
                Err(ErrorObject::internal_error())
            }
        }
    }
}

/// Checks what the codec leaves to the dispatcher. On failure, returns the
/// id to answer with.
fn validate(envelope: Envelope) -> Result<Request, Id> {
    let id = match &envelope.id {
        None => None,
        Some(raw) => match Id::from_value(raw) {
            Some(id) => Some(id),
            None => {
                tracing::warn!("Invalid id type: {}", raw);
                return Err(Id::Null);
            }
        },
    };
    let reply_id = || id.clone().unwrap_or(Id::Null);

    if envelope.version.as_deref() != Some(VERSION) {
        tracing::warn!("Invalid version tag: {:?}", envelope.version);
        return Err(reply_id());
    }
    let method = match envelope.method {
        Some(method) if !method.is_empty() => method,
        _ => {
            tracing::warn!("Request without method");
            return Err(reply_id());
        }
    };

    Ok(Request::from_parts(id, method, envelope.params))
}

fn encode_response(response: Response) -> Vec<u8> {
    JsonCodec::encode(response).unwrap_or_else(|e| {
        tracing::error!("Failed to encode response: {}", e);
        ENCODE_FAILURE_BODY.to_vec()
    })
}

/// Encodes the reply for a request that never reached the dispatcher.
pub fn encode_failure(id: Id, error: ErrorObject) -> Vec<u8> {
    encode_response(Response::failure(id, error))
}
