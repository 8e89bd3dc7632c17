use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use jrpc_common::{
    CallContext, Id, JrpcError, JsonCodec, Outcome, Payload, Request, Response,
};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ClientConfig;
use crate::error::{CallError, TransportError};
use crate::transport::{HttpTransport, Transport};

/// JSON-RPC client for making calls and sending notifications
///
/// Clones share the transport and the id counter, so ids stay unique across
/// every clone. Each call runs its transport exchange on its own task and
/// races it against the caller's [`CallContext`].
pub struct Client<T = HttpTransport> {
    transport: Arc<T>,
    next_id: Arc<AtomicU64>,
}

impl Client<HttpTransport> {
    /// Create a client for the HTTP endpoint at `url`
    pub fn new(url: &str) -> Result<Self, TransportError> {
        Ok(Self::with_transport(HttpTransport::new(url)?))
    }

    pub fn with_config(url: &str, config: ClientConfig) -> Result<Self, TransportError> {
        Ok(Self::with_transport(HttpTransport::with_config(url, config)?))
    }
}

impl<T: Transport> Client<T> {
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
            next_id: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Call a method and wait for its response
    ///
    /// `params` is omitted from the request when it serializes to `null`,
    /// so `()` calls a method without params.
    ///
    /// # Errors
    ///
    /// - [`CallError::Rpc`] if the peer answered with an error object
    /// - [`CallError::Cancelled`] / [`CallError::DeadlineExceeded`] if `ctx`
    ///   ended first; the request may still have reached the peer
    /// - [`CallError::Transport`], [`CallError::Decode`] or
    ///   [`CallError::InvalidResponse`] if no usable reply came back
    pub async fn call<P: Serialize>(
        &self,
        ctx: &CallContext,
        method: &str,
        params: P,
    ) -> Result<Response, CallError> {
        if let Some(err) = ctx.err() {
            return Err(err.into());
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let request = Request::new(id, method, encode_params(&params)?);
        let body = JsonCodec::encode(request).map_err(CallError::Encode)?;

        tracing::debug!("Calling {} (id {})", method, id);
        let transport = self.transport.clone();
        let reply = race(ctx, async move { transport.send(body).await }).await?;

        let response = decode_response(&reply)?;
        let expected = Id::from(id);
        match response.outcome() {
            Outcome::Failure(error) if response.id() == &expected || response.id() == &Id::Null => {
                Err(CallError::Rpc(error.clone()))
            }
            _ if response.id() != &expected => Err(CallError::InvalidResponse(format!(
                "response id {} does not match request id {}",
                response.id(),
                expected
            ))),
            _ => Ok(response),
        }
    }

    /// Call a method and decode its result as `R`
    pub async fn request<P, R>(&self, ctx: &CallContext, method: &str, params: P) -> Result<R, CallError>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        self.call(ctx, method, params)
            .await?
            .decode_result()
            .map_err(CallError::Decode)
    }

    /// Send a notification
    ///
    /// Returns once the transport has delivered the request. The peer never
    /// replies, so handler failures are not observable here.
    pub async fn notify<P: Serialize>(
        &self,
        ctx: &CallContext,
        method: &str,
        params: P,
    ) -> Result<(), CallError> {
        if let Some(err) = ctx.err() {
            return Err(err.into());
        }

        let request = Request::notification(method, encode_params(&params)?);
        let body = JsonCodec::encode(request).map_err(CallError::Encode)?;

        tracing::debug!("Notifying {}", method);
        let transport = self.transport.clone();
        race(ctx, async move { transport.post(body).await }).await
    }
}

impl<T> Clone for Client<T> {
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
            next_id: self.next_id.clone(),
        }
    }
}

impl<T> std::fmt::Debug for Client<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("next_id", &self.next_id.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

fn encode_params<P: Serialize>(params: &P) -> Result<Option<Payload>, CallError> {
    let payload = Payload::encode(params).map_err(|e| CallError::Encode(JrpcError::from(e)))?;
    Ok((!payload.is_null()).then_some(payload))
}

fn decode_response(reply: &[u8]) -> Result<Response, CallError> {
    let envelope = JsonCodec::decode(reply).map_err(|e| CallError::Decode(JrpcError::from(e)))?;
    Response::from_envelope(envelope).map_err(|e| match e {
        JrpcError::InvalidResponse(reason) => CallError::InvalidResponse(reason),
        other => CallError::Decode(other),
    })
}

/// Runs `exchange` on its own task and returns whichever finishes first:
/// the exchange or the context. A losing exchange is aborted.
async fn race<F, O>(ctx: &CallContext, exchange: F) -> Result<O, CallError>
where
    F: Future<Output = Result<O, TransportError>> + Send + 'static,
    O: Send + 'static,
{
    let mut task = tokio::spawn(exchange);
    tokio::select! {
        biased;
        err = ctx.done() => {
            task.abort();
            tracing::debug!("Call abandoned: {}", err);
            Err(err.into())
        }
        joined = &mut task => match joined {
            Ok(result) => result.map_err(CallError::Transport),
            Err(e) => Err(CallError::Transport(TransportError::Aborted(e.to_string()))),
        },
    }
}
