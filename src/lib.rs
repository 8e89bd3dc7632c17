//! # jrpc
//!
//! JSON-RPC 2.0 over HTTP: a typed handler registry, a dispatcher that turns
//! request bodies into responses, and a call engine with cancellable calls.
//!
//! This crate re-exports the workspace crates:
//!
//! - [`common`] - envelope codec, ids, payloads, error objects, [`CallContext`]
//! - [`server`] - [`Registry`], [`Dispatcher`], [`HttpServer`]
//! - [`client`] - [`Client`] and its transports
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use jrpc::{CallContext, Client, Dispatcher, HttpServer, Registry};
//!
//! async fn add(_ctx: CallContext, (a, b): (i64, i64)) -> anyhow::Result<i64> {
//!     Ok(a + b)
//! }
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let registry = Registry::new();
//! registry.register("add", add)?;
//!
//! let dispatcher = Arc::new(Dispatcher::new(Arc::new(registry)));
//! tokio::spawn(HttpServer::new(dispatcher).run("127.0.0.1:8080".parse()?));
//!
//! let client = Client::new("http://127.0.0.1:8080")?;
//! let sum: i64 = client.request(&CallContext::background(), "add", (1, 2)).await?;
//! assert_eq!(sum, 3);
//! # Ok(())
//! # }
//! ```

pub use jrpc_client as client;
pub use jrpc_common as common;
pub use jrpc_server as server;

pub use jrpc_client::{CallError, Client, ClientConfig, HttpTransport, Transport, TransportError};
pub use jrpc_common::{
    CallContext, ContextError, Envelope, ErrorObject, Id, JrpcError, JsonCodec, Payload, Request,
    Response,
};
pub use jrpc_server::{
    Dispatcher, HttpServer, ParamsPolicy, RegistrationError, Registry, ServerConfig, Shape,
    Signature,
};
