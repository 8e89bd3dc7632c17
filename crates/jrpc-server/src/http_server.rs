//! HTTP Server for JSON-RPC
//!
//! This module binds a [`Dispatcher`] to HTTP/1.1 using hyper.
//!
//! # Architecture
//!
//! The HTTP server:
//! - Listens on a TCP socket for incoming HTTP connections
//! - Spawns a tokio task for each connection
//! - Answers anything but `POST` to the configured path with `404 not found`
//! - Reads the body up to the configured limit and hands it to the dispatcher
//! - Returns the encoded response, or an empty `200` for notifications
//! - Stops accepting connections once the dispatcher's shutdown token fires,
//!   and closes open keep-alive connections after their current request
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use jrpc_server::{Dispatcher, HttpServer, Registry};
//!
//! #[tokio::main]
//! async fn main() {
//!     let registry = Arc::new(Registry::new());
//!     let dispatcher = Arc::new(Dispatcher::new(registry));
//!     let server = HttpServer::new(dispatcher);
//!     server.run("127.0.0.1:8080".parse().unwrap()).await.unwrap();
//! }
//! ```

use std::convert::Infallible;
use std::error::Error as StdError;
use std::net::SocketAddr;
use std::sync::Arc;

use hyper::body::Body;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request};
use hyper_util::rt::TokioIo;
use jrpc_common::protocol::error::JrpcError;
use jrpc_common::transport::http::{self, BodyError, HyperResponse};
use jrpc_common::{ErrorObject, Id};
use tokio::net::TcpListener;

use crate::dispatcher::{encode_failure, Dispatcher};

/// HTTP server for a JSON-RPC endpoint.
pub struct HttpServer {
    dispatcher: Arc<Dispatcher>,
}

impl HttpServer {
    /// Creates a new HTTP server around a dispatcher.
    ///
    /// # Arguments
    ///
    /// * `dispatcher` - Processes every request body the server accepts
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// Binds to `addr` and serves until shutdown.
    ///
    /// # Arguments
    ///
    /// * `addr` - The socket address to bind to
    ///
    /// # Returns
    ///
    /// `Ok(())` after shutdown, or a transport error if binding or accepting fails
    pub async fn run(self, addr: SocketAddr) -> Result<(), JrpcError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| JrpcError::Transport(format!("Failed to bind to {}: {}", addr, e)))?;
        self.serve(listener).await
    }

    /// Serves connections from an already bound listener until shutdown.
    pub async fn serve(self, listener: TcpListener) -> Result<(), JrpcError> {
        tracing::info!(
            "HTTP server listening on {}",
            listener
                .local_addr()
                .map_err(|e| JrpcError::Transport(format!("Failed to get local address: {}", e)))?
        );

        let shutdown = self.dispatcher.shutdown_token();
        loop {
            let (stream, peer) = tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("HTTP server stopped accepting connections");
                    return Ok(());
                }
                accepted = listener.accept() => accepted
                    .map_err(|e| JrpcError::Transport(format!("Failed to accept connection: {}", e)))?,
            };
            tracing::debug!("Accepted connection from {}", peer);

            let io = TokioIo::new(stream);
            let dispatcher = self.dispatcher.clone();
            let shutdown = shutdown.clone();

            tokio::task::spawn(async move {
                let service = service_fn(move |req| {
                    let dispatcher = dispatcher.clone();
                    async move { Ok::<_, Infallible>(Self::handle_request(dispatcher, req).await) }
                });

                let conn = http1::Builder::new().serve_connection(io, service);
                tokio::pin!(conn);

                // A request in flight still gets its reply; keep-alive ends.
                let result = tokio::select! {
                    result = conn.as_mut() => result,
                    _ = shutdown.cancelled() => {
                        tracing::debug!("Closing connection from {}", peer);
                        conn.as_mut().graceful_shutdown();
                        conn.as_mut().await
                    }
                };
                if let Err(err) = result {
                    tracing::error!("Error serving connection: {}", err);
                }
            });
        }
    }

    /// Handles one HTTP request.
    ///
    /// # Arguments
    ///
    /// * `dispatcher` - The dispatcher that processes the body
    /// * `req` - The incoming HTTP request
    ///
    /// # Returns
    ///
    /// The HTTP response; this never fails, every error becomes a reply
    pub async fn handle_request<B>(dispatcher: Arc<Dispatcher>, req: Request<B>) -> HyperResponse
    where
        B: Body,
        B::Error: Into<Box<dyn StdError + Send + Sync>>,
    {
        if req.method() != Method::POST {
            tracing::debug!("Rejecting {} request", req.method());
            return http::not_found();
        }
        if let Some(path) = dispatcher.config().path.as_deref() {
            if req.uri().path() != path {
                tracing::debug!("Rejecting request for path {}", req.uri().path());
                return http::not_found();
            }
        }

        let limit = dispatcher.config().max_body_bytes;
        let body = match http::read_body(req.into_body(), limit).await {
            Ok(body) => body,
            Err(BodyError::TooLarge(limit)) => {
                tracing::warn!("Request body exceeds {} bytes", limit);
                return http::json_response(encode_failure(Id::Null, ErrorObject::request_too_large(limit)));
            }
            Err(BodyError::Read(e)) => {
                tracing::error!("Failed to read request body: {}", e);
                return http::json_response(encode_failure(Id::Null, ErrorObject::internal_error()));
            }
        };

        match dispatcher.handle(&body).await {
            Some(reply) => http::json_response(reply),
            None => http::empty_response(),
        }
    }
}
