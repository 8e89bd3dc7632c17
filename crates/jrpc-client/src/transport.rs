//! Client Transports
//!
//! The call engine only needs two operations from a transport: send a body
//! and wait for the reply body, or send a body and wait only for delivery.
//! [`HttpTransport`] implements both over HTTP/1.1 with hyper; tests and
//! benchmarks can supply their own [`Transport`].

use async_trait::async_trait;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::header::{ACCEPT, CONTENT_TYPE, USER_AGENT};
use hyper::{Method, Request, StatusCode, Uri};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use jrpc_common::transport::http::APPLICATION_JSON;

use crate::config::ClientConfig;
use crate::error::TransportError;

/// Moves encoded messages to a peer.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Sends a request body and returns the reply body.
    async fn send(&self, body: Vec<u8>) -> Result<Vec<u8>, TransportError>;

    /// Sends a notification body. Any reply body is discarded.
    async fn post(&self, body: Vec<u8>) -> Result<(), TransportError>;
}

/// JSON-RPC over HTTP `POST`.
///
/// One pooled hyper client is shared by every call made through the transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client<HttpConnector, Full<Bytes>>,
    uri: Uri,
    config: ClientConfig,
}

impl HttpTransport {
    /// Creates a transport for the endpoint at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidUri`] if `url` does not parse or has
    /// no scheme, and [`TransportError::UnsupportedScheme`] for anything but
    /// `http`.
    pub fn new(url: &str) -> Result<Self, TransportError> {
        Self::with_config(url, ClientConfig::default())
    }

    pub fn with_config(url: &str, config: ClientConfig) -> Result<Self, TransportError> {
        let uri: Uri = url.parse().map_err(|e: hyper::http::uri::InvalidUri| TransportError::InvalidUri {
            url: url.to_owned(),
            reason: e.to_string(),
        })?;

        match uri.scheme_str() {
            Some("http") => {}
            Some(other) => return Err(TransportError::UnsupportedScheme(other.to_owned())),
            None => {
                return Err(TransportError::InvalidUri {
                    url: url.to_owned(),
                    reason: "missing scheme".to_owned(),
                })
            }
        }

        let client = Client::builder(TokioExecutor::new()).build_http();
        Ok(Self { client, uri, config })
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn build_request(&self, body: Vec<u8>) -> Result<Request<Full<Bytes>>, TransportError> {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(self.uri.clone())
            .header(CONTENT_TYPE, APPLICATION_JSON)
            .header(ACCEPT, APPLICATION_JSON);
        if let Some(agent) = &self.config.user_agent {
            builder = builder.header(USER_AGENT, agent.as_str());
        }
        builder
            .body(Full::new(Bytes::from(body)))
            .map_err(|e| TransportError::Http(format!("Failed to build request: {}", e)))
    }

    async fn exchange(&self, body: Vec<u8>) -> Result<Bytes, TransportError> {
        let request = self.build_request(body)?;
        match self.config.request_timeout {
            Some(timeout) => tokio::time::timeout(timeout, self.round_trip(request))
                .await
                .map_err(|_| TransportError::Timeout(timeout))?,
            None => self.round_trip(request).await,
        }
    }

    async fn round_trip(&self, request: Request<Full<Bytes>>) -> Result<Bytes, TransportError> {
        let response = self
            .client
            .request(request)
            .await
            .map_err(|e| TransportError::Http(e.to_string()))?;

        if response.status() != StatusCode::OK {
            tracing::debug!("Endpoint {} answered {}", self.uri, response.status());
            return Err(TransportError::Status(response.status().as_u16()));
        }

        let collected = response
            .into_body()
            .collect()
            .await
            .map_err(|e| TransportError::Body(e.to_string()))?;
        Ok(collected.to_bytes())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, body: Vec<u8>) -> Result<Vec<u8>, TransportError> {
        Ok(self.exchange(body).await?.to_vec())
    }

    async fn post(&self, body: Vec<u8>) -> Result<(), TransportError> {
        self.exchange(body).await.map(drop)
    }
}
