//! HTTP Transport Utilities
//!
//! Helpers shared by the hyper server binding and tests: response
//! construction and size-limited body collection.
//!
//! # Architecture
//!
//! JSON-RPC rides on plain HTTP/1.1 `POST` requests:
//! - Every JSON-RPC reply is sent with status `200` and `Content-Type: application/json`
//! - Notifications are answered with `200` and an empty body
//! - Anything that is not a JSON-RPC call (wrong method, wrong path) gets `404 not found`
//!   before the body is looked at
//!
//! # Components
//!
//! - **[`HyperRequest`]**: Type alias for Hyper incoming requests
//! - **[`HyperResponse`]**: Type alias for Hyper responses
//! - **[`read_body`]**: Collects a body, refusing anything over a byte limit

use std::error::Error as StdError;

use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes, Incoming};
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::{Request, Response, StatusCode};
use thiserror::Error;

/// Type alias for Hyper incoming requests
pub type HyperRequest = Request<Incoming>;

/// Type alias for Hyper responses with full body
pub type HyperResponse = Response<Full<Bytes>>;

/// MIME type of every JSON-RPC body.
pub const APPLICATION_JSON: &str = "application/json";

/// Why a request body could not be collected.
#[derive(Error, Debug)]
pub enum BodyError {
    #[error("body exceeds {0} bytes")]
    TooLarge(usize),

    #[error("failed to read body: {0}")]
    Read(String),
}

/// Create a `200` response carrying an encoded JSON-RPC message.
pub fn json_response(body: Vec<u8>) -> HyperResponse {
    let mut response = Response::new(Full::new(Bytes::from(body)));
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
    response
}

/// Create a `200` response with no body (the reply to a notification).
pub fn empty_response() -> HyperResponse {
    Response::new(Full::new(Bytes::new()))
}

/// Create the transport-level `404` used for non-POST requests and foreign paths.
pub fn not_found() -> HyperResponse {
    let mut response = Response::new(Full::new(Bytes::from_static(b"not found")));
    *response.status_mut() = StatusCode::NOT_FOUND;
    response
}

/// Collect a request body, failing once it exceeds `limit` bytes
///
/// # Arguments
///
/// * `body` - The body to drain
/// * `limit` - Maximum number of bytes accepted
///
/// # Returns
///
/// The complete body, [`BodyError::TooLarge`] when the limit was hit, or
/// [`BodyError::Read`] for any other read failure
pub async fn read_body<B>(body: B, limit: usize) -> Result<Bytes, BodyError>
where
    B: Body,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => Err(BodyError::TooLarge(limit)),
        Err(e) => Err(BodyError::Read(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_response_headers() {
        let response = json_response(br#"{"jsonrpc":"2.0","id":1,"result":42}"#.to_vec());
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get(CONTENT_TYPE).unwrap(), APPLICATION_JSON);
    }

    #[test]
    fn test_empty_response_has_no_content_type() {
        let response = empty_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(CONTENT_TYPE).is_none());
    }

    #[tokio::test]
    async fn test_not_found_body() {
        let response = not_found();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"not found");
    }

    #[tokio::test]
    async fn test_read_body_within_limit() {
        let body = Full::new(Bytes::from_static(b"{\"a\":1}"));
        let bytes = read_body(body, 64).await.unwrap();
        assert_eq!(&bytes[..], b"{\"a\":1}");
    }

    #[tokio::test]
    async fn test_read_body_over_limit() {
        let body = Full::new(Bytes::from(vec![b'x'; 100]));
        match read_body(body, 10).await {
            Err(BodyError::TooLarge(limit)) => assert_eq!(limit, 10),
            other => panic!("expected TooLarge, got {:?}", other),
        }
    }
}
