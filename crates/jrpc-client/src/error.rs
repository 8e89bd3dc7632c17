use std::time::Duration;

use jrpc_common::{ContextError, ErrorObject, JrpcError};
use thiserror::Error;

/// Failure to move bytes to or from the peer. Never carries an [`ErrorObject`].
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("invalid URL {url}: {reason}")]
    InvalidUri { url: String, reason: String },

    #[error("unsupported URL scheme {0}")]
    UnsupportedScheme(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("failed to read response body: {0}")]
    Body(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("transport task aborted: {0}")]
    Aborted(String),
}

/// Outcome of a failed call or notification.
///
/// Callers tell the three classes apart with [`rpc_error`](Self::rpc_error)
/// (the peer answered with an error) and [`is_cancelled`](Self::is_cancelled)
/// (the caller gave up); everything else is a transport or framing failure.
#[derive(Error, Debug)]
pub enum CallError {
    #[error("jsonrpc: {0}")]
    Rpc(ErrorObject),

    #[error("jsonrpc: context canceled")]
    Cancelled,

    #[error("jsonrpc: context deadline exceeded")]
    DeadlineExceeded,

    #[error("jsonrpc: {0}")]
    Transport(#[from] TransportError),

    #[error("jsonrpc: invalid response: {0}")]
    InvalidResponse(String),

    #[error("jsonrpc: failed to encode request: {0}")]
    Encode(#[source] JrpcError),

    #[error("jsonrpc: failed to decode response: {0}")]
    Decode(#[source] JrpcError),
}

impl CallError {
    /// The structured error the peer replied with, if any.
    pub fn rpc_error(&self) -> Option<&ErrorObject> {
        match self {
            CallError::Rpc(error) => Some(error),
            _ => None,
        }
    }

    /// True when the caller's context ended before a reply arrived.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CallError::Cancelled | CallError::DeadlineExceeded)
    }
}

impl From<ContextError> for CallError {
    fn from(err: ContextError) -> Self {
        match err {
            ContextError::Cancelled => CallError::Cancelled,
            ContextError::DeadlineExceeded => CallError::DeadlineExceeded,
        }
    }
}
