//! JSON-RPC 2.0 Error Objects
//!
//! Every failure that crosses the wire is carried by an [`ErrorObject`]:
//! `{"code": ..., "message": "...", "data": ...}`.
//!
//! # Error Codes
//!
//! Codes in `-32768..=-32000` are reserved for the protocol:
//! - `-32700`: Parse error
//! - `-32600`: Invalid Request
//! - `-32601`: Method not found
//! - `-32602`: Invalid params
//! - `-32603`: Internal error
//! - `-32000`: Server error (plain handler error)
//! - `-32001`: Request body too large
//!
//! Applications pick codes outside that band through
//! [`ErrorObject::application`], which refuses reserved codes instead of
//! silently accepting them.
//!
//! # Example
//!
//! ```
//! use jrpc_common::protocol::jsonrpc::{ErrorObject, METHOD_NOT_FOUND};
//!
//! let error = ErrorObject::method_not_found();
//! assert_eq!(error.code(), METHOD_NOT_FOUND);
//!
//! let custom = ErrorObject::application(4004, "no such user").unwrap();
//! assert_eq!(custom.code(), 4004);
//! assert!(ErrorObject::application(-32050, "sneaky").is_err());
//! ```

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::error::JrpcError;

/// Invalid JSON was received by the server
pub const PARSE_ERROR: i32 = -32700;
/// The JSON sent is not a valid Request object
pub const INVALID_REQUEST: i32 = -32600;
/// The method does not exist / is not available
pub const METHOD_NOT_FOUND: i32 = -32601;
/// Invalid method parameter(s)
pub const INVALID_PARAMS: i32 = -32602;
/// Internal JSON-RPC error
pub const INTERNAL_ERROR: i32 = -32603;
/// A handler returned a plain error
pub const SERVER_ERROR: i32 = -32000;
/// Request entity too large
pub const REQUEST_TOO_LARGE: i32 = -32001;

/// Codes only the protocol layer may use.
pub const RESERVED_CODES: RangeInclusive<i32> = -32768..=-32000;

/// JSON-RPC 2.0 error object.
///
/// The fields are read-only so that a reserved code can only come from one of
/// the named constructors or from a peer's reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[error("{message} (code {code})")]
pub struct ErrorObject {
    code: i32,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl ErrorObject {
    fn reserved(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Create a parse error (-32700)
    pub fn parse_error() -> Self {
        Self::reserved(PARSE_ERROR, "Parse error")
    }

    /// Create an invalid request error (-32600)
    pub fn invalid_request() -> Self {
        Self::reserved(INVALID_REQUEST, "Invalid Request")
    }

    /// Create a method not found error (-32601)
    pub fn method_not_found() -> Self {
        Self::reserved(METHOD_NOT_FOUND, "Method not found")
    }

    /// Create an invalid params error (-32602)
    pub fn invalid_params() -> Self {
        Self::reserved(INVALID_PARAMS, "Invalid params")
    }

    /// Create an internal error (-32603)
    ///
    /// Used when a handler succeeded but its result could not be encoded.
    pub fn internal_error() -> Self {
        Self::reserved(INTERNAL_ERROR, "Internal error")
    }

    /// Create a server error (-32000) carrying a handler's error description.
    pub fn server_error(message: impl Into<String>) -> Self {
        Self::reserved(SERVER_ERROR, message)
    }

    /// Create a request too large error (-32001)
    pub fn request_too_large(limit: usize) -> Self {
        Self::reserved(
            REQUEST_TOO_LARGE,
            format!("Request body too large (max {} bytes)", limit),
        )
    }

    /// Create an application error with a code outside the reserved band.
    ///
    /// # Errors
    ///
    /// Returns [`JrpcError::ReservedCode`] when `code` falls inside
    /// [`RESERVED_CODES`].
    pub fn application(code: i32, message: impl Into<String>) -> Result<Self, JrpcError> {
        if RESERVED_CODES.contains(&code) {
            return Err(JrpcError::ReservedCode(code));
        }
        Ok(Self::reserved(code, message))
    }

    /// Attaches structured data to the error.
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn code(&self) -> i32 {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    /// Whether the code belongs to the protocol's reserved band.
    pub fn is_reserved(&self) -> bool {
        RESERVED_CODES.contains(&self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_jsonrpc_error_codes() {
        assert_eq!(ErrorObject::parse_error().code(), -32700);
        assert_eq!(ErrorObject::invalid_request().code(), -32600);
        assert_eq!(ErrorObject::method_not_found().code(), -32601);
        assert_eq!(ErrorObject::invalid_params().code(), -32602);
        assert_eq!(ErrorObject::internal_error().code(), -32603);
        assert_eq!(ErrorObject::server_error("boom").code(), -32000);
    }

    #[test]
    fn test_jsonrpc_error_messages() {
        assert_eq!(ErrorObject::parse_error().message(), "Parse error");
        assert_eq!(ErrorObject::invalid_request().message(), "Invalid Request");
        assert_eq!(ErrorObject::method_not_found().message(), "Method not found");
        assert_eq!(ErrorObject::invalid_params().message(), "Invalid params");
        assert_eq!(ErrorObject::internal_error().message(), "Internal error");
        assert_eq!(ErrorObject::server_error("something went wrong").message(), "something went wrong");
    }

    #[test]
    fn test_application_error_rejects_reserved_codes() {
        for code in [-32768, -32700, -32603, -32099, -32000] {
            match ErrorObject::application(code, "nope") {
                Err(JrpcError::ReservedCode(c)) => assert_eq!(c, code),
                other => panic!("expected reserved code error for {}, got {:?}", code, other),
            }
        }
    }

    #[test]
    fn test_application_error_accepts_codes_outside_band() {
        for code in [-32769, -31999, -1, 0, 1, 4004] {
            let error = ErrorObject::application(code, "ok").unwrap();
            assert_eq!(error.code(), code);
            assert!(!error.is_reserved());
        }
    }

    #[test]
    fn test_error_serialization_omits_missing_data() {
        let serialized = serde_json::to_string(&ErrorObject::method_not_found()).unwrap();
        assert_eq!(serialized, r#"{"code":-32601,"message":"Method not found"}"#);
    }

    #[test]
    fn test_error_serialization_with_data() {
        let error = ErrorObject::application(42, "quota exceeded")
            .unwrap()
            .with_data(json!({"limit": 10}));
        let serialized = serde_json::to_string(&error).unwrap();
        assert_eq!(
            serialized,
            r#"{"code":42,"message":"quota exceeded","data":{"limit":10}}"#
        );
    }

    #[test]
    fn test_error_deserialization_accepts_any_code() {
        let json = r#"{"code":-32050,"message":"peer specific","data":[1,2]}"#;
        let error: ErrorObject = serde_json::from_str(json).unwrap();
        assert_eq!(error.code(), -32050);
        assert!(error.is_reserved());
        assert_eq!(error.data(), Some(&json!([1, 2])));
    }

    #[test]
    fn test_request_too_large_error() {
        let error = ErrorObject::request_too_large(1024);
        assert_eq!(error.code(), REQUEST_TOO_LARGE);
        assert!(error.message().contains("1024"));
        assert!(error.message().contains("too large"));
        assert_eq!(error.data(), None);
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            ErrorObject::method_not_found().to_string(),
            "Method not found (code -32601)"
        );
    }
}
