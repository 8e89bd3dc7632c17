//! Typed Request / Response Messages
//!
//! These are the values the dispatcher and the client work with. Both are
//! immutable once built and turn into an [`Envelope`] only when encoded.

use serde::de::DeserializeOwned;

use super::envelope::{Envelope, Id};
use super::error::{JrpcError, Result};
use super::jsonrpc::ErrorObject;
use super::payload::Payload;

/// Anything that can be written as a JSON-RPC object.
pub trait Message {
    fn into_envelope(self) -> Envelope;
}

/// A JSON-RPC request.
///
/// `id == None` makes the request a notification.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    id: Option<Id>,
    method: String,
    params: Option<Payload>,
}

impl Request {
    /// Creates a request that expects a response correlated by `id`.
    pub fn new(id: impl Into<Id>, method: impl Into<String>, params: Option<Payload>) -> Self {
        Self {
            id: Some(id.into()),
            method: method.into(),
            params,
        }
    }

    /// Creates a notification: no id, no response.
    pub fn notification(method: impl Into<String>, params: Option<Payload>) -> Self {
        Self {
            id: None,
            method: method.into(),
            params,
        }
    }

    /// Creates a request or, when `id` is `None`, a notification.
    pub fn from_parts(id: Option<Id>, method: impl Into<String>, params: Option<Payload>) -> Self {
        Self {
            id,
            method: method.into(),
            params,
        }
    }

    pub fn id(&self) -> Option<&Id> {
        self.id.as_ref()
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn params(&self) -> Option<&Payload> {
        self.params.as_ref()
    }

    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }

    pub fn into_parts(self) -> (Option<Id>, String, Option<Payload>) {
        (self.id, self.method, self.params)
    }
}

impl Message for Request {
    fn into_envelope(self) -> Envelope {
        Envelope {
            id: self.id.map(|id| id.to_value()),
            method: Some(self.method),
            params: self.params,
            ..Envelope::default()
        }
    }
}

/// Either side of a response; never both.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success(Payload),
    Failure(ErrorObject),
}

/// A JSON-RPC response.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    id: Id,
    outcome: Outcome,
}

impl Response {
    pub fn success(id: Id, result: Payload) -> Self {
        Self {
            id,
            outcome: Outcome::Success(result),
        }
    }

    pub fn failure(id: Id, error: ErrorObject) -> Self {
        Self {
            id,
            outcome: Outcome::Failure(error),
        }
    }

    /// Builds a response from a decoded envelope.
    ///
    /// A `null` result next to an error object is tolerated (some peers
    /// always emit both members); anything else carrying both, or neither,
    /// is rejected.
    pub fn from_envelope(envelope: Envelope) -> Result<Self> {
        if envelope.method.is_some() {
            return Err(JrpcError::InvalidResponse("message is a request".into()));
        }
        let id = match envelope.id {
            Some(ref raw) => Id::from_value(raw).ok_or_else(|| {
                JrpcError::InvalidResponse(format!("invalid id type: {}", raw))
            })?,
            None => Id::Null,
        };
        let outcome = match (envelope.result, envelope.error) {
            (Some(result), None) => Outcome::Success(result),
            (None, Some(error)) => Outcome::Failure(error),
            (Some(result), Some(error)) if result.is_null() => Outcome::Failure(error),
            (Some(_), Some(_)) => {
                return Err(JrpcError::InvalidResponse("both result and error present".into()))
            }
            (None, None) => {
                return Err(JrpcError::InvalidResponse("neither result nor error present".into()))
            }
        };
        Ok(Self { id, outcome })
    }

    pub fn id(&self) -> &Id {
        &self.id
    }

    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    pub fn result(&self) -> Option<&Payload> {
        match &self.outcome {
            Outcome::Success(result) => Some(result),
            Outcome::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorObject> {
        match &self.outcome {
            Outcome::Success(_) => None,
            Outcome::Failure(error) => Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success(_))
    }

    /// Decodes the result into the caller's expected type.
    ///
    /// # Errors
    ///
    /// [`JrpcError::MissingResult`] for an error response, or the
    /// deserialization error when the result does not fit `T`.
    pub fn decode_result<T: DeserializeOwned>(&self) -> Result<T> {
        let result = self.result().ok_or(JrpcError::MissingResult)?;
        Ok(result.decode()?)
    }

    pub fn into_result(self) -> std::result::Result<Payload, ErrorObject> {
        match self.outcome {
            Outcome::Success(result) => Ok(result),
            Outcome::Failure(error) => Err(error),
        }
    }
}

impl Message for Response {
    fn into_envelope(self) -> Envelope {
        let (result, error) = match self.outcome {
            Outcome::Success(result) => (Some(result), None),
            Outcome::Failure(error) => (None, Some(error)),
        };
        Envelope {
            id: Some(self.id.to_value()),
            result,
            error,
            ..Envelope::default()
        }
    }
}

impl Message for Envelope {
    fn into_envelope(self) -> Envelope {
        self
    }
}
