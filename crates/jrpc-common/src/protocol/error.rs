use thiserror::Error;

use super::envelope::Id;

/// Why a raw body could not be turned into an [`Envelope`](super::Envelope).
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The body is not syntactically valid JSON.
    #[error("parse error: {0}")]
    Parse(#[source] serde_json::Error),

    /// The body is JSON but not an envelope: not an object, or an object
    /// whose members have the wrong types (for example `"method": 5`).
    /// `id` is whatever could still be salvaged.
    #[error("invalid envelope: {source}")]
    Invalid {
        id: Option<Id>,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Error, Debug)]
pub enum JrpcError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Response carries an error instead of a result")]
    MissingResult,

    #[error("Error code {0} is reserved for the protocol")]
    ReservedCode(i32),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, JrpcError>;
