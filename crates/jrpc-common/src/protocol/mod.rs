pub mod envelope;
pub mod error;
pub mod jsonrpc;
pub mod message;
pub mod payload;

#[cfg(test)]
mod tests;

pub use envelope::{Envelope, EnvelopeKind, Id, VERSION};
pub use error::{DecodeError, JrpcError, Result};
pub use jsonrpc::ErrorObject;
pub use message::{Message, Outcome, Request, Response};
pub use payload::Payload;
