//! JSON-RPC Transport Layer
//!
//! This module holds the envelope codec and the HTTP helpers the server and
//! client bindings are built on.
//!
//! # Components
//!
//! - **[`JsonCodec`]**: Encode messages / decode envelopes
//! - **[`http`]**: Hyper type aliases, response builders and body collection
//!
//! The codec itself knows nothing about HTTP; any transport that moves whole
//! JSON texts can carry it.

pub mod codec;
pub mod http;

pub use codec::JsonCodec;
pub use http::{HyperRequest, HyperResponse};

#[cfg(test)]
mod tests;
