//! JSON-RPC Common Types and Codec
//!
//! This crate provides the protocol definitions shared by the `jrpc` server
//! and client crates.
//!
//! # Overview
//!
//! - **Protocol Layer**: envelopes, ids, payload capsules, error objects and
//!   the typed [`Request`]/[`Response`] values built from them
//! - **Transport Layer**: the JSON envelope codec and HTTP helpers
//! - **Context**: [`CallContext`], the cancellation/deadline value every call carries
//!
//! # Architecture
//!
//! The wire format is a single JSON-RPC 2.0 object per message:
//! - **Request**: `{"jsonrpc":"2.0","id":1,"method":"add","params":[1,2]}`
//! - **Success**: `{"jsonrpc":"2.0","id":1,"result":3}`
//! - **Failure**: `{"jsonrpc":"2.0","id":1,"error":{"code":-32601,"message":"Method not found"}}`
//!
//! `params` and `result` stay undecoded ([`Payload`]) until whoever consumes
//! them picks a target type.
//!
//! # Example
//!
//! ```
//! use jrpc_common::{JsonCodec, Payload, Request, Response, Id};
//!
//! let request = Request::new(1u64, "add", Some(Payload::encode(&[1, 2]).unwrap()));
//! let bytes = JsonCodec::encode(request).unwrap();
//!
//! let response = Response::success(Id::from(1u64), Payload::encode(&3).unwrap());
//! assert_eq!(response.decode_result::<i32>().unwrap(), 3);
//! # let _ = bytes;
//! ```

pub mod context;
pub mod protocol;
pub mod transport;

pub use context::{CallContext, ContextError};
pub use protocol::*;
pub use transport::JsonCodec;
