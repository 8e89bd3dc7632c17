//! JSON-RPC Client
//!
//! The call engine: allocates correlation ids, encodes requests, hands them
//! to a [`Transport`] and matches the reply. Every call takes a
//! [`CallContext`](jrpc_common::CallContext); cancelling it or letting its
//! deadline pass releases the caller immediately.
//!
//! # Example
//!
//! ```no_run
//! use jrpc_client::Client;
//! use jrpc_common::CallContext;
//! use std::time::Duration;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::new("http://127.0.0.1:8080")?;
//! let ctx = CallContext::background().with_timeout(Duration::from_secs(2));
//! let sum: i64 = client.request(&ctx, "add", (1, 2)).await?;
//! assert_eq!(sum, 3);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod transport;

pub use client::Client;
pub use config::ClientConfig;
pub use error::{CallError, TransportError};
pub use transport::{HttpTransport, Transport};
