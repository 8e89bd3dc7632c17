//! JSON-RPC Server
//!
//! This crate provides the server half of `jrpc`: the handler registry, the
//! dispatcher that runs requests against it, and a hyper-based HTTP binding.
//!
//! # Components
//!
//! - [`Registry`] - validated method table
//! - [`Dispatcher`] - request body in, response body out
//! - [`HttpServer`] - serves a dispatcher over HTTP/1.1
//! - [`shape`] - runtime signatures for registration checks and dynamic handlers

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod http_server;
pub mod registry;
pub mod shape;
pub mod zero;

pub use config::{ParamsPolicy, ServerConfig};
pub use dispatcher::Dispatcher;
pub use error::RegistrationError;
pub use handler::Handler;
pub use http_server::HttpServer;
pub use registry::{HandlerDescriptor, Registry};
pub use shape::{Shape, Signature};
