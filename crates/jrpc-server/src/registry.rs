//! Handler Registry
//!
//! Maps method names to validated [`HandlerDescriptor`]s.
//!
//! # Concurrency Model
//!
//! - **Method table** (`handlers`): a `std::sync::RwLock<HashMap<..>>`. Lookups
//!   take the read lock, so concurrent lookups never wait on each other;
//!   registration takes the write lock only for the final insert.
//! - **Descriptors** are built and validated before the lock is taken and are
//!   shared as `Arc`s, so a lookup never observes a half-built descriptor and
//!   never holds the lock while a handler runs.
//!
//! Registering a name twice replaces the earlier handler.
//!
//! # Example
//!
//! ```
//! use jrpc_server::Registry;
//! use jrpc_common::CallContext;
//!
//! async fn greet(_ctx: CallContext, name: String) -> anyhow::Result<String> {
//!     Ok(format!("hello, {}", name))
//! }
//!
//! let registry = Registry::new();
//! registry.register("greet", greet).unwrap();
//! assert!(registry.contains("greet"));
//! assert!(registry.register("rpc.discover", greet).is_err());
//! ```

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};

use jrpc_common::{CallContext, Payload};
use serde_json::Value;

use crate::config::ParamsPolicy;
use crate::error::RegistrationError;
use crate::handler::{self, Handler, HandlerFuture, Invoker, ParamsError};
use crate::shape::Signature;

/// Method names starting with this prefix belong to the protocol.
pub const RESERVED_PREFIX: &str = "rpc.";

/// The validated, immutable record of one registered method.
pub struct HandlerDescriptor {
    method: String,
    signature: Signature,
    invoker: Invoker,
}

impl HandlerDescriptor {
    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Whether the handler expects a parameter value.
    pub fn takes_params(&self) -> bool {
        self.signature.takes_params()
    }

    /// Decodes `params` for the handler, checks them against `policy` and
    /// starts the call.
    pub fn invoke(
        &self,
        ctx: CallContext,
        params: Option<&Payload>,
        policy: ParamsPolicy,
    ) -> Result<HandlerFuture, ParamsError> {
        (self.invoker)(ctx, params, policy)
    }
}

impl fmt::Debug for HandlerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerDescriptor")
            .field("method", &self.method)
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

/// Method table owned by a server.
///
/// Each [`Dispatcher`](crate::Dispatcher) gets its registry explicitly, so
/// independent servers can live in one process.
#[derive(Default)]
pub struct Registry {
    handlers: RwLock<HashMap<String, Arc<HandlerDescriptor>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a typed handler under `method`
    ///
    /// # Arguments
    ///
    /// * `method` - The method name clients call
    /// * `handler` - An `async fn(CallContext)` or `async fn(CallContext, P)`
    ///   returning `Result<R, E>`
    ///
    /// # Returns
    ///
    /// `Ok(())`, or the [`RegistrationError`] for the first rule broken
    pub fn register<H, Args>(&self, method: impl Into<String>, handler: H) -> Result<(), RegistrationError>
    where
        H: Handler<Args>,
    {
        let method = method.into();
        validate_method_name(&method)?;
        let signature = H::signature();
        signature.validate()?;
        self.insert(method, signature, handler.into_invoker());
        Ok(())
    }

    /// Registers a handler described by an explicit signature
    ///
    /// The closure receives the params as a JSON value (checked against the
    /// signature's param shape) and its result is checked against the
    /// result shape.
    ///
    /// # Arguments
    ///
    /// * `method` - The method name clients call
    /// * `signature` - The handler's calling shape
    /// * `handler` - The closure to run
    ///
    /// # Returns
    ///
    /// `Ok(())`, or the [`RegistrationError`] for the first rule broken
    pub fn register_dynamic<F, Fut>(
        &self,
        method: impl Into<String>,
        signature: Signature,
        handler: F,
    ) -> Result<(), RegistrationError>
    where
        F: Fn(CallContext, Option<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        let method = method.into();
        validate_method_name(&method)?;
        signature.validate()?;
        let invoker = handler::dynamic(&signature, handler);
        self.insert(method, signature, invoker);
        Ok(())
    }

    fn insert(&self, method: String, signature: Signature, invoker: Invoker) {
        tracing::debug!("registered {}: handler = {}", method, signature);

        let descriptor = Arc::new(HandlerDescriptor {
            method: method.clone(),
            signature,
            invoker,
        });
        let previous = self
            .handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(method, descriptor);
        if let Some(previous) = previous {
            tracing::debug!("replaced earlier handler for {}", previous.method());
        }
    }

    pub fn lookup(&self, method: &str) -> Option<Arc<HandlerDescriptor>> {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(method)
            .cloned()
    }

    pub fn contains(&self, method: &str) -> bool {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(method)
    }

    /// Registered method names, sorted.
    pub fn methods(&self) -> Vec<String> {
        let mut methods: Vec<String> = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        methods.sort();
        methods
    }

    pub fn len(&self) -> usize {
        self.handlers.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry").field("methods", &self.methods()).finish()
    }
}

fn validate_method_name(method: &str) -> Result<(), RegistrationError> {
    if method.is_empty() {
        return Err(RegistrationError::EmptyMethodName);
    }
    if method.starts_with(RESERVED_PREFIX) {
        return Err(RegistrationError::ReservedMethodName(method.to_owned()));
    }
    Ok(())
}
