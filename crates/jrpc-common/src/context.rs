//! Call Context
//!
//! A [`CallContext`] travels with every call: the client races its transport
//! work against it, and the dispatcher hands one to every handler. It
//! combines a [`CancellationToken`] with an optional deadline.
//!
//! Derived contexts (`child`, `with_timeout`, `with_deadline`) are cancelled
//! when their parent is cancelled, never the other way round, and never
//! outlive the parent's deadline.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use jrpc_common::context::{CallContext, ContextError};
//!
//! # async fn demo() {
//! let root = CallContext::background();
//! let ctx = root.with_timeout(Duration::from_millis(50));
//!
//! assert_eq!(ctx.done().await, ContextError::DeadlineExceeded);
//! assert!(root.err().is_none());
//! # }
//! ```

use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Why a context finished.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextError {
    #[error("context canceled")]
    Cancelled,

    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

/// Cancellation signal plus optional deadline.
#[derive(Debug, Clone)]
pub struct CallContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Default for CallContext {
    fn default() -> Self {
        Self::background()
    }
}

impl CallContext {
    /// A context that is never done unless cancelled explicitly.
    pub fn background() -> Self {
        Self::with_cancellation(CancellationToken::new())
    }

    /// Wraps an existing token; cancelling the token finishes the context.
    pub fn with_cancellation(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    /// Derives a context that can be cancelled independently of this one.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    /// Derives a context that finishes after `timeout` at the latest.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => self.child(),
        }
    }

    /// Derives a context that finishes at `deadline` at the latest.
    ///
    /// An earlier deadline inherited from this context still wins.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(inherited) if inherited < deadline => inherited,
            _ => deadline,
        };
        Self {
            token: self.token.child_token(),
            deadline: Some(deadline),
        }
    }

    /// Cancels this context and every context derived from it.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.token
    }

    /// Reports why the context is done, or `None` while it is still live.
    pub fn err(&self) -> Option<ContextError> {
        if self.token.is_cancelled() {
            return Some(ContextError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if deadline <= Instant::now() => Some(ContextError::DeadlineExceeded),
            _ => None,
        }
    }

    /// Completes once the context is cancelled or its deadline passes.
    pub async fn done(&self) -> ContextError {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    biased;
                    _ = self.token.cancelled() => ContextError::Cancelled,
                    _ = tokio::time::sleep_until(deadline) => ContextError::DeadlineExceeded,
                }
            }
            None => {
                self.token.cancelled().await;
                ContextError::Cancelled
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_background_is_live() {
        let ctx = CallContext::background();
        assert!(ctx.err().is_none());
        assert!(ctx.deadline().is_none());
    }

    #[tokio::test]
    async fn test_cancel_propagates_to_children_only() {
        let parent = CallContext::background();
        let child = parent.child();
        let grandchild = child.with_timeout(Duration::from_secs(60));

        child.cancel();
        assert_eq!(child.err(), Some(ContextError::Cancelled));
        assert_eq!(grandchild.err(), Some(ContextError::Cancelled));
        assert!(parent.err().is_none());

        parent.cancel();
        assert_eq!(parent.done().await, ContextError::Cancelled);
    }

    #[tokio::test]
    async fn test_timeout_expires() {
        let ctx = CallContext::background().with_timeout(Duration::from_millis(100));
        assert!(ctx.err().is_none());
        assert_eq!(ctx.done().await, ContextError::DeadlineExceeded);
        assert_eq!(ctx.err(), Some(ContextError::DeadlineExceeded));
    }

    #[tokio::test]
    async fn test_earlier_deadline_wins() {
        let now = Instant::now();
        let short = CallContext::background().with_deadline(now + Duration::from_secs(10));
        let long = short.with_deadline(now + Duration::from_secs(60));
        assert_eq!(long.deadline(), short.deadline());

        let shorter = long.with_deadline(now + Duration::from_secs(1));
        assert_eq!(shorter.deadline(), Some(now + Duration::from_secs(1)));
    }

    #[tokio::test]
    async fn test_cancellation_token_wraps_external_token() {
        let token = CancellationToken::new();
        let ctx = CallContext::with_cancellation(token.clone());
        token.cancel();
        assert_eq!(ctx.err(), Some(ContextError::Cancelled));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(ContextError::Cancelled.to_string(), "context canceled");
        assert_eq!(ContextError::DeadlineExceeded.to_string(), "context deadline exceeded");
    }
}
