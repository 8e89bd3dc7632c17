use std::time::Duration;

/// Settings for [`HttpTransport`](crate::HttpTransport).
///
/// # Default Configuration
///
/// - `request_timeout`: none; calls are bounded only by the caller's context
/// - `user_agent`: none; no `User-Agent` header is sent
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use jrpc_client::ClientConfig;
///
/// let config = ClientConfig::new()
///     .with_request_timeout(Duration::from_secs(5))
///     .with_user_agent("inventory-sync/1.2");
/// assert_eq!(config.request_timeout, Some(Duration::from_secs(5)));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientConfig {
    /// Upper bound for one HTTP exchange, including reading the body
    pub request_timeout: Option<Duration>,
    /// Value of the `User-Agent` header
    pub user_agent: Option<String>,
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}
