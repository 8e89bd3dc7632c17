//! Server configuration.

use std::fmt;
use std::str::FromStr;

/// Default request body limit: 10 MiB.
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// How supplied params that decode to a zero value are treated.
///
/// `RejectZero` answers `Invalid params` when the decoded params are the zero
/// value of the handler's param type (see [`zero::is_zero`](crate::zero::is_zero)),
/// since such input cannot be told apart from none at all. Maps and sequences
/// are never zero. `DecodeOnly` rejects only payloads that fail to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParamsPolicy {
    #[default]
    RejectZero,
    DecodeOnly,
}

impl FromStr for ParamsPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reject-zero" => Ok(ParamsPolicy::RejectZero),
            "decode-only" => Ok(ParamsPolicy::DecodeOnly),
            other => Err(format!(
                "unknown params policy '{}': expected 'reject-zero' or 'decode-only'",
                other
            )),
        }
    }
}

impl fmt::Display for ParamsPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamsPolicy::RejectZero => f.write_str("reject-zero"),
            ParamsPolicy::DecodeOnly => f.write_str("decode-only"),
        }
    }
}

/// Settings shared by the dispatcher and the HTTP binding.
///
/// # Example
///
/// ```
/// use jrpc_server::{ParamsPolicy, ServerConfig};
///
/// let config = ServerConfig::new()
///     .with_path("/rpc")
///     .with_params_policy(ParamsPolicy::DecodeOnly);
/// assert_eq!(config.path.as_deref(), Some("/rpc"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// HTTP path the endpoint is mounted at; `None` accepts every path.
    pub path: Option<String>,
    /// Largest request body accepted, in bytes.
    pub max_body_bytes: usize,
    pub params_policy: ParamsPolicy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            path: None,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            params_policy: ParamsPolicy::default(),
        }
    }
}

impl ServerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    pub fn with_params_policy(mut self, params_policy: ParamsPolicy) -> Self {
        self.params_policy = params_policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.path, None);
        assert_eq!(config.max_body_bytes, 10 * 1024 * 1024);
        assert_eq!(config.params_policy, ParamsPolicy::RejectZero);
    }

    #[test]
    fn test_params_policy_parsing() {
        assert_eq!("reject-zero".parse::<ParamsPolicy>(), Ok(ParamsPolicy::RejectZero));
        assert_eq!("decode-only".parse::<ParamsPolicy>(), Ok(ParamsPolicy::DecodeOnly));
        assert!("lenient".parse::<ParamsPolicy>().is_err());
        assert_eq!(ParamsPolicy::DecodeOnly.to_string(), "decode-only");
    }
}
