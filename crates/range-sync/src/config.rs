//! Client configuration

use range_topology::wire::RANGE_NAME;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default backend address
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// API prefix of every backend route
pub const API_PREFIX: &str = "/api/v1";

/// Backend client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Scheme, host and port of the backend
    pub base_url: String,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
    /// Name the range is deployed under
    pub range_name: String,
}

impl ClientConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With backend address
    #[inline]
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// With request timeout
    #[inline]
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    /// With range name
    #[inline]
    #[must_use]
    pub fn with_range_name(mut self, name: impl Into<String>) -> Self {
        self.range_name = name.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Absolute URL of an API route, e.g. `endpoint("/ranges")`
    #[must_use]
    pub fn endpoint(&self, route: &str) -> String {
        format!("{}{API_PREFIX}{route}", self.base_url.trim_end_matches('/'))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: 30,
            range_name: RANGE_NAME.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_targets_local_backend() {
        let config = ClientConfig::new();
        assert_eq!(config.endpoint("/ranges"), "http://localhost:8000/api/v1/ranges");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.range_name, "Cyber-Lab");
    }

    #[test]
    fn trailing_slash_is_dropped() {
        let config = ClientConfig::new().with_base_url("http://10.0.0.5:9000/");
        assert_eq!(config.endpoint("/range"), "http://10.0.0.5:9000/api/v1/range");
    }

    #[test]
    fn config_deserializes() {
        let config: ClientConfig = serde_json::from_str(
            r#"{"base_url":"http://pve:8000","request_timeout_secs":5,"range_name":"Lab"}"#,
        )
        .unwrap();
        assert_eq!(config, ClientConfig::new().with_base_url("http://pve:8000").with_timeout_secs(5).with_range_name("Lab"));
    }
}
