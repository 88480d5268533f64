use std::time::Duration;

/// Base URL of the metadata service API.
pub const DEFAULT_METADATA_URL: &str = "http://169.254.169.254/v1";

/// Lifetime requested for each metadata token.
pub const DEFAULT_TOKEN_EXPIRY: Duration = Duration::from_secs(3600);

/// Metadata client settings.
#[derive(Debug, Clone)]
pub struct MetadataClientConfig {
    /// API base URL, without a trailing slash.
    pub base_url: String,
    /// Lifetime requested for tokens.
    pub token_expiry: Duration,
    /// Per-request timeout applied by the HTTP client.
    pub request_timeout: Duration,
    /// `User-Agent` sent with every request.
    pub user_agent: String,
}

impl Default for MetadataClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_METADATA_URL.to_string(),
            token_expiry: DEFAULT_TOKEN_EXPIRY,
            request_timeout: Duration::from_secs(30),
            user_agent: concat!("node-decorator/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl MetadataClientConfig {
    /// Set the base URL; a trailing `/` is dropped.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}
