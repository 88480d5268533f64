use std::time::Duration;

use tokio::time::Instant;

/// Tokens are renewed this long before they expire.
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Metadata token together with its local expiry deadline.
#[derive(Debug, Clone)]
pub(crate) struct CachedToken {
    value: String,
    expires_at: Instant,
}

impl CachedToken {
    pub(crate) fn new(value: String, lifetime: Duration) -> Self {
        Self {
            value,
            expires_at: Instant::now() + lifetime,
        }
    }

    pub(crate) fn value(&self) -> &str {
        &self.value
    }

    /// `true` while the token is not within the refresh margin of its expiry.
    pub(crate) fn is_fresh(&self) -> bool {
        Instant::now() + REFRESH_MARGIN < self.expires_at
    }
}

/// Extract the token from a `token` response body.
///
/// The service answers either with a JSON array (`["<token>"]`) or the bare token text.
pub(crate) fn parse_token_body(body: &str) -> Option<String> {
    let body = body.trim();
    let token = match serde_json::from_str::<Vec<String>>(body) {
        Ok(list) => list.into_iter().next()?,
        Err(_) => body.to_string(),
    };
    (!token.is_empty()).then_some(token)
}
