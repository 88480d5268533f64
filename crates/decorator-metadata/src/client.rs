use async_trait::async_trait;
use reqwest::{Response, StatusCode, header};
use tokio::sync::Mutex;
use tracing::{debug, trace, warn};

use decorator_core::{MetadataError, MetadataSource};
use decorator_model::InstanceData;

use crate::{
    config::MetadataClientConfig,
    token::{CachedToken, parse_token_body},
};

const TOKEN_HEADER: &str = "Metadata-Token";
const TOKEN_EXPIRY_HEADER: &str = "Metadata-Token-Expiry-Seconds";

/// HTTP client for the instance metadata service.
///
/// A token is fetched lazily and cached until shortly before it expires.
/// A `401` on a data request drops the cached token and retries once.
pub struct MetadataClient {
    http: reqwest::Client,
    cfg: MetadataClientConfig,
    token: Mutex<Option<CachedToken>>,
}

impl MetadataClient {
    pub fn new(cfg: MetadataClientConfig) -> Result<Self, MetadataError> {
        let http = reqwest::Client::builder()
            .timeout(cfg.request_timeout)
            .user_agent(cfg.user_agent.clone())
            .build()
            .map_err(|e| MetadataError::Http(e.to_string()))?;
        Ok(Self::with_http(http, cfg))
    }

    pub fn with_http(http: reqwest::Client, cfg: MetadataClientConfig) -> Self {
        Self {
            http,
            cfg,
            token: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &MetadataClientConfig {
        &self.cfg
    }

    /// Fetch `/instance`.
    pub async fn instance(&self) -> Result<InstanceData, MetadataError> {
        let resp = self.get_authorized("instance").await?;
        let body = resp.text().await.map_err(|e| self.map_http(e))?;
        serde_json::from_str(&body).map_err(|e| MetadataError::Decode(e.to_string()))
    }

    async fn get_authorized(&self, path: &str) -> Result<Response, MetadataError> {
        let token = self.token().await?;
        let resp = self.send_get(path, &token).await?;
        if resp.status() != StatusCode::UNAUTHORIZED {
            return check_status(resp).await;
        }

        warn!(path, "metadata token rejected; refreshing");
        self.invalidate_token().await;
        let token = self.token().await?;
        let resp = self.send_get(path, &token).await?;
        check_status(resp).await
    }

    async fn send_get(&self, path: &str, token: &str) -> Result<Response, MetadataError> {
        let url = self.cfg.endpoint(path);
        trace!(%url, "metadata request");
        self.http
            .get(url)
            .header(TOKEN_HEADER, token)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| self.map_http(e))
    }

    /// Return the cached token or obtain a fresh one.
    async fn token(&self) -> Result<String, MetadataError> {
        let mut slot = self.token.lock().await;
        if let Some(token) = slot.as_ref().filter(|t| t.is_fresh()) {
            return Ok(token.value().to_string());
        }

        let value = self.request_token().await?;
        *slot = Some(CachedToken::new(value.clone(), self.cfg.token_expiry));
        Ok(value)
    }

    async fn invalidate_token(&self) {
        self.token.lock().await.take();
    }

    async fn request_token(&self) -> Result<String, MetadataError> {
        let url = self.cfg.endpoint("token");
        debug!(%url, "requesting metadata token");

        let resp = self
            .http
            .put(url)
            .header(TOKEN_EXPIRY_HEADER, self.cfg.token_expiry.as_secs())
            .send()
            .await
            .map_err(|e| self.map_http(e))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| self.map_http(e))?;
        if !status.is_success() {
            return Err(MetadataError::Token(format!("{status}: {}", body.trim())));
        }
        parse_token_body(&body).ok_or_else(|| MetadataError::Token("empty token response".into()))
    }

    fn map_http(&self, err: reqwest::Error) -> MetadataError {
        if err.is_timeout() {
            MetadataError::Timeout(self.cfg.request_timeout)
        } else {
            MetadataError::Http(err.to_string())
        }
    }
}

async fn check_status(resp: Response) -> Result<Response, MetadataError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(MetadataError::Status {
        status: status.as_u16(),
        body: body.trim().to_string(),
    })
}

#[async_trait]
impl MetadataSource for MetadataClient {
    async fn get_instance(&self) -> Result<InstanceData, MetadataError> {
        self.instance().await
    }
}

#[cfg(test)]
mod tests {
    use std::{
        net::SocketAddr,
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
        time::Duration,
    };

    use axum::{
        Router,
        extract::State,
        http::{HeaderMap, StatusCode},
        routing::{get, put},
    };
    use tokio::net::TcpListener;

    use super::*;

    const INSTANCE_JSON: &str = r#"{
        "id": 1234,
        "label": "my-host",
        "region": "us-east",
        "type": "g6-standard-2",
        "host_uuid": "abc-123",
        "tags": ["env=prod", "team"],
        "specs": {"vcpus": 2}
    }"#;

    #[derive(Default)]
    struct Service {
        tokens_issued: AtomicUsize,
        reject_next: AtomicUsize,
        instance_calls: AtomicUsize,
    }

    async fn issue_token(State(svc): State<Arc<Service>>, headers: HeaderMap) -> (StatusCode, String) {
        if headers.get(TOKEN_EXPIRY_HEADER).is_none() {
            return (StatusCode::BAD_REQUEST, "missing expiry".into());
        }
        let n = svc.tokens_issued.fetch_add(1, Ordering::SeqCst) + 1;
        (StatusCode::OK, format!(r#"["token-{n}"]"#))
    }

    async fn instance(State(svc): State<Arc<Service>>, headers: HeaderMap) -> (StatusCode, String) {
        svc.instance_calls.fetch_add(1, Ordering::SeqCst);
        let token = headers.get(TOKEN_HEADER).and_then(|v| v.to_str().ok());
        if token.is_none_or(|t| !t.starts_with("token-")) {
            return (StatusCode::UNAUTHORIZED, "no token".into());
        }
        if svc
            .reject_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return (StatusCode::UNAUTHORIZED, "expired".into());
        }
        (StatusCode::OK, INSTANCE_JSON.into())
    }

    async fn serve(svc: Arc<Service>, instance_body: Option<&'static str>) -> SocketAddr {
        let router = match instance_body {
            Some(body) => Router::new()
                .route("/v1/token", put(issue_token))
                .route("/v1/instance", get(move || async move { body }))
                .with_state(svc),
            None => Router::new()
                .route("/v1/token", put(issue_token))
                .route("/v1/instance", get(instance))
                .with_state(svc),
        };
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        addr
    }

    fn client(addr: SocketAddr) -> MetadataClient {
        let cfg = MetadataClientConfig::default()
            .with_base_url(format!("http://{addr}/v1"))
            .with_request_timeout(Duration::from_secs(5));
        MetadataClient::new(cfg).unwrap()
    }

    #[tokio::test]
    async fn fetches_and_decodes_instance() {
        let svc = Arc::new(Service::default());
        let client = client(serve(svc.clone(), None).await);

        let data = client.get_instance().await.unwrap();
        assert_eq!(data.id, 1234);
        assert_eq!(data.label, "my-host");
        assert_eq!(data.instance_type, "g6-standard-2");
        assert_eq!(data.tags, vec!["env=prod".to_string(), "team".to_string()]);
    }

    #[tokio::test]
    async fn reuses_cached_token() {
        let svc = Arc::new(Service::default());
        let client = client(serve(svc.clone(), None).await);

        client.get_instance().await.unwrap();
        client.get_instance().await.unwrap();
        client.get_instance().await.unwrap();

        assert_eq!(svc.tokens_issued.load(Ordering::SeqCst), 1);
        assert_eq!(svc.instance_calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn rejected_token_is_refreshed_once() {
        let svc = Arc::new(Service::default());
        let client = client(serve(svc.clone(), None).await);
        client.get_instance().await.unwrap();

        svc.reject_next.store(1, Ordering::SeqCst);
        let data = client.get_instance().await.unwrap();

        assert_eq!(data.id, 1234);
        assert_eq!(svc.tokens_issued.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn persistent_rejection_surfaces_status() {
        let svc = Arc::new(Service::default());
        let client = client(serve(svc.clone(), None).await);

        svc.reject_next.store(2, Ordering::SeqCst);
        let err = client.get_instance().await.unwrap_err();

        assert!(matches!(err, MetadataError::Status { status: 401, .. }));
        assert_eq!(svc.tokens_issued.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn malformed_body_is_decode_error() {
        let svc = Arc::new(Service::default());
        let client = client(serve(svc, Some("not json")).await);

        let err = client.get_instance().await.unwrap_err();
        assert!(matches!(err, MetadataError::Decode(_)));
    }

    #[tokio::test]
    async fn unreachable_service_is_http_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client(addr).get_instance().await.unwrap_err();
        assert!(matches!(err, MetadataError::Http(_)));
    }
}
