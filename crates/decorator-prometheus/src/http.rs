use std::net::SocketAddr;

use axum::{
    Router,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use prometheus::{Encoder, TextEncoder};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::backend::PrometheusMetrics;

/// Router with a single `GET /metrics` endpoint.
pub fn metrics_router(metrics: PrometheusMetrics) -> Router {
    Router::new()
        .route("/metrics", get(render_metrics))
        .with_state(metrics)
}

/// Serve `/metrics` on `addr` until `cancel` fires.
pub async fn serve_metrics(
    addr: SocketAddr,
    metrics: PrometheusMetrics,
    cancel: CancellationToken,
) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "serving metrics");

    axum::serve(listener, metrics_router(metrics))
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
}

async fn render_metrics(State(metrics): State<PrometheusMetrics>) -> Response {
    match metrics.render() {
        Ok(body) => (
            [(header::CONTENT_TYPE, TextEncoder::new().format_type().to_string())],
            body,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use decorator_core::{ReconcileMetrics, ReconcileResult};

    use super::*;

    #[tokio::test]
    async fn exposes_text_format() {
        let metrics = PrometheusMetrics::new().unwrap();
        metrics.record_reconcile(ReconcileResult::Failed, 5);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let cancel = CancellationToken::new();
        let shutdown = cancel.clone();
        let server = tokio::spawn(async move {
            axum::serve(listener, metrics_router(metrics))
                .with_graceful_shutdown(async move { shutdown.cancelled().await })
                .await
        });

        let resp = reqwest::get(format!("http://{addr}/metrics")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = resp.text().await.unwrap();
        assert!(body.contains(r#"node_decorator_reconcile_total{outcome="failed"} 1"#));

        cancel.cancel();
        server.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn serve_metrics_stops_on_cancel() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
        serve_metrics(addr, PrometheusMetrics::new().unwrap(), cancel)
            .await
            .unwrap();
    }
}
