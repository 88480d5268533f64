use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use decorator_core::{
    MetadataSource, MetricsHandle, Reconciler, ReconcilerConfig, WatchConfig, WatchLoop,
    noop_metrics,
};
use decorator_kube::KubeNodeClient;
use decorator_metadata::{MetadataClient, MetadataClientConfig};
use decorator_observe::{LoggerConfig, LoggerTimeZone, init_local_offset, init_logger};
use decorator_prometheus::{PrometheusMetrics, serve_metrics};

mod cli;
use cli::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Offset detection only works while the process is single-threaded.
    if cli.log_timezone == LoggerTimeZone::Local {
        init_local_offset();
    }

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?
        .block_on(run(cli))
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // 1) logger
    let log_cfg = LoggerConfig {
        tz: cli.log_timezone,
        ..LoggerConfig::new(cli.log_format, cli.log_level.clone())
    };
    init_logger(&log_cfg)?;

    let tags_prefix = cli.tags_label_prefix();
    info!(
        node = %cli.node_name,
        prefix = %cli.prefix,
        tags_prefix = %tags_prefix,
        poll_interval = ?cli.poll_interval,
        timeout = ?cli.timeout,
        "starting node decorator"
    );

    let cancel = CancellationToken::new();
    tokio::spawn(shutdown_on_signal(cancel.clone()));

    // 2) metrics
    let (metrics, metrics_server) = match cli.metrics_addr {
        Some(addr) => {
            let prom = PrometheusMetrics::new().context("failed to register metrics")?;
            let server = tokio::spawn(serve_metrics(addr, prom.clone(), cancel.child_token()));
            (Arc::new(prom) as MetricsHandle, Some(server))
        }
        None => (noop_metrics(), None),
    };

    // 3) clients
    let nodes = KubeNodeClient::try_default().await?;
    let source: Arc<dyn MetadataSource> = Arc::new(MetadataClient::new(
        MetadataClientConfig::default()
            .with_base_url(cli.metadata_url.clone())
            .with_request_timeout(cli.timeout),
    )?);

    // 4) reconcile loop
    let rec_cfg = ReconcilerConfig::new(
        cli.node_name.clone(),
        cli.prefix.clone(),
        tags_prefix,
        cli.timeout,
    )?;
    let reconciler = Reconciler::new(nodes, rec_cfg).with_metrics(metrics);
    let mut watch = WatchLoop::new(
        reconciler,
        source,
        WatchConfig::new(cli.poll_interval, cli.timeout)?,
    );

    let res = watch.run(cancel.clone()).await;
    cancel.cancel();

    if let Some(server) = metrics_server {
        match server.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "metrics server failed"),
            Err(e) => warn!(error = %e, "metrics server task panicked"),
        }
    }

    if let Err(e) = &res {
        error!(error = %e, kind = e.kind(), "node decorator stopped with error");
    } else {
        info!("node decorator stopped");
    }
    res.map_err(Into::into)
}

/// Cancel `token` on SIGINT or SIGTERM.
async fn shutdown_on_signal(token: CancellationToken) {
    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("received SIGINT"),
        _ = terminate => info!("received SIGTERM"),
        _ = token.cancelled() => return,
    }
    token.cancel();
}
