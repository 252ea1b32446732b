//! Vox coordinator binary: configuration, tracing, and serving.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use vox_dictation::HttpDictationClient;
use vox_server::{metrics, sweeper, ws, AppState};
use vox_settings::load_settings;

/// Real-time presence/relay coordinator for dictation agents.
#[derive(Debug, Parser)]
#[command(name = "vox", version, about)]
struct Cli {
    /// Path to a JSON settings file.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Override the listener port.
    #[arg(long)]
    port: Option<u16>,

    /// Override the listener bind address.
    #[arg(long)]
    bind_addr: Option<String>,

    /// Override the upstream processing service base URL.
    #[arg(long)]
    upstream_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut settings = load_settings(cli.settings.as_deref()).context("loading settings")?;
    if let Some(port) = cli.port {
        settings.server.port = port;
    }
    if let Some(bind_addr) = cli.bind_addr {
        settings.server.bind_addr = bind_addr;
    }
    if let Some(upstream_url) = cli.upstream_url {
        settings.upstream.base_url = upstream_url;
    }

    let metrics_handle = metrics::install_recorder();

    let processor = HttpDictationClient::new(
        settings.upstream.base_url.clone(),
        Duration::from_millis(settings.upstream.request_timeout_ms),
    )
    .context("building upstream client")?;

    let shutdown = CancellationToken::new();
    let state = Arc::new(
        AppState::new(
            Arc::new(processor),
            settings.liveness.clone(),
            shutdown.clone(),
        )
        .with_metrics_handle(metrics_handle),
    );

    let (soft, hard) = sweeper::spawn(Arc::clone(&state));

    let addr = format!("{}:{}", settings.server.bind_addr, settings.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(
        %addr,
        heartbeat_interval_ms = settings.liveness.heartbeat_interval_ms,
        stale_threshold_ms = settings.liveness.stale_threshold_ms,
        upstream = %settings.upstream.base_url,
        "coordinator listening"
    );

    let signal_shutdown = shutdown.clone();
    let _ = tokio::spawn(async move {
        shutdown_signal().await;
        info!("shutdown signal received");
        signal_shutdown.cancel();
    });

    ws::serve(listener, state).await.context("serving")?;

    soft.await.context("joining soft-inactivity task")?;
    hard.await.context("joining hard-staleness task")?;
    info!("coordinator stopped");
    Ok(())
}

/// Resolve on SIGINT or, on unix, SIGTERM.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm =
            signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
