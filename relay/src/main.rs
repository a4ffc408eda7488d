use std::sync::Arc;

use anyhow::Context;
use support_relay::Relay;
use support_relay::http;
use tokio::net::TcpListener;
use tracing::info;
use tracing::warn;
use tracing_subscriber::EnvFilter;

const BIND_VAR: &str = "SUPPORT_RELAY_BIND";
const DEFAULT_BIND: &str = "127.0.0.1:8888";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let bind = std::env::var(BIND_VAR)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_BIND.to_string());
    let listener = TcpListener::bind(&bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;

    let relay = Arc::new(Relay::from_env());
    http::serve(listener, relay, shutdown_signal())
        .await
        .context("relay server failed")?;
    info!("support relay stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for Ctrl+C; running until killed");
        std::future::pending::<()>().await;
    }
}
