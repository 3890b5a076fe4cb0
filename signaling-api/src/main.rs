//! Data-plane signaling server.

use anyhow::Context;
use connector_common::init_tracing;
use signaling_api::shutdown::{run_with_graceful_shutdown, wait_for_signal};
use signaling_api::{BASE_PATH, SignalingApiSettings, default_state, router};
use std::future::IntoFuture;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let settings = SignalingApiSettings::from_env().context("invalid configuration")?;
    init_tracing(&settings.tracing).context("failed to initialize tracing")?;

    let addr = settings.bind_address()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, base_path = BASE_PATH, "Data plane signaling API listening");

    let (drain, mut draining) = watch::channel(false);
    let server = axum::serve(listener, router(default_state(&settings)))
        .with_graceful_shutdown(async move {
            let _ = draining.wait_for(|d| *d).await;
        })
        .into_future();

    run_with_graceful_shutdown(server, wait_for_signal(), drain, settings.shutdown_timeout)
        .await
        .context("server error")?;

    info!("Data plane signaling API stopped");
    Ok(())
}
