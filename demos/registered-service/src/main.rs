use anyhow::Context;
use axum::{Router, http::StatusCode, routing::get};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use beacon_discover::{DeregisterOutcome, ServiceInstanceConfig, register};
use beacon_model::HEALTH_PATH;
use beacon_observe::{LoggerConfig, init_logger};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1) Logger
    let log_cfg = LoggerConfig::from_env()?;
    init_logger(&log_cfg)?;
    info!("logger initialized");

    // 2) Instance configuration
    let config = ServiceInstanceConfig::from_env().context("loading instance configuration")?;
    info!(
        "instance configured: service={}, instance={}:{}, discovery={}",
        config.service_name,
        config.instance_address,
        config.instance_port,
        config.discovery_endpoint()
    );

    // 3) Listener first, so the first health probe has something to hit
    let listener = TcpListener::bind(("0.0.0.0", config.instance_port))
        .await
        .with_context(|| format!("binding port {}", config.instance_port))?;

    // 4) Registration; serving without it would leave the instance undiscoverable
    let shutdown = CancellationToken::new();
    let registration = register(config, shutdown.clone())
        .await
        .context("registering with discovery backend")?;
    info!("registered as {}", registration.instance_id());

    // 5) Shutdown signal
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        info!("shutting down...");
        trigger.cancel();
    });

    // 6) Serve until shutdown
    let app = Router::new().route(HEALTH_PATH, get(health));
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;

    match registration.closed().await {
        DeregisterOutcome::Removed => info!("deregistered"),
        other => warn!(outcome = ?other, "deregistration incomplete, relying on health-check expiry"),
    }
    Ok(())
}

async fn health() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for ctrl-c: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
