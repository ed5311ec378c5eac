//! TaskManager web server
//!
//! Run with: cargo run -p taskmanager-web

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use taskmanager_config::Config;
use taskmanager_monitoring::{spawn_upkeep, UPKEEP_INTERVAL};
use taskmanager_web::{router::build_router, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("invalid configuration")?;

    // RUST_LOG wins over the configured level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level())),
        )
        .init();

    info!(
        version = config.version(),
        environment = %config.environment,
        debug = config.debug(),
        instance = %config.instance.id,
        "📋 TaskManager starting up..."
    );

    let state = AppState::from_config(&config).await?;
    info!(
        storage = state.tasks.store().backend(),
        cache = state.tasks.cache().map(|c| c.backend()).unwrap_or("none"),
        "✅ Backends ready"
    );

    spawn_upkeep(state.metrics.clone(), UPKEEP_INTERVAL);

    let app = build_router(state);
    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("could not bind {addr}"))?;
    info!("🚀 Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "could not listen for Ctrl-C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "could not listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
