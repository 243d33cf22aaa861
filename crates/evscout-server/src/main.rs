mod api;
mod middleware;

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use evscout_tomtom::{PollConfig, TomTomClient};

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = evscout_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let poll = PollConfig {
        max_wait: Duration::from_secs(config.poll_max_wait_secs),
        poll_interval: Duration::from_millis(config.poll_interval_ms),
        transient_backoff: Duration::from_millis(config.poll_backoff_ms),
        status_timeout: Duration::from_secs(config.poll_status_timeout_secs),
    };
    let tomtom = TomTomClient::with_base_url(
        &config.tomtom_api_key,
        config.request_timeout_secs,
        &config.tomtom_base_url,
    )?
    .with_poll_config(poll);
    tracing::info!(
        base_url = %config.tomtom_base_url,
        env = %config.env,
        "TomTom client initialized"
    );

    let app = build_app(AppState {
        tomtom: Arc::new(tomtom),
    });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
