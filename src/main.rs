//! `html2image-api` server binary.
//!
//! Loads configuration from `app.env` / the environment, then serves
//! `POST /v1/html-to-image` until Ctrl+C or SIGTERM.

use std::net::SocketAddr;
use std::time::Duration;

use html2image_api::integrations::axum::{AppState, router};
use html2image_api::SlidingWindowLimiter;
use tokio::signal;

const PURGE_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Periodically drop rate-limit buckets with no requests left in the window.
fn spawn_limiter_purge(limiter: SlidingWindowLimiter) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(PURGE_INTERVAL);
        loop {
            interval.tick().await;
            let removed = limiter.purge_expired();
            if removed > 0 {
                log::debug!("Purged {} idle rate-limit buckets", removed);
            }
        }
    });
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            log::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                log::error!("Failed to install SIGTERM handler: {}", e);
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

    log::info!("Shutdown signal received, draining in-flight requests...");
}

#[tokio::main]
async fn main() -> html2image_api::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = html2image_api::from_env()?;
    let listen_addr = config.listen_addr.clone();

    let state = AppState::new(config);
    spawn_limiter_purge(state.limiter.clone());

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    log::info!("🚀 Listening on http://{}", listen_addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    log::info!("Server stopped");
    Ok(())
}
