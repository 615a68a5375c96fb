use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{AppState, router, spawn_sweeper};
use dropshare_core::config::{
    artifact_ttl_from_env_value, max_upload_bytes_from_env_value, store_kind_from_env_value,
    sweep_interval_from_env_value, upload_dir_from_env_value,
};
use dropshare_core::{CoreConfig, ShareService};

/// Log targets enabled at startup on top of `RUST_LOG`. `tower_http` carries per-request
/// spans and response logs from the router's `TraceLayer`.
const DEFAULT_LOG_DIRECTIVES: [&str; 3] = ["dropshare=info", "api_rest=info", "tower_http=info"];

fn env_filter() -> anyhow::Result<tracing_subscriber::EnvFilter> {
    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    for directive in DEFAULT_LOG_DIRECTIVES {
        filter = filter.add_directive(directive.parse()?);
    }
    Ok(filter)
}

/// Main entry point for the Dropshare server
///
/// Opens the artifact store, repairs anything a previous crash left half-done, starts the
/// optional expiry sweep and serves the REST API until Ctrl-C or SIGTERM.
///
/// # Environment Variables
/// - `DROPSHARE_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `UPLOAD_DIR`: Directory for stored files (default: "uploads")
/// - `DROPSHARE_STORE`: `disk` or `memory` (default: "disk")
/// - `DROPSHARE_MAX_UPLOAD_BYTES`: Largest accepted file (default: 100 MiB)
/// - `DROPSHARE_ARTIFACT_TTL_SECS`: Expire files after this many seconds (default: never)
/// - `DROPSHARE_SWEEP_INTERVAL_SECS`: Seconds between expiry sweeps (default: 300)
///
/// # Returns
/// * `Ok(())` - If the server starts and shuts down cleanly
/// * `Err(anyhow::Error)` - If configuration, storage or the listener fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(env_filter()?)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr: SocketAddr = std::env::var("DROPSHARE_REST_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".into())
        .parse()?;

    let cfg = Arc::new(CoreConfig::new(
        upload_dir_from_env_value(std::env::var("UPLOAD_DIR").ok()),
        store_kind_from_env_value(std::env::var("DROPSHARE_STORE").ok())?,
        max_upload_bytes_from_env_value(std::env::var("DROPSHARE_MAX_UPLOAD_BYTES").ok())?,
        artifact_ttl_from_env_value(std::env::var("DROPSHARE_ARTIFACT_TTL_SECS").ok())?,
        sweep_interval_from_env_value(std::env::var("DROPSHARE_SWEEP_INTERVAL_SECS").ok())?,
    )?);

    let share = ShareService::open(cfg)?;
    let recovered = share.recover()?;
    if recovered > 0 {
        tracing::warn!("recovered {} interrupted store operation(s)", recovered);
    }

    let sweeper = spawn_sweeper(share.clone());

    tracing::info!("++ Starting Dropshare REST on {}", rest_addr);

    let listener = tokio::net::TcpListener::bind(rest_addr).await?;
    axum::serve(listener, router(AppState::new(share)))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(sweeper) = sweeper {
        sweeper.abort();
    }
    tracing::info!("Dropshare stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
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

    tracing::info!("Received termination signal, shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_enable_request_logs() {
        assert!(DEFAULT_LOG_DIRECTIVES.contains(&"tower_http=info"));
        for directive in DEFAULT_LOG_DIRECTIVES {
            directive
                .parse::<tracing_subscriber::filter::Directive>()
                .unwrap();
        }
    }

    #[test]
    fn test_env_filter_builds() {
        let filter = env_filter().unwrap();
        assert!(filter.to_string().contains("tower_http=info"));
    }
}
