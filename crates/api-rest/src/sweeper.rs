//! Background removal of expired artifacts.

use dropshare_core::ShareService;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Spawns the periodic expiry sweep, or returns `None` when no artifact TTL is configured.
///
/// The first sweep runs immediately so artifacts that expired while the server was down are
/// removed at startup. Sweep failures are logged and retried on the next tick.
pub fn spawn_sweeper(share: ShareService) -> Option<JoinHandle<()>> {
    let ttl = share.config().artifact_ttl()?;
    let period = share.config().sweep_interval();

    tracing::info!(
        ttl_secs = ttl.as_secs(),
        interval_secs = period.as_secs(),
        "expiry sweep enabled"
    );

    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let share = share.clone();
            match tokio::task::spawn_blocking(move || share.sweep_expired()).await {
                Ok(Ok(_)) => {}
                Ok(Err(e)) => tracing::warn!("expiry sweep failed: {}", e),
                Err(e) => tracing::error!("expiry sweep task panicked: {}", e),
            }
        }
    }))
}
