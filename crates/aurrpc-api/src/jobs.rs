//! Periodic background jobs: catalog refresh, rate-limit eviction, cache
//! eviction. Each loop watches the shared shutdown signal and exits
//! promptly; the binary joins them before closing.

use std::time::{Duration, Instant};

use log::{debug, error, info};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;

use crate::router::SharedState;

/// Spawn the three periodic workers. Flipping the `shutdown` channel
/// stops them all.
pub fn start_jobs(state: SharedState, shutdown: &watch::Receiver<bool>) -> Vec<JoinHandle<()>> {
    vec![
        tokio::spawn(refresh_loop(state.clone(), shutdown.clone())),
        tokio::spawn(limiter_gc_loop(state.clone(), shutdown.clone())),
        tokio::spawn(cache_gc_loop(state, shutdown.clone())),
    ]
}

/// Reload the catalog every `RefreshInterval` seconds. "Not modified" is
/// success without an update; real failures keep the old catalog serving.
async fn refresh_loop(state: SharedState, mut shutdown: watch::Receiver<bool>) {
    let period = Duration::from_secs(state.settings.refresh_interval);
    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                debug!("stopping worker: data refresh");
                return;
            }
            () = sleep(period) => {
                info!("reloading package data...");
                let start = Instant::now();
                match state.reload().await {
                    Ok(count) => info!(
                        "successfully reloaded {count} packages in {} ms",
                        start.elapsed().as_millis()
                    ),
                    Err(e) if e.is_not_modified() => {
                        info!("reload skipped, source has not been modified");
                    }
                    Err(e) => error!("error reloading package data: {e}"),
                }
            }
        }
    }
}

/// Evict expired rate-limit windows every `RateLimitCleanupInterval`
/// seconds.
async fn limiter_gc_loop(state: SharedState, mut shutdown: watch::Receiver<bool>) {
    let period = Duration::from_secs(state.settings.rate_limit_cleanup_interval);
    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                debug!("stopping worker: rate-limit cleanup");
                return;
            }
            () = sleep(period) => state.limiter.cleanup(),
        }
    }
}

/// Evict expired search-cache entries every `CacheCleanupInterval`
/// seconds.
async fn cache_gc_loop(state: SharedState, mut shutdown: watch::Receiver<bool>) {
    let period = Duration::from_secs(state.settings.cache_cleanup_interval);
    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                debug!("stopping worker: search-cache cleanup");
                return;
            }
            () = sleep(period) => state.cache.cleanup(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::state::AppState;
    use std::sync::Arc;

    #[tokio::test]
    async fn workers_exit_on_shutdown() {
        let state = Arc::new(AppState::new(Settings::default()));
        let (tx, rx) = watch::channel(false);
        let workers = start_jobs(state, &rx);
        tx.send(true).unwrap();
        for worker in workers {
            tokio::time::timeout(Duration::from_secs(5), worker)
                .await
                .expect("worker did not observe shutdown")
                .unwrap();
        }
    }
}
