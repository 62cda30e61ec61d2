//! Fixed-window request counting per client IP.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};

use log::{debug, trace};

/// One client's request count within its current window.
#[derive(Debug, Clone)]
struct RateEntry {
    requests: u32,
    window_start: Instant,
}

/// Per-IP fixed-window rate limiter.
///
/// A window starts at a client's first request and is never reset inline:
/// a client over the limit stays blocked until the eviction pass removes
/// its window.
#[derive(Debug)]
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    entries: RwLock<HashMap<String, RateEntry>>,
}

impl RateLimiter {
    /// A limiter allowing `limit` requests per `window`. A limit of 0
    /// disables the check entirely.
    #[must_use]
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Count a request from `ip` and report whether the client is over its
    /// window allowance.
    pub fn is_limited(&self, ip: &str) -> bool {
        if self.limit == 0 {
            return false;
        }
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = entries.get_mut(ip) {
            entry.requests += 1;
            entry.requests > self.limit
        } else {
            debug!("rate limit window opened: {ip}");
            entries.insert(
                ip.to_owned(),
                RateEntry {
                    requests: 1,
                    window_start: Instant::now(),
                },
            );
            false
        }
    }

    /// Drop every window older than the configured window length.
    pub fn cleanup(&self) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.retain(|ip, entry| {
            let keep = entry.window_start.elapsed() <= self.window;
            if !keep {
                trace!("removed rate limit window for {ip}");
            }
            keep
        });
    }

    /// Drop all windows; returns how many were removed.
    pub fn wipe(&self) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let removed = entries.len();
        entries.clear();
        removed
    }
}
