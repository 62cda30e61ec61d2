//! Shared application state: the catalog holder behind its lock, the
//! rate limiter, and the search cache.
//!
//! Each of the three mutable maps sits behind its own `RwLock`; handlers
//! take at most one of them at a time. The catalog itself is immutable:
//! readers clone the `Arc` under the shared lock and keep using the
//! snapshot after release, so the expensive index build never runs under
//! any lock and the refresh write-locks only for the pointer swap.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use aurrpc_core::{Catalog, CatalogError};
use aurrpc_fetch::FetchError;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::cache::SearchCache;
use crate::config::Settings;
use crate::limiter::RateLimiter;

/// Errors from one catalog reload cycle.
#[derive(Debug, Error)]
pub enum ReloadError {
    /// Loading the snapshot bytes failed (or yielded the not-modified
    /// sentinel).
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// The downloaded snapshot could not be indexed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl ReloadError {
    /// Whether this is the not-modified sentinel rather than a failure.
    #[must_use]
    pub fn is_not_modified(&self) -> bool {
        matches!(self, Self::Fetch(FetchError::NotModified))
    }
}

struct CatalogSlot {
    catalog: Arc<Catalog>,
    last_refresh: Option<DateTime<Utc>>,
}

/// Everything a request handler needs, shared behind one `Arc`.
pub struct AppState {
    /// Validated runtime settings (read-only once the server is up).
    pub settings: Settings,
    /// Per-IP fixed-window rate limiter.
    pub limiter: RateLimiter,
    /// Search result cache.
    pub cache: SearchCache,
    slot: RwLock<CatalogSlot>,
}

impl AppState {
    /// Build the state from validated settings. The catalog starts empty;
    /// the caller must run one successful [`AppState::reload`] before
    /// serving.
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        let limiter = RateLimiter::new(
            settings.rate_limit,
            Duration::from_secs(settings.rate_limit_time_window),
        );
        let cache = SearchCache::new(
            settings.enable_search_cache,
            Duration::from_secs(settings.cache_expiration_time),
        );
        Self {
            settings,
            limiter,
            cache,
            slot: RwLock::new(CatalogSlot {
                catalog: Arc::new(Catalog::default()),
                last_refresh: None,
            }),
        }
    }

    /// The current catalog snapshot. The returned `Arc` stays valid across
    /// swaps; the old snapshot is reclaimed once its last reader drops it.
    #[must_use]
    pub fn catalog(&self) -> Arc<Catalog> {
        let slot = self.slot.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&slot.catalog)
    }

    /// When the serving catalog was last replaced, per the source's own
    /// modification stamp.
    #[must_use]
    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        let slot = self.slot.read().unwrap_or_else(PoisonError::into_inner);
        slot.last_refresh
    }

    /// Reload the catalog from the configured source. Fetch and index
    /// build run without any lock held; only the pointer swap takes the
    /// write lock. On failure the previous catalog keeps serving.
    ///
    /// # Errors
    ///
    /// Returns [`ReloadError`] on fetch or index failure; the not-modified
    /// sentinel arrives as `ReloadError::Fetch(FetchError::NotModified)`.
    pub async fn reload(&self) -> Result<usize, ReloadError> {
        let last = self.last_refresh();
        let (bytes, modified) = aurrpc_fetch::load(&self.settings.aur_file_location, last).await?;
        let catalog = Catalog::build(&bytes)?;
        let count = catalog.len();

        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        slot.catalog = Arc::new(catalog);
        slot.last_refresh = Some(modified);
        Ok(count)
    }
}
