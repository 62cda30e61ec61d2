//! Error types for snapshot loading.

use thiserror::Error;

/// Errors that can occur while loading a snapshot.
///
/// [`FetchError::NotModified`] is a sentinel, not a failure: the source has
/// no newer data than the caller already holds. Its display string is
/// reserved so callers can tell it apart from real errors.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The source has not changed since the given timestamp.
    #[error("not modified")]
    NotModified,
    /// Reading the local file failed.
    #[error("reading snapshot file failed: {0}")]
    Io(#[from] std::io::Error),
    /// The HTTP request failed.
    #[error("snapshot download failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl FetchError {
    /// Whether this is the not-modified sentinel rather than a failure.
    #[must_use]
    pub fn is_not_modified(&self) -> bool {
        matches!(self, Self::NotModified)
    }
}
