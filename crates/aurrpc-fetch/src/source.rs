//! Loading snapshot bytes from an HTTP source or a local file.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use flate2::read::GzDecoder;
use log::debug;
use reqwest::header;
use reqwest::StatusCode;

use crate::error::FetchError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Load snapshot bytes from `source`, which is either an `http(s)` URL or a
/// filesystem path. `last` is the timestamp of the previously loaded data;
/// when the source has nothing newer, [`FetchError::NotModified`] is
/// returned and no bytes are transferred.
///
/// On success, returns the raw (decompressed) bytes together with the new
/// modification timestamp to pass back on the next call.
///
/// # Errors
///
/// Returns [`FetchError::NotModified`] when the source is unchanged, or an
/// I/O / transport error otherwise.
pub async fn load(
    source: &str,
    last: Option<DateTime<Utc>>,
) -> Result<(Vec<u8>, DateTime<Utc>), FetchError> {
    if source.starts_with("http") {
        load_url(source, last).await
    } else {
        load_file(Path::new(source), last)
    }
}

/// Conditional GET against the snapshot URL. The server negotiates gzip
/// content-encoding; `reqwest` decompresses transparently.
async fn load_url(
    url: &str,
    last: Option<DateTime<Utc>>,
) -> Result<(Vec<u8>, DateTime<Utc>), FetchError> {
    let client = reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()?;

    let mut request = client.get(url);
    if let Some(last) = last {
        request = request.header(header::IF_MODIFIED_SINCE, http_date(last));
    }

    debug!("fetching snapshot from {url}");
    let response = request.send().await?;
    if response.status() == StatusCode::NOT_MODIFIED {
        return Err(FetchError::NotModified);
    }
    let response = response.error_for_status()?;

    // A missing or unparsable Last-Modified falls back to the current time
    // so the next conditional request still makes progress.
    let modified = response
        .headers()
        .get(header::LAST_MODIFIED)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_http_date)
        .unwrap_or_else(Utc::now);

    let body = response.bytes().await?.to_vec();
    Ok((body, modified))
}

/// Read the snapshot from a local file, comparing its mtime against `last`.
/// A `.gz` suffix streams through a gzip decoder.
fn load_file(
    path: &Path,
    last: Option<DateTime<Utc>>,
) -> Result<(Vec<u8>, DateTime<Utc>), FetchError> {
    let meta = std::fs::metadata(path)?;
    let modified: DateTime<Utc> = meta.modified()?.into();
    if last == Some(modified) {
        return Err(FetchError::NotModified);
    }

    debug!("reading snapshot from {}", path.display());
    let bytes = if path.extension().is_some_and(|e| e == "gz") {
        let mut out = Vec::new();
        GzDecoder::new(File::open(path)?).read_to_end(&mut out)?;
        out
    } else {
        std::fs::read(path)?
    };
    Ok((bytes, modified))
}

/// Format a timestamp as an RFC 7231 IMF-fixdate for `If-Modified-Since`.
fn http_date(t: DateTime<Utc>) -> String {
    t.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Parse an RFC 7231 `Last-Modified` value.
fn parse_http_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(raw)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}
