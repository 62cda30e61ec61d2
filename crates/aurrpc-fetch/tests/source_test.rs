use std::io::Write;

use aurrpc_fetch::{load, FetchError};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::Router;
use chrono::{DateTime, Utc};
use flate2::write::GzEncoder;
use flate2::Compression;

const SNAPSHOT: &[u8] = br#"[{"ID":1,"Name":"attest","PackageBaseID":1,"PackageBase":"attest","Version":"1.0-1","FirstSubmitted":1,"LastModified":1}]"#;

#[tokio::test]
async fn file_load_returns_bytes_and_mtime() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("packages.json");
    std::fs::write(&path, SNAPSHOT).unwrap();

    let (bytes, modified) = load(path.to_str().unwrap(), None).await.unwrap();
    assert_eq!(bytes, SNAPSHOT);
    let expected: DateTime<Utc> = std::fs::metadata(&path).unwrap().modified().unwrap().into();
    assert_eq!(modified, expected);
}

#[tokio::test]
async fn unchanged_file_yields_not_modified() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("packages.json");
    std::fs::write(&path, SNAPSHOT).unwrap();

    let (_, modified) = load(path.to_str().unwrap(), None).await.unwrap();
    let again = load(path.to_str().unwrap(), Some(modified)).await;
    assert!(matches!(again, Err(FetchError::NotModified)));
    assert_eq!(again.unwrap_err().to_string(), "not modified");
}

#[tokio::test]
async fn gzipped_file_yields_identical_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let plain = dir.path().join("packages.json");
    let gz = dir.path().join("packages.json.gz");
    std::fs::write(&plain, SNAPSHOT).unwrap();
    let mut encoder = GzEncoder::new(std::fs::File::create(&gz).unwrap(), Compression::default());
    encoder.write_all(SNAPSHOT).unwrap();
    encoder.finish().unwrap();

    let (from_plain, _) = load(plain.to_str().unwrap(), None).await.unwrap();
    let (from_gz, _) = load(gz.to_str().unwrap(), None).await.unwrap();
    assert_eq!(from_plain, from_gz);
}

#[tokio::test]
async fn missing_file_is_an_error() {
    let result = load("/nonexistent/packages.json", None).await;
    assert!(matches!(result, Err(FetchError::Io(_))));
}

async fn spawn_fixture_server() -> String {
    let app = Router::new().route(
        "/packages.json",
        get(|headers: HeaderMap| async move {
            if headers.contains_key("if-modified-since") {
                return (StatusCode::NOT_MODIFIED, HeaderMap::new(), Vec::new());
            }
            let mut reply = HeaderMap::new();
            reply.insert(
                "Last-Modified",
                "Wed, 01 Jan 2025 00:00:00 GMT".parse().unwrap(),
            );
            (StatusCode::OK, reply, SNAPSHOT.to_vec())
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/packages.json")
}

#[tokio::test]
async fn http_load_parses_last_modified() {
    let url = spawn_fixture_server().await;
    let (bytes, modified) = load(&url, None).await.unwrap();
    assert_eq!(bytes, SNAPSHOT);
    assert_eq!(
        modified,
        DateTime::parse_from_rfc2822("Wed, 01 Jan 2025 00:00:00 GMT").unwrap()
    );
}

#[tokio::test]
async fn http_304_yields_not_modified() {
    let url = spawn_fixture_server().await;
    let (_, modified) = load(&url, None).await.unwrap();
    let again = load(&url, Some(modified)).await;
    assert!(matches!(again, Err(FetchError::NotModified)));
}
