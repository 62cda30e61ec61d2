//! The request dispatcher: both public query surfaces funnel through the
//! same pipeline of client IP resolution, rate limiting, validation,
//! query dispatch, result cap, cache store, and envelope shaping.

use std::net::SocketAddr;

use axum::body::Bytes;
use axum::extract::{ConnectInfo, Path, RawQuery, State};
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use log::{debug, error};

use crate::models::RpcResult;
use crate::params::{
    client_ip, validate_v5, validate_v6, QueryError, QueryKind, RawParams, RpcQuery,
};
use crate::query::info::info_result;
use crate::query::search::search_result;
use crate::query::suggest::suggest;
use crate::router::SharedState;
use crate::state::AppState;

use super::{CONTENT_TYPE_JS, CONTENT_TYPE_OPENSEARCH};

/// `GET`/`POST` on the legacy query-string endpoints (`/rpc` and aliases).
pub async fn rpc_handler(
    State(state): State<SharedState>,
    connect: Option<ConnectInfo<SocketAddr>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Response {
    let raw = collect_params(&method, query.as_deref(), &body);
    run_v5(&state, connect, &method, &uri, &headers, raw)
}

/// `/rpc/v{version}/{type}` — path-parameterized legacy calls.
pub async fn rpc_path_handler(
    State(state): State<SharedState>,
    Path((version, kind)): Path<(String, String)>,
    connect: Option<ConnectInfo<SocketAddr>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Response {
    let mut raw = collect_params(&method, query.as_deref(), &body);
    raw.set_path_version(&version);
    raw.set_path_kind(&kind);
    run_v5(&state, connect, &method, &uri, &headers, raw)
}

/// `/rpc/v{version}/{type}/{arg}` — path-parameterized legacy calls.
pub async fn rpc_path_arg_handler(
    State(state): State<SharedState>,
    Path((version, kind, arg)): Path<(String, String, String)>,
    connect: Option<ConnectInfo<SocketAddr>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Response {
    let mut raw = collect_params(&method, query.as_deref(), &body);
    raw.set_path_version(&version);
    raw.set_path_kind(&kind);
    raw.set_path_arg(&arg);
    run_v5(&state, connect, &method, &uri, &headers, raw)
}

/// `/api/v6/{type}` — arguments arrive as repeated `arg` query parameters.
pub async fn api_handler(
    State(state): State<SharedState>,
    Path(kind): Path<String>,
    connect: Option<ConnectInfo<SocketAddr>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Response {
    let mut raw = collect_params(&Method::GET, query.as_deref(), &Bytes::new());
    raw.set_path_kind(&kind);
    run_v6(&state, connect, &method, &uri, &headers, raw)
}

/// `/api/v6/{type}/{arg}`.
pub async fn api_arg_handler(
    State(state): State<SharedState>,
    Path((kind, arg)): Path<(String, String)>,
    connect: Option<ConnectInfo<SocketAddr>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Response {
    let mut raw = collect_params(&Method::GET, query.as_deref(), &Bytes::new());
    raw.set_path_kind(&kind);
    raw.set_path_arg(&arg);
    run_v6(&state, connect, &method, &uri, &headers, raw)
}

/// `/api/v6/{type}/{by}/{arg}`.
pub async fn api_by_handler(
    State(state): State<SharedState>,
    Path((kind, by, arg)): Path<(String, String, String)>,
    connect: Option<ConnectInfo<SocketAddr>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Response {
    let mut raw = collect_params(&Method::GET, query.as_deref(), &Bytes::new());
    raw.set_path_kind(&kind);
    raw.set_path_by(&by);
    raw.set_path_arg(&arg);
    run_v6(&state, connect, &method, &uri, &headers, raw)
}

/// `/api/v6/{type}/{by}/{mode}/{arg}`.
pub async fn api_mode_handler(
    State(state): State<SharedState>,
    Path((kind, by, mode, arg)): Path<(String, String, String, String)>,
    connect: Option<ConnectInfo<SocketAddr>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Response {
    let mut raw = collect_params(&Method::GET, query.as_deref(), &Bytes::new());
    raw.set_path_kind(&kind);
    raw.set_path_by(&by);
    raw.set_path_mode(&mode);
    raw.set_path_arg(&arg);
    run_v6(&state, connect, &method, &uri, &headers, raw)
}

/// Decode request parameters: the URL query for GET, the form body for
/// POST.
fn collect_params(method: &Method, query: Option<&str>, body: &Bytes) -> RawParams {
    let encoded = if method == Method::POST {
        std::str::from_utf8(body).unwrap_or("")
    } else {
        query.unwrap_or("")
    };
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(encoded).unwrap_or_default();
    RawParams::from_pairs(&pairs)
}

fn run_v5(
    state: &AppState,
    connect: Option<ConnectInfo<SocketAddr>>,
    method: &Method,
    uri: &Uri,
    headers: &HeaderMap,
    raw: RawParams,
) -> Response {
    let ip = client_ip(
        connect.map(|c| c.0),
        headers,
        &state.settings.trusted_reverse_proxies,
    );
    debug!("client connected: {ip} -> [{method}] {uri}");
    let version = raw.version();

    if state.limiter.is_limited(&ip) {
        debug!("client reached rate limit: {ip}");
        return error_response(
            StatusCode::TOO_MANY_REQUESTS,
            "Rate limit reached",
            version,
            None,
        );
    }

    if raw.is_unset() {
        return Redirect::temporary("/rpc/doc").into_response();
    }

    let query = match validate_v5(&raw) {
        Ok(query) => query,
        Err(err) => {
            // The legacy surface answers validation errors with 200 so
            // JSONP callers can read the envelope inline; an invalid
            // callback name is never echoed back.
            let callback = if err == QueryError::InvalidCallback {
                None
            } else {
                raw.safe_callback()
            };
            return error_response(StatusCode::OK, &err.to_string(), version, callback);
        }
    };

    dispatch(state, &query)
}

fn run_v6(
    state: &AppState,
    connect: Option<ConnectInfo<SocketAddr>>,
    method: &Method,
    uri: &Uri,
    headers: &HeaderMap,
    raw: RawParams,
) -> Response {
    let ip = client_ip(
        connect.map(|c| c.0),
        headers,
        &state.settings.trusted_reverse_proxies,
    );
    debug!("client connected: {ip} -> [{method}] {uri}");

    if state.limiter.is_limited(&ip) {
        debug!("client reached rate limit: {ip}");
        return error_response(StatusCode::TOO_MANY_REQUESTS, "Rate limit reached", 6, None);
    }

    let query = match validate_v6(&raw) {
        Ok(query) => query,
        Err(err) => return error_response(StatusCode::BAD_REQUEST, &err.to_string(), 6, None),
    };

    dispatch(state, &query)
}

/// Steps shared by both surfaces once the query is canonical: evaluate,
/// cap, cache, shape the envelope.
fn dispatch(state: &AppState, query: &RpcQuery) -> Response {
    if query.kind.is_suggest() {
        return suggest_response(state, query);
    }

    let catalog = state.catalog();
    let max = state.settings.max_results;

    let mut result = if query.kind.is_info() {
        info_result(&catalog, query, max)
    } else {
        let key = fingerprint(query);
        if let Some(hit) = state.cache.get(&key) {
            debug!("search cache hit");
            hit
        } else {
            let (computed, cacheable) = search_result(&catalog, query, max);
            if cacheable {
                // Past the cap the entry holds only the count, so a
                // repeat short-circuits to the same error without a
                // rescan.
                state.cache.put(key, computed.clone());
            }
            computed
        }
    };

    if result.resultcount > max {
        result = RpcResult::error("Too many package results.");
    }

    finalize(result, query)
}

fn suggest_response(state: &AppState, query: &RpcQuery) -> Response {
    let catalog = state.catalog();
    let arg = query.args.first().map_or("", String::as_str);
    let pkg_base = matches!(
        query.kind,
        QueryKind::SuggestPkgbase | QueryKind::OpensearchSuggestPkgbase
    );
    let found = suggest(&catalog, arg, pkg_base);

    if matches!(
        query.kind,
        QueryKind::OpensearchSuggest | QueryKind::OpensearchSuggestPkgbase
    ) {
        // OpenSearch wraps the suggestions together with the client's
        // original (uncanonicalized) term.
        return match serde_json::to_string(&(&query.raw_arg, &found)) {
            Ok(body) => (
                [(header::CONTENT_TYPE, CONTENT_TYPE_OPENSEARCH)],
                body,
            )
                .into_response(),
            Err(e) => {
                error!("serializing suggestions failed: {e}");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        };
    }
    Json(found).into_response()
}

/// Canonical cache fingerprint for a search query.
fn fingerprint(query: &RpcQuery) -> String {
    format!(
        "{}\x1f{}\x1f{}\x1f{}\x1f{}",
        query.version,
        query.kind.response_name(),
        query.axis.as_str(),
        query.mode.as_str(),
        query.args.join("\x1f"),
    )
}

fn finalize(mut result: RpcResult, query: &RpcQuery) -> Response {
    result.version = (query.version > 0).then_some(query.version);
    match query.callback.as_deref() {
        Some(callback) => jsonp(StatusCode::OK, callback, &result),
        None => (StatusCode::OK, Json(result)).into_response(),
    }
}

fn error_response(
    status: StatusCode,
    message: &str,
    version: i64,
    callback: Option<&str>,
) -> Response {
    let mut result = RpcResult::error(message);
    result.version = (version > 0).then_some(version);
    match callback {
        Some(callback) => jsonp(status, callback, &result),
        None => (status, Json(result)).into_response(),
    }
}

fn jsonp(status: StatusCode, callback: &str, result: &RpcResult) -> Response {
    match serde_json::to_string(result) {
        Ok(body) => (
            status,
            [(header::CONTENT_TYPE, CONTENT_TYPE_JS)],
            format!("/**/{callback}({body})"),
        )
            .into_response(),
        Err(e) => {
            error!("serializing response failed: {e}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
