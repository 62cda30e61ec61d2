//! Admin surface: maintenance jobs and a settings dump, guarded by the
//! `APIKey` header.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::{error, info};

use crate::router::SharedState;

/// `POST /admin/run-job/{name}` — run one maintenance job by name.
pub async fn run_job_handler(
    State(state): State<SharedState>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> Response {
    if let Err(denied) = authorize(&state, &headers) {
        return denied;
    }

    // Job successes answer 202 Accepted; only unknown jobs (400) and
    // failed reloads (500) differ.
    match name.as_str() {
        "reload-data" => match state.reload().await {
            Ok(count) => {
                info!("admin reloaded package data ({count} packages)");
                (StatusCode::ACCEPTED, "Successfully reloaded data").into_response()
            }
            Err(e) if e.is_not_modified() => {
                (StatusCode::ACCEPTED, "Reload skipped. Data has not changed").into_response()
            }
            Err(e) => {
                error!("admin reload failed: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
            }
        },
        "wipe-cache" => {
            let removed = state.cache.wipe();
            info!("admin wiped search-cache ({removed} entries removed)");
            (
                StatusCode::ACCEPTED,
                format!("Wiped search-cache ({removed} entries removed)"),
            )
                .into_response()
        }
        "wipe-ratelimits" => {
            let removed = state.limiter.wipe();
            info!("admin wiped rate-limits ({removed} entries removed)");
            (
                StatusCode::ACCEPTED,
                format!("Wiped rate-limits ({removed} entries removed)"),
            )
                .into_response()
        }
        "cleanup-cache" => {
            state.cache.cleanup();
            (StatusCode::ACCEPTED, "Cleaned up search-cache").into_response()
        }
        "cleanup-ratelimits" => {
            state.limiter.cleanup();
            (StatusCode::ACCEPTED, "Cleaned up rate-limits").into_response()
        }
        _ => (StatusCode::BAD_REQUEST, "Job not found").into_response(),
    }
}

/// `GET /admin/settings` — the active configuration as JSON.
pub async fn settings_handler(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    if let Err(denied) = authorize(&state, &headers) {
        return denied;
    }
    Json(state.settings.clone()).into_response()
}

fn authorize(state: &crate::state::AppState, headers: &HeaderMap) -> Result<(), Response> {
    let key = headers
        .get("APIKey")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if key != state.settings.admin_api_key {
        return Err((StatusCode::UNAUTHORIZED, "Unauthorized").into_response());
    }
    Ok(())
}
