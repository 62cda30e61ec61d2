//! Axum router construction.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::admin::{run_job_handler, settings_handler};
use crate::handlers::rpc::{
    api_arg_handler, api_by_handler, api_handler, api_mode_handler, rpc_handler,
    rpc_path_arg_handler, rpc_path_handler,
};
use crate::handlers::status::{doc_handler, stats_handler};
use crate::state::AppState;

/// Shared application state handed to every handler.
pub type SharedState = Arc<AppState>;

/// Build the application router. The admin routes are only mounted when
/// the admin API is enabled in the settings.
pub fn build_router(state: SharedState) -> Router {
    // The legacy .php aliases survive because aurweb still answers them.
    let mut router = Router::new()
        .route("/rpc", get(rpc_handler).post(rpc_handler))
        .route("/rpc/", get(rpc_handler).post(rpc_handler))
        .route("/rpc.php", get(rpc_handler).post(rpc_handler))
        .route("/rpc.php/", get(rpc_handler).post(rpc_handler))
        .route("/rpc/doc", get(doc_handler))
        .route("/rpc/stats", get(stats_handler))
        .route(
            "/rpc/:version/:kind",
            get(rpc_path_handler).post(rpc_path_handler),
        )
        .route(
            "/rpc/:version/:kind/:arg",
            get(rpc_path_arg_handler).post(rpc_path_arg_handler),
        )
        .route("/api/v6/:kind", get(api_handler))
        .route("/api/v6/:kind/:arg", get(api_arg_handler))
        .route("/api/v6/:kind/:by/:arg", get(api_by_handler))
        .route("/api/v6/:kind/:by/:mode/:arg", get(api_mode_handler));

    if state.settings.enable_admin_api {
        router = router
            .route("/admin/run-job/:name", post(run_job_handler))
            .route("/admin/settings", get(settings_handler));
    }

    router.with_state(state)
}
