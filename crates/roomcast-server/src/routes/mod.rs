// ── Router composition and the response vocabulary ──
//
// Every endpoint answers `{success: bool, ...}`; failures add a
// human-readable `error` string. Handlers translate `CoreError` into a
// status here so the per-endpoint code stays about its own inputs.

use axum::Router;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use roomcast_core::{ConnectionError, CoreError};

use crate::state::AppState;

mod events;
mod rooms;
mod settings;
mod users;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/token", post(settings::save_settings))
        .route("/api/settings", post(settings::save_settings))
        .route("/api/status", get(settings::status))
        .route("/api/rooms", get(rooms::list).post(rooms::dispatch))
        .route("/api/events", get(events::today))
        .route("/api/dashboard", get(events::dashboard))
        .route("/api/users", get(users::list))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

// ── Response helpers ────────────────────────────────────────────────

/// `200 {success: true, ...fields}`.
pub(crate) fn ok(mut body: serde_json::Value) -> Response {
    if let Some(map) = body.as_object_mut() {
        map.insert("success".into(), serde_json::Value::Bool(true));
    }
    (StatusCode::OK, Json(body)).into_response()
}

/// `{success: false, error}` with the given status.
pub(crate) fn fail(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(serde_json::json!({ "success": false, "error": message.into() })),
    )
        .into_response()
}

/// Map a core failure onto an HTTP status. Connection problems are the
/// upstream tenant's doing, not this server's.
pub(crate) fn core_error(err: &CoreError) -> Response {
    let status = match err {
        CoreError::DuplicateRoom { .. } => StatusCode::CONFLICT,
        CoreError::RoomNotFound { .. } => StatusCode::NOT_FOUND,
        CoreError::Connection(
            ConnectionError::Configuration { .. } | ConnectionError::Decryption { .. },
        ) => StatusCode::PRECONDITION_FAILED,
        CoreError::Connection(ConnectionError::InvalidCredentials { .. }) => {
            StatusCode::UNAUTHORIZED
        }
        CoreError::Connection(ConnectionError::Unreachable { .. })
        | CoreError::Directory { .. } => StatusCode::BAD_GATEWAY,
        CoreError::Registry { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };
    fail(status, err.to_string())
}
