// Room registry endpoints: plain listing plus the action dispatch the
// admin screen drives.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use serde::Deserialize;

use roomcast_core::{Room, RoomPatch};

use crate::routes::{core_error, fail, ok};
use crate::state::AppState;

/// GET `/api/rooms` — the full registry, curated and not.
#[allow(clippy::unused_async)] // axum handlers take the async calling convention
pub async fn list(State(state): State<AppState>) -> Response {
    match state.registry.list() {
        Ok(rooms) => ok(serde_json::json!({ "rooms": rooms })),
        Err(e) => core_error(&e),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomActionRequest {
    action: String,
    /// Required by `validate` and `addWithValidation`.
    email: Option<String>,
    /// Required by `remove` and `toggle`.
    id: Option<String>,
    /// Required by `add`.
    room: Option<Room>,
    /// Required by `update`.
    patch: Option<RoomPatch>,
}

/// POST `/api/rooms` — one endpoint, one `action` field, mirroring the
/// admin screen's form posts. Each action names its required fields and
/// answers 400 when they are missing.
pub async fn dispatch(
    State(state): State<AppState>,
    Json(req): Json<RoomActionRequest>,
) -> Response {
    match req.action.as_str() {
        "validate" => {
            let Some(email) = req.email else {
                return fail(StatusCode::BAD_REQUEST, "email is required for validate");
            };
            match state
                .registry
                .validate_against_directory(&state.connection, &email)
                .await
            {
                Ok(room) => ok(serde_json::json!({ "room": room })),
                Err(e) => core_error(&e),
            }
        }
        "addWithValidation" => {
            let Some(email) = req.email else {
                return fail(
                    StatusCode::BAD_REQUEST,
                    "email is required for addWithValidation",
                );
            };
            match state
                .registry
                .add_with_validation(&state.connection, &email)
                .await
            {
                Ok(room) => ok(serde_json::json!({ "room": room })),
                Err(e) => core_error(&e),
            }
        }
        "add" => {
            let Some(room) = req.room else {
                return fail(StatusCode::BAD_REQUEST, "room is required for add");
            };
            match state.registry.add(room).await {
                Ok(()) => ok(serde_json::json!({})),
                Err(e) => core_error(&e),
            }
        }
        "remove" => {
            let Some(id) = req.id else {
                return fail(StatusCode::BAD_REQUEST, "id is required for remove");
            };
            match state.registry.remove(&id).await {
                Ok(()) => ok(serde_json::json!({})),
                Err(e) => core_error(&e),
            }
        }
        "toggle" => {
            let Some(id) = req.id else {
                return fail(StatusCode::BAD_REQUEST, "id is required for toggle");
            };
            match state.registry.toggle_display(&id).await {
                Ok(displayed) => ok(serde_json::json!({ "isDisplayed": displayed })),
                Err(e) => core_error(&e),
            }
        }
        "update" => {
            let (Some(id), Some(patch)) = (req.id, req.patch) else {
                return fail(StatusCode::BAD_REQUEST, "id and patch are required for update");
            };
            match state.registry.update(&id, patch).await {
                Ok(room) => ok(serde_json::json!({ "room": room })),
                Err(e) => core_error(&e),
            }
        }
        "refresh" => match state.registry.refresh_from_directory(&state.connection).await {
            Ok(rooms) => ok(serde_json::json!({ "rooms": rooms })),
            Err(e) => core_error(&e),
        },
        other => fail(
            StatusCode::BAD_REQUEST,
            format!("unknown action: {other}"),
        ),
    }
}
