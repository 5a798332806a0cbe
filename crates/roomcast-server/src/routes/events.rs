// Read-side endpoints: a single room's agenda and the full dashboard.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use serde::Deserialize;

use roomcast_core::dashboard;

use crate::routes::{core_error, fail, ok};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsQuery {
    room_email: Option<String>,
}

/// GET `/api/events?roomEmail=` — today's agenda for one room.
pub async fn today(State(state): State<AppState>, Query(query): Query<EventsQuery>) -> Response {
    let Some(room_email) = query.room_email.filter(|e| !e.trim().is_empty()) else {
        return fail(StatusCode::BAD_REQUEST, "roomEmail query parameter is required");
    };

    match dashboard::events_for_room(&state.connection, &room_email).await {
        Ok(events) => ok(serde_json::json!({ "events": events })),
        Err(e) => fail(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

/// GET `/api/dashboard` — the displayed rooms with their agendas, as
/// one payload per render.
pub async fn dashboard(State(state): State<AppState>) -> Response {
    match dashboard::assemble(&state.connection, &state.registry).await {
        Ok(board) => ok(serde_json::json!({
            "rooms": board.rooms,
            "agenda": board.agenda,
        })),
        Err(e) => core_error(&e),
    }
}
