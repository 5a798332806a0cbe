// Directory user listing for the setup screen.

use axum::extract::State;
use axum::response::Response;

use roomcast_core::dashboard;

use crate::routes::{core_error, ok};
use crate::state::AppState;

const PAGE_SIZE: u32 = 100;

/// GET `/api/users` — tenant users, trimmed for display.
pub async fn list(State(state): State<AppState>) -> Response {
    match dashboard::list_directory_users(&state.connection, PAGE_SIZE).await {
        Ok(users) => ok(serde_json::json!({ "users": users })),
        Err(e) => core_error(&e),
    }
}
