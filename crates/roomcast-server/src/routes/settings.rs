// Tenant credential intake and connection status.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use serde::Deserialize;
use tracing::info;

use roomcast_core::ConnectionState;
use roomcast_config::TenantCredentials;

use crate::routes::{fail, ok};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsRequest {
    #[serde(default)]
    client_id: String,
    #[serde(default)]
    client_secret: String,
    #[serde(default)]
    tenant_id: String,
}

/// Accept a full credential record, persist it, and immediately try to
/// bring the connection up. The outcome rides back in the body either
/// way — the record is saved even when the tenant rejects it, so the
/// operator can fix one field and retry.
pub async fn save_settings(
    State(state): State<AppState>,
    Json(req): Json<SettingsRequest>,
) -> Response {
    if req.client_id.trim().is_empty()
        || req.client_secret.trim().is_empty()
        || req.tenant_id.trim().is_empty()
    {
        return fail(
            StatusCode::BAD_REQUEST,
            "clientId, clientSecret and tenantId are all required",
        );
    }

    let credentials = TenantCredentials::new(req.client_id, req.client_secret, req.tenant_id);
    if let Err(e) = state.connection.save_credentials(&credentials).await {
        return fail(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
    }

    match state.connection.ensure_ready().await {
        Ok(()) => {
            info!("tenant settings accepted and validated");
            ok(serde_json::json!({}))
        }
        // Saved but not usable: report the reason without an error
        // status, so the setup form shows it inline.
        Err(e) => fail(StatusCode::OK, e.to_string()),
    }
}

/// Connection state plus whether a complete credential record exists,
/// for the setup screen to decide what to show.
pub async fn status(State(state): State<AppState>) -> Response {
    let configured = state
        .connection
        .store()
        .is_complete()
        .unwrap_or(false);

    let (connection_state, error) = match state.connection.state().await {
        ConnectionState::Unconfigured => ("unconfigured", None),
        ConnectionState::Initialized => ("initialized", None),
        ConnectionState::Validated => ("validated", None),
        ConnectionState::Failed(reason) => ("failed", Some(reason.to_string())),
    };

    let mut body = serde_json::json!({
        "configured": configured,
        "state": connection_state,
    });
    if let (Some(map), Some(error)) = (body.as_object_mut(), error) {
        map.insert("error".into(), serde_json::Value::String(error));
    }
    ok(body)
}
