// Hand-crafted async HTTP client for the tenant directory API.
//
// Base path: /v1.0/
// Auth: bearer token from the client-credentials flow (see token.rs).

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use secrecy::SecretString;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::token::TokenProvider;
use crate::transport::TransportConfig;
use crate::types::{Collection, DirectoryUser, EventRecord, RoomResource};

/// Graph-style error envelope: `{"error": {"code": ..., "message": ...}}`.
#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    error: Option<ErrorBody>,
}

#[derive(serde::Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Async client bound to one tenant session.
///
/// Construction binds credentials but performs no network I/O; the
/// first call triggers the token exchange. Cheap to clone — the token
/// cache is shared across clones. No operation retries internally.
#[derive(Clone)]
pub struct DirectoryClient {
    http: reqwest::Client,
    base_url: Url,
    token: Arc<TokenProvider>,
}

impl DirectoryClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Bind a session for a tenant app registration.
    pub fn new(
        tenant_id: &str,
        client_id: &str,
        client_secret: SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        let token_url = TokenProvider::default_token_url(tenant_id)?;
        let token = TokenProvider::new(http.clone(), token_url, client_id, client_secret);
        let base_url = Url::parse("https://graph.microsoft.com/v1.0/")?;

        Ok(Self {
            http,
            base_url,
            token: Arc::new(token),
        })
    }

    /// Wrap an existing `reqwest::Client` with explicit endpoints
    /// (used by tests pointing at a mock server).
    pub fn with_endpoints(
        http: reqwest::Client,
        base_url: Url,
        token: TokenProvider,
    ) -> Result<Self, Error> {
        Ok(Self {
            http,
            base_url: normalize_base_url(base_url),
            token: Arc::new(token),
        })
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join a relative path (e.g. `"users"`) onto the base URL.
    fn url(&self, path: &str) -> Url {
        // base_url always ends with a slash, so joining relative paths works.
        self.base_url
            .join(path)
            .expect("path should be valid relative URL")
    }

    // ── Operations ───────────────────────────────────────────────────

    /// Cheap call proving the session is authorized: fetch at most one
    /// record from the users listing.
    pub async fn probe_identity(&self) -> Result<(), Error> {
        let _: Collection<DirectoryUser> = self
            .get("users", &[("$top", "1".into()), ("$select", "id".into())])
            .await?;
        Ok(())
    }

    /// List directory users, paged and sorted server-side.
    pub async fn list_users(
        &self,
        page_size: u32,
        order_by: &str,
    ) -> Result<Vec<DirectoryUser>, Error> {
        let users: Collection<DirectoryUser> = self
            .get(
                "users",
                &[
                    ("$select", "displayName,id,mail".into()),
                    ("$top", page_size.to_string()),
                    ("$orderby", order_by.to_owned()),
                ],
            )
            .await?;
        Ok(users.value)
    }

    /// List every bookable room resource in the tenant.
    pub async fn list_room_resources(&self) -> Result<Vec<RoomResource>, Error> {
        let rooms: Collection<RoomResource> =
            self.get("places/microsoft.graph.room", &[]).await?;
        Ok(rooms.value)
    }

    /// List a room's events within an inclusive window, ordered by start
    /// time server-side.
    pub async fn list_events_for_resource(
        &self,
        email_address: &str,
        day_start: DateTime<Utc>,
        day_end: DateTime<Utc>,
    ) -> Result<Vec<EventRecord>, Error> {
        let path = format!("users/{email_address}/calendarView");
        let events: Collection<EventRecord> = self
            .get(
                &path,
                &[
                    (
                        "startDateTime",
                        day_start.to_rfc3339_opts(SecondsFormat::Secs, true),
                    ),
                    (
                        "endDateTime",
                        day_end.to_rfc3339_opts(SecondsFormat::Secs, true),
                    ),
                    ("$orderby", "start/dateTime".into()),
                ],
            )
            .await?;
        Ok(events.value)
    }

    // ── HTTP plumbing ────────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        let url = self.url(path);
        let bearer = self.token.bearer().await?;
        debug!("GET {url} params={params:?}");

        let mut req = self.http.get(url).bearer_auth(bearer);
        if !params.is_empty() {
            req = req.query(params);
        }

        let resp = req.send().await?;
        handle_response(resp).await
    }
}

async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let status = resp.status();
    if status.is_success() {
        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body,
            }
        })
    } else {
        Err(parse_error(status, resp).await)
    }
}

async fn parse_error(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
    let raw = resp.text().await.unwrap_or_default();
    let parsed: Option<ErrorBody> = serde_json::from_str::<ErrorResponse>(&raw)
        .ok()
        .and_then(|e| e.error);

    let message = parsed
        .as_ref()
        .and_then(|e| e.message.clone())
        .unwrap_or_else(|| status.to_string());
    let code = parsed.and_then(|e| e.code);

    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Error::Unauthorized { message };
    }

    Error::Api {
        message,
        code,
        status: status.as_u16(),
    }
}

/// Ensure the base URL ends with a slash so relative joins nest under it.
fn normalize_base_url(mut url: Url) -> Url {
    let path = url.path().trim_end_matches('/').to_owned();
    url.set_path(&format!("{path}/"));
    url
}

impl std::fmt::Debug for DirectoryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}
