// OAuth2 client-credentials token flow.
//
// One token per bound session, cached until shortly before expiry.
// The identity provider rejecting the exchange (bad client id, bad
// secret, unknown tenant) surfaces as `Error::Unauthorized` so callers
// can distinguish "fix your credentials" from "network is down".

use std::time::{Duration, Instant};

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;
use url::Url;

use crate::error::Error;

/// Refresh this long before the reported expiry.
const EXPIRY_SLACK: Duration = Duration::from_secs(60);

/// The scope requested for app-only directory access.
pub const DEFAULT_SCOPE: &str = "https://graph.microsoft.com/.default";

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Deserialize)]
struct TokenErrorResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

struct CachedToken {
    access_token: SecretString,
    expires_at: Instant,
}

/// Acquires and caches bearer tokens for a single tenant session.
pub struct TokenProvider {
    http: reqwest::Client,
    token_url: Url,
    client_id: String,
    client_secret: SecretString,
    scope: String,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenProvider {
    pub fn new(
        http: reqwest::Client,
        token_url: Url,
        client_id: impl Into<String>,
        client_secret: SecretString,
    ) -> Self {
        Self {
            http,
            token_url,
            client_id: client_id.into(),
            client_secret,
            scope: DEFAULT_SCOPE.to_owned(),
            cached: Mutex::new(None),
        }
    }

    /// The default token endpoint for a tenant.
    pub fn default_token_url(tenant_id: &str) -> Result<Url, Error> {
        Ok(Url::parse(&format!(
            "https://login.microsoftonline.com/{tenant_id}/oauth2/v2.0/token"
        ))?)
    }

    /// Return a valid bearer token, exchanging credentials if the cached
    /// one is absent or about to expire.
    pub async fn bearer(&self) -> Result<String, Error> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if token.expires_at > Instant::now() + EXPIRY_SLACK {
                return Ok(token.access_token.expose_secret().to_owned());
            }
        }

        debug!(url = %self.token_url, "exchanging client credentials for token");

        let resp = self
            .http
            .post(self.token_url.clone())
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", &self.client_id),
                ("client_secret", self.client_secret.expose_secret()),
                ("scope", &self.scope),
            ])
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(token_error(status, &body));
        }

        let token: TokenResponse =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: format!("token response: {e}"),
                body,
            })?;

        let access = token.access_token.clone();
        *cached = Some(CachedToken {
            access_token: SecretString::from(token.access_token),
            expires_at: Instant::now() + Duration::from_secs(token.expires_in),
        });

        Ok(access)
    }

    /// Drop any cached token (forces a fresh exchange on next use).
    pub async fn invalidate(&self) {
        *self.cached.lock().await = None;
    }
}

fn token_error(status: reqwest::StatusCode, body: &str) -> Error {
    let parsed: Option<TokenErrorResponse> = serde_json::from_str(body).ok();
    let description = parsed
        .and_then(|e| e.error_description.or(e.error))
        .unwrap_or_else(|| status.to_string());

    if status.is_client_error() {
        Error::Unauthorized {
            message: description,
        }
    } else {
        Error::Api {
            message: description,
            code: None,
            status: status.as_u16(),
        }
    }
}

impl std::fmt::Debug for TokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenProvider")
            .field("token_url", &self.token_url.as_str())
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}
