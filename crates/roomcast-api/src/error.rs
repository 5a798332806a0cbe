use thiserror::Error;

/// Top-level error type for the `roomcast-api` crate.
///
/// Covers every failure mode of the directory session: token exchange,
/// transport, directory API rejections, and malformed payloads.
/// `roomcast-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authorization ───────────────────────────────────────────────
    /// The tenant rejected the session (bad client id/secret/tenant,
    /// revoked consent, or a 401/403 from the directory).
    #[error("Directory authorization failed: {message}")]
    Unauthorized { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout).
    #[error("Directory unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── Directory API ───────────────────────────────────────────────
    /// Structured error from the directory API.
    #[error("Directory API error (HTTP {status}): {message}")]
    Api {
        message: String,
        code: Option<String>,
        status: u16,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the remote rejected the session and re-submitting
    /// credentials might resolve it.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Returns `true` if this is a transient error worth a manual retry.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}
