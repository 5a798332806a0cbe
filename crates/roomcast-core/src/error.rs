// ── Core error types ──
//
// User-facing errors from roomcast-core. Consumers never see HTTP
// status codes or JSON parse failures directly; the `From` impls
// translate the transport and storage layers into domain-appropriate
// variants with human-readable messages.

use thiserror::Error;

/// A tenant-connection failure. Cloneable so the state machine can both
/// remember the reason (in `ConnectionState::Failed`) and return it.
///
/// None of these are terminal: re-saving credentials and re-running
/// `ensure_ready()` recovers from every variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    /// Credentials are missing or incomplete. Recoverable by submitting
    /// configuration.
    #[error("Tenant connection is not configured: {message}")]
    Configuration { message: String },

    /// Stored credentials exist but cannot be decrypted (corrupt store
    /// or rotated key). Distinct from "never configured" — recoverable
    /// only by re-saving credentials.
    #[error("Stored credentials are unreadable: {message}")]
    Decryption { message: String },

    /// The tenant rejected the session during validation.
    #[error("Tenant rejected the credentials: {message}")]
    InvalidCredentials { message: String },

    /// The directory could not be reached (or answered nonsense).
    /// Transient; the caller may retry manually.
    #[error("Tenant directory unreachable: {message}")]
    Unreachable { message: String },
}

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    // ── Registry invariant violations ────────────────────────────────
    #[error("A room with this id or email address already exists: {identifier}")]
    DuplicateRoom { identifier: String },

    #[error("Room not found: {identifier}")]
    RoomNotFound { identifier: String },

    /// Local persistence failed: the room file is unreadable or
    /// malformed, or a write didn't land. Never silently reset to
    /// empty — concurrent external modification must fail loudly.
    #[error("Storage error: {message}")]
    Registry { message: String },

    // ── Directory errors after a validated connection ────────────────
    #[error("Directory request failed: {message}")]
    Directory { message: String },
}

// ── Conversion from lower layers ─────────────────────────────────────

impl From<roomcast_api::Error> for CoreError {
    fn from(err: roomcast_api::Error) -> Self {
        match err {
            roomcast_api::Error::Unauthorized { message } => {
                Self::Connection(ConnectionError::InvalidCredentials { message })
            }
            roomcast_api::Error::Transport(e) => {
                Self::Connection(ConnectionError::Unreachable {
                    message: e.to_string(),
                })
            }
            roomcast_api::Error::InvalidUrl(e) => Self::Connection(ConnectionError::Configuration {
                message: format!("invalid URL: {e}"),
            }),
            roomcast_api::Error::Api { message, status, .. } => Self::Directory {
                message: format!("HTTP {status}: {message}"),
            },
            roomcast_api::Error::Deserialization { message, .. } => Self::Directory { message },
        }
    }
}

impl From<std::io::Error> for CoreError {
    fn from(err: std::io::Error) -> Self {
        Self::Registry {
            message: err.to_string(),
        }
    }
}
