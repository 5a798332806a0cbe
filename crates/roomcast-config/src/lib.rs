//! Encrypted tenant credential storage for roomcast.
//!
//! Two pieces: [`SecretCodec`] (AES-256-GCM envelopes keyed from the
//! environment) and [`ConfigStore`] (whole-record JSON persistence of
//! [`TenantCredentials`], each field encrypted independently). The server
//! builds the codec once at startup; a missing or malformed key is fatal
//! there, never swallowed per-call.

use std::path::PathBuf;

use directories::ProjectDirs;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

mod secret;
mod store;

pub use secret::SecretCodec;
pub use store::ConfigStore;

/// Environment variable holding the base64-encoded 32-byte storage key.
pub const SECRET_KEY_ENV: &str = "ROOMCAST_SECRET_KEY";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    /// The storage key env var is absent. Fatal at startup.
    #[error("storage key not found: set {SECRET_KEY_ENV} to a base64-encoded 32-byte key")]
    MissingKey,

    /// The storage key env var is present but unusable.
    #[error("invalid storage key: {reason}")]
    InvalidKey { reason: String },

    /// An envelope could not be decrypted. Distinct from "never
    /// configured" — the record exists but is unreadable (corrupt file,
    /// rotated key, tampering).
    #[error("failed to decrypt stored credentials: {reason}")]
    Decryption { reason: String },

    /// The credential file exists but is not valid JSON.
    #[error("credential file is malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// ── Credentials ─────────────────────────────────────────────────────

/// The tenant app registration: client id, client secret, tenant id.
///
/// Always replaced as a whole record, never partially updated. The
/// secret stays wrapped in [`SecretString`] in memory and only leaves
/// as ciphertext via [`ConfigStore::save`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantCredentials {
    pub client_id: String,
    pub client_secret: SecretString,
    pub tenant_id: String,
}

impl TenantCredentials {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        tenant_id: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: SecretString::from(client_secret.into()),
            tenant_id: tenant_id.into(),
        }
    }

    /// An all-empty record, the canonical "never configured" value.
    pub fn empty() -> Self {
        Self::new("", "", "")
    }

    /// Complete iff all three fields are non-empty.
    pub fn is_complete(&self) -> bool {
        !self.client_id.is_empty()
            && !self.client_secret.expose_secret().is_empty()
            && !self.tenant_id.is_empty()
    }
}

// ── Data directory ──────────────────────────────────────────────────

/// Resolve the data directory via XDG / platform conventions.
pub fn data_dir() -> PathBuf {
    ProjectDirs::from("com", "roomcast", "roomcast").map_or_else(dirs_fallback, |dirs| {
        dirs.data_dir().to_path_buf()
    })
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".local");
    p.push("share");
    p.push("roomcast");
    p
}

/// Default path of the encrypted credential file.
pub fn config_path() -> PathBuf {
    data_dir().join("config.json")
}

/// Default path of the room registry file.
pub fn rooms_path() -> PathBuf {
    data_dir().join("rooms.json")
}
