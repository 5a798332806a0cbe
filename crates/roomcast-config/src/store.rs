// Whole-record persistence of tenant credentials.
//
// On disk: a single JSON object whose three fields are each a
// SecretCodec envelope. Saves go through a temp file + rename so a
// failed write never leaves a half-written record behind.

use std::path::{Path, PathBuf};

use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{ConfigError, SecretCodec, TenantCredentials};

/// The encrypted on-disk shape. Field values are envelopes, not plaintext.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EncryptedRecord {
    client_id: String,
    client_secret: String,
    tenant_id: String,
}

/// Persists [`TenantCredentials`] encrypted at rest.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    codec: SecretCodec,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>, codec: SecretCodec) -> Self {
        Self {
            path: path.into(),
            codec,
        }
    }

    /// Store at the platform-default location (`data_dir()/config.json`).
    pub fn at_default_path(codec: SecretCodec) -> Self {
        Self::new(crate::config_path(), codec)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Encrypt each field independently and replace the record atomically.
    pub fn save(&self, credentials: &TenantCredentials) -> Result<(), ConfigError> {
        let record = EncryptedRecord {
            client_id: self.codec.encrypt(&credentials.client_id),
            client_secret: self.codec.encrypt(credentials.client_secret.expose_secret()),
            tenant_id: self.codec.encrypt(&credentials.tenant_id),
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Temp-file + rename: on a partial write the previous file stays intact.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(&record)?)?;
        std::fs::rename(&tmp, &self.path)?;

        debug!(path = %self.path.display(), "credentials saved");
        Ok(())
    }

    /// Load and decrypt the record.
    ///
    /// An absent file is "never configured" and returns the all-empty
    /// record. A present-but-undecryptable file is a distinct
    /// [`ConfigError::Decryption`] so callers can tell corruption or a
    /// rotated key apart from a blank setup.
    pub fn load(&self) -> Result<TenantCredentials, ConfigError> {
        if !self.path.exists() {
            return Ok(TenantCredentials::empty());
        }

        let raw = std::fs::read_to_string(&self.path)?;
        let record: EncryptedRecord = serde_json::from_str(&raw)?;

        Ok(TenantCredentials::new(
            self.codec.decrypt(&record.client_id)?,
            self.codec.decrypt(&record.client_secret)?,
            self.codec.decrypt(&record.tenant_id)?,
        ))
    }

    /// True iff a loadable record exists with all three fields non-empty.
    pub fn is_complete(&self) -> Result<bool, ConfigError> {
        Ok(self.load()?.is_complete())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> ConfigStore {
        ConfigStore::new(dir.path().join("config.json"), SecretCodec::new(&[1u8; 32]))
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let creds = TenantCredentials::new("client-x", "secret-y", "tenant-z");
        store.save(&creds).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.client_id, "client-x");
        assert_eq!(loaded.client_secret.expose_secret(), "secret-y");
        assert_eq!(loaded.tenant_id, "tenant-z");
        assert!(store.is_complete().unwrap());
    }

    #[test]
    fn on_disk_record_is_not_plaintext() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store
            .save(&TenantCredentials::new("client-x", "secret-y", "tenant-z"))
            .unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(!raw.contains("secret-y"));
        assert!(!raw.contains("client-x"));
    }

    #[test]
    fn missing_file_is_empty_config_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let creds = store.load().unwrap();
        assert!(!creds.is_complete());
        assert_eq!(creds.client_id, "");
    }

    #[test]
    fn wrong_key_surfaces_a_decryption_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        ConfigStore::new(&path, SecretCodec::new(&[1u8; 32]))
            .save(&TenantCredentials::new("a", "b", "c"))
            .unwrap();

        let rotated = ConfigStore::new(&path, SecretCodec::new(&[2u8; 32]));
        let err = rotated.load().unwrap_err();
        assert!(matches!(err, ConfigError::Decryption { .. }), "{err}");
    }

    #[test]
    fn malformed_json_fails_loudly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = ConfigStore::new(&path, SecretCodec::new(&[1u8; 32]));
        let err = store.load().unwrap_err();
        assert!(matches!(err, ConfigError::Malformed(_)), "{err}");
    }

    #[test]
    fn save_overwrites_the_whole_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.save(&TenantCredentials::new("one", "one", "one")).unwrap();
        store.save(&TenantCredentials::new("two", "two", "two")).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.client_id, "two");
    }
}
