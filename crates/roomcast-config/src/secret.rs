// At-rest encryption of individual credential fields.
//
// Envelope format: `base64(nonce) ":" base64(ciphertext)` with a fresh
// random 96-bit nonce per encryption, so equal plaintexts never produce
// equal envelopes. AES-256-GCM authenticates the ciphertext — a wrong
// key or a tampered envelope fails decryption instead of yielding junk.

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, Key, KeyInit, Nonce};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use rand::RngCore;
use rand::rngs::OsRng;

use crate::{ConfigError, SECRET_KEY_ENV};

const NONCE_LEN: usize = 12;

/// Symmetric codec for small secrets, keyed once per process.
#[derive(Clone)]
pub struct SecretCodec {
    cipher: Aes256Gcm,
}

impl SecretCodec {
    /// Build from a raw 32-byte key.
    pub fn new(key: &[u8; 32]) -> Self {
        Self {
            cipher: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key)),
        }
    }

    /// Build from the `ROOMCAST_SECRET_KEY` environment variable
    /// (base64-encoded 32 bytes). Call once at startup; failure here is
    /// a configuration error, not a per-request condition.
    pub fn from_env() -> Result<Self, ConfigError> {
        let encoded = std::env::var(SECRET_KEY_ENV).map_err(|_| ConfigError::MissingKey)?;
        let bytes = BASE64
            .decode(encoded.trim())
            .map_err(|e| ConfigError::InvalidKey {
                reason: format!("not valid base64: {e}"),
            })?;
        let key: [u8; 32] = bytes.try_into().map_err(|b: Vec<u8>| ConfigError::InvalidKey {
            reason: format!("expected 32 bytes, got {}", b.len()),
        })?;
        Ok(Self::new(&key))
    }

    /// Encrypt a plaintext into an envelope string.
    pub fn encrypt(&self, plaintext: &str) -> String {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        // Encryption with a valid key and nonce cannot fail for in-memory
        // buffers; treat the unreachable branch as an empty envelope guard.
        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext.as_bytes())
            .unwrap_or_default();

        format!("{}:{}", BASE64.encode(nonce_bytes), BASE64.encode(ciphertext))
    }

    /// Decrypt an envelope back to the original plaintext.
    ///
    /// Any malformed envelope, wrong key, or failed authentication tag
    /// yields [`ConfigError::Decryption`] — callers must not fold this
    /// into "empty config".
    pub fn decrypt(&self, envelope: &str) -> Result<String, ConfigError> {
        let (nonce_b64, ct_b64) = envelope.split_once(':').ok_or_else(|| {
            ConfigError::Decryption {
                reason: "envelope missing ':' separator".into(),
            }
        })?;

        let nonce_bytes = BASE64.decode(nonce_b64).map_err(|e| ConfigError::Decryption {
            reason: format!("bad nonce encoding: {e}"),
        })?;
        if nonce_bytes.len() != NONCE_LEN {
            return Err(ConfigError::Decryption {
                reason: format!("expected {NONCE_LEN}-byte nonce, got {}", nonce_bytes.len()),
            });
        }

        let ciphertext = BASE64.decode(ct_b64).map_err(|e| ConfigError::Decryption {
            reason: format!("bad ciphertext encoding: {e}"),
        })?;

        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(&nonce_bytes), ciphertext.as_ref())
            .map_err(|_| ConfigError::Decryption {
                reason: "authentication failed (wrong key or corrupt data)".into(),
            })?;

        String::from_utf8(plaintext).map_err(|e| ConfigError::Decryption {
            reason: format!("plaintext is not UTF-8: {e}"),
        })
    }
}

impl std::fmt::Debug for SecretCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretCodec").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn codec() -> SecretCodec {
        SecretCodec::new(&[7u8; 32])
    }

    #[test]
    fn round_trip_recovers_plaintext() {
        let c = codec();
        for s in ["", "a", "client-secret-~!@#", "日本語テキスト"] {
            let envelope = c.encrypt(s);
            assert_eq!(c.decrypt(&envelope).unwrap(), s);
        }
    }

    #[test]
    fn same_plaintext_yields_different_envelopes() {
        let c = codec();
        let a = c.encrypt("tenant-id");
        let b = c.encrypt("tenant-id");
        assert_ne!(a, b, "fresh nonce per encryption");
    }

    #[test]
    fn envelope_has_two_base64_parts() {
        let envelope = codec().encrypt("x");
        let (nonce, ct) = envelope.split_once(':').unwrap();
        assert_eq!(BASE64.decode(nonce).unwrap().len(), NONCE_LEN);
        assert!(!BASE64.decode(ct).unwrap().is_empty());
    }

    #[test]
    fn malformed_envelope_is_a_decryption_error() {
        let c = codec();
        for bad in ["", "no-separator", "!!!:???", "YWJj:YWJj"] {
            let err = c.decrypt(bad).unwrap_err();
            assert!(matches!(err, ConfigError::Decryption { .. }), "input {bad:?}: {err}");
        }
    }

    #[test]
    fn wrong_key_is_a_decryption_error() {
        let envelope = codec().encrypt("secret");
        let other = SecretCodec::new(&[8u8; 32]);
        let err = other.decrypt(&envelope).unwrap_err();
        assert!(matches!(err, ConfigError::Decryption { .. }));
    }
}
