// ── Tenant connection lifecycle ──
//
// One explicit state machine replaces ad hoc "try initialize, then try
// validate" blocks: every caller goes through ensure_ready(). The phase
// lives behind a single async mutex, which also serializes concurrent
// connection attempts.

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use roomcast_config::{ConfigError, ConfigStore, TenantCredentials};

use crate::directory::{Directory, DirectoryConnector};
use crate::error::{ConnectionError, CoreError};

// ── ConnectionState ──────────────────────────────────────────────────

/// Connection state observable by consumers.
///
/// Recomputed per process lifetime — never persisted. `Failed` is not
/// terminal: re-saving credentials and re-running `ensure_ready()`
/// recovers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    /// No usable credentials (or not yet initialized).
    Unconfigured,
    /// A session is bound but not yet proven against the tenant.
    Initialized,
    /// The tenant accepted a probe; the session is usable.
    Validated,
    /// Initialization or validation failed, with the reason.
    Failed(ConnectionError),
}

/// Internal phase: like [`ConnectionState`] but carrying the bound session.
enum Phase<D> {
    Unconfigured,
    Initialized(D),
    Validated(D),
    Failed(ConnectionError),
}

// ── ConnectionManager ────────────────────────────────────────────────

/// Owns the credential-to-ready-session lifecycle.
///
/// Generic over the [`DirectoryConnector`] so tests drive the machine
/// with fake directories. All public operations return tagged results;
/// nothing here panics or lets a lower layer crash the process.
pub struct ConnectionManager<C: DirectoryConnector> {
    store: ConfigStore,
    connector: C,
    phase: Mutex<Phase<C::Client>>,
}

impl<C: DirectoryConnector> ConnectionManager<C> {
    /// Create an unconfigured manager. No I/O happens until the first
    /// lifecycle operation.
    pub fn new(store: ConfigStore, connector: C) -> Self {
        Self {
            store,
            connector,
            phase: Mutex::new(Phase::Unconfigured),
        }
    }

    /// The underlying credential store.
    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    // ── Credential administration ────────────────────────────────────

    /// Persist a whole credential record and reset the lifecycle —
    /// the next `ensure_ready()` re-initializes against the new record.
    pub async fn save_credentials(&self, credentials: &TenantCredentials) -> Result<(), CoreError> {
        self.store
            .save(credentials)
            .map_err(|e| CoreError::Registry {
                message: format!("failed to save credentials: {e}"),
            })?;

        *self.phase.lock().await = Phase::Unconfigured;
        info!("tenant credentials replaced; connection reset");
        Ok(())
    }

    // ── Lifecycle operations ─────────────────────────────────────────

    /// Load credentials and bind a session.
    ///
    /// Incomplete configuration fails without leaving `Unconfigured`;
    /// an undecryptable store is a distinct error, not "empty config".
    pub async fn initialize(&self) -> Result<(), ConnectionError> {
        let mut phase = self.phase.lock().await;
        let client = self.bind_session(&mut phase)?;
        *phase = Phase::Initialized(client);
        Ok(())
    }

    /// Prove the bound session against the tenant with a cheap probe.
    pub async fn validate(&self) -> Result<(), ConnectionError> {
        let mut phase = self.phase.lock().await;

        let client = match &*phase {
            Phase::Initialized(c) | Phase::Validated(c) => c.clone(),
            Phase::Unconfigured | Phase::Failed(_) => {
                return Err(ConnectionError::Configuration {
                    message: "connection is not initialized".into(),
                });
            }
        };

        self.probe(&mut phase, client).await
    }

    /// The composite operation every caller uses: initialize then
    /// validate, short-circuiting on the first failure. Idempotent —
    /// an already-validated session returns immediately.
    pub async fn ensure_ready(&self) -> Result<(), ConnectionError> {
        let mut phase = self.phase.lock().await;

        if let Phase::Validated(_) = &*phase {
            return Ok(());
        }

        let client = self.bind_session(&mut phase)?;
        *phase = Phase::Initialized(client.clone());
        self.probe(&mut phase, client).await
    }

    /// Ensure readiness and hand out the bound session for directory
    /// calls. This is what the registry and dashboard consume.
    pub async fn ready_client(&self) -> Result<C::Client, ConnectionError> {
        let mut phase = self.phase.lock().await;

        if let Phase::Validated(client) = &*phase {
            return Ok(client.clone());
        }

        let client = self.bind_session(&mut phase)?;
        *phase = Phase::Initialized(client.clone());
        self.probe(&mut phase, client.clone()).await?;
        Ok(client)
    }

    // ── Pure queries (no network, no side effects) ───────────────────

    /// True only in the `Validated` phase.
    pub async fn is_ready(&self) -> bool {
        matches!(&*self.phase.lock().await, Phase::Validated(_))
    }

    /// The observable state, with the failure reason if any.
    pub async fn state(&self) -> ConnectionState {
        match &*self.phase.lock().await {
            Phase::Unconfigured => ConnectionState::Unconfigured,
            Phase::Initialized(_) => ConnectionState::Initialized,
            Phase::Validated(_) => ConnectionState::Validated,
            Phase::Failed(reason) => ConnectionState::Failed(reason.clone()),
        }
    }

    // ── Internals ────────────────────────────────────────────────────

    /// Load + check + bind. Leaves the phase untouched on configuration
    /// errors (still effectively unconfigured) so the caller decides.
    fn bind_session(&self, phase: &mut Phase<C::Client>) -> Result<C::Client, ConnectionError> {
        let credentials = match self.store.load() {
            Ok(c) => c,
            Err(ConfigError::Decryption { reason }) => {
                let err = ConnectionError::Decryption { message: reason };
                *phase = Phase::Failed(err.clone());
                return Err(err);
            }
            Err(e) => {
                let err = ConnectionError::Configuration {
                    message: format!("credential store unreadable: {e}"),
                };
                *phase = Phase::Failed(err.clone());
                return Err(err);
            }
        };

        if !credentials.is_complete() {
            *phase = Phase::Unconfigured;
            return Err(ConnectionError::Configuration {
                message: "tenant credentials are missing or incomplete".into(),
            });
        }

        let client = self.connector.connect(&credentials).inspect_err(|e| {
            *phase = Phase::Failed(e.clone());
        })?;

        debug!("directory session bound");
        Ok(client)
    }

    /// Run the probe and settle the phase on its outcome.
    async fn probe(
        &self,
        phase: &mut Phase<C::Client>,
        client: C::Client,
    ) -> Result<(), ConnectionError> {
        match client.probe_identity().await {
            Ok(()) => {
                *phase = Phase::Validated(client);
                info!("tenant connection validated");
                Ok(())
            }
            Err(e) => {
                let reason = classify_probe_failure(&e);
                warn!(error = %e, "tenant probe failed");
                *phase = Phase::Failed(reason.clone());
                Err(reason)
            }
        }
    }
}

/// Map a probe failure onto the connection taxonomy: authorization
/// rejections mean bad credentials; everything else is the directory
/// being unreachable or unwell.
fn classify_probe_failure(err: &roomcast_api::Error) -> ConnectionError {
    if err.is_unauthorized() {
        ConnectionError::InvalidCredentials {
            message: err.to_string(),
        }
    } else {
        ConnectionError::Unreachable {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use roomcast_config::SecretCodec;

    use super::*;
    use crate::test_support::{StubConnector, StubDirectory};

    fn manager_in(
        dir: &tempfile::TempDir,
        stub: StubDirectory,
    ) -> ConnectionManager<StubConnector> {
        let store = ConfigStore::new(dir.path().join("config.json"), SecretCodec::new(&[3u8; 32]));
        ConnectionManager::new(store, StubConnector::new(stub))
    }

    fn complete_credentials() -> TenantCredentials {
        TenantCredentials::new("x", "y", "z")
    }

    #[tokio::test]
    async fn unconfigured_initialize_fails_with_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_in(&dir, StubDirectory::default());

        let err = manager.initialize().await.unwrap_err();
        assert!(matches!(err, ConnectionError::Configuration { .. }), "{err}");
        assert_eq!(manager.state().await, ConnectionState::Unconfigured);
    }

    #[tokio::test]
    async fn ensure_ready_walks_to_validated() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_in(&dir, StubDirectory::default());
        manager.save_credentials(&complete_credentials()).await.unwrap();

        manager.ensure_ready().await.unwrap();
        assert!(manager.is_ready().await);
        assert_eq!(manager.state().await, ConnectionState::Validated);
    }

    #[tokio::test]
    async fn unauthorized_probe_fails_with_invalid_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_in(&dir, StubDirectory::default().with_probe_unauthorized());
        manager.save_credentials(&complete_credentials()).await.unwrap();

        let err = manager.ensure_ready().await.unwrap_err();
        assert!(
            matches!(err, ConnectionError::InvalidCredentials { .. }),
            "{err}"
        );
        assert!(!manager.is_ready().await);
        assert!(matches!(manager.state().await, ConnectionState::Failed(_)));
    }

    #[tokio::test]
    async fn failed_state_recovers_after_resaving_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let stub = StubDirectory::default().with_probe_unauthorized();
        let manager = manager_in(&dir, stub.clone());
        manager.save_credentials(&complete_credentials()).await.unwrap();
        assert!(manager.ensure_ready().await.is_err());

        // Operator fixes the app registration; same stored credentials
        // now pass the probe.
        stub.clear_probe_failure();
        manager.save_credentials(&complete_credentials()).await.unwrap();
        manager.ensure_ready().await.unwrap();
        assert!(manager.is_ready().await);
    }

    #[tokio::test]
    async fn ensure_ready_is_idempotent_once_validated() {
        let dir = tempfile::tempdir().unwrap();
        let stub = StubDirectory::default();
        let manager = manager_in(&dir, stub.clone());
        manager.save_credentials(&complete_credentials()).await.unwrap();

        manager.ensure_ready().await.unwrap();
        manager.ensure_ready().await.unwrap();
        assert_eq!(stub.probe_count(), 1, "validated session is not re-probed");
    }

    #[tokio::test]
    async fn incomplete_credentials_never_reach_the_probe() {
        let dir = tempfile::tempdir().unwrap();
        let stub = StubDirectory::default();
        let manager = manager_in(&dir, stub.clone());
        manager
            .save_credentials(&TenantCredentials::new("x", "", "z"))
            .await
            .unwrap();

        let err = manager.ensure_ready().await.unwrap_err();
        assert!(matches!(err, ConnectionError::Configuration { .. }), "{err}");
        assert_eq!(stub.probe_count(), 0);
    }

    #[tokio::test]
    async fn validate_without_initialize_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_in(&dir, StubDirectory::default());

        let err = manager.validate().await.unwrap_err();
        assert!(matches!(err, ConnectionError::Configuration { .. }), "{err}");
    }
}
