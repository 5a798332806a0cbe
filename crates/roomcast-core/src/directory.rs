// ── Directory seam ──
//
// The connection manager, registry, and dashboard talk to the tenant
// through these two traits instead of the concrete API client, so tests
// inject in-memory fakes and production binds `roomcast_api`.

use std::future::Future;

use chrono::{DateTime, Utc};
use secrecy::SecretString;

use roomcast_api::{DirectoryUser, EventRecord, RoomResource, TransportConfig};
use roomcast_config::TenantCredentials;

use crate::error::ConnectionError;

/// A bound, authorized-or-not session against the tenant directory.
///
/// All operations are single-attempt; retry policy belongs to callers.
pub trait Directory: Clone + Send + Sync + 'static {
    /// Cheap call proving the session is authorized.
    fn probe_identity(&self) -> impl Future<Output = Result<(), roomcast_api::Error>> + Send;

    fn list_users(
        &self,
        page_size: u32,
        order_by: &str,
    ) -> impl Future<Output = Result<Vec<DirectoryUser>, roomcast_api::Error>> + Send;

    fn list_room_resources(
        &self,
    ) -> impl Future<Output = Result<Vec<RoomResource>, roomcast_api::Error>> + Send;

    fn list_events_for_resource(
        &self,
        email_address: &str,
        day_start: DateTime<Utc>,
        day_end: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<EventRecord>, roomcast_api::Error>> + Send;
}

impl Directory for roomcast_api::DirectoryClient {
    async fn probe_identity(&self) -> Result<(), roomcast_api::Error> {
        Self::probe_identity(self).await
    }

    async fn list_users(
        &self,
        page_size: u32,
        order_by: &str,
    ) -> Result<Vec<DirectoryUser>, roomcast_api::Error> {
        Self::list_users(self, page_size, order_by).await
    }

    async fn list_room_resources(&self) -> Result<Vec<RoomResource>, roomcast_api::Error> {
        Self::list_room_resources(self).await
    }

    async fn list_events_for_resource(
        &self,
        email_address: &str,
        day_start: DateTime<Utc>,
        day_end: DateTime<Utc>,
    ) -> Result<Vec<EventRecord>, roomcast_api::Error> {
        Self::list_events_for_resource(self, email_address, day_start, day_end).await
    }
}

/// Builds a [`Directory`] session from a complete credential record.
///
/// Construction binds the session without any network I/O — validation
/// happens later via `probe_identity`.
pub trait DirectoryConnector: Send + Sync + 'static {
    type Client: Directory;

    fn connect(&self, credentials: &TenantCredentials) -> Result<Self::Client, ConnectionError>;
}

/// The production connector: binds `roomcast_api::DirectoryClient`
/// sessions over the shared transport configuration.
#[derive(Debug, Clone, Default)]
pub struct GraphConnector {
    transport: TransportConfig,
}

impl GraphConnector {
    pub fn new(transport: TransportConfig) -> Self {
        Self { transport }
    }
}

impl DirectoryConnector for GraphConnector {
    type Client = roomcast_api::DirectoryClient;

    fn connect(&self, credentials: &TenantCredentials) -> Result<Self::Client, ConnectionError> {
        use secrecy::ExposeSecret;

        roomcast_api::DirectoryClient::new(
            &credentials.tenant_id,
            &credentials.client_id,
            SecretString::from(credentials.client_secret.expose_secret().to_owned()),
            &self.transport,
        )
        .map_err(|e| ConnectionError::Configuration {
            message: format!("failed to construct directory client: {e}"),
        })
    }
}
