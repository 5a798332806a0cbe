// In-memory fakes for the directory seam, shared by the unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use roomcast_api::{DirectoryUser, EventRecord, RoomResource};
use roomcast_config::TenantCredentials;

use crate::directory::{Directory, DirectoryConnector};
use crate::error::ConnectionError;

#[derive(Default)]
struct StubState {
    probe_unauthorized: bool,
    users: Vec<DirectoryUser>,
    rooms: Vec<RoomResource>,
    events: HashMap<String, Vec<EventRecord>>,
    fail_events_for: HashSet<String>,
}

/// A configurable in-memory [`Directory`]. Clones share state, so tests
/// can reconfigure the stub after handing it to a manager.
#[derive(Clone, Default)]
pub(crate) struct StubDirectory {
    state: Arc<Mutex<StubState>>,
    probes: Arc<AtomicUsize>,
}

impl StubDirectory {
    pub fn with_probe_unauthorized(self) -> Self {
        self.lock().probe_unauthorized = true;
        self
    }

    pub fn with_rooms(self, rooms: Vec<RoomResource>) -> Self {
        self.lock().rooms = rooms;
        self
    }

    pub fn with_events(self, email: &str, events: Vec<EventRecord>) -> Self {
        self.lock().events.insert(email.to_owned(), events);
        self
    }

    pub fn with_failing_events_for(self, email: &str) -> Self {
        self.lock().fail_events_for.insert(email.to_owned());
        self
    }

    pub fn clear_probe_failure(&self) {
        self.lock().probe_unauthorized = false;
    }

    pub fn set_rooms(&self, rooms: Vec<RoomResource>) {
        self.lock().rooms = rooms;
    }

    pub fn set_users(&self, users: Vec<DirectoryUser>) {
        self.lock().users = users;
    }

    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StubState> {
        self.state.lock().expect("stub state poisoned")
    }
}

impl Directory for StubDirectory {
    async fn probe_identity(&self) -> Result<(), roomcast_api::Error> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        if self.lock().probe_unauthorized {
            return Err(roomcast_api::Error::Unauthorized {
                message: "AADSTS7000215: invalid client secret".into(),
            });
        }
        Ok(())
    }

    async fn list_users(
        &self,
        _page_size: u32,
        _order_by: &str,
    ) -> Result<Vec<DirectoryUser>, roomcast_api::Error> {
        Ok(self.lock().users.clone())
    }

    async fn list_room_resources(&self) -> Result<Vec<RoomResource>, roomcast_api::Error> {
        Ok(self.lock().rooms.clone())
    }

    async fn list_events_for_resource(
        &self,
        email_address: &str,
        _day_start: DateTime<Utc>,
        _day_end: DateTime<Utc>,
    ) -> Result<Vec<EventRecord>, roomcast_api::Error> {
        let state = self.lock();
        if state.fail_events_for.contains(email_address) {
            return Err(roomcast_api::Error::Api {
                message: "mailbox temporarily unavailable".into(),
                code: Some("MailboxNotEnabledForRESTAPI".into()),
                status: 503,
            });
        }
        Ok(state.events.get(email_address).cloned().unwrap_or_default())
    }
}

/// Connector returning clones of one shared [`StubDirectory`].
#[derive(Clone)]
pub(crate) struct StubConnector {
    client: StubDirectory,
}

impl StubConnector {
    pub fn new(client: StubDirectory) -> Self {
        Self { client }
    }
}

impl DirectoryConnector for StubConnector {
    type Client = StubDirectory;

    fn connect(&self, _credentials: &TenantCredentials) -> Result<Self::Client, ConnectionError> {
        Ok(self.client.clone())
    }
}

/// Shorthand for a remote room resource record.
pub(crate) fn room_resource(id: &str, name: &str, email: &str) -> RoomResource {
    RoomResource {
        id: Some(id.to_owned()),
        display_name: Some(name.to_owned()),
        email_address: Some(email.to_owned()),
        phone: None,
        building: None,
        floor: None,
        capacity: None,
        booking_type: None,
        tags: Vec::new(),
    }
}

/// Shorthand for a calendar event record.
pub(crate) fn event_record(id: &str, subject: &str, start: &str, end: &str) -> EventRecord {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "subject": subject,
        "location": { "displayName": "somewhere" },
        "start": { "dateTime": start, "timeZone": "UTC" },
        "end": { "dateTime": end, "timeZone": "UTC" },
    }))
    .expect("static event json")
}
