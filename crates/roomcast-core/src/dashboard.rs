// ── Dashboard assembly ──
//
// Read-time composition of the displayed rooms and their agendas for
// today. Nothing here is persisted. Failure isolation is the key
// invariant: a readiness failure aborts the whole render, but one
// room's calendar failing only empties that room's agenda.

use std::collections::HashMap;

use chrono::{DateTime, Days, Local, NaiveTime, TimeZone, Utc};
use serde::Serialize;
use tracing::warn;

use crate::connection::ConnectionManager;
use crate::convert;
use crate::directory::{Directory, DirectoryConnector};
use crate::error::CoreError;
use crate::model::{AgendaEvent, Room};
use crate::registry::RoomRegistry;

/// One fully assembled dashboard render: the curated rooms plus each
/// room's agenda for today, keyed by room id.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub rooms: Vec<Room>,
    pub agenda: HashMap<String, Vec<AgendaEvent>>,
}

/// A tenant user, trimmed to what the settings screen shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryUserSummary {
    pub id: String,
    pub display_name: String,
    pub email: String,
}

/// Assemble the dashboard: every displayed room with its agenda for
/// today. Requires a ready connection; per-room calendar failures are
/// logged and that room gets an empty agenda.
pub async fn assemble<C: DirectoryConnector>(
    connection: &ConnectionManager<C>,
    registry: &RoomRegistry,
) -> Result<Dashboard, CoreError> {
    let client = connection.ready_client().await?;
    let rooms = registry.list_displayed()?;
    let (day_start, day_end) = today_window();

    let mut agenda = HashMap::with_capacity(rooms.len());
    for room in &rooms {
        let events = match client
            .list_events_for_resource(&room.email_address, day_start, day_end)
            .await
        {
            Ok(records) => records
                .into_iter()
                .map(|r| convert::agenda_event(&room.email_address, r))
                .collect(),
            Err(e) => {
                warn!(room = %room.email_address, error = %e, "failed to fetch room agenda");
                Vec::new()
            }
        };
        agenda.insert(room.id.clone(), events);
    }

    Ok(Dashboard { rooms, agenda })
}

/// Today's agenda for a single room, without consulting the registry.
pub async fn events_for_room<C: DirectoryConnector>(
    connection: &ConnectionManager<C>,
    room_email: &str,
) -> Result<Vec<AgendaEvent>, CoreError> {
    let client = connection.ready_client().await?;
    let (day_start, day_end) = today_window();

    let records = client
        .list_events_for_resource(room_email, day_start, day_end)
        .await?;
    Ok(records
        .into_iter()
        .map(|r| convert::agenda_event(room_email, r))
        .collect())
}

/// Tenant users for the settings screen, with a readable fallback for
/// accounts without a mailbox.
pub async fn list_directory_users<C: DirectoryConnector>(
    connection: &ConnectionManager<C>,
    page_size: u32,
) -> Result<Vec<DirectoryUserSummary>, CoreError> {
    let client = connection.ready_client().await?;
    let users = client.list_users(page_size, "displayName").await?;

    Ok(users
        .into_iter()
        .map(|u| DirectoryUserSummary {
            id: u.id,
            display_name: u.display_name.unwrap_or_default(),
            email: u.mail.unwrap_or_else(|| "No email provided".to_owned()),
        })
        .collect())
}

/// [local midnight today, local midnight tomorrow), in UTC.
///
/// Agendas follow the wall clock where the displays hang, not UTC days.
fn today_window() -> (DateTime<Utc>, DateTime<Utc>) {
    let today = Local::now().date_naive();
    let tomorrow = today.checked_add_days(Days::new(1)).unwrap_or(today);
    (local_midnight_utc(today), local_midnight_utc(tomorrow))
}

/// Midnight of `date` in the local timezone, as UTC. Skipped or
/// ambiguous local midnights (DST transitions) resolve to the earliest
/// valid instant, falling back to UTC midnight.
fn local_midnight_utc(date: chrono::NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    Local
        .from_local_datetime(&midnight)
        .earliest()
        .map_or_else(|| Utc.from_utc_datetime(&midnight), |dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use pretty_assertions::assert_eq;
    use roomcast_config::{ConfigStore, SecretCodec, TenantCredentials};

    use super::*;
    use crate::error::ConnectionError;
    use crate::model::RoomPatch;
    use crate::test_support::{StubConnector, StubDirectory, event_record, room_resource};

    async fn ready_connection(
        dir: &tempfile::TempDir,
        stub: StubDirectory,
    ) -> ConnectionManager<StubConnector> {
        let store = ConfigStore::new(dir.path().join("config.json"), SecretCodec::new(&[7u8; 32]));
        let manager = ConnectionManager::new(store, StubConnector::new(stub));
        manager
            .save_credentials(&TenantCredentials::new("x", "y", "z"))
            .await
            .unwrap();
        manager
    }

    async fn seeded_registry(dir: &tempfile::TempDir, emails: &[&str]) -> RoomRegistry {
        let registry = RoomRegistry::new(dir.path().join("rooms.json"));
        for (i, email) in emails.iter().enumerate() {
            let room = crate::model::Room::from(room_resource(&format!("r{i}"), "Room", email));
            registry.add(room).await.unwrap();
            let patch = RoomPatch {
                is_displayed: Some(true),
                ..RoomPatch::default()
            };
            registry.update(&format!("r{i}"), patch).await.unwrap();
        }
        registry
    }

    #[tokio::test]
    async fn assemble_keys_agendas_by_room_id() {
        let dir = tempfile::tempdir().unwrap();
        let stub = StubDirectory::default().with_events(
            "a@x.com",
            vec![event_record(
                "e1",
                "Standup",
                "2026-08-30T09:00:00",
                "2026-08-30T09:15:00",
            )],
        );
        let connection = ready_connection(&dir, stub).await;
        let registry = seeded_registry(&dir, &["a@x.com"]).await;

        let dashboard = assemble(&connection, &registry).await.unwrap();

        assert_eq!(dashboard.rooms.len(), 1);
        let agenda = &dashboard.agenda["r0"];
        assert_eq!(agenda.len(), 1);
        assert_eq!(agenda[0].subject, "Standup");
        assert_eq!(agenda[0].email_address, "a@x.com");
    }

    #[tokio::test]
    async fn one_failing_calendar_does_not_poison_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let stub = StubDirectory::default()
            .with_events(
                "good@x.com",
                vec![event_record(
                    "e1",
                    "Review",
                    "2026-08-30T10:00:00",
                    "2026-08-30T11:00:00",
                )],
            )
            .with_failing_events_for("bad@x.com");
        let connection = ready_connection(&dir, stub).await;
        let registry = seeded_registry(&dir, &["good@x.com", "bad@x.com"]).await;

        let dashboard = assemble(&connection, &registry).await.unwrap();

        assert_eq!(dashboard.rooms.len(), 2);
        assert_eq!(dashboard.agenda["r0"].len(), 1);
        assert_eq!(dashboard.agenda["r1"], Vec::new());
    }

    #[tokio::test]
    async fn assemble_aborts_on_readiness_failure() {
        let dir = tempfile::tempdir().unwrap();
        let stub = StubDirectory::default().with_probe_unauthorized();
        let connection = ready_connection(&dir, stub).await;
        let registry = seeded_registry(&dir, &["a@x.com"]).await;

        let err = assemble(&connection, &registry).await.unwrap_err();
        assert!(
            matches!(
                err,
                CoreError::Connection(ConnectionError::InvalidCredentials { .. })
            ),
            "{err}"
        );
    }

    #[tokio::test]
    async fn hidden_rooms_are_not_rendered_or_fetched() {
        let dir = tempfile::tempdir().unwrap();
        let stub = StubDirectory::default().with_failing_events_for("hidden@x.com");
        let connection = ready_connection(&dir, stub).await;

        let registry = RoomRegistry::new(dir.path().join("rooms.json"));
        let room = crate::model::Room::from(room_resource("r1", "Hidden", "hidden@x.com"));
        registry.add(room).await.unwrap();

        let dashboard = assemble(&connection, &registry).await.unwrap();
        assert_eq!(dashboard.rooms, Vec::new());
        assert!(dashboard.agenda.is_empty());
    }

    #[tokio::test]
    async fn events_for_room_propagates_directory_failure() {
        let dir = tempfile::tempdir().unwrap();
        let stub = StubDirectory::default().with_failing_events_for("bad@x.com");
        let connection = ready_connection(&dir, stub).await;

        let err = events_for_room(&connection, "bad@x.com").await.unwrap_err();
        assert!(matches!(err, CoreError::Directory { .. }), "{err}");
    }

    #[tokio::test]
    async fn users_without_mail_get_a_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let stub = StubDirectory::default();
        stub.set_users(vec![
            serde_json::from_value(serde_json::json!({
                "id": "u1",
                "displayName": "Ada",
                "mail": "ada@x.com",
            }))
            .unwrap(),
            serde_json::from_value(serde_json::json!({
                "id": "u2",
                "displayName": "Service Account",
            }))
            .unwrap(),
        ]);
        let connection = ready_connection(&dir, stub).await;

        let users = list_directory_users(&connection, 100).await.unwrap();
        assert_eq!(users[0].email, "ada@x.com");
        assert_eq!(users[1].email, "No email provided");
    }

    #[test]
    fn today_window_spans_one_day() {
        let (start, end) = today_window();
        assert_eq!(end - start, chrono::TimeDelta::days(1));
    }
}
