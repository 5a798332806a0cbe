// ── Room registry ──
//
// The locally persisted, user-curated room list. The file is the single
// source of truth for which rooms exist locally; every mutation is a
// whole-file replace through a temp file + rename, serialized by one
// async mutex (single-writer queue).
//
// Reconciliation policy: the remote directory owns the room catalog,
// the registry owns curation. On refresh every field is overwritten
// from remote except `is_displayed`, which is carried forward by
// id-or-email match.

use std::path::{Path, PathBuf};

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::connection::ConnectionManager;
use crate::directory::{Directory, DirectoryConnector};
use crate::error::CoreError;
use crate::model::{Room, RoomPatch};

/// Persistent registry of curated rooms.
pub struct RoomRegistry {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl RoomRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Registry at the platform-default location (`data_dir()/rooms.json`).
    pub fn at_default_path() -> Self {
        Self::new(roomcast_config::rooms_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// All persisted rooms, in insertion order; empty if no file exists.
    pub fn list(&self) -> Result<Vec<Room>, CoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw = std::fs::read_to_string(&self.path)?;
        serde_json::from_str(&raw).map_err(|e| CoreError::Registry {
            message: format!("room file is malformed: {e}"),
        })
    }

    /// The curated subset shown on the dashboard.
    pub fn list_displayed(&self) -> Result<Vec<Room>, CoreError> {
        Ok(self.list()?.into_iter().filter(|r| r.is_displayed).collect())
    }

    // ── Local mutations ──────────────────────────────────────────────

    /// Append a room, enforcing uniqueness over both natural keys:
    /// exact `id` and case-insensitive `email_address`.
    pub async fn add(&self, room: Room) -> Result<(), CoreError> {
        let _guard = self.write_lock.lock().await;
        let mut rooms = self.list()?;

        if rooms
            .iter()
            .any(|r| r.id == room.id || r.matches_email(&room.email_address))
        {
            return Err(CoreError::DuplicateRoom {
                identifier: format!("{} / {}", room.id, room.email_address),
            });
        }

        rooms.push(room);
        self.persist(&rooms)
    }

    /// Remove by id. Idempotent — removing an absent room is a no-op.
    pub async fn remove(&self, room_id: &str) -> Result<(), CoreError> {
        let _guard = self.write_lock.lock().await;
        let mut rooms = self.list()?;
        rooms.retain(|r| r.id != room_id);
        self.persist(&rooms)
    }

    /// Shallow-merge a patch into the room with the given id.
    pub async fn update(&self, room_id: &str, patch: RoomPatch) -> Result<Room, CoreError> {
        let _guard = self.write_lock.lock().await;
        let mut rooms = self.list()?;

        let room = rooms
            .iter_mut()
            .find(|r| r.id == room_id)
            .ok_or_else(|| CoreError::RoomNotFound {
                identifier: room_id.to_owned(),
            })?;

        patch.apply_to(room);
        let updated = room.clone();
        self.persist(&rooms)?;
        Ok(updated)
    }

    /// Flip a room's curation flag; returns the new value.
    pub async fn toggle_display(&self, room_id: &str) -> Result<bool, CoreError> {
        let _guard = self.write_lock.lock().await;
        let mut rooms = self.list()?;

        let room = rooms
            .iter_mut()
            .find(|r| r.id == room_id)
            .ok_or_else(|| CoreError::RoomNotFound {
                identifier: room_id.to_owned(),
            })?;

        room.is_displayed = !room.is_displayed;
        let displayed = room.is_displayed;
        self.persist(&rooms)?;
        Ok(displayed)
    }

    // ── Directory-backed operations ──────────────────────────────────

    /// Look a room up in the tenant by email (case-insensitive) and map
    /// it into the local shape with curation off. Readiness failures
    /// propagate their reason; an unknown email is a not-found error
    /// naming it.
    pub async fn validate_against_directory<C: DirectoryConnector>(
        &self,
        connection: &ConnectionManager<C>,
        email: &str,
    ) -> Result<Room, CoreError> {
        let client = connection.ready_client().await?;
        let places = client.list_room_resources().await?;

        places
            .into_iter()
            .find(|p| {
                p.email_address
                    .as_deref()
                    .is_some_and(|e| e.eq_ignore_ascii_case(email))
            })
            .map(Room::from)
            .ok_or_else(|| CoreError::RoomNotFound {
                identifier: email.to_owned(),
            })
    }

    /// Validate, then add — failing fast at whichever step fails, so a
    /// room that doesn't exist in the tenant never touches the file.
    pub async fn add_with_validation<C: DirectoryConnector>(
        &self,
        connection: &ConnectionManager<C>,
        email: &str,
    ) -> Result<Room, CoreError> {
        let room = self.validate_against_directory(connection, email).await?;
        self.add(room.clone()).await?;
        info!(room = %room.email_address, "room validated and added");
        Ok(room)
    }

    /// Reconcile the registry against the tenant's full room catalog.
    ///
    /// Remote wins on every field; only `is_displayed` is carried
    /// forward from an existing entry matched by id or email. Rooms
    /// gone from the tenant disappear locally; new rooms arrive with
    /// display off.
    pub async fn refresh_from_directory<C: DirectoryConnector>(
        &self,
        connection: &ConnectionManager<C>,
    ) -> Result<Vec<Room>, CoreError> {
        let client = connection.ready_client().await?;
        let places = client.list_room_resources().await?;

        let _guard = self.write_lock.lock().await;
        let current = self.list()?;

        let merged: Vec<Room> = places
            .into_iter()
            .map(Room::from)
            .map(|mut fetched| {
                fetched.is_displayed = current
                    .iter()
                    .find(|r| r.id == fetched.id || r.matches_email(&fetched.email_address))
                    .is_some_and(|r| r.is_displayed);
                fetched
            })
            .collect();

        self.persist(&merged)?;
        debug!(count = merged.len(), "registry refreshed from directory");
        Ok(merged)
    }

    // ── Persistence ──────────────────────────────────────────────────

    /// Whole-file replace via temp file + rename. Callers hold the
    /// write lock.
    fn persist(&self, rooms: &[Room]) -> Result<(), CoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        let body = serde_json::to_vec_pretty(rooms).map_err(|e| CoreError::Registry {
            message: format!("failed to serialize rooms: {e}"),
        })?;
        std::fs::write(&tmp, body)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
