use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A meeting room in the local registry.
///
/// `id` and `email_address` are both natural keys; the registry keeps
/// them unique across all entries (id compared exactly, email
/// case-insensitively). Everything except `is_displayed` is owned by
/// the remote room catalog and overwritten on refresh — `is_displayed`
/// is purely local curation state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    pub display_name: String,
    pub email_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_type: Option<String>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub is_displayed: bool,
}

impl Room {
    /// Case-insensitive email match (the registry's standard comparison).
    pub fn matches_email(&self, email: &str) -> bool {
        self.email_address.eq_ignore_ascii_case(email)
    }
}

/// A shallow partial update for a [`Room`]. Fields left `None` are
/// untouched; present fields replace the stored value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoomPatch {
    pub display_name: Option<String>,
    pub email_address: Option<String>,
    pub phone: Option<String>,
    pub building: Option<String>,
    pub floor: Option<String>,
    pub capacity: Option<u32>,
    pub booking_type: Option<String>,
    pub tags: Option<BTreeSet<String>>,
    pub is_displayed: Option<bool>,
}

impl RoomPatch {
    /// Merge this patch into a room, field by field.
    pub fn apply_to(self, room: &mut Room) {
        if let Some(v) = self.display_name {
            room.display_name = v;
        }
        if let Some(v) = self.email_address {
            room.email_address = v;
        }
        if let Some(v) = self.phone {
            room.phone = Some(v);
        }
        if let Some(v) = self.building {
            room.building = Some(v);
        }
        if let Some(v) = self.floor {
            room.floor = Some(v);
        }
        if let Some(v) = self.capacity {
            room.capacity = Some(v);
        }
        if let Some(v) = self.booking_type {
            room.booking_type = Some(v);
        }
        if let Some(v) = self.tags {
            room.tags = v;
        }
        if let Some(v) = self.is_displayed {
            room.is_displayed = v;
        }
    }
}
