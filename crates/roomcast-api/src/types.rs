// Wire types for the directory API.
//
// These mirror the JSON the tenant returns verbatim; `roomcast-core`
// converts them into its own domain model. Everything optional stays
// optional here — defaulting happens at the conversion seam.

use serde::Deserialize;

/// The `{ "value": [...] }` collection envelope every listing returns.
#[derive(Debug, Clone, Deserialize)]
pub struct Collection<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
}

/// A user record from the users listing.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryUser {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub mail: Option<String>,
}

/// A bookable room resource from the places listing.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomResource {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email_address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub building: Option<String>,
    #[serde(default)]
    pub floor: Option<String>,
    #[serde(default)]
    pub capacity: Option<u32>,
    #[serde(default)]
    pub booking_type: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A calendar event from a room's calendar view.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub id: String,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub location: Option<EventLocation>,
    #[serde(default)]
    pub start: Option<EventTime>,
    #[serde(default)]
    pub end: Option<EventTime>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventLocation {
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Directory timestamps arrive as ISO-8601 strings plus a zone name.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTime {
    pub date_time: String,
    #[serde(default)]
    pub time_zone: Option<String>,
}
