use serde::{Deserialize, Serialize};

/// A calendar event on a room's agenda.
///
/// Read-only and never persisted — fetched fresh per dashboard render.
/// Timestamps stay as the ISO-8601 strings the directory returned; the
/// display layer owns formatting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgendaEvent {
    pub id: String,
    pub subject: String,
    /// The room this event belongs to.
    pub email_address: String,
    pub location: AgendaLocation,
    pub start: AgendaTime,
    pub end: AgendaTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgendaLocation {
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgendaTime {
    pub date_time: String,
}
