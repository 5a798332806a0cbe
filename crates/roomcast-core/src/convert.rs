// ── Wire → domain conversion ──
//
// The directory's optional-everything records become canonical domain
// types here. Defaulting rules live in one place so the registry and
// the dashboard agree on them.

use roomcast_api::{EventRecord, RoomResource};

use crate::model::{AgendaEvent, AgendaLocation, AgendaTime, Room};

impl From<RoomResource> for Room {
    /// Map a remote room resource into the local shape.
    ///
    /// `is_displayed` always starts false — curation is local-only and
    /// never sourced from the remote.
    fn from(place: RoomResource) -> Self {
        Self {
            id: place.id.unwrap_or_default(),
            display_name: place
                .display_name
                .unwrap_or_else(|| "Unknown Room".to_owned()),
            email_address: place.email_address.unwrap_or_default(),
            phone: place.phone,
            building: place.building,
            floor: place.floor,
            capacity: place.capacity,
            booking_type: place.booking_type,
            tags: place.tags.into_iter().collect(),
            is_displayed: false,
        }
    }
}

/// Map a raw calendar record into an [`AgendaEvent`] belonging to a room.
pub fn agenda_event(room_email: &str, record: EventRecord) -> AgendaEvent {
    AgendaEvent {
        id: record.id,
        subject: record.subject.unwrap_or_default(),
        email_address: room_email.to_owned(),
        location: AgendaLocation {
            display_name: record
                .location
                .and_then(|l| l.display_name)
                .unwrap_or_default(),
        },
        start: AgendaTime {
            date_time: record.start.map_or_else(String::new, |t| t.date_time),
        },
        end: AgendaTime {
            date_time: record.end.map_or_else(String::new, |t| t.date_time),
        },
    }
}
