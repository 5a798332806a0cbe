//! Canonical domain types for the dashboard.

mod agenda;
mod room;

pub use agenda::{AgendaEvent, AgendaLocation, AgendaTime};
pub use room::{Room, RoomPatch};
