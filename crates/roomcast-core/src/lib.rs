//! Business logic between `roomcast-api` and the HTTP surface.
//!
//! This crate owns the domain model and the three pieces of machinery the
//! dashboard is built from:
//!
//! - **[`ConnectionManager`]** — the tenant-connection lifecycle state
//!   machine (Unconfigured → Initialized → Validated / Failed). Every
//!   caller composes against one [`ensure_ready()`](ConnectionManager::ensure_ready)
//!   contract instead of re-deriving initialize-then-validate. Generic
//!   over a [`DirectoryConnector`] so tests inject fake directories.
//!
//! - **[`RoomRegistry`]** — the locally persisted, user-curated room
//!   list and its reconciliation against the remote room catalog. The
//!   remote owns every field except `is_displayed`; curation survives a
//!   refresh, everything else is overwritten.
//!
//! - **[`dashboard`]** — read-time assembly of the displayed rooms plus
//!   each room's agenda for today, with per-room failure isolation.
//!
//! - **Domain model** ([`model`]) — [`Room`] (persisted) and
//!   [`AgendaEvent`] (read-only, fetched per render).

pub mod connection;
pub mod convert;
pub mod dashboard;
pub mod directory;
pub mod error;
pub mod model;
pub mod registry;

#[cfg(test)]
pub(crate) mod test_support;

// ── Primary re-exports ──────────────────────────────────────────────
pub use connection::{ConnectionManager, ConnectionState};
pub use dashboard::{Dashboard, DirectoryUserSummary};
pub use directory::{Directory, DirectoryConnector, GraphConnector};
pub use error::{ConnectionError, CoreError};
pub use model::{AgendaEvent, Room, RoomPatch};
pub use registry::RoomRegistry;
