use std::sync::Arc;

use roomcast_core::{ConnectionManager, GraphConnector, RoomRegistry};

/// Shared state injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub connection: Arc<ConnectionManager<GraphConnector>>,
    pub registry: Arc<RoomRegistry>,
}

impl AppState {
    pub fn new(connection: ConnectionManager<GraphConnector>, registry: RoomRegistry) -> Self {
        Self {
            connection: Arc::new(connection),
            registry: Arc::new(registry),
        }
    }
}
