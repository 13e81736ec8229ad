use std::sync::Arc;

use crate::{config::Config, registry::RoomRegistry};

#[derive(Clone)]
pub struct AppState {
    pub registry: RoomRegistry,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            registry: RoomRegistry::new(),
            config: Arc::new(config),
        }
    }
}
