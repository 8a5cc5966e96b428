//! Shared application state.

use std::sync::Arc;

use crate::{
    domain::MessageRepository,
    ui::realtime::{Dispatcher, Hub},
};

/// Shared application state
pub struct AppState {
    /// Room registry
    pub hub: Arc<Hub>,
    /// Repository（データアクセス層の抽象化）
    pub repository: Arc<dyn MessageRepository>,
    /// Frame handler shared by all connections
    pub dispatcher: Arc<Dispatcher>,
}

impl AppState {
    pub fn new(hub: Arc<Hub>, repository: Arc<dyn MessageRepository>) -> Self {
        let dispatcher = Arc::new(Dispatcher::new(hub.clone(), repository.clone()));
        Self {
            hub,
            repository,
            dispatcher,
        }
    }
}
