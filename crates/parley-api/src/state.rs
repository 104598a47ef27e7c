use std::sync::Arc;

use parley_db::ChatStore;

pub type AppState = Arc<AppStateInner>;

/// Shared by every request. The store handle lives as long as the server.
pub struct AppStateInner {
    pub store: Box<dyn ChatStore>,
}

impl AppStateInner {
    pub fn new(store: impl ChatStore + 'static) -> AppState {
        Arc::new(Self {
            store: Box::new(store),
        })
    }
}
