use std::sync::Arc;

use crate::{config::AppConfig, store::TodoStore};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: TodoStore,
}

impl AppState {
    pub fn new(config: AppConfig, store: TodoStore) -> Arc<Self> {
        Arc::new(Self { config, store })
    }
}
