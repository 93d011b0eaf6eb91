use std::sync::Arc;

use axum::{Router, middleware};

use crate::{
    config::AppConfig,
    middleware::{catch_panic_layer, json_error_middleware},
    routes::router,
    state::AppState,
    store::TodoStore,
};

/// Fresh store plus default config, without touching the environment.
pub fn test_state() -> Arc<AppState> {
    AppState::new(AppConfig::default(), TodoStore::new())
}

/// Router with the same error layers the binary installs.
pub fn test_router(state: Arc<AppState>) -> Router {
    router(state)
        .layer(middleware::from_fn(json_error_middleware))
        .layer(catch_panic_layer())
}
