pub mod config;
pub mod logging;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;

use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::state::AppState;

/// Builds the application from the environment with the real upstream client.
pub fn create_app() -> axum::Router {
    create_app_with_state(AppState::from_config(Config::from_env()))
}

/// Builds the application around an existing state, e.g. one holding a fake
/// completion client.
pub fn create_app_with_state(state: AppState) -> axum::Router {
    routes::router(state).layer(TraceLayer::new_for_http())
}
