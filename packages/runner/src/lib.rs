pub mod config;
pub mod credentials;
pub mod event;
pub mod executor;
pub mod handler;
pub mod logging;
pub mod notifier;
pub mod response;
pub mod routes;
pub mod script;
pub mod state;

use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn create_app(state: AppState) -> axum::Router {
    routes::router(state).layer(TraceLayer::new_for_http())
}
