mod events;
mod health;
mod split;

use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;

use crate::response::AppError;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/events", post(events::handle_event))
        .route("/split", post(split::split_script))
        .nest("/health", health::router())
        .fallback(fallback_handler)
        .with_state(state)
}

async fn fallback_handler() -> Response {
    AppError::not_found("route not found").into_response()
}
