use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::event::LifecycleRequest;
use crate::response::AppError;
use crate::state::AppState;

/// Run one lifecycle request and answer with the response document that was
/// sent to its callback. A callback that could not be delivered turns the
/// answer into a 502 so the invoker can redeliver the request.
///
/// Only the envelope is validated here. Property errors surface as a `FAILED`
/// callback from the handler.
pub async fn handle_event(
    State(state): State<AppState>,
    payload: Result<Json<LifecycleRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return AppError::bad_request(rejection.body_text()).into_response(),
    };

    let handled = state.handler().handle(&request).await;

    match handled.notified {
        Ok(()) => (StatusCode::OK, Json(handled.response)).into_response(),
        Err(err) => AppError::bad_gateway(err.to_string()).into_response(),
    }
}
