use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use scriptrun_splitter::{Split, SplitOptions, Splitter};
use serde::{Deserialize, Serialize};

use crate::response::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SplitRequest {
    pub script: String,
    #[serde(default)]
    pub delimiter: Option<String>,
    #[serde(default)]
    pub options: Option<SplitOptions>,
}

#[derive(Debug, Serialize)]
pub struct SplitResponse {
    #[serde(flatten)]
    pub split: Split,
    /// Options the script was actually split with
    pub options: SplitOptions,
}

/// Dry run: show how a script would be cut without executing anything.
pub async fn split_script(
    State(state): State<AppState>,
    payload: Result<Json<SplitRequest>, JsonRejection>,
) -> Result<Json<SplitResponse>, AppError> {
    let Json(body) = payload.map_err(|rejection| AppError::bad_request(rejection.body_text()))?;

    let handler = state.handler();
    let splitter = match body.options {
        Some(options) => Splitter::new(options),
        None => *handler.splitter(),
    };
    let delimiter = body
        .delimiter
        .unwrap_or_else(|| handler.default_delimiter().to_string());

    let split = splitter.split(&body.script, &delimiter)?;
    Ok(Json(SplitResponse {
        split,
        options: *splitter.options(),
    }))
}
