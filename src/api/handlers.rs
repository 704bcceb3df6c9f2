//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use tracing::warn;

use super::AppState;
use super::types::{ErrorResponse, LossQuery, LossResponse, PresetEntry, PresetsResponse};
use crate::config::{SUPPORTED_TIMEZONES, StudyConfig};
use crate::error::LossError;
use crate::sim::pipeline;

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Computes the loss for the server defaults overridden by the body.
///
/// `POST /loss` → 200 + `LossResponse` JSON
/// invalid body or field → 400 + `ErrorResponse`
/// degenerate or failed computation → 422 + `ErrorResponse`
pub async fn post_loss(
    State(state): State<Arc<AppState>>,
    body: Result<Json<LossQuery>, JsonRejection>,
) -> Result<Json<LossResponse>, ApiError> {
    let Json(query) = body.map_err(|rejection| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                kind: "invalid_input",
                error: rejection.body_text(),
            }),
        )
    })?;

    let study = query.merge_into(&state.defaults);
    let errors = study.validate();
    if !errors.is_empty() {
        let message = errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                kind: "invalid_input",
                error: message,
            }),
        ));
    }

    let request = study.to_request().map_err(error_response)?;
    let include_series = query.include_series;
    let run = tokio::task::spawn_blocking(move || pipeline::run(request))
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    kind: "internal",
                    error: format!("loss computation did not complete: {e}"),
                }),
            )
        })?
        .map_err(error_response)?;

    Ok(Json(LossResponse::from_run(&run, include_series)))
}

/// Lists the built-in presets and the timezone menu.
///
/// `GET /presets` → 200 + `PresetsResponse` JSON
pub async fn get_presets() -> Json<PresetsResponse> {
    let presets = StudyConfig::PRESETS
        .iter()
        .filter_map(|&name| {
            StudyConfig::from_preset(name)
                .ok()
                .map(|config| PresetEntry { name, config })
        })
        .collect();
    Json(PresetsResponse {
        presets,
        timezones: SUPPORTED_TIMEZONES.to_vec(),
    })
}

/// Maps a pipeline error onto a status code and body.
fn error_response(err: LossError) -> ApiError {
    let status = match err {
        LossError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
        LossError::DegenerateResult { .. } | LossError::ComputationFailure { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
    };
    warn!(kind = err.kind(), "request failed: {err}");
    (
        status,
        Json(ErrorResponse {
            kind: err.kind(),
            error: err.to_string(),
        }),
    )
}
