use axum::{extract::rejection::JsonRejection, extract::State, Json};
use sched_core::{resolve_request, validate, ScheduleError};
use serde::Serialize;
use types::ScheduleRequest;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Serialize, utoipa::ToSchema)]
pub struct ValidationReport {
    pub ok: bool,
    pub errors: Vec<String>,
    /// Reported but never block a solve.
    pub warnings: Vec<String>,
}

#[utoipa::path(
    post,
    path = "/v1/validate",
    request_body = ScheduleRequest,
    responses(
    (status = 200, description = "Validation result", body = ValidationReport)
    )
)]
pub async fn validate_handler(
    State(state): State<AppState>,
    payload: Result<Json<ScheduleRequest>, JsonRejection>,
) -> Result<Json<ValidationReport>, ApiError> {
    let Json(req) = payload?;
    let (errors, warnings) = match resolve_request(req, state.classifier.as_ref()) {
        Ok(inst) => {
            let errors = match validate(&inst, state.limits.max_variables) {
                Ok(()) => vec![],
                Err(e) => e.messages().to_vec(),
            };
            (errors, sched_core::warnings(&inst))
        }
        Err(ScheduleError::Invalid(e)) => (e.messages().to_vec(), vec![]),
        Err(e) => (vec![e.to_string()], vec![]),
    };
    Ok(Json(ValidationReport {
        ok: errors.is_empty(),
        errors,
        warnings,
    }))
}
