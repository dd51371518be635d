use axum::{extract::rejection::JsonRejection, extract::State, Json};
use tracing::{error, info, info_span};
use types::{ScheduleEntry, ScheduleRequest};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

#[utoipa::path(
        post,
        path = "/v1/schedule",
        request_body = ScheduleRequest,
        responses(
            (status = 200, description = "Timetable ordered by group and period", body = [ScheduleEntry]),
            (status = 400, description = "Missing field, unclassifiable subject, invalid instance or no optimal solution", body = ErrorBody),
            (status = 500, description = "Solver unavailable or unexpected failure", body = ErrorBody)
        )
    )]
pub async fn schedule(
    State(state): State<AppState>,
    payload: Result<Json<ScheduleRequest>, JsonRejection>,
) -> Result<Json<Vec<ScheduleEntry>>, ApiError> {
    let Json(req) = payload?;
    let request_id = Uuid::new_v4();
    let span = info_span!("schedule", %request_id);

    let rows = tokio::task::spawn_blocking(move || {
        let _guard = span.enter();
        info!("schedule request received");
        sched_core::schedule(
            req,
            state.classifier.as_ref(),
            state.solver.as_ref(),
            state.limits,
        )
    })
    .await
    .map_err(|e| {
        error!(%request_id, error = %e, "scheduling task failed");
        ApiError::internal("unexpected", "An unexpected error occurred")
    })??;

    Ok(Json(rows))
}
