use std::collections::BTreeMap;

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use sched_core::{classify_subjects, ScheduleError};
use serde::Serialize;
use types::{ClassifyRequest, CourseType};
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Serialize, ToSchema)]
pub struct ClassifyResponse {
    /// Same shape as the `course_type` field of a schedule request.
    pub course_type: BTreeMap<String, CourseType>,
}

#[utoipa::path(
    post,
    path = "/v1/classify",
    request_body = ClassifyRequest,
    responses(
        (status = 200, description = "Course type per subject", body = ClassifyResponse),
        (status = 400, description = "Missing subjects or unclassifiable name", body = ErrorBody)
    )
)]
pub async fn classify(
    State(state): State<AppState>,
    payload: Result<Json<ClassifyRequest>, JsonRejection>,
) -> Result<Json<ClassifyResponse>, ApiError> {
    let Json(req) = payload?;
    let subjects = req
        .subjects
        .ok_or(ScheduleError::MissingField("subjects"))?;
    let course_type = classify_subjects(state.classifier.as_ref(), &subjects)?;
    Ok(Json(ClassifyResponse { course_type }))
}
