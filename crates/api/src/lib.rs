pub mod config;
pub mod error;
pub mod state;
pub mod telemetry;
pub mod routes {
    pub mod classify;
    pub mod health;
    pub mod schedule;
    pub mod schema;
    pub mod validate;
}

use axum::{
    routing::{get, post},
    Json, Router,
};
use utoipa::OpenApi;

use crate::config::Config;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
        paths(
            routes::health::health,
            routes::schedule::schedule,
            routes::validate::validate_handler,
            routes::classify::classify,
            routes::schema::request_schema,
        ),
        components(schemas(
            types::ScheduleRequest, types::ScheduleEntry, types::ClassifyRequest,
            types::CourseType, types::Modality,
            types::GroupId, types::SubjectId, types::TeacherId,
            error::ErrorBody,
            routes::validate::ValidationReport,
            routes::classify::ClassifyResponse
        )),
        tags(
            (name = "unischedule", description = "Timetable scheduling API")
        )
    )]
pub struct ApiDoc;

pub fn router(state: AppState, config: &Config) -> Router {
    Router::new()
        .route("/v1/health", get(routes::health::health))
        .route("/v1/schedule", post(routes::schedule::schedule))
        .route("/schedule", post(routes::schedule::schedule))
        .route("/v1/validate", post(routes::validate::validate_handler))
        .route("/v1/classify", post(routes::classify::classify))
        .route("/v1/schema", get(routes::schema::request_schema))
        .route("/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .layer(telemetry::stack(config))
        .with_state(state)
}
