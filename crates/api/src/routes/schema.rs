use axum::Json;
use schemars::schema::RootSchema;

#[utoipa::path(
    get,
    path = "/v1/schema",
    responses((status = 200, description = "JSON Schema of the schedule request body"))
)]
pub async fn request_schema() -> Json<RootSchema> {
    Json(types::request_schema())
}
