use std::sync::Arc;

use api::{config::Config, router, state::AppState};
use axum::body::{to_bytes, Body};
use http::{Request, StatusCode};
use sched_core::{
    LinearModel, Solution, SolveLimits, Solver, SolverUnavailable, SubstringClassifier,
};
use serde_json::{json, Value};
use solver_milp::MilpSolver;
use tower::ServiceExt;

struct UnavailableSolver;

impl Solver for UnavailableSolver {
    fn solve(&self, _: LinearModel, _: SolveLimits) -> Result<Solution, SolverUnavailable> {
        Err(SolverUnavailable::Failed(
            "libCbc.so: cannot open shared object file".into(),
        ))
    }
}

struct BusySolver;

impl Solver for BusySolver {
    fn solve(&self, _: LinearModel, _: SolveLimits) -> Result<Solution, SolverUnavailable> {
        Err(SolverUnavailable::Busy(4))
    }
}

fn app_with(solver: Arc<dyn Solver>) -> axum::Router {
    app_with_config(solver, Config::default())
}

fn app_with_config(solver: Arc<dyn Solver>, config: Config) -> axum::Router {
    let state = AppState::new(
        solver,
        Arc::new(SubstringClassifier::default()),
        SolveLimits {
            time_limit: Some(config.solver_time_limit),
            max_variables: config.max_variables,
        },
    );
    router(state, &config)
}

fn app() -> axum::Router {
    app_with(Arc::new(MilpSolver::new()))
}

async fn post(app: axum::Router, path: &str, body: Value) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

fn body() -> Value {
    json!({
        "group_names": ["DIA1"],
        "rooms": ["A"],
        "subjects": ["Maths CM", "Maths TD"],
        "teachers": ["Mme Camila"],
        "teacher_specialties": { "Mme Camila": ["Maths CM", "Maths TD"] }
    })
}

#[tokio::test]
async fn schedules_lecture_and_tutorial() {
    let (status, rows) = post(app(), "/v1/schedule", body()).await;
    assert_eq!(status, StatusCode::OK);
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 4);
    for row in rows {
        assert_eq!(row["group"], "DIA1");
        assert_eq!(row["teacher"], "Mme Camila");
        assert!(row["period"].as_str().unwrap().starts_with("Period "));
        if row["subject"] == "Maths CM" {
            assert_eq!(row["room"], "no room (remote)");
            assert_eq!(row["modality"], "remote");
        } else {
            assert_eq!(row["room"], "A");
            assert_eq!(row["modality"], "on_site");
        }
    }
}

#[tokio::test]
async fn legacy_path_is_served() {
    let (status, _) = post(app(), "/schedule", body()).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn missing_teachers_is_a_bad_request() {
    let mut b = body();
    b.as_object_mut().unwrap().remove("teachers");
    let (status, err) = post(app(), "/v1/schedule", b).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["code"], "missing_field");
    assert!(err["error"].as_str().unwrap().contains("teachers"));
}

#[tokio::test]
async fn unclassifiable_subject_is_a_bad_request() {
    let mut b = body();
    b["subjects"] = json!(["Maths CM", "Sport"]);
    let (status, err) = post(app(), "/v1/schedule", b).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["code"], "unclassifiable_subject");
    assert!(err["error"].as_str().unwrap().contains("Sport"));
}

#[tokio::test]
async fn unqualified_teacher_has_no_solution() {
    let mut b = body();
    b["teacher_specialties"] = json!({ "Mme Camila": [] });
    let (status, err) = post(app(), "/v1/schedule", b).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["error"], "No optimal solution found");
}

#[tokio::test]
async fn solver_failure_is_hidden_behind_500() {
    let (status, err) = post(app_with(Arc::new(UnavailableSolver)), "/v1/schedule", body()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(err["code"], "solver_unavailable");
    assert!(!err["error"].as_str().unwrap().contains("libCbc"));
}

#[tokio::test]
async fn busy_solver_is_a_503() {
    let (status, err) = post(app_with(Arc::new(BusySolver)), "/v1/schedule", body()).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(err["code"], "solver_busy");
}

#[tokio::test]
async fn extra_specialties_still_schedule() {
    let mut b = body();
    b["teacher_specialties"] = json!({ "Mme Camila": ["Maths CM", "Maths TD", "Physique CM"] });
    let (status, rows) = post(app(), "/v1/schedule", b.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rows.as_array().unwrap().len(), 4);

    let (status, report) = post(app(), "/v1/validate", b).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["ok"], true);
    assert!(report["warnings"][0].as_str().unwrap().contains("Physique CM"));
}

#[tokio::test]
async fn oversized_grid_is_rejected_without_panicking() {
    let mut b = body();
    b["periods_per_day"] = json!(u32::MAX);
    b["days_per_week"] = json!(u32::MAX);
    let (status, err) = post(app(), "/v1/schedule", b).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["code"], "invalid_instance");
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let req = Request::builder()
        .method("POST")
        .uri("/v1/schedule")
        .header("content-type", "application/json")
        .body(Body::from("{\"rooms\": [1, 2"))
        .unwrap();
    let resp = app().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let mut b = body();
    b["rooms"] = json!([1, 2]);
    let (status, err) = post(app(), "/v1/schedule", b).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["code"], "invalid_body");
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let config = Config {
        body_limit_bytes: 64,
        ..Config::default()
    };
    let app = app_with_config(Arc::new(MilpSolver::new()), config);
    let (status, _) = post(app, "/v1/schedule", body()).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn validate_reports_problems() {
    let mut b = body();
    b["days_per_week"] = json!(0);
    b["group_sizes"] = json!({ "Nobody": 10 });
    let (status, report) = post(app(), "/v1/validate", b).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["ok"], false);
    assert!(report["errors"][0].as_str().unwrap().contains("Nobody"));

    let (_, report) = post(app(), "/v1/validate", body()).await;
    assert_eq!(report["ok"], true);
}

#[tokio::test]
async fn classify_returns_course_types() {
    let (status, out) = post(
        app(),
        "/v1/classify",
        json!({ "subjects": ["Maths CM", "Physique TD"] }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(out["course_type"]["Maths CM"], "lecture");
    assert_eq!(out["course_type"]["Physique TD"], "tutorial");

    let (status, _) = post(app(), "/v1/classify", json!({ "subjects": ["Sport"] })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_and_docs() {
    let resp = app()
        .oneshot(Request::get("/v1/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app()
        .oneshot(Request::get("/openapi.json").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let doc: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(doc["paths"]["/v1/schedule"].is_object());

    let resp = app()
        .oneshot(Request::get("/v1/schema").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn cross_origin_requests_are_allowed() {
    let req = Request::builder()
        .method("POST")
        .uri("/v1/schedule")
        .header("content-type", "application/json")
        .header("origin", "http://localhost:3000")
        .body(Body::from(body().to_string()))
        .unwrap();
    let resp = app().oneshot(req).await.unwrap();
    assert_eq!(
        resp.headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}
