use axum::{
    extract::rejection::JsonRejection,
    response::{IntoResponse, Response},
    Json,
};
use http::StatusCode;
use sched_core::{ScheduleError, SolverUnavailable};
use serde::Serialize;
use tracing::{error, warn};
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
    pub code: String,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    pub fn bad_request(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorBody {
                error: message.into(),
                code: code.into(),
            },
        }
    }

    pub fn internal(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: ErrorBody {
                error: message.into(),
                code: code.into(),
            },
        }
    }
}

impl From<ScheduleError> for ApiError {
    fn from(e: ScheduleError) -> Self {
        let code = e.code();
        match e {
            ScheduleError::NoOptimalSolution(_) => {
                Self::bad_request(code, "No optimal solution found")
            }
            e if e.is_client_error() => Self::bad_request(code, e.to_string()),
            ScheduleError::SolverUnavailable(SolverUnavailable::Busy(n)) => {
                warn!(slots = n, "rejecting schedule request, solver is busy");
                Self {
                    status: StatusCode::SERVICE_UNAVAILABLE,
                    body: ErrorBody {
                        error: "The scheduling solver is busy, retry later".into(),
                        code: code.into(),
                    },
                }
            }
            ScheduleError::SolverUnavailable(inner) => {
                error!(error = %inner, "solver unavailable");
                Self::internal(code, "The scheduling solver is unavailable")
            }
            other => {
                error!(error = %other, "scheduling failed");
                Self::internal(code, "An unexpected error occurred")
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        // Oversized bodies keep their 413; every other rejection is a 400.
        let status = match e.status() {
            StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        };
        Self {
            status,
            body: ErrorBody {
                error: e.body_text(),
                code: "invalid_body".into(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
