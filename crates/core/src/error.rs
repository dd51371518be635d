use thiserror::Error;

use crate::{SolveStatus, SolverUnavailable};

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("invalid instance: {}", .0.join("; "))]
    Problems(Vec<String>),
}

impl ValidationError {
    pub fn messages(&self) -> &[String] {
        match self {
            ValidationError::Problems(msgs) => msgs,
        }
    }
}

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("unknown course type for '{0}': the name must mark it as a lecture or a tutorial")]
    UnclassifiableSubject(String),
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    SolverUnavailable(#[from] SolverUnavailable),
    #[error("no optimal solution found (status: {0})")]
    NoOptimalSolution(SolveStatus),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl ScheduleError {
    /// Whether the failure is caused by the request content rather than the
    /// service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ScheduleError::MissingField(_)
                | ScheduleError::UnclassifiableSubject(_)
                | ScheduleError::Invalid(_)
                | ScheduleError::NoOptimalSolution(_)
        )
    }

    pub fn code(&self) -> &'static str {
        match self {
            ScheduleError::MissingField(_) => "missing_field",
            ScheduleError::UnclassifiableSubject(_) => "unclassifiable_subject",
            ScheduleError::Invalid(_) => "invalid_instance",
            ScheduleError::SolverUnavailable(SolverUnavailable::Busy(_)) => "solver_busy",
            ScheduleError::SolverUnavailable(_) => "solver_unavailable",
            ScheduleError::NoOptimalSolution(_) => "no_optimal_solution",
            ScheduleError::Unexpected(_) => "unexpected",
        }
    }
}
