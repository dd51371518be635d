use std::sync::Arc;

use sched_core::{CourseTypeClassifier, SolveLimits, Solver, SubstringClassifier};
use solver_milp::MilpSolver;

use crate::config::Config;

/// Read-only handles shared by all requests. Each request still builds its
/// own model and solver run.
#[derive(Clone)]
pub struct AppState {
    pub solver: Arc<dyn Solver>,
    pub classifier: Arc<dyn CourseTypeClassifier>,
    pub limits: SolveLimits,
}

impl AppState {
    pub fn new(
        solver: Arc<dyn Solver>,
        classifier: Arc<dyn CourseTypeClassifier>,
        limits: SolveLimits,
    ) -> Self {
        Self {
            solver,
            classifier,
            limits,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Arc::new(MilpSolver::with_max_in_flight(config.solver_max_in_flight)),
            Arc::new(SubstringClassifier::default()),
            SolveLimits {
                time_limit: Some(config.solver_time_limit),
                max_variables: config.max_variables,
            },
        )
    }
}
