pub mod classify;
pub mod error;
pub mod extract;
pub mod instance;
pub mod model;

use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

pub use classify::{classify_subjects, CourseTypeClassifier, SubstringClassifier};
pub use error::{ScheduleError, ValidationError};
pub use extract::{extract_schedule, sort_schedule};
pub use instance::resolve_request;
pub use model::{Cmp, Layout, LinearConstraint, LinearModel, ModelBuilder, VarId};
pub use types::{
    CourseType, Group, Instance, Modality, Room, ScheduleEntry, ScheduleRequest, Subject, Teacher,
};

/// Hard problems that make an instance unsolvable or too large to build.
/// `max_variables` caps the model size; the count is checked before any
/// index arithmetic runs.
pub fn validate(inst: &Instance, max_variables: usize) -> Result<(), ValidationError> {
    let mut errors: Vec<String> = Vec::new();

    if inst.periods_per_day == 0 {
        errors.push("periods_per_day must be positive".into());
    }
    if inst.days_per_week == 0 {
        errors.push("days_per_week must be positive".into());
    }
    match Layout::checked_var_count(inst) {
        Some(n) if n <= max_variables => {}
        Some(n) => errors.push(format!(
            "model needs {n} variables, more than the limit of {max_variables}"
        )),
        None => errors.push(format!(
            "model size overflows: {} periods per day over {} days",
            inst.periods_per_day, inst.days_per_week
        )),
    }

    fn chk_unique<I: ToString>(name: &str, ids: impl Iterator<Item = I>, errors: &mut Vec<String>) {
        let mut seen = HashSet::new();
        for id in ids {
            let s = id.to_string();
            if !seen.insert(s.clone()) {
                errors.push(format!("duplicate {name} name: {s}"));
            }
        }
    }
    chk_unique("group", inst.groups.iter().map(|x| &x.id.0), &mut errors);
    chk_unique("room", inst.rooms.iter().map(|x| &x.id.0), &mut errors);
    chk_unique("subject", inst.subjects.iter().map(|x| &x.id.0), &mut errors);
    chk_unique("teacher", inst.teachers.iter().map(|x| &x.id.0), &mut errors);

    let headcount: u64 = inst.groups.iter().map(|g| u64::from(g.size)).sum();
    let widest_room = inst.rooms.iter().map(|r| u64::from(r.capacity)).max();
    for s in &inst.subjects {
        if s.duration == 0 {
            errors.push(format!("subject {} has duration 0", s.id.0));
        }
        if s.kind == CourseType::Tutorial && widest_room.map_or(true, |cap| cap < headcount) {
            errors.push(format!(
                "subject {} is unschedulable: no room seats {} students",
                s.id.0, headcount
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::Problems(errors))
    }
}

/// Harmless oddities worth showing in a validation report. None of them
/// blocks a solve.
pub fn warnings(inst: &Instance) -> Vec<String> {
    let subjects: HashSet<_> = inst.subjects.iter().map(|s| &s.id.0).collect();
    let mut out = Vec::new();
    for t in &inst.teachers {
        for s in &t.specialties {
            if !subjects.contains(&s.0) {
                out.push(format!(
                    "teacher {} has specialty {} which is not a listed subject",
                    t.id.0, s.0
                ));
            }
        }
        if !t.specialties.iter().any(|s| subjects.contains(&s.0)) {
            out.push(format!("teacher {} can teach none of the listed subjects", t.id.0));
        }
    }
    out
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SolveStatus {
    Optimal,
    Infeasible,
    /// Anything else: unbounded, budget exhausted, backend error.
    Other,
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveStatus::Optimal => f.write_str("optimal"),
            SolveStatus::Infeasible => f.write_str("infeasible"),
            SolveStatus::Other => f.write_str("other"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Solution {
    pub status: SolveStatus,
    /// One value per model variable when the status is optimal, empty
    /// otherwise.
    pub values: Vec<f64>,
}

impl Solution {
    pub fn without_values(status: SolveStatus) -> Self {
        Self {
            status,
            values: Vec::new(),
        }
    }
}

pub const DEFAULT_MAX_VARIABLES: usize = 2_000_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SolveLimits {
    pub time_limit: Option<Duration>,
    /// Largest model, in variables, that will be built.
    pub max_variables: usize,
}

impl Default for SolveLimits {
    fn default() -> Self {
        Self {
            time_limit: None,
            max_variables: DEFAULT_MAX_VARIABLES,
        }
    }
}

#[derive(Debug, Error)]
pub enum SolverUnavailable {
    #[error("all {0} solver slots are busy")]
    Busy(usize),
    #[error("{0}")]
    Failed(String),
}

/// An integer programming backend. Each call must work on its own model
/// and solver state.
pub trait Solver: Send + Sync {
    fn solve(&self, model: LinearModel, limits: SolveLimits) -> Result<Solution, SolverUnavailable>;
}

/// Builds, solves and extracts one resolved instance.
pub fn solve_instance(
    inst: &Instance,
    solver: &dyn Solver,
    limits: SolveLimits,
) -> Result<Vec<ScheduleEntry>, ScheduleError> {
    let (layout, model) = ModelBuilder::new(inst).build();
    info!(
        courses = layout.courses,
        periods = layout.periods,
        rooms = layout.rooms,
        teachers = layout.teachers,
        vars = model.var_count,
        constraints = model.constraints.len(),
        "solving schedule model"
    );
    let check = model.clone();

    let solution = solver.solve(model, limits)?;
    if solution.status != SolveStatus::Optimal {
        warn!(status = %solution.status, "no optimal schedule");
        return Err(ScheduleError::NoOptimalSolution(solution.status));
    }
    if solution.values.len() != layout.var_count() {
        return Err(ScheduleError::Unexpected(format!(
            "solver returned {} values for {} variables",
            solution.values.len(),
            layout.var_count()
        )));
    }
    let broken = check.violations(&solution.values);
    if !broken.is_empty() {
        return Err(ScheduleError::Unexpected(format!(
            "solver solution breaks {} constraints",
            broken.len()
        )));
    }

    let entries = extract_schedule(inst, &layout, &solution.values);
    info!(
        rows = entries.len(),
        objective = check.objective_value(&solution.values),
        "schedule extracted"
    );
    Ok(entries)
}

/// Full request pipeline: resolve, validate, build, solve, extract.
/// `default_limits` applies unless the request carries its own time limit.
pub fn schedule(
    req: ScheduleRequest,
    classifier: &dyn CourseTypeClassifier,
    solver: &dyn Solver,
    default_limits: SolveLimits,
) -> Result<Vec<ScheduleEntry>, ScheduleError> {
    let limits = match req.time_limit_sec {
        Some(secs) => SolveLimits {
            time_limit: Some(Duration::from_secs(secs)),
            ..default_limits
        },
        None => default_limits,
    };
    let inst = resolve_request(req, classifier)?;
    validate(&inst, limits.max_variables)?;
    solve_instance(&inst, solver, limits)
}
