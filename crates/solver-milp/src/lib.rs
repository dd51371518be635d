use good_lp::{
    default_solver, variable, Expression, ProblemVariables, ResolutionError, Solution as _,
    SolverModel, Variable,
};
use sched_core::{Cmp, LinearModel, Solution, SolveLimits, SolveStatus, Solver, SolverUnavailable};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

pub const DEFAULT_MAX_IN_FLIGHT: usize = 4;

/// good_lp backed solver. Uses CBC when the `coin_cbc` feature is on,
/// microlp otherwise.
///
/// Every call builds a fresh good_lp problem; nothing is kept between calls.
/// At most `max_in_flight` solves run at once. A solve abandoned at its time
/// limit keeps its slot until the backend returns.
#[derive(Clone, Debug)]
pub struct MilpSolver {
    slots: Arc<Semaphore>,
    max_in_flight: usize,
}

impl Default for MilpSolver {
    fn default() -> Self {
        Self::with_max_in_flight(DEFAULT_MAX_IN_FLIGHT)
    }
}

impl MilpSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_in_flight(max_in_flight: usize) -> Self {
        Self {
            slots: Arc::new(Semaphore::new(max_in_flight)),
            max_in_flight,
        }
    }

    pub fn in_flight(&self) -> usize {
        self.max_in_flight - self.slots.available_permits()
    }
}

impl Solver for MilpSolver {
    fn solve(&self, model: LinearModel, limits: SolveLimits) -> Result<Solution, SolverUnavailable> {
        if model.has_empty_conflict() {
            info!("model contains an unsatisfiable constraint without variables");
            return Ok(Solution::without_values(SolveStatus::Infeasible));
        }
        if model.var_count == 0 {
            return Ok(Solution {
                status: SolveStatus::Optimal,
                values: Vec::new(),
            });
        }

        let permit = Arc::clone(&self.slots).try_acquire_owned().map_err(|_| {
            warn!(max_in_flight = self.max_in_flight, "no free solver slot");
            SolverUnavailable::Busy(self.max_in_flight)
        })?;

        let Some(limit) = limits.time_limit else {
            let sol = solve_model(&model, None);
            drop(permit);
            return Ok(sol);
        };

        // microlp has no cancellation, so the solve runs on its own thread
        // and is abandoned once the budget is spent. The permit moves with it.
        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name("milp-solve".into())
            .spawn(move || {
                let _permit = permit;
                let _ = tx.send(solve_model(&model, Some(limit)));
            })
            .map_err(|e| SolverUnavailable::Failed(format!("cannot start solver thread: {e}")))?;

        match rx.recv_timeout(limit) {
            Ok(sol) => Ok(sol),
            Err(mpsc::RecvTimeoutError::Timeout) => {
                warn!(limit_secs = limit.as_secs_f64(), "solver time limit reached");
                Ok(Solution::without_values(SolveStatus::Other))
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(SolverUnavailable::Failed(
                "solver thread ended without a result".into(),
            )),
        }
    }
}

fn solve_model(model: &LinearModel, time_limit: Option<Duration>) -> Solution {
    let started = Instant::now();

    let mut pvars = ProblemVariables::new();
    let vars: Vec<Variable> = pvars.add_vector(variable().binary(), model.var_count);

    let mut objective = Expression::from(0.0);
    for &(v, coef) in &model.objective {
        objective += coef * vars[v.0];
    }

    let mut problem = pvars.minimise(objective).using(default_solver);
    for c in &model.constraints {
        if c.terms.is_empty() {
            continue;
        }
        let mut lhs = Expression::from(0.0);
        for &(v, coef) in &c.terms {
            lhs += coef * vars[v.0];
        }
        problem = problem.with(match c.cmp {
            Cmp::Eq => lhs.eq(c.rhs),
            Cmp::Leq => lhs.leq(c.rhs),
        });
    }

    // CBC stops on its own; the thread then exits and frees its slot.
    #[cfg(feature = "coin_cbc")]
    let problem = match time_limit {
        Some(t) => {
            use good_lp::solvers::WithTimeLimit;
            problem.with_time_limit(t.as_secs_f64())
        }
        None => problem,
    };
    #[cfg(not(feature = "coin_cbc"))]
    let _ = time_limit;

    let outcome = problem.solve();
    let elapsed_ms = started.elapsed().as_millis() as u64;
    match outcome {
        Ok(sol) => {
            debug!(elapsed_ms, "solver finished with an optimal solution");
            Solution {
                status: SolveStatus::Optimal,
                values: vars.iter().map(|&v| sol.value(v).round()).collect(),
            }
        }
        Err(ResolutionError::Infeasible) => {
            debug!(elapsed_ms, "solver proved the model infeasible");
            Solution::without_values(SolveStatus::Infeasible)
        }
        Err(e) => {
            warn!(elapsed_ms, error = %e, "solver stopped without a solution");
            Solution::without_values(SolveStatus::Other)
        }
    }
}
