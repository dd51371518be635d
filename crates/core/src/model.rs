//! Linear model of one scheduling instance.
//!
//! Every variable is binary. Assignment variables `x[c, p, r, e]` come first
//! in the arena, followed by modality variables `y[g, c, m]`; both are laid
//! out densely so an index tuple maps to a [`VarId`] arithmetically.

use tracing::debug;
use types::{Instance, Modality};

const TOLERANCE: f64 = 1e-6;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct VarId(pub usize);

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Cmp {
    Eq,
    Leq,
}

#[derive(Clone, Debug)]
pub struct LinearConstraint {
    pub terms: Vec<(VarId, f64)>,
    pub cmp: Cmp,
    pub rhs: f64,
}

impl LinearConstraint {
    pub fn lhs(&self, values: &[f64]) -> f64 {
        self.terms.iter().map(|&(v, coef)| coef * values[v.0]).sum()
    }

    pub fn holds(&self, values: &[f64]) -> bool {
        let lhs = self.lhs(values);
        match self.cmp {
            Cmp::Eq => (lhs - self.rhs).abs() <= TOLERANCE,
            Cmp::Leq => lhs <= self.rhs + TOLERANCE,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct LinearModel {
    pub var_count: usize,
    pub constraints: Vec<LinearConstraint>,
    /// Minimised.
    pub objective: Vec<(VarId, f64)>,
}

impl LinearModel {
    fn push(&mut self, terms: Vec<(VarId, f64)>, cmp: Cmp, rhs: f64) {
        self.constraints.push(LinearConstraint { terms, cmp, rhs });
    }

    /// A constraint without variables that cannot hold, e.g. a course that
    /// needs periods when no assignment variable exists for it.
    pub fn has_empty_conflict(&self) -> bool {
        let zeros: [f64; 0] = [];
        self.constraints
            .iter()
            .any(|c| c.terms.is_empty() && !c.holds(&zeros))
    }

    /// Indices of constraints the given values break. Values that are not
    /// 0/1 count as a violation of the binary domain and are reported as
    /// `usize::MAX`.
    pub fn violations(&self, values: &[f64]) -> Vec<usize> {
        let mut out: Vec<usize> = self
            .constraints
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.holds(values))
            .map(|(i, _)| i)
            .collect();
        if values
            .iter()
            .any(|v| v.abs() > TOLERANCE && (v - 1.0).abs() > TOLERANCE)
        {
            out.push(usize::MAX);
        }
        out
    }

    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.objective.iter().map(|&(v, coef)| coef * values[v.0]).sum()
    }
}

/// Shape of the variable arena for one instance.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Layout {
    pub courses: usize,
    pub periods: usize,
    pub rooms: usize,
    pub teachers: usize,
    pub groups: usize,
}

impl Layout {
    pub fn of(inst: &Instance) -> Self {
        Self {
            courses: inst.subjects.len(),
            periods: inst.period_count(),
            rooms: inst.rooms.len(),
            teachers: inst.teachers.len(),
            groups: inst.groups.len(),
        }
    }

    /// Variable count for `inst`, or `None` when it does not fit in `usize`.
    /// Safe to call on unvalidated grids.
    pub fn checked_var_count(inst: &Instance) -> Option<usize> {
        let periods = (inst.periods_per_day as usize).checked_mul(inst.days_per_week as usize)?;
        let assignments = inst
            .subjects
            .len()
            .checked_mul(periods)?
            .checked_mul(inst.rooms.len())?
            .checked_mul(inst.teachers.len())?;
        let modality = inst
            .groups
            .len()
            .checked_mul(inst.subjects.len())?
            .checked_mul(Modality::ALL.len())?;
        assignments.checked_add(modality)
    }

    pub fn assignment_count(&self) -> usize {
        self.courses * self.periods * self.rooms * self.teachers
    }

    pub fn modality_count(&self) -> usize {
        self.groups * self.courses * Modality::ALL.len()
    }

    pub fn var_count(&self) -> usize {
        self.assignment_count() + self.modality_count()
    }

    pub fn x(&self, c: usize, p: usize, r: usize, e: usize) -> VarId {
        debug_assert!(c < self.courses && p < self.periods && r < self.rooms && e < self.teachers);
        VarId(((c * self.periods + p) * self.rooms + r) * self.teachers + e)
    }

    pub fn y(&self, g: usize, c: usize, m: Modality) -> VarId {
        debug_assert!(g < self.groups && c < self.courses);
        VarId(self.assignment_count() + (g * self.courses + c) * Modality::ALL.len() + m.index())
    }
}

pub struct ModelBuilder<'a> {
    inst: &'a Instance,
    layout: Layout,
    model: LinearModel,
}

impl<'a> ModelBuilder<'a> {
    pub fn new(inst: &'a Instance) -> Self {
        let layout = Layout::of(inst);
        let model = LinearModel {
            var_count: layout.var_count(),
            ..LinearModel::default()
        };
        Self {
            inst,
            layout,
            model,
        }
    }

    pub fn build(mut self) -> (Layout, LinearModel) {
        self.add_modality_constraints();
        self.add_specialty_constraints();
        self.add_teacher_conflict_constraints();
        self.add_room_capacity_constraints();
        self.add_room_occupancy_constraints();
        self.add_course_duration_constraints();
        self.build_objective();

        debug!(
            assignment_vars = self.layout.assignment_count(),
            modality_vars = self.layout.modality_count(),
            constraints = self.model.constraints.len(),
            "model built"
        );
        (self.layout, self.model)
    }

    fn add_modality_constraints(&mut self) {
        let l = self.layout;
        for g in 0..l.groups {
            for (c, subject) in self.inst.subjects.iter().enumerate() {
                let forced = subject.kind.modality();
                for m in Modality::ALL {
                    let rhs = if m == forced { 1.0 } else { 0.0 };
                    self.model.push(vec![(l.y(g, c, m), 1.0)], Cmp::Eq, rhs);
                }
            }
        }
    }

    fn add_specialty_constraints(&mut self) {
        let l = self.layout;
        if l.periods == 0 || l.rooms == 0 {
            return;
        }
        for (c, subject) in self.inst.subjects.iter().enumerate() {
            for (e, teacher) in self.inst.teachers.iter().enumerate() {
                if teacher.can_teach(&subject.id) {
                    continue;
                }
                let mut terms = Vec::with_capacity(l.periods * l.rooms);
                for p in 0..l.periods {
                    for r in 0..l.rooms {
                        terms.push((l.x(c, p, r, e), 1.0));
                    }
                }
                self.model.push(terms, Cmp::Eq, 0.0);
            }
        }
    }

    fn add_teacher_conflict_constraints(&mut self) {
        let l = self.layout;
        if l.courses == 0 || l.rooms == 0 {
            return;
        }
        for p in 0..l.periods {
            for e in 0..l.teachers {
                let mut terms = Vec::with_capacity(l.courses * l.rooms);
                for c in 0..l.courses {
                    for r in 0..l.rooms {
                        terms.push((l.x(c, p, r, e), 1.0));
                    }
                }
                self.model.push(terms, Cmp::Leq, 1.0);
            }
        }
    }

    /// Σ_g size_g·y[g, c, on-site] ≤ capacity_r whenever course c sits in
    /// room r at period p. The big-M term releases the row otherwise.
    fn add_room_capacity_constraints(&mut self) {
        let l = self.layout;
        if l.groups == 0 || l.teachers == 0 {
            return;
        }
        let big_m: f64 = self.inst.groups.iter().map(|g| g.size as f64).sum();
        for c in 0..l.courses {
            for (r, room) in self.inst.rooms.iter().enumerate() {
                for p in 0..l.periods {
                    let mut terms = Vec::with_capacity(l.groups + l.teachers);
                    for (g, group) in self.inst.groups.iter().enumerate() {
                        terms.push((l.y(g, c, Modality::OnSite), group.size as f64));
                    }
                    for e in 0..l.teachers {
                        terms.push((l.x(c, p, r, e), big_m));
                    }
                    self.model.push(terms, Cmp::Leq, room.capacity as f64 + big_m);
                }
            }
        }
    }

    fn add_room_occupancy_constraints(&mut self) {
        let l = self.layout;
        if l.courses == 0 || l.teachers == 0 {
            return;
        }
        for p in 0..l.periods {
            for r in 0..l.rooms {
                let mut terms = Vec::with_capacity(l.courses * l.teachers);
                for c in 0..l.courses {
                    for e in 0..l.teachers {
                        terms.push((l.x(c, p, r, e), 1.0));
                    }
                }
                self.model.push(terms, Cmp::Leq, 1.0);
            }
        }
    }

    /// Emitted even when a course has no variables at all, so an empty
    /// room or teacher list surfaces as infeasibility.
    fn add_course_duration_constraints(&mut self) {
        let l = self.layout;
        for (c, subject) in self.inst.subjects.iter().enumerate() {
            let mut terms = Vec::with_capacity(l.periods * l.rooms * l.teachers);
            for p in 0..l.periods {
                for r in 0..l.rooms {
                    for e in 0..l.teachers {
                        terms.push((l.x(c, p, r, e), 1.0));
                    }
                }
            }
            self.model.push(terms, Cmp::Eq, subject.duration as f64);
        }
    }

    // Σx is fixed by the duration rows, so this objective never changes
    // which feasible schedule comes back.
    fn build_objective(&mut self) {
        self.model.objective = (0..self.layout.assignment_count())
            .map(|i| (VarId(i), 1.0))
            .collect();
    }
}
