// ABOUTME: Exercise state that evaluates per-view line angles against its constraints
// ABOUTME: Tracks entry time, previous angles, angle ranges and joint overload counts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::BTreeMap;

use formcoach_core::errors::AnalysisError;
use formcoach_core::models::{ConditionType, Direction, PoseView, StateSpec};

use crate::condition::Condition;
use crate::constraint::AngleConstraint;

/// Angles of one frame, grouped by the view they were measured in
pub type AnglesByView = BTreeMap<PoseView, BTreeMap<String, f64>>;

/// Missing angles are negative
fn is_valid(angle: f64) -> bool {
    angle >= 0.0
}

/// One phase of an exercise
#[derive(Debug, Clone)]
pub struct State {
    id: i64,
    id_ex: i64,
    name: String,
    min_time_ms: i64,
    max_time_ms: i64,
    entry_time: i64,
    constraints: BTreeMap<String, Vec<AngleConstraint>>,
    previous: AnglesByView,
    angle_ranges: BTreeMap<String, (f64, f64)>,
    overloads: BTreeMap<String, u64>,
}

impl State {
    /// Create a state; `min_time` is clamped to 0 and `max_time` to at least `min_time`
    #[must_use]
    pub fn new(id: i64, name: impl Into<String>, min_time_ms: i64, max_time_ms: i64) -> Self {
        let min_time_ms = min_time_ms.max(0);
        Self {
            id,
            id_ex: 0,
            name: name.into(),
            min_time_ms,
            max_time_ms: max_time_ms.max(min_time_ms),
            entry_time: 0,
            constraints: BTreeMap::new(),
            previous: BTreeMap::new(),
            angle_ranges: BTreeMap::new(),
            overloads: BTreeMap::new(),
        }
    }

    /// Build from the persisted form
    ///
    /// # Errors
    ///
    /// Returns `InvalidConstraint` if a stored constraint is invalid
    pub fn from_spec(spec: &StateSpec, id_ex: i64) -> Result<Self, AnalysisError> {
        let mut state = Self::new(spec.id, spec.name.clone(), spec.min_time_ms, spec.max_time_ms);
        state.id_ex = id_ex;
        for constraint in &spec.constraints {
            state.add_constraint(AngleConstraint::from_spec(constraint, spec.id, id_ex)?);
        }
        Ok(state)
    }

    /// Persisted form
    #[must_use]
    pub fn to_spec(&self) -> StateSpec {
        StateSpec {
            id: self.id,
            name: self.name.clone(),
            min_time_ms: self.min_time_ms,
            max_time_ms: self.max_time_ms,
            constraints: self
                .constraints
                .values()
                .flatten()
                .map(AngleConstraint::to_spec)
                .collect(),
        }
    }

    /// Add a constraint on its line; a line may carry one constraint per view
    pub fn add_constraint(&mut self, constraint: AngleConstraint) {
        self.constraints
            .entry(constraint.line().to_owned())
            .or_default()
            .push(constraint);
    }

    /// State id
    #[must_use]
    pub const fn id(&self) -> i64 {
        self.id
    }

    /// Owning exercise id
    #[must_use]
    pub const fn id_ex(&self) -> i64 {
        self.id_ex
    }

    /// Display name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Minimum time in the state
    #[must_use]
    pub const fn min_time_ms(&self) -> i64 {
        self.min_time_ms
    }

    /// Maximum time in the state; 0 means unlimited
    #[must_use]
    pub const fn max_time_ms(&self) -> i64 {
        self.max_time_ms
    }

    /// Time the state was last entered
    #[must_use]
    pub const fn entry_time(&self) -> i64 {
        self.entry_time
    }

    /// Constraints keyed by line
    #[must_use]
    pub const fn constraints(&self) -> &BTreeMap<String, Vec<AngleConstraint>> {
        &self.constraints
    }

    /// Observed `(min, max)` angle per line since creation
    #[must_use]
    pub const fn angle_ranges(&self) -> &BTreeMap<String, (f64, f64)> {
        &self.angle_ranges
    }

    /// Joint overloads per line since creation
    #[must_use]
    pub const fn overloads(&self) -> &BTreeMap<String, u64> {
        &self.overloads
    }

    /// Enter the state at `time`, forgetting angles from a previous visit
    pub fn enter(&mut self, time: i64) {
        self.entry_time = time;
        self.previous.clear();
    }

    /// Evaluate one frame and return the raised conditions
    pub fn report(&mut self, angles_by_view: &AnglesByView, time: i64) -> Vec<Condition> {
        let mut report = Vec::new();
        let mut optimal = true;

        let elapsed = time - self.entry_time;
        if self.max_time_ms > 0 && elapsed > self.max_time_ms {
            report.push(Condition::new(ConditionType::MaxStateTimeout).with_value(elapsed));
            optimal = false;
        }
        if elapsed < self.min_time_ms {
            report.push(Condition::new(ConditionType::MinStateTimeout).with_value(elapsed));
        }

        for (view, angles) in angles_by_view {
            let previous = self.previous.get(view);
            for (line, &current) in angles {
                if !is_valid(current) {
                    continue;
                }
                widen_range(&mut self.angle_ranges, line, current);

                let Some(&prev) = previous.and_then(|p| p.get(line)) else {
                    continue;
                };
                if !is_valid(prev) {
                    continue;
                }
                let Some(constraints) = self.constraints.get(line) else {
                    continue;
                };
                for constraint in constraints.iter().filter(|c| c.view() == *view) {
                    let evaluation = evaluate(constraint, *view, prev, current);
                    optimal &= evaluation.optimal;
                    if evaluation.overload {
                        *self.overloads.entry(line.clone()).or_insert(0) += 1;
                    }
                    report.extend(evaluation.conditions);
                }
            }
        }

        if optimal {
            report.push(Condition::new(ConditionType::OptimalForm));
        }
        self.previous.clone_from(angles_by_view);
        report
    }
}

fn widen_range(ranges: &mut BTreeMap<String, (f64, f64)>, line: &str, angle: f64) {
    ranges
        .entry(line.to_owned())
        .and_modify(|(min, max)| {
            *min = min.min(angle);
            *max = max.max(angle);
        })
        .or_insert((angle, angle));
}

struct Evaluation {
    conditions: Vec<Condition>,
    optimal: bool,
    overload: bool,
}

fn evaluate(constraint: &AngleConstraint, view: PoseView, prev: f64, current: f64) -> Evaluation {
    let dif = (prev - current).abs();
    let tol = constraint.tolerance();
    let value = Some(current.round() as i64);
    let line = constraint.line();
    let raise = |kind| Condition::on_line(kind, line, view, value);

    let mut conditions = Vec::new();
    let mut optimal = true;
    let mut overload = false;

    if constraint.max_angle().is_some_and(|max| current > max) && dif > tol {
        conditions.push(raise(ConditionType::MaxOptAngle));
    }
    if constraint.min_angle().is_some_and(|min| current < min) && dif > tol {
        conditions.push(raise(ConditionType::MinOptAngle));
    }

    let above_safe = constraint.max_safe_angle().is_some_and(|max| current > max);
    let below_safe = constraint.min_safe_angle().is_some_and(|min| current < min);
    if (above_safe || below_safe) && dif > tol {
        conditions.push(raise(ConditionType::JointOverload));
        optimal = false;
        overload = true;
    }

    if constraint.fast_threshold().is_some_and(|fast| dif > fast) {
        conditions.push(raise(ConditionType::FastMovement));
        optimal = false;
    }
    if constraint.slow_threshold().is_some_and(|slow| dif < slow) {
        conditions.push(raise(ConditionType::SlowMovement));
        optimal = false;
    }

    let wrong_way = match constraint.evolution() {
        Direction::Increase => (current <= prev && dif > tol).then_some(ConditionType::Decrease),
        Direction::Decrease => (current >= prev && dif > tol).then_some(ConditionType::Increase),
        Direction::Steady => constraint
            .max_angle()
            .is_some_and(|max| (current - max).abs() > tol)
            .then_some(ConditionType::NotSteady),
        Direction::Symmetrical => constraint
            .symmetrical_angle()
            .is_some_and(|sym| (current - sym).abs() > tol)
            .then_some(ConditionType::SymmetryDeviation),
        Direction::NotMatter => None,
    };
    if let Some(kind) = wrong_way {
        conditions.push(raise(kind));
        optimal = false;
    }

    Evaluation {
        conditions,
        optimal,
        overload,
    }
}
