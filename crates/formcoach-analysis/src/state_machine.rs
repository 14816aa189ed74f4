// ABOUTME: Exercise state machine driving states, transitions, repetitions and series
// ABOUTME: Records every raised condition into the session report
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # State Machine
//!
//! One `run` call per frame:
//! 1. the current state evaluates the angles
//! 2. at most one transition out of the current state fires, checked in
//!    `(from, to)` order, when all its required conditions were raised
//! 3. entering the start state begins a repetition, returning to the rest state
//!    ends one, and completing the repetitions ends the serie
//! 4. set and rest clocks raise `SetTime` and `RestOverTime` when exceeded
//!
//! Every condition of the frame is recorded under the serie, repetition and state
//! that were current when the frame arrived.

use std::collections::BTreeMap;

use formcoach_core::constants::states::{REST_STATE_ID, START_STATE_ID};
use formcoach_core::errors::AnalysisError;
use formcoach_core::models::{ConditionType, ExerciseSpec};
use tracing::{debug, info};

use crate::condition::Condition;
use crate::report::SessionReport;
use crate::state::{AnglesByView, State};

/// Drives one exercise execution
#[derive(Debug, Clone)]
pub struct StateMachine {
    states: Vec<State>,
    current: usize,
    transitions: BTreeMap<(i64, i64), Vec<Condition>>,
    series: i64,
    repetitions: i64,
    duration_ms: i64,
    rest_time_ms: i64,
    remaining_series: i64,
    remaining_repetitions: i64,
    set_start: Option<i64>,
    rest_start: Option<i64>,
    rep_start: Option<i64>,
    started: bool,
    last_time: i64,
    complete: bool,
    report: SessionReport,
}

impl StateMachine {
    /// Build the machine for an exercise; the first listed state is the initial one
    ///
    /// # Errors
    ///
    /// Returns `InvalidPayload` if the exercise has no states, `UnknownState` if a
    /// transition references an undefined state, and `InvalidConstraint` if a stored
    /// constraint is invalid
    pub fn new(spec: &ExerciseSpec) -> Result<Self, AnalysisError> {
        if spec.states.is_empty() {
            return Err(AnalysisError::invalid_payload(
                "exercise",
                format!("exercise {} has no states", spec.id_ex),
            ));
        }
        let states = spec
            .states
            .iter()
            .map(|state| State::from_spec(state, spec.id_ex))
            .collect::<Result<Vec<_>, _>>()?;

        let mut transitions: BTreeMap<(i64, i64), Vec<Condition>> = BTreeMap::new();
        for transition in &spec.transitions {
            for id in [transition.from, transition.to] {
                if spec.state(id).is_none() {
                    return Err(AnalysisError::unknown_state(id));
                }
            }
            transitions
                .entry((transition.from, transition.to))
                .or_default()
                .extend(transition.conditions.iter().map(Condition::from_spec));
        }

        debug!(
            exercise = spec.id_ex,
            states = states.len(),
            transitions = transitions.len(),
            "State machine created"
        );

        Ok(Self {
            states,
            current: 0,
            transitions,
            series: spec.series,
            repetitions: spec.repetitions,
            duration_ms: spec.duration_ms,
            rest_time_ms: spec.rest_time_ms,
            remaining_series: spec.series,
            remaining_repetitions: spec.repetitions,
            set_start: None,
            rest_start: None,
            rep_start: None,
            started: false,
            last_time: 0,
            complete: false,
            report: SessionReport::default(),
        })
    }

    /// Id of the current state
    #[must_use]
    pub fn current_state_id(&self) -> i64 {
        self.states[self.current].id()
    }

    /// Current state
    #[must_use]
    pub fn current_state(&self) -> &State {
        &self.states[self.current]
    }

    /// Series still to perform
    #[must_use]
    pub const fn remaining_series(&self) -> i64 {
        self.remaining_series
    }

    /// Repetitions still to perform in the current serie
    #[must_use]
    pub const fn remaining_repetitions(&self) -> i64 {
        self.remaining_repetitions
    }

    /// Current serie number, starting at 1
    #[must_use]
    pub const fn serie_number(&self) -> i64 {
        self.series - self.remaining_series + 1
    }

    /// Current repetition number within the serie, starting at 1
    #[must_use]
    pub const fn repetition_number(&self) -> i64 {
        self.repetitions - self.remaining_repetitions + 1
    }

    /// Whether every serie was completed
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.complete
    }

    /// Report accumulated so far
    #[must_use]
    pub const fn report(&self) -> &SessionReport {
        &self.report
    }

    /// Mutable access to the report, for logging and session attachment
    pub fn report_mut(&mut self) -> &mut SessionReport {
        &mut self.report
    }

    /// Take the report, leaving an empty one
    pub fn take_report(&mut self) -> SessionReport {
        std::mem::take(&mut self.report)
    }

    /// Evaluate one frame and return every raised condition
    pub fn run(&mut self, angles_by_view: &AnglesByView, time: i64) -> Vec<Condition> {
        if self.complete {
            return Vec::new();
        }
        if !self.started {
            self.states[self.current].enter(time);
            self.started = true;
        }
        self.last_time = time;

        let serie = self.serie_number();
        let rep = self.repetition_number();
        let state_id = self.current_state_id();

        let mut conditions = self.states[self.current].report(angles_by_view, time);

        if let Some(next) = self.fired_transition(&conditions) {
            self.transition_to(next, time, &mut conditions);
        }

        if let Some(start) = self.rest_start {
            let elapsed = time - start;
            if elapsed > self.rest_time_ms {
                conditions.push(Condition::new(ConditionType::RestOverTime).with_value(elapsed));
            }
        }
        if let Some(start) = self.set_start {
            let elapsed = time - start;
            if elapsed > self.duration_ms {
                conditions.push(Condition::new(ConditionType::SetTime).with_value(elapsed));
            }
        }

        self.record(serie, rep, state_id, &conditions, angles_by_view);
        conditions
    }

    /// End the current serie early, as when the client interrupts it
    pub fn new_serie(&mut self) -> Vec<Condition> {
        if self.complete {
            return Vec::new();
        }
        let serie = self.serie_number();
        let rep = self.repetition_number();
        let state_id = self.current_state_id();

        let mut conditions = Vec::new();
        self.end_serie(self.last_time, &mut conditions);
        info!(serie, remaining_series = self.remaining_series, "Serie ended on request");

        self.record(serie, rep, state_id, &conditions, &AnglesByView::new());
        conditions
    }

    fn fired_transition(&self, conditions: &[Condition]) -> Option<usize> {
        let from = self.current_state_id();
        self.transitions
            .range((from, i64::MIN)..=(from, i64::MAX))
            .find(|(_, required)| {
                required
                    .iter()
                    .all(|needed| conditions.iter().any(|c| c.matches(needed)))
            })
            .and_then(|(&(_, to), _)| self.states.iter().position(|state| state.id() == to))
    }

    fn transition_to(&mut self, next: usize, time: i64, conditions: &mut Vec<Condition>) {
        let leaving = &self.states[self.current];
        let leaving_id = leaving.id();
        conditions.push(
            Condition::new(ConditionType::EndOfMovementPhase)
                .with_line(leaving_id.to_string())
                .with_value(time - leaving.entry_time()),
        );

        self.current = next;
        self.states[next].enter(time);
        let entered_id = self.states[next].id();
        debug!(from = leaving_id, to = entered_id, time, "State transition");

        if leaving_id == REST_STATE_ID && entered_id != REST_STATE_ID {
            self.rep_start = Some(time);
        }

        if entered_id == START_STATE_ID {
            conditions.push(Condition::new(ConditionType::ExerciseInit));
            if self.set_start.is_none() {
                self.set_start = Some(time);
            }
            self.rest_start = None;
        }

        if entered_id == REST_STATE_ID && leaving_id != REST_STATE_ID {
            let rep_time = self.rep_start.take().map_or(0, |start| time - start);
            conditions.push(Condition::new(ConditionType::EndOfRepetition).with_value(rep_time));
            self.remaining_repetitions -= 1;
            if self.remaining_repetitions <= 0 {
                self.end_serie(time, conditions);
            }
        }
    }

    fn end_serie(&mut self, time: i64, conditions: &mut Vec<Condition>) {
        conditions.push(Condition::new(ConditionType::EndOfSet));
        self.remaining_series -= 1;
        self.remaining_repetitions = self.repetitions;
        self.set_start = None;
        self.rep_start = None;

        if self.remaining_series <= 0 {
            conditions.push(Condition::new(ConditionType::EndOfExercise));
            self.rest_start = None;
            self.complete = true;
            info!(series = self.series, "Exercise complete");
        } else {
            self.rest_start = Some(time);
        }
    }

    fn record(
        &mut self,
        serie: i64,
        rep: i64,
        state_id: i64,
        conditions: &[Condition],
        angles_by_view: &AnglesByView,
    ) {
        for condition in conditions {
            self.report.add_condition(serie, rep, state_id, condition.clone());
            if condition.condition_type == ConditionType::JointOverload {
                self.report.add_overloads(&condition.keypoint_line, 1);
            }
        }
        for (line, &angle) in angles_by_view.values().flatten() {
            if angle >= 0.0 {
                self.report.merge_angle_range(line, angle, angle);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formcoach_core::models::{
        AngleConstraintSpec, ConditionSpec, PoseView, StateSpec, TransitionSpec,
    };

    const KNEE: &str = "23_25";

    /// Squat: rest (knee straight) -> down (knee bent) -> rest
    fn squat(series: i64, repetitions: i64) -> ExerciseSpec {
        let knee = |min: Option<f64>, max: Option<f64>| AngleConstraintSpec {
            line: KNEE.to_owned(),
            view: PoseView::Front,
            min_angle: min,
            max_angle: max,
            ..AngleConstraintSpec::default()
        };
        let on_knee = |condition_type| ConditionSpec {
            condition_type,
            keypoint_line: KNEE.to_owned(),
            view: None,
        };
        ExerciseSpec {
            id_ex: 1,
            name: "Squat".to_owned(),
            series,
            repetitions,
            duration_ms: 60_000,
            rest_time_ms: 30_000,
            states: vec![
                StateSpec {
                    id: 1,
                    name: "Rest".to_owned(),
                    constraints: vec![knee(Some(150.0), None)],
                    ..StateSpec::default()
                },
                StateSpec {
                    id: 2,
                    name: "Down".to_owned(),
                    constraints: vec![knee(None, Some(100.0))],
                    ..StateSpec::default()
                },
            ],
            transitions: vec![
                TransitionSpec {
                    from: 1,
                    to: 2,
                    conditions: vec![on_knee(ConditionType::MinOptAngle)],
                },
                TransitionSpec {
                    from: 2,
                    to: 1,
                    conditions: vec![on_knee(ConditionType::MaxOptAngle)],
                },
            ],
            ..ExerciseSpec::default()
        }
    }

    fn knee(angle: f64) -> AnglesByView {
        let mut by_view = AnglesByView::new();
        by_view
            .entry(PoseView::Front)
            .or_default()
            .insert(KNEE.to_owned(), angle);
        by_view
    }

    fn has(conditions: &[Condition], kind: ConditionType) -> bool {
        conditions.iter().any(|c| c.condition_type == kind)
    }

    fn find(conditions: &[Condition], kind: ConditionType) -> &Condition {
        conditions.iter().find(|c| c.condition_type == kind).unwrap()
    }

    /// Rest -> down -> rest, one frame each way after a settling frame
    fn repetition(machine: &mut StateMachine, t: i64) -> Vec<Condition> {
        machine.run(&knee(170.0), t);
        machine.run(&knee(80.0), t + 500);
        machine.run(&knee(90.0), t + 1000);
        machine.run(&knee(170.0), t + 2500)
    }

    #[test]
    fn test_rejects_exercise_without_states() {
        let spec = ExerciseSpec::default();
        assert!(matches!(
            StateMachine::new(&spec),
            Err(AnalysisError::InvalidPayload { .. })
        ));
    }

    #[test]
    fn test_rejects_unknown_transition_state() {
        let mut spec = squat(1, 1);
        spec.transitions[0].to = 9;
        assert_eq!(
            StateMachine::new(&spec).err(),
            Some(AnalysisError::UnknownState { state_id: 9 })
        );
    }

    #[test]
    fn test_entering_start_state_begins_repetition() {
        let mut machine = StateMachine::new(&squat(1, 2)).unwrap();
        assert_eq!(machine.current_state_id(), 1);
        machine.run(&knee(170.0), 0);
        let conditions = machine.run(&knee(80.0), 400);
        assert_eq!(machine.current_state_id(), 2);
        assert!(has(&conditions, ConditionType::ExerciseInit));
        let phase = find(&conditions, ConditionType::EndOfMovementPhase);
        assert_eq!(phase.keypoint_line, "1");
        assert_eq!(phase.value, Some(400));
    }

    #[test]
    fn test_returning_to_rest_counts_a_repetition() {
        let mut machine = StateMachine::new(&squat(2, 2)).unwrap();
        let conditions = repetition(&mut machine, 0);
        assert_eq!(machine.current_state_id(), 1);
        let end = find(&conditions, ConditionType::EndOfRepetition);
        assert_eq!(end.value, Some(2000));
        assert!(!has(&conditions, ConditionType::EndOfSet));
        assert_eq!(machine.remaining_repetitions(), 1);
        assert_eq!(machine.remaining_series(), 2);
    }

    #[test]
    fn test_lowest_target_state_wins() {
        let mut spec = squat(1, 2);
        spec.states.push(StateSpec {
            id: 3,
            name: "Deep".to_owned(),
            ..StateSpec::default()
        });
        let deep = TransitionSpec {
            to: 3,
            ..spec.transitions[0].clone()
        };
        spec.transitions.insert(0, deep);

        let mut machine = StateMachine::new(&spec).unwrap();
        machine.run(&knee(170.0), 0);
        let conditions = machine.run(&knee(80.0), 400);
        assert_eq!(machine.current_state_id(), 2);
        assert!(has(&conditions, ConditionType::ExerciseInit));
    }

    #[test]
    fn test_transition_without_conditions_fires_on_first_frame() {
        let mut spec = squat(1, 2);
        spec.transitions[0].conditions.clear();
        let mut machine = StateMachine::new(&spec).unwrap();
        let conditions = machine.run(&knee(170.0), 0);
        assert_eq!(machine.current_state_id(), 2);
        assert_eq!(find(&conditions, ConditionType::EndOfMovementPhase).value, Some(0));
    }

    #[test]
    fn test_only_repetitions_are_counted() {
        let mut machine = StateMachine::new(&squat(1, 3)).unwrap();
        machine.run(&knee(170.0), 0);
        machine.run(&knee(80.0), 500);
        assert_eq!(machine.remaining_repetitions(), 3);
    }

    #[test]
    fn test_completing_repetitions_ends_serie_and_exercise() {
        let mut machine = StateMachine::new(&squat(2, 1)).unwrap();
        let conditions = repetition(&mut machine, 0);
        assert!(has(&conditions, ConditionType::EndOfSet));
        assert!(!machine.is_complete());
        assert_eq!(machine.remaining_series(), 1);
        assert_eq!(machine.remaining_repetitions(), 1);
        assert_eq!(machine.serie_number(), 2);

        let conditions = repetition(&mut machine, 10_000);
        assert!(has(&conditions, ConditionType::EndOfExercise));
        assert!(machine.is_complete());
        assert!(machine.run(&knee(80.0), 20_000).is_empty());
    }

    #[test]
    fn test_rest_and_set_clocks() {
        let mut spec = squat(2, 1);
        spec.rest_time_ms = 1000;
        spec.duration_ms = 300;
        let mut machine = StateMachine::new(&spec).unwrap();
        machine.run(&knee(170.0), 0);
        machine.run(&knee(80.0), 500);
        let conditions = machine.run(&knee(85.0), 900);
        assert_eq!(find(&conditions, ConditionType::SetTime).value, Some(400));

        machine.run(&knee(170.0), 1500);
        let conditions = machine.run(&knee(170.0), 3000);
        assert_eq!(find(&conditions, ConditionType::RestOverTime).value, Some(1500));
        assert!(!has(&conditions, ConditionType::SetTime));
    }

    #[test]
    fn test_conditions_recorded_under_frame_serie_and_repetition() {
        let mut machine = StateMachine::new(&squat(2, 2)).unwrap();
        repetition(&mut machine, 0);
        repetition(&mut machine, 5000);
        assert_eq!(machine.report().stored_series(), vec![1]);
        repetition(&mut machine, 10_000);
        let report = machine.report();
        assert_eq!(report.stored_series(), vec![1, 2]);
        assert_eq!(report.stored_repetitions(1), vec![1, 2]);
        assert_eq!(report.stored_repetitions(2), vec![1]);
        assert_eq!(report.total_occurrences(ConditionType::EndOfRepetition), 3);
        assert_eq!(report.total_occurrences(ConditionType::EndOfSet), 1);
        assert_eq!(report.global_angles()[KNEE], (80.0, 170.0));
    }

    #[test]
    fn test_new_serie_interrupts_current_serie() {
        let mut machine = StateMachine::new(&squat(2, 5)).unwrap();
        repetition(&mut machine, 0);
        let conditions = machine.new_serie();
        assert!(has(&conditions, ConditionType::EndOfSet));
        assert_eq!(machine.remaining_series(), 1);
        assert_eq!(machine.remaining_repetitions(), 5);
        assert_eq!(machine.report().total_occurrences(ConditionType::EndOfSet), 1);
    }
}
