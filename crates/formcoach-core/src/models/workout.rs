// ABOUTME: Exercise specifications, workouts, and training session models
// ABOUTME: Persisted shapes for states, constraints, transitions and session reports
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::condition::{ConditionType, Direction};
use super::preferences::PoseView;

/// Persisted form of an angle constraint on one keypoint line
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AngleConstraintSpec {
    /// Constraint id, 0 until persisted
    pub id: i64,
    /// Keypoint line (`"<a>_<b>"`)
    pub line: String,
    /// Camera view the line is measured in
    pub view: PoseView,
    /// Optimal minimum angle
    pub min_angle: Option<f64>,
    /// Optimal maximum angle
    pub max_angle: Option<f64>,
    /// Minimum safe angle
    pub min_safe_angle: Option<f64>,
    /// Maximum safe angle
    pub max_safe_angle: Option<f64>,
    /// Per-frame change above which the movement is too fast
    pub fast_threshold: Option<f64>,
    /// Per-frame change below which the movement is too slow
    pub slow_threshold: Option<f64>,
    /// Symmetry reference angle
    pub symmetrical_angle: Option<f64>,
    /// Expected evolution
    pub evolution: Direction,
    /// Noise tolerance in degrees
    pub tolerance: Option<f64>,
}

/// Persisted form of a state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateSpec {
    /// State id, unique within the exercise
    pub id: i64,
    /// Display name
    pub name: String,
    /// Minimum time to stay in the state (ms)
    pub min_time_ms: i64,
    /// Maximum time to stay in the state (ms)
    pub max_time_ms: i64,
    /// Constraints evaluated while in the state
    pub constraints: Vec<AngleConstraintSpec>,
}

/// Persisted form of a required condition in a transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionSpec {
    /// Condition kind
    pub condition_type: ConditionType,
    /// Keypoint line, empty for line-independent conditions
    #[serde(default)]
    pub keypoint_line: String,
    /// View; `None` matches any view
    #[serde(default)]
    pub view: Option<PoseView>,
}

/// Persisted form of a transition between two states
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionSpec {
    /// Source state id
    pub from: i64,
    /// Target state id
    pub to: i64,
    /// Conditions that must all be reported for the transition to fire
    #[serde(default)]
    pub conditions: Vec<ConditionSpec>,
}

/// Full exercise definition designed by a trainer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExerciseSpec {
    /// Exercise id, 0 until persisted
    pub id_ex: i64,
    /// Exercise name
    pub name: String,
    /// Description
    pub description: String,
    /// Type (strength, mobility...)
    pub exercise_type: String,
    /// Main target muscle
    pub target_muscle: String,
    /// Required equipment
    pub equipment: String,
    /// Number of series
    pub series: i64,
    /// Repetitions per serie
    pub repetitions: i64,
    /// Maximum duration of a serie (ms)
    pub duration_ms: i64,
    /// Load as a percentage of the client's reference
    pub weight_percentage: f64,
    /// Rest between series (ms)
    pub rest_time_ms: i64,
    /// States, the first one is the initial state
    pub states: Vec<StateSpec>,
    /// Transition table
    pub transitions: Vec<TransitionSpec>,
}

impl ExerciseSpec {
    /// Find a state by id
    #[must_use]
    pub fn state(&self, id: i64) -> Option<&StateSpec> {
        self.states.iter().find(|state| state.id == id)
    }

    /// Lightweight summary for listings and workouts
    #[must_use]
    pub fn summary(&self) -> ExerciseSummary {
        ExerciseSummary {
            id_ex: self.id_ex,
            id_workout: 0,
            name: self.name.clone(),
            description: self.description.clone(),
            order: 0,
            series: self.series,
            repetitions: self.repetitions,
            duration_ms: self.duration_ms,
            rest_time_ms: self.rest_time_ms,
            weight_percentage: self.weight_percentage,
        }
    }
}

/// Exercise as it appears inside a workout, with per-workout parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExerciseSummary {
    /// Exercise id
    pub id_ex: i64,
    /// Workout the entry belongs to, 0 when standalone
    pub id_workout: i64,
    /// Exercise name
    pub name: String,
    /// Description
    pub description: String,
    /// Position inside the workout
    pub order: i64,
    /// Number of series
    pub series: i64,
    /// Repetitions per serie
    pub repetitions: i64,
    /// Maximum duration of a serie (ms)
    pub duration_ms: i64,
    /// Rest between series (ms)
    pub rest_time_ms: i64,
    /// Load percentage
    pub weight_percentage: f64,
}

impl PartialEq for ExerciseSummary {
    fn eq(&self, other: &Self) -> bool {
        self.id_ex == other.id_ex
    }
}

impl Eq for ExerciseSummary {}

/// Workout: an ordered list of exercises
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingWorkout {
    /// Workout id, 0 until persisted
    pub id: i64,
    /// Name
    pub name: String,
    /// Description
    pub description: String,
    /// Author (trainer user id)
    pub author: i64,
    /// Estimated duration in minutes
    pub estimated_duration_min: i64,
    /// Exercises with their order
    pub exercises: Vec<ExerciseSummary>,
}

impl TrainingWorkout {
    /// Exercises sorted by their `order` field
    #[must_use]
    pub fn exercises_in_order(&self) -> Vec<ExerciseSummary> {
        let mut exercises = self.exercises.clone();
        exercises.sort_by_key(|exercise| exercise.order);
        exercises
    }
}

/// Workout listing entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutSummary {
    /// Workout id
    pub id: i64,
    /// Trimmed title
    pub title: String,
    /// Trimmed description
    pub description: String,
    /// Trimmed author name
    pub author: String,
    /// Distinct exercises
    pub exercises: Vec<ExerciseSummary>,
}

impl WorkoutSummary {
    /// Build a summary, trimming the text fields
    #[must_use]
    pub fn new(id: i64, title: &str, description: &str, author: &str) -> Self {
        Self {
            id,
            title: title.trim().to_owned(),
            description: description.trim().to_owned(),
            author: author.trim().to_owned(),
            exercises: Vec::new(),
        }
    }

    /// Add an exercise; returns `false` if one with the same id is already present
    pub fn add_exercise(&mut self, exercise: ExerciseSummary) -> bool {
        if self.exercises.contains(&exercise) {
            return false;
        }
        self.exercises.push(exercise);
        true
    }

    /// Find an exercise by id
    #[must_use]
    pub fn get_exercise(&self, id_ex: i64) -> Option<&ExerciseSummary> {
        self.exercises.iter().find(|exercise| exercise.id_ex == id_ex)
    }
}

/// Session report as stored in the database (JSON columns plus the text log)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionReportJson {
    /// Per serie/rep/state condition counts
    pub series_json: String,
    /// Per-line angle ranges
    pub global_angles_json: String,
    /// Per-line overload counts
    pub global_overloads_json: String,
    /// Free text log
    pub log: String,
}

/// One client's execution of one exercise from a workout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSession {
    /// Session id, 0 until persisted
    pub id: i64,
    /// Client user id
    pub id_client: i64,
    /// Workout id
    pub id_workout: i64,
    /// Exercise performed
    pub exercise: ExerciseSummary,
    /// Start instant
    pub date: DateTime<Utc>,
    /// Duration in ms
    pub duration_ms: i64,
    /// Whether every serie was completed
    pub complete: bool,
    /// Stored report, if the session produced one
    pub report: Option<SessionReportJson>,
}

impl TrainingSession {
    /// New, unsaved session starting now
    #[must_use]
    pub fn new(id_client: i64, id_workout: i64, exercise: ExerciseSummary) -> Self {
        Self {
            id: 0,
            id_client,
            id_workout,
            exercise,
            date: Utc::now(),
            duration_ms: 0,
            complete: false,
            report: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(id_ex: i64, order: i64) -> ExerciseSummary {
        ExerciseSummary {
            id_ex,
            order,
            name: format!("Exercise {id_ex}"),
            ..ExerciseSummary::default()
        }
    }

    #[test]
    fn test_workout_summary_rejects_duplicates() {
        let mut workout = WorkoutSummary::new(1, "  Legs ", " Squat day ", " Marta ");
        assert_eq!(workout.title, "Legs");
        assert_eq!(workout.author, "Marta");
        assert!(workout.add_exercise(summary(4, 1)));
        assert!(!workout.add_exercise(summary(4, 2)));
        assert_eq!(workout.exercises.len(), 1);
        assert!(workout.get_exercise(4).is_some());
        assert!(workout.get_exercise(5).is_none());
    }

    #[test]
    fn test_exercises_sorted_by_order() {
        let workout = TrainingWorkout {
            exercises: vec![summary(1, 3), summary(2, 1), summary(3, 2)],
            ..TrainingWorkout::default()
        };
        let ids: Vec<i64> = workout
            .exercises_in_order()
            .iter()
            .map(|exercise| exercise.id_ex)
            .collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_exercise_spec_deserializes_with_defaults() {
        let spec: ExerciseSpec = serde_json::from_str(
            r#"{"name": "Squat", "series": 3, "states": [{"id": 1, "name": "Rest"}]}"#,
        )
        .unwrap();
        assert_eq!(spec.series, 3);
        assert_eq!(spec.repetitions, 0);
        assert_eq!(spec.state(1).map(|s| s.name.as_str()), Some("Rest"));
    }
}
