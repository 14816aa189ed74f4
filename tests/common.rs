// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides database setup, sample exercises, workouts, users and pose frames
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::cast_precision_loss
)]
//! Shared test utilities for `formcoach`

use std::sync::{Arc, Once};

use anyhow::Result;
use formcoach::analysis::{Connection, KeypointConfig};
use formcoach::database::repositories::{TrainingRepositoryImpl, UserRepositoryImpl};
use formcoach::database::Database;
use formcoach::managers::{TrainingManager, UserManager};
use formcoach::models::{
    AngleConstraintSpec, ClientData, ConditionSpec, ConditionType, ExerciseSpec, ExerciseSummary,
    PoseView, StateSpec, TrainingWorkout, TransitionSpec, User, UserType,
};
use serde_json::{json, Value};

/// Hip to knee line used by the sample squat
pub const KNEE: &str = "23_25";

/// Password used for every sample account
pub const PASSWORD: &str = "secret1";

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests
///
/// Set `TEST_LOG=DEBUG` (or `TRACE`, `INFO`) to see more output.
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Fresh in-memory database with the schema in place
pub async fn create_test_database() -> Result<Database> {
    init_test_logging();
    Ok(Database::new("sqlite::memory:").await?)
}

/// User manager over `database`
pub fn user_manager(database: &Database) -> UserManager {
    UserManager::new(Arc::new(UserRepositoryImpl::new(database.clone())))
}

/// Training manager over `database`
pub fn training_manager(database: &Database) -> TrainingManager {
    TrainingManager::new(Arc::new(TrainingRepositoryImpl::new(database.clone())))
}

/// Unsaved client named after `user_name`
pub fn sample_user(user_name: &str) -> User {
    User::new(
        user_name,
        "Ana",
        "Lopez",
        format!("{user_name}@gym.example.com"),
        UserType::Client,
    )
}

/// Register a client through the login manager; returns its id
pub async fn create_client(database: &Database, user_name: &str) -> Result<i64> {
    let record = user_manager(database)
        .create_client(
            sample_user(user_name),
            PASSWORD,
            ClientData {
                plan: "Strength".into(),
                level: "Beginner".into(),
                ..ClientData::default()
            },
        )
        .await?;
    Ok(record.user.id)
}

fn knee_constraint(min: Option<f64>, max: Option<f64>) -> AngleConstraintSpec {
    AngleConstraintSpec {
        line: KNEE.to_owned(),
        view: PoseView::Front,
        min_angle: min,
        max_angle: max,
        ..AngleConstraintSpec::default()
    }
}

fn on_knee(condition_type: ConditionType) -> ConditionSpec {
    ConditionSpec {
        condition_type,
        keypoint_line: KNEE.to_owned(),
        view: None,
    }
}

/// Two-state squat: rest with the knee straight, down with the knee bent
pub fn squat_spec(series: i64, repetitions: i64) -> ExerciseSpec {
    ExerciseSpec {
        id_ex: 0,
        name: "Squat".to_owned(),
        description: "Bodyweight squat".to_owned(),
        exercise_type: "Strength".to_owned(),
        target_muscle: "Quadriceps".to_owned(),
        equipment: "None".to_owned(),
        series,
        repetitions,
        duration_ms: 60_000,
        weight_percentage: 0.0,
        rest_time_ms: 30_000,
        states: vec![
            StateSpec {
                id: 1,
                name: "Rest".to_owned(),
                constraints: vec![knee_constraint(Some(150.0), None)],
                ..StateSpec::default()
            },
            StateSpec {
                id: 2,
                name: "Down".to_owned(),
                constraints: vec![knee_constraint(None, Some(100.0))],
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
    }
}

/// Workout entry for a stored exercise
pub fn workout_entry(spec: &ExerciseSpec, order: i64) -> ExerciseSummary {
    ExerciseSummary {
        order,
        ..spec.summary()
    }
}

/// Unsaved workout by `author` holding `exercises`
pub fn sample_workout(author: i64, exercises: Vec<ExerciseSummary>) -> TrainingWorkout {
    TrainingWorkout {
        id: 0,
        name: "Leg day".to_owned(),
        description: "Lower body basics".to_owned(),
        author,
        estimated_duration_min: 45,
        exercises,
    }
}

/// Store a squat inside a one-exercise workout; returns `(id_ex, id_workout)`
pub async fn store_squat_workout(
    database: &Database,
    author: i64,
    series: i64,
    repetitions: i64,
) -> Result<(i64, i64)> {
    let training = training_manager(database);
    let mut spec = squat_spec(series, repetitions);
    let id_ex = training.save_exercise_spec(&mut spec).await?;
    let mut workout = sample_workout(author, vec![workout_entry(&spec, 1)]);
    let id_workout = training.save_workout(&mut workout).await?;
    Ok((id_ex, id_workout))
}

/// Keypoint configuration with the left hip to knee line
pub fn keypoint_config() -> KeypointConfig {
    KeypointConfig::from_json(&json!({
        "KEYPOINTS": {"23": "left_hip", "25": "left_knee"},
        "CONNECTIONS": [[23, 25]]
    }))
    .unwrap()
}

/// Connections of [`keypoint_config`]
pub fn connections() -> Vec<Connection> {
    keypoint_config().connections
}

/// Estimator payload whose hip to knee line has `knee_angle` degrees
pub fn frame(timestamp: i64, knee_angle: f64) -> Value {
    let radians = knee_angle.to_radians();
    json!({
        "timestamp": timestamp,
        "keypoints": {
            "23": {"x": 300.0, "y": 300.0},
            "25": {"x": 300.0 + 100.0 * radians.sin(), "y": 300.0 - 100.0 * radians.cos()}
        }
    })
}

/// Frames of `count` full repetitions, 500 ms apart, starting at `start`
///
/// Each repetition settles at rest, goes down, holds, and comes back up.
pub fn repetition_frames(start: i64, count: usize) -> Vec<Value> {
    let mut frames = Vec::new();
    let mut t = start;
    for _ in 0..count {
        for angle in [170.0, 80.0, 90.0, 170.0] {
            frames.push(frame(t, angle));
            t += 500;
        }
    }
    frames
}
