// ABOUTME: Core data models shared by the analysis engine and the persistence layer
// ABOUTME: Users, profiles, preferences, conditions, exercises, workouts and sessions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Condition and direction enumerations
pub mod condition;
/// Camera views and user preferences
pub mod preferences;
/// Client profile sections
pub mod profile;
/// User accounts and role data
pub mod user;
/// Exercise specs, workouts and training sessions
pub mod workout;

pub use condition::{ConditionType, Direction};
pub use preferences::{FeedbackMode, PoseView, UserPreferences};
pub use profile::{ClientProfile, ProfileSection};
pub use user::{AdminData, ClientData, RoleData, TrainerData, User, UserRecord, UserType};
pub use workout::{
    AngleConstraintSpec, ConditionSpec, ExerciseSpec, ExerciseSummary, SessionReportJson,
    StateSpec, TrainingSession, TrainingWorkout, TransitionSpec, WorkoutSummary,
};
