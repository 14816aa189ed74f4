// ABOUTME: Repository traits separating managers from the SQLite database layer
// ABOUTME: Each trait has a *RepositoryImpl that delegates to Database
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Repository pattern for data access
//!
//! Managers depend on these traits rather than on [`Database`](super::Database) so
//! they can be exercised against in-memory databases or hand-written fakes.

/// Exercise, workout and session repository
pub mod training_repository;
/// User account repository
pub mod user_repository;

pub use training_repository::TrainingRepositoryImpl;
pub use user_repository::UserRepositoryImpl;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::DatabaseError;
use crate::models::{
    AngleConstraintSpec, ClientProfile, ExerciseSpec, ExerciseSummary, StateSpec,
    TrainingSession, TrainingWorkout, User, UserPreferences, UserRecord, UserType,
    WorkoutSummary,
};

/// User accounts, role data, client profiles and preferences
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// User with its role row
    async fn get_user_by_id(&self, id: i64) -> Result<Option<UserRecord>, DatabaseError>;

    /// Lookup by exact user name
    async fn get_user_by_name(&self, user_name: &str)
        -> Result<Option<UserRecord>, DatabaseError>;

    /// Lookup by email, ignoring case
    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, DatabaseError>;

    /// All users, optionally restricted to one type
    async fn list_users(&self, user_type: Option<UserType>) -> Result<Vec<User>, DatabaseError>;

    /// Insert or update a user and its role row, returning the id
    async fn save_user(&self, record: &UserRecord) -> Result<i64, DatabaseError>;

    /// Delete a user from every table; returns whether it existed
    async fn delete_user(&self, id: i64) -> Result<bool, DatabaseError>;

    /// Stamp the last login time
    async fn update_last_login(&self, id: i64, at: DateTime<Utc>) -> Result<(), DatabaseError>;

    /// Replace the stored bcrypt hash
    async fn update_password_hash(&self, id: i64, hash: &str) -> Result<(), DatabaseError>;

    /// Client profile, empty when none is stored
    async fn get_client_profile(&self, id_user: i64) -> Result<ClientProfile, DatabaseError>;

    /// Replace the client profile
    async fn save_client_profile(
        &self,
        id_user: i64,
        profile: &ClientProfile,
    ) -> Result<(), DatabaseError>;

    /// Stored preferences of a user
    async fn get_preferences(&self, id_user: i64)
        -> Result<Option<UserPreferences>, DatabaseError>;

    /// Insert or replace preferences
    async fn save_preferences(&self, preferences: &UserPreferences) -> Result<(), DatabaseError>;

    /// Whether a user name is taken
    async fn user_name_exists(&self, user_name: &str) -> Result<bool, DatabaseError>;

    /// Next free user id
    async fn next_user_id(&self) -> Result<i64, DatabaseError>;
}

/// Exercise specifications, workouts and training sessions
#[async_trait]
pub trait TrainingRepository: Send + Sync {
    /// Full exercise spec with states, constraints and transitions
    async fn get_exercise_spec(&self, id_ex: i64) -> Result<Option<ExerciseSpec>, DatabaseError>;

    /// Insert or replace a spec, assigning an id when it is 0
    async fn save_exercise_spec(&self, spec: &mut ExerciseSpec) -> Result<i64, DatabaseError>;

    /// Delete a spec; returns whether it existed
    async fn delete_exercise_spec(&self, id_ex: i64) -> Result<bool, DatabaseError>;

    /// Workout with its exercises sorted by order
    async fn get_workout(&self, id: i64) -> Result<Option<TrainingWorkout>, DatabaseError>;

    /// Insert or replace a workout, assigning an id when it is 0
    async fn save_workout(&self, workout: &mut TrainingWorkout) -> Result<i64, DatabaseError>;

    /// Delete a workout; returns whether it existed
    async fn delete_workout(&self, id: i64) -> Result<bool, DatabaseError>;

    /// Insert or replace a session and its report, assigning an id when it is 0
    async fn save_training_session(
        &self,
        session: &mut TrainingSession,
    ) -> Result<i64, DatabaseError>;

    /// Session with its report
    async fn get_training_session(&self, id: i64)
        -> Result<Option<TrainingSession>, DatabaseError>;

    /// Ids and dates of a client's sessions for one workout exercise
    async fn list_session_summaries(
        &self,
        id_client: i64,
        id_workout: i64,
        id_ex: i64,
    ) -> Result<Vec<(i64, DateTime<Utc>)>, DatabaseError>;

    /// Every workout with author name and exercises
    async fn list_workouts(&self) -> Result<Vec<WorkoutSummary>, DatabaseError>;

    /// Every exercise spec as a summary
    async fn list_exercise_specs(&self) -> Result<Vec<ExerciseSummary>, DatabaseError>;

    /// States of one exercise
    async fn list_states(&self, id_ex: i64) -> Result<Vec<StateSpec>, DatabaseError>;

    /// Constraints of one state
    async fn list_constraints(
        &self,
        id_ex: i64,
        id_state: i64,
    ) -> Result<Vec<AngleConstraintSpec>, DatabaseError>;

    /// Next free exercise id
    async fn next_exercise_id(&self) -> Result<i64, DatabaseError>;

    /// Next free workout id
    async fn next_workout_id(&self) -> Result<i64, DatabaseError>;

    /// Next free session id
    async fn next_session_id(&self) -> Result<i64, DatabaseError>;
}
