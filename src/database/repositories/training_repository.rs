// ABOUTME: Training repository implementation for exercise specs, workouts and sessions
// ABOUTME: Delegates to the Database training queries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::TrainingRepository;
use crate::database::{Database, DatabaseError};
use crate::models::{
    AngleConstraintSpec, ExerciseSpec, ExerciseSummary, StateSpec, TrainingSession,
    TrainingWorkout, WorkoutSummary,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// `SQLite` implementation of `TrainingRepository`
#[derive(Clone)]
pub struct TrainingRepositoryImpl {
    db: Database,
}

impl TrainingRepositoryImpl {
    /// Create a new `TrainingRepository` with the given database connection
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TrainingRepository for TrainingRepositoryImpl {
    async fn get_exercise_spec(&self, id_ex: i64) -> Result<Option<ExerciseSpec>, DatabaseError> {
        self.db.get_exercise_spec(id_ex).await
    }

    async fn save_exercise_spec(&self, spec: &mut ExerciseSpec) -> Result<i64, DatabaseError> {
        self.db.save_exercise_spec(spec).await
    }

    async fn delete_exercise_spec(&self, id_ex: i64) -> Result<bool, DatabaseError> {
        self.db.delete_exercise_spec(id_ex).await
    }

    async fn get_workout(&self, id: i64) -> Result<Option<TrainingWorkout>, DatabaseError> {
        self.db.get_workout(id).await
    }

    async fn save_workout(&self, workout: &mut TrainingWorkout) -> Result<i64, DatabaseError> {
        self.db.save_workout(workout).await
    }

    async fn delete_workout(&self, id: i64) -> Result<bool, DatabaseError> {
        self.db.delete_workout(id).await
    }

    async fn save_training_session(
        &self,
        session: &mut TrainingSession,
    ) -> Result<i64, DatabaseError> {
        self.db.save_training_session(session).await
    }

    async fn get_training_session(
        &self,
        id: i64,
    ) -> Result<Option<TrainingSession>, DatabaseError> {
        self.db.get_training_session(id).await
    }

    async fn list_session_summaries(
        &self,
        id_client: i64,
        id_workout: i64,
        id_ex: i64,
    ) -> Result<Vec<(i64, DateTime<Utc>)>, DatabaseError> {
        self.db
            .list_session_summaries(id_client, id_workout, id_ex)
            .await
    }

    async fn list_workouts(&self) -> Result<Vec<WorkoutSummary>, DatabaseError> {
        self.db.list_workouts().await
    }

    async fn list_exercise_specs(&self) -> Result<Vec<ExerciseSummary>, DatabaseError> {
        self.db.list_exercise_specs().await
    }

    async fn list_states(&self, id_ex: i64) -> Result<Vec<StateSpec>, DatabaseError> {
        self.db.list_states(id_ex).await
    }

    async fn list_constraints(
        &self,
        id_ex: i64,
        id_state: i64,
    ) -> Result<Vec<AngleConstraintSpec>, DatabaseError> {
        self.db.list_constraints(id_ex, id_state).await
    }

    async fn next_exercise_id(&self) -> Result<i64, DatabaseError> {
        self.db.next_exercise_id().await
    }

    async fn next_workout_id(&self) -> Result<i64, DatabaseError> {
        self.db.next_workout_id().await
    }

    async fn next_session_id(&self) -> Result<i64, DatabaseError> {
        self.db.next_session_id().await
    }
}
