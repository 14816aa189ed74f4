// ABOUTME: Training manager for exercise specs, workouts and the running training session
// ABOUTME: Validates writes, tracks the selected workout and times the active session
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::ValidationManager;
use crate::analysis::SessionReport;
use crate::database::repositories::TrainingRepository;
use crate::errors::{AppError, AppResult};
use crate::models::{
    ExerciseSpec, ExerciseSummary, TrainingSession, TrainingWorkout, WorkoutSummary,
};

struct RunningSession {
    session: TrainingSession,
    started: Instant,
}

/// Exercise and workout operations plus the lifecycle of one training session
pub struct TrainingManager {
    repo: Arc<dyn TrainingRepository>,
    current_workout: Option<i64>,
    running: Option<RunningSession>,
}

impl TrainingManager {
    /// Create a manager with no workout selected
    #[must_use]
    pub fn new(repo: Arc<dyn TrainingRepository>) -> Self {
        Self {
            repo,
            current_workout: None,
            running: None,
        }
    }

    // ================================
    // Exercise specifications
    // ================================

    /// # Errors
    ///
    /// Returns `ResourceNotFound` if no spec has this id
    pub async fn get_exercise_spec(&self, id_ex: i64) -> AppResult<ExerciseSpec> {
        self.repo
            .get_exercise_spec(id_ex)
            .await?
            .ok_or_else(|| AppError::not_found("Exercise").with_resource_id(id_ex.to_string()))
    }

    /// Validate and store a spec, returning its id
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if validation fails or a database error if saving fails
    pub async fn save_exercise_spec(&self, spec: &mut ExerciseSpec) -> AppResult<i64> {
        ValidationManager::validate_exercise_spec(spec)?;
        let id = self.repo.save_exercise_spec(spec).await?;
        info!(id_ex = id, states = spec.states.len(), "Exercise spec saved");
        Ok(id)
    }

    /// # Errors
    ///
    /// Returns `ResourceNotFound` if no spec has this id
    pub async fn delete_exercise_spec(&self, id_ex: i64) -> AppResult<()> {
        if !self.repo.delete_exercise_spec(id_ex).await? {
            return Err(AppError::not_found("Exercise").with_resource_id(id_ex.to_string()));
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the repository fails
    pub async fn list_exercises(&self) -> AppResult<Vec<ExerciseSummary>> {
        Ok(self.repo.list_exercise_specs().await?)
    }

    // ================================
    // Workouts
    // ================================

    /// # Errors
    ///
    /// Returns `ResourceNotFound` if no workout has this id
    pub async fn get_workout(&self, id: i64) -> AppResult<TrainingWorkout> {
        self.repo
            .get_workout(id)
            .await?
            .ok_or_else(|| AppError::not_found("Workout").with_resource_id(id.to_string()))
    }

    /// Validate and store a workout, returning its id
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if validation fails or a database error if saving fails
    pub async fn save_workout(&self, workout: &mut TrainingWorkout) -> AppResult<i64> {
        ValidationManager::validate_workout(workout)?;
        let id = self.repo.save_workout(workout).await?;
        info!(workout_id = id, exercises = workout.exercises.len(), "Workout saved");
        Ok(id)
    }

    /// # Errors
    ///
    /// Returns `ResourceNotFound` if no workout has this id
    pub async fn delete_workout(&mut self, id: i64) -> AppResult<()> {
        if !self.repo.delete_workout(id).await? {
            return Err(AppError::not_found("Workout").with_resource_id(id.to_string()));
        }
        if self.current_workout == Some(id) {
            self.current_workout = None;
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the repository fails
    pub async fn list_workouts(&self) -> AppResult<Vec<WorkoutSummary>> {
        Ok(self.repo.list_workouts().await?)
    }

    /// Select the workout new sessions belong to
    pub fn set_current_workout(&mut self, id: i64) {
        debug!(workout_id = id, "Current workout selected");
        self.current_workout = Some(id);
    }

    /// Id of the selected workout
    #[must_use]
    pub const fn current_workout(&self) -> Option<i64> {
        self.current_workout
    }

    // ================================
    // Training sessions
    // ================================

    /// Open a session of `id_ex` inside the current workout and start its clock
    ///
    /// # Errors
    ///
    /// - `InvalidInput` when no workout is selected or a session is already running
    /// - `ResourceNotFound` when the workout or the exercise in it does not exist
    pub async fn start_session(&mut self, id_client: i64, id_ex: i64) -> AppResult<&TrainingSession> {
        if self.running.is_some() {
            return Err(AppError::invalid_input("a training session is already running"));
        }
        let Some(id_workout) = self.current_workout else {
            return Err(AppError::invalid_input("no workout selected"));
        };

        let workout = self.get_workout(id_workout).await?;
        let exercise = workout
            .exercises
            .into_iter()
            .find(|exercise| exercise.id_ex == id_ex)
            .ok_or_else(|| {
                AppError::not_found("Exercise in workout")
                    .with_resource_id(format!("{id_workout}/{id_ex}"))
            })?;

        info!(
            client_id = id_client,
            workout_id = id_workout,
            id_ex,
            "Training session started"
        );
        let running = self.running.insert(RunningSession {
            session: TrainingSession::new(id_client, id_workout, exercise),
            started: Instant::now(),
        });
        Ok(&running.session)
    }

    /// The running session, if any
    #[must_use]
    pub fn current_session(&self) -> Option<&TrainingSession> {
        self.running.as_ref().map(|running| &running.session)
    }

    /// Close the running session with its report and persist it
    ///
    /// The duration is the wall-clock time since [`Self::start_session`].
    ///
    /// # Errors
    ///
    /// - `InvalidInput` when no session is running
    /// - `AnalysisError` when the report cannot be serialized
    /// - `DatabaseError` when saving fails
    pub async fn end_current_session(
        &mut self,
        report: &SessionReport,
        complete: bool,
    ) -> AppResult<TrainingSession> {
        let Some(running) = self.running.take() else {
            return Err(AppError::invalid_input("no training session is running"));
        };
        let elapsed = i64::try_from(running.started.elapsed().as_millis()).unwrap_or(i64::MAX);

        let mut session = running.session;
        session.duration_ms = elapsed;
        session.complete = complete;
        session.report = Some(report.to_persisted()?);
        self.repo.save_training_session(&mut session).await?;

        info!(
            session_id = session.id,
            duration_ms = session.duration_ms,
            complete,
            "Training session saved"
        );
        Ok(session)
    }

    /// Drop the running session without saving it
    pub fn abort_current_session(&mut self) {
        if let Some(running) = self.running.take() {
            info!(client_id = running.session.id_client, "Training session discarded");
        }
    }

    /// # Errors
    ///
    /// Returns `ResourceNotFound` if no session has this id
    pub async fn get_training_session(&self, id: i64) -> AppResult<TrainingSession> {
        self.repo
            .get_training_session(id)
            .await?
            .ok_or_else(|| AppError::not_found("Training session").with_resource_id(id.to_string()))
    }

    /// # Errors
    ///
    /// Returns an error if the repository fails
    pub async fn list_session_summaries(
        &self,
        id_client: i64,
        id_workout: i64,
        id_ex: i64,
    ) -> AppResult<Vec<(i64, DateTime<Utc>)>> {
        Ok(self
            .repo
            .list_session_summaries(id_client, id_workout, id_ex)
            .await?)
    }
}
