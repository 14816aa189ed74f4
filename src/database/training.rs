// ABOUTME: Training database operations: exercise specs, workouts and training sessions
// ABOUTME: Specs are stored across states, constraints, transitions and their conditions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, Transaction};

use super::users::parse_lenient;
use super::Database;
use crate::errors::DatabaseError;
use crate::models::{
    AngleConstraintSpec, ConditionSpec, Direction, ExerciseSpec, ExerciseSummary, PoseView,
    SessionReportJson, StateSpec, TrainingSession, TrainingWorkout, TransitionSpec,
    WorkoutSummary,
};

const SPEC_COLUMNS: &str = "id_ex, name, description, exercise_type, target_muscle, equipment, \
     series, repetitions, duration_ms, weight_percentage, rest_time_ms";

const CONSTRAINT_COLUMNS: &str = "id, line, view, min_angle, max_angle, min_safe_angle, \
     max_safe_angle, fast_threshold, slow_threshold, symmetrical_angle, evolution, tolerance";

impl Database {
    /// Create exercise, workout and session tables
    pub(super) async fn migrate_training(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS exercise_specs (
                id_ex INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                exercise_type TEXT NOT NULL DEFAULT '',
                target_muscle TEXT NOT NULL DEFAULT '',
                equipment TEXT NOT NULL DEFAULT '',
                series INTEGER NOT NULL DEFAULT 0,
                repetitions INTEGER NOT NULL DEFAULT 0,
                duration_ms INTEGER NOT NULL DEFAULT 0,
                weight_percentage REAL NOT NULL DEFAULT 0,
                rest_time_ms INTEGER NOT NULL DEFAULT 0
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS states (
                id_ex INTEGER NOT NULL REFERENCES exercise_specs(id_ex) ON DELETE CASCADE,
                id_state INTEGER NOT NULL,
                position INTEGER NOT NULL,
                name TEXT NOT NULL DEFAULT '',
                min_time_ms INTEGER NOT NULL DEFAULT 0,
                max_time_ms INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY (id_ex, id_state)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS angle_constraints (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                id_ex INTEGER NOT NULL,
                id_state INTEGER NOT NULL,
                line TEXT NOT NULL,
                view TEXT NOT NULL,
                min_angle REAL,
                max_angle REAL,
                min_safe_angle REAL,
                max_safe_angle REAL,
                fast_threshold REAL,
                slow_threshold REAL,
                symmetrical_angle REAL,
                evolution TEXT NOT NULL DEFAULT 'NotMatter',
                tolerance REAL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS transitions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                id_ex INTEGER NOT NULL,
                from_state INTEGER NOT NULL,
                to_state INTEGER NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS transition_conditions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                id_transition INTEGER NOT NULL REFERENCES transitions(id) ON DELETE CASCADE,
                condition_type TEXT NOT NULL,
                keypoint_line TEXT NOT NULL DEFAULT '',
                view TEXT
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS training_workouts (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                author INTEGER NOT NULL DEFAULT 0,
                estimated_duration_min INTEGER NOT NULL DEFAULT 0
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS workout_exercises (
                id_workout INTEGER NOT NULL REFERENCES training_workouts(id) ON DELETE CASCADE,
                id_ex INTEGER NOT NULL,
                position INTEGER NOT NULL DEFAULT 0,
                series INTEGER NOT NULL DEFAULT 0,
                repetitions INTEGER NOT NULL DEFAULT 0,
                duration_ms INTEGER NOT NULL DEFAULT 0,
                rest_time_ms INTEGER NOT NULL DEFAULT 0,
                weight_percentage REAL NOT NULL DEFAULT 0,
                PRIMARY KEY (id_workout, id_ex)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS training_sessions (
                id INTEGER PRIMARY KEY,
                id_client INTEGER NOT NULL,
                id_workout INTEGER NOT NULL,
                id_ex INTEGER NOT NULL,
                date TEXT NOT NULL,
                duration_ms INTEGER NOT NULL DEFAULT 0,
                complete BOOLEAN NOT NULL DEFAULT 0
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS session_reports (
                id_session INTEGER PRIMARY KEY REFERENCES training_sessions(id) ON DELETE CASCADE,
                series_json TEXT NOT NULL DEFAULT '',
                global_angles_json TEXT NOT NULL DEFAULT '',
                global_overloads_json TEXT NOT NULL DEFAULT '',
                log TEXT NOT NULL DEFAULT ''
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_constraints_state ON angle_constraints(id_ex, id_state)",
        )
        .execute(&self.pool)
        .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_transitions_ex ON transitions(id_ex)")
            .execute(&self.pool)
            .await?;
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_sessions_lookup ON training_sessions(id_client, id_workout, id_ex)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // ================================
    // Exercise specifications
    // ================================

    /// Next free exercise id
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn next_exercise_id(&self) -> Result<i64, DatabaseError> {
        next_id(&self.pool, "exercise_specs", "id_ex").await
    }

    /// Load a full exercise spec with states, constraints and transitions
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails or a stored name cannot be parsed
    pub async fn get_exercise_spec(&self, id_ex: i64) -> Result<Option<ExerciseSpec>, DatabaseError> {
        let Some(row) = sqlx::query(&format!(
            "SELECT {SPEC_COLUMNS} FROM exercise_specs WHERE id_ex = ?"
        ))
        .bind(id_ex)
        .fetch_optional(&self.pool)
        .await?
        else {
            return Ok(None);
        };

        let mut spec = row_to_spec(&row)?;
        spec.states = self.list_states(id_ex).await?;
        spec.transitions = self.list_transitions(id_ex).await?;
        Ok(Some(spec))
    }

    /// Insert or replace an exercise spec; assigns an id when it is 0
    ///
    /// For an existing id the stored states, constraints and transitions are deleted
    /// and written again.
    ///
    /// # Errors
    ///
    /// Returns an error if a statement fails
    pub async fn save_exercise_spec(&self, spec: &mut ExerciseSpec) -> Result<i64, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        let inserted = sqlx::query(
            r"
            INSERT OR REPLACE INTO exercise_specs
                (id_ex, name, description, exercise_type, target_muscle, equipment,
                 series, repetitions, duration_ms, weight_percentage, rest_time_ms)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(row_id(spec.id_ex))
        .bind(&spec.name)
        .bind(&spec.description)
        .bind(&spec.exercise_type)
        .bind(&spec.target_muscle)
        .bind(&spec.equipment)
        .bind(spec.series)
        .bind(spec.repetitions)
        .bind(spec.duration_ms)
        .bind(spec.weight_percentage)
        .bind(spec.rest_time_ms)
        .execute(&mut *tx)
        .await?;
        if spec.id_ex == 0 {
            spec.id_ex = inserted.last_insert_rowid();
        }
        let id_ex = spec.id_ex;

        delete_spec_children(&mut tx, id_ex).await?;

        for (position, state) in (0_i64..).zip(spec.states.iter_mut()) {
            sqlx::query(
                "INSERT INTO states (id_ex, id_state, position, name, min_time_ms, max_time_ms) VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(id_ex)
            .bind(state.id)
            .bind(position)
            .bind(&state.name)
            .bind(state.min_time_ms)
            .bind(state.max_time_ms)
            .execute(&mut *tx)
            .await
            .map_err(|e| duplicate_or(e, "state", state.id))?;

            for constraint in &mut state.constraints {
                constraint.id = insert_constraint(&mut tx, id_ex, state.id, constraint).await?;
            }
        }

        for transition in &spec.transitions {
            insert_transition(&mut tx, id_ex, transition).await?;
        }

        tx.commit().await?;
        Ok(id_ex)
    }

    /// Delete an exercise spec and everything hanging from it; returns whether it existed
    ///
    /// # Errors
    ///
    /// Returns an error if a statement fails
    pub async fn delete_exercise_spec(&self, id_ex: i64) -> Result<bool, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        delete_spec_children(&mut tx, id_ex).await?;
        sqlx::query("DELETE FROM workout_exercises WHERE id_ex = ?")
            .bind(id_ex)
            .execute(&mut *tx)
            .await?;
        let deleted = sqlx::query("DELETE FROM exercise_specs WHERE id_ex = ?")
            .bind(id_ex)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        tx.commit().await?;
        Ok(deleted > 0)
    }

    /// Summaries of every stored exercise spec, ordered by id
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_exercise_specs(&self) -> Result<Vec<ExerciseSummary>, DatabaseError> {
        let rows = sqlx::query(&format!("SELECT {SPEC_COLUMNS} FROM exercise_specs ORDER BY id_ex"))
            .fetch_all(&self.pool)
            .await?;
        rows.iter()
            .map(|row| row_to_spec(row).map(|spec| spec.summary()))
            .collect()
    }

    /// States of an exercise in their stored order, each with its constraints
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails
    pub async fn list_states(&self, id_ex: i64) -> Result<Vec<StateSpec>, DatabaseError> {
        let rows = sqlx::query(
            "SELECT id_state, name, min_time_ms, max_time_ms FROM states WHERE id_ex = ? ORDER BY position",
        )
        .bind(id_ex)
        .fetch_all(&self.pool)
        .await?;

        let mut states = Vec::with_capacity(rows.len());
        for row in rows {
            let id: i64 = row.try_get("id_state")?;
            states.push(StateSpec {
                id,
                name: row.try_get("name")?,
                min_time_ms: row.try_get("min_time_ms")?,
                max_time_ms: row.try_get("max_time_ms")?,
                constraints: self.list_constraints(id_ex, id).await?,
            });
        }
        Ok(states)
    }

    /// Constraints of one state
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored direction is unknown
    pub async fn list_constraints(
        &self,
        id_ex: i64,
        id_state: i64,
    ) -> Result<Vec<AngleConstraintSpec>, DatabaseError> {
        let rows = sqlx::query(&format!(
            "SELECT {CONSTRAINT_COLUMNS} FROM angle_constraints WHERE id_ex = ? AND id_state = ? ORDER BY id"
        ))
        .bind(id_ex)
        .bind(id_state)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_constraint).collect()
    }

    async fn list_transitions(&self, id_ex: i64) -> Result<Vec<TransitionSpec>, DatabaseError> {
        let rows = sqlx::query(
            "SELECT id, from_state, to_state FROM transitions WHERE id_ex = ? ORDER BY id",
        )
        .bind(id_ex)
        .fetch_all(&self.pool)
        .await?;

        let mut transitions = Vec::with_capacity(rows.len());
        for row in rows {
            let id: i64 = row.try_get("id")?;
            let conditions = sqlx::query(
                "SELECT condition_type, keypoint_line, view FROM transition_conditions WHERE id_transition = ? ORDER BY id",
            )
            .bind(id)
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(row_to_condition)
            .collect::<Result<Vec<_>, _>>()?;

            transitions.push(TransitionSpec {
                from: row.try_get("from_state")?,
                to: row.try_get("to_state")?,
                conditions,
            });
        }
        Ok(transitions)
    }

    // ================================
    // Workouts
    // ================================

    /// Next free workout id
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn next_workout_id(&self) -> Result<i64, DatabaseError> {
        next_id(&self.pool, "training_workouts", "id").await
    }

    /// Load a workout with its exercises sorted by order
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails
    pub async fn get_workout(&self, id: i64) -> Result<Option<TrainingWorkout>, DatabaseError> {
        let Some(row) = sqlx::query(
            "SELECT id, name, description, author, estimated_duration_min FROM training_workouts WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        else {
            return Ok(None);
        };

        Ok(Some(TrainingWorkout {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            author: row.try_get("author")?,
            estimated_duration_min: row.try_get("estimated_duration_min")?,
            exercises: self.workout_exercises(id).await?,
        }))
    }

    async fn workout_exercises(&self, id_workout: i64) -> Result<Vec<ExerciseSummary>, DatabaseError> {
        let rows = sqlx::query(
            r"
            SELECT we.id_ex, we.id_workout, we.position, we.series, we.repetitions,
                   we.duration_ms, we.rest_time_ms, we.weight_percentage,
                   COALESCE(es.name, '') AS name, COALESCE(es.description, '') AS description
            FROM workout_exercises we
            LEFT JOIN exercise_specs es ON es.id_ex = we.id_ex
            WHERE we.id_workout = ?
            ORDER BY we.position, we.id_ex
            ",
        )
        .bind(id_workout)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_workout_exercise).collect()
    }

    /// Insert or replace a workout and its exercise list; assigns an id when it is 0
    ///
    /// # Errors
    ///
    /// Returns an error if a statement fails
    pub async fn save_workout(&self, workout: &mut TrainingWorkout) -> Result<i64, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        let inserted = sqlx::query(
            r"
            INSERT OR REPLACE INTO training_workouts (id, name, description, author, estimated_duration_min)
            VALUES (?, ?, ?, ?, ?)
            ",
        )
        .bind(row_id(workout.id))
        .bind(&workout.name)
        .bind(&workout.description)
        .bind(workout.author)
        .bind(workout.estimated_duration_min)
        .execute(&mut *tx)
        .await?;
        if workout.id == 0 {
            workout.id = inserted.last_insert_rowid();
        }
        let id = workout.id;

        sqlx::query("DELETE FROM workout_exercises WHERE id_workout = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        for exercise in &mut workout.exercises {
            exercise.id_workout = id;
            sqlx::query(
                r"
                INSERT INTO workout_exercises
                    (id_workout, id_ex, position, series, repetitions, duration_ms, rest_time_ms, weight_percentage)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                ",
            )
            .bind(id)
            .bind(exercise.id_ex)
            .bind(exercise.order)
            .bind(exercise.series)
            .bind(exercise.repetitions)
            .bind(exercise.duration_ms)
            .bind(exercise.rest_time_ms)
            .bind(exercise.weight_percentage)
            .execute(&mut *tx)
            .await
            .map_err(|e| duplicate_or(e, "workout exercise", exercise.id_ex))?;
        }

        tx.commit().await?;
        Ok(id)
    }

    /// Delete a workout and its exercise list; returns whether it existed
    ///
    /// # Errors
    ///
    /// Returns an error if a statement fails
    pub async fn delete_workout(&self, id: i64) -> Result<bool, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM workout_exercises WHERE id_workout = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let deleted = sqlx::query("DELETE FROM training_workouts WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        tx.commit().await?;
        Ok(deleted > 0)
    }

    /// Listing of every workout with its author's name and distinct exercises
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails
    pub async fn list_workouts(&self) -> Result<Vec<WorkoutSummary>, DatabaseError> {
        let rows = sqlx::query(
            r"
            SELECT w.id, w.name, w.description,
                   COALESCE(u.name || ' ' || u.family_name, '') AS author_name
            FROM training_workouts w
            LEFT JOIN users u ON u.id = w.author
            ORDER BY w.id
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut summaries = Vec::with_capacity(rows.len());
        for row in rows {
            let id: i64 = row.try_get("id")?;
            let name: String = row.try_get("name")?;
            let description: String = row.try_get("description")?;
            let author: String = row.try_get("author_name")?;
            let mut summary = WorkoutSummary::new(id, &name, &description, &author);
            for exercise in self.workout_exercises(id).await? {
                summary.add_exercise(exercise);
            }
            summaries.push(summary);
        }
        Ok(summaries)
    }

    // ================================
    // Training sessions
    // ================================

    /// Next free session id
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn next_session_id(&self) -> Result<i64, DatabaseError> {
        next_id(&self.pool, "training_sessions", "id").await
    }

    /// Insert or replace a session and its report columns; assigns an id when it is 0
    ///
    /// # Errors
    ///
    /// Returns an error if a statement fails
    pub async fn save_training_session(
        &self,
        session: &mut TrainingSession,
    ) -> Result<i64, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        let inserted = sqlx::query(
            r"
            INSERT OR REPLACE INTO training_sessions (id, id_client, id_workout, id_ex, date, duration_ms, complete)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(row_id(session.id))
        .bind(session.id_client)
        .bind(session.id_workout)
        .bind(session.exercise.id_ex)
        .bind(session.date)
        .bind(session.duration_ms)
        .bind(session.complete)
        .execute(&mut *tx)
        .await?;
        if session.id == 0 {
            session.id = inserted.last_insert_rowid();
        }
        let id = session.id;

        sqlx::query("DELETE FROM session_reports WHERE id_session = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if let Some(report) = &session.report {
            sqlx::query(
                r"
                INSERT INTO session_reports (id_session, series_json, global_angles_json, global_overloads_json, log)
                VALUES (?, ?, ?, ?, ?)
                ",
            )
            .bind(id)
            .bind(&report.series_json)
            .bind(&report.global_angles_json)
            .bind(&report.global_overloads_json)
            .bind(&report.log)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(id)
    }

    /// Load a session with its exercise entry and stored report
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails
    pub async fn get_training_session(&self, id: i64) -> Result<Option<TrainingSession>, DatabaseError> {
        let Some(row) = sqlx::query(
            r"
            SELECT s.id, s.id_client, s.id_workout, s.id_ex, s.date, s.duration_ms, s.complete,
                   r.series_json, r.global_angles_json, r.global_overloads_json, r.log
            FROM training_sessions s
            LEFT JOIN session_reports r ON r.id_session = s.id
            WHERE s.id = ?
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        else {
            return Ok(None);
        };

        let id_workout: i64 = row.try_get("id_workout")?;
        let id_ex: i64 = row.try_get("id_ex")?;
        let exercise = self.session_exercise(id_workout, id_ex).await?;

        let series_json: Option<String> = row.try_get("series_json")?;
        let report = match series_json {
            Some(series_json) => Some(SessionReportJson {
                series_json,
                global_angles_json: row.try_get("global_angles_json")?,
                global_overloads_json: row.try_get("global_overloads_json")?,
                log: row.try_get("log")?,
            }),
            None => None,
        };

        Ok(Some(TrainingSession {
            id: row.try_get("id")?,
            id_client: row.try_get("id_client")?,
            id_workout,
            exercise,
            date: row.try_get("date")?,
            duration_ms: row.try_get("duration_ms")?,
            complete: row.try_get("complete")?,
            report,
        }))
    }

    async fn session_exercise(&self, id_workout: i64, id_ex: i64) -> Result<ExerciseSummary, DatabaseError> {
        if let Some(exercise) = self
            .workout_exercises(id_workout)
            .await?
            .into_iter()
            .find(|exercise| exercise.id_ex == id_ex)
        {
            return Ok(exercise);
        }
        let row = sqlx::query(&format!(
            "SELECT {SPEC_COLUMNS} FROM exercise_specs WHERE id_ex = ?"
        ))
        .bind(id_ex)
        .fetch_optional(&self.pool)
        .await?;
        Ok(match row {
            Some(row) => row_to_spec(&row)?.summary(),
            None => ExerciseSummary {
                id_ex,
                id_workout,
                ..ExerciseSummary::default()
            },
        })
    }

    /// Ids and dates of a client's sessions for one workout exercise, oldest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_session_summaries(
        &self,
        id_client: i64,
        id_workout: i64,
        id_ex: i64,
    ) -> Result<Vec<(i64, DateTime<Utc>)>, DatabaseError> {
        let rows = sqlx::query(
            r"
            SELECT id, date FROM training_sessions
            WHERE id_client = ? AND id_workout = ? AND id_ex = ?
            ORDER BY date, id
            ",
        )
        .bind(id_client)
        .bind(id_workout)
        .bind(id_ex)
        .fetch_all(&self.pool)
        .await?;

        let mut summaries = Vec::with_capacity(rows.len());
        for row in rows {
            summaries.push((row.try_get("id")?, row.try_get("date")?));
        }
        Ok(summaries)
    }
}

/// Id to bind on insert; `NULL` lets SQLite allocate the rowid inside the statement
pub(super) const fn row_id(id: i64) -> Option<i64> {
    if id == 0 {
        None
    } else {
        Some(id)
    }
}

async fn next_id(pool: &sqlx::SqlitePool, table: &str, column: &str) -> Result<i64, DatabaseError> {
    let next: i64 = sqlx::query_scalar(&format!("SELECT COALESCE(MAX({column}), 0) + 1 FROM {table}"))
        .fetch_one(pool)
        .await?;
    Ok(next)
}

async fn delete_spec_children(
    tx: &mut Transaction<'_, Sqlite>,
    id_ex: i64,
) -> Result<(), DatabaseError> {
    sqlx::query(
        "DELETE FROM transition_conditions WHERE id_transition IN (SELECT id FROM transitions WHERE id_ex = ?)",
    )
    .bind(id_ex)
    .execute(&mut **tx)
    .await?;
    for table in ["transitions", "angle_constraints", "states"] {
        sqlx::query(&format!("DELETE FROM {table} WHERE id_ex = ?"))
            .bind(id_ex)
            .execute(&mut **tx)
            .await?;
    }
    Ok(())
}

async fn insert_constraint(
    tx: &mut Transaction<'_, Sqlite>,
    id_ex: i64,
    id_state: i64,
    constraint: &AngleConstraintSpec,
) -> Result<i64, DatabaseError> {
    let result = sqlx::query(
        r"
        INSERT INTO angle_constraints
            (id_ex, id_state, line, view, min_angle, max_angle, min_safe_angle, max_safe_angle,
             fast_threshold, slow_threshold, symmetrical_angle, evolution, tolerance)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ",
    )
    .bind(id_ex)
    .bind(id_state)
    .bind(&constraint.line)
    .bind(constraint.view.as_str())
    .bind(constraint.min_angle)
    .bind(constraint.max_angle)
    .bind(constraint.min_safe_angle)
    .bind(constraint.max_safe_angle)
    .bind(constraint.fast_threshold)
    .bind(constraint.slow_threshold)
    .bind(constraint.symmetrical_angle)
    .bind(constraint.evolution.as_str())
    .bind(constraint.tolerance)
    .execute(&mut **tx)
    .await?;
    Ok(result.last_insert_rowid())
}

async fn insert_transition(
    tx: &mut Transaction<'_, Sqlite>,
    id_ex: i64,
    transition: &TransitionSpec,
) -> Result<(), DatabaseError> {
    let id_transition = sqlx::query("INSERT INTO transitions (id_ex, from_state, to_state) VALUES (?, ?, ?)")
        .bind(id_ex)
        .bind(transition.from)
        .bind(transition.to)
        .execute(&mut **tx)
        .await?
        .last_insert_rowid();

    for condition in &transition.conditions {
        sqlx::query(
            "INSERT INTO transition_conditions (id_transition, condition_type, keypoint_line, view) VALUES (?, ?, ?, ?)",
        )
        .bind(id_transition)
        .bind(condition.condition_type.as_str())
        .bind(&condition.keypoint_line)
        .bind(condition.view.map(PoseView::as_str))
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

fn duplicate_or(error: sqlx::Error, entity_type: &'static str, key: i64) -> DatabaseError {
    match &error {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => DatabaseError::Duplicate {
            entity_type,
            key: key.to_string(),
        },
        _ => DatabaseError::from(error),
    }
}

fn row_to_spec(row: &SqliteRow) -> Result<ExerciseSpec, DatabaseError> {
    Ok(ExerciseSpec {
        id_ex: row.try_get("id_ex")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        exercise_type: row.try_get("exercise_type")?,
        target_muscle: row.try_get("target_muscle")?,
        equipment: row.try_get("equipment")?,
        series: row.try_get("series")?,
        repetitions: row.try_get("repetitions")?,
        duration_ms: row.try_get("duration_ms")?,
        weight_percentage: row.try_get("weight_percentage")?,
        rest_time_ms: row.try_get("rest_time_ms")?,
        states: Vec::new(),
        transitions: Vec::new(),
    })
}

fn row_to_constraint(row: &SqliteRow) -> Result<AngleConstraintSpec, DatabaseError> {
    let view: String = row.try_get("view")?;
    let evolution: String = row.try_get("evolution")?;
    Ok(AngleConstraintSpec {
        id: row.try_get("id")?,
        line: row.try_get("line")?,
        view: parse_lenient(&view),
        min_angle: row.try_get("min_angle")?,
        max_angle: row.try_get("max_angle")?,
        min_safe_angle: row.try_get("min_safe_angle")?,
        max_safe_angle: row.try_get("max_safe_angle")?,
        fast_threshold: row.try_get("fast_threshold")?,
        slow_threshold: row.try_get("slow_threshold")?,
        symmetrical_angle: row.try_get("symmetrical_angle")?,
        evolution: evolution
            .parse::<Direction>()
            .map_err(|e| DatabaseError::SerializationError(e.message))?,
        tolerance: row.try_get("tolerance")?,
    })
}

fn row_to_condition(row: &SqliteRow) -> Result<ConditionSpec, DatabaseError> {
    let condition_type: String = row.try_get("condition_type")?;
    let view: Option<String> = row.try_get("view")?;
    Ok(ConditionSpec {
        condition_type: condition_type
            .parse()
            .map_err(|e: crate::errors::AppError| DatabaseError::SerializationError(e.message))?,
        keypoint_line: row.try_get("keypoint_line")?,
        view: view.as_deref().map(parse_lenient),
    })
}

fn row_to_workout_exercise(row: &SqliteRow) -> Result<ExerciseSummary, DatabaseError> {
    Ok(ExerciseSummary {
        id_ex: row.try_get("id_ex")?,
        id_workout: row.try_get("id_workout")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        order: row.try_get("position")?,
        series: row.try_get("series")?,
        repetitions: row.try_get("repetitions")?,
        duration_ms: row.try_get("duration_ms")?,
        rest_time_ms: row.try_get("rest_time_ms")?,
        weight_percentage: row.try_get("weight_percentage")?,
    })
}
