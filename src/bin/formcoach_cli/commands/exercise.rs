// ABOUTME: Exercise specification commands for formcoach-cli
// ABOUTME: Imports specs from JSON, prints, lists and deletes them
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::path::Path;
use std::sync::Arc;

use formcoach::analysis::StateMachine;
use formcoach::database::repositories::TrainingRepositoryImpl;
use formcoach::database::Database;
use formcoach::errors::{AppError, AppResult};
use formcoach::managers::TrainingManager;
use formcoach::models::ExerciseSpec;

use crate::helpers::display::{display_exercises, print_json};

type Result<T> = AppResult<T>;

pub fn training_manager(database: &Database) -> TrainingManager {
    TrainingManager::new(Arc::new(TrainingRepositoryImpl::new(database.clone())))
}

/// Read a JSON document into `T`
pub async fn read_json<T: serde::de::DeserializeOwned>(file: &Path) -> Result<T> {
    let raw = tokio::fs::read_to_string(file).await.map_err(|e| {
        AppError::invalid_input(format!("Cannot read {}", file.display())).with_source(e)
    })?;
    serde_json::from_str(&raw).map_err(|e| {
        AppError::invalid_input(format!("{} is not a valid document: {e}", file.display()))
    })
}

/// Import an exercise specification
///
/// The spec must build a state machine before it is stored.
pub async fn import(database: &Database, file: &Path) -> Result<()> {
    let mut spec: ExerciseSpec = read_json(file).await?;
    StateMachine::new(&spec)?;

    let id = training_manager(database).save_exercise_spec(&mut spec).await?;
    println!(
        "Exercise '{}' stored with id {id} ({} states, {} transitions)",
        spec.name,
        spec.states.len(),
        spec.transitions.len()
    );
    Ok(())
}

/// Print a full specification
pub async fn show(database: &Database, id: i64) -> Result<()> {
    let spec = training_manager(database).get_exercise_spec(id).await?;
    print_json(&spec)
}

/// List stored specifications
pub async fn list(database: &Database) -> Result<()> {
    let exercises = training_manager(database).list_exercises().await?;
    display_exercises(&exercises);
    Ok(())
}

/// Delete a specification
pub async fn delete(database: &Database, id: i64) -> Result<()> {
    training_manager(database).delete_exercise_spec(id).await?;
    println!("Exercise {id} deleted");
    Ok(())
}
