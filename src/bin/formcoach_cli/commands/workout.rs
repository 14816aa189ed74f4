// ABOUTME: Workout commands for formcoach-cli
// ABOUTME: Imports workouts from JSON, prints and lists them
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::path::Path;

use formcoach::database::Database;
use formcoach::errors::AppResult;
use formcoach::models::TrainingWorkout;

use super::exercise::{read_json, training_manager};
use crate::helpers::display::{display_workouts, print_json};

type Result<T> = AppResult<T>;

/// Import a workout
pub async fn import(database: &Database, file: &Path) -> Result<()> {
    let mut workout: TrainingWorkout = read_json(file).await?;
    let id = training_manager(database).save_workout(&mut workout).await?;
    println!(
        "Workout '{}' stored with id {id} ({} exercises)",
        workout.name,
        workout.exercises.len()
    );
    Ok(())
}

/// Print a workout with its exercises in order
pub async fn show(database: &Database, id: i64) -> Result<()> {
    let mut workout = training_manager(database).get_workout(id).await?;
    workout.exercises = workout.exercises_in_order();
    print_json(&workout)
}

/// List stored workouts
pub async fn list(database: &Database) -> Result<()> {
    let workouts = training_manager(database).list_workouts().await?;
    display_workouts(&workouts);
    Ok(())
}
