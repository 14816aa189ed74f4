// ABOUTME: Output formatting helpers for formcoach-cli
// ABOUTME: Provides consistent tables for users, exercises, workouts, sessions and metrics
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::BTreeMap;

use formcoach::errors::AppResult;
use formcoach::models::{
    ConditionType, ExerciseSummary, RoleData, TrainingSession, User, UserRecord, WorkoutSummary,
};
use serde::Serialize;

/// Pretty-print any serializable value
pub fn print_json<T: Serialize>(value: &T) -> AppResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Confirmation after an account was created
pub fn display_user_created(record: &UserRecord) {
    let user = &record.user;
    println!("\n{} account created", user.user_type);
    println!("{}", "=".repeat(50));
    println!("   Id: {}", user.id);
    println!("   User name: {}", user.user_name);
    println!("   Name: {}", user.full_name());
    println!("   Email: {}", user.email);
    match &record.role {
        RoleData::Client(client) => {
            println!("   Plan: {}", client.plan);
            println!("   Level: {}", client.level);
        }
        RoleData::Trainer(trainer) => {
            println!("   Qualification: {}", trainer.qualification);
            println!("   Specialty: {}", trainer.specialty);
            println!("   Experience: {} years", trainer.experience_years);
        }
        RoleData::Admin(admin) => {
            println!("   Role: {}", admin.role_description);
        }
        RoleData::None => {}
    }
}

/// One line per user
pub fn display_users(users: &[User]) {
    if users.is_empty() {
        println!("No users found");
        return;
    }
    println!("{:>5}  {:<16} {:<8} {:<28} Name", "Id", "User", "Type", "Email");
    for user in users {
        println!(
            "{:>5}  {:<16} {:<8} {:<28} {}",
            user.id,
            user.user_name,
            user.user_type.as_str(),
            user.email,
            user.full_name()
        );
    }
}

/// One line per exercise
pub fn display_exercises(exercises: &[ExerciseSummary]) {
    if exercises.is_empty() {
        println!("No exercises stored");
        return;
    }
    println!("{:>5}  {:<24} {:>6} {:>5}  Description", "Id", "Name", "Series", "Reps");
    for exercise in exercises {
        println!(
            "{:>5}  {:<24} {:>6} {:>5}  {}",
            exercise.id_ex,
            exercise.name,
            exercise.series,
            exercise.repetitions,
            exercise.description
        );
    }
}

/// Workouts with their exercises
pub fn display_workouts(workouts: &[WorkoutSummary]) {
    if workouts.is_empty() {
        println!("No workouts stored");
        return;
    }
    for workout in workouts {
        println!("[{}] {} by {}", workout.id, workout.title, workout.author);
        if !workout.description.is_empty() {
            println!("    {}", workout.description);
        }
        for exercise in &workout.exercises {
            println!(
                "    {:>2}. {} ({} x {})",
                exercise.order, exercise.name, exercise.series, exercise.repetitions
            );
        }
    }
}

/// Stored session header
pub fn display_session(session: &TrainingSession) {
    println!("\nTraining session {}", session.id);
    println!("{}", "=".repeat(50));
    println!("   Client: {}", session.id_client);
    println!("   Workout: {}", session.id_workout);
    println!(
        "   Exercise: {} ({})",
        session.exercise.name, session.exercise.id_ex
    );
    println!("   Date: {}", session.date.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("   Duration: {} ms", session.duration_ms);
    println!("   Complete: {}", if session.complete { "yes" } else { "no" });
    if session.report.is_none() {
        println!("   Report: none");
    }
}

/// Condition counts under a title
pub fn display_condition_counts(title: &str, counts: &BTreeMap<ConditionType, u64>) {
    println!("\n{title}");
    if counts.is_empty() {
        println!("   (none)");
        return;
    }
    for (condition_type, count) in counts {
        println!("   {:<24} {count:>6}", condition_type.as_str());
    }
}

/// Condition type by repetition matrix
pub fn display_heatmap(heatmap: &BTreeMap<ConditionType, BTreeMap<String, u64>>) {
    println!("\nHeatmap");
    for (condition_type, cells) in heatmap {
        let row: Vec<String> = cells
            .iter()
            .map(|(label, count)| format!("{label}={count}"))
            .collect();
        println!("   {:<24} {}", condition_type.as_str(), row.join(" "));
    }
}

/// Time segments per repetition
pub fn display_segments(segments: &BTreeMap<i64, Vec<(String, i64)>>) {
    println!("\nSegments");
    for (rep, parts) in segments {
        let row: Vec<String> = parts
            .iter()
            .map(|(label, value)| format!("{label}: {value} ms"))
            .collect();
        println!("   Rep {rep:>2}  {}", row.join(", "));
    }
}
