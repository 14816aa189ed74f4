// ABOUTME: Integration tests for exercise specs, workouts and training sessions in SQLite
// ABOUTME: Checks full spec round trips, workout ordering, author names and session reports
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(missing_docs, clippy::unwrap_used)]

mod common;

use common::{create_client, create_test_database, sample_workout, squat_spec, workout_entry};
use formcoach::database::{Database, DatabaseError};
use formcoach::models::{
    ConditionSpec, ConditionType, Direction, PoseView, SessionReportJson, TrainingSession,
};

#[tokio::test]
async fn test_exercise_spec_round_trip() {
    let db = create_test_database().await.unwrap();
    let mut spec = squat_spec(3, 10);
    spec.states[0].constraints[0].tolerance = Some(4.0);
    spec.states[0].constraints[0].evolution = Direction::Increase;
    spec.states[1].max_time_ms = 5_000;
    spec.transitions[1].conditions.push(ConditionSpec {
        condition_type: ConditionType::MinStateTimeout,
        keypoint_line: String::new(),
        view: Some(PoseView::Left),
    });

    let id_ex = db.save_exercise_spec(&mut spec).await.unwrap();
    assert_eq!(id_ex, 1);
    assert_eq!(spec.id_ex, 1);
    assert!(spec.states.iter().flat_map(|s| &s.constraints).all(|c| c.id > 0));

    let stored = db.get_exercise_spec(id_ex).await.unwrap().unwrap();
    assert_eq!(stored, spec);
    assert_eq!(stored.states[0].constraints[0].max_angle, None);
    assert_eq!(stored.states[0].constraints[0].min_angle, Some(150.0));
}

#[tokio::test]
async fn test_saving_a_spec_again_replaces_its_children() {
    let db = create_test_database().await.unwrap();
    let mut spec = squat_spec(1, 5);
    let id_ex = db.save_exercise_spec(&mut spec).await.unwrap();

    spec.name = "Deep squat".into();
    spec.states[1].constraints[0].max_angle = Some(70.0);
    spec.transitions.pop();
    db.save_exercise_spec(&mut spec).await.unwrap();

    let stored = db.get_exercise_spec(id_ex).await.unwrap().unwrap();
    assert_eq!(stored.name, "Deep squat");
    assert_eq!(stored.transitions.len(), 1);
    assert_eq!(db.list_states(id_ex).await.unwrap().len(), 2);
    let constraints = db.list_constraints(id_ex, 2).await.unwrap();
    assert_eq!(constraints.len(), 1);
    assert_eq!(constraints[0].max_angle, Some(70.0));
    assert_eq!(db.list_exercise_specs().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_duplicate_state_ids_are_rejected() {
    let db = create_test_database().await.unwrap();
    let mut spec = squat_spec(1, 1);
    spec.states[1].id = 1;
    let err = db.save_exercise_spec(&mut spec).await.unwrap_err();
    assert!(matches!(err, DatabaseError::Duplicate { .. }));
    assert!(db.list_exercise_specs().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_exercise_spec() {
    let db = create_test_database().await.unwrap();
    let mut spec = squat_spec(1, 1);
    let id_ex = db.save_exercise_spec(&mut spec).await.unwrap();
    let mut workout = sample_workout(0, vec![workout_entry(&spec, 1)]);
    let id_workout = db.save_workout(&mut workout).await.unwrap();

    assert!(db.delete_exercise_spec(id_ex).await.unwrap());
    assert!(db.get_exercise_spec(id_ex).await.unwrap().is_none());
    assert!(db.list_states(id_ex).await.unwrap().is_empty());
    let workout = db.get_workout(id_workout).await.unwrap().unwrap();
    assert!(workout.exercises.is_empty());
    assert!(!db.delete_exercise_spec(id_ex).await.unwrap());
}

#[tokio::test]
async fn test_workout_keeps_exercise_order_and_parameters() {
    let db = create_test_database().await.unwrap();
    let mut squat = squat_spec(3, 10);
    db.save_exercise_spec(&mut squat).await.unwrap();
    let mut lunge = squat_spec(2, 8);
    lunge.name = "Lunge".into();
    db.save_exercise_spec(&mut lunge).await.unwrap();

    let mut light_squat = workout_entry(&squat, 2);
    light_squat.repetitions = 6;
    let mut workout = sample_workout(0, vec![light_squat, workout_entry(&lunge, 1)]);
    let id = db.save_workout(&mut workout).await.unwrap();
    assert!(workout.exercises.iter().all(|e| e.id_workout == id));

    let stored = db.get_workout(id).await.unwrap().unwrap();
    assert_eq!(stored.name, "Leg day");
    assert_eq!(stored.estimated_duration_min, 45);
    let names: Vec<&str> = stored.exercises.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Lunge", "Squat"]);
    assert_eq!(stored.exercises[1].repetitions, 6);
    assert_eq!(stored.exercises[1].series, 3);
}

#[tokio::test]
async fn test_list_workouts_names_the_author() {
    let db = create_test_database().await.unwrap();
    let author = create_client(&db, "ana").await.unwrap();
    let mut spec = squat_spec(1, 1);
    db.save_exercise_spec(&mut spec).await.unwrap();
    db.save_workout(&mut sample_workout(author, vec![workout_entry(&spec, 1)]))
        .await
        .unwrap();
    db.save_workout(&mut sample_workout(99, Vec::new()))
        .await
        .unwrap();

    let workouts = db.list_workouts().await.unwrap();
    assert_eq!(workouts.len(), 2);
    assert_eq!(workouts[0].author, "Ana Lopez");
    assert_eq!(workouts[0].exercises.len(), 1);
    assert_eq!(workouts[1].author, "");
}

#[tokio::test]
async fn test_delete_workout() {
    let db = create_test_database().await.unwrap();
    let id = db
        .save_workout(&mut sample_workout(0, Vec::new()))
        .await
        .unwrap();
    assert!(db.delete_workout(id).await.unwrap());
    assert!(db.get_workout(id).await.unwrap().is_none());
    assert!(!db.delete_workout(id).await.unwrap());
}

#[tokio::test]
async fn test_training_session_with_report() {
    let db = create_test_database().await.unwrap();
    let mut spec = squat_spec(1, 1);
    db.save_exercise_spec(&mut spec).await.unwrap();
    let mut workout = sample_workout(0, vec![workout_entry(&spec, 1)]);
    let id_workout = db.save_workout(&mut workout).await.unwrap();

    let mut session = TrainingSession::new(7, id_workout, workout.exercises[0].clone());
    session.duration_ms = 42_000;
    session.complete = true;
    session.report = Some(SessionReportJson {
        series_json: "{}".into(),
        global_angles_json: "{}".into(),
        global_overloads_json: "{}".into(),
        log: "capture finished".into(),
    });
    let id = db.save_training_session(&mut session).await.unwrap();
    assert_eq!(id, 1);

    let stored = db.get_training_session(id).await.unwrap().unwrap();
    assert_eq!(stored.id_client, 7);
    assert_eq!(stored.exercise.name, "Squat");
    assert_eq!(stored.duration_ms, 42_000);
    assert!(stored.complete);
    assert_eq!(stored.report, session.report);

    session.report = None;
    db.save_training_session(&mut session).await.unwrap();
    assert!(db.get_training_session(id).await.unwrap().unwrap().report.is_none());
    assert!(db.get_training_session(2).await.unwrap().is_none());
}

#[tokio::test]
async fn test_session_summaries_are_filtered_and_ordered() {
    let db = create_test_database().await.unwrap();
    let mut spec = squat_spec(1, 1);
    db.save_exercise_spec(&mut spec).await.unwrap();
    let entry = workout_entry(&spec, 1);

    let mut first = TrainingSession::new(1, 1, entry.clone());
    first.date -= chrono::Duration::hours(1);
    let mut second = TrainingSession::new(1, 1, entry.clone());
    let mut other_client = TrainingSession::new(2, 1, entry);
    db.save_training_session(&mut second).await.unwrap();
    db.save_training_session(&mut first).await.unwrap();
    db.save_training_session(&mut other_client).await.unwrap();

    let summaries = db.list_session_summaries(1, 1, spec.id_ex).await.unwrap();
    let ids: Vec<i64> = summaries.iter().map(|(id, _)| *id).collect();
    assert_eq!(ids, vec![first.id, second.id]);
    assert!(db.list_session_summaries(1, 2, spec.id_ex).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_concurrent_saves_get_distinct_ids() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite:{}", dir.path().join("formcoach.db").display());
    let db = Database::new(&url).await.unwrap();

    let saves = (0..4).map(|i| {
        let db = db.clone();
        tokio::spawn(async move {
            let mut workout = sample_workout(i, Vec::new());
            db.save_workout(&mut workout).await.unwrap()
        })
    });
    let mut ids = Vec::new();
    for save in saves.collect::<Vec<_>>() {
        ids.push(save.await.unwrap());
    }
    ids.sort_unstable();
    assert_eq!(ids, vec![1, 2, 3, 4]);
    assert_eq!(db.list_workouts().await.unwrap().len(), 4);
    db.close().await;
}
