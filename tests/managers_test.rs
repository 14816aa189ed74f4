// ABOUTME: Integration tests for login, user and training managers over SQLite repositories
// ABOUTME: Covers registration, credential checks, password changes and the session lifecycle
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(missing_docs, clippy::unwrap_used)]

mod common;

use common::{
    create_client, create_test_database, sample_user, sample_workout, squat_spec,
    store_squat_workout, training_manager, user_manager, workout_entry, PASSWORD,
};
use formcoach::analysis::SessionReport;
use formcoach::errors::ErrorCode;
use formcoach::models::{
    ClientData, ClientProfile, ProfileSection, RoleData, TrainerData, User, UserPreferences,
    UserType,
};

#[tokio::test]
async fn test_register_client_hashes_password() {
    let db = create_test_database().await.unwrap();
    let id = create_client(&db, "ana").await.unwrap();

    let record = user_manager(&db).get_user(id).await.unwrap();
    assert_eq!(record.user.user_type, UserType::Client);
    assert_ne!(record.user.password_hash, PASSWORD);
    assert!(record.user.password_hash.starts_with("$2"));
    assert_eq!(record.client().unwrap().plan, "Strength");
}

#[tokio::test]
async fn test_register_rejects_taken_user_name() {
    let db = create_test_database().await.unwrap();
    create_client(&db, "ana").await.unwrap();

    let mut again = sample_user("ana");
    again.email = "second@gym.example.com".into();
    let err = user_manager(&db)
        .create_client(again, PASSWORD, ClientData::default())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceAlreadyExists);
}

#[tokio::test]
async fn test_register_rejects_email_differing_only_in_case() {
    let db = create_test_database().await.unwrap();
    let mut users = user_manager(&db);
    let mut first = sample_user("ana");
    first.email = "Ana@gym.example.com".into();
    users
        .create_client(first, PASSWORD, ClientData::default())
        .await
        .unwrap();

    let mut second = sample_user("ben");
    second.email = "ana@gym.example.com".into();
    let err = users
        .create_client(second, PASSWORD, ClientData::default())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceAlreadyExists);
    assert_eq!(users.list_users(None).await.unwrap().len(), 1);

    let record = users.login("ANA@GYM.EXAMPLE.COM", PASSWORD).await.unwrap();
    assert_eq!(record.user.user_name, "ana");
}

#[tokio::test]
async fn test_register_validates_fields() {
    let db = create_test_database().await.unwrap();
    let users = user_manager(&db);

    let short = users
        .create_client(sample_user("ana"), "abc", ClientData::default())
        .await
        .unwrap_err();
    assert_eq!(short.code, ErrorCode::InvalidInput);

    let mut bad_email = sample_user("ben");
    bad_email.email = "not-an-email".into();
    let err = users
        .create_client(bad_email, PASSWORD, ClientData::default())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);
    assert!(users.list_users(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_register_trainer_through_login_manager() {
    let db = create_test_database().await.unwrap();
    let users = user_manager(&db);
    let trainer = User::new("tom", "Tom", "Reyes", "tom@gym.example.com", UserType::Unknown);
    let role = RoleData::Trainer(TrainerData {
        qualification: "CSCS".into(),
        ..TrainerData::default()
    });

    let record = users
        .login_manager()
        .register(trainer, PASSWORD, role, UserType::Trainer)
        .await
        .unwrap();
    assert_eq!(record.user.user_type, UserType::Trainer);
    let trainers = users.list_users(Some(UserType::Trainer)).await.unwrap();
    assert_eq!(trainers.len(), 1);
    assert_eq!(trainers[0].id, record.user.id);
}

#[tokio::test]
async fn test_login_by_name_or_email() {
    let db = create_test_database().await.unwrap();
    let id = create_client(&db, "ana").await.unwrap();
    let mut users = user_manager(&db);

    let record = users.login("ana", PASSWORD).await.unwrap();
    assert_eq!(record.user.id, id);
    assert!(record.user.last_login.is_some());
    assert_eq!(users.current_user().unwrap().user.id, id);

    users.logout();
    assert!(users.current_user().is_none());
    let record = users.login("ana@gym.example.com", PASSWORD).await.unwrap();
    assert_eq!(record.user.id, id);

    let stored = users.get_user(id).await.unwrap();
    assert!(stored.user.last_login.is_some());
}

#[tokio::test]
async fn test_login_failures() {
    let db = create_test_database().await.unwrap();
    create_client(&db, "ana").await.unwrap();
    let mut users = user_manager(&db);

    let unknown = users.login("nobody", PASSWORD).await.unwrap_err();
    assert_eq!(unknown.code, ErrorCode::AuthInvalid);
    assert_eq!(unknown.message, "no such user");

    let wrong = users.login("ana", "wrong-password").await.unwrap_err();
    assert_eq!(wrong.code, ErrorCode::AuthInvalid);
    assert_eq!(wrong.message, "wrong credentials");
    assert!(users.current_user().is_none());
}

#[tokio::test]
async fn test_login_reports_unavailable_storage() {
    let db = create_test_database().await.unwrap();
    create_client(&db, "ana").await.unwrap();
    let mut users = user_manager(&db);
    db.close().await;

    let err = users.login("ana", PASSWORD).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::DatabaseError);
    assert_eq!(err.message, "error retrieving user");
    assert!(err.source.is_some());
    assert!(users.current_user().is_none());
}

#[tokio::test]
async fn test_change_password() {
    let db = create_test_database().await.unwrap();
    let id = create_client(&db, "ana").await.unwrap();
    let users = user_manager(&db);
    let login = users.login_manager();

    let err = login
        .change_password(id, "wrong-password", "another1")
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::AuthInvalid);

    let err = login.change_password(id, PASSWORD, "abc").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);

    login.change_password(id, PASSWORD, "another1").await.unwrap();
    assert!(login.login("ana", PASSWORD).await.is_err());
    assert!(login.login("ana", "another1").await.is_ok());

    let missing = login.change_password(99, PASSWORD, "another1").await.unwrap_err();
    assert_eq!(missing.code, ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn test_client_profile_and_preferences() {
    let db = create_test_database().await.unwrap();
    let id = create_client(&db, "ana").await.unwrap();
    let users = user_manager(&db);

    let mut profile = ClientProfile::default();
    profile.set(ProfileSection::LifeStyle, "TrainingFrequency", "3").unwrap();
    users.update_client_profile(id, &profile).await.unwrap();
    let record = users.get_user(id).await.unwrap();
    assert_eq!(
        record
            .client()
            .unwrap()
            .profile
            .get(ProfileSection::LifeStyle, "TrainingFrequency"),
        Some("3")
    );

    assert_eq!(
        users.get_preferences(id).await.unwrap(),
        UserPreferences::for_user(id)
    );
    let mut preferences = UserPreferences::for_user(id);
    preferences.mute = true;
    users.save_preferences(&preferences).await.unwrap();
    assert!(users.get_preferences(id).await.unwrap().mute);
}

#[tokio::test]
async fn test_profile_update_requires_a_client() {
    let db = create_test_database().await.unwrap();
    let users = user_manager(&db);
    let record = users
        .login_manager()
        .register(
            User::new("tom", "Tom", "Reyes", "tom@gym.example.com", UserType::Trainer),
            PASSWORD,
            RoleData::Trainer(TrainerData::default()),
            UserType::Trainer,
        )
        .await
        .unwrap();

    let err = users
        .update_client_profile(record.user.id, &ClientProfile::default())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);

    let missing = users
        .update_client_profile(99, &ClientProfile::default())
        .await
        .unwrap_err();
    assert_eq!(missing.code, ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn test_delete_current_user_logs_out() {
    let db = create_test_database().await.unwrap();
    let id = create_client(&db, "ana").await.unwrap();
    let mut users = user_manager(&db);
    users.login("ana", PASSWORD).await.unwrap();

    users.delete_user(id).await.unwrap();
    assert!(users.current_user().is_none());
    let err = users.delete_user(id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn test_training_manager_validates_before_saving() {
    let db = create_test_database().await.unwrap();
    let training = training_manager(&db);

    let mut nameless = squat_spec(1, 1);
    nameless.name = "  ".into();
    let err = training.save_exercise_spec(&mut nameless).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);

    let mut workout = sample_workout(0, Vec::new());
    workout.estimated_duration_min = 0;
    let err = training.save_workout(&mut workout).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);

    let err = training.get_exercise_spec(5).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
    assert!(training.list_exercises().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_session_lifecycle() {
    let db = create_test_database().await.unwrap();
    let client = create_client(&db, "ana").await.unwrap();
    let (id_ex, id_workout) = store_squat_workout(&db, 0, 1, 1).await.unwrap();
    let mut training = training_manager(&db);

    let err = training.start_session(client, id_ex).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);

    training.set_current_workout(id_workout);
    assert_eq!(training.current_workout(), Some(id_workout));
    let err = training.start_session(client, id_ex + 1).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);

    let started = training.start_session(client, id_ex).await.unwrap();
    assert_eq!(started.exercise.id_ex, id_ex);
    assert_eq!(started.id_client, client);
    let err = training.start_session(client, id_ex).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);

    let mut report = SessionReport::default();
    report.append_log("finished");
    let stored = training.end_current_session(&report, true).await.unwrap();
    assert!(training.current_session().is_none());
    assert!(stored.id > 0);
    assert!(stored.complete);

    let loaded = training.get_training_session(stored.id).await.unwrap();
    let persisted = loaded.report.unwrap();
    let restored = SessionReport::from_persisted(stored.id, &persisted).unwrap();
    assert!(restored.log().contains("finished"));

    let sessions = training
        .list_session_summaries(client, id_workout, id_ex)
        .await
        .unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].0, stored.id);
}

#[tokio::test]
async fn test_aborted_session_is_not_stored() {
    let db = create_test_database().await.unwrap();
    let (id_ex, id_workout) = store_squat_workout(&db, 0, 1, 1).await.unwrap();
    let mut training = training_manager(&db);
    training.set_current_workout(id_workout);

    training.start_session(1, id_ex).await.unwrap();
    training.abort_current_session();
    assert!(training.current_session().is_none());

    let err = training
        .end_current_session(&SessionReport::default(), false)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);
    assert!(training
        .list_session_summaries(1, id_workout, id_ex)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_deleting_the_current_workout_clears_it() {
    let db = create_test_database().await.unwrap();
    let mut training = training_manager(&db);
    let spec = squat_spec(1, 1);
    let mut workout = sample_workout(0, vec![workout_entry(&spec, 1)]);
    let id = training.save_workout(&mut workout).await.unwrap();
    training.set_current_workout(id);

    training.delete_workout(id).await.unwrap();
    assert_eq!(training.current_workout(), None);
    let err = training.get_workout(id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}
