// ABOUTME: Integration tests for environment and file based configuration loading
// ABOUTME: Serialized because they mutate process environment variables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(missing_docs, clippy::unwrap_used)]

mod common;

use std::env;
use std::path::PathBuf;

use formcoach::config::{AppConfig, CaptureConfig, DatabaseUrl};
use formcoach::constants::capture::{DEFAULT_MAX_ALLOWED_MISSES, SYNC_TOLERANCE_MS};
use formcoach::database::Database;
use formcoach::errors::ErrorCode;
use formcoach::logging::LogFormat;
use formcoach::models::PoseView;
use serde_json::json;
use serial_test::serial;

const CAPTURE_VARS: [&str; 9] = [
    "FORMCOACH_TEST_MODE",
    "FORMCOACH_TEST_FOLDER",
    "FORMCOACH_DUALMODE",
    "FORMCOACH_MAX_ALLOWED_MISSES",
    "FORMCOACH_STARTING_MISSING_FRAMES",
    "FORMCOACH_VIEW1",
    "FORMCOACH_VIEW2",
    "FORMCOACH_WIDTH",
    "FORMCOACH_KEYPOINTS_FILE",
];

fn clear_env() {
    for key in CAPTURE_VARS {
        env::remove_var(key);
    }
    for key in ["DATABASE_URL", "AUTO_MIGRATE", "LOG_FORMAT", "FORMCOACH_SYNC_TOLERANCE_MS"] {
        env::remove_var(key);
    }
}

#[test]
#[serial]
fn test_defaults_without_environment() {
    clear_env();
    let config = AppConfig::from_env().unwrap();

    assert_eq!(config.database.url, DatabaseUrl::default());
    assert!(config.database.auto_migrate);
    assert!(config.capture.test_mode);
    assert!(!config.capture.dual_mode);
    assert_eq!(config.capture.max_allowed_misses, DEFAULT_MAX_ALLOWED_MISSES);
    assert_eq!(config.capture.sync_tolerance_ms, SYNC_TOLERANCE_MS);
    assert_eq!(config.capture.keypoints_file, None);
}

#[test]
#[serial]
fn test_capture_settings_from_environment() {
    clear_env();
    env::set_var("FORMCOACH_DUALMODE", "true");
    env::set_var("FORMCOACH_MAX_ALLOWED_MISSES", "4");
    env::set_var("FORMCOACH_STARTING_MISSING_FRAMES", "2");
    env::set_var("FORMCOACH_VIEW1", "right");
    env::set_var("FORMCOACH_VIEW2", "top_down");
    env::set_var("FORMCOACH_TEST_FOLDER", "/recordings/lunge");
    env::set_var("FORMCOACH_KEYPOINTS_FILE", "/etc/formcoach/keypoints.json");

    let config = CaptureConfig::from_env().unwrap();
    clear_env();

    assert!(config.dual_mode);
    assert_eq!(config.max_allowed_misses, 4);
    assert_eq!(config.starting_missing_frames, 2);
    assert_eq!(config.view1, PoseView::Right);
    assert_eq!(config.view2, PoseView::TopDown);
    assert_eq!(config.test_folder, PathBuf::from("/recordings/lunge"));
    assert_eq!(
        config.keypoints_file,
        Some(PathBuf::from("/etc/formcoach/keypoints.json"))
    );
}

#[test]
#[serial]
fn test_invalid_numeric_variable_is_rejected() {
    clear_env();
    env::set_var("FORMCOACH_WIDTH", "wide");
    let err = CaptureConfig::from_env().unwrap_err();
    clear_env();
    assert_eq!(err.code, ErrorCode::InvalidInput);
    assert!(err.message.contains("FORMCOACH_WIDTH"));
}

#[test]
#[serial]
fn test_database_url_from_environment() {
    clear_env();
    env::set_var("DATABASE_URL", "sqlite::memory:");
    env::set_var("AUTO_MIGRATE", "false");
    let config = AppConfig::from_env().unwrap();
    clear_env();
    assert!(config.database.url.is_memory());
    assert!(!config.database.auto_migrate);

    env::set_var("DATABASE_URL", "postgres://localhost/formcoach");
    let err = AppConfig::from_env().unwrap_err();
    clear_env();
    assert_eq!(err.code, ErrorCode::ConfigError);
}

#[test]
#[serial]
fn test_log_format_from_environment() {
    clear_env();
    env::set_var("LOG_FORMAT", "json");
    let config = AppConfig::from_env().unwrap();
    clear_env();
    assert_eq!(config.logging.format, LogFormat::Json);
    assert_eq!(config.logging.with_level("debug").level, "debug");
}

#[tokio::test]
async fn test_pose_config_and_keypoints_files() {
    let dir = tempfile::tempdir().unwrap();
    let keypoints = dir.path().join("keypoints.json");
    tokio::fs::write(
        &keypoints,
        json!({
            "KEYPOINTS": {"23": "left_hip", "25": "left_knee", "27": "left_ankle"},
            "CONNECTIONS": [[23, 25], [25, 27]]
        })
        .to_string(),
    )
    .await
    .unwrap();
    let pose_config = dir.path().join("pose.json");
    tokio::fs::write(
        &pose_config,
        json!({
            "WIDTH": 1920,
            "HEIGHT": 1080,
            "TEST_MODE": true,
            "TEST_FOLDER": "frames/squat",
            "VIEW1": "left"
        })
        .to_string(),
    )
    .await
    .unwrap();

    let mut config = CaptureConfig::from_file(&pose_config).await.unwrap();
    assert_eq!(config.width, 1920);
    assert_eq!(config.view1, PoseView::Left);
    assert!(config.keypoints.connections.is_empty());

    config.keypoints_file = Some(keypoints);
    config.load_keypoints().await.unwrap();
    assert_eq!(config.keypoints.connections.len(), 2);
    assert_eq!(config.keypoints.line_name("25_27"), "left_knee<->left_ankle");

    let err = CaptureConfig::from_file(&dir.path().join("missing.json"))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ConfigError);
}

#[tokio::test]
async fn test_file_database_is_created_with_its_folder() {
    common::init_test_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("formcoach.db");
    let url = format!("sqlite:{}", path.display());

    let db = Database::new(&url).await.unwrap();
    assert_eq!(db.next_user_id().await.unwrap(), 1);
    db.close().await;
    assert!(path.exists());

    let reopened = Database::new(&url).await.unwrap();
    assert_eq!(reopened.list_users(None).await.unwrap().len(), 0);
    reopened.close().await;
}
