// ABOUTME: Training session commands for formcoach-cli
// ABOUTME: Runs the capture pipeline over recorded frames and reports stored session metrics
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::path::PathBuf;
use std::sync::Arc;

use formcoach::analysis::{MetricsAnalyzer, SessionReport};
use formcoach::capture::{CaptureSession, DirectoryFrameSource};
use formcoach::config::CaptureConfig;
use formcoach::database::repositories::UserRepositoryImpl;
use formcoach::database::Database;
use formcoach::errors::{AppError, AppResult};
use formcoach::managers::UserManager;
use tracing::info;

use super::exercise::training_manager;
use crate::helpers::display::{
    display_condition_counts, display_heatmap, display_segments, display_session,
};

type Result<T> = AppResult<T>;

/// Inputs of `session analyze`
pub struct AnalyzeRequest {
    pub client: i64,
    pub workout: i64,
    pub exercise: i64,
    pub frames: PathBuf,
    pub frames2: Option<PathBuf>,
    pub keypoints: Option<PathBuf>,
    pub pose_config: Option<PathBuf>,
}

/// Analyze recorded frames for one client exercise and store the session
pub async fn analyze(
    database: &Database,
    env_capture: CaptureConfig,
    request: AnalyzeRequest,
) -> Result<()> {
    let mut capture = match &request.pose_config {
        Some(path) => CaptureConfig::from_file(path).await?,
        None => env_capture,
    };
    capture.test_mode = true;
    capture.test_folder.clone_from(&request.frames);
    if let Some(keypoints) = &request.keypoints {
        capture.keypoints_file = Some(keypoints.clone());
        capture.load_keypoints().await?;
    }
    if capture.keypoints.connections.is_empty() {
        return Err(AppError::config(
            "No keypoint connections configured; pass --keypoints or set FORMCOACH_KEYPOINTS_FILE",
        ));
    }
    capture.dual_mode = request.frames2.is_some();

    let users = UserManager::new(Arc::new(UserRepositoryImpl::new(database.clone())));
    let client = users.get_user(request.client).await?;
    let preferences = users.get_preferences(request.client).await?;

    let mut training = training_manager(database);
    training.set_current_workout(request.workout);
    let spec = training.get_exercise_spec(request.exercise).await?;
    training.start_session(client.user.id, request.exercise).await?;

    let connections = capture.keypoints.connections.clone();
    let primary =
        DirectoryFrameSource::open(&request.frames, capture.view1, connections.clone()).await?;
    info!(frames = primary.len(), folder = %request.frames.display(), "Primary frames found");

    let view2 = capture.view2;
    let mut session = CaptureSession::new(&spec, capture, Box::new(primary))?
        .with_preferences(&preferences);
    if let Some(folder) = &request.frames2 {
        let secondary = DirectoryFrameSource::open(folder, view2, connections).await?;
        session = session.with_secondary(Box::new(secondary));
    }

    let result = session.run_to_end().await?;
    let stored = training
        .end_current_session(&result.report, result.complete)
        .await?;

    println!(
        "Session {} stored: {} frames, {}, {} feedback messages",
        stored.id,
        result.frames,
        if result.complete {
            "complete"
        } else {
            "incomplete"
        },
        result.feedback_log.len()
    );
    display_condition_counts("Conditions", &result.report.aggregated_statistics());
    Ok(())
}

async fn load_report(database: &Database, id: i64) -> Result<SessionReport> {
    let session = training_manager(database).get_training_session(id).await?;
    let Some(stored) = &session.report else {
        return Err(AppError::not_found("Session report").with_resource_id(id.to_string()));
    };
    Ok(SessionReport::from_persisted(id, stored)?)
}

/// Print a stored session with its condition totals
pub async fn show(database: &Database, id: i64) -> Result<()> {
    let session = training_manager(database).get_training_session(id).await?;
    display_session(&session);
    if let Some(stored) = &session.report {
        let report = SessionReport::from_persisted(id, stored)?;
        display_condition_counts("Conditions", &report.aggregated_statistics());
    }
    Ok(())
}

/// Print metrics of a stored session, for one serie or overall
pub async fn metrics(database: &Database, id: i64, serie: Option<i64>) -> Result<()> {
    let report = load_report(database, id).await?;
    let analyzer = MetricsAnalyzer::new(&report);

    let Some(serie) = serie else {
        display_condition_counts("Session totals", &analyzer.global_condition_counts());
        for (serie, counts) in analyzer.condition_counts_by_serie() {
            display_condition_counts(&format!("Serie {serie}"), &counts);
        }
        println!("Series available: {:?}", analyzer.available_series());
        return Ok(());
    };

    if !analyzer.available_series().contains(&serie) {
        return Err(AppError::not_found(format!("Serie {serie}")).with_resource_id(id.to_string()));
    }
    for (rep, counts) in analyzer.condition_counts_by_repetition(serie) {
        display_condition_counts(&format!("Serie {serie} repetition {rep}"), &counts);
    }
    display_heatmap(&analyzer.heatmap_data(serie));
    display_segments(&analyzer.segments(serie));
    println!("Working time: {} ms", analyzer.working_time_ms(serie));
    Ok(())
}

/// List stored sessions of one client exercise
pub async fn list(database: &Database, client: i64, workout: i64, exercise: i64) -> Result<()> {
    let sessions = training_manager(database)
        .list_session_summaries(client, workout, exercise)
        .await?;
    if sessions.is_empty() {
        println!("No sessions stored");
    }
    for (id, date) in sessions {
        println!("{id:>6}  {}", date.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    Ok(())
}
