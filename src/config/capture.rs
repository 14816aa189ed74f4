// ABOUTME: Pose capture configuration: frame geometry, camera views, test folders and miss limits
// ABOUTME: Loaded from FORMCOACH_* environment variables or from a pose-config JSON document
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::path::{Path, PathBuf};

use formcoach_analysis::KeypointConfig;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::database::env_var_or;
use crate::constants::capture::{
    DEFAULT_HEIGHT, DEFAULT_JSON_SIZE, DEFAULT_MAX_ALLOWED_MISSES,
    DEFAULT_STARTING_MISSING_FRAMES, DEFAULT_WIDTH, SYNC_TOLERANCE_MS,
};
use crate::errors::{AppError, AppResult};
use crate::models::PoseView;

/// Settings for the pose capture pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Maximum size of one pose payload in bytes
    pub json_size: usize,
    /// Primary camera identifier
    pub cam1: String,
    /// Secondary camera identifier
    pub cam2: String,
    /// Read frames from `test_folder` instead of live cameras
    pub test_mode: bool,
    /// Folder with recorded pose frames
    pub test_folder: PathBuf,
    /// Capture from two cameras
    pub dual_mode: bool,
    /// Consecutive primary misses that stop the capture
    pub max_allowed_misses: u32,
    /// Frames skipped before analysis starts
    pub starting_missing_frames: u32,
    /// Primary camera view
    pub view1: PoseView,
    /// Secondary camera view
    pub view2: PoseView,
    /// Maximum timestamp gap when pairing the two views (ms)
    pub sync_tolerance_ms: i64,
    /// File the keypoint names and connections were loaded from
    pub keypoints_file: Option<PathBuf>,
    /// Keypoint names and connections
    pub keypoints: KeypointConfig,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            json_size: DEFAULT_JSON_SIZE,
            cam1: String::new(),
            cam2: String::new(),
            test_mode: true,
            test_folder: PathBuf::from("./frames"),
            dual_mode: false,
            max_allowed_misses: DEFAULT_MAX_ALLOWED_MISSES,
            starting_missing_frames: DEFAULT_STARTING_MISSING_FRAMES,
            view1: PoseView::Front,
            view2: PoseView::Left,
            sync_tolerance_ms: SYNC_TOLERANCE_MS,
            keypoints_file: None,
            keypoints: KeypointConfig::default(),
        }
    }
}

impl CaptureConfig {
    /// Load capture configuration from environment
    ///
    /// Keypoints are not read here; call [`Self::load_keypoints`] afterwards when
    /// `FORMCOACH_KEYPOINTS_FILE` is set.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric or boolean variable cannot be parsed
    pub fn from_env() -> AppResult<Self> {
        let defaults = Self::default();
        Ok(Self {
            width: parse_env("FORMCOACH_WIDTH", defaults.width)?,
            height: parse_env("FORMCOACH_HEIGHT", defaults.height)?,
            json_size: defaults.json_size,
            cam1: defaults.cam1,
            cam2: defaults.cam2,
            test_mode: parse_env("FORMCOACH_TEST_MODE", defaults.test_mode)?,
            test_folder: PathBuf::from(env_var_or(
                "FORMCOACH_TEST_FOLDER",
                &defaults.test_folder.to_string_lossy(),
            )),
            dual_mode: parse_env("FORMCOACH_DUALMODE", defaults.dual_mode)?,
            max_allowed_misses: parse_env(
                "FORMCOACH_MAX_ALLOWED_MISSES",
                defaults.max_allowed_misses,
            )?,
            starting_missing_frames: parse_env(
                "FORMCOACH_STARTING_MISSING_FRAMES",
                defaults.starting_missing_frames,
            )?,
            view1: view_env("FORMCOACH_VIEW1", defaults.view1),
            view2: view_env("FORMCOACH_VIEW2", defaults.view2),
            sync_tolerance_ms: parse_env("FORMCOACH_SYNC_TOLERANCE_MS", defaults.sync_tolerance_ms)?,
            keypoints_file: std::env::var("FORMCOACH_KEYPOINTS_FILE").ok().map(PathBuf::from),
            keypoints: defaults.keypoints,
        })
    }

    /// Build from a pose-config JSON document
    ///
    /// `WIDTH`, `HEIGHT`, `TEST_MODE` and `TEST_FOLDER` are required; the other keys
    /// fall back to defaults.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if a required key is missing or a value has the wrong type
    pub fn from_json(value: &Value) -> AppResult<Self> {
        let defaults = Self::default();
        let keypoints = KeypointConfig::from_json(value)
            .map_err(|e| AppError::config(format!("Invalid keypoint configuration: {e}")))?;

        Ok(Self {
            width: required_u32(value, "WIDTH")?,
            height: required_u32(value, "HEIGHT")?,
            json_size: optional_u64(value, "JSON_SIZE")?
                .map_or(defaults.json_size, |size| size as usize),
            cam1: optional_str(value, "CAM1").unwrap_or_default(),
            cam2: optional_str(value, "CAM2").unwrap_or_default(),
            test_mode: required(value, "TEST_MODE")?
                .as_bool()
                .ok_or_else(|| wrong_type("TEST_MODE", "a boolean"))?,
            test_folder: PathBuf::from(
                required(value, "TEST_FOLDER")?
                    .as_str()
                    .ok_or_else(|| wrong_type("TEST_FOLDER", "a string"))?,
            ),
            dual_mode: match value.get("DUALMODE") {
                Some(flag) => flag
                    .as_bool()
                    .ok_or_else(|| wrong_type("DUALMODE", "a boolean"))?,
                None => defaults.dual_mode,
            },
            max_allowed_misses: optional_u64(value, "MAX_ALLOWED_MISSES")?
                .map_or(defaults.max_allowed_misses, |n| n as u32),
            starting_missing_frames: optional_u64(value, "STARTING_MISSING_FRAMES")?
                .map_or(defaults.starting_missing_frames, |n| n as u32),
            view1: optional_str(value, "VIEW1").map_or(defaults.view1, |v| parse_view(&v)),
            view2: optional_str(value, "VIEW2").map_or(defaults.view2, |v| parse_view(&v)),
            sync_tolerance_ms: defaults.sync_tolerance_ms,
            keypoints_file: None,
            keypoints,
        })
    }

    /// Read and parse a pose-config JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid configuration
    pub async fn from_file(path: &Path) -> AppResult<Self> {
        let value = read_json(path).await?;
        let mut config = Self::from_json(&value)?;
        config.keypoints_file = Some(path.to_path_buf());
        Ok(config)
    }

    /// Load keypoint names and connections from `keypoints_file`, if set
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub async fn load_keypoints(&mut self) -> AppResult<()> {
        let Some(path) = self.keypoints_file.clone() else {
            return Ok(());
        };
        let value = read_json(&path).await?;
        self.keypoints = KeypointConfig::from_json(&value)
            .map_err(|e| AppError::config(format!("Invalid keypoint configuration: {e}")))?;
        debug!(
            file = %path.display(),
            connections = self.keypoints.connections.len(),
            "Keypoint configuration loaded"
        );
        Ok(())
    }
}

async fn read_json(path: &Path) -> AppResult<Value> {
    let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
        AppError::config(format!("Cannot read {}: {e}", path.display())).with_source(e)
    })?;
    serde_json::from_str(&raw)
        .map_err(|e| AppError::config(format!("Invalid JSON in {}: {e}", path.display())))
}

fn parse_env<T>(key: &str, default: T) -> AppResult<T>
where
    T: std::str::FromStr + ToString,
    T::Err: std::fmt::Display,
{
    env_var_or(key, &default.to_string())
        .parse()
        .map_err(|e| AppError::invalid_input(format!("Invalid {key} value: {e}")))
}

fn view_env(key: &str, default: PoseView) -> PoseView {
    std::env::var(key).map_or(default, |raw| parse_view(&raw))
}

fn parse_view(raw: &str) -> PoseView {
    raw.parse().unwrap_or_default()
}

fn required<'a>(value: &'a Value, key: &str) -> AppResult<&'a Value> {
    value
        .get(key)
        .ok_or_else(|| AppError::config(format!("Missing required key {key} in pose configuration")))
}

fn required_u32(value: &Value, key: &str) -> AppResult<u32> {
    required(value, key)?
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| wrong_type(key, "a positive integer"))
}

fn optional_u64(value: &Value, key: &str) -> AppResult<Option<u64>> {
    value
        .get(key)
        .map(|v| v.as_u64().ok_or_else(|| wrong_type(key, "a positive integer")))
        .transpose()
}

fn optional_str(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_owned)
}

fn wrong_type(key: &str, expected: &str) -> AppError {
    AppError::config(format!("Key {key} in pose configuration must be {expected}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;
    use serde_json::json;

    fn minimal() -> Value {
        json!({
            "WIDTH": 1280,
            "HEIGHT": 720,
            "TEST_MODE": true,
            "TEST_FOLDER": "recordings/squat"
        })
    }

    #[test]
    fn test_from_json_minimal_uses_defaults() {
        let config = CaptureConfig::from_json(&minimal()).unwrap();
        assert_eq!(config.width, 1280);
        assert_eq!(config.height, 720);
        assert!(config.test_mode);
        assert_eq!(config.test_folder, PathBuf::from("recordings/squat"));
        assert!(!config.dual_mode);
        assert_eq!(config.max_allowed_misses, DEFAULT_MAX_ALLOWED_MISSES);
        assert_eq!(config.json_size, DEFAULT_JSON_SIZE);
        assert!(config.keypoints.connections.is_empty());
    }

    #[test]
    fn test_from_json_full() {
        let mut value = minimal();
        value["DUALMODE"] = json!(true);
        value["MAX_ALLOWED_MISSES"] = json!(3);
        value["STARTING_MISSING_FRAMES"] = json!(2);
        value["VIEW1"] = json!("left");
        value["VIEW2"] = json!("top_down");
        value["CAM1"] = json!("/dev/video0");
        value["KEYPOINTS"] = json!({"23": "left_hip", "25": "left_knee"});
        value["CONNECTIONS"] = json!([[23, 25]]);

        let config = CaptureConfig::from_json(&value).unwrap();
        assert!(config.dual_mode);
        assert_eq!(config.max_allowed_misses, 3);
        assert_eq!(config.starting_missing_frames, 2);
        assert_eq!(config.view1, PoseView::Left);
        assert_eq!(config.view2, PoseView::TopDown);
        assert_eq!(config.cam1, "/dev/video0");
        assert_eq!(config.keypoints.connections.len(), 1);
        assert_eq!(config.keypoints.line_name("23_25"), "left_hip<->left_knee");
    }

    #[test]
    fn test_from_json_missing_required_key() {
        for key in ["WIDTH", "HEIGHT", "TEST_MODE", "TEST_FOLDER"] {
            let mut value = minimal();
            value.as_object_mut().unwrap().remove(key);
            let err = CaptureConfig::from_json(&value).unwrap_err();
            assert_eq!(err.code, ErrorCode::ConfigError);
            assert!(err.message.contains(key));
        }
    }

    #[test]
    fn test_from_json_wrong_type() {
        let mut value = minimal();
        value["TEST_MODE"] = json!("yes");
        assert!(CaptureConfig::from_json(&value).is_err());
    }
}
