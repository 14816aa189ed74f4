// ABOUTME: Configuration management module for database, capture and logging settings
// ABOUTME: Aggregates the per-concern configs into one AppConfig loaded from the environment
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Configuration module for `FormCoach`
//!
//! - **Database**: `SQLite` location and migration flag
//! - **Capture**: frame geometry, camera views and miss limits for the pose pipeline
//! - **Logging**: level and output format, see [`crate::logging`]

/// Pose capture configuration
pub mod capture;
/// Database configuration
pub mod database;

pub use capture::CaptureConfig;
pub use database::{DatabaseConfig, DatabaseUrl};

use tracing::info;

use crate::errors::AppResult;
use crate::logging::LoggingConfig;

/// Complete application configuration
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Database settings
    pub database: DatabaseConfig,
    /// Capture pipeline settings
    pub capture: CaptureConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load every section from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if any environment variable holds an invalid value
    pub fn from_env() -> AppResult<Self> {
        let config = Self {
            database: DatabaseConfig::from_env()?,
            capture: CaptureConfig::from_env()?,
            logging: LoggingConfig::from_env(),
        };
        info!(
            database = %config.database.url,
            test_mode = config.capture.test_mode,
            dual_mode = config.capture.dual_mode,
            "Configuration loaded"
        );
        Ok(config)
    }
}
