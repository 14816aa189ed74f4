// ABOUTME: Main library entry point for the FormCoach training platform
// ABOUTME: Wires configuration, storage, managers and the pose capture pipeline together
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # FormCoach
//!
//! Exercise-form analysis and training management from 2D body keypoints.
//!
//! ## Features
//!
//! - **Form analysis**: segment angles checked against per-state angle constraints
//! - **Repetition tracking**: a state machine counting repetitions and series
//! - **Session reports**: every raised condition stored with the training session
//! - **Metrics**: counts, heatmaps and time segments mined from stored reports
//! - **Accounts**: admins, trainers and clients with bcrypt-hashed passwords
//!
//! ## Architecture
//!
//! - **Managers**: login, validation, users and training sessions
//! - **Repositories**: async traits over the `SQLite` [`database::Database`]
//! - **Capture**: frame sources feeding the [`analysis::StateMachine`]
//! - **Config**: environment and pose-config JSON loading
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use formcoach::config::AppConfig;
//! use formcoach::database::Database;
//! use formcoach::errors::AppResult;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let config = AppConfig::from_env()?;
//!     let database = Database::from_config(&config.database).await?;
//!     println!("Exercises stored: {}", database.list_exercise_specs().await?.len());
//!     Ok(())
//! }
//! ```

/// Errors, constants and domain models shared by every crate
pub use formcoach_core::{constants, errors, models};

/// Pose geometry, state machine, reports, feedback and metrics
pub use formcoach_analysis as analysis;

/// Pose capture pipeline
pub mod capture;

/// Configuration management
pub mod config;

/// `SQLite` storage and repositories
pub mod database;

/// Structured logging setup
pub mod logging;

/// Business logic
pub mod managers;
