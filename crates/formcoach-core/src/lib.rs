// ABOUTME: Core types and constants for the FormCoach training platform
// ABOUTME: Foundation crate with error handling, domain models, and constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # FormCoach Core
//!
//! Foundation crate providing shared types and constants for the FormCoach
//! exercise-form analysis platform. It changes rarely, so the analysis engine and
//! the application crate can compile against it in parallel.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError`, `ErrorCode`, and domain errors
//! - **constants**: Tuning values organized by domain
//! - **models**: Users, profiles, exercise specifications, workouts and sessions

/// Unified error handling system with standard error codes
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Core data models
pub mod models;
