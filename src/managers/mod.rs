// ABOUTME: Business logic layer between the CLI and the repositories
// ABOUTME: Login, validation, user accounts and training sessions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Authentication and password management
pub mod login;
/// Exercise, workout and session lifecycle
pub mod training;
/// Account management and the current login
pub mod users;
/// Input validation
pub mod validation;

pub use login::LoginManager;
pub use training::TrainingManager;
pub use users::UserManager;
pub use validation::ValidationManager;
