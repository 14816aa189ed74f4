// ABOUTME: Input validation for user accounts, exercise specifications and workouts
// ABOUTME: Every check returns an InvalidInput AppError naming the offending field
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::OnceLock;

use regex::Regex;

use crate::constants::validation::{EMAIL_PATTERN, MIN_PASSWORD_LEN};
use crate::errors::{AppError, AppResult};
use crate::models::{ExerciseSpec, TrainingWorkout, User};

/// Stateless validation checks
pub struct ValidationManager;

fn email_regex() -> Option<&'static Regex> {
    static EMAIL_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL_REGEX
        .get_or_init(|| Regex::new(EMAIL_PATTERN).ok())
        .as_ref()
}

fn require_non_empty(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::invalid_input(format!("{field} must not be empty")));
    }
    Ok(())
}

fn require_non_negative<T>(field: &str, value: T) -> AppResult<()>
where
    T: PartialOrd + Default,
{
    if value < T::default() {
        return Err(AppError::invalid_input(format!("{field} must not be negative")));
    }
    Ok(())
}

fn require_finite_non_negative(field: &str, value: f64) -> AppResult<()> {
    if !value.is_finite() {
        return Err(AppError::invalid_input(format!("{field} must be a finite number")));
    }
    require_non_negative(field, value)
}

impl ValidationManager {
    /// Check an email address against the accepted pattern
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the email is malformed
    pub fn validate_email(email: &str) -> AppResult<()> {
        let Some(regex) = email_regex() else {
            return Err(AppError::internal("email pattern failed to compile"));
        };
        if !regex.is_match(email.trim()) {
            return Err(AppError::invalid_input(format!("email '{email}' is not valid")));
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `InvalidInput` if the user name is blank
    pub fn validate_user_name(user_name: &str) -> AppResult<()> {
        require_non_empty("user name", user_name)
    }

    /// # Errors
    ///
    /// Returns `InvalidInput` if the name is blank
    pub fn validate_name(name: &str) -> AppResult<()> {
        require_non_empty("name", name)
    }

    /// # Errors
    ///
    /// Returns `InvalidInput` if the family name is blank
    pub fn validate_family_name(family_name: &str) -> AppResult<()> {
        require_non_empty("family name", family_name)
    }

    /// Passwords need at least `MIN_PASSWORD_LEN` characters
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the password is too short
    pub fn validate_password(password: &str) -> AppResult<()> {
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::invalid_input(format!(
                "password must have at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        Ok(())
    }

    /// Name and description set, no negative counts or durations, finite non-negative weight
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` naming the first failing field
    pub fn validate_exercise_spec(spec: &ExerciseSpec) -> AppResult<()> {
        require_non_empty("exercise name", &spec.name)?;
        require_non_empty("exercise description", &spec.description)?;
        require_non_negative("series", spec.series)?;
        require_non_negative("repetitions", spec.repetitions)?;
        require_non_negative("duration", spec.duration_ms)?;
        require_non_negative("rest time", spec.rest_time_ms)?;
        require_finite_non_negative("weight percentage", spec.weight_percentage)?;
        Ok(())
    }

    /// Name and description set, positive estimated duration
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` naming the first failing field
    pub fn validate_workout(workout: &TrainingWorkout) -> AppResult<()> {
        require_non_empty("workout name", &workout.name)?;
        require_non_empty("workout description", &workout.description)?;
        if workout.estimated_duration_min <= 0 {
            return Err(AppError::invalid_input(
                "estimated duration must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Every account check a new client must pass
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` naming the first failing field
    pub fn validate_new_client(user: &User, password: &str) -> AppResult<()> {
        Self::validate_user_name(&user.user_name)?;
        Self::validate_name(&user.name)?;
        Self::validate_family_name(&user.family_name)?;
        Self::validate_email(&user.email)?;
        Self::validate_password(password)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;
    use crate::models::UserType;

    #[test]
    fn test_email_pattern() {
        assert!(ValidationManager::validate_email("ana.lopez@gym.example.com").is_ok());
        assert!(ValidationManager::validate_email("coach@club.es").is_ok());
        assert!(ValidationManager::validate_email("no-at-sign.com").is_err());
        assert!(ValidationManager::validate_email("user@nodot").is_err());
        assert!(ValidationManager::validate_email("").is_err());
    }

    #[test]
    fn test_password_length() {
        assert!(ValidationManager::validate_password("12345").is_err());
        assert!(ValidationManager::validate_password("123456").is_ok());
    }

    #[test]
    fn test_blank_names_rejected() {
        let err = ValidationManager::validate_name("   ").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
        assert!(err.message.contains("name"));
    }

    #[test]
    fn test_exercise_spec_negative_values() {
        let mut spec = ExerciseSpec {
            name: "Squat".into(),
            description: "Bodyweight squat".into(),
            series: 3,
            repetitions: 10,
            ..ExerciseSpec::default()
        };
        assert!(ValidationManager::validate_exercise_spec(&spec).is_ok());

        spec.rest_time_ms = -1;
        let err = ValidationManager::validate_exercise_spec(&spec).unwrap_err();
        assert!(err.message.contains("rest time"));
    }

    #[test]
    fn test_exercise_spec_weight_must_be_finite() {
        let mut spec = ExerciseSpec {
            name: "Squat".into(),
            description: "Bodyweight squat".into(),
            weight_percentage: 60.0,
            ..ExerciseSpec::default()
        };
        assert!(ValidationManager::validate_exercise_spec(&spec).is_ok());

        for bad in [f64::NAN, f64::INFINITY, -5.0] {
            spec.weight_percentage = bad;
            let err = ValidationManager::validate_exercise_spec(&spec).unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidInput);
            assert!(err.message.contains("weight percentage"));
        }
    }

    #[test]
    fn test_workout_requires_duration() {
        let mut workout = TrainingWorkout {
            name: "Legs".into(),
            description: "Leg day".into(),
            ..TrainingWorkout::default()
        };
        assert!(ValidationManager::validate_workout(&workout).is_err());
        workout.estimated_duration_min = 45;
        assert!(ValidationManager::validate_workout(&workout).is_ok());
    }

    #[test]
    fn test_new_client_checks_every_field() {
        let user = User::new("ana", "Ana", "Lopez", "bad-email", UserType::Client);
        let err = ValidationManager::validate_new_client(&user, "secret1").unwrap_err();
        assert!(err.message.contains("email"));
    }
}
