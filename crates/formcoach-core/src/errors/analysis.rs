// ABOUTME: Analysis-specific error types for pose geometry and state machine evaluation
// ABOUTME: Provides structured errors that integrate with the main AppError system
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Analysis Error Types
//!
//! - `AnalysisError` - failures while computing angles, validating constraints,
//!   building state machines or decoding session payloads
//! - Conversion to `AppError` for callers outside the analysis crate

use std::error::Error;
use std::fmt;

use super::{AppError, ErrorCode};

/// Errors specific to pose analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// A keypoint required by a computation is absent from the pose
    MissingKeypoint {
        /// Keypoint identifier
        keypoint: u32,
    },
    /// An angle constraint setter received an out-of-range value
    InvalidConstraint {
        /// Name of the rejected field
        field: String,
        /// Why the value was rejected
        reason: String,
    },
    /// A JSON payload (frame, config, report) could not be decoded
    InvalidPayload {
        /// What was being decoded
        what: String,
        /// Decoder message
        details: String,
    },
    /// A transition or lookup referenced a state id that does not exist
    UnknownState {
        /// Offending state id
        state_id: i64,
    },
}

impl AnalysisError {
    /// Create a "missing keypoint" error
    #[must_use]
    pub const fn missing_keypoint(keypoint: u32) -> Self {
        Self::MissingKeypoint { keypoint }
    }

    /// Create an "invalid constraint" error
    #[must_use]
    pub fn invalid_constraint(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConstraint {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create an "invalid payload" error
    #[must_use]
    pub fn invalid_payload(what: impl Into<String>, details: impl Into<String>) -> Self {
        Self::InvalidPayload {
            what: what.into(),
            details: details.into(),
        }
    }

    /// Create an "unknown state" error
    #[must_use]
    pub const fn unknown_state(state_id: i64) -> Self {
        Self::UnknownState { state_id }
    }
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingKeypoint { keypoint } => {
                write!(f, "Keypoint {keypoint} is not present in the pose")
            }
            Self::InvalidConstraint { field, reason } => {
                write!(f, "Invalid constraint value for '{field}': {reason}")
            }
            Self::InvalidPayload { what, details } => {
                write!(f, "Invalid {what} payload: {details}")
            }
            Self::UnknownState { state_id } => write!(f, "Unknown state id {state_id}"),
        }
    }
}

impl Error for AnalysisError {}

impl From<AnalysisError> for AppError {
    fn from(error: AnalysisError) -> Self {
        let code = match &error {
            AnalysisError::InvalidConstraint { .. } => ErrorCode::InvalidInput,
            AnalysisError::InvalidPayload { .. }
            | AnalysisError::MissingKeypoint { .. }
            | AnalysisError::UnknownState { .. } => ErrorCode::AnalysisError,
        };
        Self::new(code, error.to_string()).with_source(error)
    }
}
