// ABOUTME: Turns raised conditions into client-facing messages and alert tags
// ABOUTME: Assigns each condition type a priority category for audio cues
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt;

use formcoach_core::models::ConditionType;
use serde::{Deserialize, Serialize};

use crate::condition::Condition;

/// Priority of a condition, lowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionCategory {
    /// Informational
    Info,
    /// Timing and progress events
    Alert,
    /// Form errors that risk injury
    Critical,
}

impl ConditionCategory {
    /// Category name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Alert => "alert",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for ConditionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category of a condition type
#[must_use]
pub const fn category(condition_type: ConditionType) -> ConditionCategory {
    match condition_type {
        ConditionType::MaxOptAngle
        | ConditionType::MinOptAngle
        | ConditionType::JointOverload
        | ConditionType::AccelerationSpikes => ConditionCategory::Critical,
        ConditionType::MaxStateTimeout
        | ConditionType::MinStateTimeout
        | ConditionType::RestOverTime
        | ConditionType::SetTime
        | ConditionType::ExerciseOvertime
        | ConditionType::EndOfRepetition
        | ConditionType::EndOfSet
        | ConditionType::EndOfExercise
        | ConditionType::ExerciseInit => ConditionCategory::Alert,
        _ => ConditionCategory::Info,
    }
}

/// Messages produced from one frame's conditions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    /// Form errors to show prominently
    pub critical_messages: Vec<String>,
    /// Hints and encouragement
    pub info_messages: Vec<String>,
    /// Short tags for on-screen alert widgets
    pub alerts: Vec<String>,
    /// Distinct condition types received, in arrival order
    pub entries: Vec<ConditionType>,
}

impl Feedback {
    /// Build the feedback for one frame
    #[must_use]
    pub fn from_conditions(conditions: &[Condition]) -> Self {
        let mut feedback = Self::default();
        for condition in conditions {
            if !feedback.entries.contains(&condition.condition_type) {
                feedback.entries.push(condition.condition_type);
            }
            feedback.add(condition);
        }
        feedback
    }

    fn add(&mut self, condition: &Condition) {
        let line = &condition.keypoint_line;
        let (message, alert) = match condition.condition_type {
            ConditionType::MaxOptAngle => (
                format!("The angle at {line} is too large. Reduce the range."),
                None,
            ),
            ConditionType::MinOptAngle => (
                format!("The angle at {line} is too small. Increase the range."),
                None,
            ),
            ConditionType::Increase => {
                (format!("Movement at {line} should be smoother."), None)
            }
            ConditionType::Decrease => (
                format!("Do not let the movement at {line} accelerate."),
                None,
            ),
            ConditionType::NotSteady => {
                (format!("Keep the position at {line} more stable."), None)
            }
            ConditionType::MaxStateTimeout => {
                ("Too long in this position.".to_owned(), Some("overtime"))
            }
            ConditionType::MinStateTimeout => {
                ("Position changed too fast.".to_owned(), Some("time"))
            }
            ConditionType::OptimalForm => {
                ("Good technique! Keep it up.".to_owned(), Some("good"))
            }
            ConditionType::FastMovement => (
                "The movement is too fast. Control the speed.".to_owned(),
                None,
            ),
            ConditionType::SlowMovement => (
                "The movement is too slow. Speed up a little.".to_owned(),
                None,
            ),
            ConditionType::JointOverload => (format!("You are forcing the joint {line}."), None),
            ConditionType::AccelerationSpikes => (
                format!("Uncontrolled acceleration at joint {line}."),
                None,
            ),
            ConditionType::SymmetryDeviation => (format!("Keep symmetry on axis {line}."), None),
            _ => return,
        };

        if is_critical_message(condition.condition_type) {
            self.critical_messages.push(message);
        } else {
            self.info_messages.push(message);
        }
        if let Some(alert) = alert {
            self.alerts.push(alert.to_owned());
        }
    }

    /// Whether nothing is worth showing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.critical_messages.is_empty() && self.info_messages.is_empty() && self.alerts.is_empty()
    }
}

const fn is_critical_message(condition_type: ConditionType) -> bool {
    matches!(
        condition_type,
        ConditionType::MaxOptAngle
            | ConditionType::MinOptAngle
            | ConditionType::JointOverload
            | ConditionType::AccelerationSpikes
    )
}
