// ABOUTME: Condition type and movement direction enumerations shared by analysis and storage
// ABOUTME: Names round-trip through Display/FromStr for database columns and JSON payloads
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};

/// Conditions raised while evaluating frames against an exercise
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum ConditionType {
    // Raised by a state
    /// Angle above the optimal maximum
    MaxOptAngle,
    /// Angle below the optimal minimum
    MinOptAngle,
    /// Angle increasing where it should decrease
    Increase,
    /// Angle decreasing where it should increase
    Decrease,
    /// Angle drifting where it should hold
    NotSteady,
    /// Too long in the current state
    MaxStateTimeout,
    /// Left (or about to leave) the state too early
    MinStateTimeout,
    /// Nothing wrong in this frame
    OptimalForm,
    /// Angular change faster than allowed
    FastMovement,
    /// Angular change slower than required
    SlowMovement,
    /// Angle outside the safe range for the joint
    JointOverload,
    /// Angle away from the symmetry reference
    SymmetryDeviation,
    /// Movement started (entered the start state)
    ExerciseInit,

    // Raised by the state machine
    /// Returned to the rest state
    EndOfRepetition,
    /// All repetitions of a serie completed
    EndOfSet,
    /// All series completed
    EndOfExercise,
    /// Set duration exceeded
    SetTime,
    /// Rest between repetitions not respected
    RestTime,
    /// Rest between series exceeded
    RestOverTime,
    /// Erratic acceleration
    AccelerationSpikes,
    /// Range of motion below the optimal span
    RangeOfMotionDeficit,
    /// Exercise duration exceeded
    ExerciseOvertime,
    /// Left a state; value carries the time spent in it
    EndOfMovementPhase,
}

impl ConditionType {
    /// Every variant, in declaration order
    pub const ALL: [Self; 23] = [
        Self::MaxOptAngle,
        Self::MinOptAngle,
        Self::Increase,
        Self::Decrease,
        Self::NotSteady,
        Self::MaxStateTimeout,
        Self::MinStateTimeout,
        Self::OptimalForm,
        Self::FastMovement,
        Self::SlowMovement,
        Self::JointOverload,
        Self::SymmetryDeviation,
        Self::ExerciseInit,
        Self::EndOfRepetition,
        Self::EndOfSet,
        Self::EndOfExercise,
        Self::SetTime,
        Self::RestTime,
        Self::RestOverTime,
        Self::AccelerationSpikes,
        Self::RangeOfMotionDeficit,
        Self::ExerciseOvertime,
        Self::EndOfMovementPhase,
    ];

    /// Storage name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MaxOptAngle => "MaxOptAngle",
            Self::MinOptAngle => "MinOptAngle",
            Self::Increase => "Increase",
            Self::Decrease => "Decrease",
            Self::NotSteady => "NotSteady",
            Self::MaxStateTimeout => "MaxStateTimeout",
            Self::MinStateTimeout => "MinStateTimeout",
            Self::OptimalForm => "OptimalForm",
            Self::FastMovement => "FastMovement",
            Self::SlowMovement => "SlowMovement",
            Self::JointOverload => "JointOverload",
            Self::SymmetryDeviation => "SymmetryDeviation",
            Self::ExerciseInit => "ExerciseInit",
            Self::EndOfRepetition => "EndOfRepetition",
            Self::EndOfSet => "EndOfSet",
            Self::EndOfExercise => "EndOfExercise",
            Self::SetTime => "SetTime",
            Self::RestTime => "RestTime",
            Self::RestOverTime => "RestOverTime",
            Self::AccelerationSpikes => "AccelerationSpikes",
            Self::RangeOfMotionDeficit => "RangeOfMotionDeficit",
            Self::ExerciseOvertime => "ExerciseOvertime",
            Self::EndOfMovementPhase => "EndOfMovementPhase",
        }
    }

    /// Whether a state (as opposed to the state machine) raises this condition
    #[must_use]
    pub const fn is_state_condition(self) -> bool {
        matches!(
            self,
            Self::MaxOptAngle
                | Self::MinOptAngle
                | Self::Increase
                | Self::Decrease
                | Self::NotSteady
                | Self::MaxStateTimeout
                | Self::MinStateTimeout
                | Self::OptimalForm
                | Self::FastMovement
                | Self::SlowMovement
                | Self::JointOverload
                | Self::SymmetryDeviation
                | Self::ExerciseInit
        )
    }
}

impl fmt::Display for ConditionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConditionType {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s.trim())
            .ok_or_else(|| AppError::invalid_input(format!("Unknown condition type '{s}'")))
    }
}

/// Expected evolution of a line's angle inside a state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Angle must grow
    Increase,
    /// Angle must shrink
    Decrease,
    /// Angle must hold near the maximum
    Steady,
    /// Angle must stay near the symmetry reference
    Symmetrical,
    /// No expectation
    #[default]
    NotMatter,
}

impl Direction {
    /// Storage name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Increase => "Increase",
            Self::Decrease => "Decrease",
            Self::Steady => "Steady",
            Self::Symmetrical => "Symmetrical",
            Self::NotMatter => "NotMatter",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "increase" => Ok(Self::Increase),
            "decrease" => Ok(Self::Decrease),
            "steady" => Ok(Self::Steady),
            "symmetrical" => Ok(Self::Symmetrical),
            "notmatter" | "not_matter" | "" => Ok(Self::NotMatter),
            other => Err(AppError::invalid_input(format!(
                "Unknown direction '{other}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_names_round_trip() {
        for kind in ConditionType::ALL {
            assert_eq!(kind.as_str().parse::<ConditionType>().unwrap(), kind);
        }
        assert!("Wobble".parse::<ConditionType>().is_err());
    }

    #[test]
    fn test_direction_accepts_legacy_spelling() {
        assert_eq!("Not_matter".parse::<Direction>().unwrap(), Direction::NotMatter);
        assert_eq!("STEADY".parse::<Direction>().unwrap(), Direction::Steady);
    }
}
