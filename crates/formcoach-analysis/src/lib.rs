// ABOUTME: Exercise-form analysis engine: pose geometry, states, transitions and metrics
// ABOUTME: Pure computation with no I/O, driven frame by frame by the capture pipeline
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # FormCoach Analysis
//!
//! Turns per-frame keypoints into conditions and aggregates them into a session report.
//!
//! ## Modules
//!
//! - **pose**: keypoints, connections and line angles
//! - **constraint**: validated angle limits for a line
//! - **condition**: conditions raised while evaluating frames
//! - **state** / **`state_machine`**: exercise phases and repetition counting
//! - **report**: per-session aggregation and JSON persistence
//! - **feedback** / **alerts**: client messages and audio cue decisions
//! - **metrics**: statistics for charts

/// Audio cue queue
pub mod alerts;
/// Observed conditions
pub mod condition;
/// Angle constraints
pub mod constraint;
/// Client-facing messages
pub mod feedback;
/// Session statistics
pub mod metrics;
/// Pose geometry
pub mod pose;
/// Session report
pub mod report;
/// Exercise states
pub mod state;
/// Exercise state machine
pub mod state_machine;

pub use alerts::{cue_for, AlertQueue, QueuedCue};
pub use condition::Condition;
pub use constraint::AngleConstraint;
pub use feedback::{category, ConditionCategory, Feedback};
pub use metrics::{DistributionRow, MetricsAnalyzer};
pub use pose::{Connection, Keypoint, KeypointConfig, Pose};
pub use report::SessionReport;
pub use state::{AnglesByView, State};
pub use state_machine::StateMachine;
