// ABOUTME: Camera view and user preference models for capture and feedback delivery
// ABOUTME: PoseView parsing falls back to Front for unrecognized values
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Camera viewpoint of a pose stream
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum PoseView {
    /// Frontal view
    #[default]
    Front,
    /// Left side view
    Left,
    /// Right side view
    Right,
    /// Overhead view
    #[serde(rename = "top_down")]
    TopDown,
    /// View from below
    #[serde(rename = "bottom_up")]
    BottomUp,
}

impl PoseView {
    /// Wire and storage name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Front => "Front",
            Self::Left => "Left",
            Self::Right => "Right",
            Self::TopDown => "top_down",
            Self::BottomUp => "bottom_up",
        }
    }
}

impl fmt::Display for PoseView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PoseView {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "left" => Self::Left,
            "right" => Self::Right,
            "top_down" => Self::TopDown,
            "bottom_up" => Self::BottomUp,
            _ => Self::Front,
        })
    }
}

/// How feedback is delivered to the client during a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeedbackMode {
    /// On-screen messages only
    Visual,
    /// Audio cues only
    Audio,
    /// Messages and audio cues
    #[default]
    Both,
    /// No feedback
    None,
}

impl FeedbackMode {
    /// Storage name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Visual => "Visual",
            Self::Audio => "Audio",
            Self::Both => "Both",
            Self::None => "None",
        }
    }

    /// Whether audio cues should be queued
    #[must_use]
    pub const fn plays_audio(self) -> bool {
        matches!(self, Self::Audio | Self::Both)
    }
}

impl FromStr for FeedbackMode {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "visual" => Self::Visual,
            "audio" => Self::Audio,
            "none" => Self::None,
            _ => Self::Both,
        })
    }
}

/// Per-user application preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPreferences {
    /// Owner
    pub id_user: i64,
    /// UI language code
    pub language: String,
    /// Notifications enabled
    pub notifications: bool,
    /// Measurement system ("metric" or "imperial")
    pub units: String,
    /// Capture from two cameras
    pub dual_mode: bool,
    /// Feedback delivery
    pub feedback_mode: FeedbackMode,
    /// Play info-category cues
    pub info_sound: bool,
    /// Play alert-category cues
    pub alert_sound: bool,
    /// Silence every cue
    pub mute: bool,
    /// Primary camera view
    pub view1: PoseView,
    /// Secondary camera view
    pub view2: PoseView,
}

impl UserPreferences {
    /// Defaults for a given user
    #[must_use]
    pub fn for_user(id_user: i64) -> Self {
        Self {
            id_user,
            ..Self::default()
        }
    }
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            id_user: 0,
            language: "en".into(),
            notifications: true,
            units: "metric".into(),
            dual_mode: false,
            feedback_mode: FeedbackMode::Both,
            info_sound: true,
            alert_sound: true,
            mute: false,
            view1: PoseView::Front,
            view2: PoseView::Left,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pose_view_parsing_defaults_to_front() {
        assert_eq!("LEFT".parse::<PoseView>(), Ok(PoseView::Left));
        assert_eq!("top_down".parse::<PoseView>(), Ok(PoseView::TopDown));
        assert_eq!("sideways".parse::<PoseView>(), Ok(PoseView::Front));
    }

    #[test]
    fn test_pose_view_wire_names() {
        assert_eq!(
            serde_json::to_string(&PoseView::BottomUp).unwrap(),
            "\"bottom_up\""
        );
        assert_eq!(PoseView::Front.to_string(), "Front");
    }
}
