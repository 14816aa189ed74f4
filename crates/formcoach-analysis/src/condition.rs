// ABOUTME: Condition raised by a state or the state machine for one line and view
// ABOUTME: Identity ignores the measured value so repeated raises aggregate together
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt;
use std::hash::{Hash, Hasher};

use formcoach_core::models::{ConditionSpec, ConditionType, PoseView};
use serde::{Deserialize, Serialize};

/// A condition observed in one frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Condition {
    /// What happened
    pub condition_type: ConditionType,
    /// Line concerned, empty for line-independent conditions
    pub keypoint_line: String,
    /// Measured value (rounded angle, elapsed ms...)
    pub value: Option<i64>,
    /// View the condition was observed in
    pub view: Option<PoseView>,
}

impl Condition {
    /// Line-independent condition without a value
    #[must_use]
    pub const fn new(condition_type: ConditionType) -> Self {
        Self {
            condition_type,
            keypoint_line: String::new(),
            value: None,
            view: None,
        }
    }

    /// Condition on a line in a view, carrying a value
    #[must_use]
    pub fn on_line(
        condition_type: ConditionType,
        line: impl Into<String>,
        view: PoseView,
        value: Option<i64>,
    ) -> Self {
        Self {
            condition_type,
            keypoint_line: line.into(),
            value,
            view: Some(view),
        }
    }

    /// Attach a value
    #[must_use]
    pub const fn with_value(mut self, value: i64) -> Self {
        self.value = Some(value);
        self
    }

    /// Attach a line
    #[must_use]
    pub fn with_line(mut self, line: impl Into<String>) -> Self {
        self.keypoint_line = line.into();
        self
    }

    /// Whether this observed condition satisfies a required one
    ///
    /// A required condition without a view matches any view.
    #[must_use]
    pub fn matches(&self, required: &Self) -> bool {
        self.condition_type == required.condition_type
            && self.keypoint_line == required.keypoint_line
            && (required.view.is_none() || self.view == required.view)
    }

    /// Build a required condition from its persisted form
    #[must_use]
    pub fn from_spec(spec: &ConditionSpec) -> Self {
        Self {
            condition_type: spec.condition_type,
            keypoint_line: spec.keypoint_line.clone(),
            value: None,
            view: spec.view,
        }
    }

    /// Persisted form
    #[must_use]
    pub fn to_spec(&self) -> ConditionSpec {
        ConditionSpec {
            condition_type: self.condition_type,
            keypoint_line: self.keypoint_line.clone(),
            view: self.view,
        }
    }
}

impl PartialEq for Condition {
    fn eq(&self, other: &Self) -> bool {
        self.condition_type == other.condition_type
            && self.keypoint_line == other.keypoint_line
            && self.view == other.view
    }
}

impl Eq for Condition {}

impl Hash for Condition {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.condition_type.hash(state);
        self.keypoint_line.hash(state);
        self.view.hash(state);
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.condition_type)?;
        if !self.keypoint_line.is_empty() {
            write!(f, " [{}]", self.keypoint_line)?;
        }
        if let Some(view) = self.view {
            write!(f, " ({view})")?;
        }
        if let Some(value) = self.value {
            write!(f, " = {value}")?;
        }
        Ok(())
    }
}
