// ABOUTME: Audio cue queue deciding which feedback sounds play and in what order
// ABOUTME: Bounded priority queue with rate limiting, muting and per-category switches
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Alert Queue
//!
//! Decides which cues play; audio output itself belongs to the caller. The queue
//! holds at most five cues. When it is full, informational offers are dropped and
//! higher-priority offers evict the oldest informational entry, then the oldest
//! alert, and finally the oldest critical one.

use std::collections::BTreeSet;

use formcoach_core::constants::alerts::{MAX_QUEUE_LEN, MIN_PLAY_INTERVAL_MS};
use formcoach_core::models::ConditionType;
use tracing::trace;

use crate::feedback::{category, ConditionCategory, Feedback};

/// Cue name for a condition type, if it has one
#[must_use]
pub const fn cue_for(condition_type: ConditionType) -> Option<&'static str> {
    match condition_type {
        ConditionType::OptimalForm => Some("good_job"),
        ConditionType::FastMovement => Some("fast"),
        ConditionType::SlowMovement => Some("slow"),
        ConditionType::JointOverload => Some("overload"),
        ConditionType::EndOfRepetition => Some("rep"),
        ConditionType::EndOfSet => Some("set"),
        ConditionType::ExerciseOvertime
        | ConditionType::MaxStateTimeout
        | ConditionType::MinStateTimeout
        | ConditionType::RestTime => Some("time"),
        ConditionType::RestOverTime => Some("rest"),
        ConditionType::NotSteady => Some("not_steady"),
        ConditionType::SymmetryDeviation => Some("symmetry"),
        ConditionType::ExerciseInit => Some("go"),
        _ => None,
    }
}

/// A queued cue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueuedCue {
    /// Condition that produced the cue
    pub condition_type: ConditionType,
    /// Priority
    pub category: ConditionCategory,
    /// Cue name
    pub cue: &'static str,
}

/// Pending audio cues
#[derive(Debug, Clone)]
pub struct AlertQueue {
    queue: Vec<QueuedCue>,
    last_play_ms: Option<i64>,
    enabled: BTreeSet<ConditionCategory>,
    muted: bool,
}

impl Default for AlertQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertQueue {
    /// Empty queue with every category enabled
    #[must_use]
    pub fn new() -> Self {
        Self {
            queue: Vec::with_capacity(MAX_QUEUE_LEN),
            last_play_ms: None,
            enabled: [
                ConditionCategory::Info,
                ConditionCategory::Alert,
                ConditionCategory::Critical,
            ]
            .into_iter()
            .collect(),
            muted: false,
        }
    }

    /// Offer a cue; returns whether the queue changed
    pub fn offer(
        &mut self,
        condition_type: ConditionType,
        category: ConditionCategory,
        now_ms: i64,
    ) -> bool {
        if self.muted || !self.enabled.contains(&category) {
            return false;
        }
        let Some(cue) = cue_for(condition_type) else {
            return false;
        };
        if self
            .last_play_ms
            .is_some_and(|last| now_ms - last < MIN_PLAY_INTERVAL_MS)
        {
            return false;
        }
        if self.queue.iter().any(|queued| queued.cue == cue) {
            return false;
        }

        let entry = QueuedCue {
            condition_type,
            category,
            cue,
        };
        if self.queue.len() < MAX_QUEUE_LEN {
            self.queue.push(entry);
            return true;
        }
        if category == ConditionCategory::Info {
            trace!(cue, "Alert queue full, info cue dropped");
            return false;
        }

        if let Some(index) = self
            .first_of(ConditionCategory::Info)
            .or_else(|| self.first_of(ConditionCategory::Alert))
        {
            self.queue[index] = entry;
        } else if let Some(index) = self.first_of(ConditionCategory::Critical) {
            self.queue.remove(index);
            self.queue.push(entry);
        }
        true
    }

    fn first_of(&self, wanted: ConditionCategory) -> Option<usize> {
        self.queue.iter().position(|queued| queued.category == wanted)
    }

    /// Offer every entry of a feedback
    pub fn offer_feedback(&mut self, feedback: &Feedback, now_ms: i64) {
        for &condition_type in &feedback.entries {
            self.offer(condition_type, category(condition_type), now_ms);
        }
    }

    /// Pop the highest-priority cue (FIFO within a category) and record the play time
    pub fn play_next(&mut self, now_ms: i64) -> Option<QueuedCue> {
        let best = self.queue.iter().map(|q| q.category).max()?;
        let index = self.queue.iter().position(|q| q.category == best)?;
        let cue = self.queue.remove(index);
        self.last_play_ms = Some(now_ms);
        Some(cue)
    }

    /// Pending cues in queue order
    #[must_use]
    pub fn pending(&self) -> &[QueuedCue] {
        &self.queue
    }

    /// Number of pending cues
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether no cue is pending
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Drop every pending cue
    pub fn clear(&mut self) {
        self.queue.clear();
    }

    /// Mute or unmute; muting drops pending cues
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        if muted {
            self.queue.clear();
        }
    }

    /// Whether the queue is muted
    #[must_use]
    pub const fn is_muted(&self) -> bool {
        self.muted
    }

    /// Enable or disable a category
    pub fn set_category_enabled(&mut self, category: ConditionCategory, enabled: bool) {
        if enabled {
            self.enabled.insert(category);
        } else {
            self.enabled.remove(&category);
        }
    }
}
