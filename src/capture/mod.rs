// ABOUTME: Pose capture pipeline driving the exercise state machine frame by frame
// ABOUTME: Handles warm-up, missed frames, dual-view sync, feedback and audio cue selection
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Capture Pipeline
//!
//! A [`CaptureSession`] pulls one pose per tick from a primary [`FrameSource`] and,
//! in dual mode, from a secondary one whose angles are paired by timestamp through
//! the [`ViewSynchronizer`]. Analysis starts after a warm-up period; once running,
//! too many consecutive primary misses stop the capture as incomplete.

/// Frame sources
pub mod source;
/// Dual-view timestamp pairing
pub mod sync;

pub use source::{DirectoryFrameSource, FrameSource, MemoryFrameSource};
pub use sync::ViewSynchronizer;

use tracing::{debug, error, info};
use uuid::Uuid;

use crate::analysis::{
    AlertQueue, AnglesByView, Condition, ConditionCategory, Feedback, Pose, SessionReport,
    StateMachine,
};
use crate::config::CaptureConfig;
use crate::constants::capture::FRAME_INTERVAL_MS;
use crate::errors::AppResult;
use crate::models::{ExerciseSpec, UserPreferences};

/// What one call to [`CaptureSession::process_next_frame`] did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameOutcome {
    /// The capture is no longer running
    Idle,
    /// Frame consumed by the warm-up period
    WarmingUp,
    /// Analysis paused or no usable angles in this frame
    Skipped,
    /// Frame analyzed
    Analyzed(Feedback),
    /// Frame analyzed and the exercise finished
    Completed(Feedback),
    /// Too many consecutive primary misses; capture stopped
    Stopped,
}

/// Final state of a capture run
#[derive(Debug, Clone)]
pub struct CaptureResult {
    /// Conditions and statistics gathered by the state machine
    pub report: SessionReport,
    /// Whether the exercise was completed
    pub complete: bool,
    /// Frames read from the primary source
    pub frames: u64,
    /// Non-empty feedback produced along the way
    pub feedback_log: Vec<Feedback>,
}

/// One exercise being captured and analyzed
pub struct CaptureSession {
    machine: StateMachine,
    primary: Box<dyn FrameSource>,
    secondary: Option<Box<dyn FrameSource>>,
    config: CaptureConfig,
    alerts: AlertQueue,
    sync: ViewSynchronizer,
    run_id: Uuid,
    running: bool,
    analysing: bool,
    // None once the warm-up period is over
    warmup_frames: Option<u32>,
    misses: u32,
    frames: u64,
    last_timestamp: i64,
    complete: bool,
    feedback_log: Vec<Feedback>,
}

impl CaptureSession {
    /// Build a session for `spec` reading from `primary`
    ///
    /// # Errors
    ///
    /// Returns an analysis error if the spec cannot be turned into a state machine
    pub fn new(
        spec: &ExerciseSpec,
        config: CaptureConfig,
        primary: Box<dyn FrameSource>,
    ) -> AppResult<Self> {
        let mut machine = StateMachine::new(spec)?;
        let run_id = Uuid::new_v4();
        machine
            .report_mut()
            .append_log(&format!("capture {run_id} exercise {}", spec.id_ex));

        info!(
            run_id = %run_id,
            id_ex = spec.id_ex,
            view = %primary.view(),
            dual_mode = config.dual_mode,
            "Capture session created"
        );
        Ok(Self {
            machine,
            primary,
            secondary: None,
            sync: ViewSynchronizer::new(config.sync_tolerance_ms),
            config,
            alerts: AlertQueue::new(),
            run_id,
            running: true,
            analysing: false,
            warmup_frames: Some(0),
            misses: 0,
            frames: 0,
            last_timestamp: 0,
            complete: false,
            feedback_log: Vec::new(),
        })
    }

    /// Attach the second camera; only read in dual mode
    #[must_use]
    pub fn with_secondary(mut self, secondary: Box<dyn FrameSource>) -> Self {
        self.secondary = Some(secondary);
        self
    }

    /// Apply a user's sound preferences to the alert queue
    #[must_use]
    pub fn with_preferences(mut self, preferences: &UserPreferences) -> Self {
        self.alerts
            .set_muted(preferences.mute || !preferences.feedback_mode.plays_audio());
        self.alerts
            .set_category_enabled(ConditionCategory::Info, preferences.info_sound);
        self.alerts
            .set_category_enabled(ConditionCategory::Alert, preferences.alert_sound);
        self
    }

    /// Correlation id written to the report log
    #[must_use]
    pub const fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Whether frames are still being processed
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Whether the state machine is receiving frames
    #[must_use]
    pub const fn is_analysing(&self) -> bool {
        self.analysing
    }

    /// The state machine being driven
    #[must_use]
    pub const fn machine(&self) -> &StateMachine {
        &self.machine
    }

    /// Pending audio cues
    #[must_use]
    pub const fn alerts(&self) -> &AlertQueue {
        &self.alerts
    }

    /// Read and analyze one frame
    ///
    /// `now_ms` stands in for the timestamp when the primary frame is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if a frame source fails
    pub async fn process_next_frame(&mut self, now_ms: i64) -> AppResult<FrameOutcome> {
        if !self.running {
            return Ok(FrameOutcome::Idle);
        }

        let primary = self.primary.next_frame().await?;
        self.frames += 1;
        let timestamp = primary.as_ref().map_or(now_ms, Pose::timestamp);
        self.last_timestamp = timestamp;

        let mut angles_by_view = AnglesByView::new();
        if self.config.dual_mode {
            self.read_secondary(timestamp, &mut angles_by_view).await?;
        }

        if primary.is_none() {
            if self.analysing {
                self.misses += 1;
                if self.misses >= self.config.max_allowed_misses {
                    error!(
                        run_id = %self.run_id,
                        misses = self.misses,
                        "Primary view lost, capture stopped"
                    );
                    self.finish(false);
                    return Ok(FrameOutcome::Stopped);
                }
            }
        } else {
            self.misses = 0;
        }

        if !self.analysing {
            if let Some(count) = self.warmup_frames {
                let count = count + 1;
                if count >= self.config.starting_missing_frames && primary.is_some() {
                    self.warmup_frames = None;
                    self.analysing = true;
                    info!(run_id = %self.run_id, frames = count, "Analysis started after warm-up");
                } else {
                    self.warmup_frames = Some(count);
                    return Ok(FrameOutcome::WarmingUp);
                }
            }
        }

        if let Some(pose) = &primary {
            angles_by_view.insert(self.config.view1, pose.angles());
        }

        let feedback = if self.analysing && !angles_by_view.is_empty() {
            let conditions = self.machine.run(&angles_by_view, timestamp);
            Some(self.handle_conditions(&conditions, timestamp))
        } else {
            None
        };

        if self.machine.is_complete() {
            self.finish(true);
            return Ok(FrameOutcome::Completed(feedback.unwrap_or_default()));
        }
        Ok(feedback.map_or(FrameOutcome::Skipped, FrameOutcome::Analyzed))
    }

    async fn read_secondary(
        &mut self,
        timestamp: i64,
        angles_by_view: &mut AnglesByView,
    ) -> AppResult<()> {
        if let Some(secondary) = self.secondary.as_mut() {
            if let Some(pose) = secondary.next_frame().await? {
                self.sync.push(pose.timestamp(), pose.angles());
            }
        }
        match self.sync.take_match(timestamp) {
            Some(angles) => {
                angles_by_view.insert(self.config.view2, angles);
            }
            None => debug!(timestamp, "No secondary angles close to this frame"),
        }
        Ok(())
    }

    fn handle_conditions(&mut self, conditions: &[Condition], timestamp: i64) -> Feedback {
        let feedback = Feedback::from_conditions(conditions);
        self.alerts.offer_feedback(&feedback, timestamp);
        if let Some(cue) = self.alerts.play_next(timestamp) {
            debug!(cue = cue.cue, category = cue.category.as_str(), "Audio cue");
        }
        if !feedback.is_empty() {
            self.feedback_log.push(feedback.clone());
        }
        feedback
    }

    /// Process frames until the exercise ends, the capture stops or the sources run dry
    ///
    /// Frames without a timestamp are placed `FRAME_INTERVAL_MS` after the previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if a frame source fails
    pub async fn run_to_end(mut self) -> AppResult<CaptureResult> {
        while self.running {
            if self.sources_exhausted() {
                info!(run_id = %self.run_id, frames = self.frames, "Frame sources exhausted");
                let complete = self.machine.is_complete();
                self.finish(complete);
                break;
            }
            let now = self.last_timestamp + FRAME_INTERVAL_MS;
            self.process_next_frame(now).await?;
        }
        Ok(self.into_result())
    }

    fn sources_exhausted(&self) -> bool {
        let secondary_done = match &self.secondary {
            Some(source) if self.config.dual_mode => source.is_exhausted(),
            _ => true,
        };
        self.primary.is_exhausted() && secondary_done
    }

    /// Stop sending frames to the state machine
    pub fn pause_analysis(&mut self) {
        self.analysing = false;
        debug!(run_id = %self.run_id, "Analysis paused");
    }

    /// Resume analysis, skipping any remaining warm-up
    pub fn resume_analysis(&mut self) {
        self.warmup_frames = None;
        self.analysing = true;
        debug!(run_id = %self.run_id, "Analysis resumed");
    }

    /// Force the end of the current serie
    pub fn new_serie(&mut self) -> Feedback {
        let conditions = self.machine.new_serie();
        let feedback = self.handle_conditions(&conditions, self.last_timestamp);
        if self.machine.is_complete() {
            self.finish(true);
        }
        feedback
    }

    /// Stop the capture as incomplete
    pub fn stop(&mut self) {
        if self.running {
            info!(run_id = %self.run_id, "Capture stopped on request");
            self.finish(false);
        }
    }

    fn finish(&mut self, complete: bool) {
        self.running = false;
        self.analysing = false;
        self.complete = complete;
        self.machine.report_mut().append_log(&format!(
            "capture {} finished complete={complete} frames={}",
            self.run_id, self.frames
        ));
        info!(
            run_id = %self.run_id,
            complete,
            frames = self.frames,
            serie = self.machine.serie_number(),
            "Capture finished"
        );
    }

    /// Hand over the report and counters
    #[must_use]
    pub fn into_result(mut self) -> CaptureResult {
        CaptureResult {
            report: self.machine.take_report(),
            complete: self.complete,
            frames: self.frames,
            feedback_log: self.feedback_log,
        }
    }
}
