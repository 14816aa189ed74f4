// ABOUTME: Application constants organized by domain
// ABOUTME: Alert queue, capture pipeline, validation and state machine tuning values
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Alert (audio cue) queue limits
pub mod alerts {
    /// Maximum number of pending cues
    pub const MAX_QUEUE_LEN: usize = 5;

    /// Minimum gap between two played cues in milliseconds
    pub const MIN_PLAY_INTERVAL_MS: i64 = 2000;
}

/// Pose capture pipeline tuning
pub mod capture {
    /// Maximum timestamp distance for pairing a secondary-view frame with the primary one
    pub const SYNC_TOLERANCE_MS: i64 = 50;

    /// Maximum buffered secondary-view angle sets
    pub const VIEW2_QUEUE_CAP: usize = 30;

    /// Consecutive primary-view misses that abort the capture
    pub const DEFAULT_MAX_ALLOWED_MISSES: u32 = 10;

    /// Frames skipped before the analysis starts
    pub const DEFAULT_STARTING_MISSING_FRAMES: u32 = 5;

    /// Nominal interval between frames (about 30 fps)
    pub const FRAME_INTERVAL_MS: i64 = 33;

    /// Default frame width in pixels
    pub const DEFAULT_WIDTH: u32 = 640;

    /// Default frame height in pixels
    pub const DEFAULT_HEIGHT: u32 = 480;

    /// Default maximum JSON payload size per frame
    pub const DEFAULT_JSON_SIZE: usize = 8192;
}

/// Input validation rules
pub mod validation {
    /// Minimum password length
    pub const MIN_PASSWORD_LEN: usize = 6;

    /// Accepted e-mail shape
    pub const EMAIL_PATTERN: &str = r"^(\w+)(\.\w+)*@(\w+\.)+\w+$";
}

/// Well-known exercise state ids
pub mod states {
    /// Resting position; returning here closes a repetition
    pub const REST_STATE_ID: i64 = 1;

    /// First movement state; entering it starts the set clock
    pub const START_STATE_ID: i64 = 2;
}

/// Angle sentinels
pub mod angles {
    /// Marker for "no value" in persisted constraints and missing-keypoint angles
    pub const UNSET: f64 = -1.0;
}
