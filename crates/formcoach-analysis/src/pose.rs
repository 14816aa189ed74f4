// ABOUTME: 2D body pose built from estimator JSON, with line angles and pixel distances
// ABOUTME: Angles use 0 degrees pointing up on an image whose y axis grows downwards
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Pose geometry.
//!
//! A frame arrives as `{"timestamp": ms, "keypoints": {"<id>": {"x": .., "y": ..}}}`.
//! Connections (keypoint pairs) come from a keypoint configuration and define the
//! lines whose angles the rest of the engine evaluates.

use std::collections::BTreeMap;

use formcoach_core::constants::angles::UNSET;
use formcoach_core::errors::AnalysisError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, warn};

/// Full turn in degrees
const FULL_TURN_DEG: f64 = 360.0;

/// Image-space point of one keypoint
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    /// Horizontal pixel coordinate
    pub x: f64,
    /// Vertical pixel coordinate (grows downwards)
    pub y: f64,
}

/// A pair of keypoints forming a body line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    /// First keypoint id
    pub from: u32,
    /// Second keypoint id
    pub to: u32,
    /// Human-readable name (`"left_hip<->left_knee"`)
    pub name: String,
}

impl Connection {
    /// Line key used by angle maps and constraints
    #[must_use]
    pub fn line(&self) -> String {
        format!("{}_{}", self.from, self.to)
    }
}

/// Keypoint names and connections loaded from a pose configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeypointConfig {
    /// Keypoint id to name
    pub keypoints: BTreeMap<u32, String>,
    /// Lines evaluated by the engine
    pub connections: Vec<Connection>,
}

impl KeypointConfig {
    /// Parse `{"KEYPOINTS": {"<id>": "name"}, "CONNECTIONS": [[a, b], ...]}`
    ///
    /// Both keys are optional; missing names fall back to the numeric id.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPayload` if a keypoint id is not an integer or a connection is
    /// not a pair of integers
    pub fn from_json(value: &Value) -> Result<Self, AnalysisError> {
        let mut keypoints = BTreeMap::new();
        if let Some(map) = value.get("KEYPOINTS").and_then(Value::as_object) {
            for (key, name) in map {
                let id: u32 = key.parse().map_err(|_| {
                    AnalysisError::invalid_payload("keypoint config", format!("bad id '{key}'"))
                })?;
                let name = name.as_str().map_or_else(|| name.to_string(), str::to_owned);
                keypoints.insert(id, name);
            }
        }

        let mut connections = Vec::new();
        if let Some(pairs) = value.get("CONNECTIONS").and_then(Value::as_array) {
            for pair in pairs {
                let (from, to) = parse_pair(pair).ok_or_else(|| {
                    AnalysisError::invalid_payload("keypoint config", format!("bad pair {pair}"))
                })?;
                connections.push(Connection {
                    from,
                    to,
                    name: format!(
                        "{}<->{}",
                        Self::name_of(&keypoints, from),
                        Self::name_of(&keypoints, to)
                    ),
                });
            }
        }

        Ok(Self {
            keypoints,
            connections,
        })
    }

    fn name_of(keypoints: &BTreeMap<u32, String>, id: u32) -> String {
        keypoints
            .get(&id)
            .cloned()
            .unwrap_or_else(|| id.to_string())
    }

    /// Display name for a line key, or the key itself when unknown
    #[must_use]
    pub fn line_name(&self, line: &str) -> String {
        self.connections
            .iter()
            .find(|connection| connection.line() == line)
            .map_or_else(|| line.to_owned(), |connection| connection.name.clone())
    }
}

fn parse_pair(pair: &Value) -> Option<(u32, u32)> {
    let items = pair.as_array()?;
    if items.len() != 2 {
        return None;
    }
    let from = u32::try_from(items[0].as_u64()?).ok()?;
    let to = u32::try_from(items[1].as_u64()?).ok()?;
    Some((from, to))
}

/// One frame of detected keypoints
#[derive(Debug, Clone, PartialEq)]
pub struct Pose {
    timestamp: i64,
    keypoints: BTreeMap<u32, Keypoint>,
    connections: Vec<Connection>,
}

impl Pose {
    /// Build a pose from estimator JSON
    ///
    /// A missing timestamp becomes 0. Keypoints without `x`/`y` or with a
    /// non-numeric id are skipped.
    #[must_use]
    pub fn from_json(value: &Value, connections: &[Connection]) -> Self {
        let timestamp = value.get("timestamp").and_then(Value::as_i64).unwrap_or_else(|| {
            warn!("Pose payload has no timestamp, using 0");
            0
        });

        let mut keypoints = BTreeMap::new();
        if let Some(map) = value.get("keypoints").and_then(Value::as_object) {
            for (key, point) in map {
                let coords = point
                    .get("x")
                    .and_then(Value::as_f64)
                    .zip(point.get("y").and_then(Value::as_f64));
                let Some((x, y)) = coords else {
                    error!(keypoint = %key, payload = %point, "Keypoint without x or y, skipped");
                    continue;
                };
                let Ok(id) = key.parse::<u32>() else {
                    error!(keypoint = %key, "Keypoint id is not numeric, skipped");
                    continue;
                };
                keypoints.insert(id, Keypoint { x, y });
            }
        }

        Self {
            timestamp,
            keypoints,
            connections: connections.to_vec(),
        }
    }

    /// Placeholder pose without keypoints, used for frames that were not delivered
    #[must_use]
    pub const fn empty(timestamp: i64) -> Self {
        Self {
            timestamp,
            keypoints: BTreeMap::new(),
            connections: Vec::new(),
        }
    }

    /// Build a pose directly from points
    #[must_use]
    pub fn from_points(
        timestamp: i64,
        keypoints: BTreeMap<u32, Keypoint>,
        connections: &[Connection],
    ) -> Self {
        Self {
            timestamp,
            keypoints,
            connections: connections.to_vec(),
        }
    }

    /// Capture timestamp in ms
    #[must_use]
    pub const fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Detected keypoints
    #[must_use]
    pub const fn keypoints(&self) -> &BTreeMap<u32, Keypoint> {
        &self.keypoints
    }

    /// Configured connections
    #[must_use]
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Whether no keypoint was detected
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keypoints.is_empty()
    }

    /// Whether the two keypoints form a configured line, in either order
    #[must_use]
    pub fn are_connected(&self, a: u32, b: u32) -> bool {
        self.connections
            .iter()
            .any(|c| (c.from == a && c.to == b) || (c.from == b && c.to == a))
    }

    fn endpoints(&self, a: u32, b: u32) -> Result<(Keypoint, Keypoint), AnalysisError> {
        let p1 = self
            .keypoints
            .get(&a)
            .ok_or_else(|| AnalysisError::missing_keypoint(a))?;
        let p2 = self
            .keypoints
            .get(&b)
            .ok_or_else(|| AnalysisError::missing_keypoint(b))?;
        Ok((*p1, *p2))
    }

    /// Euclidean pixel distance between two keypoints
    ///
    /// # Errors
    ///
    /// Returns `MissingKeypoint` if either keypoint is absent
    pub fn pixel_distance(&self, a: u32, b: u32) -> Result<f64, AnalysisError> {
        let (p1, p2) = self.endpoints(a, b)?;
        Ok((p2.x - p1.x).hypot(p2.y - p1.y))
    }

    /// Orientation of the line `a -> b` in degrees, 0 up, clockwise, in `[0, 360)`
    ///
    /// # Errors
    ///
    /// Returns `MissingKeypoint` if either keypoint is absent
    pub fn angle(&self, a: u32, b: u32) -> Result<f64, AnalysisError> {
        let (p1, p2) = self.endpoints(a, b)?;
        let dx = p2.x - p1.x;
        let dy = p2.y - p1.y;
        let mut angle = dx.atan2(-dy).to_degrees();
        if angle < 0.0 {
            angle += FULL_TURN_DEG;
        }
        if angle >= FULL_TURN_DEG {
            angle -= FULL_TURN_DEG;
        }
        Ok(angle)
    }

    /// Angles of every configured line, keyed `"<a>_<b>"`; `-1` when an endpoint is missing
    #[must_use]
    pub fn angles(&self) -> BTreeMap<String, f64> {
        self.connections
            .iter()
            .map(|connection| {
                let line = connection.line();
                let angle = self.angle(connection.from, connection.to).unwrap_or_else(|_| {
                    warn!(line = %line, "Missing keypoint for line");
                    UNSET
                });
                (line, angle)
            })
            .collect()
    }
}
