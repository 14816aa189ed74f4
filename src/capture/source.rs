// ABOUTME: Frame sources delivering pose keypoints to the capture pipeline
// ABOUTME: Directory source reads recorded *.json frames; memory source serves frames from a Vec
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::analysis::{Connection, Pose};
use crate::errors::{AppError, AppResult};
use crate::models::PoseView;

/// Something that produces one pose per call
#[async_trait]
pub trait FrameSource: Send {
    /// Next pose; `Ok(None)` is a missed frame
    async fn next_frame(&mut self) -> AppResult<Option<Pose>>;

    /// Camera view of this source
    fn view(&self) -> PoseView;

    /// Whether every frame has been delivered
    fn is_exhausted(&self) -> bool;
}

/// Recorded frames in a folder, read in file name order
#[derive(Debug)]
pub struct DirectoryFrameSource {
    folder: PathBuf,
    files: Vec<PathBuf>,
    next: usize,
    view: PoseView,
    connections: Vec<Connection>,
}

impl DirectoryFrameSource {
    /// List the `*.json` files of `folder`
    ///
    /// # Errors
    ///
    /// Returns a capture error if the folder cannot be listed
    pub async fn open(
        folder: impl AsRef<Path>,
        view: PoseView,
        connections: Vec<Connection>,
    ) -> AppResult<Self> {
        let folder = folder.as_ref().to_path_buf();
        let mut entries = tokio::fs::read_dir(&folder).await.map_err(|e| {
            AppError::capture(format!("Cannot read frame folder {}", folder.display()))
                .with_source(e)
        })?;

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                files.push(path);
            }
        }
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        debug!(folder = %folder.display(), frames = files.len(), view = %view, "Frame folder opened");
        Ok(Self {
            folder,
            files,
            next: 0,
            view,
            connections,
        })
    }

    /// Folder the frames come from
    #[must_use]
    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Number of frame files found
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the folder held no frames
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[async_trait]
impl FrameSource for DirectoryFrameSource {
    async fn next_frame(&mut self) -> AppResult<Option<Pose>> {
        let Some(path) = self.files.get(self.next) else {
            return Ok(None);
        };
        self.next += 1;

        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(file = %path.display(), error = %e, "Cannot read frame file");
                return Ok(None);
            }
        };
        match serde_json::from_str::<Value>(&raw) {
            Ok(value) => Ok(Some(Pose::from_json(&value, &self.connections))),
            Err(e) => {
                warn!(file = %path.display(), error = %e, "Frame file is not valid JSON");
                Ok(None)
            }
        }
    }

    fn view(&self) -> PoseView {
        self.view
    }

    fn is_exhausted(&self) -> bool {
        self.next >= self.files.len()
    }
}

/// Frames held in memory; `None` entries are dropped frames
#[derive(Debug, Clone)]
pub struct MemoryFrameSource {
    frames: VecDeque<Option<Value>>,
    view: PoseView,
    connections: Vec<Connection>,
}

impl MemoryFrameSource {
    /// Serve `frames` in order
    #[must_use]
    pub fn new(view: PoseView, connections: Vec<Connection>, frames: Vec<Option<Value>>) -> Self {
        Self {
            frames: frames.into(),
            view,
            connections,
        }
    }
}

#[async_trait]
impl FrameSource for MemoryFrameSource {
    async fn next_frame(&mut self) -> AppResult<Option<Pose>> {
        Ok(self
            .frames
            .pop_front()
            .flatten()
            .map(|value| Pose::from_json(&value, &self.connections)))
    }

    fn view(&self) -> PoseView {
        self.view
    }

    fn is_exhausted(&self) -> bool {
        self.frames.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn knee_line() -> Vec<Connection> {
        vec![Connection {
            from: 1,
            to: 2,
            name: "hip<->knee".into(),
        }]
    }

    #[tokio::test]
    async fn test_memory_source_serves_gaps() {
        let mut source = MemoryFrameSource::new(
            PoseView::Front,
            knee_line(),
            vec![
                Some(json!({"timestamp": 10, "keypoints": {"1": {"x": 0.0, "y": 0.0}}})),
                None,
            ],
        );

        let first = source.next_frame().await.unwrap().unwrap();
        assert_eq!(first.timestamp(), 10);
        assert!(source.next_frame().await.unwrap().is_none());
        assert!(source.is_exhausted());
        assert!(source.next_frame().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_directory_source_orders_and_skips_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("002.json"), r#"{"timestamp": 2, "keypoints": {}}"#)
            .await
            .unwrap();
        tokio::fs::write(dir.path().join("001.json"), r#"{"timestamp": 1, "keypoints": {}}"#)
            .await
            .unwrap();
        tokio::fs::write(dir.path().join("003.json"), "not json").await.unwrap();
        tokio::fs::write(dir.path().join("notes.txt"), "ignored").await.unwrap();

        let mut source = DirectoryFrameSource::open(dir.path(), PoseView::Left, knee_line())
            .await
            .unwrap();
        assert_eq!(source.len(), 3);
        assert_eq!(source.view(), PoseView::Left);

        assert_eq!(source.next_frame().await.unwrap().unwrap().timestamp(), 1);
        assert_eq!(source.next_frame().await.unwrap().unwrap().timestamp(), 2);
        assert!(source.next_frame().await.unwrap().is_none());
        assert!(source.is_exhausted());
    }

    #[tokio::test]
    async fn test_directory_source_missing_folder() {
        let err = DirectoryFrameSource::open("/nonexistent/frames", PoseView::Front, Vec::new())
            .await
            .unwrap_err();
        assert_eq!(err.code, crate::errors::ErrorCode::CaptureError);
    }
}
