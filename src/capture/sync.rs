// ABOUTME: Pairs secondary-view angles with primary frames by timestamp
// ABOUTME: Keeps a bounded queue of secondary readings and discards stale ones
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::{BTreeMap, VecDeque};

use crate::constants::capture::VIEW2_QUEUE_CAP;

/// Secondary camera readings waiting for a primary frame
#[derive(Debug, Clone)]
pub struct ViewSynchronizer {
    queue: VecDeque<(i64, BTreeMap<String, f64>)>,
    tolerance_ms: i64,
}

impl ViewSynchronizer {
    /// Empty synchronizer matching within `tolerance_ms`
    #[must_use]
    pub fn new(tolerance_ms: i64) -> Self {
        Self {
            queue: VecDeque::with_capacity(VIEW2_QUEUE_CAP + 1),
            tolerance_ms,
        }
    }

    /// Queue a reading, dropping the oldest past `VIEW2_QUEUE_CAP`
    pub fn push(&mut self, timestamp: i64, angles: BTreeMap<String, f64>) {
        self.queue.push_back((timestamp, angles));
        while self.queue.len() > VIEW2_QUEUE_CAP {
            self.queue.pop_front();
        }
    }

    /// Reading close enough to `timestamp`
    ///
    /// Readings older than `timestamp - tolerance` are discarded first. Only the head
    /// is considered, so a reading ahead of the frame stays queued.
    pub fn take_match(&mut self, timestamp: i64) -> Option<BTreeMap<String, f64>> {
        while let Some(&(queued, _)) = self.queue.front() {
            if queued < timestamp - self.tolerance_ms {
                self.queue.pop_front();
                continue;
            }
            if (queued - timestamp).abs() <= self.tolerance_ms {
                return self.queue.pop_front().map(|(_, angles)| angles);
            }
            break;
        }
        None
    }

    /// Queued readings
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether nothing is queued
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Drop every queued reading
    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn angles(value: f64) -> BTreeMap<String, f64> {
        BTreeMap::from([("1_2".to_owned(), value)])
    }

    #[test]
    fn test_queue_is_capped() {
        let mut sync = ViewSynchronizer::new(50);
        for i in 0..40 {
            sync.push(i, angles(0.0));
        }
        assert_eq!(sync.len(), VIEW2_QUEUE_CAP);
    }

    #[test]
    fn test_match_discards_stale_readings() {
        let mut sync = ViewSynchronizer::new(50);
        sync.push(100, angles(1.0));
        sync.push(960, angles(2.0));
        sync.push(1020, angles(3.0));

        let matched = sync.take_match(1000).unwrap();
        assert!((matched["1_2"] - 2.0).abs() < f64::EPSILON);
        assert_eq!(sync.len(), 1);
    }

    #[test]
    fn test_future_reading_stays_queued() {
        let mut sync = ViewSynchronizer::new(50);
        sync.push(2000, angles(1.0));
        assert!(sync.take_match(1000).is_none());
        assert_eq!(sync.len(), 1);
        assert!(sync.take_match(1980).is_some());
        assert!(sync.is_empty());
    }
}
