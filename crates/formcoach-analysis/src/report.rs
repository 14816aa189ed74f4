// ABOUTME: Session report aggregating condition counts per serie, repetition and state
// ABOUTME: Holds global angle ranges and overloads, and persists to JSON columns
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Session Report
//!
//! Conditions are stored as `serie -> repetition -> state -> [(condition, count)]`.
//! Identical conditions (same type, line and view) share one counter; the stored
//! value is the most recent one observed.
//!
//! Persistence uses three JSON documents:
//! - series: `[{"serie", "rep", "state", "type", "line", "view", "value", "count"}]`
//! - global angles: `{"<line>": {"min": .., "max": ..}}`
//! - global overloads: `{"<line>": count}`

use std::collections::BTreeMap;

use formcoach_core::errors::AnalysisError;
use formcoach_core::models::{ConditionType, PoseView, SessionReportJson};
use serde::{Deserialize, Serialize};

use crate::condition::Condition;

/// Conditions with their counts, per state
pub type StateConditions = BTreeMap<i64, Vec<(Condition, u64)>>;
/// Per repetition
pub type RepetitionConditions = BTreeMap<i64, StateConditions>;
/// Per serie
pub type SeriesConditions = BTreeMap<i64, RepetitionConditions>;

#[derive(Debug, Serialize, Deserialize)]
struct SeriesRecord {
    serie: i64,
    rep: i64,
    state: i64,
    #[serde(rename = "type")]
    condition_type: ConditionType,
    #[serde(default)]
    line: String,
    #[serde(default)]
    view: Option<PoseView>,
    #[serde(default)]
    value: Option<i64>,
    count: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct AngleRange {
    min: f64,
    max: f64,
}

fn payload_error(what: &'static str) -> impl FnOnce(serde_json::Error) -> AnalysisError {
    move |e| AnalysisError::invalid_payload(what, e.to_string())
}

/// Outcome of one training session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionReport {
    id_session: i64,
    series: SeriesConditions,
    global_angles: BTreeMap<String, (f64, f64)>,
    global_overloads: BTreeMap<String, u64>,
    log: String,
}

impl SessionReport {
    /// Empty report for a session
    #[must_use]
    pub fn new(id_session: i64) -> Self {
        Self {
            id_session,
            ..Self::default()
        }
    }

    /// Owning session
    #[must_use]
    pub const fn id_session(&self) -> i64 {
        self.id_session
    }

    /// Attach the report to a persisted session
    pub fn set_id_session(&mut self, id_session: i64) {
        self.id_session = id_session;
    }

    /// Raw condition tree
    #[must_use]
    pub const fn series(&self) -> &SeriesConditions {
        &self.series
    }

    /// Observed `(min, max)` angle per line
    #[must_use]
    pub const fn global_angles(&self) -> &BTreeMap<String, (f64, f64)> {
        &self.global_angles
    }

    /// Joint overloads per line
    #[must_use]
    pub const fn global_overloads(&self) -> &BTreeMap<String, u64> {
        &self.global_overloads
    }

    /// Free text log
    #[must_use]
    pub fn log(&self) -> &str {
        &self.log
    }

    /// Count one occurrence of `condition`
    pub fn add_condition(&mut self, serie: i64, rep: i64, state: i64, condition: Condition) {
        self.add_condition_count(serie, rep, state, condition, 1);
    }

    fn add_condition_count(
        &mut self,
        serie: i64,
        rep: i64,
        state: i64,
        condition: Condition,
        count: u64,
    ) {
        let entries = self
            .series
            .entry(serie)
            .or_default()
            .entry(rep)
            .or_default()
            .entry(state)
            .or_default();
        if let Some((existing, existing_count)) = entries.iter_mut().find(|(c, _)| *c == condition)
        {
            *existing_count += count;
            if condition.value.is_some() {
                existing.value = condition.value;
            }
        } else {
            entries.push((condition, count));
        }
    }

    /// Widen the global range of `line`
    pub fn merge_angle_range(&mut self, line: &str, min: f64, max: f64) {
        self.global_angles
            .entry(line.to_owned())
            .and_modify(|(lo, hi)| {
                *lo = lo.min(min);
                *hi = hi.max(max);
            })
            .or_insert((min, max));
    }

    /// Add `n` overloads on `line`
    pub fn add_overloads(&mut self, line: &str, n: u64) {
        *self.global_overloads.entry(line.to_owned()).or_insert(0) += n;
    }

    /// Append one line to the text log
    pub fn append_log(&mut self, line: &str) {
        self.log.push_str(line);
        self.log.push('\n');
    }

    fn conditions(&self) -> impl Iterator<Item = (i64, i64, i64, &Condition, u64)> {
        self.series.iter().flat_map(|(&serie, reps)| {
            reps.iter().flat_map(move |(&rep, states)| {
                states.iter().flat_map(move |(&state, entries)| {
                    entries
                        .iter()
                        .map(move |(condition, count)| (serie, rep, state, condition, *count))
                })
            })
        })
    }

    /// Occurrences of `condition_type` on `line` in one repetition, across states and views
    #[must_use]
    pub fn condition_count(
        &self,
        serie: i64,
        rep: i64,
        line: &str,
        condition_type: ConditionType,
    ) -> u64 {
        self.series
            .get(&serie)
            .and_then(|reps| reps.get(&rep))
            .map_or(0, |states| {
                states
                    .values()
                    .flatten()
                    .filter(|(c, _)| c.condition_type == condition_type && c.keypoint_line == line)
                    .map(|(_, count)| count)
                    .sum()
            })
    }

    /// Occurrences of `condition_type` in the whole session
    #[must_use]
    pub fn total_occurrences(&self, condition_type: ConditionType) -> u64 {
        self.conditions()
            .filter(|(_, _, _, c, _)| c.condition_type == condition_type)
            .map(|(_, _, _, _, count)| count)
            .sum()
    }

    /// Occurrences per condition type in the whole session
    #[must_use]
    pub fn aggregated_statistics(&self) -> BTreeMap<ConditionType, u64> {
        let mut stats = BTreeMap::new();
        for (_, _, _, condition, count) in self.conditions() {
            *stats.entry(condition.condition_type).or_insert(0) += count;
        }
        stats
    }

    /// Series with at least one condition, ascending
    #[must_use]
    pub fn stored_series(&self) -> Vec<i64> {
        self.series.keys().copied().collect()
    }

    /// Repetitions recorded in `serie`, ascending
    #[must_use]
    pub fn stored_repetitions(&self, serie: i64) -> Vec<i64> {
        self.series
            .get(&serie)
            .map(|reps| reps.keys().copied().collect())
            .unwrap_or_default()
    }

    /// `line -> type -> count` for one repetition
    #[must_use]
    pub fn repetition_data(
        &self,
        serie: i64,
        rep: i64,
    ) -> BTreeMap<String, BTreeMap<ConditionType, u64>> {
        let mut data: BTreeMap<String, BTreeMap<ConditionType, u64>> = BTreeMap::new();
        let Some(states) = self.series.get(&serie).and_then(|reps| reps.get(&rep)) else {
            return data;
        };
        for (condition, count) in states.values().flatten() {
            *data
                .entry(condition.keypoint_line.clone())
                .or_default()
                .entry(condition.condition_type)
                .or_insert(0) += count;
        }
        data
    }

    /// Drop every recorded condition, statistic and log line
    pub fn reset(&mut self) {
        self.series.clear();
        self.global_angles.clear();
        self.global_overloads.clear();
        self.log.clear();
    }

    /// Series tree as a JSON array of records
    ///
    /// # Errors
    ///
    /// Returns `InvalidPayload` if serialization fails
    pub fn to_series_json(&self) -> Result<String, AnalysisError> {
        let records: Vec<SeriesRecord> = self
            .conditions()
            .map(|(serie, rep, state, condition, count)| SeriesRecord {
                serie,
                rep,
                state,
                condition_type: condition.condition_type,
                line: condition.keypoint_line.clone(),
                view: condition.view,
                value: condition.value,
                count,
            })
            .collect();
        serde_json::to_string(&records).map_err(payload_error("series"))
    }

    /// Report holding only the series decoded from `json`; an empty string is an empty report
    ///
    /// # Errors
    ///
    /// Returns `InvalidPayload` if the JSON is malformed
    pub fn from_series_json(json: &str) -> Result<Self, AnalysisError> {
        let mut report = Self::default();
        if json.trim().is_empty() {
            return Ok(report);
        }
        let records: Vec<SeriesRecord> =
            serde_json::from_str(json).map_err(payload_error("series"))?;
        for record in records {
            let condition = Condition {
                condition_type: record.condition_type,
                keypoint_line: record.line,
                value: record.value,
                view: record.view,
            };
            report.add_condition_count(record.serie, record.rep, record.state, condition, record.count);
        }
        Ok(report)
    }

    /// Global angle ranges as `{line: {min, max}}`
    ///
    /// # Errors
    ///
    /// Returns `InvalidPayload` if serialization fails
    pub fn to_global_angles_json(&self) -> Result<String, AnalysisError> {
        let ranges: BTreeMap<&str, AngleRange> = self
            .global_angles
            .iter()
            .map(|(line, &(min, max))| (line.as_str(), AngleRange { min, max }))
            .collect();
        serde_json::to_string(&ranges).map_err(payload_error("global angles"))
    }

    /// Decode `{line: {min, max}}`
    ///
    /// # Errors
    ///
    /// Returns `InvalidPayload` if the JSON is malformed
    pub fn from_global_angles_json(
        json: &str,
    ) -> Result<BTreeMap<String, (f64, f64)>, AnalysisError> {
        if json.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        let ranges: BTreeMap<String, AngleRange> =
            serde_json::from_str(json).map_err(payload_error("global angles"))?;
        Ok(ranges
            .into_iter()
            .map(|(line, range)| (line, (range.min, range.max)))
            .collect())
    }

    /// Global overloads as `{line: count}`
    ///
    /// # Errors
    ///
    /// Returns `InvalidPayload` if serialization fails
    pub fn to_global_overloads_json(&self) -> Result<String, AnalysisError> {
        serde_json::to_string(&self.global_overloads).map_err(payload_error("global overloads"))
    }

    /// Decode `{line: count}`
    ///
    /// # Errors
    ///
    /// Returns `InvalidPayload` if the JSON is malformed
    pub fn from_global_overloads_json(json: &str) -> Result<BTreeMap<String, u64>, AnalysisError> {
        if json.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(json).map_err(payload_error("global overloads"))
    }

    /// Storage columns for this report
    ///
    /// # Errors
    ///
    /// Returns `InvalidPayload` if serialization fails
    pub fn to_persisted(&self) -> Result<SessionReportJson, AnalysisError> {
        Ok(SessionReportJson {
            series_json: self.to_series_json()?,
            global_angles_json: self.to_global_angles_json()?,
            global_overloads_json: self.to_global_overloads_json()?,
            log: self.log.clone(),
        })
    }

    /// Rebuild a report from its storage columns
    ///
    /// # Errors
    ///
    /// Returns `InvalidPayload` if any column holds malformed JSON
    pub fn from_persisted(id_session: i64, stored: &SessionReportJson) -> Result<Self, AnalysisError> {
        let mut report = Self::from_series_json(&stored.series_json)?;
        report.id_session = id_session;
        report.global_angles = Self::from_global_angles_json(&stored.global_angles_json)?;
        report.global_overloads = Self::from_global_overloads_json(&stored.global_overloads_json)?;
        report.log.clone_from(&stored.log);
        Ok(report)
    }
}
