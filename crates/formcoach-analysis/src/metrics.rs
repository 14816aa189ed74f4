// ABOUTME: Read-only statistics over a session report for charts and summaries
// ABOUTME: Condition counts by serie, repetition, view and line, heatmaps and phase segments
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::BTreeMap;

use formcoach_core::models::{ConditionType, PoseView};
use serde::{Deserialize, Serialize};

use crate::condition::Condition;
use crate::report::{RepetitionConditions, SessionReport};

/// Counts per condition type
pub type ConditionCounts = BTreeMap<ConditionType, u64>;

/// One row of a serie's condition distribution table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionRow {
    /// Serie number
    pub serie: i64,
    /// Repetition number
    pub rep: i64,
    /// Condition type
    pub condition: ConditionType,
    /// Occurrences
    pub count: u64,
}

/// Statistics over one session report
#[derive(Debug, Clone, Copy)]
pub struct MetricsAnalyzer<'a> {
    report: &'a SessionReport,
}

impl<'a> MetricsAnalyzer<'a> {
    /// Analyze `report`
    #[must_use]
    pub const fn new(report: &'a SessionReport) -> Self {
        Self { report }
    }

    fn serie(&self, serie: i64) -> Option<&'a RepetitionConditions> {
        self.report.series().get(&serie)
    }

    fn all(&self) -> impl Iterator<Item = &'a (Condition, u64)> {
        self.report
            .series()
            .values()
            .flat_map(BTreeMap::values)
            .flat_map(BTreeMap::values)
            .flatten()
    }

    /// Occurrences per type in the whole session
    #[must_use]
    pub fn global_condition_counts(&self) -> ConditionCounts {
        let mut counts = ConditionCounts::new();
        for (condition, count) in self.all() {
            *counts.entry(condition.condition_type).or_insert(0) += count;
        }
        counts
    }

    /// Occurrences per type for each view; line-independent conditions fall under `None`
    #[must_use]
    pub fn condition_counts_by_view(&self) -> BTreeMap<Option<PoseView>, ConditionCounts> {
        let mut counts: BTreeMap<Option<PoseView>, ConditionCounts> = BTreeMap::new();
        for (condition, count) in self.all() {
            *counts
                .entry(condition.view)
                .or_default()
                .entry(condition.condition_type)
                .or_insert(0) += count;
        }
        counts
    }

    /// Occurrences per type for each serie
    #[must_use]
    pub fn condition_counts_by_serie(&self) -> BTreeMap<i64, ConditionCounts> {
        self.report
            .series()
            .iter()
            .map(|(&serie, reps)| {
                let mut counts = ConditionCounts::new();
                for (condition, count) in reps.values().flat_map(BTreeMap::values).flatten() {
                    *counts.entry(condition.condition_type).or_insert(0) += count;
                }
                (serie, counts)
            })
            .collect()
    }

    /// Occurrences per type for each repetition of a serie
    #[must_use]
    pub fn condition_counts_by_repetition(&self, serie: i64) -> BTreeMap<i64, ConditionCounts> {
        let Some(reps) = self.serie(serie) else {
            return BTreeMap::new();
        };
        reps.iter()
            .map(|(&rep, states)| {
                let mut counts = ConditionCounts::new();
                for (condition, count) in states.values().flatten() {
                    *counts.entry(condition.condition_type).or_insert(0) += count;
                }
                (rep, counts)
            })
            .collect()
    }

    /// `line -> type -> count` for one repetition
    #[must_use]
    pub fn counts_per_keypoint_line(
        &self,
        serie: i64,
        rep: i64,
    ) -> BTreeMap<String, ConditionCounts> {
        self.report.repetition_data(serie, rep)
    }

    /// Series present in the report, ascending
    #[must_use]
    pub fn available_series(&self) -> Vec<i64> {
        self.report.stored_series()
    }

    /// `type -> "RepNN_SNN" -> count` for one serie, where `S` is the state id
    #[must_use]
    pub fn heatmap_data(&self, serie: i64) -> BTreeMap<ConditionType, BTreeMap<String, u64>> {
        let mut heatmap: BTreeMap<ConditionType, BTreeMap<String, u64>> = BTreeMap::new();
        let Some(reps) = self.serie(serie) else {
            return heatmap;
        };
        for (rep, states) in reps {
            for (state, entries) in states {
                let key = format!("Rep{rep:02}_S{state:02}");
                for (condition, count) in entries {
                    *heatmap
                        .entry(condition.condition_type)
                        .or_default()
                        .entry(key.clone())
                        .or_insert(0) += count;
                }
            }
        }
        heatmap
    }

    /// Timed segments of each repetition: movement phases, set overtime and rest overtime
    #[must_use]
    pub fn segments(&self, serie: i64) -> BTreeMap<i64, Vec<(String, i64)>> {
        let Some(reps) = self.serie(serie) else {
            return BTreeMap::new();
        };
        reps.iter()
            .map(|(&rep, states)| {
                let segments: Vec<(String, i64)> = states
                    .values()
                    .flatten()
                    .filter_map(|(condition, _)| {
                        let label = match condition.condition_type {
                            ConditionType::EndOfMovementPhase => {
                                format!("State {}", condition.keypoint_line)
                            }
                            ConditionType::SetTime => "SetTimeOver".to_owned(),
                            ConditionType::RestOverTime => "RestOverTime".to_owned(),
                            _ => return None,
                        };
                        Some((label, condition.value.unwrap_or(0)))
                    })
                    .collect();
                (rep, segments)
            })
            .collect()
    }

    /// Flat `{serie, rep, condition, count}` rows for one serie
    #[must_use]
    pub fn serie_condition_distribution(&self, serie: i64) -> Vec<DistributionRow> {
        self.condition_counts_by_repetition(serie)
            .into_iter()
            .flat_map(|(rep, counts)| {
                counts.into_iter().map(move |(condition, count)| DistributionRow {
                    serie,
                    rep,
                    condition,
                    count,
                })
            })
            .collect()
    }

    /// Sum of repetition durations in a serie
    #[must_use]
    pub fn working_time_ms(&self, serie: i64) -> i64 {
        self.serie(serie).map_or(0, |reps| {
            reps.values()
                .flat_map(BTreeMap::values)
                .flatten()
                .filter(|(condition, _)| condition.condition_type == ConditionType::EndOfRepetition)
                .filter_map(|(condition, _)| condition.value)
                .sum()
        })
    }
}
