// ABOUTME: Criterion benchmarks for pose parsing and state machine evaluation
// ABOUTME: Measures per-frame analysis cost and session report serialization
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Criterion benchmarks for the frame analysis path.
//!
//! A frame must be parsed and evaluated well inside the capture interval,
//! so these track the cost of one frame and of a full session report.

#![allow(
    clippy::missing_docs_in_private_items,
    clippy::unwrap_used,
    missing_docs
)]

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use formcoach::analysis::{AnglesByView, KeypointConfig, Pose, StateMachine};
use formcoach::models::{
    AngleConstraintSpec, ConditionSpec, ConditionType, ExerciseSpec, PoseView, StateSpec,
    TransitionSpec,
};
use serde_json::{json, Value};

const KNEE: &str = "23_25";

fn keypoint_config() -> KeypointConfig {
    KeypointConfig::from_json(&json!({
        "KEYPOINTS": {"11": "left_shoulder", "23": "left_hip", "25": "left_knee", "27": "left_ankle"},
        "CONNECTIONS": [[11, 23], [23, 25], [25, 27]]
    }))
    .unwrap()
}

fn squat(series: i64, repetitions: i64) -> ExerciseSpec {
    let knee = |min: Option<f64>, max: Option<f64>| AngleConstraintSpec {
        line: KNEE.to_owned(),
        view: PoseView::Front,
        min_angle: min,
        max_angle: max,
        fast_threshold: Some(120.0),
        ..AngleConstraintSpec::default()
    };
    let on_knee = |condition_type| ConditionSpec {
        condition_type,
        keypoint_line: KNEE.to_owned(),
        view: None,
    };
    ExerciseSpec {
        name: "Squat".to_owned(),
        series,
        repetitions,
        duration_ms: 60_000,
        rest_time_ms: 30_000,
        states: vec![
            StateSpec {
                id: 1,
                name: "Rest".to_owned(),
                constraints: vec![knee(Some(150.0), None)],
                ..StateSpec::default()
            },
            StateSpec {
                id: 2,
                name: "Down".to_owned(),
                constraints: vec![knee(None, Some(100.0))],
                ..StateSpec::default()
            },
        ],
        transitions: vec![
            TransitionSpec {
                from: 1,
                to: 2,
                conditions: vec![on_knee(ConditionType::MinOptAngle)],
            },
            TransitionSpec {
                from: 2,
                to: 1,
                conditions: vec![on_knee(ConditionType::MaxOptAngle)],
            },
        ],
        ..ExerciseSpec::default()
    }
}

/// Estimator payload with the knee bent to `knee_angle`
fn frame(timestamp: i64, knee_angle: f64) -> Value {
    let radians = knee_angle.to_radians();
    json!({
        "timestamp": timestamp,
        "keypoints": {
            "11": {"x": 300.0, "y": 100.0},
            "23": {"x": 300.0, "y": 300.0},
            "25": {"x": 300.0 + 100.0 * radians.sin(), "y": 300.0 - 100.0 * radians.cos()},
            "27": {"x": 300.0, "y": 500.0}
        }
    })
}

/// Angles of a smooth squat cycle sampled every 33 ms
#[allow(clippy::cast_precision_loss)]
fn cycle_angles(frames: usize) -> Vec<AnglesByView> {
    (0..frames)
        .map(|i| {
            let phase = (i % 60) as f64 / 60.0 * std::f64::consts::TAU;
            let knee = 125.0 + 45.0 * phase.cos();
            let mut by_view = AnglesByView::new();
            by_view.insert(PoseView::Front, [(KNEE.to_owned(), knee)].into_iter().collect());
            by_view
        })
        .collect()
}

fn bench_pose_parsing(c: &mut Criterion) {
    let connections = keypoint_config().connections;
    let payload = frame(1_000, 85.0);

    let mut group = c.benchmark_group("pose");
    group.throughput(Throughput::Elements(1));
    group.bench_function("from_json", |b| {
        b.iter(|| Pose::from_json(black_box(&payload), &connections));
    });
    let pose = Pose::from_json(&payload, &connections);
    group.bench_function("angles", |b| b.iter(|| black_box(&pose).angles()));
    group.finish();
}

fn bench_state_machine(c: &mut Criterion) {
    let spec = squat(1_000, 1_000);
    let frames = cycle_angles(600);

    let mut group = c.benchmark_group("state_machine");
    group.throughput(Throughput::Elements(frames.len() as u64));
    group.bench_function("run_600_frames", |b| {
        b.iter(|| {
            let mut machine = StateMachine::new(&spec).unwrap();
            let mut time = 0;
            for angles in &frames {
                black_box(machine.run(angles, time));
                time += 33;
            }
            machine
        });
    });
    group.finish();
}

fn bench_report_serialization(c: &mut Criterion) {
    let spec = squat(3, 10);
    let mut machine = StateMachine::new(&spec).unwrap();
    let mut time = 0;
    for angles in cycle_angles(1_800) {
        machine.run(&angles, time);
        time += 33;
    }
    let report = machine.take_report();
    let persisted = report.to_persisted().unwrap();

    let mut group = c.benchmark_group("session_report");
    group.bench_function("to_persisted", |b| b.iter(|| black_box(&report).to_persisted()));
    group.bench_function("from_persisted", |b| {
        b.iter(|| formcoach::analysis::SessionReport::from_persisted(1, black_box(&persisted)));
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_pose_parsing,
    bench_state_machine,
    bench_report_serialization
);
criterion_main!(benches);
