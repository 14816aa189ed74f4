// ABOUTME: Angle constraint on one keypoint line with validated ranges and thresholds
// ABOUTME: Converts to and from the persisted AngleConstraintSpec shape
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use formcoach_core::errors::AnalysisError;
use formcoach_core::models::{AngleConstraintSpec, Direction, PoseView};
use serde::{Deserialize, Serialize};

/// Optimal, safe and speed limits for one line in one state
///
/// Every limit is optional; an unset limit is never checked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AngleConstraint {
    id: i64,
    id_state: i64,
    id_ex: i64,
    line: String,
    view: PoseView,
    min_angle: Option<f64>,
    max_angle: Option<f64>,
    min_safe_angle: Option<f64>,
    max_safe_angle: Option<f64>,
    fast_threshold: Option<f64>,
    slow_threshold: Option<f64>,
    symmetrical_angle: Option<f64>,
    evolution: Direction,
    tolerance: Option<f64>,
}

fn non_negative(field: &str, value: Option<f64>) -> Result<(), AnalysisError> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(AnalysisError::invalid_constraint(
            field,
            format!("must be a finite angle >= 0, got {v}"),
        )),
        _ => Ok(()),
    }
}

impl AngleConstraint {
    /// Unconstrained line in the given view
    #[must_use]
    pub fn new(line: impl Into<String>, view: PoseView) -> Self {
        Self {
            line: line.into(),
            view,
            ..Self::default()
        }
    }

    /// Attach persistence ids
    #[must_use]
    pub const fn with_ids(mut self, id: i64, id_state: i64, id_ex: i64) -> Self {
        self.id = id;
        self.id_state = id_state;
        self.id_ex = id_ex;
        self
    }

    /// Set the optimal range
    ///
    /// # Errors
    ///
    /// Returns `InvalidConstraint` if `min < 0` or `max < min`
    pub fn with_optimal_range(
        mut self,
        min: Option<f64>,
        max: Option<f64>,
    ) -> Result<Self, AnalysisError> {
        self.set_min_angle(min)?;
        self.set_max_angle(max)?;
        Ok(self)
    }

    /// Set the safe range
    ///
    /// # Errors
    ///
    /// Returns `InvalidConstraint` if a limit is not finite or negative, or if `max < min`
    pub fn with_safe_range(
        mut self,
        min: Option<f64>,
        max: Option<f64>,
    ) -> Result<Self, AnalysisError> {
        non_negative("min_safe_angle", min)?;
        non_negative("max_safe_angle", max)?;
        if let (Some(lo), Some(hi)) = (min, max) {
            if hi < lo {
                return Err(AnalysisError::invalid_constraint(
                    "max_safe_angle",
                    format!("{hi} is below min_safe_angle {lo}"),
                ));
            }
        }
        self.min_safe_angle = min;
        self.max_safe_angle = max;
        Ok(self)
    }

    /// Set the speed thresholds
    ///
    /// # Errors
    ///
    /// Returns `InvalidConstraint` if a threshold is negative
    pub fn with_speed_thresholds(
        mut self,
        fast: Option<f64>,
        slow: Option<f64>,
    ) -> Result<Self, AnalysisError> {
        self.set_fast_threshold(fast)?;
        self.set_slow_threshold(slow)?;
        Ok(self)
    }

    /// Set the expected evolution and its reference angle for symmetry checks
    #[must_use]
    pub const fn with_evolution(mut self, evolution: Direction, symmetrical: Option<f64>) -> Self {
        self.evolution = evolution;
        self.symmetrical_angle = symmetrical;
        self
    }

    /// Set the tolerance
    ///
    /// # Errors
    ///
    /// Returns `InvalidConstraint` if the tolerance is negative
    pub fn with_tolerance(mut self, tolerance: Option<f64>) -> Result<Self, AnalysisError> {
        self.set_tolerance(tolerance)?;
        Ok(self)
    }

    /// # Errors
    ///
    /// Returns `InvalidConstraint` if negative or above the current maximum
    pub fn set_min_angle(&mut self, min: Option<f64>) -> Result<(), AnalysisError> {
        non_negative("min_angle", min)?;
        if let (Some(lo), Some(hi)) = (min, self.max_angle) {
            if hi < lo {
                return Err(AnalysisError::invalid_constraint(
                    "min_angle",
                    format!("{lo} is above max_angle {hi}"),
                ));
            }
        }
        self.min_angle = min;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `InvalidConstraint` if not finite, negative or below the current minimum
    pub fn set_max_angle(&mut self, max: Option<f64>) -> Result<(), AnalysisError> {
        non_negative("max_angle", max)?;
        if let (Some(lo), Some(hi)) = (self.min_angle, max) {
            if hi < lo {
                return Err(AnalysisError::invalid_constraint(
                    "max_angle",
                    format!("{hi} is below min_angle {lo}"),
                ));
            }
        }
        self.max_angle = max;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `InvalidConstraint` if negative
    pub fn set_fast_threshold(&mut self, fast: Option<f64>) -> Result<(), AnalysisError> {
        non_negative("fast_threshold", fast)?;
        self.fast_threshold = fast;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `InvalidConstraint` if negative
    pub fn set_slow_threshold(&mut self, slow: Option<f64>) -> Result<(), AnalysisError> {
        non_negative("slow_threshold", slow)?;
        self.slow_threshold = slow;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `InvalidConstraint` if negative
    pub fn set_tolerance(&mut self, tolerance: Option<f64>) -> Result<(), AnalysisError> {
        non_negative("tolerance", tolerance)?;
        self.tolerance = tolerance;
        Ok(())
    }

    /// Constraint id
    #[must_use]
    pub const fn id(&self) -> i64 {
        self.id
    }

    /// Owning state id
    #[must_use]
    pub const fn id_state(&self) -> i64 {
        self.id_state
    }

    /// Owning exercise id
    #[must_use]
    pub const fn id_ex(&self) -> i64 {
        self.id_ex
    }

    /// Line key
    #[must_use]
    pub fn line(&self) -> &str {
        &self.line
    }

    /// View the line is measured in
    #[must_use]
    pub const fn view(&self) -> PoseView {
        self.view
    }

    /// Optimal minimum
    #[must_use]
    pub const fn min_angle(&self) -> Option<f64> {
        self.min_angle
    }

    /// Optimal maximum
    #[must_use]
    pub const fn max_angle(&self) -> Option<f64> {
        self.max_angle
    }

    /// Safe minimum
    #[must_use]
    pub const fn min_safe_angle(&self) -> Option<f64> {
        self.min_safe_angle
    }

    /// Safe maximum
    #[must_use]
    pub const fn max_safe_angle(&self) -> Option<f64> {
        self.max_safe_angle
    }

    /// Fast threshold
    #[must_use]
    pub const fn fast_threshold(&self) -> Option<f64> {
        self.fast_threshold
    }

    /// Slow threshold
    #[must_use]
    pub const fn slow_threshold(&self) -> Option<f64> {
        self.slow_threshold
    }

    /// Symmetry reference
    #[must_use]
    pub const fn symmetrical_angle(&self) -> Option<f64> {
        self.symmetrical_angle
    }

    /// Expected evolution
    #[must_use]
    pub const fn evolution(&self) -> Direction {
        self.evolution
    }

    /// Tolerance, 0 when unset
    #[must_use]
    pub fn tolerance(&self) -> f64 {
        self.tolerance.unwrap_or(0.0)
    }

    /// Build from the persisted form, re-validating every field
    ///
    /// # Errors
    ///
    /// Returns `InvalidConstraint` if the stored values violate the constraint rules
    pub fn from_spec(spec: &AngleConstraintSpec, id_state: i64, id_ex: i64) -> Result<Self, AnalysisError> {
        Self::new(spec.line.clone(), spec.view)
            .with_ids(spec.id, id_state, id_ex)
            .with_optimal_range(spec.min_angle, spec.max_angle)?
            .with_safe_range(spec.min_safe_angle, spec.max_safe_angle)?
            .with_speed_thresholds(spec.fast_threshold, spec.slow_threshold)?
            .with_evolution(spec.evolution, spec.symmetrical_angle)
            .with_tolerance(spec.tolerance)
    }

    /// Persisted form
    #[must_use]
    pub fn to_spec(&self) -> AngleConstraintSpec {
        AngleConstraintSpec {
            id: self.id,
            line: self.line.clone(),
            view: self.view,
            min_angle: self.min_angle,
            max_angle: self.max_angle,
            min_safe_angle: self.min_safe_angle,
            max_safe_angle: self.max_safe_angle,
            fast_threshold: self.fast_threshold,
            slow_threshold: self.slow_threshold,
            symmetrical_angle: self.symmetrical_angle,
            evolution: self.evolution,
            tolerance: self.tolerance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_negative_minimum() {
        let result = AngleConstraint::new("11_13", PoseView::Front)
            .with_optimal_range(Some(-5.0), Some(90.0));
        assert!(matches!(
            result,
            Err(AnalysisError::InvalidConstraint { ref field, .. }) if field == "min_angle"
        ));
    }

    #[test]
    fn test_rejects_inverted_range() {
        let mut constraint = AngleConstraint::new("11_13", PoseView::Front)
            .with_optimal_range(Some(40.0), Some(90.0))
            .unwrap();
        assert!(constraint.set_max_angle(Some(30.0)).is_err());
        assert!(constraint.set_min_angle(Some(100.0)).is_err());
        assert_eq!(constraint.max_angle(), Some(90.0));
    }

    #[test]
    fn test_rejects_non_finite_and_negative_maximum() {
        let mut constraint = AngleConstraint::new("23_25", PoseView::Front);
        for bad in [f64::NAN, f64::INFINITY, -10.0] {
            assert!(matches!(
                constraint.set_max_angle(Some(bad)),
                Err(AnalysisError::InvalidConstraint { ref field, .. }) if field == "max_angle"
            ));
        }
        assert_eq!(constraint.max_angle(), None);
        assert!(constraint.set_max_angle(Some(175.0)).is_ok());
        assert!(AngleConstraint::new("23_25", PoseView::Front)
            .with_safe_range(Some(10.0), Some(f64::NAN))
            .is_err());
    }

    #[test]
    fn test_rejects_negative_thresholds_and_tolerance() {
        let constraint = AngleConstraint::new("11_13", PoseView::Left);
        assert!(constraint
            .clone()
            .with_speed_thresholds(Some(-1.0), None)
            .is_err());
        assert!(constraint.with_tolerance(Some(-0.5)).is_err());
    }

    #[test]
    fn test_spec_conversion_keeps_limits() {
        let constraint = AngleConstraint::new("23_25", PoseView::Left)
            .with_ids(4, 2, 9)
            .with_optimal_range(Some(60.0), Some(170.0))
            .unwrap()
            .with_evolution(Direction::Decrease, None)
            .with_tolerance(Some(3.0))
            .unwrap();
        let restored = AngleConstraint::from_spec(&constraint.to_spec(), 2, 9).unwrap();
        assert_eq!(restored, constraint);
        assert!((restored.tolerance() - 3.0).abs() < f64::EPSILON);
    }
}
