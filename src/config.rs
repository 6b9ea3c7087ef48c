use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::error::TrackError;

/// All refinement parameters in one struct.
/// Designed to be serializable (for saving presets) and
/// adjustable at runtime (for editor settings).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackConfig {
    // -- Refinement stage --
    /// RDP simplification threshold in screen pixels. 0 = no simplification.
    pub simplify_threshold: f64,
    /// Merge radius in screen pixels. Points (and point-to-line touches)
    /// closer than this are treated as one node. 0 = no merging.
    pub merge_threshold: f64,

    // -- Layout stage --
    /// Angle/length snapping parameters.
    pub optimization: OptimizationOptions,
}

/// Layout snapping parameters for one invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizationOptions {
    /// Quantization step for segment directions (radians).
    /// None = keep raw angles unless close to a base angle.
    pub angle_constraint: Option<f64>,
    /// Allowed segment lengths as multiples of `def_bond_screen_length`,
    /// ascending. Empty = keep raw lengths.
    pub distance_constraints: Vec<f64>,
    /// The multiple that short segments are pulled towards.
    pub primary_distance_constraint: f64,
    /// Preferred directions of the first segment (radians).
    pub preferred_starting_angles: Vec<f64>,
    /// Desired interior angle between consecutive segments (radians).
    /// 120 deg gives the familiar zig-zag chain.
    pub preferred_include_angle: f64,
    /// Screen length of one canonical edge at the current zoom level.
    pub def_bond_screen_length: f64,
    /// Mirror the preferred starting angles, flipping the side the
    /// zig-zag grows towards.
    pub reverse_direction: bool,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            simplify_threshold: 10.0,
            merge_threshold: 8.0,
            optimization: OptimizationOptions::default(),
        }
    }
}

impl Default for OptimizationOptions {
    fn default() -> Self {
        Self {
            angle_constraint: Some(PI / 6.0),
            distance_constraints: vec![0.5, 1.0, 1.5, 2.0],
            primary_distance_constraint: 1.0,
            preferred_starting_angles: vec![-PI / 6.0],
            preferred_include_angle: PI * 2.0 / 3.0,
            def_bond_screen_length: 30.0,
            reverse_direction: false,
        }
    }
}

impl TrackConfig {
    /// Check every numeric field once, up front.
    pub fn validate(&self) -> Result<(), TrackError> {
        non_negative("simplify_threshold", self.simplify_threshold)?;
        non_negative("merge_threshold", self.merge_threshold)?;
        self.optimization.validate()
    }
}

impl OptimizationOptions {
    pub fn validate(&self) -> Result<(), TrackError> {
        if let Some(step) = self.angle_constraint {
            if !step.is_finite() || step <= 0.0 {
                return Err(invalid(format!("angle_constraint must be positive, got {step}")));
            }
        }
        for &c in &self.distance_constraints {
            if !c.is_finite() || c <= 0.0 {
                return Err(invalid(format!(
                    "distance constraints must be positive, got {c}"
                )));
            }
        }
        if self.distance_constraints.windows(2).any(|w| w[0] > w[1]) {
            return Err(invalid("distance_constraints must be ascending".to_string()));
        }
        non_negative("def_bond_screen_length", self.def_bond_screen_length)?;
        for &a in &self.preferred_starting_angles {
            if !a.is_finite() {
                return Err(invalid("preferred_starting_angles must be finite".to_string()));
            }
        }
        if !self.preferred_include_angle.is_finite() {
            return Err(invalid("preferred_include_angle must be finite".to_string()));
        }
        if !self.primary_distance_constraint.is_finite() {
            return Err(invalid("primary_distance_constraint must be finite".to_string()));
        }
        Ok(())
    }

    /// Starting angles with `reverse_direction` applied.
    pub(crate) fn starting_angles(&self) -> Vec<f64> {
        if self.reverse_direction {
            self.preferred_starting_angles.iter().map(|a| -a).collect()
        } else {
            self.preferred_starting_angles.clone()
        }
    }
}

fn non_negative(name: &str, value: f64) -> Result<(), TrackError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(format!("{name} must be a non-negative number, got {value}")))
    }
}

fn invalid(msg: String) -> TrackError {
    TrackError::InvalidOptions(msg)
}
