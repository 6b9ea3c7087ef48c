//! Length and direction quantization for laid-out segments.

use std::f64::consts::PI;

use crate::config::OptimizationOptions;
use crate::geom::{angle_diff, normalize_angle};

/// Raw directions closer than this to a base angle take the base angle
/// (30 deg). A direction exactly one 30 deg step away is left to the
/// quantization step.
const BASE_ANGLE_TOLERANCE: f64 = PI / 6.0;

/// A snapped direction this close to the previous one counts as
/// collinear and is nudged by one step (5 deg).
const COLLINEAR_TOLERANCE: f64 = 5.0 * PI / 180.0;

/// Lengths this close to a multiple count as on it.
const LENGTH_EPSILON: f64 = 1e-9;

/// Angle differences this small count as exact.
const ANGLE_EPSILON: f64 = 1e-9;

/// Ring sizes that get the regular-polygon interior angle.
const REGULAR_RING_EDGES: std::ops::RangeInclusive<usize> = 3..=8;

/// Snap a segment length onto the configured multiples of the bond length.
///
/// Above the largest multiple, lengths round to whole bond lengths.
/// Below it, the nearest configured multiple wins; on a tie, the one
/// closer to the primary multiple.
pub fn snap_distance(distance: f64, options: &OptimizationOptions) -> f64 {
    let unit = options.def_bond_screen_length;
    let constraints = &options.distance_constraints;
    let Some(&largest) = constraints.last() else {
        return distance;
    };
    if unit <= 0.0 {
        return distance;
    }

    if distance > largest * unit + LENGTH_EPSILON {
        return (distance / unit).round().max(1.0) * unit;
    }

    let primary = constraints
        .iter()
        .position(|&c| c == options.primary_distance_constraint)
        .unwrap_or(0);
    let mut best = primary;
    for (i, &c) in constraints.iter().enumerate() {
        let d = (distance - c * unit).abs();
        let best_d = (distance - constraints[best] * unit).abs();
        let closer_to_primary = i.abs_diff(primary) < best.abs_diff(primary);
        if d < best_d - LENGTH_EPSILON || (d <= best_d + LENGTH_EPSILON && closer_to_primary) {
            best = i;
        }
    }
    constraints[best] * unit
}

/// Snap a segment direction.
///
/// Close to a base angle → that angle. Otherwise, with a quantization
/// `step`, the nearest multiple of `step` from the closest base angle,
/// moved one step towards `raw` if it would run collinear with `prev`.
/// Without a step the raw angle is kept.
pub fn snap_angle(raw: f64, base_angles: &[f64], step: Option<f64>, prev: Option<f64>) -> f64 {
    let mut closest: Option<(f64, f64)> = None;
    for &base in base_angles {
        let d = angle_diff(raw, base).abs();
        if closest.map_or(true, |(_, best)| d < best) {
            closest = Some((base, d));
        }
    }
    if let Some((base, d)) = closest {
        if d < BASE_ANGLE_TOLERANCE - ANGLE_EPSILON {
            return base;
        }
    }

    let Some(step) = step else {
        return raw;
    };
    let base = closest.map_or(0.0, |(b, _)| b);
    let times = (angle_diff(raw, base) / step).round();
    let mut result = base + times * step;

    if let Some(prev) = prev {
        let diff = angle_diff(result, prev).abs();
        if diff <= COLLINEAR_TOLERANCE || PI - diff <= COLLINEAR_TOLERANCE {
            let plus = result + step;
            let minus = result - step;
            result = if angle_diff(raw, plus).abs() < angle_diff(raw, minus).abs() {
                plus
            } else {
                minus
            };
        }
    }
    result
}

/// Base angles for the segment after one laid out at `angle`: a turn of
/// `π − include` to either side.
pub fn next_base_angles(angle: f64, include: f64) -> Vec<f64> {
    let turn = PI - include;
    vec![normalize_angle(angle - turn), normalize_angle(angle + turn)]
}

/// Interior angle of a regular polygon with `edges` sides, for small rings.
pub fn circle_include_angle(edges: usize) -> Option<f64> {
    if REGULAR_RING_EDGES.contains(&edges) {
        Some((1.0 - 2.0 / edges as f64) * PI)
    } else {
        None
    }
}
