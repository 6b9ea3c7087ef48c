//! Shared geometry utilities.

use std::f64::consts::{PI, TAU};

use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::{Coord, Line};
use kurbo::{Point, Vec2};

/// Squared lengths below this are treated as zero.
const DEGENERATE_LEN_SQ: f64 = 1e-12;

/// Distance from P to the infinite line through A→B.
///
/// Falls back to the plain distance to A when A and B coincide.
pub fn point_to_line_dist(p: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let ap = p - a;
    let len_sq = ab.hypot2();
    if len_sq < DEGENERATE_LEN_SQ {
        return ap.hypot();
    }
    ab.cross(ap).abs() / len_sq.sqrt()
}

/// Foot of the perpendicular from P onto segment A→B.
///
/// `None` when the foot falls outside the segment or the segment is
/// degenerate.
pub fn perpendicular_foot(p: Point, a: Point, b: Point) -> Option<Point> {
    let ab = b - a;
    let len_sq = ab.hypot2();
    if len_sq < DEGENERATE_LEN_SQ {
        return None;
    }
    let t = (p - a).dot(ab) / len_sq;
    if !(0.0..=1.0).contains(&t) {
        return None;
    }
    Some(a + ab * t)
}

/// Proper crossing point of segments A1→A2 and B1→B2.
///
/// Touching at an endpoint, parallel and collinear segments give `None`.
pub fn segment_crossing(a1: Point, a2: Point, b1: Point, b2: Point) -> Option<Point> {
    let p = Line::new(to_coord(a1), to_coord(a2));
    let q = Line::new(to_coord(b1), to_coord(b2));
    match line_intersection(p, q)? {
        LineIntersection::SinglePoint {
            intersection,
            is_proper: true,
        } => Some(Point::new(intersection.x, intersection.y)),
        _ => None,
    }
}

/// Sort points that will be inserted into segment START→END so they
/// follow the segment's direction of travel.
///
/// Orders by the dominant axis of the segment delta only, which is
/// enough since every inserted point lies on the segment.
pub fn sort_along_segment<T>(items: &mut [T], start: Point, end: Point, pos: impl Fn(&T) -> Point) {
    let delta = end - start;
    let key = |p: Point| -> f64 {
        if delta.y.abs() > delta.x.abs() {
            (p.y - start.y) * delta.y.signum()
        } else {
            (p.x - start.x) * delta.x.signum()
        }
    };
    items.sort_by(|a, b| key(pos(a)).total_cmp(&key(pos(b))));
}

/// Normalize an angle into [0, 2π).
pub fn normalize_angle(angle: f64) -> f64 {
    let a = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if a >= TAU {
        0.0
    } else {
        a
    }
}

/// Signed smallest difference `a - b`, in (-π, π].
pub fn angle_diff(a: f64, b: f64) -> f64 {
    let d = normalize_angle(a - b);
    if d > PI {
        d - TAU
    } else {
        d
    }
}

/// Direction angle of a vector, `None` for a zero vector.
pub fn direction(v: Vec2) -> Option<f64> {
    if v.hypot2() < DEGENERATE_LEN_SQ {
        None
    } else {
        Some(v.atan2())
    }
}

fn to_coord(p: Point) -> Coord<f64> {
    Coord { x: p.x, y: p.y }
}
