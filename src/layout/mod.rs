//! Layout optimization: snap refined parts onto preferred angles and
//! lengths while keeping fixed endpoints exactly in place.
//!
//! A point is *fixed* when it is anchored or was already laid out by an
//! earlier part. Which endpoints of a part are fixed decides the
//! strategy:
//!
//! - **Leading**: only the first point is fixed; every later point is
//!   placed from the previous one with snapped length and direction.
//! - **Circle**: the part closes on itself. Rings of 3 to 8 edges with no
//!   fixed interior point become regular polygons; larger ones get a
//!   Leading layout, then the gap at the closing point is spread evenly
//!   over the interior.
//! - **Both**: two different fixed ends; Leading layout, then a
//!   rotate/scale/rotate about the first point lands the last point on
//!   its target (or the gap is spread when that would scale too much).

pub mod snap;

use std::collections::HashMap;
use std::f64::consts::PI;

use kurbo::{Affine, Point, Vec2};
use log::debug;

use crate::config::OptimizationOptions;
use crate::geom::direction;
use crate::track::{SampleArena, SampleId, TrackPart};

use snap::{circle_include_angle, next_base_angles, snap_angle, snap_distance};

/// Largest scale the Both reconciliation may apply before falling back to
/// residual distribution.
const MAX_SIMILARITY_SCALE: f64 = 2.0;

/// Consecutive parts may disagree on their shared point by at most this.
const JUNCTION_EPSILON: f64 = 1e-9;

/// Which endpoints of a part are fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    /// Neither end fixed; laid out like Leading from the first point.
    None,
    Leading,
    Both,
    Circle,
}

/// Optimized positions for one part, parallel to its ids.
#[derive(Debug, Clone, PartialEq)]
pub struct LaidOutPart {
    pub ids: Vec<SampleId>,
    pub points: Vec<Point>,
    pub is_ring: bool,
    pub constraint: Constraint,
}

/// Lays out the parts of one track, remembering every position it has
/// produced so shared points are placed once.
#[derive(Debug)]
pub struct LayoutOptimizer<'a> {
    arena: &'a SampleArena,
    options: &'a OptimizationOptions,
    optimized: HashMap<SampleId, Point>,
}

impl<'a> LayoutOptimizer<'a> {
    pub fn new(arena: &'a SampleArena, options: &'a OptimizationOptions) -> Self {
        Self {
            arena,
            options,
            optimized: HashMap::new(),
        }
    }

    /// Final position of a point that must not move, if any.
    pub fn fixed_position(&self, id: SampleId) -> Option<Point> {
        if self.arena.anchor(id).is_some() {
            Some(self.arena.position(id))
        } else {
            self.optimized.get(&id).copied()
        }
    }

    fn is_fixed(&self, id: SampleId) -> bool {
        self.arena.anchor(id).is_some() || self.optimized.contains_key(&id)
    }

    /// Constraint of a part and whether it must be laid out reversed so
    /// that its fixed end comes first.
    pub fn classify(&self, ids: &[SampleId]) -> (Constraint, bool) {
        let first = ids[0];
        let last = ids[ids.len() - 1];
        match (self.is_fixed(first), self.is_fixed(last)) {
            (true, true) => {
                let same_anchor = matches!(
                    (self.arena.anchor(first), self.arena.anchor(last)),
                    (Some(a), Some(b)) if a == b
                );
                if first == last || same_anchor {
                    (Constraint::Circle, false)
                } else {
                    (Constraint::Both, false)
                }
            }
            (true, false) => (Constraint::Leading, false),
            (false, true) => (Constraint::Leading, true),
            (false, false) if first == last => (Constraint::Circle, false),
            (false, false) => (Constraint::None, false),
        }
    }

    /// Lay out a single part and remember its positions.
    pub fn optimize(&mut self, part: &TrackPart) -> LaidOutPart {
        let laid = self.lay_out(part);
        self.remember(&laid);
        laid
    }

    /// Lay out consecutive parts of one track.
    ///
    /// A part starts on the id the previous part ended on, which is fixed
    /// by then, so the parts join without any shifting. Returns the parts
    /// plus the joined polyline, without the duplicated junction points.
    pub fn optimize_parts(&mut self, parts: &[TrackPart]) -> (Vec<LaidOutPart>, Vec<Point>) {
        let mut laid_out = Vec::with_capacity(parts.len());
        let mut preview: Vec<Point> = Vec::new();
        for part in parts {
            let laid = self.lay_out(part);
            match preview.last() {
                Some(&junction) => {
                    debug_assert!(
                        junction.distance(laid.points[0]) <= JUNCTION_EPSILON,
                        "part starts at {:?}, previous part ended at {:?}",
                        laid.points[0],
                        junction
                    );
                    preview.extend_from_slice(&laid.points[1..]);
                }
                None => preview.extend_from_slice(&laid.points),
            }
            self.remember(&laid);
            laid_out.push(laid);
        }
        (laid_out, preview)
    }

    fn lay_out(&self, part: &TrackPart) -> LaidOutPart {
        let (constraint, reversed) = self.classify(&part.ids);
        let mut ids = part.ids.clone();
        if reversed {
            ids.reverse();
        }
        let mut points = match constraint {
            Constraint::Circle => self.circle(&ids),
            Constraint::Both => self.both(&ids),
            Constraint::Leading | Constraint::None => {
                self.leading(&ids, self.options.preferred_include_angle, false)
            }
        };
        if reversed {
            ids.reverse();
            points.reverse();
        }
        debug!(
            "layout: {} points, {:?}{}{}",
            ids.len(),
            constraint,
            if part.is_ring { ", ring" } else { "" },
            if reversed { ", reversed" } else { "" }
        );
        LaidOutPart {
            ids,
            points,
            is_ring: part.is_ring,
            constraint,
        }
    }

    fn remember(&mut self, laid: &LaidOutPart) {
        for (&id, &p) in laid.ids.iter().zip(&laid.points) {
            if self.arena.anchor(id).is_none() {
                self.optimized.entry(id).or_insert(p);
            }
        }
    }

    /// Place every point from the previous one with snapped length and
    /// direction. With `fresh_last`, the last point is always computed
    /// so callers can measure how far it lands from its target.
    fn leading(&self, ids: &[SampleId], include_angle: f64, fresh_last: bool) -> Vec<Point> {
        let n = ids.len();
        let start = self
            .fixed_position(ids[0])
            .unwrap_or_else(|| self.arena.position(ids[0]));
        let mut out = Vec::with_capacity(n);
        out.push(start);
        let mut placed: HashMap<SampleId, Point> = HashMap::new();
        placed.insert(ids[0], start);

        let mut base_angles = self.options.starting_angles();
        let mut last_angle: Option<f64> = None;

        for (i, &id) in ids.iter().enumerate().skip(1) {
            let prev = out[i - 1];
            if !(fresh_last && i == n - 1) {
                let known = self.fixed_position(id).or_else(|| placed.get(&id).copied());
                if let Some(p) = known {
                    if let Some(a) = direction(p - prev) {
                        last_angle = Some(a);
                        base_angles = next_base_angles(a, include_angle);
                    }
                    out.push(p);
                    continue;
                }
            }

            let raw = self.arena.position(id);
            let delta = raw - prev;
            let Some(raw_angle) = direction(delta) else {
                out.push(raw);
                continue;
            };
            let distance = snap_distance(delta.hypot(), self.options);
            let angle = snap_angle(
                raw_angle,
                &base_angles,
                self.options.angle_constraint,
                last_angle,
            );
            let p = prev + Vec2::from_angle(angle) * distance;
            out.push(p);
            placed.insert(id, p);
            last_angle = Some(angle);
            base_angles = next_base_angles(angle, include_angle);
        }
        out
    }

    fn circle(&self, ids: &[SampleId]) -> Vec<Point> {
        let edges = ids.len() - 1;
        if let Some(include) = circle_include_angle(edges) {
            if let Some(points) = self.regular_ring(ids, include) {
                return points;
            }
        }
        let include = circle_include_angle(edges).unwrap_or(self.options.preferred_include_angle);
        let laid = self.leading(ids, include, true);
        let last = ids[ids.len() - 1];
        let target = if last == ids[0] {
            laid[0]
        } else {
            self.target_of(last)
        };
        self.distribute_residual(ids, laid, target)
    }

    /// Leading layout of a small ring with every turn held on the base
    /// angle of the drawn winding and every edge at the snapped mean edge
    /// length: the first edge takes the snapped direction towards the
    /// second point. The polygon is regular, so the residual left for
    /// [`Self::distribute_residual`] is rounding noise and laying the
    /// result out again reproduces it.
    ///
    /// `None` when an interior point is fixed or the first edge has no
    /// direction.
    fn regular_ring(&self, ids: &[SampleId], include: f64) -> Option<Vec<Point>> {
        let n = ids.len();
        if ids[1..n - 1].iter().any(|&id| self.is_fixed(id)) {
            return None;
        }
        let start = self.target_of(ids[0]);
        let mut raw: Vec<Point> = ids.iter().map(|&id| self.arena.position(id)).collect();
        raw[0] = start;
        raw[n - 1] = start;

        let edges = (n - 1) as f64;
        let perimeter: f64 = raw.windows(2).map(|w| w[0].distance(w[1])).sum();
        let side = snap_distance(perimeter / edges, self.options);
        let first = direction(raw[1] - start)?;
        let mut angle = snap_angle(
            first,
            &self.options.starting_angles(),
            self.options.angle_constraint,
            None,
        );
        let area: f64 = raw
            .windows(2)
            .map(|w| w[0].to_vec2().cross(w[1].to_vec2()))
            .sum();
        let turn = if area < 0.0 { include - PI } else { PI - include };

        let mut out = Vec::with_capacity(n);
        out.push(start);
        let mut p = start;
        for _ in 1..n {
            p += Vec2::from_angle(angle) * side;
            out.push(p);
            angle += turn;
        }
        Some(self.distribute_residual(ids, out, self.target_of(ids[n - 1])))
    }

    fn both(&self, ids: &[SampleId]) -> Vec<Point> {
        let n = ids.len();
        let mut laid = self.leading(ids, self.options.preferred_include_angle, true);
        let start = laid[0];
        let target = self.target_of(ids[n - 1]);

        let want = target - start;
        let got = laid[n - 1] - start;
        let (Some(want_angle), Some(got_angle)) = (direction(want), direction(got)) else {
            return self.distribute_residual(ids, laid, target);
        };
        let scale = want.hypot() / got.hypot();
        if scale > MAX_SIMILARITY_SCALE {
            debug!("layout: scale {:.2} too large, spreading residual", scale);
            return self.distribute_residual(ids, laid, target);
        }

        let about = start.to_vec2();
        let transform = Affine::translate(about)
            * Affine::rotate(want_angle)
            * Affine::scale(scale)
            * Affine::rotate(-got_angle)
            * Affine::translate(-about);
        for i in 1..n - 1 {
            if self.fixed_position(ids[i]).is_none() {
                laid[i] = transform * laid[i];
            }
        }
        laid[n - 1] = target;
        laid
    }

    fn target_of(&self, id: SampleId) -> Point {
        self.fixed_position(id)
            .unwrap_or_else(|| self.arena.position(id))
    }

    /// Shift interior points by a linearly growing share of the gap
    /// between the laid-out last point and `target`.
    fn distribute_residual(&self, ids: &[SampleId], mut laid: Vec<Point>, target: Point) -> Vec<Point> {
        let n = laid.len();
        let step = (target - laid[n - 1]) / (n - 1) as f64;
        let mut shift = Vec2::ZERO;
        for i in 1..n - 1 {
            shift += step;
            if self.fixed_position(ids[i]).is_none() {
                laid[i] += shift;
            }
        }
        laid[n - 1] = target;
        laid
    }
}
