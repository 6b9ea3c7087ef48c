//! Proximity merging: nearby points and point-to-line touches.
//!
//! Anchored samples never move. They only pull other samples onto
//! themselves.

use std::collections::HashSet;

use kurbo::Point;
use log::{debug, trace};

use super::crossings::splice_pending;
use super::graph::{anchors_compatible, MergeGraph};
use crate::geom::perpendicular_foot;
use crate::track::{SampleArena, SampleId, Track};

/// Coalesce points within `threshold` of each other.
///
/// A single weighted pass (each point absorbs later unsettled points near
/// it), followed by a close-vertex pass that catches points brought
/// within range by earlier merges.
pub fn merge_nearby(arena: &mut SampleArena, track: &[SampleId], threshold: f64) -> Track {
    if threshold <= 0.0 {
        return track.to_vec();
    }
    let mut result = track.to_vec();
    let mut settled: HashSet<SampleId> = HashSet::new();
    let n = result.len();

    for i in 0..n {
        let base = result[i];
        if !settled.contains(&base) {
            for j in i + 1..n {
                let curr = result[j];
                if curr == base || settled.contains(&curr) {
                    continue;
                }
                if !anchors_compatible(arena.anchor(base), arena.anchor(curr)) {
                    continue;
                }
                if arena.position(base).distance(arena.position(curr)) <= threshold {
                    trace!("merge {} into {}", curr, base);
                    absorb(arena, base, curr);
                    // Every later visit of the absorbed sample is now `base`.
                    for slot in &mut result[j..] {
                        if *slot == curr {
                            *slot = base;
                        }
                    }
                }
            }
        }
        settled.insert(base);
    }

    let mut graph = MergeGraph::from_track(arena, &result);
    let extra = graph.merge_close_vertices(threshold);
    if extra > 0 {
        debug!(
            "close-vertex pass merged {} more ({} vertices, {} edges left)",
            extra,
            graph.vertex_count(),
            graph.edge_count()
        );
        result = graph.apply(arena, &result);
    }
    result
}

/// Fold sample `other` into `base`.
fn absorb(arena: &mut SampleArena, base: SampleId, other: SampleId) {
    let o = *arena.get(other);
    let b = arena.get_mut(base);
    let wb = b.weight as f64;
    let wo = o.weight as f64;
    if b.anchor.is_none() {
        if o.anchor.is_some() {
            b.position = o.position;
            b.anchor = o.anchor;
        } else {
            b.position = Point::new(
                (b.position.x * wb + o.position.x * wo) / (wb + wo),
                (b.position.y * wb + o.position.y * wo) / (wb + wo),
            );
        }
    }
    b.weight += o.weight;
}

/// Snap points lying within `threshold` of a non-adjacent segment onto
/// that segment, and insert them there.
///
/// Models a stroke that touches an existing line without crossing it.
pub fn add_vertex_to_line_merge_points(
    arena: &mut SampleArena,
    track: &[SampleId],
    threshold: f64,
) -> Track {
    let n = track.len();
    if threshold <= 0.0 || n < 3 {
        return track.to_vec();
    }
    let segments = n - 1;
    let mut pending: Vec<Vec<SampleId>> = vec![Vec::new(); segments];

    for i in 0..n {
        let id = track[i];
        for j in 0..segments {
            // Point i belongs to segments i-1 and i; skip those and i+1.
            if j + 1 >= i && j <= i + 1 {
                continue;
            }
            let (s, e) = (track[j], track[j + 1]);
            if s == id || e == id || pending[j].contains(&id) {
                continue;
            }
            let p = arena.position(id);
            let Some(foot) = perpendicular_foot(p, arena.position(s), arena.position(e)) else {
                continue;
            };
            if p.distance(foot) <= threshold {
                trace!("{} touches segment {}", id, j);
                let sample = arena.get_mut(id);
                if !sample.is_anchored() {
                    sample.position = foot;
                }
                pending[j].push(id);
            }
        }
    }

    splice_pending(arena, track, pending)
}

/// Collapse consecutive visits of the same sample.
pub fn remove_repetitive_points(track: &[SampleId]) -> Track {
    let mut out = track.to_vec();
    out.dedup();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::{AnchorId, Sample};
    use approx::assert_relative_eq;

    fn build(points: &[(f64, f64)]) -> (SampleArena, Track) {
        let mut arena = SampleArena::new();
        let track = points.iter().map(|&(x, y)| arena.push(Sample::new(x, y))).collect();
        (arena, track)
    }

    #[test]
    fn near_points_average_by_weight() {
        let (mut arena, track) = build(&[(0.0, 0.0), (4.0, 0.0), (100.0, 0.0)]);
        let out = merge_nearby(&mut arena, &track, 5.0);
        assert_eq!(out, vec![track[0], track[0], track[2]]);
        assert_relative_eq!(arena.position(track[0]).x, 2.0);
        assert_eq!(arena.get(track[0]).weight, 2);
    }

    #[test]
    fn anchor_pulls_free_point() {
        let mut arena = SampleArena::new();
        let free = arena.push(Sample::new(0.0, 0.0));
        let mid = arena.push(Sample::new(50.0, 0.0));
        let anchored = arena.push(Sample::anchored(Point::new(3.0, 1.0), AnchorId(4)));
        let out = merge_nearby(&mut arena, &[free, mid, anchored], 5.0);
        assert_eq!(out, vec![free, mid, free]);
        assert_eq!(arena.position(free), Point::new(3.0, 1.0));
        assert_eq!(arena.anchor(free), Some(AnchorId(4)));
    }

    #[test]
    fn anchored_base_never_moves() {
        let mut arena = SampleArena::new();
        let anchored = arena.push(Sample::anchored(Point::new(10.0, 10.0), AnchorId(1)));
        let far = arena.push(Sample::new(60.0, 10.0));
        let near = arena.push(Sample::new(13.0, 10.0));
        let out = merge_nearby(&mut arena, &[anchored, far, near], 5.0);
        assert_eq!(out, vec![anchored, far, anchored]);
        assert_eq!(arena.position(anchored), Point::new(10.0, 10.0));
    }

    #[test]
    fn closing_a_loop_merges_the_ends() {
        let (mut arena, track) = build(&[(0.0, 0.0), (40.0, 0.0), (40.0, 40.0), (2.0, 1.0)]);
        let out = merge_nearby(&mut arena, &track, 5.0);
        assert_eq!(out.first(), out.last());
    }

    #[test]
    fn no_free_pair_left_within_threshold() {
        // The first point drifts towards the third only after it has
        // been scanned past; the single pass alone leaves them split.
        let (mut arena, track) = build(&[
            (0.0, 0.0),
            (4.8, 0.0),
            (-2.8, 0.0),
            (0.5, 0.0),
            (100.0, 0.0),
        ]);
        let out = merge_nearby(&mut arena, &track, 5.0);
        assert_eq!(out[2], out[0]);
        let distinct: Vec<SampleId> = {
            let mut seen = Vec::new();
            for id in &out {
                if !seen.contains(id) {
                    seen.push(*id);
                }
            }
            seen
        };
        for (k, &a) in distinct.iter().enumerate() {
            for &b in &distinct[k + 1..] {
                assert!(arena.position(a).distance(arena.position(b)) > 5.0);
            }
        }
    }

    #[test]
    fn touch_inserts_point_into_line() {
        // Stroke right, go up, come back down ending 2px above the first line.
        let (mut arena, track) = build(&[(0.0, 0.0), (100.0, 0.0), (100.0, 50.0), (50.0, 2.0)]);
        let out = add_vertex_to_line_merge_points(&mut arena, &track, 5.0);
        assert_eq!(out, vec![track[0], track[3], track[1], track[2], track[3]]);
        assert_relative_eq!(arena.position(track[3]).y, 0.0);
        assert_relative_eq!(arena.position(track[3]).x, 50.0);
    }

    #[test]
    fn touch_does_not_move_anchor() {
        let mut arena = SampleArena::new();
        let a = arena.push(Sample::new(0.0, 0.0));
        let b = arena.push(Sample::new(100.0, 0.0));
        let c = arena.push(Sample::new(100.0, 50.0));
        let d = arena.push(Sample::anchored(Point::new(50.0, 2.0), AnchorId(3)));
        let out = add_vertex_to_line_merge_points(&mut arena, &[a, b, c, d], 5.0);
        assert_eq!(out, vec![a, d, b, c, d]);
        assert_eq!(arena.position(d), Point::new(50.0, 2.0));
    }

    #[test]
    fn repeats_are_collapsed() {
        let (_, track) = build(&[(0.0, 0.0), (1.0, 0.0)]);
        let out = remove_repetitive_points(&[track[0], track[0], track[1], track[1], track[0]]);
        assert_eq!(out, vec![track[0], track[1], track[0]]);
    }
}
