//! RDP polyline simplification over sample ids.

use crate::geom::point_to_line_dist;
use crate::track::{SampleArena, SampleId, Track};

/// Reduce a dense track to the samples needed to stay within `threshold`
/// of the original.
///
/// Returns a copy when `threshold <= 0` or there are at most two samples.
pub fn simplify(arena: &SampleArena, track: &[SampleId], threshold: f64) -> Track {
    if threshold <= 0.0 || track.len() <= 2 {
        return track.to_vec();
    }
    let mut keep = vec![track[0]];
    split(arena, track, 0, track.len() - 1, threshold, &mut keep);
    keep
}

/// Append everything after `start` up to and including `end`.
fn split(
    arena: &SampleArena,
    track: &[SampleId],
    start: usize,
    end: usize,
    threshold: f64,
    out: &mut Track,
) {
    let a = arena.position(track[start]);
    let b = arena.position(track[end]);

    // Strict `>` keeps the lowest index on ties.
    let mut max_d = threshold;
    let mut max_i = None;
    for i in start + 1..end {
        let d = point_to_line_dist(arena.position(track[i]), a, b);
        if d > max_d {
            max_d = d;
            max_i = Some(i);
        }
    }

    match max_i {
        Some(i) => {
            split(arena, track, start, i, threshold, out);
            split(arena, track, i, end, threshold, out);
        }
        None => out.push(track[end]),
    }
}
