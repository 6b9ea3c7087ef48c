//! Self-intersection augmentation.
//!
//! Where the stroke crosses itself a node must exist on both strands.
//! One new sample is created per crossing and inserted into both
//! segments, so the crossing shows up later as a revisited id.

use log::trace;

use crate::geom::{segment_crossing, sort_along_segment};
use crate::track::{Sample, SampleArena, SampleId, Track};

/// Insert a shared sample at every crossing of two non-adjacent segments.
pub fn add_crossings(arena: &mut SampleArena, track: &[SampleId]) -> Track {
    let n = track.len();
    if n < 4 {
        return track.to_vec();
    }
    let segments = n - 1;
    let mut pending: Vec<Vec<SampleId>> = vec![Vec::new(); segments];

    for i in 0..segments {
        let a1 = arena.position(track[i]);
        let a2 = arena.position(track[i + 1]);
        for j in i + 2..segments {
            let b1 = arena.position(track[j]);
            let b2 = arena.position(track[j + 1]);
            if let Some(p) = segment_crossing(a1, a2, b1, b2) {
                let id = arena.push(Sample::new(p.x, p.y));
                trace!("crossing {} between segments {} and {}", id, i, j);
                pending[i].push(id);
                pending[j].push(id);
            }
        }
    }

    splice_pending(arena, track, pending)
}

/// Rebuild a track with pending points inserted into each segment,
/// ordered along the segment's direction.
pub(crate) fn splice_pending(
    arena: &SampleArena,
    track: &[SampleId],
    mut pending: Vec<Vec<SampleId>>,
) -> Track {
    let extra: usize = pending.iter().map(Vec::len).sum();
    if extra == 0 {
        return track.to_vec();
    }
    let mut out = Vec::with_capacity(track.len() + extra);
    for (i, inserted) in pending.iter_mut().enumerate() {
        out.push(track[i]);
        if !inserted.is_empty() {
            let start = arena.position(track[i]);
            let end = arena.position(track[i + 1]);
            sort_along_segment(inserted, start, end, |&id| arena.position(id));
            out.extend(inserted.iter().copied());
        }
    }
    out.push(track[track.len() - 1]);
    out
}
