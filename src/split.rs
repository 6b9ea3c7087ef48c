//! Ring/chain decomposition of a refined track.
//!
//! A sample visited twice closes a ring between its two visits. Rings
//! are taken in discovery order; a candidate touching an accepted ring,
//! even at a single shared point, is ignored.

use std::collections::HashMap;

use log::trace;

use crate::track::{SampleId, TrackPart};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RingRange {
    start: usize,
    end: usize,
}

impl RingRange {
    fn overlaps(&self, other: &RingRange) -> bool {
        self.start <= other.end && self.end >= other.start
    }
}

/// Split a track into chain and ring parts, in track order.
pub fn split_by_rings(track: &[SampleId]) -> Vec<TrackPart> {
    let mut first_seen: HashMap<SampleId, usize> = HashMap::new();
    let mut rings: Vec<RingRange> = Vec::new();

    for (i, &id) in track.iter().enumerate() {
        match first_seen.get(&id) {
            None => {
                first_seen.insert(id, i);
            }
            Some(&start) => {
                let candidate = RingRange { start, end: i };
                if rings.iter().all(|r| !r.overlaps(&candidate)) {
                    trace!("ring {}..={} closed by {}", start, i, id);
                    rings.push(candidate);
                }
            }
        }
    }

    let mut parts = Vec::with_capacity(rings.len() * 2 + 1);
    if rings.is_empty() {
        push_part(&mut parts, track, false);
        return parts;
    }

    let mut last_end = 0;
    for ring in &rings {
        if ring.start > last_end {
            push_part(&mut parts, &track[last_end..=ring.start], false);
        }
        push_part(&mut parts, &track[ring.start..=ring.end], true);
        last_end = ring.end;
    }
    if last_end + 1 < track.len() {
        push_part(&mut parts, &track[last_end..], false);
    }
    parts
}

fn push_part(parts: &mut Vec<TrackPart>, ids: &[SampleId], is_ring: bool) {
    if ids.len() >= 2 {
        parts.push(TrackPart {
            ids: ids.to_vec(),
            is_ring,
        });
    }
}
