//! Splitting a raw gesture at anchored samples.
//!
//! While the pointer rests on an existing entity the host reports a run
//! of samples bound to it. Such a run stands for one point, and every
//! visit of the same anchor is the same sample.

use std::collections::HashMap;

use log::debug;

use crate::track::{AnchorId, SampleArena, SampleId, Track};

/// Samples of one anchor further than this from the run start begin a
/// new visit.
pub const ANCHOR_RUN_WINDOW: usize = 10;

/// Split `raw` into sub-tracks that run from anchor to anchor.
///
/// Each sub-track but the last ends on an anchored sample, and the next
/// one starts on it. Without anchors the whole track comes back as one
/// sub-track.
pub fn split_at_anchors(arena: &SampleArena, raw: &[SampleId]) -> Vec<Track> {
    let mut canonical: HashMap<AnchorId, SampleId> = HashMap::new();
    let mut tracks: Vec<Track> = Vec::new();
    let mut current: Track = Vec::new();
    // Anchor of the run in progress and the raw index it started at.
    let mut run: Option<(AnchorId, usize)> = None;

    for (i, &id) in raw.iter().enumerate() {
        let Some(anchor) = arena.anchor(id) else {
            run = None;
            current.push(id);
            continue;
        };
        if let Some((a, start)) = run {
            if a == anchor && i - start <= ANCHOR_RUN_WINDOW {
                continue;
            }
        }
        run = Some((anchor, i));

        let id = *canonical.entry(anchor).or_insert(id);
        current.push(id);
        if current.len() >= 2 {
            tracks.push(std::mem::replace(&mut current, vec![id]));
        }
    }
    if current.len() >= 2 || tracks.is_empty() {
        tracks.push(current);
    }

    debug!(
        "anchors: {} raw samples \u{2192} {} sub-tracks through {} anchors",
        raw.len(),
        tracks.len(),
        canonical.len()
    );
    tracks
}
