//! Track refinement: raw samples → clean polyline with shared nodes.
//!
//! Five steps: RDP simplify → crossings → point-to-line touches →
//! proximity merge → repeat collapse.

mod crossings;
mod graph;
mod merge;
mod simplify;

pub use crossings::add_crossings;
pub use merge::{add_vertex_to_line_merge_points, merge_nearby, remove_repetitive_points};
pub use simplify::simplify;

use log::debug;

use crate::config::TrackConfig;
use crate::track::{SampleArena, SampleId, Track};

/// Run every refinement step on one track.
pub fn refine_track(arena: &mut SampleArena, track: &[SampleId], config: &TrackConfig) -> Track {
    let raw = track.len();
    let result = simplify(arena, track, config.simplify_threshold);
    let simplified = result.len();
    let result = add_crossings(arena, &result);
    let crossed = result.len();
    let result = add_vertex_to_line_merge_points(arena, &result, config.merge_threshold);
    let result = merge_nearby(arena, &result, config.merge_threshold);
    let result = remove_repetitive_points(&result);
    debug!(
        "refine: {} raw \u{2192} {} simplified \u{2192} {} with crossings \u{2192} {} merged",
        raw,
        simplified,
        crossed,
        result.len()
    );
    result
}
