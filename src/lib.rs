//! trackgraph: freehand pointer track → regularized node/edge graph.
//!
//! A sketched gesture is cleaned up (simplified, crossings and touches
//! turned into shared points, nearby points merged), cut into chains and
//! rings, and laid out on preferred bond angles and lengths. The result
//! is replayed into the host model through [`StructureEmitter`].
//!
//! # Example
//!
//! ```
//! use trackgraph::{process_gesture, Gesture, Sample, StructureGraph, TrackConfig};
//!
//! let gesture = Gesture::from_samples((0..5).map(|i| Sample::new(i as f64 * 40.0, 0.0)));
//! let refined = process_gesture(gesture, &TrackConfig::default())?;
//! let mut graph = StructureGraph::new();
//! refined.emit(&mut graph);
//! assert_eq!(graph.edges.len(), 1);
//! # Ok::<(), trackgraph::TrackError>(())
//! ```

#![forbid(unsafe_code)]

mod anchors;
mod config;
mod geom;
mod split;
mod track;

pub mod emit;
pub mod error;
pub mod layout;
pub mod refine;

// Re-export kurbo so hosts use the same Point type as the preview.
pub use kurbo;

pub use anchors::{split_at_anchors, ANCHOR_RUN_WINDOW};
pub use config::{OptimizationOptions, TrackConfig};
pub use emit::{GraphBuilder, StructureEmitter, StructureGraph, StructureNode};
pub use error::TrackError;
pub use layout::{Constraint, LaidOutPart, LayoutOptimizer};
pub use refine::refine_track;
pub use split::split_by_rings;
pub use track::{AnchorId, Gesture, Sample, SampleArena, SampleId, Track, TrackPart};

use std::time::Instant;

use kurbo::Point;
use log::info;

/// Laid-out parts of one anchor-to-anchor sub-track.
#[derive(Debug, Clone)]
pub struct LaidOutTrack {
    pub parts: Vec<LaidOutPart>,
    /// Joined polyline of all parts.
    pub preview: Vec<Point>,
}

/// A processed gesture, ready to be emitted.
#[derive(Debug, Clone)]
pub struct RefinedGesture {
    arena: SampleArena,
    pub tracks: Vec<LaidOutTrack>,
}

impl RefinedGesture {
    /// Samples after refinement (merged positions, crossing points).
    pub fn arena(&self) -> &SampleArena {
        &self.arena
    }

    /// One preview polyline per sub-track.
    pub fn preview(&self) -> Vec<Vec<Point>> {
        self.tracks.iter().map(|t| t.preview.clone()).collect()
    }

    /// Replay every part into `emitter`.
    ///
    /// Nodes are shared across sub-tracks, so a point visited by several
    /// parts is created once.
    pub fn emit<E: StructureEmitter>(&self, emitter: &mut E) {
        let mut builder = GraphBuilder::new(emitter);
        for track in &self.tracks {
            for part in &track.parts {
                builder.add_part(part, |id| self.arena.anchor(id));
            }
        }
        info!(
            "emitted {} nodes, {} edges",
            builder.node_count(),
            builder.edge_count()
        );
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.iter().all(|t| t.parts.is_empty())
    }
}

/// Full pipeline: raw gesture → laid-out parts.
///
/// Too-short or degenerate input is not an error; it yields an empty
/// result. Only invalid options and non-finite sample positions fail.
pub fn process_gesture(gesture: Gesture, config: &TrackConfig) -> Result<RefinedGesture, TrackError> {
    let t_start = Instant::now();
    config.validate()?;
    let Gesture { mut arena, track } = gesture;
    for (index, &id) in track.iter().enumerate() {
        let p = arena.position(id);
        if !p.x.is_finite() || !p.y.is_finite() {
            return Err(TrackError::InvalidSample {
                index,
                reason: format!("non-finite position ({}, {})", p.x, p.y),
            });
        }
    }

    let sub_tracks = split_at_anchors(&arena, &track);
    let mut refined: Vec<Track> = Vec::with_capacity(sub_tracks.len());
    for sub in &sub_tracks {
        let out = refine_track(&mut arena, sub, config);
        if out.len() >= 2 {
            refined.push(out);
        }
    }

    let tracks: Vec<LaidOutTrack> = {
        let mut layout = LayoutOptimizer::new(&arena, &config.optimization);
        refined
            .iter()
            .map(|t| {
                let (parts, preview) = layout.optimize_parts(&split_by_rings(t));
                LaidOutTrack { parts, preview }
            })
            .collect()
    };

    let n_parts: usize = tracks.iter().map(|t| t.parts.len()).sum();
    let n_rings: usize = tracks
        .iter()
        .flat_map(|t| &t.parts)
        .filter(|p| p.is_ring)
        .count();
    info!(
        "{} samples \u{2192} {} sub-tracks \u{2192} {} parts ({} rings)  ({}ms)",
        track.len(),
        tracks.len(),
        n_parts,
        n_rings,
        t_start.elapsed().as_millis()
    );

    Ok(RefinedGesture { arena, tracks })
}
