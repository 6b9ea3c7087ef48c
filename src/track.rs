//! Samples, the per-gesture sample arena, and track parts.
//!
//! Every stage refers to samples by [`SampleId`]. Two track entries are
//! "the same point" exactly when their ids are equal; this is how a
//! revisited point (and hence a ring) is recognized.

use std::fmt;

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Opaque handle to an existing entity in the host's model.
///
/// The host sets it on a sample when its hit-test lands on that entity.
/// It is never dereferenced here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnchorId(pub u64);

/// Stable per-gesture id of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SampleId(u32);

impl SampleId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SampleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One pointer sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Screen position. For anchored samples this is the anchor's own
    /// position, and it never moves.
    pub position: Point,
    pub anchor: Option<AnchorId>,
    /// Number of raw samples merged into this one.
    pub weight: u32,
}

impl Sample {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            position: Point::new(x, y),
            anchor: None,
            weight: 1,
        }
    }

    /// A sample bound to an existing entity located at `position`.
    pub fn anchored(position: Point, anchor: AnchorId) -> Self {
        Self {
            position,
            anchor: Some(anchor),
            weight: 1,
        }
    }

    pub fn is_anchored(&self) -> bool {
        self.anchor.is_some()
    }
}

/// Owns every sample of one gesture.
#[derive(Debug, Clone, Default)]
pub struct SampleArena {
    samples: Vec<Sample>,
}

impl SampleArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sample: Sample) -> SampleId {
        let id = SampleId(self.samples.len() as u32);
        self.samples.push(sample);
        id
    }

    pub fn get(&self, id: SampleId) -> &Sample {
        &self.samples[id.index()]
    }

    pub fn get_mut(&mut self, id: SampleId) -> &mut Sample {
        &mut self.samples[id.index()]
    }

    pub fn position(&self, id: SampleId) -> Point {
        self.samples[id.index()].position
    }

    pub fn anchor(&self, id: SampleId) -> Option<AnchorId> {
        self.samples[id.index()].anchor
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Positions of a track, in order.
    pub fn positions(&self, track: &[SampleId]) -> Vec<Point> {
        track.iter().map(|&id| self.position(id)).collect()
    }
}

/// An ordered sequence of sample ids; order is pointer travel.
pub type Track = Vec<SampleId>;

/// A contiguous chain or ring cut out of a refined track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackPart {
    pub ids: Vec<SampleId>,
    pub is_ring: bool,
}

impl TrackPart {
    pub fn first(&self) -> SampleId {
        self.ids[0]
    }

    pub fn last(&self) -> SampleId {
        self.ids[self.ids.len() - 1]
    }

    pub fn edge_count(&self) -> usize {
        self.ids.len().saturating_sub(1)
    }
}

/// A raw gesture: the sample arena plus the temporal sample order.
#[derive(Debug, Clone, Default)]
pub struct Gesture {
    pub(crate) arena: SampleArena,
    pub(crate) track: Track,
}

impl Gesture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new sample.
    pub fn push(&mut self, sample: Sample) -> SampleId {
        let id = self.arena.push(sample);
        self.track.push(id);
        id
    }

    /// Append another visit of an already recorded sample.
    pub fn revisit(&mut self, id: SampleId) {
        debug_assert!(id.index() < self.arena.len());
        self.track.push(id);
    }

    pub fn from_samples(samples: impl IntoIterator<Item = Sample>) -> Self {
        let mut gesture = Self::new();
        for s in samples {
            gesture.push(s);
        }
        gesture
    }

    pub fn len(&self) -> usize {
        self.track.len()
    }

    pub fn is_empty(&self) -> bool {
        self.track.is_empty()
    }

    pub fn arena(&self) -> &SampleArena {
        &self.arena
    }

    pub fn track(&self) -> &[SampleId] {
        &self.track
    }
}
