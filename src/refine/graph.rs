//! Transient vertex/edge graph for the close-vertex pass.
//!
//! Vertices live in an arena indexed by `usize`; edges are index pairs.
//! Merging a vertex rewrites edge indices and leaves a redirect behind,
//! so nothing holds a reference to a vertex.

use std::collections::HashMap;

use kurbo::Point;

use crate::track::{AnchorId, SampleArena, SampleId, Track};

#[derive(Debug, Clone)]
struct Vertex {
    sample: SampleId,
    position: Point,
    weight: u32,
    anchor: Option<AnchorId>,
    /// Vertex this one was merged into.
    merged_into: Option<usize>,
}

/// Graph of the distinct samples of a track, joined by its segments.
#[derive(Debug, Clone, Default)]
pub(crate) struct MergeGraph {
    vertices: Vec<Vertex>,
    edges: Vec<(usize, usize)>,
}

impl MergeGraph {
    /// One vertex per distinct id (first appearance order), one edge per
    /// distinct pair of consecutive ids.
    pub fn from_track(arena: &SampleArena, track: &[SampleId]) -> Self {
        let mut graph = Self::default();
        let mut index: HashMap<SampleId, usize> = HashMap::new();
        let mut prev: Option<usize> = None;
        for &id in track {
            let v = *index.entry(id).or_insert_with(|| {
                let s = arena.get(id);
                graph.vertices.push(Vertex {
                    sample: id,
                    position: s.position,
                    weight: s.weight,
                    anchor: s.anchor,
                    merged_into: None,
                });
                graph.vertices.len() - 1
            });
            if let Some(p) = prev {
                graph.add_edge(p, v);
            }
            prev = Some(v);
        }
        graph
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.iter().filter(|v| v.merged_into.is_none()).count()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    fn add_edge(&mut self, a: usize, b: usize) {
        if a != b && !self.has_edge(a, b) {
            self.edges.push((a, b));
        }
    }

    fn has_edge(&self, a: usize, b: usize) -> bool {
        self.edges
            .iter()
            .any(|&(p, q)| (p == a && q == b) || (p == b && q == a))
    }

    /// Repeatedly merge the first pair of live vertices closer than
    /// `threshold` until none is left. Returns the number of merges.
    pub fn merge_close_vertices(&mut self, threshold: f64) -> usize {
        let mut merges = 0;
        while let Some((base, merged)) = self.find_close_pair(threshold) {
            self.merge_vertex(base, merged);
            merges += 1;
        }
        merges
    }

    fn find_close_pair(&self, threshold: f64) -> Option<(usize, usize)> {
        let n = self.vertices.len();
        for i in 0..n {
            if self.vertices[i].merged_into.is_some() {
                continue;
            }
            for j in i + 1..n {
                let (a, b) = (&self.vertices[i], &self.vertices[j]);
                if b.merged_into.is_some() || !anchors_compatible(a.anchor, b.anchor) {
                    continue;
                }
                if a.position.distance(b.position) <= threshold {
                    return Some((i, j));
                }
            }
        }
        None
    }

    fn merge_vertex(&mut self, base: usize, merged: usize) {
        let m = self.vertices[merged].clone();
        let b = &mut self.vertices[base];
        let total = b.weight + m.weight;
        if b.anchor.is_none() {
            if m.anchor.is_some() {
                b.position = m.position;
                b.anchor = m.anchor;
            } else {
                let wb = b.weight as f64;
                let wm = m.weight as f64;
                b.position = Point::new(
                    (b.position.x * wb + m.position.x * wm) / (wb + wm),
                    (b.position.y * wb + m.position.y * wm) / (wb + wm),
                );
            }
        }
        b.weight = total;
        self.vertices[merged].merged_into = Some(base);

        let old = std::mem::take(&mut self.edges);
        for (p, q) in old {
            let p = if p == merged { base } else { p };
            let q = if q == merged { base } else { q };
            self.add_edge(p, q);
        }
    }

    fn resolve(&self, mut v: usize) -> usize {
        while let Some(next) = self.vertices[v].merged_into {
            v = next;
        }
        v
    }

    /// Write merged vertices back into the arena and map the track onto
    /// the surviving sample ids.
    pub fn apply(&self, arena: &mut SampleArena, track: &[SampleId]) -> Track {
        let mut redirect: HashMap<SampleId, SampleId> = HashMap::new();
        for (i, v) in self.vertices.iter().enumerate() {
            let root = &self.vertices[self.resolve(i)];
            if v.merged_into.is_none() {
                let s = arena.get_mut(v.sample);
                s.position = v.position;
                s.weight = v.weight;
                s.anchor = v.anchor;
            }
            if root.sample != v.sample {
                redirect.insert(v.sample, root.sample);
            }
        }
        track
            .iter()
            .map(|id| redirect.get(id).copied().unwrap_or(*id))
            .collect()
    }
}

/// Two distinct existing entities are never fused.
pub(crate) fn anchors_compatible(a: Option<AnchorId>, b: Option<AnchorId>) -> bool {
    match (a, b) {
        (Some(x), Some(y)) => x == y,
        _ => true,
    }
}
