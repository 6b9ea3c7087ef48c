//! Turning laid-out parts into host structure.
//!
//! The host model is reached only through [`StructureEmitter`]. Each
//! distinct sample becomes exactly one node, however many parts visit
//! it, and all samples bound to one anchor share a node. Each unordered
//! node pair is connected at most once.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use kurbo::Point;
use serde::Serialize;

use crate::layout::LaidOutPart;
use crate::track::{AnchorId, SampleId};

/// Sink for the nodes and edges of a finished gesture.
pub trait StructureEmitter {
    type Node: Copy + Eq + Hash;

    /// Create (or, for an anchored sample, look up) the node for a point.
    fn create_node(&mut self, position: Point, anchor: Option<AnchorId>) -> Self::Node;

    /// Connect two distinct nodes.
    fn connect(&mut self, a: Self::Node, b: Self::Node);
}

/// Feeds laid-out parts to an emitter, deduplicating nodes and edges.
pub struct GraphBuilder<'e, E: StructureEmitter> {
    emitter: &'e mut E,
    nodes: HashMap<SampleId, E::Node>,
    by_anchor: HashMap<AnchorId, E::Node>,
    created: usize,
    edges: HashSet<(E::Node, E::Node)>,
}

impl<'e, E: StructureEmitter> GraphBuilder<'e, E> {
    pub fn new(emitter: &'e mut E) -> Self {
        Self {
            emitter,
            nodes: HashMap::new(),
            by_anchor: HashMap::new(),
            created: 0,
            edges: HashSet::new(),
        }
    }

    /// Node for `id`, created on first sight at `position`. A sample bound
    /// to an anchor that already has a node reuses that node.
    pub fn node(&mut self, id: SampleId, position: Point, anchor: Option<AnchorId>) -> E::Node {
        if let Some(&node) = self.nodes.get(&id) {
            return node;
        }
        let node = match anchor.and_then(|a| self.by_anchor.get(&a).copied()) {
            Some(node) => node,
            None => {
                let node = self.emitter.create_node(position, anchor);
                if let Some(a) = anchor {
                    self.by_anchor.insert(a, node);
                }
                self.created += 1;
                node
            }
        };
        self.nodes.insert(id, node);
        node
    }

    /// Connect `a` and `b` unless they are the same node or already joined.
    pub fn connect(&mut self, a: E::Node, b: E::Node) -> bool {
        if a == b || self.edges.contains(&(a, b)) || self.edges.contains(&(b, a)) {
            return false;
        }
        self.edges.insert((a, b));
        self.emitter.connect(a, b);
        true
    }

    /// Emit every point of a part and the edges between consecutive points.
    pub fn add_part(&mut self, part: &LaidOutPart, anchor_of: impl Fn(SampleId) -> Option<AnchorId>) {
        let mut prev: Option<E::Node> = None;
        for (&id, &p) in part.ids.iter().zip(&part.points) {
            let node = self.node(id, p, anchor_of(id));
            if let Some(prev) = prev {
                self.connect(prev, node);
            }
            prev = Some(node);
        }
    }

    pub fn node_count(&self) -> usize {
        self.created
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

/// A created node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StructureNode {
    pub x: f64,
    pub y: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor: Option<AnchorId>,
}

/// In-memory emitter: plain node and edge lists.
///
/// Anchored points resolve to one node per anchor.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StructureGraph {
    pub nodes: Vec<StructureNode>,
    pub edges: Vec<[usize; 2]>,
    #[serde(skip)]
    by_anchor: HashMap<AnchorId, usize>,
}

impl StructureGraph {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StructureEmitter for StructureGraph {
    type Node = usize;

    fn create_node(&mut self, position: Point, anchor: Option<AnchorId>) -> usize {
        if let Some(a) = anchor {
            if let Some(&index) = self.by_anchor.get(&a) {
                return index;
            }
        }
        let index = self.nodes.len();
        self.nodes.push(StructureNode {
            x: position.x,
            y: position.y,
            anchor,
        });
        if let Some(a) = anchor {
            self.by_anchor.insert(a, index);
        }
        index
    }

    fn connect(&mut self, a: usize, b: usize) {
        self.edges.push([a, b]);
    }
}
