use std::f64::consts::PI;

use approx::assert_relative_eq;
use trackgraph::kurbo::{Point, Vec2};
use trackgraph::layout::snap::{snap_angle, snap_distance};
use trackgraph::{
    process_gesture, refine_track, AnchorId, Gesture, OptimizationOptions, RefinedGesture, Sample,
    SampleArena, StructureEmitter, StructureGraph, Track, TrackConfig,
};

fn config_with_bond(bond: f64) -> TrackConfig {
    let mut config = TrackConfig::default();
    config.optimization.def_bond_screen_length = bond;
    config
}

fn run(gesture: Gesture, config: &TrackConfig) -> StructureGraph {
    let refined = process_gesture(gesture, config).unwrap();
    let mut graph = StructureGraph::new();
    refined.emit(&mut graph);
    graph
}

fn node(graph: &StructureGraph, i: usize) -> Point {
    Point::new(graph.nodes[i].x, graph.nodes[i].y)
}

#[test]
fn straight_gesture_is_one_edge() {
    let gesture = Gesture::from_samples((0..5).map(|i| Sample::new(i as f64 * 40.0, 0.0)));
    let graph = run(gesture, &config_with_bond(40.0));
    assert_eq!(graph.nodes.len(), 2);
    assert_eq!(graph.edges, vec![[0, 1]]);
}

fn hexagon() -> Gesture {
    let mut gesture = Gesture::new();
    let mut p = Point::ORIGIN;
    let first = gesture.push(Sample::new(p.x, p.y));
    for k in 1..6 {
        p += Vec2::from_angle((k - 1) as f64 * PI / 3.0) * 40.0;
        gesture.push(Sample::new(p.x, p.y));
    }
    gesture.revisit(first);
    gesture
}

#[test]
fn closed_hexagon_becomes_regular_ring() {
    let gesture = hexagon();
    let mut config = config_with_bond(40.0);
    config.optimization.preferred_starting_angles = vec![0.0];
    let refined = process_gesture(gesture, &config).unwrap();
    assert_eq!(refined.tracks.len(), 1);
    assert_eq!(refined.tracks[0].parts.len(), 1);
    assert!(refined.tracks[0].parts[0].is_ring);

    let preview = &refined.preview()[0];
    assert_eq!(preview.len(), 7);
    assert_eq!(preview[0], preview[6]);
    for w in preview.windows(2) {
        assert_relative_eq!(w[0].distance(w[1]), 40.0, epsilon = 1e-6);
    }
    for w in preview.windows(3) {
        let a = w[0] - w[1];
        let b = w[2] - w[1];
        let interior = (a.dot(b) / (a.hypot() * b.hypot())).acos();
        assert_relative_eq!(interior, 2.0 * PI / 3.0, epsilon = 1e-6);
    }

    let mut graph = StructureGraph::new();
    refined.emit(&mut graph);
    assert_eq!(graph.nodes.len(), 6);
    assert_eq!(graph.edges.len(), 6);
}

#[test]
fn touch_to_anchor_keeps_anchor_position() {
    let anchor = Point::new(118.0, 25.0);
    let gesture = Gesture::from_samples([
        Sample::new(0.0, 0.0),
        Sample::new(40.0, 3.0),
        Sample::new(80.0, 0.0),
        Sample::anchored(anchor, AnchorId(9)),
    ]);
    let refined = process_gesture(gesture, &config_with_bond(40.0)).unwrap();
    let part = &refined.tracks[0].parts[0];
    assert_eq!(*part.points.last().unwrap(), anchor);

    let mut graph = StructureGraph::new();
    refined.emit(&mut graph);
    assert_eq!(graph.nodes.len(), 3);
    assert_eq!(graph.edges.len(), 2);
    let anchored: Vec<usize> = (0..graph.nodes.len())
        .filter(|&i| graph.nodes[i].anchor == Some(AnchorId(9)))
        .collect();
    assert_eq!(anchored.len(), 1);
    assert_eq!(node(&graph, anchored[0]), anchor);
}

#[test]
fn anchor_in_the_middle_splits_and_stays() {
    let anchor = Point::new(60.0, 0.0);
    let gesture = Gesture::from_samples([
        Sample::new(0.0, 0.0),
        Sample::new(30.0, 5.0),
        Sample::anchored(anchor, AnchorId(3)),
        Sample::new(90.0, 20.0),
        Sample::new(120.0, 0.0),
    ]);
    let refined = process_gesture(gesture, &config_with_bond(40.0)).unwrap();
    assert_eq!(refined.tracks.len(), 2);

    let mut graph = StructureGraph::new();
    refined.emit(&mut graph);
    assert_eq!(graph.nodes.len(), 4);
    assert_eq!(graph.edges.len(), 3);
    let hub = graph
        .nodes
        .iter()
        .position(|n| n.anchor == Some(AnchorId(3)))
        .unwrap();
    assert_eq!(node(&graph, hub), anchor);
    // Both sub-tracks attach to the same node.
    let degree = graph.edges.iter().filter(|e| e.contains(&hub)).count();
    assert_eq!(degree, 2);
}

fn lasso() -> Gesture {
    Gesture::from_samples([
        Sample::new(0.0, 0.0),
        Sample::new(100.0, 0.0),
        Sample::new(100.0, 60.0),
        Sample::new(50.0, -60.0),
    ])
}

#[test]
fn lasso_splits_into_chain_ring_chain() {
    let gesture = lasso();
    let refined = process_gesture(gesture, &config_with_bond(40.0)).unwrap();
    let parts = &refined.tracks[0].parts;
    assert_eq!(parts.len(), 3);
    assert!(!parts[0].is_ring);
    assert!(parts[1].is_ring);
    assert!(!parts[2].is_ring);
    assert_eq!(parts[1].ids.len(), 4);
    // The crossing joins all three parts.
    assert_eq!(parts[0].ids[1], parts[1].ids[0]);
    assert_eq!(parts[1].ids[3], parts[2].ids[0]);

    let mut graph = StructureGraph::new();
    refined.emit(&mut graph);
    assert_eq!(graph.nodes.len(), 5);
    assert_eq!(graph.edges.len(), 5);
}

fn zig_zag(arena: &mut SampleArena) -> Track {
    [
        (0.0, 0.0),
        (20.0, 1.0),
        (40.0, 0.0),
        (60.0, 30.0),
        (80.0, 60.0),
        (100.0, 30.0),
        (120.0, 0.0),
    ]
    .iter()
    .map(|&(x, y)| arena.push(Sample::new(x, y)))
    .collect()
}

#[test]
fn refinement_is_idempotent() {
    let mut arena = SampleArena::new();
    let raw = zig_zag(&mut arena);
    let config = TrackConfig::default();
    let once = refine_track(&mut arena, &raw, &config);
    let positions = arena.positions(&once);
    let twice = refine_track(&mut arena, &once, &config);
    assert_eq!(once, twice);
    assert_eq!(arena.positions(&twice), positions);
}

#[test]
fn refinement_only_removes_without_crossings() {
    let mut arena = SampleArena::new();
    let raw = zig_zag(&mut arena);
    let out = refine_track(&mut arena, &raw, &TrackConfig::default());
    assert!(out.len() <= raw.len());
    assert_eq!(out, vec![raw[0], raw[2], raw[4], raw[6]]);
}

#[test]
fn distances_and_angles_quantize() {
    let options = OptimizationOptions {
        distance_constraints: vec![1.0],
        primary_distance_constraint: 1.0,
        def_bond_screen_length: 30.0,
        ..OptimizationOptions::default()
    };
    assert_eq!(snap_distance(1.4 * 30.0, &options), 30.0);
    assert_eq!(snap_angle(2f64.to_radians(), &[0.0], Some(PI / 6.0), None), 0.0);
    let a = snap_angle(95f64.to_radians(), &[0.0], Some(PI / 6.0), None);
    assert_relative_eq!(a, 90f64.to_radians(), epsilon = 1e-12);
}

/// Records callbacks the way a host model would.
#[derive(Default)]
struct Recorder {
    created: Vec<(Point, Option<AnchorId>)>,
    connected: Vec<(u32, u32)>,
}

impl StructureEmitter for Recorder {
    type Node = u32;

    fn create_node(&mut self, position: Point, anchor: Option<AnchorId>) -> u32 {
        self.created.push((position, anchor));
        self.created.len() as u32 - 1
    }

    fn connect(&mut self, a: u32, b: u32) {
        self.connected.push((a, b));
    }
}

#[test]
fn custom_emitter_sees_each_node_once() {
    let refined = process_gesture(lasso(), &config_with_bond(40.0)).unwrap();
    let mut recorder = Recorder::default();
    refined.emit(&mut recorder);
    assert_eq!(recorder.created.len(), 5);
    assert_eq!(recorder.connected.len(), 5);
    assert!(recorder.connected.iter().all(|(a, b)| a != b));
}

#[test]
fn anchor_absorbed_by_a_free_point_is_created_once() {
    let gesture = Gesture::from_samples([
        Sample::new(0.0, 0.0),
        Sample::new(100.0, 0.0),
        Sample::new(100.0, -60.0),
        Sample::new(200.0, -60.0),
        Sample::new(200.0, 8.0),
        Sample::anchored(Point::new(104.0, 4.0), AnchorId(1)),
        Sample::new(104.0, 70.0),
        Sample::new(160.0, 110.0),
    ]);
    let refined = process_gesture(gesture, &config_with_bond(40.0)).unwrap();
    let mut recorder = Recorder::default();
    refined.emit(&mut recorder);
    let on_anchor: Vec<Point> = recorder
        .created
        .iter()
        .filter(|(_, anchor)| *anchor == Some(AnchorId(1)))
        .map(|(p, _)| *p)
        .collect();
    assert_eq!(on_anchor, vec![Point::new(104.0, 4.0)]);
    assert!(recorder.connected.iter().all(|(a, b)| a != b));
}

/// Feed each preview polyline back in as a fresh gesture.
fn rerun(refined: &RefinedGesture, config: &TrackConfig) -> Vec<Vec<Point>> {
    refined
        .preview()
        .iter()
        .map(|line| {
            let gesture = Gesture::from_samples(line.iter().map(|p| Sample::new(p.x, p.y)));
            let mut again = process_gesture(gesture, config).unwrap().preview();
            assert_eq!(again.len(), 1);
            again.remove(0)
        })
        .collect()
}

fn drift(a: &[Vec<Point>], b: &[Vec<Point>]) -> f64 {
    assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b)
        .flat_map(|(x, y)| {
            assert_eq!(x.len(), y.len(), "{x:?} vs {y:?}");
            x.iter().zip(y).map(|(p, q)| p.distance(*q))
        })
        .fold(0.0, f64::max)
}

#[test]
fn laid_out_output_is_a_fixed_point() {
    let config = config_with_bond(40.0);
    let mut arena = SampleArena::new();
    let track = zig_zag(&mut arena);
    let chain = Gesture::from_samples(arena.positions(&track).iter().map(|p| Sample::new(p.x, p.y)));

    for (name, gesture) in [("chain", chain), ("lasso", lasso()), ("ring", hexagon())] {
        let once = process_gesture(gesture, &config).unwrap();
        let first = once.preview();
        let second = rerun(&once, &config);
        let d = drift(&first, &second);
        assert!(d < 1e-6, "{name} drifted by {d} px: {first:?} then {second:?}");
    }
}
