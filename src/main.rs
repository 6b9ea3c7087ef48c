use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use trackgraph::kurbo::Point;
use trackgraph::{AnchorId, Gesture, Sample, StructureGraph, TrackConfig, TrackError};

#[derive(Parser)]
#[command(name = "trackgraph", about = "Freehand pointer track to regularized node/edge graph")]
struct Cli {
    /// Gesture JSON: array of {"x", "y", "anchor"?}
    #[arg(short, long)]
    input: PathBuf,

    /// Output graph JSON (stdout if omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Preset JSON with any TrackConfig fields; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// RDP simplification threshold in pixels (0 = off)
    #[arg(long)]
    simplify: Option<f64>,

    /// Merge radius in pixels (0 = off)
    #[arg(long)]
    merge: Option<f64>,

    /// Screen length of one bond
    #[arg(long)]
    bond_length: Option<f64>,

    /// Angle quantization step in degrees
    #[arg(long)]
    angle_step: Option<f64>,

    /// Mirror the preferred starting angles
    #[arg(long)]
    reverse: bool,
}

#[derive(Deserialize)]
struct InputSample {
    x: f64,
    y: f64,
    #[serde(default)]
    anchor: Option<AnchorId>,
}

#[derive(Serialize)]
struct Output {
    #[serde(flatten)]
    graph: StructureGraph,
    preview: Vec<Vec<[f64; 2]>>,
}

fn main() -> Result<(), TrackError> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config: TrackConfig = match &cli.config {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => TrackConfig::default(),
    };
    if let Some(v) = cli.simplify {
        config.simplify_threshold = v;
    }
    if let Some(v) = cli.merge {
        config.merge_threshold = v;
    }
    if let Some(v) = cli.bond_length {
        config.optimization.def_bond_screen_length = v;
    }
    if let Some(deg) = cli.angle_step {
        config.optimization.angle_constraint = Some(deg.to_radians());
    }
    if cli.reverse {
        config.optimization.reverse_direction = true;
    }

    let samples: Vec<InputSample> = serde_json::from_str(&fs::read_to_string(&cli.input)?)?;
    let gesture = Gesture::from_samples(samples.into_iter().map(|s| match s.anchor {
        Some(anchor) => Sample::anchored(Point::new(s.x, s.y), anchor),
        None => Sample::new(s.x, s.y),
    }));

    let refined = trackgraph::process_gesture(gesture, &config)?;
    let mut graph = StructureGraph::new();
    refined.emit(&mut graph);

    let output = Output {
        graph,
        preview: refined
            .preview()
            .iter()
            .map(|line| line.iter().map(|p| [p.x, p.y]).collect())
            .collect(),
    };
    let json = serde_json::to_string_pretty(&output)?;
    match &cli.output {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }
    Ok(())
}
