use std::{fs::File, io, path::PathBuf};

use anyhow::Context as _;
use clap::Parser;
use optix::{Float, LaserPath, Raycast, Simulation, TargetReport, Termination, TickReport};
use optix_json::SceneFile;
use serde::Serialize;

/// Loads a laser puzzle from a JSON scene file, runs it, and prints a JSON report
/// of every tick to stdout.
#[derive(Clone, Debug, Parser)]
#[command(name = "run_sim_json", version, about)]
struct Args {
    /// The scene to run.
    scene: PathBuf,

    /// Number of simulation steps to run.
    #[arg(long, default_value_t = 1)]
    ticks: usize,

    /// Overrides the scene's maximum number of segments per laser.
    #[arg(long = "max-segments", value_name = "N")]
    max_segments: Option<usize>,

    /// Additional logging to stderr.
    #[arg(long = "verbose", short = 'v')]
    verbose: bool,
}

#[derive(Debug, PartialEq, Serialize)]
struct TickOutput {
    tick: usize,
    completed: bool,
    paths: Vec<PathOutput>,
    targets: Vec<TargetOutput>,
}

#[derive(Debug, PartialEq, Serialize)]
struct PathOutput {
    color: String,
    points: Vec<Vec<Float>>,
    length: Float,
    termination: TerminationOutput,
    /// Index of the point the laser loops back to, if it's caught in a loop.
    #[serde(skip_serializing_if = "Option::is_none")]
    loop_start: Option<usize>,
}

#[derive(Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum TerminationOutput {
    HitWall { surface: usize },
    HitTarget { surface: usize, color: String },
    Exhausted,
    IterationCap,
}

#[derive(Debug, PartialEq, Serialize)]
struct TargetOutput {
    surface: usize,
    required: String,
    accumulated: String,
    status: String,
}

const LOOP_EPSILON: Float = 1e-6;

impl From<Termination> for TerminationOutput {
    fn from(termination: Termination) -> Self {
        match termination {
            Termination::HitWall(surface) => Self::HitWall { surface: surface.0 },
            Termination::HitTarget { surface, color } => Self::HitTarget {
                surface: surface.0,
                color: color.to_string(),
            },
            Termination::Exhausted => Self::Exhausted,
            Termination::IterationCap => Self::IterationCap,
        }
    }
}

impl<const D: usize> From<&LaserPath<D>> for PathOutput {
    fn from(path: &LaserPath<D>) -> Self {
        Self {
            color: path.color().to_string(),
            points: path
                .points()
                .iter()
                .map(|p| p.as_slice().to_vec())
                .collect(),
            length: path.length(),
            termination: path.termination().into(),
            loop_start: path.find_loop(LOOP_EPSILON),
        }
    }
}

impl From<&TargetReport> for TargetOutput {
    fn from(report: &TargetReport) -> Self {
        Self {
            surface: report.surface.0,
            required: report.required.to_string(),
            accumulated: report.accumulated.to_string(),
            status: report.status.to_string(),
        }
    }
}

fn tick_output<const D: usize>(tick: usize, report: &TickReport<D>) -> TickOutput {
    TickOutput {
        tick,
        completed: report.all_completed(),
        paths: report.paths.iter().map(Into::into).collect(),
        targets: report.targets.iter().map(Into::into).collect(),
    }
}

fn run<const D: usize, R: Raycast<D>>(
    mut sim: Simulation<R, D>,
    ticks: usize,
    out: &mut impl io::Write,
) -> anyhow::Result<()> {
    for tick in 0..ticks {
        let report = sim.tick();

        for (i, path) in report.paths.iter().enumerate() {
            if let Some(start) = path.find_loop(LOOP_EPSILON) {
                log::warn!("laser {i} loops back to point {start}");
            }
            log::debug!("laser {i}: {}", path.termination());
        }

        if report.all_completed() {
            log::info!("tick {tick}: every target completed");
        }

        serde_json::to_writer(&mut *out, &tick_output(tick, &report))?;
        writeln!(out)?;
    }

    Ok(())
}

/// Install a [`log`] global logger writing to stderr.
fn install_logging(verbose: bool) -> anyhow::Result<()> {
    use log::LevelFilter::{Debug, Info, Off};

    simplelog::WriteLogger::init(
        if verbose { Debug } else { Info },
        simplelog::ConfigBuilder::new()
            .set_target_level(Off)
            .set_location_level(Off)
            .set_time_level(Off)
            .build(),
        io::stderr(),
    )
    .context("failed to install the logger")
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    install_logging(args.verbose)?;

    let file = File::open(&args.scene)
        .with_context(|| format!("failed to open {}", args.scene.display()))?;

    let mut scene = SceneFile::from_reader(io::BufReader::new(file))
        .with_context(|| format!("failed to read {}", args.scene.display()))?;

    if let Some(max_segments) = args.max_segments {
        scene.config.max_segments = max_segments;
    }

    let mut out = io::stdout().lock();

    match scene.dim {
        2 => run(scene.build::<2>()?, args.ticks, &mut out),
        3 => run(scene.build::<3>()?, args.ticks, &mut out),
        dim => anyhow::bail!("dimension must be 2 or 3, got {dim}"),
    }
}
