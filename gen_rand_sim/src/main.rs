use std::{fs::File, io, path::PathBuf};

use anyhow::Context as _;
use clap::Parser;
use optix_json::{serde_json, SceneFile, ShapeDesc};
use optix_random::{
    rand::{self, rngs::StdRng, SeedableRng},
    *,
};
use optix_shapes::{Parallelotope, Polygon, Simplex, Sphere};

/// Generates a random laser puzzle and writes it as a JSON scene file.
#[derive(Clone, Debug, Parser)]
#[command(name = "gen_rand_sim", version, about)]
struct Args {
    /// Where to write the scene.
    output: PathBuf,

    /// Dimension of the scene, 2 or 3.
    #[arg(long, default_value_t = 2)]
    dim: usize,

    /// Number of bodies.
    #[arg(long, default_value_t = 12)]
    bodies: usize,

    /// Number of laser sources.
    #[arg(long, default_value_t = 4)]
    sources: usize,

    /// Seed for reproducible scenes, random if absent.
    #[arg(long)]
    seed: Option<u64>,
}

/// A shape of random kind, already in its serialized form.
struct RandomShape<const D: usize>(ShapeDesc);

impl Random for RandomShape<2> {
    fn random(rng: &mut (impl rand::Rng + ?Sized)) -> Self {
        Self(match rng.gen_range(0usize..4) {
            0 => (&Simplex::<2>::random(rng)).into(),
            1 => (&Parallelotope::<2>::random(rng)).into(),
            2 => (&Sphere::<2>::random(rng)).into(),
            _ => (&Polygon::<2>::random(rng)).into(),
        })
    }
}

impl Random for RandomShape<3> {
    fn random(rng: &mut (impl rand::Rng + ?Sized)) -> Self {
        Self(match rng.gen_range(0usize..3) {
            0 => (&Simplex::<3>::random(rng)).into(),
            1 => (&Parallelotope::<3>::random(rng)).into(),
            _ => (&Sphere::<3>::random(rng)).into(),
        })
    }
}

fn random_scene<const D: usize>(
    num_bodies: usize,
    num_sources: usize,
    rng: &mut (impl rand::Rng + ?Sized),
) -> SceneFile
where
    RandomShape<D>: Random,
{
    let (surfaces, sources) = random_puzzle::<D>(num_bodies, num_sources, rng);

    let mut scene = SceneFile::new(D);
    for surface in &surfaces {
        scene.push_body(surface, RandomShape::<D>::random(rng).0);
    }
    scene.sources = sources.iter().map(Into::into).collect();

    scene
}

fn generate(args: &Args) -> anyhow::Result<SceneFile> {
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    Ok(match args.dim {
        2 => random_scene::<2>(args.bodies, args.sources, &mut rng),
        3 => random_scene::<3>(args.bodies, args.sources, &mut rng),
        dim => anyhow::bail!("dimension must be 2 or 3, got {dim}"),
    })
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    simplelog::WriteLogger::init(
        log::LevelFilter::Info,
        simplelog::ConfigBuilder::new()
            .set_target_level(log::LevelFilter::Off)
            .set_time_level(log::LevelFilter::Off)
            .build(),
        io::stderr(),
    )
    .context("failed to install the logger")?;

    let scene = generate(&args)?;

    let file = File::create(&args.output)
        .with_context(|| format!("failed to create {}", args.output.display()))?;
    serde_json::to_writer_pretty(file, &scene)?;

    log::info!(
        "wrote a {}D scene of {} bodies and {} sources to {}",
        scene.dim,
        scene.bodies.len(),
        scene.sources.len(),
        args.output.display()
    );

    Ok(())
}
