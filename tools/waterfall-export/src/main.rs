//! waterfall-export - waterfall asset generation tool
//!
//! Generates the waterfall mesh (.obj), flow map (.png), and point cloud
//! (.pcache) described by a scene manifest.

mod scene;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand_pcg::Pcg32;
use waterfall_gen::{generate_assets, FsAssetStore, WaterfallAssets};

#[derive(Parser)]
#[command(name = "waterfall-export")]
#[command(about = "Waterfall asset generation tool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate assets from a scene manifest
    Generate {
        /// Path to scene.toml manifest
        #[arg(default_value = "scene.toml")]
        scene: PathBuf,

        /// Output directory (overrides manifest)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Shuffle seed (overrides manifest)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Validate a scene manifest without generating
    Check {
        /// Path to scene.toml manifest
        #[arg(default_value = "scene.toml")]
        scene: PathBuf,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            scene,
            output,
            seed,
        } => generate(&scene, output, seed),
        Commands::Check { scene } => check(&scene),
    }
}

fn generate(path: &Path, output: Option<PathBuf>, seed: Option<u64>) -> Result<()> {
    let scene = scene::load_scene(path)?;

    let spline = scene.build_spline();
    let colliders = scene.build_colliders();
    let transform = scene.transform();
    let mut config = scene.waterfall;
    if let Some(seed) = seed {
        config.seed = seed;
    }

    let out_dir = output.unwrap_or_else(|| scene.output.clone());
    let mut store = FsAssetStore::new(&out_dir)
        .with_context(|| format!("Failed to create output directory: {}", out_dir.display()))?;
    let mut assets = WaterfallAssets::new(&scene.name);
    let mut rng = Pcg32::seed_from_u64(config.seed);

    let Some(summary) = generate_assets(
        Some(&spline),
        &transform,
        &config,
        &colliders,
        &mut assets,
        &mut store,
        &mut rng,
    )
    .context("Generation failed")?
    else {
        bail!("nothing was generated");
    };

    println!(
        "{}: {} vertices, {} quads, {} points, {}x{} flow map -> {}",
        scene.name,
        summary.vertex_count,
        summary.quad_count,
        summary.point_count,
        summary.flow_map_width,
        summary.flow_map_height,
        out_dir.display()
    );
    Ok(())
}

fn check(path: &Path) -> Result<()> {
    let scene = scene::load_scene(path)?;
    println!(
        "{}: ok ({} control points, {} obstacles)",
        path.display(),
        scene.curve.points.len(),
        scene.obstacles.len()
    );
    Ok(())
}
