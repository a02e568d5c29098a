use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use multiview::backend::{SamplerOverrides, SyntheticPipeline};
use multiview::generate::{
    run_generation, GenerateConfig, DEFAULT_FPS, DEFAULT_SEED, DEFAULT_SIMPLIFY,
    DEFAULT_TEXTURE_SIZE,
};

/// Generates 3D assets (splats, radiance field, mesh) from one photograph,
/// renders an orbit video per representation and exports GLB + PLY files
/// next to the input image.
#[derive(Parser)]
struct Args {
    /// Input photograph
    #[arg(default_value = "assets/example_image/car.png")]
    image: PathBuf,

    /// Random seed for inference
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Orbit video frame rate
    #[arg(long, default_value_t = DEFAULT_FPS)]
    fps: u32,

    /// Ratio of triangles removed during mesh simplification
    #[arg(long, default_value_t = DEFAULT_SIMPLIFY)]
    simplify: f32,

    /// Edge size of the baked texture, in pixels
    #[arg(long, default_value_t = DEFAULT_TEXTURE_SIZE)]
    texture_size: u32,

    /// Sparse-structure sampler steps override
    #[arg(long)]
    sparse_steps: Option<u32>,

    /// Sparse-structure sampler guidance strength override
    #[arg(long)]
    sparse_cfg: Option<f32>,

    /// Latent sampler steps override
    #[arg(long)]
    latent_steps: Option<u32>,

    /// Latent sampler guidance strength override
    #[arg(long)]
    latent_cfg: Option<f32>,
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();
    let args = Args::parse();

    let config = GenerateConfig {
        image_path: args.image,
        seed: args.seed,
        fps: args.fps,
        simplify: args.simplify,
        texture_size: args.texture_size,
        sampler: SamplerOverrides {
            sparse_structure_steps: args.sparse_steps,
            sparse_structure_cfg_strength: args.sparse_cfg,
            latent_steps: args.latent_steps,
            latent_cfg_strength: args.latent_cfg,
        },
    };

    let mut backend = SyntheticPipeline::new();
    let assets =
        run_generation(&mut backend, &config).context("asset generation pipeline failed")?;

    log::info!(
        "generated {} videos, {} and {}",
        assets.videos.len(),
        assets.glb.display(),
        assets.ply.display()
    );
    Ok(())
}
