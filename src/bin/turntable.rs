use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use multiview::backend::{HeadlessBackend, HeadlessConfig};
use multiview::resolve;
use multiview::scene::Scene;
use multiview::turntable::{
    self, run_turntable, TurntableConfig, DEFAULT_ANGLE_STEP_DEG, DEFAULT_TARGET_SIZE,
};

/// Imports a model, normalizes and lights it, renders a 360° turntable
/// image sequence and saves the final scene.
#[derive(Parser)]
struct Args {
    /// Model file name, or a bare name resolved against the model directory
    model: Option<String>,

    /// Directory the input models live in
    #[arg(long, default_value = "model")]
    model_dir: PathBuf,

    /// Directory render output is written to
    #[arg(long, default_value = "output")]
    output_dir: PathBuf,

    /// Degrees between consecutive frames
    #[arg(long, default_value_t = DEFAULT_ANGLE_STEP_DEG)]
    angle_step: u32,

    /// Camera orbit radius
    #[arg(long, default_value_t = turntable::DEFAULT_CAMERA_DISTANCE)]
    camera_distance: f32,

    /// Maximum model dimension after normalization
    #[arg(long, default_value_t = DEFAULT_TARGET_SIZE)]
    target_size: f32,

    /// Edge length of rendered frames, in pixels
    #[arg(long, default_value_t = 512)]
    resolution: u32,
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();
    let args = Args::parse();

    let resolved = resolve::resolve_model(args.model.as_deref(), &args.model_dir)
        .context("failed to resolve the model path")?;

    let config = TurntableConfig {
        model_path: resolved.path,
        model_name: resolved.name,
        output_root: args.output_dir,
        target_size: args.target_size,
        angle_step_deg: args.angle_step,
        camera_distance: args.camera_distance,
    };

    let mut scene = Scene::new();
    let mut backend = HeadlessBackend::new(HeadlessConfig {
        width: args.resolution,
        height: args.resolution,
    });

    run_turntable(&mut scene, &mut backend, &config).context("turntable pipeline failed")?;
    Ok(())
}
