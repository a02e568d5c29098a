use std::fs;
use std::path::{Path, PathBuf};

use crate::backend::RenderBackend;
use crate::error::Result;
use crate::scene::Scene;

/// Saves the scene as `{model_name}_final` with the backend's native scene
/// extension, creating the output directory if needed.
pub fn save_scene<B: RenderBackend>(
    scene: &Scene,
    backend: &mut B,
    output_dir: &Path,
    model_name: &str,
) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)?;

    let out_path = output_dir.join(format!(
        "{model_name}_final.{}",
        backend.scene_extension()
    ));
    backend.save_scene(scene, &out_path)?;
    log::info!("scene saved to {}", out_path.display());
    Ok(out_path)
}
