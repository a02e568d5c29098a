use std::path::{Path, PathBuf};

use crate::backend::RenderBackend;
use crate::error::{PipelineError, Result};
use crate::formats::ModelFormat;
use crate::scene::Scene;

pub mod consolidate;
pub mod lighting;
pub mod normalize;
pub mod orbit;
pub mod persist;

pub use consolidate::{consolidate, COMBINED_OBJECT_NAME};
pub use lighting::setup_lights;
pub use normalize::{normalize_size, recenter, DEFAULT_TARGET_SIZE};
pub use orbit::{camera_position, render_orbit, OrbitConfig, DEFAULT_ANGLE_STEP_DEG};
pub use persist::save_scene;

/// Orbit radius the driver uses, wider than the bare orbit default so the
/// whole normalized model stays in frame.
pub const DEFAULT_CAMERA_DISTANCE: f32 = 8.0;

#[derive(Debug, Clone)]
pub struct TurntableConfig {
    pub model_path: PathBuf,
    pub model_name: String,
    pub output_root: PathBuf,
    pub target_size: f32,
    pub angle_step_deg: u32,
    pub camera_distance: f32,
}

impl TurntableConfig {
    pub fn new(
        model_path: impl Into<PathBuf>,
        model_name: impl Into<String>,
        output_root: impl Into<PathBuf>,
    ) -> Self {
        TurntableConfig {
            model_path: model_path.into(),
            model_name: model_name.into(),
            output_root: output_root.into(),
            target_size: DEFAULT_TARGET_SIZE,
            angle_step_deg: DEFAULT_ANGLE_STEP_DEG,
            camera_distance: DEFAULT_CAMERA_DISTANCE,
        }
    }
}

/// Resets the scene and imports a model file through the backend's
/// format-specific importer. The reset is destructive, like the host's
/// factory settings, and happens before the extension is checked.
pub fn import_model<B: RenderBackend>(
    scene: &mut Scene,
    backend: &mut B,
    path: &Path,
) -> Result<()> {
    if !path.exists() {
        return Err(PipelineError::FileNotFound(path.to_path_buf()));
    }

    scene.clear();
    let format = ModelFormat::from_path(path)?;

    let objects = backend.import_mesh(path, format)?;
    let count = objects.len();
    for object in objects {
        scene.add_object(object);
    }

    log::info!(
        "imported {} objects ({}) from {}",
        count,
        format.name(),
        path.display()
    );
    Ok(())
}

/// The whole turntable run: import, consolidate, normalize, recenter,
/// light, orbit-render, save. When consolidation finds no meshes the run
/// stops before any downstream stage, without an error.
pub fn run_turntable<B: RenderBackend>(
    scene: &mut Scene,
    backend: &mut B,
    config: &TurntableConfig,
) -> Result<()> {
    log::info!("rendering model {}", config.model_path.display());
    import_model(scene, backend, &config.model_path)?;

    let Some(combined) = consolidate(scene) else {
        log::error!("failed to build a combined object; nothing to render");
        return Ok(());
    };

    normalize_size(scene, combined, config.target_size);
    recenter(scene, combined);
    setup_lights(scene);

    let orbit_config = OrbitConfig {
        output_dir: config.output_root.join(&config.model_name),
        angle_step_deg: config.angle_step_deg,
        distance: config.camera_distance,
    };
    render_orbit(scene, backend, &orbit_config)?;

    save_scene(scene, backend, &config.output_root, &config.model_name)?;
    log::info!("model {} rendered", config.model_name);
    Ok(())
}
