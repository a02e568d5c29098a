use std::path::Path;

use image::{RgbImage, RgbaImage};

use crate::error::Result;
use crate::formats::ModelFormat;
use crate::generate::bundle::{AssetBundle, GaussianSplats, MeshAsset, Representation, VideoChannel};
use crate::scene::{CameraPose, Scene, SceneObject};

mod glb;
pub mod headless;
mod ply;
mod raster;
pub mod synthetic;

pub use headless::{HeadlessBackend, HeadlessConfig};
pub use synthetic::SyntheticPipeline;

/// The host application the turntable pipeline drives: importers, the
/// renderer and scene persistence. The pipeline itself owns the scene and
/// all decision-making; everything behind this trait is delegated.
pub trait RenderBackend {
    /// Reads mesh objects from a model file. The dispatcher has already
    /// verified the extension; a backend that cannot read `format` reports
    /// a backend error.
    fn import_mesh(&mut self, path: &Path, format: ModelFormat) -> Result<Vec<SceneObject>>;

    /// Renders one frame of the scene from `pose` into `out_path`,
    /// blocking until the file is written.
    fn render_frame(&mut self, scene: &Scene, pose: &CameraPose, out_path: &Path) -> Result<()>;

    /// Native extension of the backend's scene files, without the dot.
    fn scene_extension(&self) -> &'static str;

    /// Persists the whole scene to `out_path`.
    fn save_scene(&mut self, scene: &Scene, out_path: &Path) -> Result<()>;
}

/// Sampler knobs forwarded to the generative pipeline. `None` keeps the
/// pipeline's pretrained defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SamplerOverrides {
    pub sparse_structure_steps: Option<u32>,
    pub sparse_structure_cfg_strength: Option<f32>,
    pub latent_steps: Option<u32>,
    pub latent_cfg_strength: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InferenceOptions {
    pub seed: u64,
    pub sampler: SamplerOverrides,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlbExportOptions {
    /// Ratio of triangles to remove during simplification.
    pub simplify: f32,
    /// Edge size of the baked texture, in pixels.
    pub texture_size: u32,
}

/// The pretrained image-to-3D pipeline and its companion render/export
/// utilities.
pub trait InferenceBackend {
    /// Runs single-image-to-3D inference, producing all representations.
    fn run_inference(&mut self, image: &RgbaImage, options: &InferenceOptions)
        -> Result<AssetBundle>;

    /// Renders an orbit flyaround of one representation, one image per
    /// orbit step.
    fn render_orbit_video(
        &mut self,
        representation: Representation<'_>,
        channel: VideoChannel,
    ) -> Result<Vec<RgbImage>>;

    /// Extension of the videos `encode_video` writes, without the dot.
    fn video_extension(&self) -> &'static str;

    fn encode_video(&mut self, frames: &[RgbImage], fps: u32, out_path: &Path) -> Result<()>;

    /// Combines splat appearance with mesh geometry into one textured
    /// interchange file.
    fn export_glb(
        &mut self,
        splats: &GaussianSplats,
        mesh: &MeshAsset,
        options: &GlbExportOptions,
        out_path: &Path,
    ) -> Result<()>;

    /// Writes the raw splats as a point-cloud file.
    fn export_ply(&mut self, splats: &GaussianSplats, out_path: &Path) -> Result<()>;
}
