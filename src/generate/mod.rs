use std::path::{Path, PathBuf};

use crate::backend::{GlbExportOptions, InferenceBackend, InferenceOptions, SamplerOverrides};
use crate::error::{PipelineError, Result};

pub mod bundle;

pub use bundle::{AssetBundle, GaussianSplats, MeshAsset, RadianceField, Representation, Splat, VideoChannel};

pub const DEFAULT_SEED: u64 = 1;
pub const DEFAULT_FPS: u32 = 30;
pub const DEFAULT_SIMPLIFY: f32 = 0.95;
pub const DEFAULT_TEXTURE_SIZE: u32 = 1024;

#[derive(Debug, Clone)]
pub struct GenerateConfig {
    pub image_path: PathBuf,
    pub seed: u64,
    pub fps: u32,
    /// Ratio of triangles removed when the backend simplifies the mesh.
    pub simplify: f32,
    pub texture_size: u32,
    pub sampler: SamplerOverrides,
}

impl GenerateConfig {
    pub fn new(image_path: impl Into<PathBuf>) -> Self {
        GenerateConfig {
            image_path: image_path.into(),
            seed: DEFAULT_SEED,
            fps: DEFAULT_FPS,
            simplify: DEFAULT_SIMPLIFY,
            texture_size: DEFAULT_TEXTURE_SIZE,
            sampler: SamplerOverrides::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeneratedAssets {
    pub videos: Vec<PathBuf>,
    pub glb: PathBuf,
    pub ply: PathBuf,
}

/// The whole generation run: load the photograph, run inference, render an
/// orbit video per representation, then export the textured mesh and the
/// raw splats. Everything is sequential and blocking; a failed step aborts
/// the run and leaves any files written so far in place.
pub fn run_generation<B: InferenceBackend>(
    backend: &mut B,
    config: &GenerateConfig,
) -> Result<GeneratedAssets> {
    let image_path = &config.image_path;
    if !image_path.exists() {
        return Err(PipelineError::FileNotFound(image_path.clone()));
    }

    let base = image_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "asset".to_string());
    let out_dir = image_path.parent().unwrap_or(Path::new("")).to_path_buf();

    let image = image::open(image_path)?.to_rgba8();
    log::info!("generating 3D assets from {}", image_path.display());

    let options = InferenceOptions {
        seed: config.seed,
        sampler: config.sampler,
    };
    let outputs = backend.run_inference(&image, &options)?;

    let video_extension = backend.video_extension();
    let video_jobs = [
        ("gs", Representation::Gaussians(outputs.first_gaussians()?), VideoChannel::Color),
        (
            "rf",
            Representation::RadianceField(outputs.first_radiance_field()?),
            VideoChannel::Color,
        ),
        ("mesh", Representation::Mesh(outputs.first_mesh()?), VideoChannel::Normal),
    ];

    let mut videos = Vec::new();
    for (suffix, representation, channel) in video_jobs {
        let frames = backend.render_orbit_video(representation, channel)?;
        let out_path = out_dir.join(format!("{base}_{suffix}.{video_extension}"));
        backend.encode_video(&frames, config.fps, &out_path)?;
        log::info!("wrote orbit video {}", out_path.display());
        videos.push(out_path);
    }

    let glb_path = out_dir.join(format!("{base}.glb"));
    backend.export_glb(
        outputs.first_gaussians()?,
        outputs.first_mesh()?,
        &GlbExportOptions {
            simplify: config.simplify,
            texture_size: config.texture_size,
        },
        &glb_path,
    )?;
    log::info!("wrote interchange file {}", glb_path.display());

    let ply_path = out_dir.join(format!("{base}.ply"));
    backend.export_ply(outputs.first_gaussians()?, &ply_path)?;
    log::info!("wrote point cloud {}", ply_path.display());

    Ok(GeneratedAssets {
        videos,
        glb: glb_path,
        ply: ply_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::SyntheticPipeline;
    use image::{Rgba, RgbaImage};

    fn write_test_image(path: &Path) {
        let image = RgbaImage::from_pixel(8, 8, Rgba([90, 140, 200, 255]));
        image.save(path).unwrap();
    }

    fn small_pipeline() -> SyntheticPipeline {
        SyntheticPipeline {
            splat_count: 32,
            field_resolution: 4,
            sphere_rings: 4,
            sphere_segments: 6,
            video_frames: 3,
            frame_size: 32,
        }
    }

    #[test]
    fn missing_image_is_a_file_not_found_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = GenerateConfig::new(dir.path().join("missing.png"));
        let err = run_generation(&mut small_pipeline(), &config).unwrap_err();
        assert!(matches!(err, PipelineError::FileNotFound(_)));
    }

    #[test]
    fn full_run_writes_videos_and_exports_next_to_the_image() {
        let dir = tempfile::tempdir().unwrap();
        let image_path = dir.path().join("car.png");
        write_test_image(&image_path);

        let config = GenerateConfig::new(&image_path);
        let assets = run_generation(&mut small_pipeline(), &config).unwrap();

        assert_eq!(
            assets.videos,
            vec![
                dir.path().join("car_gs.gif"),
                dir.path().join("car_rf.gif"),
                dir.path().join("car_mesh.gif"),
            ]
        );
        for video in &assets.videos {
            assert!(video.exists());
        }
        assert_eq!(assets.glb, dir.path().join("car.glb"));
        assert!(assets.glb.exists());
        assert_eq!(assets.ply, dir.path().join("car.ply"));
        assert!(assets.ply.exists());
    }

    #[test]
    fn empty_gaussian_output_halts_before_any_video() {
        use crate::backend::{GlbExportOptions, InferenceBackend, InferenceOptions};
        use image::RgbImage;

        struct EmptyBundleBackend;

        impl InferenceBackend for EmptyBundleBackend {
            fn run_inference(
                &mut self,
                _image: &RgbaImage,
                _options: &InferenceOptions,
            ) -> Result<AssetBundle> {
                Ok(AssetBundle::default())
            }

            fn render_orbit_video(
                &mut self,
                _representation: Representation<'_>,
                _channel: VideoChannel,
            ) -> Result<Vec<RgbImage>> {
                panic!("must not render from an empty bundle");
            }

            fn video_extension(&self) -> &'static str {
                "gif"
            }

            fn encode_video(
                &mut self,
                _frames: &[RgbImage],
                _fps: u32,
                _out_path: &Path,
            ) -> Result<()> {
                panic!("must not encode from an empty bundle");
            }

            fn export_glb(
                &mut self,
                _splats: &GaussianSplats,
                _mesh: &MeshAsset,
                _options: &GlbExportOptions,
                _out_path: &Path,
            ) -> Result<()> {
                panic!("must not export from an empty bundle");
            }

            fn export_ply(&mut self, _splats: &GaussianSplats, _out_path: &Path) -> Result<()> {
                panic!("must not export from an empty bundle");
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let image_path = dir.path().join("car.png");
        write_test_image(&image_path);

        let config = GenerateConfig::new(&image_path);
        let err = run_generation(&mut EmptyBundleBackend, &config).unwrap_err();
        assert!(matches!(err, PipelineError::EmptyRepresentation("gaussian")));
    }
}
