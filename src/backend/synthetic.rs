use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use glam::{Quat, Vec3};
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, DynamicImage, Frame, RgbImage, RgbaImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::backend::raster::{rasterize_points, PointSample};
use crate::backend::{glb, ply, GlbExportOptions, InferenceBackend, InferenceOptions};
use crate::error::Result;
use crate::generate::bundle::{
    AssetBundle, GaussianSplats, MeshAsset, RadianceField, RadianceSample, Representation, Splat,
    VideoChannel,
};
use crate::scene::{CameraPose, MeshData};

const VIDEO_BACKGROUND: [u8; 3] = [8, 8, 10];
const ORBIT_RADIUS: f32 = 2.0;
const ORBIT_ELEVATION: f32 = 0.5;
const DENSITY_THRESHOLD: f32 = 0.3;

/// Procedural `InferenceBackend`: shapes all three representations from the
/// input photograph, deterministically per seed. A stand-in with the same
/// surface as a real diffusion pipeline, for development and tests without
/// model weights or a GPU.
pub struct SyntheticPipeline {
    pub splat_count: usize,
    pub field_resolution: u32,
    pub sphere_rings: u32,
    pub sphere_segments: u32,
    pub video_frames: u32,
    pub frame_size: u32,
}

impl Default for SyntheticPipeline {
    fn default() -> Self {
        SyntheticPipeline {
            splat_count: 1024,
            field_resolution: 12,
            sphere_rings: 24,
            sphere_segments: 32,
            video_frames: 36,
            frame_size: 256,
        }
    }
}

impl SyntheticPipeline {
    pub fn new() -> Self {
        SyntheticPipeline::default()
    }

    fn point_samples(
        &self,
        representation: Representation<'_>,
        channel: VideoChannel,
    ) -> Vec<PointSample> {
        match representation {
            Representation::Gaussians(splats) => splats
                .splats
                .iter()
                .map(|splat| PointSample {
                    position: splat.position,
                    color: match channel {
                        VideoChannel::Color => {
                            [splat.color[0], splat.color[1], splat.color[2]]
                        }
                        VideoChannel::Normal => direction_color(splat.position),
                    },
                })
                .collect(),
            Representation::RadianceField(field) => {
                let mut samples = Vec::new();
                for x in 0..field.resolution {
                    for y in 0..field.resolution {
                        for z in 0..field.resolution {
                            let index = ((x * field.resolution + y) * field.resolution + z)
                                as usize;
                            let sample = field.samples[index];
                            if sample.density < DENSITY_THRESHOLD {
                                continue;
                            }
                            let position = field.cell_center(x, y, z);
                            samples.push(PointSample {
                                position,
                                color: match channel {
                                    VideoChannel::Color => [
                                        (sample.color.x * 255.0) as u8,
                                        (sample.color.y * 255.0) as u8,
                                        (sample.color.z * 255.0) as u8,
                                    ],
                                    VideoChannel::Normal => direction_color(position),
                                },
                            });
                        }
                    }
                }
                samples
            }
            Representation::Mesh(asset) => asset
                .mesh
                .positions
                .iter()
                .zip(&asset.normals)
                .map(|(&position, &normal)| PointSample {
                    position,
                    color: match channel {
                        VideoChannel::Color => [200, 200, 200],
                        VideoChannel::Normal => direction_color(normal),
                    },
                })
                .collect(),
        }
    }
}

impl InferenceBackend for SyntheticPipeline {
    fn run_inference(
        &mut self,
        image: &RgbaImage,
        options: &InferenceOptions,
    ) -> Result<AssetBundle> {
        if options.sampler != Default::default() {
            // The stand-in has no samplers to tune; a host-backed pipeline
            // would forward these.
            log::debug!("ignoring sampler overrides {:?}", options.sampler);
        }
        log::info!(
            "running synthetic image-to-3D inference (seed {})",
            options.seed
        );

        let mut rng = StdRng::seed_from_u64(options.seed);

        let mut splats = Vec::with_capacity(self.splat_count);
        for _ in 0..self.splat_count {
            let u: f32 = rng.gen();
            let v: f32 = rng.gen();
            let theta = v * std::f32::consts::PI;
            let phi = u * std::f32::consts::TAU;
            let radius = 0.35 + rng.gen::<f32>() * 0.1;
            let position = Vec3::new(
                radius * theta.sin() * phi.cos(),
                radius * theta.sin() * phi.sin(),
                radius * theta.cos(),
            );
            let pixel = sample_pixel(image, u, v);
            splats.push(Splat {
                position,
                scale: Vec3::splat(0.01 + rng.gen::<f32>() * 0.02),
                rotation: Quat::from_axis_angle(
                    random_unit_vector(&mut rng),
                    rng.gen::<f32>() * std::f32::consts::TAU,
                ),
                color: pixel,
                opacity: 0.5 + 0.5 * pixel[3] as f32 / 255.0,
            });
        }

        let resolution = self.field_resolution;
        let field = RadianceField {
            resolution,
            samples: {
                let mut samples = Vec::with_capacity((resolution * resolution * resolution) as usize);
                for x in 0..resolution {
                    for y in 0..resolution {
                        for z in 0..resolution {
                            let center = Vec3::new(
                                (x as f32 + 0.5) / resolution as f32 - 0.5,
                                (y as f32 + 0.5) / resolution as f32 - 0.5,
                                (z as f32 + 0.5) / resolution as f32 - 0.5,
                            );
                            // Density forms a shell around the splat radius.
                            let density = 1.0 - (center.length() - 0.4).abs() * 8.0;
                            let pixel = sample_pixel(
                                image,
                                x as f32 / resolution as f32,
                                y as f32 / resolution as f32,
                            );
                            samples.push(RadianceSample {
                                color: Vec3::new(
                                    pixel[0] as f32 / 255.0,
                                    pixel[1] as f32 / 255.0,
                                    pixel[2] as f32 / 255.0,
                                ),
                                density: density.clamp(0.0, 1.0),
                            });
                        }
                    }
                }
                samples
            },
        };

        let (mesh, normals) = uv_sphere(self.sphere_rings, self.sphere_segments, 0.45);

        Ok(AssetBundle {
            gaussians: vec![GaussianSplats { splats }],
            radiance_fields: vec![field],
            meshes: vec![MeshAsset { mesh, normals }],
        })
    }

    fn render_orbit_video(
        &mut self,
        representation: Representation<'_>,
        channel: VideoChannel,
    ) -> Result<Vec<RgbImage>> {
        let samples = self.point_samples(representation, channel);

        let mut frames = Vec::with_capacity(self.video_frames as usize);
        for frame in 0..self.video_frames {
            let yaw = frame as f32 / self.video_frames as f32 * std::f32::consts::TAU;
            let pose = CameraPose {
                eye: Vec3::new(
                    ORBIT_RADIUS * yaw.cos(),
                    ORBIT_RADIUS * yaw.sin(),
                    ORBIT_ELEVATION,
                ),
                target: Vec3::ZERO,
                up: Vec3::Z,
            };
            frames.push(rasterize_points(
                &samples,
                &pose,
                self.frame_size,
                self.frame_size,
                VIDEO_BACKGROUND,
            ));
        }
        Ok(frames)
    }

    fn video_extension(&self) -> &'static str {
        // No MP4 encoder without the host stack; GIF keeps the flyaround
        // viewable anywhere.
        "gif"
    }

    fn encode_video(&mut self, frames: &[RgbImage], fps: u32, out_path: &Path) -> Result<()> {
        let writer = BufWriter::new(File::create(out_path)?);
        let mut encoder = GifEncoder::new(writer);
        encoder.set_repeat(Repeat::Infinite)?;

        let delay = Delay::from_numer_denom_ms(1000, fps.max(1));
        encoder.encode_frames(frames.iter().map(|frame| {
            let rgba = DynamicImage::ImageRgb8(frame.clone()).to_rgba8();
            Frame::from_parts(rgba, 0, 0, delay)
        }))?;
        Ok(())
    }

    fn export_glb(
        &mut self,
        splats: &GaussianSplats,
        mesh: &MeshAsset,
        options: &GlbExportOptions,
        out_path: &Path,
    ) -> Result<()> {
        log::warn!(
            "simplify ratio {} and {}px texture baking are host operations; \
             exporting the full mesh with vertex colors",
            options.simplify,
            options.texture_size
        );
        glb::write_glb(mesh, splats, out_path)
    }

    fn export_ply(&mut self, splats: &GaussianSplats, out_path: &Path) -> Result<()> {
        ply::write_splat_ply(splats, out_path)
    }
}

fn sample_pixel(image: &RgbaImage, u: f32, v: f32) -> [u8; 4] {
    let (width, height) = image.dimensions();
    let x = (u.clamp(0.0, 1.0) * (width - 1) as f32) as u32;
    let y = (v.clamp(0.0, 1.0) * (height - 1) as f32) as u32;
    image.get_pixel(x, y).0
}

fn random_unit_vector(rng: &mut StdRng) -> Vec3 {
    loop {
        let candidate = Vec3::new(
            rng.gen::<f32>() * 2.0 - 1.0,
            rng.gen::<f32>() * 2.0 - 1.0,
            rng.gen::<f32>() * 2.0 - 1.0,
        );
        let length = candidate.length();
        if length > 1e-3 && length <= 1.0 {
            return candidate / length;
        }
    }
}

fn direction_color(direction: Vec3) -> [u8; 3] {
    let mapped = direction.normalize_or_zero() * 0.5 + 0.5;
    [
        (mapped.x * 255.0) as u8,
        (mapped.y * 255.0) as u8,
        (mapped.z * 255.0) as u8,
    ]
}

fn uv_sphere(rings: u32, segments: u32, radius: f32) -> (MeshData, Vec<Vec3>) {
    let mut positions = Vec::new();
    let mut normals = Vec::new();
    for ring in 0..=rings {
        let theta = ring as f32 / rings as f32 * std::f32::consts::PI;
        for segment in 0..segments {
            let phi = segment as f32 / segments as f32 * std::f32::consts::TAU;
            let direction = Vec3::new(
                theta.sin() * phi.cos(),
                theta.sin() * phi.sin(),
                theta.cos(),
            );
            positions.push(direction * radius);
            normals.push(direction);
        }
    }

    let mut indices = Vec::new();
    for ring in 0..rings {
        for segment in 0..segments {
            let next_segment = (segment + 1) % segments;
            let a = ring * segments + segment;
            let b = (ring + 1) * segments + segment;
            let c = ring * segments + next_segment;
            let d = (ring + 1) * segments + next_segment;
            indices.extend([a, b, c, c, b, d]);
        }
    }

    (MeshData::new(positions, indices), normals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn test_image() -> RgbaImage {
        RgbaImage::from_fn(16, 16, |x, _| {
            if x < 8 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 255])
            }
        })
    }

    fn small_pipeline() -> SyntheticPipeline {
        SyntheticPipeline {
            splat_count: 64,
            field_resolution: 6,
            sphere_rings: 6,
            sphere_segments: 8,
            video_frames: 4,
            frame_size: 64,
        }
    }

    fn options(seed: u64) -> InferenceOptions {
        InferenceOptions {
            seed,
            sampler: Default::default(),
        }
    }

    #[test]
    fn inference_fills_every_representation() {
        let bundle = small_pipeline()
            .run_inference(&test_image(), &options(1))
            .unwrap();
        assert_eq!(bundle.first_gaussians().unwrap().len(), 64);
        assert_eq!(bundle.first_radiance_field().unwrap().resolution, 6);
        assert_eq!(bundle.first_radiance_field().unwrap().samples.len(), 216);
        assert!(!bundle.first_mesh().unwrap().mesh.is_empty());
    }

    #[test]
    fn inference_is_deterministic_per_seed() {
        let image = test_image();
        let a = small_pipeline().run_inference(&image, &options(7)).unwrap();
        let b = small_pipeline().run_inference(&image, &options(7)).unwrap();
        let c = small_pipeline().run_inference(&image, &options(8)).unwrap();

        assert_eq!(a.gaussians[0].splats, b.gaussians[0].splats);
        assert_ne!(a.gaussians[0].splats, c.gaussians[0].splats);
    }

    #[test]
    fn orbit_video_has_the_configured_shape() {
        let mut pipeline = small_pipeline();
        let bundle = pipeline.run_inference(&test_image(), &options(1)).unwrap();
        let frames = pipeline
            .render_orbit_video(
                Representation::Gaussians(bundle.first_gaussians().unwrap()),
                VideoChannel::Color,
            )
            .unwrap();

        assert_eq!(frames.len(), 4);
        assert_eq!(frames[0].dimensions(), (64, 64));
        assert!(frames[0].pixels().any(|pixel| pixel.0 != VIDEO_BACKGROUND));
    }

    #[test]
    fn encode_video_writes_a_gif() {
        let mut pipeline = small_pipeline();
        let bundle = pipeline.run_inference(&test_image(), &options(1)).unwrap();
        let frames = pipeline
            .render_orbit_video(
                Representation::Mesh(bundle.first_mesh().unwrap()),
                VideoChannel::Normal,
            )
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orbit.gif");
        pipeline.encode_video(&frames, 30, &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[0..4], b"GIF8");
    }

    #[test]
    fn uv_sphere_vertices_sit_on_the_sphere() {
        let (mesh, normals) = uv_sphere(8, 12, 0.45);
        assert_eq!(mesh.vertex_count(), normals.len());
        for position in &mesh.positions {
            assert!((position.length() - 0.45).abs() < 1e-5);
        }
        for triangle in mesh.indices.chunks_exact(3) {
            for &index in triangle {
                assert!((index as usize) < mesh.vertex_count());
            }
        }
    }
}
