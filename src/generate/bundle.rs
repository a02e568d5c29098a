use glam::{Quat, Vec3};

use crate::error::{PipelineError, Result};
use crate::scene::MeshData;

/// One oriented, colored Gaussian blob.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Splat {
    pub position: Vec3,
    pub scale: Vec3,
    pub rotation: Quat,
    pub color: [u8; 4],
    pub opacity: f32,
}

#[derive(Debug, Clone, Default)]
pub struct GaussianSplats {
    pub splats: Vec<Splat>,
}

impl GaussianSplats {
    pub fn len(&self) -> usize {
        self.splats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.splats.is_empty()
    }
}

/// One sample of a dense radiance grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadianceSample {
    pub color: Vec3,
    pub density: f32,
}

/// Volumetric color/density grid of `resolution` cells per axis, laid out
/// x-major in the unit cube centered on the origin.
#[derive(Debug, Clone)]
pub struct RadianceField {
    pub resolution: u32,
    pub samples: Vec<RadianceSample>,
}

impl RadianceField {
    /// World-space center of the cell at grid coordinates (x, y, z).
    pub fn cell_center(&self, x: u32, y: u32, z: u32) -> Vec3 {
        let step = 1.0 / self.resolution as f32;
        (Vec3::new(x as f32, y as f32, z as f32) + 0.5) * step - 0.5
    }
}

/// Triangle mesh with per-vertex shading attributes.
#[derive(Debug, Clone)]
pub struct MeshAsset {
    pub mesh: MeshData,
    pub normals: Vec<Vec3>,
}

/// Everything a single inference run produces. Each representation is a
/// list; the export steps only ever consume the first element.
#[derive(Debug, Clone, Default)]
pub struct AssetBundle {
    pub gaussians: Vec<GaussianSplats>,
    pub radiance_fields: Vec<RadianceField>,
    pub meshes: Vec<MeshAsset>,
}

impl AssetBundle {
    pub fn first_gaussians(&self) -> Result<&GaussianSplats> {
        self.gaussians
            .first()
            .ok_or(PipelineError::EmptyRepresentation("gaussian"))
    }

    pub fn first_radiance_field(&self) -> Result<&RadianceField> {
        self.radiance_fields
            .first()
            .ok_or(PipelineError::EmptyRepresentation("radiance field"))
    }

    pub fn first_mesh(&self) -> Result<&MeshAsset> {
        self.meshes
            .first()
            .ok_or(PipelineError::EmptyRepresentation("mesh"))
    }
}

/// A representation selected for orbit-video rendering.
#[derive(Debug, Clone, Copy)]
pub enum Representation<'a> {
    Gaussians(&'a GaussianSplats),
    RadianceField(&'a RadianceField),
    Mesh(&'a MeshAsset),
}

/// Which channel of the representation the orbit video shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoChannel {
    Color,
    Normal,
}
