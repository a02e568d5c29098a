use glam::Vec3;
use id_arena::Id;

use crate::math::Aabb;
use crate::scene::mesh::MeshData;
use crate::scene::transform::Transform;

pub type ObjectId = Id<SceneObject>;

#[derive(Debug, Clone)]
pub enum ObjectKind {
    Mesh(MeshData),
    PointLight { energy: f32 },
    Camera,
}

/// A single entry in the scene: mesh, light or camera.
#[derive(Debug, Clone)]
pub struct SceneObject {
    pub name: String,
    pub transform: Transform,
    pub kind: ObjectKind,
}

impl SceneObject {
    pub fn mesh(name: impl Into<String>, data: MeshData) -> Self {
        SceneObject {
            name: name.into(),
            transform: Transform::IDENTITY,
            kind: ObjectKind::Mesh(data),
        }
    }

    pub fn point_light(name: impl Into<String>, position: Vec3, energy: f32) -> Self {
        SceneObject {
            name: name.into(),
            transform: Transform::from_translation(position),
            kind: ObjectKind::PointLight { energy },
        }
    }

    pub fn camera(name: impl Into<String>) -> Self {
        SceneObject {
            name: name.into(),
            transform: Transform::IDENTITY,
            kind: ObjectKind::Camera,
        }
    }

    pub fn is_mesh(&self) -> bool {
        matches!(self.kind, ObjectKind::Mesh(_))
    }

    pub fn mesh_data(&self) -> Option<&MeshData> {
        match &self.kind {
            ObjectKind::Mesh(data) => Some(data),
            _ => None,
        }
    }

    pub fn mesh_data_mut(&mut self) -> Option<&mut MeshData> {
        match &mut self.kind {
            ObjectKind::Mesh(data) => Some(data),
            _ => None,
        }
    }

    /// World-space bounds: object-space mesh bounds pushed through the
    /// current transform. `None` for non-meshes and empty geometry.
    pub fn world_bounds(&self) -> Option<Aabb> {
        let bounds = self.mesh_data()?.bounds()?;
        Some(bounds.transformed(&self.transform.matrix()))
    }

    /// Bakes the current transform into the mesh geometry and resets the
    /// transform to identity. No-op for non-mesh objects.
    pub fn bake_transform(&mut self) {
        let matrix = self.transform.matrix();
        if let ObjectKind::Mesh(data) = &mut self.kind {
            data.bake(&matrix);
            self.transform = Transform::IDENTITY;
        }
    }
}
