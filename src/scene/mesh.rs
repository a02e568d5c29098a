use glam::{Mat4, Vec3};

use crate::math::Aabb;

/// Triangle geometry of a single scene object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        MeshData { positions, indices }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Object-space bounds, `None` for empty geometry.
    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(self.positions.iter().copied())
    }

    /// Applies `matrix` to every vertex. Used to bake an object transform
    /// into the geometry so the transform can be reset to identity.
    pub fn bake(&mut self, matrix: &Mat4) {
        for position in &mut self.positions {
            *position = matrix.transform_point3(*position);
        }
    }

    /// Appends `other`, re-basing its indices onto this mesh's vertices.
    pub fn merge(&mut self, other: &MeshData) {
        let base = self.positions.len() as u32;
        self.positions.extend_from_slice(&other.positions);
        self.indices
            .extend(other.indices.iter().map(|index| index + base));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle(offset: Vec3) -> MeshData {
        MeshData::new(
            vec![
                offset,
                offset + Vec3::new(1.0, 0.0, 0.0),
                offset + Vec3::new(0.0, 1.0, 0.0),
            ],
            vec![0, 1, 2],
        )
    }

    #[test]
    fn merge_rebases_indices() {
        let mut mesh = triangle(Vec3::ZERO);
        mesh.merge(&triangle(Vec3::new(5.0, 0.0, 0.0)));
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.indices, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(mesh.triangle_count(), 2);
    }

    #[test]
    fn bake_moves_vertices() {
        let mut mesh = triangle(Vec3::ZERO);
        mesh.bake(&Mat4::from_translation(Vec3::new(0.0, 0.0, 2.0)));
        assert_eq!(mesh.positions[0], Vec3::new(0.0, 0.0, 2.0));
        let bounds = mesh.bounds().unwrap();
        assert_eq!(bounds.min.z, 2.0);
    }

    #[test]
    fn empty_mesh_has_no_bounds() {
        assert!(MeshData::default().bounds().is_none());
    }
}
