use glam::Vec3;

use crate::scene::{Scene, SceneObject};

pub const CENTER_LIGHT_POSITION: Vec3 = Vec3::new(0.0, 0.0, 2.0);
pub const CENTER_LIGHT_ENERGY: f32 = 200.0;

pub const DIAGONAL_LIGHT_POSITIONS: [Vec3; 4] = [
    Vec3::new(-2.0, -2.0, 2.0),
    Vec3::new(2.0, -2.0, 2.0),
    Vec3::new(-2.0, 2.0, 2.0),
    Vec3::new(2.0, 2.0, 2.0),
];
pub const DIAGONAL_LIGHT_ENERGY: f32 = 150.0;

/// Installs the fixed five-light rig: one light overhead and four on the
/// diagonals. There is no deduplication; calling this twice doubles the
/// rig, so the driver runs it exactly once per scene.
pub fn setup_lights(scene: &mut Scene) {
    scene.add_object(SceneObject::point_light(
        "Center_Light",
        CENTER_LIGHT_POSITION,
        CENTER_LIGHT_ENERGY,
    ));

    for (index, &position) in DIAGONAL_LIGHT_POSITIONS.iter().enumerate() {
        scene.add_object(SceneObject::point_light(
            format!("Diagonal_Light_{}", index + 1),
            position,
            DIAGONAL_LIGHT_ENERGY,
        ));
    }
}
