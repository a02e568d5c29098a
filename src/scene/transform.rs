use glam::{Mat4, Quat, Vec3};

/// Translation, rotation and uniform scale of a scene object.
///
/// Scale is a single factor; the pipelines only ever apply uniform scaling,
/// and non-uniform node scales are collapsed at import time.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: f32,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: 1.0,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Transform {
            translation,
            ..Transform::IDENTITY
        }
    }

    /// Transform positioned at `eye` and oriented so that the view axis
    /// points at `target`.
    pub fn looking_at(eye: Vec3, target: Vec3, up: Vec3) -> Self {
        let rotation = Quat::from_mat4(&Mat4::look_at_lh(eye, target, up).inverse());
        Transform {
            translation: eye,
            rotation,
            scale: 1.0,
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::splat(self.scale),
            self.rotation,
            self.translation,
        )
    }

    pub fn is_identity(&self) -> bool {
        *self == Transform::IDENTITY
    }

    pub fn translate(&mut self, delta: Vec3) {
        self.translation += delta;
    }
}

impl Default for Transform {
    fn default() -> Self {
        Transform::IDENTITY
    }
}
