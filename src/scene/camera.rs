use glam::{Mat4, Vec3};

/// Camera placement for a single rendered frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
}

impl CameraPose {
    pub const DEFAULT_FOV_Y_DEG: f32 = 45.0;

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_lh(self.eye, self.target, self.up)
    }

    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        let projection = Mat4::perspective_lh(
            Self::DEFAULT_FOV_Y_DEG.to_radians(),
            aspect,
            0.1,
            100.0,
        );
        projection * self.view_matrix()
    }
}
