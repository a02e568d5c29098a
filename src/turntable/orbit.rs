use std::fs;
use std::path::PathBuf;

use glam::Vec3;

use crate::backend::RenderBackend;
use crate::error::{PipelineError, Result};
use crate::scene::{CameraPose, Scene, SceneObject, Transform};

pub const DEFAULT_ANGLE_STEP_DEG: u32 = 30;
pub const DEFAULT_ORBIT_DISTANCE: f32 = 5.0;

#[derive(Debug, Clone)]
pub struct OrbitConfig {
    pub output_dir: PathBuf,
    pub angle_step_deg: u32,
    pub distance: f32,
}

impl OrbitConfig {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        OrbitConfig {
            output_dir: output_dir.into(),
            angle_step_deg: DEFAULT_ANGLE_STEP_DEG,
            distance: DEFAULT_ORBIT_DISTANCE,
        }
    }
}

/// Position on the horizontal orbit circle at `angle_deg`.
pub fn camera_position(angle_deg: f32, distance: f32) -> Vec3 {
    let angle = angle_deg.to_radians();
    Vec3::new(distance * angle.cos(), distance * angle.sin(), 0.0)
}

/// Renders one frame per orbit step, strictly in ascending angle order:
/// each iteration re-positions the shared camera, so frames cannot be
/// reordered or overlapped. A failed render aborts the remaining frames.
pub fn render_orbit<B: RenderBackend>(
    scene: &mut Scene,
    backend: &mut B,
    config: &OrbitConfig,
) -> Result<Vec<PathBuf>> {
    if config.angle_step_deg == 0 {
        return Err(PipelineError::InvalidConfig(
            "orbit angle step must be positive".to_string(),
        ));
    }
    if 360 % config.angle_step_deg != 0 {
        log::warn!(
            "angle step {}° does not divide 360°; the final arc will be short",
            config.angle_step_deg
        );
    }

    fs::create_dir_all(&config.output_dir)?;

    let camera_id = scene.add_object(SceneObject::camera("Camera"));
    scene.set_active_camera(camera_id);

    let mut frame_paths = Vec::new();
    for angle_deg in (0..360u32).step_by(config.angle_step_deg as usize) {
        let eye = camera_position(angle_deg as f32, config.distance);
        let pose = CameraPose {
            eye,
            target: Vec3::ZERO,
            up: Vec3::Z,
        };

        if let Some(camera) = scene.object_mut(camera_id) {
            camera.transform = Transform::looking_at(eye, Vec3::ZERO, Vec3::Z);
        }

        let frame_path = config.output_dir.join(format!("angle_{angle_deg:03}.png"));
        backend.render_frame(scene, &pose, &frame_path)?;
        log::info!("rendered {angle_deg}° to {}", frame_path.display());
        frame_paths.push(frame_path);
    }

    Ok(frame_paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::ModelFormat;
    use std::path::Path;

    struct RecordingBackend {
        frames: Vec<(CameraPose, PathBuf)>,
    }

    impl RecordingBackend {
        fn new() -> Self {
            RecordingBackend { frames: Vec::new() }
        }
    }

    impl RenderBackend for RecordingBackend {
        fn import_mesh(
            &mut self,
            _path: &Path,
            _format: ModelFormat,
        ) -> Result<Vec<SceneObject>> {
            unimplemented!("not used by orbit tests")
        }

        fn render_frame(
            &mut self,
            _scene: &Scene,
            pose: &CameraPose,
            out_path: &Path,
        ) -> Result<()> {
            self.frames.push((*pose, out_path.to_path_buf()));
            Ok(())
        }

        fn scene_extension(&self) -> &'static str {
            "obj"
        }

        fn save_scene(&mut self, _scene: &Scene, _out_path: &Path) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn camera_position_follows_the_circle() {
        let at_zero = camera_position(0.0, 5.0);
        assert!((at_zero - Vec3::new(5.0, 0.0, 0.0)).length() < 1e-5);

        let at_ninety = camera_position(90.0, 5.0);
        assert!((at_ninety - Vec3::new(0.0, 5.0, 0.0)).length() < 1e-4);

        let at_oblique = camera_position(30.0, 2.0);
        assert!((at_oblique.x - 2.0 * 30f32.to_radians().cos()).abs() < 1e-5);
        assert!((at_oblique.y - 2.0 * 30f32.to_radians().sin()).abs() < 1e-5);
        assert_eq!(at_oblique.z, 0.0);
    }

    #[test]
    fn default_step_renders_twelve_ordered_frames() {
        let dir = tempfile::tempdir().unwrap();
        let mut scene = Scene::new();
        let mut backend = RecordingBackend::new();

        let frames =
            render_orbit(&mut scene, &mut backend, &OrbitConfig::new(dir.path())).unwrap();

        assert_eq!(frames.len(), 12);
        let names = frames
            .iter()
            .map(|path| path.file_name().unwrap().to_str().unwrap().to_string())
            .collect::<Vec<_>>();
        assert_eq!(names[0], "angle_000.png");
        assert_eq!(names[1], "angle_030.png");
        assert_eq!(names[11], "angle_330.png");

        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted, "frame names are strictly increasing");
    }

    #[test]
    fn poses_lie_on_the_orbit_and_face_the_origin() {
        let dir = tempfile::tempdir().unwrap();
        let mut scene = Scene::new();
        let mut backend = RecordingBackend::new();

        let config = OrbitConfig {
            output_dir: dir.path().to_path_buf(),
            angle_step_deg: 90,
            distance: 3.0,
        };
        render_orbit(&mut scene, &mut backend, &config).unwrap();

        assert_eq!(backend.frames.len(), 4);
        for (pose, _) in &backend.frames {
            assert!((pose.eye.length() - 3.0).abs() < 1e-4);
            assert_eq!(pose.eye.z, 0.0);
            assert_eq!(pose.target, Vec3::ZERO);
        }
    }

    #[test]
    fn camera_object_is_created_and_activated() {
        let dir = tempfile::tempdir().unwrap();
        let mut scene = Scene::new();
        let mut backend = RecordingBackend::new();

        render_orbit(&mut scene, &mut backend, &OrbitConfig::new(dir.path())).unwrap();

        let camera_id = scene.active_camera().expect("camera was activated");
        let camera = scene.object(camera_id).unwrap();
        assert_eq!(camera.name, "Camera");
        // Transform reflects the last orbit step.
        let expected = camera_position(330.0, DEFAULT_ORBIT_DISTANCE);
        assert!((camera.transform.translation - expected).length() < 1e-4);
    }

    #[test]
    fn zero_step_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut scene = Scene::new();
        let mut backend = RecordingBackend::new();

        let config = OrbitConfig {
            output_dir: dir.path().to_path_buf(),
            angle_step_deg: 0,
            distance: 5.0,
        };
        let err = render_orbit(&mut scene, &mut backend, &config).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidConfig(_)));
        assert!(backend.frames.is_empty());
    }

    #[test]
    fn uneven_step_still_covers_the_leading_arc() {
        let dir = tempfile::tempdir().unwrap();
        let mut scene = Scene::new();
        let mut backend = RecordingBackend::new();

        let config = OrbitConfig {
            output_dir: dir.path().to_path_buf(),
            angle_step_deg: 100,
            distance: 5.0,
        };
        let frames = render_orbit(&mut scene, &mut backend, &config).unwrap();
        // 0, 100, 200, 300.
        assert_eq!(frames.len(), 4);
    }
}
