use id_arena::Arena;

pub mod camera;
pub mod mesh;
pub mod object;
pub mod transform;

pub use camera::CameraPose;
pub use mesh::MeshData;
pub use object::{ObjectId, ObjectKind, SceneObject};
pub use transform::Transform;

/// The mutable scene context both pipelines operate on.
///
/// The original host application kept this state as process-wide globals;
/// here it is an explicit value passed to every operation, so runs are
/// deterministic and testable without a live host.
#[derive(Default)]
pub struct Scene {
    objects: Arena<SceneObject>,
    active_camera: Option<ObjectId>,
}

impl Scene {
    pub fn new() -> Self {
        Scene::default()
    }

    /// Resets to an empty scene, discarding every object. Mirrors the
    /// host's factory-reset performed before each import.
    pub fn clear(&mut self) {
        self.objects = Arena::new();
        self.active_camera = None;
    }

    pub fn add_object(&mut self, object: SceneObject) -> ObjectId {
        self.objects.alloc(object)
    }

    pub fn object(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(id)
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.get_mut(id)
    }

    pub fn object_by_name(&self, name: &str) -> Option<ObjectId> {
        self.objects
            .iter()
            .find(|(_, object)| object.name == name)
            .map(|(id, _)| id)
    }

    pub fn objects(&self) -> impl Iterator<Item = (ObjectId, &SceneObject)> {
        self.objects.iter()
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn mesh_ids(&self) -> Vec<ObjectId> {
        self.objects
            .iter()
            .filter(|(_, object)| object.is_mesh())
            .map(|(id, _)| id)
            .collect()
    }

    pub fn point_lights(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects
            .iter()
            .map(|(_, object)| object)
            .filter(|object| matches!(object.kind, ObjectKind::PointLight { .. }))
    }

    pub fn set_active_camera(&mut self, id: ObjectId) {
        self.active_camera = Some(id);
    }

    pub fn active_camera(&self) -> Option<ObjectId> {
        self.active_camera
    }

    /// Replaces every mesh object with a single `combined` object, keeping
    /// lights and cameras. The arena is rebuilt, so ids handed out before
    /// this call are invalidated, as they would be by the host's join
    /// operator.
    pub fn replace_meshes(&mut self, combined: SceneObject) -> ObjectId {
        let active_camera_name = self
            .active_camera
            .and_then(|id| self.objects.get(id))
            .map(|object| object.name.clone());

        let old = std::mem::take(&mut self.objects);
        self.active_camera = None;

        for (_, object) in old {
            if !object.is_mesh() {
                let name = object.name.clone();
                let id = self.objects.alloc(object);
                if active_camera_name.as_deref() == Some(name.as_str()) && self.active_camera.is_none()
                {
                    self.active_camera = Some(id);
                }
            }
        }

        self.objects.alloc(combined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn mesh_object(name: &str) -> SceneObject {
        SceneObject::mesh(
            name,
            MeshData::new(vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![0, 1, 2]),
        )
    }

    #[test]
    fn clear_discards_everything() {
        let mut scene = Scene::new();
        scene.add_object(mesh_object("a"));
        let camera = scene.add_object(SceneObject::camera("Camera"));
        scene.set_active_camera(camera);

        scene.clear();

        assert_eq!(scene.object_count(), 0);
        assert!(scene.active_camera().is_none());
    }

    #[test]
    fn mesh_ids_skip_lights_and_cameras() {
        let mut scene = Scene::new();
        scene.add_object(mesh_object("a"));
        scene.add_object(SceneObject::point_light("key", Vec3::Z, 200.0));
        scene.add_object(SceneObject::camera("Camera"));
        scene.add_object(mesh_object("b"));

        assert_eq!(scene.mesh_ids().len(), 2);
        assert_eq!(scene.point_lights().count(), 1);
    }

    #[test]
    fn object_by_name_finds_objects() {
        let mut scene = Scene::new();
        let id = scene.add_object(mesh_object("target"));
        assert_eq!(scene.object_by_name("target"), Some(id));
        assert!(scene.object_by_name("missing").is_none());
    }

    #[test]
    fn replace_meshes_keeps_non_mesh_objects() {
        let mut scene = Scene::new();
        scene.add_object(mesh_object("a"));
        scene.add_object(mesh_object("b"));
        scene.add_object(SceneObject::point_light("key", Vec3::Z, 150.0));

        let combined = scene.replace_meshes(mesh_object("Combined_Object"));

        assert_eq!(scene.mesh_ids(), vec![combined]);
        assert_eq!(scene.object_count(), 2);
        assert_eq!(
            scene.object(combined).unwrap().name,
            "Combined_Object"
        );
    }
}
