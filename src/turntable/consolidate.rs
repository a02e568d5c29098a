use crate::scene::{MeshData, ObjectId, Scene, SceneObject};

pub const COMBINED_OBJECT_NAME: &str = "Combined_Object";

/// Bakes every mesh object's transform into its geometry, then joins them
/// all into a single `Combined_Object`. Returns `None`, without error, when
/// the scene holds no meshes; the caller decides whether that halts the
/// pipeline.
pub fn consolidate(scene: &mut Scene) -> Option<ObjectId> {
    let mesh_ids = scene.mesh_ids();
    if mesh_ids.is_empty() {
        log::error!("no mesh objects found; ensure the model imported correctly");
        return None;
    }

    let source_count = mesh_ids.len();
    let mut combined = MeshData::default();
    for id in mesh_ids {
        let object = scene.object_mut(id).expect("id came from mesh_ids");
        object.bake_transform();
        combined.merge(object.mesh_data().expect("mesh object has mesh data"));
    }

    let combined_id = scene.replace_meshes(SceneObject::mesh(COMBINED_OBJECT_NAME, combined));
    log::info!("joined {source_count} mesh objects into {COMBINED_OBJECT_NAME}");
    Some(combined_id)
}
