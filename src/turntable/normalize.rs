use glam::Vec3;

use crate::scene::{ObjectId, Scene};

pub const DEFAULT_TARGET_SIZE: f32 = 2.0;

/// Uniformly scales the object so its largest bounding-box extent equals
/// `target_size`, then bakes the scale into the geometry. Returns the
/// applied factor, or `None` when the object is degenerate (zero extent)
/// and was left untouched.
pub fn normalize_size(scene: &mut Scene, id: ObjectId, target_size: f32) -> Option<f32> {
    let object = scene.object_mut(id)?;
    let Some(bounds) = object.world_bounds() else {
        log::warn!("object {} has no geometry; skipping size normalization", object.name);
        return None;
    };

    let extents = bounds.extents();
    log::info!(
        "model dimensions: x={:.4} y={:.4} z={:.4}",
        extents.x,
        extents.y,
        extents.z
    );

    let max_extent = bounds.max_extent();
    if max_extent == 0.0 {
        log::warn!("object {} has zero extent; cannot normalize size", object.name);
        return None;
    }

    let factor = target_size / max_extent;
    object.transform.scale *= factor;
    object.bake_transform();

    let normalized = object.world_bounds().expect("geometry still present").extents();
    log::info!(
        "normalized dimensions: x={:.4} y={:.4} z={:.4} (scale factor {:.4})",
        normalized.x,
        normalized.y,
        normalized.z,
        factor
    );
    Some(factor)
}

/// Moves the object so its bounding-box center sits at the world origin.
/// The center is the average of the 8 transformed corner points, matching
/// how the host computed it. Call after `normalize_size`, since scaling
/// changes the bounding box.
pub fn recenter(scene: &mut Scene, id: ObjectId) -> Option<Vec3> {
    let object = scene.object_mut(id)?;
    let bounds = object.world_bounds()?;

    let center = bounds.corners().iter().copied().sum::<Vec3>() / 8.0;
    object.transform.translate(-center);
    object.bake_transform();
    Some(center)
}
