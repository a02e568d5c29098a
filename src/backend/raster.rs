use glam::Vec3;
use image::{Rgb, RgbImage};

use crate::scene::CameraPose;

const NEAR_PLANE: f32 = 0.1;
const SPLAT_SIZE: i64 = 2;

pub struct PointSample {
    pub position: Vec3,
    pub color: [u8; 3],
}

/// Depth-tested point projection, good enough for preview frames and orbit
/// videos. Proper rasterization belongs to a host-connected backend.
pub fn rasterize_points(
    samples: &[PointSample],
    pose: &CameraPose,
    width: u32,
    height: u32,
    background: [u8; 3],
) -> RgbImage {
    let mut image = RgbImage::from_pixel(width, height, Rgb(background));
    let mut depth = vec![f32::INFINITY; (width * height) as usize];

    let view = pose.view_matrix();
    let view_projection = pose.view_projection(width as f32 / height as f32);

    for sample in samples {
        let view_position = view.transform_point3(sample.position);
        if view_position.z <= NEAR_PLANE {
            continue;
        }

        let ndc = view_projection.project_point3(sample.position);
        if ndc.x < -1.0 || ndc.x > 1.0 || ndc.y < -1.0 || ndc.y > 1.0 {
            continue;
        }

        let px = ((ndc.x + 1.0) * 0.5 * (width - 1) as f32).round() as i64;
        let py = ((1.0 - ndc.y) * 0.5 * (height - 1) as f32).round() as i64;

        for dy in 0..SPLAT_SIZE {
            for dx in 0..SPLAT_SIZE {
                let x = px + dx;
                let y = py + dy;
                if x < 0 || y < 0 || x >= width as i64 || y >= height as i64 {
                    continue;
                }
                let index = (y as u32 * width + x as u32) as usize;
                if view_position.z < depth[index] {
                    depth[index] = view_position.z;
                    image.put_pixel(x as u32, y as u32, Rgb(sample.color));
                }
            }
        }
    }

    image
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pose() -> CameraPose {
        CameraPose {
            eye: Vec3::new(0.0, -5.0, 0.0),
            target: Vec3::ZERO,
            up: Vec3::Z,
        }
    }

    #[test]
    fn point_at_target_lands_near_image_center() {
        let samples = [PointSample {
            position: Vec3::ZERO,
            color: [255, 0, 0],
        }];
        let image = rasterize_points(&samples, &pose(), 64, 64, [0, 0, 0]);

        let lit = image
            .enumerate_pixels()
            .filter(|(_, _, pixel)| pixel.0 == [255, 0, 0])
            .collect::<Vec<_>>();
        assert!(!lit.is_empty());
        for (x, y, _) in lit {
            assert!((x as i32 - 32).abs() <= 2, "x = {x}");
            assert!((y as i32 - 32).abs() <= 2, "y = {y}");
        }
    }

    #[test]
    fn points_behind_the_camera_are_culled() {
        let samples = [PointSample {
            position: Vec3::new(0.0, -10.0, 0.0),
            color: [255, 255, 255],
        }];
        let image = rasterize_points(&samples, &pose(), 32, 32, [0, 0, 0]);
        assert!(image.pixels().all(|pixel| pixel.0 == [0, 0, 0]));
    }

    #[test]
    fn nearer_point_wins_the_depth_test() {
        let samples = [
            PointSample {
                position: Vec3::ZERO,
                color: [0, 255, 0],
            },
            PointSample {
                position: Vec3::new(0.0, 1.0, 0.0),
                color: [255, 0, 0],
            },
        ];
        let image = rasterize_points(&samples, &pose(), 64, 64, [0, 0, 0]);
        assert!(image.pixels().any(|pixel| pixel.0 == [0, 255, 0]));
        assert!(image.pixels().all(|pixel| pixel.0 != [255, 0, 0]));
    }
}
