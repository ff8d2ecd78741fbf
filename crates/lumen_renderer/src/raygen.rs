//! Camera ray generation.

use crate::sampling::{seeded_rng, RAYGEN_STREAM};
use crate::{PathState, RenderConfig};
use lumen_core::Camera;
use lumen_math::Ray;
use rand::Rng;
use rand_distr::StandardNormal;
use rayon::prelude::*;

/// Primary path for one pixel.
///
/// Without jitter the ray passes through the pixel center, so the result is
/// identical every iteration.
pub fn camera_path(camera: &Camera, config: &RenderConfig, iteration: u32, pixel_index: u32) -> PathState {
    let width = camera.width();
    let x = (pixel_index % width) as f32;
    let y = (pixel_index / width) as f32;
    let half_w = camera.width() as f32 * 0.5;
    let half_h = camera.height() as f32 * 0.5;

    let mut rng = config
        .jitters_camera_rays()
        .then(|| seeded_rng(iteration, pixel_index, RAYGEN_STREAM));

    let (jx, jy) = match rng.as_mut() {
        Some(rng) if config.antialias => (rng.gen::<f32>() - 0.5, rng.gen::<f32>() - 0.5),
        _ => (0.0, 0.0),
    };

    let sx = x + 0.5 + jx - half_w;
    let sy = y + 0.5 + jy - half_h;
    let direction = (camera.view + camera.right * camera.pixel_length.x * sx - camera.up * camera.pixel_length.y * sy)
        .try_normalize()
        .unwrap_or(camera.view);

    let mut ray = Ray::new(camera.position, direction);

    if let (Some(dof), Some(rng)) = (config.depth_of_field, rng.as_mut()) {
        let focal_point = ray.at(dof.focal_distance);
        let dx: f32 = rng.sample(StandardNormal);
        let dy: f32 = rng.sample(StandardNormal);
        let origin = camera.position + (camera.right * dx + camera.up * dy) * dof.aperture;
        if let Some(refocused) = Ray::normalized(origin, focal_point - origin) {
            ray = refocused;
        }
    }

    PathState::new(ray, pixel_index, camera.trace_depth)
}

/// Fill the arena with one primary path per pixel, in pixel order.
pub fn generate_camera_rays(camera: &Camera, config: &RenderConfig, iteration: u32, paths: &mut [PathState]) {
    paths.par_iter_mut().enumerate().for_each(|(i, path)| {
        *path = camera_path(camera, config, iteration, i as u32);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, DepthOfField};
    use lumen_math::Vec3;

    fn center_direction(camera: &Camera, x: u32, y: u32) -> Vec3 {
        camera_path(camera, &RenderConfig::default(), 0, y * camera.width() + x).ray.direction
    }

    fn camera(width: u32, height: u32) -> Camera {
        let mut camera = Camera::new()
            .with_resolution(width, height)
            .with_trace_depth(5)
            .with_position(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y)
            .with_fov(60.0);
        camera.initialize();
        camera
    }

    #[test]
    fn test_center_pixel_looks_forward() {
        let cam = camera(5, 5);
        let dir = center_direction(&cam, 2, 2);
        assert!((dir - Vec3::NEG_Z).length() < 1e-6);
    }

    #[test]
    fn test_image_orientation() {
        let cam = camera(8, 6);
        let left = center_direction(&cam, 0, 3);
        let right = center_direction(&cam, 7, 3);
        let top = center_direction(&cam, 4, 0);
        let bottom = center_direction(&cam, 4, 5);

        assert!(right.dot(cam.right) > left.dot(cam.right));
        assert!(top.dot(cam.up) > bottom.dot(cam.up));
    }

    #[test]
    fn test_generated_paths() {
        let cam = camera(4, 3);
        let mut paths = vec![PathState::default(); 12];
        generate_camera_rays(&cam, &RenderConfig::default(), 0, &mut paths);

        for (i, p) in paths.iter().enumerate() {
            assert_eq!(p.pixel_index, i as u32);
            assert_eq!(p.color, Color::ONE);
            assert_eq!(p.remaining_bounces, 5);
            assert!(p.ray.is_normalized(1e-5));
            assert_eq!(p.ray.origin, cam.position);
        }

        // Pinhole rays are the same every iteration
        let mut later = vec![PathState::default(); 12];
        generate_camera_rays(&cam, &RenderConfig::default(), 9, &mut later);
        assert_eq!(paths, later);
    }

    #[test]
    fn test_antialias_jitter_is_seeded() {
        let cam = camera(4, 4);
        let config = RenderConfig {
            antialias: true,
            ..Default::default()
        };

        let a = camera_path(&cam, &config, 1, 5);
        let b = camera_path(&cam, &config, 1, 5);
        let c = camera_path(&cam, &config, 2, 5);
        assert_eq!(a, b);
        assert_ne!(a.ray.direction, c.ray.direction);

        // Jitter stays inside the pixel footprint
        let center = center_direction(&cam, 1, 1);
        let spread = (a.ray.direction - center).length();
        assert!(spread < cam.pixel_length.length());
    }

    #[test]
    fn test_depth_of_field_converges_on_focal_plane() {
        let cam = camera(4, 4);
        let config = RenderConfig {
            depth_of_field: Some(DepthOfField {
                aperture: 0.2,
                focal_distance: 5.0,
            }),
            ..Default::default()
        };

        let pinhole = Ray::new(cam.position, center_direction(&cam, 2, 1));
        let focal_point = pinhole.at(5.0);

        for iteration in 0..4 {
            let path = camera_path(&cam, &config, iteration, 6);
            assert!(path.ray.is_normalized(1e-5));
            let to_focus = focal_point - path.ray.origin;
            let along = path.ray.direction.dot(to_focus);
            assert!((path.ray.at(along) - focal_point).length() < 1e-3);
        }
    }
}
