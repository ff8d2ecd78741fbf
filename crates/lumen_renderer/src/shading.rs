//! Shading stage: apply one bounce of the light transport to each path.

use crate::sampling::seeded_rng;
use crate::scatter::{scatter, ScatterSample};
use crate::{Intersection, PathState};
use lumen_core::Material;
use rayon::prelude::*;

/// Shade one path against its intersection record.
///
/// Misses and exhausted paths go black, emitters terminate with their
/// light folded in, everything else scatters and spends one bounce.
pub fn shade_path(
    path: &mut PathState,
    isect: &Intersection,
    materials: &[Material],
    iteration: u32,
    depth: u32,
) {
    if !path.is_alive() {
        return;
    }
    if !isect.is_hit() {
        path.terminate_black();
        return;
    }

    let material = &materials[isect.material_id];
    if material.is_emissive() {
        path.color *= material.color * material.emittance;
        path.terminate();
        return;
    }
    if path.remaining_bounces == 0 {
        path.terminate_black();
        return;
    }

    let mut rng = seeded_rng(iteration, path.pixel_index, depth);
    let sample = ScatterSample::draw(&mut rng);
    let point = path.ray.at(isect.t);

    match scatter(material, path.ray.direction, point, isect.normal, isect.outside, sample) {
        Some(bounce) => {
            path.ray = bounce.ray;
            path.color *= bounce.weight;
            path.remaining_bounces -= 1;
            if !path.color.is_finite() {
                path.terminate_black();
            }
        }
        None => path.terminate_black(),
    }
}

/// Shade the active prefix in parallel.
pub fn shade(
    paths: &mut [PathState],
    intersections: &[Intersection],
    materials: &[Material],
    iteration: u32,
    depth: u32,
) {
    debug_assert_eq!(paths.len(), intersections.len());

    paths
        .par_iter_mut()
        .zip(intersections.par_iter())
        .for_each(|(path, isect)| shade_path(path, isect, materials, iteration, depth));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Color;
    use lumen_math::{Ray, Vec3};

    fn hit(material_id: usize) -> Intersection {
        Intersection {
            t: 2.0,
            material_id,
            normal: Vec3::Z,
            outside: true,
        }
    }

    fn materials() -> Vec<Material> {
        vec![
            Material::diffuse(Vec3::new(0.5, 0.25, 1.0)),
            Material::emissive(Vec3::ONE, 5.0),
        ]
    }

    fn path(bounces: u32) -> PathState {
        PathState::new(Ray::new(Vec3::ZERO, Vec3::NEG_Z), 3, bounces)
    }

    #[test]
    fn test_miss_goes_black() {
        let mut p = path(4);
        shade_path(&mut p, &Intersection::MISS, &materials(), 0, 0);
        assert!(!p.is_alive());
        assert_eq!(p.color, Color::ZERO);
    }

    #[test]
    fn test_emitter_terminates_with_light() {
        let mut p = path(4);
        shade_path(&mut p, &hit(1), &materials(), 0, 0);
        assert!(!p.is_alive());
        assert_eq!(p.color, Color::splat(5.0));
    }

    #[test]
    fn test_emitter_counts_on_last_bounce() {
        let mut p = path(0);
        shade_path(&mut p, &hit(1), &materials(), 0, 0);
        assert_eq!(p.color, Color::splat(5.0));
    }

    #[test]
    fn test_emitter_scales_prior_throughput() {
        let mut mats = materials();
        mats.push(Material::emissive(Vec3::new(1.0, 0.5, 0.2), 4.0));
        let mut p = path(2);
        p.color = Color::new(0.5, 0.25, 1.0);

        shade_path(&mut p, &hit(2), &mats, 0, 1);
        assert!(!p.is_alive());
        let expected = Color::new(0.5 * 4.0, 0.25 * 2.0, 0.8);
        assert!((p.color - expected).abs().max_element() < 1e-6, "{:?}", p.color);
    }

    #[test]
    fn test_exhausted_goes_black() {
        let mut p = path(0);
        shade_path(&mut p, &hit(0), &materials(), 0, 0);
        assert!(!p.is_alive());
        assert_eq!(p.color, Color::ZERO);
    }

    #[test]
    fn test_diffuse_bounce() {
        let mut p = path(3);
        shade_path(&mut p, &hit(0), &materials(), 0, 0);

        assert_eq!(p.remaining_bounces, 2);
        assert_eq!(p.color, Vec3::new(0.5, 0.25, 1.0));
        assert!(p.ray.direction.dot(Vec3::Z) > 0.0);
        assert!((p.ray.origin.z - (-2.0 + 1e-3)).abs() < 1e-5);
    }

    #[test]
    fn test_terminated_paths_untouched() {
        let mut p = path(3);
        p.terminate();
        let before = p;
        shade_path(&mut p, &hit(0), &materials(), 0, 0);
        assert_eq!(p, before);
    }

    #[test]
    fn test_shading_is_deterministic() {
        let mut a = vec![path(3); 8];
        for (i, p) in a.iter_mut().enumerate() {
            p.pixel_index = i as u32;
        }
        let mut b = a.clone();
        let records = vec![hit(0); 8];

        shade(&mut a, &records, &materials(), 5, 1);
        shade(&mut b, &records, &materials(), 5, 1);
        assert_eq!(a, b);
        // Different pixels draw different directions
        assert_ne!(a[0].ray.direction, a[1].ray.direction);
    }
}
