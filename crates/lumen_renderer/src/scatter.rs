//! Multi-lobe scattering: dielectric, mirror/diffuse mix, and Lambertian.
//!
//! `scatter` is a pure function of its inputs. All randomness arrives through
//! [`ScatterSample`], so the same sample always yields the same bounce.

use crate::sampling::cosine_sample_hemisphere;
use crate::Color;
use lumen_core::Material;
use lumen_math::{Ray, Vec3};
use rand::Rng;

/// Offset applied along the normal when spawning a scattered ray.
pub const SURFACE_EPSILON: f32 = 1e-3;

/// Probability of taking the mirror lobe on a reflective material.
const MIRROR_PROBABILITY: f32 = 0.8;

/// Uniform random numbers consumed by one scatter event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterSample {
    /// Lobe selection
    pub choice: f32,
    /// Hemisphere sample
    pub u1: f32,
    pub u2: f32,
}

impl ScatterSample {
    pub fn draw<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            choice: rng.gen(),
            u1: rng.gen(),
            u2: rng.gen(),
        }
    }
}

/// Outgoing ray and the throughput multiplier for the path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scatter {
    pub ray: Ray,
    pub weight: Color,
}

impl Scatter {
    fn new(origin: Vec3, direction: Vec3, weight: Color) -> Option<Self> {
        // Keep already-unit directions bit-exact
        let direction = if direction.is_normalized() {
            direction
        } else {
            direction.try_normalize()?
        };
        if !origin.is_finite() || !direction.is_finite() || !weight.is_finite() {
            return None;
        }
        Some(Self {
            ray: Ray::new(origin, direction),
            weight,
        })
    }
}

#[inline]
fn reflect(incident: Vec3, normal: Vec3) -> Vec3 {
    incident - 2.0 * normal.dot(incident) * normal
}

/// Snell refraction; `None` on total internal reflection.
#[inline]
fn refract(incident: Vec3, normal: Vec3, eta: f32) -> Option<Vec3> {
    let cos_i = normal.dot(incident);
    let k = 1.0 - eta * eta * (1.0 - cos_i * cos_i);
    if k < 0.0 {
        return None;
    }
    Some(eta * incident - (eta * cos_i + k.sqrt()) * normal)
}

/// Schlick's approximation to Fresnel reflectance.
#[inline]
fn schlick(cos_i: f32, eta: f32) -> f32 {
    let r0 = ((1.0 - eta) / (1.0 + eta)).powi(2);
    r0 + (1.0 - r0) * (1.0 - cos_i).powi(5)
}

/// Scatter a ray arriving along `incoming` at `point`.
///
/// `normal` must face the incoming ray; `outside` tells which side of the
/// surface the ray came from. Returns `None` when the outgoing ray cannot be
/// formed (zero or non-finite direction), which the caller treats as
/// absorption.
pub fn scatter(
    material: &Material,
    incoming: Vec3,
    point: Vec3,
    normal: Vec3,
    outside: bool,
    sample: ScatterSample,
) -> Option<Scatter> {
    let above = point + normal * SURFACE_EPSILON;
    let below = point - normal * SURFACE_EPSILON;
    let mirror = || Scatter::new(above, reflect(incoming, normal), material.specular_color);

    if material.has_refractive {
        let ior = material.index_of_refraction;
        let eta = if outside { 1.0 / ior } else { ior };

        // Matched media: no interface to bend or reflect at
        if (eta - 1.0).abs() < 1e-6 {
            return Scatter::new(below, incoming, material.color);
        }

        let cos_i = (-incoming).dot(normal).clamp(0.0, 1.0);
        let sin_i = (1.0 - cos_i * cos_i).max(0.0).sqrt();
        if eta * sin_i > 1.0 {
            return mirror();
        }
        if sample.choice < schlick(cos_i, eta) {
            return mirror();
        }
        return match refract(incoming, normal, eta) {
            Some(direction) => Scatter::new(below, direction, material.color),
            None => mirror(),
        };
    }

    let diffuse = |weight: Color| {
        let direction = cosine_sample_hemisphere(normal, sample.u1, sample.u2);
        Scatter::new(above, direction, weight)
    };

    if material.has_reflective {
        if sample.choice < MIRROR_PROBABILITY {
            Scatter::new(
                above,
                reflect(incoming, normal),
                material.specular_color * MIRROR_PROBABILITY,
            )
        } else {
            diffuse(material.color * (1.0 - MIRROR_PROBABILITY))
        }
    } else {
        diffuse(material.color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(choice: f32) -> ScatterSample {
        ScatterSample {
            choice,
            u1: 0.3,
            u2: 0.7,
        }
    }

    #[test]
    fn test_diffuse_stays_in_hemisphere() {
        let material = Material::diffuse(Vec3::new(0.8, 0.4, 0.2));
        let s = scatter(&material, Vec3::NEG_Y, Vec3::ZERO, Vec3::Y, true, sample(0.5)).unwrap();

        assert_eq!(s.weight, material.color);
        assert!(s.ray.direction.dot(Vec3::Y) > 0.0);
        assert!((s.ray.origin.y - SURFACE_EPSILON).abs() < 1e-7);
        assert!(s.ray.is_normalized(1e-4));
    }

    #[test]
    fn test_reflective_split() {
        let material = Material::reflective(Vec3::new(0.9, 0.1, 0.1), Vec3::ONE);
        let incoming = Vec3::new(1.0, -1.0, 0.0).normalize();

        let mirror = scatter(&material, incoming, Vec3::ZERO, Vec3::Y, true, sample(0.5)).unwrap();
        assert_eq!(mirror.weight, Vec3::splat(0.8));
        assert!((mirror.ray.direction - Vec3::new(1.0, 1.0, 0.0).normalize()).length() < 1e-6);

        let diffuse = scatter(&material, incoming, Vec3::ZERO, Vec3::Y, true, sample(0.9)).unwrap();
        assert!(diffuse.ray.direction.dot(Vec3::Y) > 0.0);
        assert!((diffuse.weight - material.color * 0.2).length() < 1e-6);
    }

    #[test]
    fn test_index_one_passes_straight_through() {
        let material = Material::refractive(Vec3::ONE, Vec3::ONE, 1.0);
        let incoming = Vec3::new(0.0, -0.6, -0.8);

        for choice in [0.0, 0.5, 0.999] {
            for outside in [true, false] {
                let s = scatter(&material, incoming, Vec3::ZERO, Vec3::Y, outside, sample(choice)).unwrap();
                assert_eq!(s.ray.direction, incoming);
                assert_eq!(s.weight, Vec3::ONE);
                assert!(s.ray.origin.y < 0.0);
            }
        }
    }

    #[test]
    fn test_glass_normal_incidence() {
        let material = Material::refractive(Vec3::splat(0.9), Vec3::ONE, 1.5);

        // r0 = 0.04 at normal incidence
        let through = scatter(&material, Vec3::NEG_Y, Vec3::ZERO, Vec3::Y, true, sample(0.5)).unwrap();
        assert!((through.ray.direction - Vec3::NEG_Y).length() < 1e-6);
        assert!((through.ray.origin.y + SURFACE_EPSILON).abs() < 1e-7);
        assert_eq!(through.weight, Vec3::splat(0.9));

        let reflected = scatter(&material, Vec3::NEG_Y, Vec3::ZERO, Vec3::Y, true, sample(0.01)).unwrap();
        assert!((reflected.ray.direction - Vec3::Y).length() < 1e-6);
    }

    #[test]
    fn test_total_internal_reflection() {
        let material = Material::refractive(Vec3::ONE, Vec3::new(0.5, 0.6, 0.7), 1.5);
        // Grazing exit from inside: sin_i * 1.5 > 1
        let incoming = Vec3::new((1.0f32 - 0.04).sqrt(), -0.2, 0.0);

        let s = scatter(&material, incoming, Vec3::ZERO, Vec3::Y, false, sample(0.999)).unwrap();
        assert_eq!(s.weight, material.specular_color);
        assert!((s.ray.direction.y - 0.2).abs() < 1e-5);
        assert!(s.ray.origin.y > 0.0);
    }

    #[test]
    fn test_refractive_wins_over_reflective() {
        let mut material = Material::refractive(Vec3::ONE, Vec3::ONE, 1.5);
        material.has_reflective = true;

        let s = scatter(&material, Vec3::NEG_Y, Vec3::ZERO, Vec3::Y, true, sample(0.5)).unwrap();
        assert!((s.ray.direction - Vec3::NEG_Y).length() < 1e-6);
        assert!(s.ray.origin.y < 0.0);
    }

    #[test]
    fn test_degenerate_incoming_is_absorbed() {
        let material = Material::refractive(Vec3::ONE, Vec3::ONE, 1.5);
        assert!(scatter(&material, Vec3::ZERO, Vec3::ZERO, Vec3::Y, true, sample(0.5)).is_none());

        let mirror = Material::reflective(Vec3::ONE, Vec3::ONE);
        assert!(scatter(&mirror, Vec3::ZERO, Vec3::ZERO, Vec3::Y, true, sample(0.1)).is_none());
    }
}
