//! Surface materials.

use lumen_math::Vec3;

/// A material definition shared by reference across all intersections.
///
/// `emittance > 0` marks a light source. The flags pick the scattering lobe:
/// refractive wins over reflective, and a material with neither is diffuse.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    /// Base (diffuse / transmission) color, RGB 0-1
    pub color: Vec3,

    /// Color applied to mirror reflections
    pub specular_color: Vec3,

    pub has_reflective: bool,

    pub has_refractive: bool,

    /// Index of refraction of the medium behind the surface
    pub index_of_refraction: f32,

    /// Light emitted, as a multiplier on `color`
    pub emittance: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: Vec3::splat(0.5), // Grey default
            specular_color: Vec3::ONE,
            has_reflective: false,
            has_refractive: false,
            index_of_refraction: 1.0,
            emittance: 0.0,
        }
    }
}

impl Material {
    /// Pure Lambertian surface.
    pub fn diffuse(color: Vec3) -> Self {
        Self {
            color,
            ..Default::default()
        }
    }

    /// Light source.
    pub fn emissive(color: Vec3, emittance: f32) -> Self {
        Self {
            color,
            emittance,
            ..Default::default()
        }
    }

    /// Mixed mirror/diffuse surface.
    pub fn reflective(color: Vec3, specular_color: Vec3) -> Self {
        Self {
            color,
            specular_color,
            has_reflective: true,
            ..Default::default()
        }
    }

    /// Dielectric such as glass or water.
    pub fn refractive(color: Vec3, specular_color: Vec3, index_of_refraction: f32) -> Self {
        Self {
            color,
            specular_color,
            has_refractive: true,
            index_of_refraction,
            ..Default::default()
        }
    }

    /// Check if this material is emissive.
    pub fn is_emissive(&self) -> bool {
        self.emittance > 0.0
    }
}
