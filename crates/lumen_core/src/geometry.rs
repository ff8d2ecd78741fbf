//! Geometry primitives.
//!
//! Spheres and cubes are defined in object space (radius 0.5 sphere, unit
//! cube spanning [-0.5, 0.5]) and placed by a [`Transform`]. Triangles carry
//! explicit world-space vertices.

use lumen_math::{Aabb, Mat4, Mat4Ext, Transform, Vec3};

/// Relative growth applied to world bounds.
const BOUNDS_MARGIN: f32 = 1e-5;

/// Primitive type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeomKind {
    Sphere,
    Cube,
    Triangle,
}

/// A renderable primitive.
#[derive(Debug, Clone)]
pub struct Geom {
    pub kind: GeomKind,
    pub material_id: usize,
    transform: Transform,
    vertices: [Vec3; 3],
    // Cached matrices
    object_to_world: Mat4,
    world_to_object: Mat4,
    inv_transpose: Mat4,
}

impl Geom {
    fn with_transform(kind: GeomKind, transform: Transform, material_id: usize) -> Self {
        let object_to_world = transform.to_matrix();
        let world_to_object = object_to_world.inverse();
        Self {
            kind,
            material_id,
            transform,
            vertices: [Vec3::ZERO; 3],
            object_to_world,
            world_to_object,
            inv_transpose: world_to_object.transpose(),
        }
    }

    /// Sphere of radius 0.5 before transformation.
    pub fn sphere(transform: Transform, material_id: usize) -> Self {
        Self::with_transform(GeomKind::Sphere, transform, material_id)
    }

    /// Unit cube centered on the origin before transformation.
    pub fn cube(transform: Transform, material_id: usize) -> Self {
        Self::with_transform(GeomKind::Cube, transform, material_id)
    }

    /// Triangle with world-space vertices; winding defines the outward normal.
    pub fn triangle(v0: Vec3, v1: Vec3, v2: Vec3, material_id: usize) -> Self {
        let mut geom = Self::with_transform(GeomKind::Triangle, Transform::default(), material_id);
        geom.vertices = [v0, v1, v2];
        geom
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn vertices(&self) -> &[Vec3; 3] {
        &self.vertices
    }

    pub fn object_to_world(&self) -> &Mat4 {
        &self.object_to_world
    }

    pub fn world_to_object(&self) -> &Mat4 {
        &self.world_to_object
    }

    /// Inverse transpose of `object_to_world`, for transforming normals.
    pub fn inv_transpose(&self) -> &Mat4 {
        &self.inv_transpose
    }

    /// World-space bounding box, grown by a small relative margin so that
    /// rounding in the slab test never rejects a hit the primitive reports.
    pub fn bounds(&self) -> Aabb {
        let tight = match self.kind {
            GeomKind::Sphere | GeomKind::Cube => {
                let local = Aabb::from_points(Vec3::splat(-0.5), Vec3::splat(0.5));
                self.object_to_world.transform_aabb(&local)
            }
            GeomKind::Triangle => {
                let [v0, v1, v2] = self.vertices;
                Aabb::from_points(v0.min(v1).min(v2), v0.max(v1).max(v2))
            }
        };
        let reach = tight.min().abs().max(tight.max().abs()).max_element();
        let margin = BOUNDS_MARGIN * (1.0 + reach);
        Aabb {
            x: tight.x.expand(margin),
            y: tight.y.expand(margin),
            z: tight.z.expand(margin),
        }
    }

    /// False when the primitive can never be hit reliably: a singular
    /// transform, or a zero-area or non-finite triangle.
    pub fn is_well_formed(&self) -> bool {
        match self.kind {
            GeomKind::Sphere | GeomKind::Cube => {
                let det = self.object_to_world.determinant();
                det.is_finite() && det.abs() > f32::EPSILON && self.world_to_object.is_finite()
            }
            GeomKind::Triangle => {
                let [v0, v1, v2] = self.vertices;
                v0.is_finite()
                    && v1.is_finite()
                    && v2.is_finite()
                    && (v1 - v0).cross(v2 - v0).length_squared() > 0.0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_bounds() {
        let geom = Geom::sphere(
            Transform::from_translation_scale(Vec3::new(0.0, 0.0, -5.0), Vec3::splat(2.0)),
            0,
        );
        let bounds = geom.bounds();

        assert!((bounds.min() - Vec3::new(-1.0, -1.0, -6.0)).length() < 1e-4);
        assert!((bounds.max() - Vec3::new(1.0, 1.0, -4.0)).length() < 1e-4);
    }

    #[test]
    fn test_triangle_bounds() {
        let geom = Geom::triangle(Vec3::ZERO, Vec3::X, Vec3::Y, 3);
        let bounds = geom.bounds();

        assert_eq!(geom.material_id, 3);
        assert!(bounds.x.min <= 0.0 && bounds.x.min > -1e-4);
        assert!(bounds.y.max >= 1.0 && bounds.y.max < 1.0 + 1e-4);
        // Flat axis gets padded
        assert!(bounds.z.size() > 0.0);
    }

    #[test]
    fn test_well_formed() {
        assert!(Geom::cube(Transform::default(), 0).is_well_formed());
        assert!(Geom::triangle(Vec3::ZERO, Vec3::X, Vec3::Y, 0).is_well_formed());

        let flat = Transform::from_translation_scale(Vec3::ZERO, Vec3::new(1.0, 0.0, 1.0));
        assert!(!Geom::sphere(flat, 0).is_well_formed());
        assert!(!Geom::triangle(Vec3::ZERO, Vec3::X, Vec3::X * 2.0, 0).is_well_formed());
    }
}
