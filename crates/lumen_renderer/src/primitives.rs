//! Closed-form ray/primitive intersection tests.
//!
//! Spheres and cubes are tested in object space and mapped back to world
//! space; triangles use Möller-Trumbore directly in world space. Every test
//! returns `None` instead of a hit with non-finite values.

use lumen_core::{Geom, GeomKind};
use lumen_math::{Mat4Ext, Ray, Vec3};

/// Object-space sphere radius.
const SPHERE_RADIUS: f32 = 0.5;

/// Object-space half extent of the cube.
const CUBE_HALF: f32 = 0.5;

/// World-space hit on a single primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    pub t: f32,
    pub point: Vec3,
    /// Unit normal facing the incoming ray
    pub normal: Vec3,
    pub outside: bool,
}

impl SurfaceHit {
    fn finish(ray: &Ray, geom: &Geom, object_point: Vec3, object_normal: Vec3, outside: bool) -> Option<Self> {
        let point = geom.object_to_world().transform_point3(object_point);
        let normal = geom.inv_transpose().transform_normal(object_normal)?;
        let t = (point - ray.origin).length();
        if !t.is_finite() || t <= 0.0 || !point.is_finite() {
            return None;
        }
        Some(Self {
            t,
            point,
            normal: if outside { normal } else { -normal },
            outside,
        })
    }
}

/// Dispatch on the primitive type.
#[inline]
pub fn intersect_geom(geom: &Geom, ray: &Ray) -> Option<SurfaceHit> {
    match geom.kind {
        GeomKind::Sphere => sphere_intersection(geom, ray),
        GeomKind::Cube => box_intersection(geom, ray),
        GeomKind::Triangle => triangle_intersection(geom, ray),
    }
}

/// Map the ray into the geom's object space with a unit direction.
fn object_ray(geom: &Geom, ray: &Ray) -> Option<Ray> {
    let inv = geom.world_to_object();
    Ray::normalized(inv.transform_point3(ray.origin), inv.transform_vector3(ray.direction))
}

pub fn sphere_intersection(geom: &Geom, ray: &Ray) -> Option<SurfaceHit> {
    let local = object_ray(geom, ray)?;

    let h = local.direction.dot(local.origin);
    let c = local.origin.length_squared() - SPHERE_RADIUS * SPHERE_RADIUS;
    let discriminant = h * h - c;
    if discriminant < 0.0 {
        return None;
    }

    let sqrtd = discriminant.sqrt();
    let t_near = -h - sqrtd;
    let t_far = -h + sqrtd;
    if t_far <= 0.0 {
        return None;
    }

    // Origin inside the sphere: only the far root lies ahead
    let (t, outside) = if t_near > 0.0 { (t_near, true) } else { (t_far, false) };
    let p = local.at(t);
    SurfaceHit::finish(ray, geom, p, p, outside)
}

pub fn box_intersection(geom: &Geom, ray: &Ray) -> Option<SurfaceHit> {
    let local = object_ray(geom, ray)?;

    let mut t_min = f32::NEG_INFINITY;
    let mut t_max = f32::INFINITY;
    let mut n_min = Vec3::ZERO;
    let mut n_max = Vec3::ZERO;

    for axis in 0..3 {
        let d = local.direction[axis];
        let o = local.origin[axis];
        if d.abs() < 1e-12 {
            // Parallel to this slab: must already be between the planes
            if !(-CUBE_HALF..=CUBE_HALF).contains(&o) {
                return None;
            }
            continue;
        }

        let t1 = (-CUBE_HALF - o) / d;
        let t2 = (CUBE_HALF - o) / d;
        let (near, far) = if t1 < t2 { (t1, t2) } else { (t2, t1) };
        let mut face = Vec3::ZERO;
        face[axis] = d.signum();

        if near > t_min {
            t_min = near;
            n_min = -face;
        }
        if far < t_max {
            t_max = far;
            n_max = face;
        }
    }

    if t_max < t_min || t_max <= 0.0 {
        return None;
    }

    let (t, normal, outside) = if t_min > 0.0 {
        (t_min, n_min, true)
    } else {
        (t_max, n_max, false)
    };
    SurfaceHit::finish(ray, geom, local.at(t), normal, outside)
}

/// Möller-Trumbore ray-triangle intersection algorithm.
pub fn triangle_intersection(geom: &Geom, ray: &Ray) -> Option<SurfaceHit> {
    let [v0, v1, v2] = *geom.vertices();
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let h = ray.direction.cross(edge2);
    let a = edge1.dot(h);

    // Ray is parallel to triangle
    if a.abs() < 1e-8 {
        return None;
    }

    let f = 1.0 / a;
    let s = ray.origin - v0;
    let u = f * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * ray.direction.dot(q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);
    if !t.is_finite() || t <= 0.0 {
        return None;
    }

    let geometric = edge1.cross(edge2).try_normalize()?;
    let outside = ray.direction.dot(geometric) < 0.0;
    Some(SurfaceHit {
        t,
        point: ray.at(t),
        normal: if outside { geometric } else { -geometric },
        outside,
    })
}
