//! Deterministic random streams and hemisphere sampling.

use lumen_math::{Vec2, Vec3};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

/// Bounce slot reserved for camera-ray jitter, above any shading depth.
pub(crate) const RAYGEN_STREAM: u32 = 0x1ff;

const SQRT_OF_ONE_THIRD: f32 = 0.577_350_26;

/// 32-bit integer hash (Wang/Jenkins style avalanche).
pub fn util_hash(mut a: u32) -> u32 {
    a = a.wrapping_add(0x7ed5_5d16).wrapping_add(a << 12);
    a = (a ^ 0xc761_c23c) ^ (a >> 19);
    a = a.wrapping_add(0x1656_67b1).wrapping_add(a << 5);
    a = a.wrapping_add(0xd3a2_646c) ^ (a << 9);
    a = a.wrapping_add(0xfd70_46c5).wrapping_add(a << 3);
    a = (a ^ 0xb55a_4f09) ^ (a >> 16);
    a
}

/// SplitMix64 finalizer; a bijection on `u64`.
fn mix64(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// RNG for one path at one bounce of one iteration.
///
/// Keyed on the pixel index, not the path's array position, so reordering
/// the arena never changes which numbers a path draws. Iteration and depth
/// occupy disjoint halves of the stream key, so no two `(iteration, depth)`
/// pairs share a stream for the same pixel.
pub fn seeded_rng(iteration: u32, pixel_index: u32, depth: u32) -> SmallRng {
    let stream = ((iteration as u64) << 32) | depth as u64;
    let seed = mix64(stream) ^ util_hash(pixel_index) as u64;
    SmallRng::seed_from_u64(seed)
}

/// Shirley-Chiu concentric map from the unit square to the unit disk.
pub fn concentric_disk(u1: f32, u2: f32) -> Vec2 {
    let a = 2.0 * u1 - 1.0;
    let b = 2.0 * u2 - 1.0;
    if a == 0.0 && b == 0.0 {
        return Vec2::ZERO;
    }

    let (r, phi) = if a.abs() > b.abs() {
        (a, FRAC_PI_4 * (b / a))
    } else {
        (b, FRAC_PI_2 - FRAC_PI_4 * (a / b))
    };
    Vec2::new(r * phi.cos(), r * phi.sin())
}

/// Two unit vectors perpendicular to `normal` and to each other.
fn tangent_frame(normal: Vec3) -> (Vec3, Vec3) {
    // Pick the axis least aligned with the normal
    let not_normal = if normal.x.abs() < SQRT_OF_ONE_THIRD {
        Vec3::X
    } else if normal.y.abs() < SQRT_OF_ONE_THIRD {
        Vec3::Y
    } else {
        Vec3::Z
    };
    let t1 = normal.cross(not_normal).normalize();
    let t2 = normal.cross(t1).normalize();
    (t1, t2)
}

/// Cosine-weighted direction in the hemisphere around `normal`.
pub fn cosine_sample_hemisphere(normal: Vec3, u1: f32, u2: f32) -> Vec3 {
    let d = concentric_disk(u1, u2);
    let z = (1.0 - d.length_squared()).max(0.0).sqrt();
    let (t1, t2) = tangent_frame(normal);
    (t1 * d.x + t2 * d.y + normal * z).normalize()
}
