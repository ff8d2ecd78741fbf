//! Per-path state carried through the bounce loop.

use crate::Color;
use lumen_math::{Ray, Vec3};

/// Terminal sentinel for `PathState::remaining_bounces`.
pub const TERMINATED: i32 = -1;

/// One in-flight light path, created per pixel at the start of an iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathState {
    pub ray: Ray,
    /// Throughput multiplier; starts white
    pub color: Color,
    /// Owning pixel; fixed for the lifetime of the path
    pub pixel_index: u32,
    /// Negative once the path is terminated
    pub remaining_bounces: i32,
}

impl PathState {
    pub fn new(ray: Ray, pixel_index: u32, trace_depth: u32) -> Self {
        Self {
            ray,
            color: Color::ONE,
            pixel_index,
            remaining_bounces: trace_depth.min(i32::MAX as u32) as i32,
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.remaining_bounces >= 0
    }

    /// Terminate with the current color kept (emitter hit).
    #[inline]
    pub fn terminate(&mut self) {
        self.remaining_bounces = TERMINATED;
    }

    /// Terminate contributing no light.
    #[inline]
    pub fn terminate_black(&mut self) {
        self.color = Color::ZERO;
        self.remaining_bounces = TERMINATED;
    }
}

impl Default for PathState {
    fn default() -> Self {
        Self {
            ray: Ray::default(),
            color: Color::ZERO,
            pixel_index: 0,
            remaining_bounces: TERMINATED,
        }
    }
}

/// Nearest-hit record for one path at one bounce.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    /// Ray parameter of the hit; negative means no hit
    pub t: f32,
    pub material_id: usize,
    /// Unit normal facing the incoming ray
    pub normal: Vec3,
    /// True if the ray arrived from the side the surface normal points to
    pub outside: bool,
}

impl Intersection {
    pub const MISS: Intersection = Intersection {
        t: -1.0,
        material_id: 0,
        normal: Vec3::ZERO,
        outside: true,
    };

    #[inline]
    pub fn is_hit(&self) -> bool {
        self.t >= 0.0
    }

    /// Sort key that groups misses after every material.
    #[inline]
    pub fn material_key(&self) -> usize {
        if self.is_hit() {
            self.material_id
        } else {
            usize::MAX
        }
    }
}

impl Default for Intersection {
    fn default() -> Self {
        Self::MISS
    }
}
