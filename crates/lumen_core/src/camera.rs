//! Pinhole camera descriptor.

use crate::SceneError;
use lumen_math::{UVec2, Vec2, Vec3};

/// Camera for ray generation.
///
/// Configure with the builder methods, then call [`Camera::initialize`] to
/// derive the orthonormal basis and per-pixel step. The renderer reads the
/// derived fields directly.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    // Image settings
    pub resolution: UVec2,
    /// Maximum number of scattering events per path
    pub trace_depth: u32,

    // Camera positioning
    pub position: Vec3,
    look_at: Vec3,
    vup: Vec3,
    /// Full vertical field of view in degrees
    fov_y: f32,

    // Derived by initialize()
    pub view: Vec3,
    pub right: Vec3,
    pub up: Vec3,
    /// World-space extent of one pixel on the image plane at unit distance
    pub pixel_length: Vec2,
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        Self {
            resolution: UVec2::new(800, 800),
            trace_depth: 8,
            position: Vec3::new(0.0, 0.0, 5.0),
            look_at: Vec3::ZERO,
            vup: Vec3::Y,
            fov_y: 45.0,
            view: Vec3::NEG_Z,
            right: Vec3::X,
            up: Vec3::Y,
            pixel_length: Vec2::ZERO,
        }
    }

    /// Set image resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.resolution = UVec2::new(width, height);
        self
    }

    /// Set the bounce budget.
    pub fn with_trace_depth(mut self, trace_depth: u32) -> Self {
        self.trace_depth = trace_depth;
        self
    }

    /// Set camera position.
    pub fn with_position(mut self, position: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.position = position;
        self.look_at = look_at;
        self.vup = vup;
        self
    }

    /// Set the vertical field of view in degrees.
    pub fn with_fov(mut self, fov_y: f32) -> Self {
        self.fov_y = fov_y;
        self
    }

    /// Derive basis vectors and pixel step (must be called before rendering).
    pub fn initialize(&mut self) {
        self.view = (self.look_at - self.position).normalize_or_zero();
        self.right = self.view.cross(self.vup).normalize_or_zero();
        self.up = self.right.cross(self.view);

        let y_scaled = (self.fov_y.to_radians() * 0.5).tan();
        let aspect = self.resolution.x as f32 / self.resolution.y.max(1) as f32;
        let x_scaled = y_scaled * aspect;
        self.pixel_length = Vec2::new(
            2.0 * x_scaled / self.resolution.x.max(1) as f32,
            2.0 * y_scaled / self.resolution.y.max(1) as f32,
        );
    }

    pub fn width(&self) -> u32 {
        self.resolution.x
    }

    pub fn height(&self) -> u32 {
        self.resolution.y
    }

    pub fn pixel_count(&self) -> usize {
        self.resolution.x as usize * self.resolution.y as usize
    }

    /// Reject cameras the pipeline cannot render from.
    pub fn validate(&self) -> Result<(), SceneError> {
        if self.resolution.x == 0 || self.resolution.y == 0 {
            return Err(SceneError::ZeroResolution {
                width: self.resolution.x,
                height: self.resolution.y,
            });
        }
        // Pixel indices are carried as u32
        if self.pixel_count() > u32::MAX as usize {
            return Err(SceneError::ResolutionTooLarge {
                width: self.resolution.x,
                height: self.resolution.y,
            });
        }
        let finite = self.position.is_finite()
            && self.view.is_finite()
            && self.right.is_finite()
            && self.up.is_finite()
            && self.pixel_length.is_finite();
        if !finite {
            return Err(SceneError::NonFiniteCamera);
        }

        let unit = |v: Vec3| (v.length() - 1.0).abs() < 1e-3;
        let orthogonal = self.view.dot(self.right).abs() < 1e-3
            && self.view.dot(self.up).abs() < 1e-3
            && self.right.dot(self.up).abs() < 1e-3;
        if !(unit(self.view) && unit(self.right) && unit(self.up) && orthogonal) {
            return Err(SceneError::DegenerateCamera);
        }
        if self.pixel_length.x <= 0.0 || self.pixel_length.y <= 0.0 {
            return Err(SceneError::DegenerateCamera);
        }
        Ok(())
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_initialize() {
        let mut camera = Camera::new()
            .with_resolution(800, 600)
            .with_position(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), Vec3::Y)
            .with_fov(90.0);

        camera.initialize();

        assert!((camera.view - Vec3::NEG_Z).length() < 1e-6);
        assert!((camera.right - Vec3::X).length() < 1e-6);
        assert!((camera.up - Vec3::Y).length() < 1e-6);

        // tan(45deg) = 1, so the image plane spans [-1, 1] vertically
        assert!((camera.pixel_length.y - 2.0 / 600.0).abs() < 1e-6);
        assert!((camera.pixel_length.x - 2.0 * (800.0 / 600.0) / 800.0).abs() < 1e-6);
        assert!(camera.validate().is_ok());
    }

    #[test]
    fn test_camera_zero_resolution() {
        let mut camera = Camera::new().with_resolution(0, 10);
        camera.initialize();
        assert_eq!(
            camera.validate(),
            Err(SceneError::ZeroResolution { width: 0, height: 10 })
        );
    }

    #[test]
    fn test_camera_resolution_too_large() {
        let mut camera = Camera::new().with_resolution(1 << 16, (1 << 16) + 1);
        camera.initialize();
        assert_eq!(
            camera.validate(),
            Err(SceneError::ResolutionTooLarge {
                width: 1 << 16,
                height: (1 << 16) + 1,
            })
        );

        // Exactly u32::MAX pixels is still addressable
        let mut camera = Camera::new().with_resolution(u32::MAX, 1);
        camera.initialize();
        assert!(camera.validate().is_ok());
    }

    #[test]
    fn test_camera_degenerate_basis() {
        // Up hint parallel to the view direction
        let mut camera = Camera::new().with_position(Vec3::ZERO, Vec3::Y, Vec3::Y);
        camera.initialize();
        assert_eq!(camera.validate(), Err(SceneError::DegenerateCamera));

        // Looking at itself
        let mut camera = Camera::new().with_position(Vec3::ONE, Vec3::ONE, Vec3::Y);
        camera.initialize();
        assert_eq!(camera.validate(), Err(SceneError::DegenerateCamera));
    }

    #[test]
    fn test_camera_non_finite() {
        let mut camera = Camera::new().with_position(Vec3::splat(f32::NAN), Vec3::ZERO, Vec3::Y);
        camera.initialize();
        assert_eq!(camera.validate(), Err(SceneError::NonFiniteCamera));
    }
}
